//! End-to-end library scenario: interview, edits, rollback, plan sync.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use specwright::adapters::memory::MemoryFileSystem;
use specwright::context::ServiceContext;
use specwright::diff::{compute_diff, ChangeKind};
use specwright::interview::{create_interview_state, run_scripted, TreeRegistry};
use specwright::plan::{generate_plan, update_plan_from_diff, update_task_status, TaskStatus};
use specwright::store::SpecStore;

fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

#[test]
fn edit_produces_single_change_and_flags_done_work() {
    let registry = TreeRegistry::builtin().unwrap();
    let tree = registry.get("ml_model").unwrap();
    let state = create_interview_state(&registry, "ml_model").unwrap();
    let script = answers(&[
        ("project_name", "Churn"),
        ("problem_statement", "Predict cancellations"),
        ("problem_type", "classification"),
        ("target_variable", "churn_90d"),
        ("class_balance", "highly_imbalanced"),
        ("metrics", "auc"),
        ("data_files", "customers.csv"),
        ("deliverables", "trained_model"),
    ]);
    let (draft, _) = run_scripted(tree, state, &script).unwrap();

    let ctx = ServiceContext::in_memory(MemoryFileSystem::new());
    let store = SpecStore::new(&ctx, Path::new("/project/.specwright"));
    let v1 = store.create(&draft).unwrap();
    assert_eq!(v1.get_section("modeling.target_variable").unwrap(), "churn_90d");

    let plan = generate_plan(&v1, &[], "plan-1", ctx.clock.now());
    let target_task = plan
        .tasks
        .iter()
        .find(|t| t.derived_from == ["modeling.target_variable"])
        .unwrap()
        .id
        .clone();
    let plan = update_task_status(&plan, &target_task, TaskStatus::Done, ctx.clock.now()).unwrap();

    let edited = v1.with_section("modeling.target_variable", Value::from("churn_60d")).unwrap();
    let v2 = store.save(&edited, "Shorter churn window").unwrap();
    assert_eq!(v2.version, 2);

    let diff = compute_diff(&v1, &v2);
    assert_eq!(diff.len(), 1);
    let change = diff.get("modeling.target_variable").unwrap();
    assert_eq!(change.kind, ChangeKind::Modified);
    assert_eq!(change.before, Some(Value::from("churn_90d")));
    assert_eq!(change.after, Some(Value::from("churn_60d")));

    let update = update_plan_from_diff(&diff, &plan, ctx.clock.now());
    assert_eq!(update.plan.task(&target_task).unwrap().status, TaskStatus::NeedsReview);
    for task in plan.tasks.iter().filter(|t| t.id != target_task) {
        assert_eq!(update.plan.task(&task.id), Some(task));
    }

    // A second edit touching the free-text definition too.
    let v3 = store
        .save(
            &v2.with_section("modeling.target_variable", Value::from("churn_30d"))
                .unwrap()
                .with_section("modeling.target_definition", Value::from("no login for 30 days"))
                .unwrap(),
            "Definition",
        )
        .unwrap();
    let paths: Vec<String> =
        compute_diff(&v2, &v3).paths().into_iter().map(str::to_string).collect();
    assert_eq!(paths, vec!["modeling.target_definition", "modeling.target_variable"]);
}

#[test]
fn rollback_from_four_to_two_creates_five() {
    let registry = TreeRegistry::builtin().unwrap();
    let tree = registry.get("dashboard").unwrap();
    let state = create_interview_state(&registry, "dashboard").unwrap();
    let script: BTreeMap<String, String> = tree
        .questions()
        .filter(|q| q.required)
        .map(|q| {
            let raw = q.options.first().cloned().unwrap_or_else(|| format!("{} answer", q.id));
            (q.id.clone(), raw)
        })
        .collect();
    let (draft, _) = run_scripted(tree, state, &script).unwrap();

    let fs = MemoryFileSystem::new();
    let ctx = ServiceContext::in_memory(fs.clone());
    let store = SpecStore::new(&ctx, Path::new("/store"));
    store.create(&draft).unwrap();
    for (i, note) in ["two", "three", "four"].iter().enumerate() {
        let current = store.require().unwrap();
        let edited = current.with_section("notes", Value::from(*note)).unwrap();
        let saved = store.save(&edited, note).unwrap();
        assert_eq!(saved.version as usize, i + 2);
    }
    let changelog_before = store.changelog().unwrap();

    let v5 = store.rollback_to_version(2).unwrap();
    assert_eq!(v5.version, 5);
    assert_eq!(v5.get_section("notes").unwrap(), "two");
    assert!(store.load_version(2).unwrap().unwrap().same_content(&v5));

    let versions: Vec<u32> = store.history().unwrap().iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    assert_eq!(&store.changelog().unwrap()[..4], &changelog_before[..]);
    for n in 1..=4 {
        assert!(fs.paths().contains(&Path::new("/store/history").join(format!("v{n:04}.yaml"))));
    }
}

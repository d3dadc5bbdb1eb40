//! Closed predicate language for conditional questions and follow-ups.
//!
//! Predicates are plain data in the tree definition, for example:
//!
//! ```yaml
//! condition:
//!   one_of: { field: problem_type, values: [classification, regression] }
//! ```
//!
//! serde_yaml reads externally tagged enums as `!tag` values, so fields
//! holding a [`Condition`] use `serde_yaml::with::singleton_map_recursive`
//! to accept the single-key mapping form above at every nesting level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::answer::Answer;

/// A literal compared against an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `true` / `false`.
    Bool(bool),
    /// Any number.
    Number(f64),
    /// Text, compared against text, choice, date, and file answers.
    Text(String),
}

/// A predicate over previously collected answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The answer equals `value`. Unanswered fields are never equal.
    Equals {
        /// Question id.
        field: String,
        /// Expected value.
        value: Literal,
    },
    /// Negation of `equals`; unanswered fields are not equal.
    NotEquals {
        /// Question id.
        field: String,
        /// Rejected value.
        value: Literal,
    },
    /// The answer equals any of `values`.
    OneOf {
        /// Question id.
        field: String,
        /// Accepted values.
        values: Vec<Literal>,
    },
    /// A list/choices answer contains `value`, or a text answer contains it
    /// as a substring.
    Contains {
        /// Question id.
        field: String,
        /// Item or substring.
        value: String,
    },
    /// The question was answered (not skipped, not hidden).
    Answered {
        /// Question id.
        field: String,
    },
    /// A list/choices answer has at least `min` items, or text has at least
    /// `min` characters.
    MinLength {
        /// Question id.
        field: String,
        /// Inclusive lower bound.
        min: usize,
    },
    /// Every nested condition holds.
    All(Vec<Condition>),
    /// At least one nested condition holds.
    Any(Vec<Condition>),
    /// The nested condition does not hold.
    Not(Box<Condition>),
}

/// Why a predicate could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The predicate names a field that is not a question in scope.
    #[error("condition references unknown field '{field}'")]
    UnknownField {
        /// The unknown field.
        field: String,
    },
    /// The operator does not apply to the answer's type.
    #[error("condition '{op}' cannot be applied to {found} answer of '{field}'")]
    TypeMismatch {
        /// The field being tested.
        field: String,
        /// Operator name.
        op: &'static str,
        /// The answer's type.
        found: &'static str,
    },
}

/// The answers a condition is evaluated against.
pub trait AnswerLookup {
    /// `true` if `field` names a question this scope knows about.
    fn is_known(&self, field: &str) -> bool;
    /// The answer recorded for `field`, if any.
    fn answer(&self, field: &str) -> Option<&Answer>;
}

/// Scope containing exactly one answer, used for follow-up predicates.
pub struct SingleAnswer<'a> {
    /// Question id of the answer.
    pub field: &'a str,
    /// The answer itself.
    pub answer: &'a Answer,
}

impl AnswerLookup for SingleAnswer<'_> {
    fn is_known(&self, field: &str) -> bool {
        field == self.field
    }

    fn answer(&self, field: &str) -> Option<&Answer> {
        (field == self.field).then_some(self.answer)
    }
}

impl Condition {
    /// Evaluates the predicate.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` or `TypeMismatch`; callers decide how to treat
    /// an unevaluable predicate.
    pub fn evaluate(&self, scope: &dyn AnswerLookup) -> Result<bool, ConditionError> {
        match self {
            Condition::Equals { field, value } => match lookup(scope, field)? {
                Some(answer) => equals(field, answer, value),
                None => Ok(false),
            },
            Condition::NotEquals { field, value } => match lookup(scope, field)? {
                Some(answer) => Ok(!equals(field, answer, value)?),
                None => Ok(true),
            },
            Condition::OneOf { field, values } => {
                let Some(answer) = lookup(scope, field)? else {
                    return Ok(false);
                };
                for value in values {
                    if equals(field, answer, value)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Contains { field, value } => match lookup(scope, field)? {
                None => Ok(false),
                Some(Answer::Choices(items) | Answer::List(items)) => Ok(items.contains(value)),
                Some(Answer::Text(text)) => Ok(text.contains(value.as_str())),
                Some(other) => Err(mismatch(field, "contains", other)),
            },
            Condition::Answered { field } => Ok(lookup(scope, field)?.is_some()),
            Condition::MinLength { field, min } => match lookup(scope, field)? {
                None => Ok(false),
                Some(Answer::Choices(items) | Answer::List(items)) => Ok(items.len() >= *min),
                Some(Answer::Text(text)) => Ok(text.chars().count() >= *min),
                Some(other) => Err(mismatch(field, "min_length", other)),
            },
            Condition::All(conditions) => {
                for c in conditions {
                    if !c.evaluate(scope)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any(conditions) => {
                for c in conditions {
                    if c.evaluate(scope)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not(inner) => Ok(!inner.evaluate(scope)?),
        }
    }

    /// Every field the predicate reads.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Condition::Equals { field, .. }
            | Condition::NotEquals { field, .. }
            | Condition::OneOf { field, .. }
            | Condition::Contains { field, .. }
            | Condition::Answered { field }
            | Condition::MinLength { field, .. } => vec![field.as_str()],
            Condition::All(conditions) | Condition::Any(conditions) => {
                conditions.iter().flat_map(Condition::fields).collect()
            }
            Condition::Not(inner) => inner.fields(),
        }
    }
}

fn lookup<'a>(
    scope: &'a dyn AnswerLookup,
    field: &str,
) -> Result<Option<&'a Answer>, ConditionError> {
    if !scope.is_known(field) {
        return Err(ConditionError::UnknownField { field: field.to_string() });
    }
    Ok(scope.answer(field))
}

fn equals(field: &str, answer: &Answer, literal: &Literal) -> Result<bool, ConditionError> {
    match (answer, literal) {
        (Answer::Text(s) | Answer::Choice(s) | Answer::File(s), Literal::Text(t)) => Ok(s == t),
        (Answer::Date(d), Literal::Text(t)) => Ok(d.format("%Y-%m-%d").to_string() == *t),
        (Answer::Boolean(b), Literal::Bool(l)) => Ok(b == l),
        #[allow(clippy::float_cmp)]
        (Answer::Number(n), Literal::Number(l)) => Ok(n == l),
        (other, _) => Err(mismatch(field, "equals", other)),
    }
}

fn mismatch(field: &str, op: &'static str, answer: &Answer) -> ConditionError {
    ConditionError::TypeMismatch { field: field.to_string(), op, found: answer.type_name() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct MapScope(BTreeMap<&'static str, Option<Answer>>);

    impl AnswerLookup for MapScope {
        fn is_known(&self, field: &str) -> bool {
            self.0.contains_key(field)
        }
        fn answer(&self, field: &str) -> Option<&Answer> {
            self.0.get(field).and_then(Option::as_ref)
        }
    }

    fn scope() -> MapScope {
        MapScope(BTreeMap::from([
            ("problem_type", Some(Answer::Choice("classification".into()))),
            ("metrics", Some(Answer::Choices(vec!["auc".into(), "f1".into()]))),
            ("interpretability", Some(Answer::Boolean(true))),
            ("n_clusters", None),
        ]))
    }

    fn parse(yaml: &str) -> Condition {
        let de = serde_yaml::Deserializer::from_str(yaml);
        serde_yaml::with::singleton_map_recursive::deserialize(de).unwrap()
    }

    #[test]
    fn equality_and_membership() {
        let s = scope();
        let c = parse("equals: { field: problem_type, value: classification }");
        assert!(c.evaluate(&s).unwrap());
        assert!(!parse("equals: { field: problem_type, value: clustering }").evaluate(&s).unwrap());
        assert!(parse("one_of: { field: problem_type, values: [regression, classification] }")
            .evaluate(&s)
            .unwrap());
        assert!(parse("equals: { field: interpretability, value: true }").evaluate(&s).unwrap());
        assert!(parse("contains: { field: metrics, value: auc }").evaluate(&s).unwrap());
        assert!(parse("min_length: { field: metrics, min: 2 }").evaluate(&s).unwrap());
    }

    #[test]
    fn unanswered_fields_are_false_not_errors() {
        let s = scope();
        assert!(!parse("equals: { field: n_clusters, value: 3 }").evaluate(&s).unwrap());
        assert!(parse("not_equals: { field: n_clusters, value: 3 }").evaluate(&s).unwrap());
        assert!(!parse("answered: { field: n_clusters }").evaluate(&s).unwrap());
    }

    #[test]
    fn combinators() {
        let s = scope();
        let c = parse(
            "all:\n  - answered: { field: problem_type }\n  - not:\n      \
             equals: { field: problem_type, value: clustering }\n",
        );
        assert!(c.evaluate(&s).unwrap());
        let c = parse(
            "any:\n  - equals: { field: problem_type, value: clustering }\n  \
             - min_length: { field: metrics, min: 5 }\n",
        );
        assert!(!c.evaluate(&s).unwrap());
        assert_eq!(c.fields(), vec!["problem_type", "metrics"]);
    }

    #[test]
    fn unknown_field_is_an_error() {
        let err = parse("equals: { field: target, value: x }").evaluate(&scope()).unwrap_err();
        assert_eq!(err, ConditionError::UnknownField { field: "target".into() });
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let err = parse("min_length: { field: interpretability, min: 1 }")
            .evaluate(&scope())
            .unwrap_err();
        assert!(matches!(err, ConditionError::TypeMismatch { op: "min_length", .. }));
        assert!(parse("equals: { field: problem_type, value: 3 }").evaluate(&scope()).is_err());
    }

    #[test]
    fn single_answer_scope_only_knows_its_field() {
        let answer = Answer::Choice("highly_imbalanced".into());
        let scope = SingleAnswer { field: "class_balance", answer: &answer };
        let c = parse("equals: { field: class_balance, value: highly_imbalanced }");
        assert!(c.evaluate(&scope).unwrap());
        assert!(parse("answered: { field: problem_type }").evaluate(&scope).is_err());
    }
}

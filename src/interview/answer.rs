//! Typed answers and raw-input parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};

use super::tree::{Question, QuestionType};

/// A parsed answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Free text, stored verbatim.
    Text(String),
    /// One option of a single-choice question (canonical option text).
    Choice(String),
    /// Selected options of a multiple-choice question, in selection order.
    Choices(Vec<String>),
    /// Yes/no.
    Boolean(bool),
    /// A number.
    Number(f64),
    /// A calendar date.
    Date(NaiveDate),
    /// A list of strings.
    List(Vec<String>),
    /// A file reference, stored as given.
    File(String),
}

impl Answer {
    /// The document value this answer is stored as.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Answer::Text(s) | Answer::Choice(s) | Answer::File(s) => Value::String(s.clone()),
            Answer::Choices(items) | Answer::List(items) => {
                Value::Sequence(items.iter().cloned().map(Value::String).collect())
            }
            Answer::Boolean(b) => Value::Bool(*b),
            Answer::Number(n) => number_value(*n),
            Answer::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Answer::Text(_) => "text",
            Answer::Choice(_) => "choice",
            Answer::Choices(_) => "choices",
            Answer::Boolean(_) => "boolean",
            Answer::Number(_) => "number",
            Answer::Date(_) => "date",
            Answer::List(_) => "list",
            Answer::File(_) => "file",
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Parses trimmed, non-empty raw input according to the question's type.
///
/// # Errors
///
/// Returns `InvalidAnswer` when the input does not fit the type.
pub fn parse_answer(question: &Question, raw: &str) -> Result<Answer> {
    let invalid =
        |reason: String| Error::InvalidAnswer { question_id: question.id.clone(), reason };

    match question.kind {
        QuestionType::Text => Ok(Answer::Text(raw.to_string())),
        QuestionType::FileRef => Ok(Answer::File(raw.to_string())),
        QuestionType::SingleChoice => {
            match_option(&question.options, raw).map(Answer::Choice).ok_or_else(|| {
                invalid(format!("'{raw}' is not one of: {}", question.options.join(", ")))
            })
        }
        QuestionType::MultipleChoice => {
            let mut picked: Vec<String> = Vec::new();
            for item in split_items(raw) {
                let option = match_option(&question.options, &item).ok_or_else(|| {
                    invalid(format!("'{item}' is not one of: {}", question.options.join(", ")))
                })?;
                if !picked.contains(&option) {
                    picked.push(option);
                }
            }
            Ok(Answer::Choices(picked))
        }
        QuestionType::Boolean => match raw.to_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Ok(Answer::Boolean(true)),
            "n" | "no" | "false" | "0" => Ok(Answer::Boolean(false)),
            _ => Err(invalid(format!("'{raw}' is not yes or no"))),
        },
        QuestionType::Numeric => {
            let n: f64 = raw
                .parse()
                .ok()
                .filter(|n: &f64| n.is_finite())
                .ok_or_else(|| invalid(format!("'{raw}' is not a number")))?;
            if let Some(min) = question.min.filter(|min| n < *min) {
                return Err(invalid(format!("{n} is below the minimum {min}")));
            }
            if let Some(max) = question.max.filter(|max| n > *max) {
                return Err(invalid(format!("{n} is above the maximum {max}")));
            }
            Ok(Answer::Number(n))
        }
        QuestionType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Answer::Date)
            .map_err(|_| invalid(format!("'{raw}' is not a YYYY-MM-DD date"))),
        QuestionType::List => Ok(Answer::List(split_items(raw))),
    }
}

/// Splits list input on `;` when present, otherwise on `,`.
fn split_items(raw: &str) -> Vec<String> {
    let sep = if raw.contains(';') { ';' } else { ',' };
    raw.split(sep).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Matches by option text (case-insensitive) or by 1-based index.
fn match_option(options: &[String], raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(found) = options.iter().find(|o| o.eq_ignore_ascii_case(raw)) {
        return Some(found.clone());
    }
    raw.parse::<usize>().ok().and_then(|i| i.checked_sub(1)).and_then(|i| options.get(i)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionType, options: &[&str]) -> Question {
        Question {
            id: "q".into(),
            prompt: "?".into(),
            kind,
            options: options.iter().map(|s| (*s).to_string()).collect(),
            min: None,
            max: None,
            required: false,
            condition: None,
            follow_up: None,
            maps_to: "notes.q".into(),
        }
    }

    #[test]
    fn single_choice_by_text_or_index() {
        let q = question(QuestionType::SingleChoice, &["classification", "regression"]);
        assert_eq!(parse_answer(&q, "Regression").unwrap(), Answer::Choice("regression".into()));
        assert_eq!(parse_answer(&q, "1").unwrap(), Answer::Choice("classification".into()));
        assert!(parse_answer(&q, "3").is_err());
        assert!(parse_answer(&q, "clustering").is_err());
    }

    #[test]
    fn multiple_choice_dedupes_in_order() {
        let q = question(QuestionType::MultipleChoice, &["auc", "f1", "recall"]);
        assert_eq!(
            parse_answer(&q, "recall, auc, recall").unwrap(),
            Answer::Choices(vec!["recall".into(), "auc".into()])
        );
    }

    #[test]
    fn numeric_respects_bounds() {
        let mut q = question(QuestionType::Numeric, &[]);
        q.min = Some(2.0);
        q.max = Some(50.0);
        assert_eq!(parse_answer(&q, "8").unwrap(), Answer::Number(8.0));
        assert!(parse_answer(&q, "1").is_err());
        assert!(parse_answer(&q, "eight").is_err());
        assert!(parse_answer(&q, "NaN").is_err());
    }

    #[test]
    fn boolean_and_date() {
        let q = question(QuestionType::Boolean, &[]);
        assert_eq!(parse_answer(&q, "Yes").unwrap(), Answer::Boolean(true));
        assert!(parse_answer(&q, "maybe").is_err());

        let q = question(QuestionType::Date, &[]);
        assert_eq!(
            parse_answer(&q, "2025-06-30").unwrap().to_value(),
            Value::String("2025-06-30".into())
        );
        assert!(parse_answer(&q, "30/06/2025").is_err());
    }

    #[test]
    fn list_prefers_semicolons() {
        let q = question(QuestionType::List, &[]);
        assert_eq!(
            parse_answer(&q, "New York, NY; Austin, TX").unwrap(),
            Answer::List(vec!["New York, NY".into(), "Austin, TX".into()])
        );
        assert_eq!(
            parse_answer(&q, "a, b,,c").unwrap(),
            Answer::List(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn whole_numbers_become_integers() {
        assert_eq!(Answer::Number(12.0).to_value(), Value::from(12));
        assert_eq!(Answer::Number(0.5).to_value(), Value::from(0.5));
    }
}

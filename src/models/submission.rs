// src/models/submission.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::question::{Catalog, QuestionKind};

/// A respondent's answer to one question.
///
/// Serialized untagged: a single-choice answer is a JSON string,
/// a multi-choice answer is a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multi(BTreeSet<String>),
}

impl Answer {
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Answer::Single(label) => vec![label.as_str()],
            Answer::Multi(labels) => labels.iter().map(String::as_str).collect(),
        }
    }
}

/// Validated answers keyed by question id.
pub type Answers = BTreeMap<String, Answer>;

/// DTO for a survey submission (the draft a respondent sends).
///
/// An absent key and an explicit `null` both mean "not answered".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponseRequest {
    #[serde(default)]
    pub respondent_name: String,
    #[serde(default)]
    pub answers: BTreeMap<String, Option<Answer>>,
}

/// Field key used when the respondent name is at fault.
pub const NAME_FIELD: &str = "respondent_name";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("respondent name must not be empty")]
    EmptyName,

    #[error("question {question_id} has not been answered")]
    MissingAnswer { question_id: String },

    #[error("'{option}' is not an option of question {question_id}")]
    UnknownOption { question_id: String, option: String },

    #[error("answer to question {question_id} has the wrong shape")]
    KindMismatch { question_id: String },

    #[error("question {question_id} does not exist")]
    UnknownQuestion { question_id: String },
}

impl ValidationError {
    /// The form field the error should be shown next to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyName => NAME_FIELD,
            ValidationError::MissingAnswer { question_id }
            | ValidationError::UnknownOption { question_id, .. }
            | ValidationError::KindMismatch { question_id }
            | ValidationError::UnknownQuestion { question_id } => question_id,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "empty",
            ValidationError::MissingAnswer { .. } => "missing",
            ValidationError::UnknownOption { .. } => "unknown_option",
            ValidationError::KindMismatch { .. } => "kind_mismatch",
            ValidationError::UnknownQuestion { .. } => "unknown_question",
        }
    }
}

/// Wire form of a validation failure.
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub field: String,
    pub reason: &'static str,
    pub message: String,
}

impl From<&ValidationError> for ValidationErrorBody {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field().to_owned(),
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

impl SubmitResponseRequest {
    /// The respondent name as it will be stored.
    pub fn trimmed_name(&self) -> &str {
        self.respondent_name.trim()
    }

    /// Checks the draft against the catalog.
    ///
    /// Every rule is evaluated and all failures are returned together: the name
    /// first, then questions in catalog order, then keys the catalog does not know.
    /// On success returns the answers to persist, with unanswered multi-choice
    /// questions filled in as empty sets.
    pub fn validate(&self, catalog: &Catalog) -> Result<Answers, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut answers = Answers::new();

        if self.trimmed_name().is_empty() {
            errors.push(ValidationError::EmptyName);
        }

        for question in catalog.all() {
            let answer = self.answers.get(&question.id).and_then(Option::as_ref);

            match (question.kind, answer) {
                (_, None) if question.required => {
                    errors.push(ValidationError::MissingAnswer {
                        question_id: question.id.clone(),
                    });
                }
                (QuestionKind::SingleChoice, None) => {}
                (QuestionKind::MultiChoice, None) => {
                    answers.insert(question.id.clone(), Answer::Multi(BTreeSet::new()));
                }
                (QuestionKind::SingleChoice, Some(Answer::Multi(_)))
                | (QuestionKind::MultiChoice, Some(Answer::Single(_))) => {
                    errors.push(ValidationError::KindMismatch {
                        question_id: question.id.clone(),
                    });
                }
                (_, Some(answer)) => {
                    let unknown: Vec<&str> = answer
                        .labels()
                        .into_iter()
                        .filter(|label| !question.has_option(label))
                        .collect();

                    if unknown.is_empty() {
                        answers.insert(question.id.clone(), answer.clone());
                    }
                    for option in unknown {
                        errors.push(ValidationError::UnknownOption {
                            question_id: question.id.clone(),
                            option: option.to_owned(),
                        });
                    }
                }
            }
        }

        for question_id in self.answers.keys() {
            if catalog.get(question_id).is_none() {
                errors.push(ValidationError::UnknownQuestion {
                    question_id: question_id.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(answers)
        } else {
            Err(errors)
        }
    }
}

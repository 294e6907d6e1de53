use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid form: {}", describe(.0))]
    Invalid(BTreeMap<String, String>),

    #[error("{0}")]
    Constraint(String),

    #[error("Form does not match the expected payload: {0}")]
    Shape(String),
}

fn describe(issues: &BTreeMap<String, String>) -> String {
    issues
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormError {
    /// Per-field issues, empty for whole-form errors
    pub fn issues(&self) -> BTreeMap<String, String> {
        match self {
            FormError::Invalid(issues) => issues.clone(),
            FormError::UnknownField(name) => BTreeMap::from([(name.clone(), "unknown field".to_string())]),
            _ => BTreeMap::new(),
        }
    }
}

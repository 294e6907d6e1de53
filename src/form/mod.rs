//! Form/validation layer.
//!
//! A [`Form`] binds named fields to raw text entries and only produces a
//! payload once every field coerces cleanly. Coercion to numbers, dates and
//! foreign keys happens at submit time, never per keystroke. Each open dialog
//! owns its own `Form`, so a create draft and an edit draft never share state.

pub mod error;
pub mod field;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use error::FormError;
pub use field::{FieldKind, FieldSpec};

/// Raw entries keyed by field name
pub type FieldValues = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct Form {
    specs: Vec<FieldSpec>,
    values: FieldValues,
}

impl Form {
    /// Form with every field at its default entry
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let values = specs
            .iter()
            .map(|s| (s.name.to_string(), s.default_value()))
            .collect();
        Self { specs, values }
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(FormError::UnknownField(name.to_string())),
        }
    }

    /// Apply `name=value` assignments
    pub fn apply_assignments<'a, I>(&mut self, assignments: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for assignment in assignments {
            let (name, value) = assignment
                .split_once('=')
                .ok_or_else(|| FormError::Constraint(format!("Expected name=value, got '{}'", assignment)))?;
            self.set(name.trim(), value)?;
        }
        Ok(())
    }

    pub fn get_values(&self) -> &FieldValues {
        &self.values
    }

    /// Replace every entry: fields present in `values` take those entries,
    /// the rest fall back to defaults. Unknown names are ignored.
    pub fn reset(&mut self, values: FieldValues) {
        for spec in &self.specs {
            let entry = values
                .get(spec.name)
                .cloned()
                .unwrap_or_else(|| spec.default_value());
            self.values.insert(spec.name.to_string(), entry);
        }
    }

    /// Back to the defaults
    pub fn clear(&mut self) {
        self.reset(FieldValues::new());
    }

    /// Coerce every field, collecting all issues before failing
    pub fn validate(&self) -> Result<Map<String, Value>, FormError> {
        let mut payload = Map::new();
        let mut issues = BTreeMap::new();

        for spec in &self.specs {
            let raw = self.values.get(spec.name).map(String::as_str).unwrap_or("");
            match spec.coerce(raw) {
                Ok(value) => {
                    payload.insert(spec.name.to_string(), value);
                }
                Err(message) => {
                    issues.insert(spec.name.to_string(), message);
                }
            }
        }

        if issues.is_empty() {
            Ok(payload)
        } else {
            Err(FormError::Invalid(issues))
        }
    }

    /// Validate and shape the payload into a typed draft
    pub fn submit<D: DeserializeOwned>(&self) -> Result<D, FormError> {
        let payload = self.validate()?;
        serde_json::from_value(Value::Object(payload)).map_err(|e| FormError::Shape(e.to_string()))
    }
}

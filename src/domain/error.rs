use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use thiserror::Error;

/// Constraint tags reported back to clients when a field is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Min,
    Max,
    Gt,
    Lte,
}

impl Constraint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Gt => "gt",
            Self::Lte => "lte",
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub constraint: Constraint,
}

/// Every field that failed validation, at most one violation per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed on {}", describe(.violations))]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, constraint: Constraint) {
        if self.violations.iter().any(|v| v.field == field) {
            return;
        }
        self.violations.push(FieldViolation { field, constraint });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn constraint_for(&self, field: &str) -> Option<Constraint> {
        self.violations
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.constraint)
    }

    /// Field name to human readable message, sorted by field.
    pub fn to_field_map(&self) -> BTreeMap<&'static str, String> {
        self.violations
            .iter()
            .map(|v| {
                (
                    v.field,
                    format!("Failed on the '{}' tag", v.constraint),
                )
            })
            .collect()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}({})", v.field, v.constraint))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Serialize for ValidationErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_field_map().serialize(serializer)
    }
}

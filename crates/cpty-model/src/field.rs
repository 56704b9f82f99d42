//! Form fields and per-field error messages

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Editable counterparty field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    /// Legal name
    Name,
    /// Taxpayer identification number
    Inn,
    /// Registered address
    Address,
    /// Tax registration reason code
    Kpp,
}

impl FormField {
    /// All fields in display order
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Inn,
        FormField::Address,
        FormField::Kpp,
    ];

    /// JSON key of the field
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Inn => "inn",
            FormField::Address => "address",
            FormField::Kpp => "kpp",
        }
    }

    /// Label shown next to the input
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Название",
            FormField::Inn => "ИНН",
            FormField::Address => "Адрес",
            FormField::Kpp => "КПП",
        }
    }
}

impl FromStr for FormField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FormField::Name),
            "inn" => Ok(FormField::Inn),
            "address" => Ok(FormField::Address),
            "kpp" => Ok(FormField::Kpp),
            other => Err(ModelError::UnknownField(other.to_string())),
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages keyed by field
///
/// A field without an entry currently has no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<FormField, &'static str>);

impl FormErrors {
    /// Create empty error set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field
    pub fn insert(&mut self, field: FormField, message: &'static str) {
        self.0.insert(field, message);
    }

    /// Clear the error for a field
    pub fn remove(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    /// Message for a field, if any
    #[inline]
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// True when no field has an error
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields with their messages, in field order
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    /// Failing fields only
    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.keys().copied()
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

//! Counterparty records
//!
//! Defines the persisted entity and its editable forms:
//! - `Counterparty` always carries a server-side id
//! - `CounterpartyFormData` has an optional id (absent = not yet created)
//! - `CounterpartyPatch` carries a partial update

use crate::error::ModelError;
use crate::field::FormField;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique counterparty identifier
///
/// Ids are opaque strings assigned once and stable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(String);

impl CounterpartyId {
    /// Generate new random id (UUID v4)
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CounterpartyId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ModelError::EmptyId);
        }
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted counterparty record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    /// Server-side identifier
    pub id: CounterpartyId,
    /// Legal name
    pub name: String,
    /// Taxpayer identification number (11 digits)
    pub inn: String,
    /// Registered address
    pub address: String,
    /// Tax registration reason code (9 digits)
    pub kpp: String,
}

impl Counterparty {
    /// Read a single field value
    #[must_use]
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Inn => &self.inn,
            FormField::Address => &self.address,
            FormField::Kpp => &self.kpp,
        }
    }

    /// Compare every field except the id
    #[must_use]
    pub fn same_fields(&self, other: &Self) -> bool {
        self.name == other.name
            && self.inn == other.inn
            && self.address == other.address
            && self.kpp == other.kpp
    }
}

/// Editable counterparty data
///
/// Missing JSON fields deserialize as empty strings so that they fail
/// validation instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyFormData {
    /// Present once the record exists on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CounterpartyId>,
    /// Legal name
    #[serde(default)]
    pub name: String,
    /// Taxpayer identification number
    #[serde(default)]
    pub inn: String,
    /// Registered address
    #[serde(default)]
    pub address: String,
    /// Tax registration reason code
    #[serde(default)]
    pub kpp: String,
}

impl CounterpartyFormData {
    /// Create form data for a record that does not exist yet
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        inn: impl Into<String>,
        address: impl Into<String>,
        kpp: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            inn: inn.into(),
            address: address.into(),
            kpp: kpp.into(),
        }
    }

    /// With existing id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: CounterpartyId) -> Self {
        self.id = Some(id);
        self
    }

    /// Read a single field value
    #[must_use]
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Inn => &self.inn,
            FormField::Address => &self.address,
            FormField::Kpp => &self.kpp,
        }
    }

    /// Replace a single field value
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Inn => self.inn = value,
            FormField::Address => self.address = value,
            FormField::Kpp => self.kpp = value,
        }
    }

    /// Whether this form describes a new record
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Convert into a persisted record under the given id
    ///
    /// Any id already present on the form is replaced.
    #[must_use]
    pub fn into_counterparty(self, id: CounterpartyId) -> Counterparty {
        Counterparty {
            id,
            name: self.name,
            inn: self.inn,
            address: self.address,
            kpp: self.kpp,
        }
    }
}

impl From<Counterparty> for CounterpartyFormData {
    fn from(record: Counterparty) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            inn: record.inn,
            address: record.address,
            kpp: record.kpp,
        }
    }
}

/// Partial update sent with PATCH
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyPatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New INN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,
    /// New address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New KPP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpp: Option<String>,
}

impl CounterpartyPatch {
    /// Set one field
    #[must_use]
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            FormField::Name => self.name = value,
            FormField::Inn => self.inn = value,
            FormField::Address => self.address = value,
            FormField::Kpp => self.kpp = value,
        }
        self
    }

    /// True when no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.inn.is_none() && self.address.is_none() && self.kpp.is_none()
    }

    /// Produce the record that results from applying this patch
    #[must_use]
    pub fn apply_to(&self, record: &Counterparty) -> Counterparty {
        Counterparty {
            id: record.id.clone(),
            name: self.name.clone().unwrap_or_else(|| record.name.clone()),
            inn: self.inn.clone().unwrap_or_else(|| record.inn.clone()),
            address: self.address.clone().unwrap_or_else(|| record.address.clone()),
            kpp: self.kpp.clone().unwrap_or_else(|| record.kpp.clone()),
        }
    }
}

impl From<&Counterparty> for CounterpartyPatch {
    fn from(record: &Counterparty) -> Self {
        Self {
            name: Some(record.name.clone()),
            inn: Some(record.inn.clone()),
            address: Some(record.address.clone()),
            kpp: Some(record.kpp.clone()),
        }
    }
}

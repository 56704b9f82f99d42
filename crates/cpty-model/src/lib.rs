//! Counterparty Model
//!
//! Core records and rules shared by every layer of the registry:
//! - `Counterparty` as persisted by the backend
//! - `CounterpartyFormData` as edited before creation
//! - Field-level validation with fixed, user-facing messages
//!
//! # Example
//!
//! ```rust
//! use cpty_model::{CounterpartyFormData, FormField, validate};
//!
//! let form = CounterpartyFormData::new("ООО Ромашка", "123", "Москва", "123456789");
//! let errors = validate(&form);
//!
//! assert_eq!(errors.len(), 1);
//! assert!(errors.get(FormField::Inn).is_some());
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod counterparty;
pub mod error;
pub mod field;
pub mod validation;

// Re-exports for convenience
pub use counterparty::{Counterparty, CounterpartyFormData, CounterpartyId, CounterpartyPatch};
pub use error::ModelError;
pub use field::{FormErrors, FormField};
pub use validation::{
    check_field, is_valid, validate, validate_address, validate_inn, validate_kpp, validate_name, Validate,
    ADDRESS_ERROR, INN_ERROR, INN_LENGTH, KPP_ERROR, KPP_LENGTH, NAME_ERROR,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Modal form view-model
//!
//! Binds the four inputs to the validation rules. Submission is blocked while
//! any field fails; a field's message clears as soon as its value is fixed.

use crate::state::{AppState, ModalState};
use cpty_model::validation::check_field;
use cpty_model::{validate, Counterparty, CounterpartyFormData, CounterpartyId, FormErrors, FormField};

/// Whether the form creates or edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// New record
    Create,
    /// Existing record
    Edit(CounterpartyId),
}

/// Form being edited in the modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    mode: FormMode,
    data: CounterpartyFormData,
    errors: FormErrors,
}

impl FormSession {
    /// Empty form for a new record
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            data: CounterpartyFormData::default(),
            errors: FormErrors::new(),
        }
    }

    /// Form prefilled from an existing record
    #[must_use]
    pub fn edit(record: &Counterparty) -> Self {
        Self {
            mode: FormMode::Edit(record.id.clone()),
            data: CounterpartyFormData::from(record.clone()),
            errors: FormErrors::new(),
        }
    }

    /// Form matching the modal currently open, if any
    #[must_use]
    pub fn for_state(state: &AppState) -> Option<Self> {
        match &state.modal {
            ModalState::Closed => None,
            ModalState::Create => Some(Self::create()),
            ModalState::Edit(record) => Some(Self::edit(record)),
        }
    }

    /// Create or edit
    #[inline]
    #[must_use]
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Modal title
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Новый контрагент",
            FormMode::Edit(_) => "Редактирование контрагента",
        }
    }

    /// Current input value
    #[inline]
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        self.data.field(field)
    }

    /// Current message for a field
    #[inline]
    #[must_use]
    pub fn error(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(field)
    }

    /// All current messages
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Form data as typed so far
    #[inline]
    #[must_use]
    pub fn data(&self) -> &CounterpartyFormData {
        &self.data
    }

    /// Apply an input change
    pub fn apply(&mut self, field: FormField, value: impl Into<String>) {
        self.data.set_field(field, value);
        if self.errors.get(field).is_some() {
            match check_field(field, self.data.field(field)) {
                Some(message) => self.errors.insert(field, message),
                None => self.errors.remove(field),
            }
        }
    }

    /// Validate everything; on success hand back the data to save
    ///
    /// # Errors
    /// The full error set when any field fails; it is also kept on the session
    pub fn submit(&mut self) -> Result<CounterpartyFormData, FormErrors> {
        self.errors = validate(&self.data);
        if self.errors.is_empty() {
            Ok(self.data.clone())
        } else {
            Err(self.errors.clone())
        }
    }
}

//! Field validation rules
//!
//! Pure predicates for every editable field plus the aggregate check.
//! Whitespace is not trimmed: a name made of spaces is non-empty and passes.

use crate::counterparty::{Counterparty, CounterpartyFormData};
use crate::field::{FormErrors, FormField};
use once_cell::sync::Lazy;
use regex::Regex;

/// Required INN length
pub const INN_LENGTH: usize = 11;

/// Required KPP length
pub const KPP_LENGTH: usize = 9;

/// Message for a missing name
pub const NAME_ERROR: &str = "Название обязательно";

/// Message for a malformed INN
pub const INN_ERROR: &str = "ИНН должен содержать 11 цифр";

/// Message for a missing address
pub const ADDRESS_ERROR: &str = "Адрес обязателен";

/// Message for a malformed KPP
pub const KPP_ERROR: &str = "КПП должен содержать 9 цифр";

// ASCII digits only
static INN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{11}$").expect("INN pattern is valid"));

static KPP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{9}$").expect("KPP pattern is valid"));

/// Name must be non-empty
#[inline]
#[must_use]
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
}

/// INN must be exactly 11 decimal digits
#[inline]
#[must_use]
pub fn validate_inn(inn: &str) -> bool {
    INN_PATTERN.is_match(inn)
}

/// Address must be non-empty
#[inline]
#[must_use]
pub fn validate_address(address: &str) -> bool {
    !address.is_empty()
}

/// KPP must be exactly 9 decimal digits
#[inline]
#[must_use]
pub fn validate_kpp(kpp: &str) -> bool {
    KPP_PATTERN.is_match(kpp)
}

/// Check a single field value, returning its message on failure
#[must_use]
pub fn check_field(field: FormField, value: &str) -> Option<&'static str> {
    let (ok, message) = match field {
        FormField::Name => (validate_name(value), NAME_ERROR),
        FormField::Inn => (validate_inn(value), INN_ERROR),
        FormField::Address => (validate_address(value), ADDRESS_ERROR),
        FormField::Kpp => (validate_kpp(value), KPP_ERROR),
    };
    (!ok).then_some(message)
}

/// Anything exposing the four counterparty fields
pub trait Validate {
    /// Value of one field
    fn value(&self, field: FormField) -> &str;

    /// Errors for every failing field
    fn errors(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        for field in FormField::ALL {
            if let Some(message) = check_field(field, self.value(field)) {
                errors.insert(field, message);
            }
        }
        errors
    }

    /// True iff every field passes its rule
    fn is_valid(&self) -> bool {
        FormField::ALL
            .iter()
            .all(|field| check_field(*field, self.value(*field)).is_none())
    }
}

impl Validate for CounterpartyFormData {
    fn value(&self, field: FormField) -> &str {
        self.field(field)
    }
}

impl Validate for Counterparty {
    fn value(&self, field: FormField) -> &str {
        self.field(field)
    }
}

/// Errors for every failing field of the form
#[inline]
#[must_use]
pub fn validate(form: &CounterpartyFormData) -> FormErrors {
    form.errors()
}

/// True iff the form passes every rule
#[inline]
#[must_use]
pub fn is_valid(form: &CounterpartyFormData) -> bool {
    Validate::is_valid(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn valid_form() -> CounterpartyFormData {
        CounterpartyFormData::new("Test Name", "22345678901", "Test Address", "123456789")
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(validate(&valid_form()).is_empty());
        assert!(is_valid(&valid_form()));
    }

    #[test]
    fn empty_form_fails_every_field() {
        let errors = validate(&CounterpartyFormData::default());
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(FormField::Name), Some(NAME_ERROR));
        assert_eq!(errors.get(FormField::Inn), Some(INN_ERROR));
        assert_eq!(errors.get(FormField::Address), Some(ADDRESS_ERROR));
        assert_eq!(errors.get(FormField::Kpp), Some(KPP_ERROR));
    }

    #[test]
    fn short_inn_reported() {
        let mut form = valid_form();
        form.inn = "123".to_string();
        let errors = validate(&form);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FormField::Inn]);
        assert!(!is_valid(&form));
    }

    #[test]
    fn whitespace_only_name_is_accepted() {
        assert!(validate_name("   "));
        assert!(validate_address("\t"));
    }

    #[test]
    fn non_ascii_digits_rejected() {
        // Arabic-Indic digits
        assert!(!validate_kpp("١٢٣٤٥٦٧٨٩"));
        assert!(!validate_inn("1234567890 "));
        assert!(!validate_inn("12345678901\n"));
    }

    #[test]
    fn persisted_record_validates_like_form() {
        let record = valid_form().into_counterparty("x".parse().unwrap());
        assert!(Validate::is_valid(&record));
    }

    proptest! {
        #[test]
        fn prop_inn_accepts_eleven_digits(inn in "[0-9]{11}") {
            prop_assert!(validate_inn(&inn));
        }

        #[test]
        fn prop_inn_rejects_wrong_length(inn in "[0-9]{0,10}|[0-9]{12,20}") {
            prop_assert!(!validate_inn(&inn));
        }

        #[test]
        fn prop_inn_rejects_non_digit(prefix in "[0-9]{0,10}", bad in "[^0-9]", suffix in "[0-9]{0,10}") {
            let inn = format!("{prefix}{bad}{suffix}");
            prop_assert!(!validate_inn(&inn));
        }

        #[test]
        fn prop_kpp_accepts_nine_digits(kpp in "[0-9]{9}") {
            prop_assert!(validate_kpp(&kpp));
        }

        #[test]
        fn prop_kpp_rejects_wrong_length(kpp in "[0-9]{0,8}|[0-9]{10,16}") {
            prop_assert!(!validate_kpp(&kpp));
        }

        #[test]
        fn prop_kpp_rejects_non_digit(prefix in "[0-9]{0,8}", bad in "[^0-9]", suffix in "[0-9]{0,8}") {
            let kpp = format!("{prefix}{bad}{suffix}");
            prop_assert!(!validate_kpp(&kpp));
        }

        #[test]
        fn prop_non_empty_text_accepted(text in ".+") {
            prop_assert!(validate_name(&text));
            prop_assert!(validate_address(&text));
        }

        #[test]
        fn prop_error_keys_match_failing_fields(
            name in ".{0,3}",
            inn in "[0-9a]{0,12}",
            address in ".{0,3}",
            kpp in "[0-9a]{0,10}",
        ) {
            let form = CounterpartyFormData::new(name.clone(), inn.clone(), address.clone(), kpp.clone());
            let errors = validate(&form);

            prop_assert_eq!(errors.get(FormField::Name).is_some(), !validate_name(&name));
            prop_assert_eq!(errors.get(FormField::Inn).is_some(), !validate_inn(&inn));
            prop_assert_eq!(errors.get(FormField::Address).is_some(), !validate_address(&address));
            prop_assert_eq!(errors.get(FormField::Kpp).is_some(), !validate_kpp(&kpp));
            prop_assert_eq!(is_valid(&form), errors.is_empty());
        }
    }
}

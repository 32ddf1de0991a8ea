use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::BookingDraft;

// International numbers carry 10-15 digits and never start with a zero.
static INTERNATIONAL_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{9,14}$").expect("international phone regex"));

// National numbers dialled with a trunk prefix, e.g. 07911123456.
static NATIONAL_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0\d{9,10}$").expect("national phone regex"));

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Form inputs that validation can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    StayFrom,
    StayTo,
    Phone,
    Email,
}

impl FormField {
    /// Element id of the input in the booking form.
    pub fn dom_id(self) -> &'static str {
        match self {
            FormField::StayFrom => "from",
            FormField::StayTo => "to",
            FormField::Phone => "phone",
            FormField::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please choose check-in and check-out dates")]
    MissingDates,
    #[error("Check-out date cannot be earlier than check-in")]
    DateOrder,
    #[error("Please enter a phone number or an email address")]
    MissingContact,
    #[error("Phone number looks invalid")]
    Phone,
    #[error("Email address looks invalid")]
    Email,
}

impl ValidationError {
    /// Fields the error is about. The first one receives focus.
    pub fn fields(self) -> &'static [FormField] {
        match self {
            ValidationError::MissingDates => &[FormField::StayFrom, FormField::StayTo],
            ValidationError::DateOrder => &[FormField::StayTo, FormField::StayFrom],
            ValidationError::MissingContact => &[FormField::Phone, FormField::Email],
            ValidationError::Phone => &[FormField::Phone],
            ValidationError::Email => &[FormField::Email],
        }
    }

    pub fn field(self) -> FormField {
        self.fields()[0]
    }

    pub fn concerns(self, field: FormField) -> bool {
        self.fields().contains(&field)
    }
}

pub fn date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if to >= from => Ok((from, to)),
        (Some(_), Some(_)) => Err(ValidationError::DateOrder),
        _ => Err(ValidationError::MissingDates),
    }
}

pub fn dates_valid(from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    date_range(from, to).is_ok()
}

/// Keep digits and a single leading `+`; everything else is dropped.
pub fn normalize_phone(raw: &str) -> String {
    let kept: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let leading_plus = kept.first() == Some(&'+');
    let mut out = String::with_capacity(kept.len());
    if leading_plus {
        out.push('+');
    }
    out.extend(kept.into_iter().filter(|c| c.is_ascii_digit()));
    out
}

pub fn phone_ok(raw: &str) -> bool {
    let phone = normalize_phone(raw);
    INTERNATIONAL_PHONE.is_match(&phone) || NATIONAL_PHONE.is_match(&phone)
}

pub fn email_ok(raw: &str) -> bool {
    EMAIL.is_match(raw.trim())
}

pub fn check_contacts(phone: &str, email: &str) -> Result<(), ValidationError> {
    let has_phone = !phone.trim().is_empty();
    let has_email = !email.trim().is_empty();
    if !has_phone && !has_email {
        return Err(ValidationError::MissingContact);
    }
    if has_phone && !phone_ok(phone) {
        return Err(ValidationError::Phone);
    }
    if has_email && !email_ok(email) {
        return Err(ValidationError::Email);
    }
    Ok(())
}

pub fn contacts_ok(phone: &str, email: &str) -> bool {
    check_contacts(phone, email).is_ok()
}

/// Guard for leaving the form towards the map.
pub fn validate_for_map(draft: &BookingDraft) -> Result<(), ValidationError> {
    date_range(draft.stay_from, draft.stay_to).map(|_| ())
}

/// Guard for the final confirm. Dates are checked before contacts.
pub fn validate_for_submit(
    draft: &BookingDraft,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let range = date_range(draft.stay_from, draft.stay_to)?;
    check_contacts(&draft.contact.phone, &draft.contact.email)?;
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_same_day_range_is_valid() {
        let d = date("2025-06-01");
        assert!(dates_valid(Some(d), Some(d)));
    }

    #[test]
    fn test_reversed_range_is_invalid() {
        assert_eq!(
            date_range(Some(date("2025-06-05")), Some(date("2025-06-01"))),
            Err(ValidationError::DateOrder)
        );
    }

    #[test]
    fn test_missing_date_is_invalid() {
        assert_eq!(
            date_range(Some(date("2025-06-05")), None),
            Err(ValidationError::MissingDates)
        );
        assert!(!dates_valid(None, None));
    }

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("+1 (202) 555-0123"), "+12025550123");
        assert_eq!(normalize_phone("8 912 345-67-89"), "89123456789");
    }

    #[test]
    fn test_normalize_phone_collapses_interior_plus() {
        assert_eq!(normalize_phone("+7+912+3456789"), "+79123456789");
        assert_eq!(normalize_phone("7+9123456789"), "79123456789");
    }

    #[test]
    fn test_normalize_phone_of_garbage_is_empty() {
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test]
    fn test_phone_predicate() {
        assert!(phone_ok("+12025550123"));
        assert!(phone_ok("+44 7911 123456"));
        assert!(phone_ok("07911 123456"));
        assert!(!phone_ok("12345"));
        assert!(!phone_ok("+0123456789012"));
        assert!(!phone_ok("+1234567890123456"));
        assert!(!phone_ok("abc"));
    }

    #[test]
    fn test_email_predicate() {
        assert!(email_ok("a@b.co"));
        assert!(email_ok("  guest.name+tag@camp.example.org "));
        assert!(!email_ok("not-an-email"));
        assert!(!email_ok("a@b"));
        assert!(!email_ok("a b@c.de"));
    }

    #[test]
    fn test_contacts_ok_cases() {
        assert!(!contacts_ok("", ""));
        assert!(contacts_ok("+12025550123", ""));
        assert!(!contacts_ok("", "not-an-email"));
        assert!(!contacts_ok("abc", "a@b.co"));
        assert!(contacts_ok("", "a@b.co"));
        assert!(contacts_ok("+12025550123", "a@b.co"));
    }

    #[test]
    fn test_whitespace_only_contacts_count_as_missing() {
        assert_eq!(
            check_contacts("   ", "\t"),
            Err(ValidationError::MissingContact)
        );
    }

    #[test]
    fn test_submit_checks_dates_first() {
        let draft = BookingDraft::default();
        assert_eq!(
            validate_for_submit(&draft),
            Err(ValidationError::MissingDates)
        );
    }

    #[test]
    fn test_submit_then_checks_contacts() {
        let mut draft = BookingDraft::default();
        draft.stay_from = Some(date("2025-06-01"));
        draft.stay_to = Some(date("2025-06-02"));
        assert_eq!(
            validate_for_submit(&draft),
            Err(ValidationError::MissingContact)
        );
        draft.contact.email = "a@b.co".to_string();
        assert!(validate_for_submit(&draft).is_ok());
    }

    #[test]
    fn test_error_fields() {
        assert_eq!(ValidationError::DateOrder.field(), FormField::StayTo);
        assert!(ValidationError::MissingContact.concerns(FormField::Email));
        assert!(!ValidationError::Phone.concerns(FormField::Email));
        assert_eq!(FormField::Phone.dom_id(), "phone");
    }
}

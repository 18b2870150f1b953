use crate::error::{Error, Result};
use serde::Deserialize;

/// Raw form fields as posted by the lead capture page.
///
/// Every field is optional on the wire; an absent field behaves exactly like
/// an empty one.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LeadForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub unit: Option<String>,
    pub strategy: Option<String>,
}

impl LeadForm {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Normalizes the form into a [`LeadSubmission`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubmission`] if the trimmed name is empty or
    /// the phone number does not normalize.
    pub fn validate(&self) -> Result<LeadSubmission> {
        let name = trimmed(self.name.as_deref());
        let phone = normalize_phone(self.phone.as_deref().unwrap_or_default()).unwrap_or_default();

        if name.is_empty() {
            return Err(Error::InvalidSubmission {
                reason: "name is required",
            });
        }
        if phone.is_empty() {
            return Err(Error::InvalidSubmission {
                reason: "a valid phone number is required",
            });
        }

        Ok(LeadSubmission {
            name,
            phone,
            unit: trimmed(self.unit.as_deref()),
            strategy: trimmed(self.strategy.as_deref()),
        })
    }
}

/// A validated submission. `name` and `phone` are guaranteed non-empty and
/// `phone` is in international digits-only form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    pub unit: String,
    pub strategy: String,
}

const COUNTRY_CODE: &str = "60";
const LOCAL_PREFIX: &str = "01";
const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 13;

/// Normalizes a Malaysian mobile number to digits-only international form.
///
/// All non-digits are stripped. A local `01…` number gains the `6` country
/// prefix (`0143317056` becomes `60143317056`). The result must start with
/// `60` and hold between 10 and 13 digits inclusive.
///
/// Returns `None` when the input cannot be normalized.
///
/// ```
/// use leadline::normalize_phone;
///
/// assert_eq!(normalize_phone("014-331 7056").as_deref(), Some("60143317056"));
/// assert_eq!(normalize_phone("+60 14-331 7056").as_deref(), Some("60143317056"));
/// assert_eq!(normalize_phone("143317056"), None);
/// ```
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.starts_with(LOCAL_PREFIX) {
        digits.replace_range(..1, COUNTRY_CODE);
    }
    if !digits.starts_with(COUNTRY_CODE) {
        return None;
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }
    Some(digits)
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_string()
}

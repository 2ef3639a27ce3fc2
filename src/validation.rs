//! Quote form validation
//!
//! Turns a [`RawLeadInput`] into a [`NormalizedLead`]. Every field is checked
//! independently and all failures are reported together, so the form can
//! highlight every problem in one round trip.
use crate::models::{NormalizedLead, PreferredTime, PropertyType, RawLeadInput};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const CITY_MIN_LEN: usize = 2;
pub const CITY_MAX_LEN: usize = 100;
pub const MESSAGE_MAX_LEN: usize = 500;

/// Indian mobile number with optional `91` / `+91` prefix.
/// Group 1 is the ten-digit subscriber number.
static INDIAN_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+91|91)?([6-9][0-9]{9})$").unwrap());

/// Local part ends on a non-dot; the top-level domain is two or more letters.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .unwrap()
});

/// Form fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadField {
    Name,
    Phone,
    Email,
    City,
    PropertyType,
    LoadKw,
    MonthlyBill,
    RoofArea,
    PreferredTime,
    Message,
    Consent,
}

impl LeadField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadField::Name => "name",
            LeadField::Phone => "phone",
            LeadField::Email => "email",
            LeadField::City => "city",
            LeadField::PropertyType => "propertyType",
            LeadField::LoadKw => "loadKw",
            LeadField::MonthlyBill => "monthlyBill",
            LeadField::RoofArea => "roofArea",
            LeadField::PreferredTime => "preferredTime",
            LeadField::Message => "message",
            LeadField::Consent => "consent",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation messages, one per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<LeadField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: LeadField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: LeadField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: LeadField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Collects the outcome of one field check.
    fn check<T>(&mut self, field: LeadField, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Validates a raw quote form and builds the normalized lead.
///
/// The load-or-bill rule is only evaluated once every field check passes;
/// its message is attached to `loadKw`.
pub fn validate(raw: &RawLeadInput) -> Result<NormalizedLead, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = errors.check(LeadField::Name, validate_name(raw.name.as_deref()));
    let phone = errors.check(
        LeadField::Phone,
        normalize_indian_phone(raw.phone.as_deref().unwrap_or_default())
            .ok_or_else(|| "Please enter a valid Indian phone number".to_string()),
    );
    let email = errors.check(LeadField::Email, validate_email(raw.email.as_deref()));
    let city = errors.check(LeadField::City, validate_city(raw.city.as_deref()));
    let property_type = errors.check(
        LeadField::PropertyType,
        raw.property_type
            .as_deref()
            .and_then(PropertyType::parse)
            .ok_or_else(|| "Please select a property type".to_string()),
    );
    let load_kw = errors.check(LeadField::LoadKw, parse_optional_number(raw.load_kw.as_deref()));
    let monthly_bill = errors.check(
        LeadField::MonthlyBill,
        parse_optional_number(raw.monthly_bill.as_deref()),
    );
    let roof_area = errors.check(
        LeadField::RoofArea,
        parse_optional_number(raw.roof_area.as_deref()),
    );
    let preferred_time = errors.check(
        LeadField::PreferredTime,
        raw.preferred_time
            .as_deref()
            .and_then(PreferredTime::parse)
            .ok_or_else(|| "Please select a preferred contact time".to_string()),
    );
    let message = errors.check(LeadField::Message, validate_message(raw.message.as_deref()));
    if !raw.consent {
        errors.add(
            LeadField::Consent,
            "You must agree to the terms and conditions",
        );
    }
    let recaptcha_token = raw
        .recaptcha_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    match (
        name,
        phone,
        email,
        city,
        property_type,
        load_kw,
        monthly_bill,
        roof_area,
        preferred_time,
        message,
    ) {
        (
            Some(name),
            Some(phone),
            Some(email),
            Some(city),
            Some(property_type),
            Some(load_kw),
            Some(monthly_bill),
            Some(roof_area),
            Some(preferred_time),
            Some(message),
        ) if errors.is_empty() => {
            if load_kw.is_none() && monthly_bill.is_none() {
                errors.add(
                    LeadField::LoadKw,
                    "Please provide either Connected Load (kW) or Monthly Bill amount",
                );
                return Err(errors);
            }

            Ok(NormalizedLead {
                name,
                phone,
                email,
                city,
                property_type,
                load_kw,
                monthly_bill,
                roof_area,
                preferred_time,
                message,
                recaptcha_token,
            })
        }
        _ => Err(errors),
    }
}

/// Normalizes an Indian mobile number to `+91XXXXXXXXXX`.
///
/// The raw value must already match `^(\+91|91)?[6-9]\d{9}$`; nothing is
/// stripped or reformatted beforehand. Returns `None` for anything else.
pub fn normalize_indian_phone(raw: &str) -> Option<String> {
    let captures = INDIAN_MOBILE.captures(raw)?;
    let subscriber = captures.get(1)?.as_str();
    Some(format!("+91{}", subscriber))
}

/// Email check matching what the quote form accepts in the browser.
///
/// No leading dot and no `..` anywhere; the regex covers the rest.
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL.is_match(email)
}

/// Empty or missing input means "not provided", never zero.
pub fn parse_optional_number(raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err("Please enter a valid number".to_string()),
    }
}

fn validate_name(raw: Option<&str>) -> Result<String, String> {
    let name = raw.unwrap_or_default();
    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        return Err("Name must be at least 2 characters".to_string());
    }
    if len > NAME_MAX_LEN {
        return Err("Name is too long".to_string());
    }
    Ok(name.to_string())
}

fn validate_city(raw: Option<&str>) -> Result<String, String> {
    let city = raw.unwrap_or_default();
    let len = city.chars().count();
    if len < CITY_MIN_LEN {
        return Err("City is required".to_string());
    }
    if len > CITY_MAX_LEN {
        return Err("City name is too long".to_string());
    }
    Ok(city.to_string())
}

fn validate_email(raw: Option<&str>) -> Result<Option<String>, String> {
    match raw {
        None | Some("") => Ok(None),
        Some(email) if is_valid_email(email) => Ok(Some(email.to_string())),
        Some(_) => Err("Please enter a valid email".to_string()),
    }
}

fn validate_message(raw: Option<&str>) -> Result<String, String> {
    let message = raw.unwrap_or_default();
    if message.chars().count() > MESSAGE_MAX_LEN {
        return Err("Message is too long".to_string());
    }
    Ok(message.to_string())
}

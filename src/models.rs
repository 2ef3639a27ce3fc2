use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Raw quote form payload, exactly as the user typed it.
///
/// Every field except `consent` is optional at this stage; presence and
/// format are enforced by [`crate::validation::validate`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLeadInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    /// Connected load in kW
    #[serde(default, deserialize_with = "string_or_number")]
    pub load_kw: Option<String>,
    /// Monthly electricity bill in rupees
    #[serde(default, deserialize_with = "string_or_number")]
    pub monthly_bill: Option<String>,
    /// Available rooftop area in sq ft
    #[serde(default, deserialize_with = "string_or_number")]
    pub roof_area: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub consent: bool,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// Browsers send `<input type="number">` values as strings, API clients
/// usually send JSON numbers. Both end up as the textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Kind of property the installation is quoted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyType {
    Residential,
    Commercial,
    Industrial,
    Farm,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Residential,
        PropertyType::Commercial,
        PropertyType::Industrial,
        PropertyType::Farm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "Residential",
            PropertyType::Commercial => "Commercial",
            PropertyType::Industrial => "Industrial",
            PropertyType::Farm => "Farm",
        }
    }

    /// Parses the select value submitted by the form (exact match).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preferred callback window. Wire labels use an en dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PreferredTime {
    #[serde(rename = "9 AM–12 PM")]
    Morning,
    #[serde(rename = "12 PM–3 PM")]
    Midday,
    #[serde(rename = "3 PM–6 PM")]
    Afternoon,
    #[serde(rename = "6 PM–9 PM")]
    Evening,
    #[serde(rename = "Anytime")]
    Anytime,
}

impl PreferredTime {
    pub const ALL: [PreferredTime; 5] = [
        PreferredTime::Morning,
        PreferredTime::Midday,
        PreferredTime::Afternoon,
        PreferredTime::Evening,
        PreferredTime::Anytime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PreferredTime::Morning => "9 AM–12 PM",
            PreferredTime::Midday => "12 PM–3 PM",
            PreferredTime::Afternoon => "3 PM–6 PM",
            PreferredTime::Evening => "6 PM–9 PM",
            PreferredTime::Anytime => "Anytime",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == value)
    }
}

impl fmt::Display for PreferredTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated quote request, ready to be posted to the quote API.
///
/// Fields are private: the only way to obtain one is
/// [`crate::validation::validate`], so every instance satisfies the field
/// rules and the load-or-bill rule. Serializes to the quote API wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLead {
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) email: Option<String>,
    pub(crate) city: String,
    #[serde(rename = "type")]
    pub(crate) property_type: PropertyType,
    #[serde(serialize_with = "whole_as_integer")]
    pub(crate) load_kw: Option<f64>,
    #[serde(serialize_with = "whole_as_integer")]
    pub(crate) monthly_bill: Option<f64>,
    #[serde(serialize_with = "whole_as_integer")]
    pub(crate) roof_area: Option<f64>,
    pub(crate) preferred_time: PreferredTime,
    pub(crate) message: String,
    pub(crate) recaptcha_token: Option<String>,
}

impl NormalizedLead {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical `+91XXXXXXXXXX` form.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn load_kw(&self) -> Option<f64> {
        self.load_kw
    }

    pub fn monthly_bill(&self) -> Option<f64> {
        self.monthly_bill
    }

    pub fn roof_area(&self) -> Option<f64> {
        self.roof_area
    }

    pub fn preferred_time(&self) -> PreferredTime {
        self.preferred_time
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn recaptcha_token(&self) -> Option<&str> {
        self.recaptcha_token.as_deref()
    }
}

/// Largest magnitude an `f64` holds with every integer exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes `3000.0` as `3000`, the way a JavaScript client would.
fn whole_as_integer<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
            serializer.serialize_i64(*n as i64)
        }
        Some(n) => serializer.serialize_f64(*n),
        None => serializer.serialize_none(),
    }
}

/// Body returned by the quote API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteApiResponse {
    #[serde(default)]
    pub success: Value,
    /// Only meaningful when it is a string; other types are ignored.
    #[serde(default)]
    pub message: Option<Value>,
}

impl QuoteApiResponse {
    /// The quote API is loosely typed; `success` is judged the way a
    /// JavaScript client would judge it.
    pub fn is_success(&self) -> bool {
        is_truthy(&self.success)
    }

    /// The explanation from the body, if it is a non-empty string.
    pub fn message_text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Response body of the intake endpoint.
#[derive(Debug, Serialize)]
pub struct QuoteIntakeResponse {
    pub success: bool,
    pub message: String,
}

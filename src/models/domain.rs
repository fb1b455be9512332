use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Guest record as returned to the browser after a lookup
///
/// Always built through `core::normalize::normalize_guest`, never decoded
/// directly from upstream JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestMatch {
    pub id: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl GuestMatch {
    /// Email of the matched record, if the registry knows one
    pub fn known_email(&self) -> Option<&str> {
        let email = self.email.trim();
        (!email.is_empty()).then_some(email)
    }
}

/// Skier ability classification used for binding release settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkierType {
    #[serde(rename = "I")]
    One,
    #[serde(rename = "II")]
    Two,
    #[serde(rename = "III")]
    Three,
}

impl SkierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkierType::One => "I",
            SkierType::Two => "II",
            SkierType::Three => "III",
        }
    }
}

impl fmt::Display for SkierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkierType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(SkierType::One),
            "II" => Ok(SkierType::Two),
            "III" => Ok(SkierType::Three),
            other => Err(format!("unknown skier type: {}", other)),
        }
    }
}

/// Lookup criteria after validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestQuery {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub dob: String,
    pub zip: String,
    pub phone: String,
}

/// Complete intake record after validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    #[serde(rename = "guestId")]
    pub guest_id: Option<String>,
    #[serde(flatten)]
    pub guest: GuestQuery,
    #[serde(rename = "skierType")]
    pub skier_type: SkierType,
    #[serde(rename = "weightLbs")]
    pub weight_lbs: f64,
    #[serde(rename = "heightIn")]
    pub height_in: f64,
    #[serde(rename = "shoeSize")]
    pub shoe_size: f64,
    pub email: String,
}

/// Outcome of a successful intake submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeResult {
    pub ok: bool,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

impl IntakeResult {
    pub fn accepted(reference: Option<String>) -> Self {
        Self {
            ok: true,
            reference,
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Step 1 request: identity fields used to search the guest registry
///
/// Fields stay optional here so that a partially filled form still decodes
/// and every problem can be reported at once by `core::validation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(from = "Map<String, Value>")]
pub struct LookupRequest {
    #[validate(required(message = "is required"), length(max = 60, message = "must be at most 60 characters"))]
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[validate(required(message = "is required"), length(max = 60, message = "must be at most 60 characters"))]
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Text fields that arrived as some other JSON type
    #[serde(skip)]
    pub mistyped: Vec<&'static str>,
}

/// Step 2 request: identity carried over from step 1 plus fitting details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(from = "Map<String, Value>")]
pub struct IntakeRequest {
    #[serde(rename = "guestId")]
    pub guest_id: Option<String>,
    #[validate(required(message = "is required"), length(max = 60, message = "must be at most 60 characters"))]
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[validate(required(message = "is required"), length(max = 60, message = "must be at most 60 characters"))]
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[validate(required(message = "is required"))]
    #[serde(rename = "skierType", skip_serializing_if = "Option::is_none")]
    pub skier_type: Option<String>,
    #[validate(required(message = "is required"), range(min = 30.0, max = 400.0, message = "must be between 30 and 400"))]
    #[serde(rename = "weightLbs", skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<f64>,
    #[validate(required(message = "is required"), range(min = 36.0, max = 84.0, message = "must be between 36 and 84"))]
    #[serde(rename = "heightIn", skip_serializing_if = "Option::is_none")]
    pub height_in: Option<f64>,
    #[validate(required(message = "is required"), range(min = 1.0, max = 18.0, message = "must be between 1 and 18"))]
    #[serde(rename = "shoeSize", skip_serializing_if = "Option::is_none")]
    pub shoe_size: Option<f64>,
    #[validate(
        required(message = "is required"),
        length(max = 200, message = "must be at most 200 characters"),
        custom(function = "crate::core::validation::email_rule", message = "must be a valid email")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Text fields that arrived as some other JSON type
    #[serde(skip)]
    pub mistyped: Vec<&'static str>,
}

impl From<Map<String, Value>> for LookupRequest {
    fn from(map: Map<String, Value>) -> Self {
        let mut body = Body::new(&map);
        Self {
            first_name: body.text("firstName", "first_name"),
            last_name: body.text("lastName", "last_name"),
            dob: body.text("dob", "dob"),
            zip: body.text("zip", "zip"),
            phone: body.text("phone", "phone"),
            mistyped: body.mistyped,
        }
    }
}

impl From<Map<String, Value>> for IntakeRequest {
    fn from(map: Map<String, Value>) -> Self {
        let mut body = Body::new(&map);
        Self {
            guest_id: body.text("guestId", "guest_id"),
            first_name: body.text("firstName", "first_name"),
            last_name: body.text("lastName", "last_name"),
            dob: body.text("dob", "dob"),
            zip: body.text("zip", "zip"),
            phone: body.text("phone", "phone"),
            skier_type: body.text("skierType", "skier_type"),
            weight_lbs: body.number("weightLbs", "weight_lbs"),
            height_in: body.number("heightIn", "height_in"),
            shoe_size: body.number("shoeSize", "shoe_size"),
            email: body.text("email", "email"),
            mistyped: body.mistyped,
        }
    }
}

/// Loose reader over a JSON object body
///
/// Looks fields up by wire name, then by snake_case alias. Type problems
/// are recorded instead of failing the whole body so that validation can
/// report them alongside every other violation.
struct Body<'a> {
    map: &'a Map<String, Value>,
    mistyped: Vec<&'static str>,
}

impl<'a> Body<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            mistyped: Vec::new(),
        }
    }

    fn get(&self, name: &str, alias: &str) -> Option<&'a Value> {
        let map = self.map;
        map.get(name).or_else(|| map.get(alias))
    }

    /// Trimmed string; blank strings count as absent
    fn text(&mut self, name: &'static str, alias: &str) -> Option<String> {
        match self.get(name, alias) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Some(_) => {
                self.mistyped.push(name);
                None
            }
        }
    }

    /// JSON numbers and numeric strings, the way HTML number inputs arrive
    /// when a client posts form values without converting them.
    ///
    /// Anything else becomes NaN and is reported as "must be a number".
    fn number(&self, name: &str, alias: &str) -> Option<f64> {
        match self.get(name, alias) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.parse::<f64>().unwrap_or(f64::NAN))
                }
            }
            Some(_) => Some(f64::NAN),
        }
    }
}

//! Field rules for both intake steps.
//!
//! The derive attributes on the request types cover presence, length and
//! numeric ranges; the pattern and date rules live here. Every rule runs
//! before anything is reported so a caller sees all problems at once.

use crate::models::{GuestQuery, IntakeRecord, IntakeRequest, LookupRequest, SkierType};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

pub const NAME_MAX_CHARS: usize = 60;
pub const EMAIL_MAX_CHARS: usize = 200;
pub const PHONE_CHARS: RangeInclusive<usize> = 7..=25;
pub const WEIGHT_LBS: RangeInclusive<f64> = 30.0..=400.0;
pub const HEIGHT_IN: RangeInclusive<f64> = 36.0..=84.0;
pub const SHOE_SIZE: RangeInclusive<f64> = 1.0..=18.0;

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip pattern"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+()\-.\s\d]+$").expect("phone pattern"));

/// Request field names (Rust, wire) in form order
const FIELDS: &[(&str, &str)] = &[
    ("guest_id", "guestId"),
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("dob", "dob"),
    ("zip", "zip"),
    ("phone", "phone"),
    ("skier_type", "skierType"),
    ("weight_lbs", "weightLbs"),
    ("height_in", "heightIn"),
    ("shoe_size", "shoeSize"),
    ("email", "email"),
];

/// A single broken rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// Every rule a request broke, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(Violation {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Wire names of the fields that failed, without duplicates
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for v in &self.0 {
            if !fields.contains(&v.field) {
                fields.push(v.field);
            }
        }
        fields
    }

    fn absorb(&mut self, errors: ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            let name = wire_name(field.as_ref());
            for err in errs.iter() {
                let detail = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                self.push(name, format!("{} {}", name, detail));
            }
        }
    }

    /// Report wrong-typed fields; a type error replaces any other message
    /// for that field
    fn mistyped(&mut self, fields: &[&'static str]) {
        self.0.retain(|v| !fields.contains(&v.field));
        for field in fields {
            self.push(*field, format!("{} must be a string", field));
        }
    }

    fn into_result<T>(mut self, value: Option<T>) -> Result<T, Violations> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => {
                self.0.sort_by_key(|v| field_rank(v.field));
                Err(self)
            }
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for Violations {}

fn wire_name(field: &str) -> &'static str {
    FIELDS
        .iter()
        .find(|(rust, wire)| *rust == field || *wire == field)
        .map(|(_, wire)| *wire)
        .unwrap_or("request")
}

fn field_rank(field: &str) -> usize {
    FIELDS
        .iter()
        .position(|(_, wire)| *wire == field)
        .unwrap_or(FIELDS.len())
}

/// Validate step 1 input against the clock at `now`
pub fn validate_lookup(req: &LookupRequest, now: DateTime<Utc>) -> Result<GuestQuery, Violations> {
    let mut violations = Violations::new();
    if let Err(errors) = req.validate() {
        violations.absorb(errors);
    }
    check_identity(
        &mut violations,
        req.dob.as_deref(),
        req.zip.as_deref(),
        req.phone.as_deref(),
        now,
    );
    violations.mistyped(&req.mistyped);

    let query = build_query(&req.first_name, &req.last_name, &req.dob, &req.zip, &req.phone);
    violations.into_result(query)
}

/// Validate step 2 input against the clock at `now`
pub fn validate_intake(req: &IntakeRequest, now: DateTime<Utc>) -> Result<IntakeRecord, Violations> {
    let mut violations = Violations::new();
    if let Err(errors) = req.validate() {
        violations.absorb(errors);
    }
    check_identity(
        &mut violations,
        req.dob.as_deref(),
        req.zip.as_deref(),
        req.phone.as_deref(),
        now,
    );
    violations.mistyped(&req.mistyped);

    let skier_type = match req.skier_type.as_deref() {
        Some(raw) => match raw.parse::<SkierType>() {
            Ok(t) => Some(t),
            Err(_) => {
                violations.push("skierType", "skierType must be one of [I, II, III]");
                None
            }
        },
        None => None,
    };
    for (field, value) in [
        ("weightLbs", req.weight_lbs),
        ("heightIn", req.height_in),
        ("shoeSize", req.shoe_size),
    ] {
        if value.is_some_and(f64::is_nan) {
            violations.push(field, format!("{} must be a number", field));
        }
    }

    let query = build_query(&req.first_name, &req.last_name, &req.dob, &req.zip, &req.phone);
    let record = match (query, skier_type, req.weight_lbs, req.height_in, req.shoe_size, &req.email) {
        (Some(guest), Some(skier_type), Some(weight_lbs), Some(height_in), Some(shoe_size), Some(email)) => {
            Some(IntakeRecord {
                guest_id: req.guest_id.clone(),
                guest,
                skier_type,
                weight_lbs,
                height_in,
                shoe_size,
                email: email.clone(),
            })
        }
        _ => None,
    };
    violations.into_result(record)
}

fn build_query(
    first_name: &Option<String>,
    last_name: &Option<String>,
    dob: &Option<String>,
    zip: &Option<String>,
    phone: &Option<String>,
) -> Option<GuestQuery> {
    Some(GuestQuery {
        first_name: first_name.clone()?,
        last_name: last_name.clone()?,
        dob: dob.clone()?,
        zip: zip.clone()?,
        phone: phone.clone()?,
    })
}

/// Pattern and date rules shared by both steps; absent values are left to
/// the `required` checks
fn check_identity(
    violations: &mut Violations,
    dob: Option<&str>,
    zip: Option<&str>,
    phone: Option<&str>,
    now: DateTime<Utc>,
) {
    if let Some(dob) = dob {
        match parse_dob(dob) {
            None => violations.push("dob", "dob must be a valid ISO date"),
            Some(parsed) if !parsed.is_before(now) => {
                violations.push("dob", "dob must be a date in the past")
            }
            Some(_) => {}
        }
    }
    if let Some(zip) = zip {
        if !is_valid_zip(zip) {
            violations.push("zip", "zip must be 12345 or 12345-6789");
        }
    }
    if let Some(phone) = phone {
        if !is_valid_phone(phone) {
            violations.push("phone", "phone must be 7-25 digits, spaces or + ( ) - . characters");
        }
    }
}

/// A parsed date of birth: either a calendar date or an exact instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dob {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
}

impl Dob {
    /// Calendar dates compare against today's UTC date, so a date-only dob
    /// of today is not in the past.
    pub fn is_before(&self, now: DateTime<Utc>) -> bool {
        match self {
            Dob::Date(date) => *date < now.date_naive(),
            Dob::Instant(instant) => *instant < now,
        }
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_dob(raw: &str) -> Option<Dob> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Dob::Date(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| Dob::Instant(dt.with_timezone(&Utc)))
}

pub fn is_valid_zip(zip: &str) -> bool {
    ZIP_RE.is_match(zip.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    PHONE_CHARS.contains(&phone.chars().count()) && PHONE_RE.is_match(phone)
}

/// Address syntax plus a domain of at least two labels
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.chars().count() <= EMAIL_MAX_CHARS
        && email.validate_email()
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.split('.').filter(|label| !label.is_empty()).count() >= 2)
}

/// `validator` hook for the email field
pub(crate) fn email_rule(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

//! Client-side form checks.
//!
//! These mirror the server rules but report one short, user-facing message
//! per field, the way the browser form shows them next to each input.

use crate::core::validation::{
    is_valid_email, is_valid_phone, is_valid_zip, parse_dob, HEIGHT_IN, NAME_MAX_CHARS, SHOE_SIZE,
    WEIGHT_LBS,
};
use crate::models::{GuestQuery, SkierType};
use chrono::{DateTime, Utc};
use std::ops::RangeInclusive;

/// Raw step 1 input, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupForm {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub zip: String,
    pub phone: String,
    /// Hidden honeypot; people never see it, so never fill it
    pub company: String,
}

impl LookupForm {
    pub fn honeypot_tripped(&self) -> bool {
        !self.company.is_empty()
    }

    /// Prefill from a previous lookup, e.g. after going back
    pub fn from_identity(identity: &GuestQuery) -> Self {
        Self {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            dob: identity.dob.clone(),
            zip: identity.zip.clone(),
            phone: identity.phone.clone(),
            company: String::new(),
        }
    }
}

/// Raw step 2 input, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FittingForm {
    pub skier_type: String,
    pub weight_lbs: String,
    pub height_in: String,
    pub shoe_size: String,
    pub email: String,
    pub consent: bool,
}

/// Checked step 2 values
#[derive(Debug, Clone, PartialEq)]
pub struct FittingDetails {
    pub skier_type: SkierType,
    pub weight_lbs: f64,
    pub height_in: f64,
    pub shoe_size: f64,
    pub email: String,
}

/// One message per invalid field, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMessages(Vec<(&'static str, &'static str)>);

impl FieldMessages {
    fn set(&mut self, field: &'static str, message: &'static str) {
        if self.get(field).is_none() {
            self.0.push((field, message));
        }
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().copied()
    }
}

/// Check step 1 and return the trimmed lookup criteria
pub fn check_lookup(form: &LookupForm, now: DateTime<Utc>) -> Result<GuestQuery, FieldMessages> {
    let mut messages = FieldMessages::default();

    for (field, value) in [("firstName", &form.first_name), ("lastName", &form.last_name)] {
        let value = value.trim();
        if value.is_empty() {
            messages.set(field, "Required.");
        } else if value.chars().count() > NAME_MAX_CHARS {
            messages.set(field, "Max 60 characters.");
        }
    }

    let dob = form.dob.trim();
    if dob.is_empty() {
        messages.set("dob", "Required.");
    } else if !parse_dob(dob).is_some_and(|d| d.is_before(now)) {
        messages.set("dob", "Enter a past date.");
    }

    if !is_valid_zip(&form.zip) {
        messages.set("zip", "ZIP 12345 or 12345-6789.");
    }
    if !is_valid_phone(&form.phone) {
        messages.set("phone", "Enter a valid phone.");
    }

    if !messages.is_empty() {
        return Err(messages);
    }
    Ok(GuestQuery {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        dob: dob.to_string(),
        zip: form.zip.trim().to_string(),
        phone: form.phone.trim().to_string(),
    })
}

/// Check step 2, including the consent box
pub fn check_fitting(form: &FittingForm) -> Result<FittingDetails, FieldMessages> {
    let mut messages = FieldMessages::default();

    let skier_type = form.skier_type.trim().parse::<SkierType>().ok();
    if skier_type.is_none() {
        messages.set("skierType", "Select");
    }

    let weight_lbs = measure(&form.weight_lbs, &WEIGHT_LBS);
    if weight_lbs.is_none() {
        messages.set("weightLbs", "30–400 lbs");
    }
    let height_in = measure(&form.height_in, &HEIGHT_IN);
    if height_in.is_none() {
        messages.set("heightIn", "36–84 in");
    }
    let shoe_size = measure(&form.shoe_size, &SHOE_SIZE);
    if shoe_size.is_none() {
        messages.set("shoeSize", "1–18 US");
    }

    let email = form.email.trim();
    if !is_valid_email(email) {
        messages.set("email", "Valid email required");
    }
    if !form.consent {
        messages.set("consent", "Required");
    }

    match (skier_type, weight_lbs, height_in, shoe_size) {
        (Some(skier_type), Some(weight_lbs), Some(height_in), Some(shoe_size)) if messages.is_empty() => {
            Ok(FittingDetails {
                skier_type,
                weight_lbs,
                height_in,
                shoe_size,
                email: email.to_string(),
            })
        }
        _ => Err(messages),
    }
}

fn measure(raw: &str, range: &RangeInclusive<f64>) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| range.contains(v))
}

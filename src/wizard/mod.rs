//! Headless two-screen intake wizard.
//!
//! The same flow the browser runs: look the guest up, pick a match or carry
//! on as new, then submit fitting details. Used by the `intake-desk`
//! terminal front-end and by end-to-end tests.

pub mod client;
pub mod controller;
pub mod form;
pub mod render;
pub mod session;

pub use client::{ClientError, HttpIntakeApi, IntakeApi};
pub use controller::{results_status, LookupOutcome, SubmitOutcome, WizardController};
pub use form::{check_fitting, check_lookup, FieldMessages, FittingDetails, FittingForm, LookupForm};
pub use render::{escape_html, match_meta, render_results};
pub use session::{CarriedFields, Screen, SessionError, WizardSession};

// Core intake rules
pub mod normalize;
pub mod validation;

pub use normalize::{normalize_guest, normalize_results};
pub use validation::{validate_intake, validate_lookup, Violation, Violations};

use crate::models::{GuestMatch, GuestQuery};
use thiserror::Error;

/// Which of the two screens is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Lookup,
    Fitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no lookup has completed yet")]
    NoLookup,
    #[error("no match at position {0}")]
    NoSuchMatch(usize),
}

/// State of one wizard run, shared by its two screens
///
/// Transitions return a new session and leave the old one untouched, so
/// independent wizards (one per tab or desk terminal) never interfere.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WizardSession {
    screen: Screen,
    identity: Option<GuestQuery>,
    matches: Vec<GuestMatch>,
    selected: Option<GuestMatch>,
}

/// Step 1 values carried into step 2's hidden fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedFields {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub zip: String,
    pub phone: String,
    /// Selected match id, empty for a new guest
    pub guest_id: String,
    /// Email to prefill from the selected match
    pub email: Option<String>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Step 1 values captured by the last successful lookup
    pub fn identity(&self) -> Option<&GuestQuery> {
        self.identity.as_ref()
    }

    pub fn matches(&self) -> &[GuestMatch] {
        &self.matches
    }

    pub fn selected(&self) -> Option<&GuestMatch> {
        self.selected.as_ref()
    }

    /// Record a completed lookup; results are shown on the lookup screen
    pub fn with_matches(&self, identity: GuestQuery, matches: Vec<GuestMatch>) -> Self {
        Self {
            screen: Screen::Lookup,
            identity: Some(identity),
            matches,
            selected: None,
        }
    }

    /// Proceed to fitting details as a new guest
    pub fn continue_as_new(&self) -> Result<Self, SessionError> {
        self.to_fitting(None)
    }

    /// Proceed to fitting details for the match at `index`
    pub fn select(&self, index: usize) -> Result<Self, SessionError> {
        let chosen = self
            .matches
            .get(index)
            .cloned()
            .ok_or(SessionError::NoSuchMatch(index))?;
        self.to_fitting(Some(chosen))
    }

    fn to_fitting(&self, selected: Option<GuestMatch>) -> Result<Self, SessionError> {
        if self.identity.is_none() {
            return Err(SessionError::NoLookup);
        }
        Ok(Self {
            screen: Screen::Fitting,
            selected,
            ..self.clone()
        })
    }

    /// Return to the lookup screen keeping what was captured
    pub fn back(&self) -> Self {
        Self {
            screen: Screen::Lookup,
            ..self.clone()
        }
    }

    pub fn carried_fields(&self) -> Option<CarriedFields> {
        let identity = self.identity.as_ref()?;
        let selected = self.selected.as_ref();
        Some(CarriedFields {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            dob: identity.dob.clone(),
            zip: identity.zip.clone(),
            phone: identity.phone.clone(),
            guest_id: selected.and_then(|m| m.id.clone()).unwrap_or_default(),
            email: selected.and_then(GuestMatch::known_email).map(str::to_string),
        })
    }

    /// Summary shown above the fitting form
    pub fn summary_line(&self) -> Option<String> {
        let identity = self.identity.as_ref()?;
        let kind = if self.selected.is_some() {
            "(Matched profile)"
        } else {
            "(New guest)"
        };
        Some(format!(
            "{} {} • DOB: {} • ZIP: {} • Phone: {} {}",
            identity.first_name, identity.last_name, identity.dob, identity.zip, identity.phone, kind
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> GuestQuery {
        GuestQuery {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            dob: "1990-05-01".into(),
            zip: "03301".into(),
            phone: "603-555-0100".into(),
        }
    }

    fn guest(id: &str, email: &str) -> GuestMatch {
        GuestMatch {
            id: Some(id.into()),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            ..GuestMatch::default()
        }
    }

    #[test]
    fn test_zero_matches_can_continue_as_new() {
        let session = WizardSession::new().with_matches(identity(), vec![]);
        let next = session.continue_as_new().unwrap();

        assert_eq!(next.screen(), Screen::Fitting);
        let carried = next.carried_fields().unwrap();
        assert_eq!(carried.guest_id, "");
        assert_eq!(carried.email, None);
        assert_eq!(carried.first_name, "Ada");
        assert!(next.summary_line().unwrap().ends_with("(New guest)"));
    }

    #[test]
    fn test_select_carries_id_and_email() {
        let session = WizardSession::new()
            .with_matches(identity(), vec![guest("G-1001", "a@example.com"), guest("G-1002", "")]);

        let first = session.select(0).unwrap();
        let carried = first.carried_fields().unwrap();
        assert_eq!(carried.guest_id, "G-1001");
        assert_eq!(carried.email.as_deref(), Some("a@example.com"));
        assert_eq!(
            first.summary_line().unwrap(),
            "Ada Lovelace • DOB: 1990-05-01 • ZIP: 03301 • Phone: 603-555-0100 (Matched profile)"
        );

        let second = session.select(1).unwrap();
        assert_eq!(second.carried_fields().unwrap().email, None);
    }

    #[test]
    fn test_transitions_leave_previous_untouched() {
        let session = WizardSession::new().with_matches(identity(), vec![guest("G-1", "")]);
        let _ = session.select(0).unwrap();

        assert_eq!(session.screen(), Screen::Lookup);
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_back_keeps_identity() {
        let fitting = WizardSession::new()
            .with_matches(identity(), vec![guest("G-1", "")])
            .select(0)
            .unwrap();
        let back = fitting.back();

        assert_eq!(back.screen(), Screen::Lookup);
        assert_eq!(back.identity(), Some(&identity()));
        assert_eq!(back.matches().len(), 1);
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(WizardSession::new().continue_as_new(), Err(SessionError::NoLookup));

        let session = WizardSession::new().with_matches(identity(), vec![]);
        assert_eq!(session.select(0), Err(SessionError::NoSuchMatch(0)));
    }
}

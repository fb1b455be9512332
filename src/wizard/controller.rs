use crate::models::{GuestMatch, IntakeRequest, LookupRequest};
use crate::wizard::client::IntakeApi;
use crate::wizard::form::{check_fitting, check_lookup, FieldMessages, FittingForm, LookupForm};
use crate::wizard::session::{Screen, WizardSession};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of submitting the lookup screen
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Honeypot filled: nothing was sent
    Blocked,
    Invalid(FieldMessages),
    /// Another submission from this wizard is still in flight
    Busy,
    Failed(String),
    /// Lookup done; the session now holds the matches (possibly none)
    Found(WizardSession),
}

/// Result of submitting the fitting screen
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The session is not on the fitting screen
    NotReady,
    Invalid(FieldMessages),
    Busy,
    Failed(String),
    /// Accepted; the wizard starts over with a fresh session
    Submitted {
        reference: Option<String>,
        session: WizardSession,
    },
}

/// Drives one wizard against the intake API
///
/// At most one submission is in flight per controller, matching the
/// disabled submit button in the browser.
pub struct WizardController<A> {
    api: A,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: IntakeApi> WizardController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn submit_lookup(&self, session: &WizardSession, form: &LookupForm) -> LookupOutcome {
        if form.honeypot_tripped() {
            tracing::warn!("Lookup blocked by honeypot");
            return LookupOutcome::Blocked;
        }

        let identity = match check_lookup(form, Utc::now()) {
            Ok(identity) => identity,
            Err(messages) => return LookupOutcome::Invalid(messages),
        };

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return LookupOutcome::Busy;
        };

        let request = LookupRequest {
            first_name: Some(identity.first_name.clone()),
            last_name: Some(identity.last_name.clone()),
            dob: Some(identity.dob.clone()),
            zip: Some(identity.zip.clone()),
            phone: Some(identity.phone.clone()),
            mistyped: Vec::new(),
        };

        match self.api.lookup(&request).await {
            Ok(matches) => LookupOutcome::Found(session.with_matches(identity, matches)),
            Err(e) => LookupOutcome::Failed(e.to_string()),
        }
    }

    pub async fn submit_fitting(&self, session: &WizardSession, form: &FittingForm) -> SubmitOutcome {
        let carried = match session.carried_fields() {
            Some(carried) if session.screen() == Screen::Fitting => carried,
            _ => return SubmitOutcome::NotReady,
        };

        let details = match check_fitting(form) {
            Ok(details) => details,
            Err(messages) => return SubmitOutcome::Invalid(messages),
        };

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return SubmitOutcome::Busy;
        };

        let request = IntakeRequest {
            guest_id: Some(carried.guest_id).filter(|id| !id.is_empty()),
            first_name: Some(carried.first_name),
            last_name: Some(carried.last_name),
            dob: Some(carried.dob),
            zip: Some(carried.zip),
            phone: Some(carried.phone),
            skier_type: Some(details.skier_type.to_string()),
            weight_lbs: Some(details.weight_lbs),
            height_in: Some(details.height_in),
            shoe_size: Some(details.shoe_size),
            email: Some(details.email),
            mistyped: Vec::new(),
        };

        match self.api.intake(&request).await {
            Ok(result) => SubmitOutcome::Submitted {
                reference: result.reference,
                session: WizardSession::new(),
            },
            Err(e) => SubmitOutcome::Failed(e.to_string()),
        }
    }
}

/// Status line shown under the lookup results
pub fn results_status(matches: &[GuestMatch]) -> &'static str {
    if matches.is_empty() {
        "No matches found. You can continue as a new guest."
    } else {
        "Select your profile or continue as new."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuestQuery, IntakeResult};
    use crate::wizard::client::ClientError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Records requests and answers from canned data
    #[derive(Default)]
    struct RecordingApi {
        lookups: AtomicUsize,
        intakes: Mutex<Vec<IntakeRequest>>,
        matches: Vec<GuestMatch>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl IntakeApi for RecordingApi {
        async fn lookup(&self, _req: &LookupRequest) -> Result<Vec<GuestMatch>, ClientError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(ClientError::Rejected {
                    status: 502,
                    message: message.clone(),
                }),
                None => Ok(self.matches.clone()),
            }
        }

        async fn intake(&self, req: &IntakeRequest) -> Result<IntakeResult, ClientError> {
            self.intakes.lock().unwrap().push(req.clone());
            Ok(IntakeResult::accepted(Some("MOCK-1".into())))
        }
    }

    fn lookup_form() -> LookupForm {
        LookupForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            dob: "1990-05-01".into(),
            zip: "03301".into(),
            phone: "603-555-0100".into(),
            company: String::new(),
        }
    }

    fn fitting_form() -> FittingForm {
        FittingForm {
            skier_type: "II".into(),
            weight_lbs: "150".into(),
            height_in: "66".into(),
            shoe_size: "9".into(),
            email: String::new(),
            consent: true,
        }
    }

    fn matched(id: &str, email: &str) -> GuestMatch {
        GuestMatch {
            id: Some(id.into()),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            ..GuestMatch::default()
        }
    }

    #[tokio::test]
    async fn test_honeypot_sends_nothing() {
        let controller = WizardController::new(RecordingApi::default());
        let mut form = lookup_form();
        form.company = "Bots Inc".into();

        let outcome = controller.submit_lookup(&WizardSession::new(), &form).await;

        assert_eq!(outcome, LookupOutcome::Blocked);
        assert_eq!(controller.api.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let controller = WizardController::new(RecordingApi::default());
        let mut form = lookup_form();
        form.zip = "3301".into();

        let outcome = controller.submit_lookup(&WizardSession::new(), &form).await;

        assert!(matches!(outcome, LookupOutcome::Invalid(ref m) if m.get("zip").is_some()));
        assert_eq!(controller.api.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_lookup_reports_message() {
        let api = RecordingApi {
            fail_with: Some("Upstream error: registry offline".into()),
            ..RecordingApi::default()
        };
        let controller = WizardController::new(api);

        let outcome = controller.submit_lookup(&WizardSession::new(), &lookup_form()).await;

        assert_eq!(outcome, LookupOutcome::Failed("Upstream error: registry offline".into()));
    }

    #[tokio::test]
    async fn test_new_guest_flow() {
        let controller = WizardController::new(RecordingApi::default());

        let LookupOutcome::Found(session) =
            controller.submit_lookup(&WizardSession::new(), &lookup_form()).await
        else {
            panic!("lookup should succeed");
        };
        assert!(session.matches().is_empty());
        assert_eq!(results_status(session.matches()), "No matches found. You can continue as a new guest.");

        let session = session.continue_as_new().unwrap();
        let mut form = fitting_form();
        form.email = "ada@example.com".into();

        let outcome = controller.submit_fitting(&session, &form).await;
        assert!(matches!(outcome, SubmitOutcome::Submitted { reference: Some(ref r), .. } if r == "MOCK-1"));

        let sent = controller.api.intakes.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].guest_id, None);
        assert_eq!(sent[0].first_name.as_deref(), Some("Ada"));
        assert_eq!(sent[0].skier_type.as_deref(), Some("II"));
    }

    #[tokio::test]
    async fn test_matched_guest_flow_uses_prefilled_email() {
        let api = RecordingApi {
            matches: vec![matched("G-1001", "test1@example.com"), matched("G-1002", "")],
            ..RecordingApi::default()
        };
        let controller = WizardController::new(api);

        let LookupOutcome::Found(session) =
            controller.submit_lookup(&WizardSession::new(), &lookup_form()).await
        else {
            panic!("lookup should succeed");
        };
        let session = session.select(0).unwrap();
        let carried = session.carried_fields().unwrap();
        assert_eq!(carried.guest_id, "G-1001");

        let mut form = fitting_form();
        form.email = carried.email.unwrap();
        controller.submit_fitting(&session, &form).await;

        let sent = controller.api.intakes.lock().unwrap();
        assert_eq!(sent[0].guest_id.as_deref(), Some("G-1001"));
        assert_eq!(sent[0].email.as_deref(), Some("test1@example.com"));
    }

    #[tokio::test]
    async fn test_fitting_requires_fitting_screen() {
        let controller = WizardController::new(RecordingApi::default());
        let session = WizardSession::new().with_matches(
            GuestQuery {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                dob: "1990-05-01".into(),
                zip: "03301".into(),
                phone: "603-555-0100".into(),
            },
            vec![],
        );

        let outcome = controller.submit_fitting(&session, &fitting_form()).await;
        assert_eq!(outcome, SubmitOutcome::NotReady);
    }

    #[tokio::test]
    async fn test_busy_while_in_flight() {
        let controller = WizardController::new(RecordingApi::default());
        let guard = InFlight::acquire(&controller.in_flight).unwrap();

        let outcome = controller.submit_lookup(&WizardSession::new(), &lookup_form()).await;
        assert_eq!(outcome, LookupOutcome::Busy);

        drop(guard);
        let outcome = controller.submit_lookup(&WizardSession::new(), &lookup_form()).await;
        assert!(matches!(outcome, LookupOutcome::Found(_)));
    }
}

use crate::models::{GuestMatch, GuestQuery, IntakeRecord};
use crate::services::{GuestRegistry, UpstreamError};
use async_trait::async_trait;

/// Deterministic stand-in for the upstream registry
///
/// A last name of "test" yields two matches so the multi-result screen can
/// be exercised; any other name yields one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRegistry;

impl MockRegistry {
    pub fn new() -> Self {
        Self
    }

    fn synthetic(query: &GuestQuery, id: &str, email: &str) -> GuestMatch {
        GuestMatch {
            id: Some(id.to_string()),
            first_name: query.first_name.clone(),
            last_name: query.last_name.clone(),
            dob: query.dob.clone(),
            zip: query.zip.clone(),
            phone: query.phone.clone(),
            email: email.to_string(),
        }
    }
}

#[async_trait]
impl GuestRegistry for MockRegistry {
    async fn search_guests(&self, query: &GuestQuery) -> Result<Vec<GuestMatch>, UpstreamError> {
        if query.last_name.eq_ignore_ascii_case("test") {
            return Ok(vec![
                Self::synthetic(query, "G-1001", "test1@example.com"),
                Self::synthetic(query, "G-1002", "test2@example.com"),
            ]);
        }
        Ok(vec![Self::synthetic(query, "G-9999", "guest@example.com")])
    }

    async fn submit_intake(&self, _record: &IntakeRecord) -> Result<Option<String>, UpstreamError> {
        Ok(Some(format!("MOCK-{}", chrono::Utc::now().timestamp_millis())))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkierType;

    fn query(last_name: &str) -> GuestQuery {
        GuestQuery {
            first_name: "Ada".into(),
            last_name: last_name.into(),
            dob: "1990-05-01".into(),
            zip: "03301".into(),
            phone: "603-555-0100".into(),
        }
    }

    #[tokio::test]
    async fn test_test_surname_returns_two_matches() {
        let matches = MockRegistry::new().search_guests(&query("TeSt")).await.unwrap();
        let ids: Vec<_> = matches.iter().map(|m| m.id.clone().unwrap()).collect();

        assert_eq!(ids, vec!["G-1001", "G-1002"]);
        assert_eq!(matches[0].email, "test1@example.com");
        assert_eq!(matches[1].last_name, "TeSt");
    }

    #[tokio::test]
    async fn test_other_surname_returns_one_match() {
        let matches = MockRegistry::new().search_guests(&query("Lovelace")).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id.as_deref(), Some("G-9999"));
        assert_eq!(matches[0].zip, "03301");
    }

    #[tokio::test]
    async fn test_submit_returns_mock_reference() {
        let record = IntakeRecord {
            guest_id: None,
            guest: query("Lovelace"),
            skier_type: SkierType::One,
            weight_lbs: 120.0,
            height_in: 60.0,
            shoe_size: 7.0,
            email: "ada@example.com".into(),
        };

        let reference = MockRegistry::new().submit_intake(&record).await.unwrap().unwrap();
        let digits = reference.strip_prefix("MOCK-").unwrap();

        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}

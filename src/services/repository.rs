use crate::models::{
    FounderMatch, FounderProfile, FounderProfileWithUser, Industry, MatchStatus, ProfileFields,
    Skill, WorkStyle,
};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by a founder repository backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Backend returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Filter for listing match records.
///
/// All set fields must hold. `participant` matches records where the
/// profile is on either side, evaluated as one query by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchQuery {
    pub founder_id: Option<String>,
    pub matched_founder_id: Option<String>,
    pub participant: Option<String>,
    pub status: Option<MatchStatus>,
}

impl MatchQuery {
    pub fn sent_by(profile_id: &str) -> Self {
        Self {
            founder_id: Some(profile_id.to_string()),
            ..Default::default()
        }
    }

    pub fn received_by(profile_id: &str) -> Self {
        Self {
            matched_founder_id: Some(profile_id.to_string()),
            ..Default::default()
        }
    }

    pub fn involving(profile_id: &str) -> Self {
        Self {
            participant: Some(profile_id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Evaluate the query against a single record
    pub fn matches(&self, record: &FounderMatch) -> bool {
        self.founder_id.as_deref().map_or(true, |id| record.founder_id == id)
            && self
                .matched_founder_id
                .as_deref()
                .map_or(true, |id| record.matched_founder_id == id)
            && self.participant.as_deref().map_or(true, |id| record.involves(id))
            && self.status.map_or(true, |s| record.status == s)
    }
}

/// Storage of founder profiles, match records and reference lists.
///
/// Carried in `AppState` as `Arc<dyn FounderRepository>`.
#[async_trait]
pub trait FounderRepository: Send + Sync {
    /// Skills ordered by name
    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError>;

    /// Industries ordered by name
    async fn list_industries(&self) -> Result<Vec<Industry>, RepositoryError>;

    /// Work styles ordered by name
    async fn list_work_styles(&self) -> Result<Vec<WorkStyle>, RepositoryError>;

    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<FounderProfile>, RepositoryError>;

    async fn get_profile(&self, profile_id: &str) -> Result<Option<FounderProfile>, RepositoryError>;

    async fn get_profile_with_user(
        &self,
        profile_id: &str,
    ) -> Result<Option<FounderProfileWithUser>, RepositoryError>;

    async fn insert_profile(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<FounderProfile, RepositoryError>;

    async fn update_profile(
        &self,
        profile_id: &str,
        fields: &ProfileFields,
    ) -> Result<FounderProfile, RepositoryError>;

    /// Every profile except the one owned by `exclude_user_id`
    async fn list_candidates(
        &self,
        exclude_user_id: &str,
    ) -> Result<Vec<FounderProfileWithUser>, RepositoryError>;

    /// Ids of profiles `founder_profile_id` has a match record towards, any status
    async fn list_existing_match_targets(
        &self,
        founder_profile_id: &str,
    ) -> Result<HashSet<String>, RepositoryError>;

    async fn get_match(&self, match_id: &str) -> Result<Option<FounderMatch>, RepositoryError>;

    async fn list_matches(&self, query: &MatchQuery) -> Result<Vec<FounderMatch>, RepositoryError>;

    /// Insert a new pending match
    async fn insert_match(
        &self,
        founder_id: &str,
        matched_founder_id: &str,
    ) -> Result<FounderMatch, RepositoryError>;

    async fn set_match_status(
        &self,
        match_id: &str,
        status: MatchStatus,
    ) -> Result<FounderMatch, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(from: &str, to: &str, status: MatchStatus) -> FounderMatch {
        FounderMatch {
            id: format!("{}-{}", from, to),
            founder_id: from.to_string(),
            matched_founder_id: to.to_string(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_participant_query_matches_either_side() {
        let query = MatchQuery::involving("a").with_status(MatchStatus::Accepted);
        assert!(query.matches(&record("a", "b", MatchStatus::Accepted)));
        assert!(query.matches(&record("b", "a", MatchStatus::Accepted)));
        assert!(!query.matches(&record("b", "a", MatchStatus::Pending)));
        assert!(!query.matches(&record("b", "c", MatchStatus::Accepted)));
    }

    #[test]
    fn test_directional_queries() {
        let rec = record("a", "b", MatchStatus::Pending);
        assert!(MatchQuery::sent_by("a").matches(&rec));
        assert!(!MatchQuery::sent_by("b").matches(&rec));
        assert!(MatchQuery::received_by("b").matches(&rec));
        assert!(MatchQuery::default().matches(&rec));
    }
}

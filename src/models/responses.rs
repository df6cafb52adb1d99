use serde::{Deserialize, Serialize};
use crate::models::domain::ScoredCandidate;

/// Response for the potential matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialMatchesResponse {
    pub matches: Vec<ScoredCandidate>,
    /// Candidates left after excluding self and already-requested profiles
    pub total_candidates: usize,
    /// Candidates left after the search and facet filters
    pub total_results: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Saved profiles for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfilesResponse {
    pub user_id: String,
    pub saved_profiles: Vec<String>,
    pub count: usize,
}

/// Result of toggling a bookmark
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSavedResponse {
    pub profile_id: String,
    pub saved: bool,
}

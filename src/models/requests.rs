use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::core::CandidateFilter;
use crate::models::domain::{FounderProfileInput, FounderProfileUpdate, MatchStatus, StartupStage};

/// Request for ranked, filtered potential co-founders
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PotentialMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    #[serde(alias = "searchTerm", rename = "search")]
    pub search: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    #[serde(alias = "startup_stage", rename = "startupStage")]
    pub startup_stage: Vec<StartupStage>,
    #[serde(default)]
    #[serde(alias = "work_styles", rename = "workStyles")]
    pub work_styles: Vec<String>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

impl PotentialMatchesRequest {
    pub fn filter(&self) -> CandidateFilter {
        CandidateFilter {
            search: self.search.clone(),
            skills: self.skills.iter().cloned().collect(),
            industries: self.industries.iter().cloned().collect(),
            startup_stages: self.startup_stage.iter().copied().collect(),
            work_styles: self.work_styles.iter().cloned().collect(),
        }
    }
}

/// Create a founder profile for `user_id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub profile: FounderProfileInput,
}

/// Edit an existing founder profile as `user_id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub update: FounderProfileUpdate,
}

/// Send a match request from the user's profile to `matched_founder_id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "matched_founder_id", rename = "matchedFounderId")]
    pub matched_founder_id: String,
}

/// Accept or reject a received match request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RespondToMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    pub status: MatchStatus,
}

/// Bookmark or un-bookmark a candidate profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleSavedRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: String,
}

/// `?userId=` query string
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

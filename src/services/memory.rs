use crate::models::{
    FounderMatch, FounderProfile, FounderProfileWithUser, Industry, MatchStatus, ProfileFields,
    Skill, UserSummary, WorkStyle,
};
use crate::services::repository::{FounderRepository, MatchQuery, RepositoryError};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    skills: Vec<Skill>,
    industries: Vec<Industry>,
    work_styles: Vec<WorkStyle>,
    users: HashMap<String, UserSummary>,
    // insertion order is the listing order
    profiles: Vec<FounderProfile>,
    matches: Vec<FounderMatch>,
}

/// Reference lists used to seed the in-memory backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceData {
    pub skills: Vec<Skill>,
    pub industries: Vec<Industry>,
    pub work_styles: Vec<WorkStyle>,
}

/// Process-local repository backend.
///
/// Used by the test-suite and by the `memory` backend for local
/// development. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-loaded with reference lists
    pub fn with_reference_data(
        skills: Vec<Skill>,
        industries: Vec<Industry>,
        work_styles: Vec<WorkStyle>,
    ) -> Self {
        Self {
            state: RwLock::new(State {
                skills,
                industries,
                work_styles,
                ..Default::default()
            }),
        }
    }

    pub fn from_reference_data(data: ReferenceData) -> Self {
        Self::with_reference_data(data.skills, data.industries, data.work_styles)
    }

    /// Register the display info joined onto this user's profile
    pub async fn upsert_user(&self, user: UserSummary) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }
}

impl State {
    fn with_user(&self, profile: &FounderProfile) -> FounderProfileWithUser {
        let user = self.users.get(&profile.user_id).cloned().unwrap_or_else(|| UserSummary {
            id: profile.user_id.clone(),
            full_name: String::new(),
            bio: String::new(),
            avatar_url: None,
        });
        FounderProfileWithUser {
            profile: profile.clone(),
            user,
        }
    }
}

fn sorted_by_name<T: Clone>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| name(a).cmp(name(b)));
    out
}

#[async_trait]
impl FounderRepository for InMemoryRepository {
    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError> {
        Ok(sorted_by_name(&self.state.read().await.skills, |s| s.name.as_str()))
    }

    async fn list_industries(&self) -> Result<Vec<Industry>, RepositoryError> {
        Ok(sorted_by_name(&self.state.read().await.industries, |i| i.name.as_str()))
    }

    async fn list_work_styles(&self) -> Result<Vec<WorkStyle>, RepositoryError> {
        Ok(sorted_by_name(&self.state.read().await.work_styles, |w| w.name.as_str()))
    }

    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<FounderProfile>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Option<FounderProfile>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| p.id == profile_id).cloned())
    }

    async fn get_profile_with_user(
        &self,
        profile_id: &str,
    ) -> Result<Option<FounderProfileWithUser>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .find(|p| p.id == profile_id)
            .map(|p| state.with_user(p)))
    }

    async fn insert_profile(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<FounderProfile, RepositoryError> {
        let mut state = self.state.write().await;
        if state.profiles.iter().any(|p| p.user_id == user_id) {
            return Err(RepositoryError::Conflict(format!(
                "Founder profile already exists for user {}",
                user_id
            )));
        }

        let now = Utc::now();
        let profile = FounderProfile {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            skills: fields.skills.clone(),
            industries: fields.industries.clone(),
            startup_stage: fields.startup_stage,
            work_style: fields.work_style.clone(),
            goals: fields.goals.clone(),
            experience: fields.experience.clone(),
            seeking: fields.seeking.clone(),
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(profile.clone());

        Ok(profile)
    }

    async fn update_profile(
        &self,
        profile_id: &str,
        fields: &ProfileFields,
    ) -> Result<FounderProfile, RepositoryError> {
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Founder profile {}", profile_id)))?;

        profile.skills = fields.skills.clone();
        profile.industries = fields.industries.clone();
        profile.startup_stage = fields.startup_stage;
        profile.work_style = fields.work_style.clone();
        profile.goals = fields.goals.clone();
        profile.experience = fields.experience.clone();
        profile.seeking = fields.seeking.clone();
        profile.updated_at = Utc::now();

        Ok(profile.clone())
    }

    async fn list_candidates(
        &self,
        exclude_user_id: &str,
    ) -> Result<Vec<FounderProfileWithUser>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .filter(|p| p.user_id != exclude_user_id)
            .map(|p| state.with_user(p))
            .collect())
    }

    async fn list_existing_match_targets(
        &self,
        founder_profile_id: &str,
    ) -> Result<HashSet<String>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .iter()
            .filter(|m| m.founder_id == founder_profile_id)
            .map(|m| m.matched_founder_id.clone())
            .collect())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<FounderMatch>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.matches.iter().find(|m| m.id == match_id).cloned())
    }

    async fn list_matches(&self, query: &MatchQuery) -> Result<Vec<FounderMatch>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.matches.iter().filter(|m| query.matches(m)).cloned().collect())
    }

    async fn insert_match(
        &self,
        founder_id: &str,
        matched_founder_id: &str,
    ) -> Result<FounderMatch, RepositoryError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let record = FounderMatch {
            id: uuid::Uuid::new_v4().to_string(),
            founder_id: founder_id.to_string(),
            matched_founder_id: matched_founder_id.to_string(),
            status: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.matches.push(record.clone());

        Ok(record)
    }

    async fn set_match_status(
        &self,
        match_id: &str,
        status: MatchStatus,
    ) -> Result<FounderMatch, RepositoryError> {
        let mut state = self.state.write().await;
        let record = state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Match {}", match_id)))?;

        record.status = status;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }
}

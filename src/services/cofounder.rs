use crate::core::{
    check_transition, plan_match_request, CandidateFilter, MatchResult, Matcher, RematchPolicy,
    RequestPlan, WorkflowError,
};
use crate::models::{
    FounderMatch, FounderProfile, FounderProfileInput, FounderProfileUpdate, Industry,
    MatchStatus, MatchWithCounterpart, ProfileFields, Skill, WorkStyle,
};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::repository::{FounderRepository, MatchQuery, RepositoryError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Failures of co-founder operations
#[derive(Debug, Error)]
pub enum CofounderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Repository error: {0}")]
    Repository(#[source] RepositoryError),
}

impl From<RepositoryError> for CofounderError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => CofounderError::Conflict(msg),
            RepositoryError::NotFound(msg) => CofounderError::NotFound(msg),
            other => CofounderError::Repository(other),
        }
    }
}

impl From<WorkflowError> for CofounderError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::SelfMatch => CofounderError::Validation(vec![err.to_string()]),
            WorkflowError::Duplicate { .. } => CofounderError::Conflict(err.to_string()),
            WorkflowError::AlreadyResolved { .. }
            | WorkflowError::NotRecipient { .. }
            | WorkflowError::InvalidTarget(_) => CofounderError::InvalidTransition(err.to_string()),
        }
    }
}

/// Matching limits and policies
#[derive(Debug, Clone, Copy)]
pub struct MatchingOptions {
    pub rematch_policy: RematchPolicy,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            rematch_policy: RematchPolicy::Block,
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Co-founder matching operations on top of a founder repository
pub struct CofounderService {
    repository: Arc<dyn FounderRepository>,
    cache: Arc<CacheManager>,
    matcher: Matcher,
    options: MatchingOptions,
}

impl CofounderService {
    pub fn new(
        repository: Arc<dyn FounderRepository>,
        cache: Arc<CacheManager>,
        matcher: Matcher,
        options: MatchingOptions,
    ) -> Self {
        Self {
            repository,
            cache,
            matcher,
            options,
        }
    }

    async fn cached<T, F, Fut>(&self, key: String, load: F) -> Result<Vec<T>, CofounderError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, RepositoryError>>,
    {
        if let Ok(hit) = self.cache.get::<Vec<T>>(&key).await {
            return Ok(hit);
        }

        let items = load().await?;
        if let Err(e) = self.cache.set(&key, &items).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
        Ok(items)
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>, CofounderError> {
        self.cached(CacheKey::skills(), || self.repository.list_skills()).await
    }

    pub async fn list_industries(&self) -> Result<Vec<Industry>, CofounderError> {
        self.cached(CacheKey::industries(), || self.repository.list_industries()).await
    }

    pub async fn list_work_styles(&self) -> Result<Vec<WorkStyle>, CofounderError> {
        self.cached(CacheKey::work_styles(), || self.repository.list_work_styles()).await
    }

    /// The founder profile owned by `user_id`
    pub async fn get_own_profile(&self, user_id: &str) -> Result<FounderProfile, CofounderError> {
        self.repository
            .get_profile_by_user(user_id)
            .await?
            .ok_or_else(|| CofounderError::NotFound(format!("Founder profile for user {}", user_id)))
    }

    pub async fn create_profile(
        &self,
        user_id: &str,
        input: &FounderProfileInput,
    ) -> Result<FounderProfile, CofounderError> {
        if self.repository.get_profile_by_user(user_id).await?.is_some() {
            return Err(CofounderError::Conflict(format!(
                "Founder profile already exists for user {}",
                user_id
            )));
        }

        let fields = self.resolve_fields(input).await?;
        let profile = self.repository.insert_profile(user_id, &fields).await?;

        tracing::info!("Created founder profile {} for user {}", profile.id, user_id);
        Ok(profile)
    }

    /// Apply `update` to a profile on behalf of `user_id`, who must own it
    pub async fn update_profile(
        &self,
        profile_id: &str,
        user_id: &str,
        update: &FounderProfileUpdate,
    ) -> Result<FounderProfile, CofounderError> {
        let existing = self
            .repository
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| CofounderError::NotFound(format!("Founder profile {}", profile_id)))?;

        if existing.user_id != user_id {
            return Err(CofounderError::Forbidden(format!(
                "User {} does not own founder profile {}",
                user_id, profile_id
            )));
        }

        let merged = merge_update(&existing, update);
        let fields = self.resolve_fields(&merged).await?;
        let profile = self.repository.update_profile(profile_id, &fields).await?;

        tracing::info!("Updated founder profile {}", profile_id);
        Ok(profile)
    }

    /// Check required fields and turn reference ids into reference records
    async fn resolve_fields(&self, input: &FounderProfileInput) -> Result<ProfileFields, CofounderError> {
        let mut problems = missing_fields(input);

        let skills = resolve_ids(&input.skills, &self.list_skills().await?, |s| &s.id, "skill", &mut problems);
        let industries =
            resolve_ids(&input.industries, &self.list_industries().await?, |i| &i.id, "industry", &mut problems);
        let work_style =
            resolve_ids(&input.work_style, &self.list_work_styles().await?, |w| &w.id, "work style", &mut problems);

        match input.startup_stage {
            Some(startup_stage) if problems.is_empty() => Ok(ProfileFields {
                skills,
                industries,
                startup_stage,
                work_style,
                goals: input.goals.trim().to_string(),
                experience: input.experience.trim().to_string(),
                seeking: input.seeking.trim().to_string(),
            }),
            _ => Err(CofounderError::Validation(problems)),
        }
    }

    /// Ranked and filtered candidates for `user_id`
    ///
    /// Excludes the user's own profile and every profile they already sent a
    /// request to, whatever its status.
    pub async fn potential_matches(
        &self,
        user_id: &str,
        filter: &CandidateFilter,
        limit: Option<usize>,
    ) -> Result<MatchResult, CofounderError> {
        let own = self.get_own_profile(user_id).await?;
        let candidates = self.repository.list_candidates(user_id).await?;
        let already_requested = self.repository.list_existing_match_targets(&own.id).await?;

        let limit = limit
            .unwrap_or(self.options.default_limit)
            .min(self.options.max_limit);

        tracing::debug!(
            "Ranking {} candidates for {} ({} already requested)",
            candidates.len(),
            user_id,
            already_requested.len()
        );

        Ok(self
            .matcher
            .find_matches(&own, &candidates, &already_requested, filter, limit))
    }

    /// Send a match request from the user's profile to `matched_founder_id`
    pub async fn send_match_request(
        &self,
        user_id: &str,
        matched_founder_id: &str,
    ) -> Result<FounderMatch, CofounderError> {
        let own = self.get_own_profile(user_id).await?;

        if self.repository.get_profile(matched_founder_id).await?.is_none() {
            return Err(CofounderError::NotFound(format!(
                "Founder profile {}",
                matched_founder_id
            )));
        }

        let existing = self
            .repository
            .list_matches(&MatchQuery {
                founder_id: Some(own.id.clone()),
                matched_founder_id: Some(matched_founder_id.to_string()),
                ..Default::default()
            })
            .await?;

        let record = match plan_match_request(
            &own.id,
            matched_founder_id,
            &existing,
            self.options.rematch_policy,
        )? {
            RequestPlan::Insert => self.repository.insert_match(&own.id, matched_founder_id).await?,
            RequestPlan::Reopen(match_id) => {
                self.repository
                    .set_match_status(&match_id, MatchStatus::Pending)
                    .await?
            }
        };

        tracing::info!("Match request {}: {} -> {}", record.id, own.id, matched_founder_id);
        Ok(record)
    }

    /// Accept or reject a match request addressed to the user's profile
    pub async fn respond_to_match(
        &self,
        user_id: &str,
        match_id: &str,
        status: MatchStatus,
    ) -> Result<FounderMatch, CofounderError> {
        let record = self
            .repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| CofounderError::NotFound(format!("Match {}", match_id)))?;

        let own = self.get_own_profile(user_id).await?;
        check_transition(&record, &own.id, status)?;

        let updated = self.repository.set_match_status(match_id, status).await?;

        tracing::info!("Match {} is now {}", match_id, updated.status);
        Ok(updated)
    }

    /// Pending requests addressed to the user
    pub async fn received_requests(&self, user_id: &str) -> Result<Vec<MatchWithCounterpart>, CofounderError> {
        let own = self.get_own_profile(user_id).await?;
        let query = MatchQuery::received_by(&own.id).with_status(MatchStatus::Pending);
        self.with_counterparts(&own.id, self.repository.list_matches(&query).await?)
            .await
    }

    /// Every request the user sent, whatever its status
    pub async fn sent_requests(&self, user_id: &str) -> Result<Vec<MatchWithCounterpart>, CofounderError> {
        let own = self.get_own_profile(user_id).await?;
        let query = MatchQuery::sent_by(&own.id);
        self.with_counterparts(&own.id, self.repository.list_matches(&query).await?)
            .await
    }

    /// Accepted matches where the user is on either side, read in one query
    pub async fn accepted_matches(&self, user_id: &str) -> Result<Vec<MatchWithCounterpart>, CofounderError> {
        let own = self.get_own_profile(user_id).await?;
        let query = MatchQuery::involving(&own.id).with_status(MatchStatus::Accepted);
        self.with_counterparts(&own.id, self.repository.list_matches(&query).await?)
            .await
    }

    async fn with_counterparts(
        &self,
        own_profile_id: &str,
        records: Vec<FounderMatch>,
    ) -> Result<Vec<MatchWithCounterpart>, CofounderError> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let counterpart = match record.counterpart_of(own_profile_id) {
                Some(id) => self.repository.get_profile_with_user(id).await?,
                None => None,
            };
            out.push(MatchWithCounterpart { record, counterpart });
        }
        Ok(out)
    }
}

fn missing_fields(input: &FounderProfileInput) -> Vec<String> {
    let mut missing = Vec::new();
    let checks = [
        ("skills", input.skills.is_empty()),
        ("industries", input.industries.is_empty()),
        ("startupStage", input.startup_stage.is_none()),
        ("workStyle", input.work_style.is_empty()),
        ("goals", input.goals.trim().is_empty()),
        ("experience", input.experience.trim().is_empty()),
        ("seeking", input.seeking.trim().is_empty()),
    ];
    for (field, is_missing) in checks {
        if is_missing {
            missing.push(format!("{} is required", field));
        }
    }
    missing
}

/// Map ids onto reference records, keeping first-seen order and dropping repeats
fn resolve_ids<T: Clone>(
    ids: &[String],
    reference: &[T],
    id_of: impl Fn(&T) -> &String,
    kind: &str,
    problems: &mut Vec<String>,
) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        match reference.iter().find(|r| id_of(r) == id) {
            Some(item) => out.push(item.clone()),
            None => problems.push(format!("unknown {} id: {}", kind, id)),
        }
    }
    out
}

fn merge_update(existing: &FounderProfile, update: &FounderProfileUpdate) -> FounderProfileInput {
    let ids = |items: Vec<String>, replacement: &Option<Vec<String>>| replacement.clone().unwrap_or(items);

    FounderProfileInput {
        skills: ids(existing.skills.iter().map(|s| s.id.clone()).collect(), &update.skills),
        industries: ids(existing.industries.iter().map(|i| i.id.clone()).collect(), &update.industries),
        startup_stage: Some(update.startup_stage.unwrap_or(existing.startup_stage)),
        work_style: ids(existing.work_style.iter().map(|w| w.id.clone()).collect(), &update.work_style),
        goals: update.goals.clone().unwrap_or_else(|| existing.goals.clone()),
        experience: update.experience.clone().unwrap_or_else(|| existing.experience.clone()),
        seeking: update.seeking.clone().unwrap_or_else(|| existing.seeking.clone()),
    }
}

use crate::core::{filters::CandidateFilter, scoring::calculate_relevance};
use crate::models::{FounderProfile, FounderProfileWithUser, RelevanceWeights, ScoredCandidate};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    /// Candidates left after exclusions, before search/facets
    pub total_candidates: usize,
    /// Candidates left after search/facets, before the limit
    pub total_results: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Drop profiles the requester already sent a request to
/// 2. Score against the requester's profile and rank
/// 3. Search and facet filtering (order-preserving)
/// 4. Limit
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: RelevanceWeights,
}

impl Matcher {
    pub fn new(weights: RelevanceWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: RelevanceWeights::default(),
        }
    }

    pub fn weights(&self) -> &RelevanceWeights {
        &self.weights
    }

    /// Score every candidate against `reference` and sort by descending
    /// relevance. Equal scores are ordered by profile id ascending.
    pub fn rank(
        &self,
        reference: &FounderProfile,
        candidates: &[FounderProfileWithUser],
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                relevance: calculate_relevance(&candidate.profile, reference, &self.weights),
                candidate: candidate.clone(),
            })
            .collect();

        scored.sort_by(|a, b| compare_ranked(a, b));
        scored
    }

    /// Same ordering as [`Matcher::rank`], without the score breakdown
    pub fn sort_by_relevance(
        &self,
        reference: &FounderProfile,
        candidates: &[FounderProfileWithUser],
    ) -> Vec<FounderProfileWithUser> {
        self.rank(reference, candidates)
            .into_iter()
            .map(|scored| scored.candidate)
            .collect()
    }

    /// Find potential co-founders for `reference`
    ///
    /// # Arguments
    /// * `reference` - The requesting founder's own profile
    /// * `candidates` - Every other founder profile
    /// * `already_requested` - Profile ids the requester has a match record with
    /// * `filter` - Search term and facets chosen by the requester
    /// * `limit` - Maximum number of matches to return
    pub fn find_matches(
        &self,
        reference: &FounderProfile,
        candidates: &[FounderProfileWithUser],
        already_requested: &HashSet<String>,
        filter: &CandidateFilter,
        limit: usize,
    ) -> MatchResult {
        let eligible: Vec<FounderProfileWithUser> = candidates
            .iter()
            .filter(|c| c.profile.id != reference.id && !already_requested.contains(&c.profile.id))
            .cloned()
            .collect();
        let total_candidates = eligible.len();

        let mut matches = filter.apply(&self.rank(reference, &eligible));
        let total_results = matches.len();
        matches.truncate(limit);

        MatchResult {
            matches,
            total_candidates,
            total_results,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[inline]
fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.relevance
        .total
        .cmp(&a.relevance.total)
        .then_with(|| a.candidate.profile.id.cmp(&b.candidate.profile.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Industry, Skill, StartupStage, UserSummary};
    use chrono::Utc;

    fn create_profile(
        id: &str,
        stage: StartupStage,
        industries: &[&str],
        skills: &[&str],
    ) -> FounderProfile {
        FounderProfile {
            id: id.to_string(),
            user_id: format!("user_{}", id),
            skills: skills
                .iter()
                .map(|s| Skill { id: s.to_string(), name: s.to_string() })
                .collect(),
            industries: industries
                .iter()
                .map(|i| Industry { id: i.to_string(), name: i.to_string() })
                .collect(),
            startup_stage: stage,
            work_style: vec![],
            goals: "Launch".to_string(),
            experience: "Plenty".to_string(),
            seeking: "Partner".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_candidate(
        id: &str,
        stage: StartupStage,
        industries: &[&str],
        skills: &[&str],
    ) -> FounderProfileWithUser {
        FounderProfileWithUser {
            profile: create_profile(id, stage, industries, skills),
            user: UserSummary {
                id: format!("user_{}", id),
                full_name: format!("Founder {}", id),
                bio: String::new(),
                avatar_url: None,
            },
        }
    }

    fn ids(matches: &[ScoredCandidate]) -> Vec<&str> {
        matches.iter().map(|m| m.candidate.profile.id.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_by_score() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Mvp, &["fintech"], &["sales"]);

        let candidates = vec![
            create_candidate("far", StartupStage::Scaling, &[], &["sales"]),          // 0
            create_candidate("close", StartupStage::Mvp, &["fintech"], &["eng"]),     // 2 + 3 + 2
            create_candidate("adjacent", StartupStage::Growth, &["fintech"], &["sales"]), // 2 + 1
        ];

        let ranked = matcher.rank(&me, &candidates);

        assert_eq!(ids(&ranked), vec!["close", "adjacent", "far"]);
        assert_eq!(ranked[0].relevance.total, 7);
        assert_eq!(ranked[1].relevance.total, 3);
        assert_eq!(ranked[2].relevance.total, 0);
    }

    #[test]
    fn test_ties_broken_by_profile_id() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Idea, &[], &[]);

        let candidates = vec![
            create_candidate("c", StartupStage::Idea, &[], &[]),
            create_candidate("a", StartupStage::Idea, &[], &[]),
            create_candidate("b", StartupStage::Idea, &[], &[]),
        ];

        let sorted = matcher.sort_by_relevance(&me, &candidates);
        let order: Vec<&str> = sorted.iter().map(|c| c.id()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_does_not_touch_input() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Idea, &[], &["x"]);
        let candidates = vec![
            create_candidate("b", StartupStage::Scaling, &[], &["x"]),
            create_candidate("a", StartupStage::Idea, &[], &["y"]),
        ];
        let before = candidates.clone();

        let first = matcher.rank(&me, &candidates);
        let second = matcher.rank(&me, &candidates);

        assert_eq!(candidates, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_candidates() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Idea, &[], &[]);
        assert!(matcher.rank(&me, &[]).is_empty());
    }

    #[test]
    fn test_find_matches_excludes_requested_and_self() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Mvp, &[], &[]);
        let mut own = create_candidate("me", StartupStage::Mvp, &[], &[]);
        own.user.full_name = "Me".to_string();

        let candidates = vec![
            own,
            create_candidate("1", StartupStage::Mvp, &[], &[]),
            create_candidate("2", StartupStage::Mvp, &[], &[]),
        ];
        let requested: HashSet<String> = ["2".to_string()].into_iter().collect();

        let result = matcher.find_matches(&me, &candidates, &requested, &CandidateFilter::default(), 10);

        assert_eq!(ids(&result.matches), vec!["1"]);
        assert_eq!(result.total_candidates, 1);
    }

    #[test]
    fn test_find_matches_filters_after_ranking() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Mvp, &["fintech"], &[]);

        let candidates = vec![
            create_candidate("1", StartupStage::Idea, &["fintech"], &[]),
            create_candidate("2", StartupStage::Mvp, &["fintech"], &[]),
            create_candidate("3", StartupStage::Mvp, &["health"], &[]),
        ];
        let filter = CandidateFilter {
            industries: ["fintech".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let result = matcher.find_matches(&me, &candidates, &HashSet::new(), &filter, 10);

        assert_eq!(ids(&result.matches), vec!["2", "1"]);
        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.total_results, 2);
    }

    #[test]
    fn test_respects_limit() {
        let matcher = Matcher::with_default_weights();
        let me = create_profile("me", StartupStage::Idea, &[], &[]);

        let candidates: Vec<FounderProfileWithUser> = (0..20)
            .map(|i| create_candidate(&format!("{:02}", i), StartupStage::Idea, &[], &[]))
            .collect();

        let result = matcher.find_matches(&me, &candidates, &HashSet::new(), &CandidateFilter::default(), 5);

        assert_eq!(result.matches.len(), 5);
        assert_eq!(result.total_results, 20);
    }
}

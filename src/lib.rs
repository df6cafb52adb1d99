//! CoStart Match - co-founder matching service for the CoStart community platform
//!
//! This library ranks potential co-founders by relevance, filters them by
//! search term and facets, and runs the match-request workflow on top of a
//! hosted PostgREST backend.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_relevance, CandidateFilter, Matcher, RematchPolicy};
pub use models::{
    FounderMatch, FounderProfile, FounderProfileWithUser, MatchStatus, RelevanceWeights,
    ScoredCandidate, StartupStage,
};
pub use services::{CofounderError, CofounderService, FounderRepository};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::with_default_weights();
        assert_eq!(matcher.weights(), &RelevanceWeights::default());
        assert!(CandidateFilter::default().is_empty());
    }
}

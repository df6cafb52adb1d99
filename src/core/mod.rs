// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod workflow;

pub use filters::{filter_candidates, matches_search, CandidateFilter};
pub use matcher::{MatchResult, Matcher};
pub use scoring::{
    calculate_industry_overlap, calculate_relevance, calculate_skill_complementarity,
    calculate_stage_compatibility,
};
pub use workflow::{can_transition, check_transition, plan_match_request, RematchPolicy, RequestPlan, WorkflowError};

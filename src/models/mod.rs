// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    FounderMatch, FounderProfile, FounderProfileInput, FounderProfileUpdate, FounderProfileWithUser,
    Industry, MatchStatus, MatchWithCounterpart, ParseEnumError, ProfileFields, RelevanceBreakdown,
    RelevanceWeights, ScoredCandidate, Skill, StartupStage, UserSummary, WorkStyle,
};
pub use requests::{
    CreateProfileRequest, PotentialMatchesRequest, RespondToMatchRequest, SendMatchRequest,
    ToggleSavedRequest, UpdateProfileRequest, UserQuery,
};
pub use responses::{
    ErrorResponse, HealthResponse, PotentialMatchesResponse, SavedProfilesResponse,
    ToggleSavedResponse,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A skill from the admin-maintained reference list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
}

/// An industry from the admin-maintained reference list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Industry {
    pub id: String,
    pub name: String,
}

/// A work style from the admin-maintained reference list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkStyle {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// How far along a founder's startup is.
///
/// Variants are declared in progression order; `index()` is what the
/// ranker uses to decide whether two stages are adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupStage {
    Idea,
    Prototype,
    Mvp,
    Growth,
    Scaling,
}

impl StartupStage {
    pub const ALL: [StartupStage; 5] = [
        StartupStage::Idea,
        StartupStage::Prototype,
        StartupStage::Mvp,
        StartupStage::Growth,
        StartupStage::Scaling,
    ];

    /// Position in the idea -> scaling progression
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StartupStage::Idea => "idea",
            StartupStage::Prototype => "prototype",
            StartupStage::Mvp => "mvp",
            StartupStage::Growth => "growth",
            StartupStage::Scaling => "scaling",
        }
    }
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartupStage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StartupStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "startup stage",
                value: s.to_string(),
            })
    }
}

/// A user's co-founder matching profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderProfile {
    pub id: String,
    pub user_id: String,
    pub skills: Vec<Skill>,
    pub industries: Vec<Industry>,
    pub startup_stage: StartupStage,
    pub work_style: Vec<WorkStyle>,
    pub goals: String,
    pub experience: String,
    pub seeking: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AsRef<FounderProfile> for FounderProfile {
    fn as_ref(&self) -> &FounderProfile {
        self
    }
}

/// Display snapshot of the user that owns a founder profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Founder profile joined with its owner's display info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderProfileWithUser {
    #[serde(flatten)]
    pub profile: FounderProfile,
    pub user: UserSummary,
}

impl FounderProfileWithUser {
    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

impl AsRef<FounderProfile> for FounderProfileWithUser {
    fn as_ref(&self) -> &FounderProfile {
        &self.profile
    }
}

impl AsRef<FounderProfileWithUser> for FounderProfileWithUser {
    fn as_ref(&self) -> &FounderProfileWithUser {
        self
    }
}

/// State of a match request.
///
/// `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MatchStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "accepted" => Ok(MatchStatus::Accepted),
            "rejected" => Ok(MatchStatus::Rejected),
            other => Err(ParseEnumError {
                kind: "match status",
                value: other.to_string(),
            }),
        }
    }
}

/// Directed match request from `founder_id` to `matched_founder_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderMatch {
    pub id: String,
    pub founder_id: String,
    pub matched_founder_id: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FounderMatch {
    pub fn involves(&self, profile_id: &str) -> bool {
        self.founder_id == profile_id || self.matched_founder_id == profile_id
    }

    /// The other party of the match, seen from `profile_id`
    pub fn counterpart_of(&self, profile_id: &str) -> Option<&str> {
        if self.founder_id == profile_id {
            Some(&self.matched_founder_id)
        } else if self.matched_founder_id == profile_id {
            Some(&self.founder_id)
        } else {
            None
        }
    }
}

/// Profile fields as submitted by the owner, referencing reference data by id.
///
/// Every field is optional at the type level so that missing values are
/// reported as validation failures rather than decode errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FounderProfileInput {
    pub skills: Vec<String>,
    pub industries: Vec<String>,
    pub startup_stage: Option<StartupStage>,
    pub work_style: Vec<String>,
    pub goals: String,
    pub experience: String,
    pub seeking: String,
}

/// Partial profile edit; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FounderProfileUpdate {
    pub skills: Option<Vec<String>>,
    pub industries: Option<Vec<String>>,
    pub startup_stage: Option<StartupStage>,
    pub work_style: Option<Vec<String>>,
    pub goals: Option<String>,
    pub experience: Option<String>,
    pub seeking: Option<String>,
}

/// Validated profile content with reference ids resolved, as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    pub skills: Vec<Skill>,
    pub industries: Vec<Industry>,
    pub startup_stage: StartupStage,
    pub work_style: Vec<WorkStyle>,
    pub goals: String,
    pub experience: String,
    pub seeking: String,
}

/// Relevance score of a candidate, broken down by term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceBreakdown {
    pub industry_overlap: u32,
    pub stage_compatibility: u32,
    pub skill_complementarity: u32,
    pub total: u32,
}

/// Candidate paired with its relevance to the requesting founder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: FounderProfileWithUser,
    pub relevance: RelevanceBreakdown,
}

impl AsRef<FounderProfileWithUser> for ScoredCandidate {
    fn as_ref(&self) -> &FounderProfileWithUser {
        &self.candidate
    }
}

/// Scoring weights for the relevance ranker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceWeights {
    /// Per shared industry
    pub industry_overlap: u32,
    pub same_stage: u32,
    pub adjacent_stage: u32,
    /// Per skill held by exactly one of the two founders
    pub complementary_skill: u32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            industry_overlap: 2,
            same_stage: 3,
            adjacent_stage: 1,
            complementary_skill: 1,
        }
    }
}

/// Match record together with the other party's profile, when it still exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithCounterpart {
    #[serde(rename = "match")]
    pub record: FounderMatch,
    pub counterpart: Option<FounderProfileWithUser>,
}

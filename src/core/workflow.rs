use crate::models::{FounderMatch, MatchStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do when a founder re-sends a request to someone who rejected them.
///
/// Pairs with a pending or accepted record are always refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RematchPolicy {
    /// Refuse the new request
    #[default]
    Block,
    /// Create a fresh pending record next to the rejected one
    Allow,
    /// Move the rejected record back to pending
    Reset,
}

/// Workflow rule violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("a founder cannot send a match request to their own profile")]
    SelfMatch,

    #[error("a {status} match request already exists for this pair ({match_id})")]
    Duplicate { match_id: String, status: MatchStatus },

    #[error("match {match_id} is already {status}")]
    AlreadyResolved { match_id: String, status: MatchStatus },

    #[error("only the requested founder may respond to match {match_id}")]
    NotRecipient { match_id: String },

    #[error("a match cannot be moved to {0}")]
    InvalidTarget(MatchStatus),
}

/// How a new match request should be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPlan {
    /// Insert a new pending record
    Insert,
    /// Put the existing record with this id back to pending
    Reopen(String),
}

/// Whether the state machine allows `from -> to`
#[inline]
pub fn can_transition(from: MatchStatus, to: MatchStatus) -> bool {
    matches!(
        (from, to),
        (MatchStatus::Pending, MatchStatus::Accepted) | (MatchStatus::Pending, MatchStatus::Rejected)
    )
}

/// Decide how to handle a request from `founder_id` to `matched_founder_id`
/// given every existing record for that ordered pair.
pub fn plan_match_request(
    founder_id: &str,
    matched_founder_id: &str,
    existing: &[FounderMatch],
    policy: RematchPolicy,
) -> Result<RequestPlan, WorkflowError> {
    if founder_id == matched_founder_id {
        return Err(WorkflowError::SelfMatch);
    }

    let for_pair = existing
        .iter()
        .filter(|m| m.founder_id == founder_id && m.matched_founder_id == matched_founder_id);

    let mut latest_rejected: Option<&FounderMatch> = None;
    for record in for_pair {
        match record.status {
            MatchStatus::Pending | MatchStatus::Accepted => {
                return Err(WorkflowError::Duplicate {
                    match_id: record.id.clone(),
                    status: record.status,
                });
            }
            MatchStatus::Rejected => {
                if latest_rejected.map_or(true, |r| record.updated_at > r.updated_at) {
                    latest_rejected = Some(record);
                }
            }
        }
    }

    match (latest_rejected, policy) {
        (None, _) | (Some(_), RematchPolicy::Allow) => Ok(RequestPlan::Insert),
        (Some(rejected), RematchPolicy::Block) => Err(WorkflowError::Duplicate {
            match_id: rejected.id.clone(),
            status: MatchStatus::Rejected,
        }),
        (Some(rejected), RematchPolicy::Reset) => Ok(RequestPlan::Reopen(rejected.id.clone())),
    }
}

/// Check that `actor_profile_id` may move `record` to `to`
pub fn check_transition(
    record: &FounderMatch,
    actor_profile_id: &str,
    to: MatchStatus,
) -> Result<(), WorkflowError> {
    if record.status.is_terminal() {
        return Err(WorkflowError::AlreadyResolved {
            match_id: record.id.clone(),
            status: record.status,
        });
    }

    if !can_transition(record.status, to) {
        return Err(WorkflowError::InvalidTarget(to));
    }

    if record.matched_founder_id != actor_profile_id {
        return Err(WorkflowError::NotRecipient {
            match_id: record.id.clone(),
        });
    }

    Ok(())
}

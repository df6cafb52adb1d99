use crate::models::{FounderProfile, Industry, RelevanceBreakdown, RelevanceWeights, Skill, StartupStage};
use std::collections::HashSet;

/// Calculate how relevant `candidate` is to the `reference` founder
///
/// Scoring formula:
/// score = (
///     industry_overlap * 2 +       # Shared industries, similarity rewarded
///     stage_compatibility +        # 3 for same stage, 1 for adjacent
///     skill_complementarity * 1    # Skills only one side has, difference rewarded
/// )
///
/// Every term is symmetric, so `score(a, b) == score(b, a)`.
pub fn calculate_relevance(
    candidate: &FounderProfile,
    reference: &FounderProfile,
    weights: &RelevanceWeights,
) -> RelevanceBreakdown {
    let industry_overlap =
        calculate_industry_overlap(&candidate.industries, &reference.industries)
            * weights.industry_overlap;

    let stage_compatibility = calculate_stage_compatibility(
        candidate.startup_stage,
        reference.startup_stage,
        weights,
    );

    let skill_complementarity =
        calculate_skill_complementarity(&candidate.skills, &reference.skills)
            * weights.complementary_skill;

    RelevanceBreakdown {
        industry_overlap,
        stage_compatibility,
        skill_complementarity,
        total: industry_overlap + stage_compatibility + skill_complementarity,
    }
}

/// Number of industry ids the two lists share
#[inline]
pub fn calculate_industry_overlap(a: &[Industry], b: &[Industry]) -> u32 {
    let ids_a: HashSet<&str> = a.iter().map(|i| i.id.as_str()).collect();
    let ids_b: HashSet<&str> = b.iter().map(|i| i.id.as_str()).collect();

    ids_a.intersection(&ids_b).count() as u32
}

/// Stage score: same stage, adjacent in the progression, or neither
#[inline]
pub fn calculate_stage_compatibility(
    a: StartupStage,
    b: StartupStage,
    weights: &RelevanceWeights,
) -> u32 {
    if a == b {
        return weights.same_stage;
    }

    if a.index().abs_diff(b.index()) == 1 {
        weights.adjacent_stage
    } else {
        0
    }
}

/// Number of skill ids held by exactly one of the two founders
#[inline]
pub fn calculate_skill_complementarity(a: &[Skill], b: &[Skill]) -> u32 {
    let ids_a: HashSet<&str> = a.iter().map(|s| s.id.as_str()).collect();
    let ids_b: HashSet<&str> = b.iter().map(|s| s.id.as_str()).collect();

    ids_a.symmetric_difference(&ids_b).count() as u32
}

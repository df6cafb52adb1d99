// Unit tests for CoStart Match

use costart_match::core::{
    filters::{filter_candidates, matches_search, CandidateFilter},
    scoring::{calculate_relevance, calculate_stage_compatibility},
    workflow::{can_transition, check_transition, plan_match_request, RematchPolicy, RequestPlan, WorkflowError},
    Matcher,
};
use costart_match::models::{
    FounderMatch, FounderProfile, FounderProfileWithUser, Industry, MatchStatus, RelevanceWeights,
    Skill, StartupStage, UserSummary, WorkStyle,
};
use chrono::{Duration, Utc};

fn skill(name: &str) -> Skill {
    Skill { id: format!("skill-{}", name.to_lowercase()), name: name.to_string() }
}

fn industry(name: &str) -> Industry {
    Industry { id: format!("industry-{}", name.to_lowercase()), name: name.to_string() }
}

fn create_profile(
    id: &str,
    stage: StartupStage,
    industries: &[&str],
    skills: &[&str],
) -> FounderProfile {
    FounderProfile {
        id: id.to_string(),
        user_id: format!("user-{}", id),
        skills: skills.iter().map(|s| skill(s)).collect(),
        industries: industries.iter().map(|i| industry(i)).collect(),
        startup_stage: stage,
        work_style: vec![WorkStyle { id: "style-remote".to_string(), name: "Remote".to_string() }],
        goals: "Build something people want".to_string(),
        experience: "Shipped two products".to_string(),
        seeking: "A technical partner".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn with_user(profile: FounderProfile, name: &str, bio: &str) -> FounderProfileWithUser {
    FounderProfileWithUser {
        user: UserSummary {
            id: profile.user_id.clone(),
            full_name: name.to_string(),
            bio: bio.to_string(),
            avatar_url: None,
        },
        profile,
    }
}

fn create_match(id: &str, from: &str, to: &str, status: MatchStatus, age_mins: i64) -> FounderMatch {
    let at = Utc::now() - Duration::minutes(age_mins);
    FounderMatch {
        id: id.to_string(),
        founder_id: from.to_string(),
        matched_founder_id: to.to_string(),
        status,
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn test_same_stage_same_industry_different_skills_scores_seven() {
    let a = create_profile("a", StartupStage::Mvp, &["Fintech"], &["Sales"]);
    let b = create_profile("b", StartupStage::Mvp, &["Fintech"], &["Engineering"]);

    let score = calculate_relevance(&a, &b, &RelevanceWeights::default());
    assert_eq!(score.industry_overlap, 2);
    assert_eq!(score.stage_compatibility, 3);
    assert_eq!(score.skill_complementarity, 2);
    assert_eq!(score.total, 7);
}

#[test]
fn test_idea_vs_mvp_has_no_stage_points() {
    let weights = RelevanceWeights::default();
    assert_eq!(calculate_stage_compatibility(StartupStage::Idea, StartupStage::Mvp, &weights), 0);
    assert_eq!(calculate_stage_compatibility(StartupStage::Idea, StartupStage::Prototype, &weights), 1);
    assert_eq!(calculate_stage_compatibility(StartupStage::Scaling, StartupStage::Scaling, &weights), 3);
}

#[test]
fn test_relevance_is_symmetric() {
    let profiles = [
        create_profile("a", StartupStage::Idea, &["Fintech", "SaaS"], &["Sales"]),
        create_profile("b", StartupStage::Prototype, &["Fintech"], &["Sales", "Engineering"]),
        create_profile("c", StartupStage::Growth, &[], &[]),
    ];
    let weights = RelevanceWeights::default();

    for a in &profiles {
        for b in &profiles {
            assert_eq!(
                calculate_relevance(a, b, &weights),
                calculate_relevance(b, a, &weights),
                "{} vs {}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn test_search_term_fin_matches_only_fintech_bio() {
    let ana = with_user(create_profile("ana", StartupStage::Mvp, &[], &[]), "Ana", "Fintech builder");
    let leo = with_user(create_profile("leo", StartupStage::Mvp, &[], &[]), "Leo", "Edtech");

    let filter = CandidateFilter {
        search: Some("fin".to_string()),
        ..Default::default()
    };
    let result = filter_candidates(&[ana, leo], &filter);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].user.full_name, "Ana");
}

#[test]
fn test_search_is_case_insensitive_over_names() {
    let ana = with_user(create_profile("ana", StartupStage::Mvp, &[], &["Engineering"]), "Ana", "");
    assert!(matches_search(&ana, "engineer"));
    assert!(matches_search(&ana, "ana"));
    assert!(!matches_search(&ana, "marketing"));
}

#[test]
fn test_empty_filter_is_identity() {
    let candidates = vec![
        with_user(create_profile("1", StartupStage::Idea, &["Fintech"], &[]), "One", ""),
        with_user(create_profile("2", StartupStage::Growth, &[], &["Sales"]), "Two", ""),
    ];
    assert_eq!(filter_candidates(&candidates, &CandidateFilter::default()), candidates);
}

#[test]
fn test_ranking_orders_by_score_then_id() {
    let me = create_profile("me", StartupStage::Mvp, &["Fintech"], &["Sales"]);
    let candidates = vec![
        with_user(create_profile("z", StartupStage::Growth, &[], &["Sales"]), "Z", ""),
        with_user(create_profile("b", StartupStage::Mvp, &["Fintech"], &["Engineering"]), "B", ""),
        with_user(create_profile("a", StartupStage::Growth, &[], &["Sales"]), "A", ""),
    ];

    let ranked = Matcher::with_default_weights().rank(&me, &candidates);
    let ids: Vec<&str> = ranked.iter().map(|c| c.candidate.id()).collect();
    assert_eq!(ids, vec!["b", "a", "z"]);
    assert_eq!(ranked[0].relevance.total, 7);
}

#[test]
fn test_transition_table() {
    assert!(can_transition(MatchStatus::Pending, MatchStatus::Accepted));
    assert!(can_transition(MatchStatus::Pending, MatchStatus::Rejected));
    assert!(!can_transition(MatchStatus::Accepted, MatchStatus::Rejected));
    assert!(!can_transition(MatchStatus::Rejected, MatchStatus::Accepted));
    assert!(!can_transition(MatchStatus::Pending, MatchStatus::Pending));
}

#[test]
fn test_second_transition_fails() {
    let mut record = create_match("m1", "a", "b", MatchStatus::Pending, 0);
    assert!(check_transition(&record, "b", MatchStatus::Accepted).is_ok());

    record.status = MatchStatus::Accepted;
    assert!(matches!(
        check_transition(&record, "b", MatchStatus::Rejected),
        Err(WorkflowError::AlreadyResolved { .. })
    ));
}

#[test]
fn test_only_recipient_may_respond() {
    let record = create_match("m1", "a", "b", MatchStatus::Pending, 0);
    assert!(matches!(
        check_transition(&record, "a", MatchStatus::Accepted),
        Err(WorkflowError::NotRecipient { .. })
    ));
}

#[test]
fn test_rematch_policies_after_rejection() {
    let existing = vec![
        create_match("old", "a", "b", MatchStatus::Rejected, 60),
        create_match("newer", "a", "b", MatchStatus::Rejected, 5),
    ];

    assert!(matches!(
        plan_match_request("a", "b", &existing, RematchPolicy::Block),
        Err(WorkflowError::Duplicate { .. })
    ));
    assert_eq!(
        plan_match_request("a", "b", &existing, RematchPolicy::Allow),
        Ok(RequestPlan::Insert)
    );
    assert_eq!(
        plan_match_request("a", "b", &existing, RematchPolicy::Reset),
        Ok(RequestPlan::Reopen("newer".to_string()))
    );
}

#[test]
fn test_open_request_always_conflicts() {
    let existing = vec![create_match("m1", "a", "b", MatchStatus::Pending, 0)];
    for policy in [RematchPolicy::Block, RematchPolicy::Allow, RematchPolicy::Reset] {
        assert!(matches!(
            plan_match_request("a", "b", &existing, policy),
            Err(WorkflowError::Duplicate { .. })
        ));
    }
}

use crate::models::{FounderProfileWithUser, StartupStage};
use std::collections::HashSet;

/// Search term and facet selections applied to a candidate list.
///
/// Facets are ANDed together; values inside one facet are ORed. An empty
/// facet or an empty search term places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub search: Option<String>,
    pub skills: HashSet<String>,
    pub industries: HashSet<String>,
    pub startup_stages: HashSet<StartupStage>,
    pub work_styles: HashSet<String>,
}

impl CandidateFilter {
    /// True when the filter lets every candidate through
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, str::is_empty)
            && self.skills.is_empty()
            && self.industries.is_empty()
            && self.startup_stages.is_empty()
            && self.work_styles.is_empty()
    }

    /// Check whether a single candidate passes every active criterion
    #[inline]
    pub fn matches(&self, candidate: &FounderProfileWithUser) -> bool {
        if let Some(term) = self.search.as_deref() {
            if !term.is_empty() && !matches_search(candidate, &term.to_lowercase()) {
                return false;
            }
        }

        let profile = &candidate.profile;

        // Skills facet
        if !self.skills.is_empty()
            && !profile.skills.iter().any(|s| self.skills.contains(&s.id)) {
            return false;
        }

        // Industries facet
        if !self.industries.is_empty()
            && !profile.industries.iter().any(|i| self.industries.contains(&i.id)) {
            return false;
        }

        // Startup stage facet
        if !self.startup_stages.is_empty()
            && !self.startup_stages.contains(&profile.startup_stage) {
            return false;
        }

        // Work style facet
        if !self.work_styles.is_empty()
            && !profile.work_style.iter().any(|w| self.work_styles.contains(&w.id)) {
            return false;
        }

        true
    }

    /// Keep the candidates that pass, preserving input order
    pub fn apply<C>(&self, candidates: &[C]) -> Vec<C>
    where
        C: AsRef<FounderProfileWithUser> + Clone,
    {
        candidates
            .iter()
            .filter(|c| self.matches(c.as_ref()))
            .cloned()
            .collect()
    }
}

/// Case-insensitive substring search over name, bio, skill names,
/// industry names and goals. `term` must already be lowercase.
#[inline]
pub fn matches_search(candidate: &FounderProfileWithUser, term: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(term);
    let profile = &candidate.profile;

    contains(&candidate.user.full_name)
        || contains(&candidate.user.bio)
        || profile.skills.iter().any(|s| contains(&s.name))
        || profile.industries.iter().any(|i| contains(&i.name))
        || contains(&profile.goals)
}

/// Filter a candidate list with the given criteria
pub fn filter_candidates(
    candidates: &[FounderProfileWithUser],
    filter: &CandidateFilter,
) -> Vec<FounderProfileWithUser> {
    filter.apply(candidates)
}

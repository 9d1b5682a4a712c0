//! Phase-based views over scope items.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{ScopeItem, VersionPhase};

/// Label of the bucket holding items without a recognized phase.
pub const UNTAGGED: &str = "Untagged";

/// Label of the filter that shows every item.
pub const ALL: &str = "All";

/// Which scope items to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseFilter {
    /// Every item, in stored order.
    #[default]
    All,
    /// Items tagged with exactly this phase.
    Phase(VersionPhase),
    /// Items with no version tag.
    Untagged,
}

impl PhaseFilter {
    /// Filter bar order: All, each phase, Untagged.
    pub fn all_filters() -> Vec<PhaseFilter> {
        std::iter::once(PhaseFilter::All)
            .chain(VersionPhase::ALL.iter().copied().map(PhaseFilter::Phase))
            .chain(std::iter::once(PhaseFilter::Untagged))
            .collect()
    }

    /// Name shown in the filter bar.
    pub fn label(self) -> &'static str {
        match self {
            PhaseFilter::All => ALL,
            PhaseFilter::Phase(phase) => phase.label(),
            PhaseFilter::Untagged => UNTAGGED,
        }
    }

    /// Whether an item is shown under this filter.
    pub fn matches(self, item: &ScopeItem) -> bool {
        match self {
            PhaseFilter::All => true,
            PhaseFilter::Untagged => item.version.is_empty(),
            PhaseFilter::Phase(phase) => item.version == phase.label(),
        }
    }
}

impl fmt::Display for PhaseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PhaseFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL) {
            Ok(PhaseFilter::All)
        } else if trimmed.eq_ignore_ascii_case(UNTAGGED) {
            Ok(PhaseFilter::Untagged)
        } else {
            trimmed
                .parse::<VersionPhase>()
                .map(PhaseFilter::Phase)
                .map_err(|_| format!("Unknown phase filter: {}", s))
        }
    }
}

/// A group in the by-version view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PhaseBucket {
    /// Items tagged with this phase.
    Phase(VersionPhase),
    /// Items with an empty or unrecognized version.
    Untagged,
}

impl PhaseBucket {
    /// Every bucket, phases first.
    pub fn all() -> impl Iterator<Item = PhaseBucket> {
        VersionPhase::ALL
            .iter()
            .copied()
            .map(PhaseBucket::Phase)
            .chain(std::iter::once(PhaseBucket::Untagged))
    }

    /// Bucket an item belongs to.
    pub fn of(item: &ScopeItem) -> PhaseBucket {
        item.phase()
            .map(PhaseBucket::Phase)
            .unwrap_or(PhaseBucket::Untagged)
    }

    /// Group heading.
    pub fn label(self) -> &'static str {
        match self {
            PhaseBucket::Phase(phase) => phase.label(),
            PhaseBucket::Untagged => UNTAGGED,
        }
    }
}

impl fmt::Display for PhaseBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Items visible under `filter`, in stored order.
pub fn filter_items(items: &[ScopeItem], filter: PhaseFilter) -> Vec<&ScopeItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Partition items by phase. Every bucket is present, possibly empty, and
/// items keep their relative order.
pub fn group_by_version(items: &[ScopeItem]) -> BTreeMap<PhaseBucket, Vec<&ScopeItem>> {
    let mut groups: BTreeMap<PhaseBucket, Vec<&ScopeItem>> =
        PhaseBucket::all().map(|bucket| (bucket, Vec::new())).collect();
    for item in items {
        groups.entry(PhaseBucket::of(item)).or_default().push(item);
    }
    groups
}

/// Item count per bucket, using the same partition as [`group_by_version`].
pub fn counts_by_version(items: &[ScopeItem]) -> BTreeMap<PhaseBucket, usize> {
    let mut counts: BTreeMap<PhaseBucket, usize> =
        PhaseBucket::all().map(|bucket| (bucket, 0)).collect();
    for item in items {
        *counts.entry(PhaseBucket::of(item)).or_default() += 1;
    }
    counts
}

/// Number of items each filter would show, in filter bar order.
pub fn phase_filter_counts(items: &[ScopeItem]) -> Vec<(PhaseFilter, usize)> {
    PhaseFilter::all_filters()
        .into_iter()
        .map(|filter| (filter, items.iter().filter(|item| filter.matches(item)).count()))
        .collect()
}

//! Fixed option sets used by analysis documents.
//!
//! Documents store enumerated values as their display labels so that the
//! persisted JSON keeps its plain-string shape. These types give those labels
//! a checked, typed view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Defines a closed set of labelled options with `ALL`, `label`,
/// `from_label`, `Display` and `FromStr`.
macro_rules! labelled_options {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[doc = $label]
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label as stored in documents.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Exact-match lookup of a stored label.
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s)
                    .or_else(|| {
                        $name::ALL
                            .iter()
                            .copied()
                            .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
                    })
                    .ok_or_else(|| {
                        format!("Unknown {}: {}", stringify!($name), s)
                    })
            }
        }
    };
}

labelled_options! {
    /// Where a feature request came from.
    Origin {
        UserResearch => "User Research",
        BusinessMetric => "Business Metric",
        CompetitorAnalysis => "Competitor Analysis",
        StakeholderRequest => "Stakeholder Request",
        TechnicalDebt => "Technical Debt",
        Other => "Other",
    }
}

labelled_options! {
    /// Release phase a document or scope item is targeted at.
    VersionPhase {
        Mvp => "MVP",
        V1 => "V1",
        V1_1 => "V1.1",
        V2 => "V2",
        Future => "Future",
        Cut => "Cut",
    }
}

labelled_options! {
    /// MoSCoW priority of a scope item.
    Priority {
        Must => "Must",
        Should => "Should",
        Could => "Could",
        WontHave => "Won't",
    }
}

labelled_options! {
    /// Validation state of an assumption.
    AssumptionStatus {
        Unvalidated => "Unvalidated",
        NeedsResearch => "Needs Research",
        Validated => "Validated",
        Disproven => "Disproven",
    }
}

labelled_options! {
    /// Who can resolve an open question.
    QuestionType {
        CanAnswerNow => "Can Answer Now",
        NeedsStakeholderDecision => "Needs Stakeholder Decision",
        NeedsUserResearch => "Needs User Research",
    }
}

labelled_options! {
    /// Whether a question has been resolved.
    QuestionStatus {
        Open => "Open",
        Answered => "Answered",
    }
}

labelled_options! {
    /// Overall confidence recorded in the summary.
    Confidence {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

/// Fixed catalog of edge-case categories.
///
/// The set of keys is part of the persisted format: every document carries an
/// entry for each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeCaseKind {
    /// No data to show.
    Empty,
    /// Something failed.
    Error,
    /// Data is being fetched or processed.
    Loading,
    /// A new user's first encounter.
    FirstTime,
    /// Repeat use.
    Returning,
    /// Roles and restricted access.
    Permissions,
    /// Connection drops.
    Offline,
    /// Too much, too little or malformed data.
    DataLimits,
    /// Small screens and breakpoints.
    Mobile,
    /// Keyboard, screen reader and contrast support.
    Accessibility,
}

impl EdgeCaseKind {
    /// Catalog order, used for reports and completion.
    pub const ALL: [EdgeCaseKind; 10] = [
        EdgeCaseKind::Empty,
        EdgeCaseKind::Error,
        EdgeCaseKind::Loading,
        EdgeCaseKind::FirstTime,
        EdgeCaseKind::Returning,
        EdgeCaseKind::Permissions,
        EdgeCaseKind::Offline,
        EdgeCaseKind::DataLimits,
        EdgeCaseKind::Mobile,
        EdgeCaseKind::Accessibility,
    ];

    /// Stable key used in the `edges` mapping.
    pub fn key(self) -> &'static str {
        match self {
            EdgeCaseKind::Empty => "empty",
            EdgeCaseKind::Error => "error",
            EdgeCaseKind::Loading => "loading",
            EdgeCaseKind::FirstTime => "firstTime",
            EdgeCaseKind::Returning => "returning",
            EdgeCaseKind::Permissions => "permissions",
            EdgeCaseKind::Offline => "offline",
            EdgeCaseKind::DataLimits => "dataLimits",
            EdgeCaseKind::Mobile => "mobile",
            EdgeCaseKind::Accessibility => "accessibility",
        }
    }

    /// Display name in the checklist and reports.
    pub fn label(self) -> &'static str {
        match self {
            EdgeCaseKind::Empty => "Empty state",
            EdgeCaseKind::Error => "Error state",
            EdgeCaseKind::Loading => "Loading state",
            EdgeCaseKind::FirstTime => "First-time experience",
            EdgeCaseKind::Returning => "Returning user",
            EdgeCaseKind::Permissions => "Permission / access variations",
            EdgeCaseKind::Offline => "Offline / connectivity",
            EdgeCaseKind::DataLimits => "Data extremes",
            EdgeCaseKind::Mobile => "Responsive / mobile",
            EdgeCaseKind::Accessibility => "Accessibility",
        }
    }

    /// Prompt shown next to the checkbox.
    pub fn hint(self) -> &'static str {
        match self {
            EdgeCaseKind::Empty => "What does the user see when there's no data?",
            EdgeCaseKind::Error => "What happens when something fails?",
            EdgeCaseKind::Loading => "What's shown during data fetch or processing?",
            EdgeCaseKind::FirstTime => "How does a new user encounter this?",
            EdgeCaseKind::Returning => "Does behavior change for repeat use?",
            EdgeCaseKind::Permissions => "Different roles, restricted access?",
            EdgeCaseKind::Offline => "What if the connection drops?",
            EdgeCaseKind::DataLimits => "Too much data? Too little? Unexpected formats?",
            EdgeCaseKind::Mobile => "Does this need to work across breakpoints?",
            EdgeCaseKind::Accessibility => "Keyboard nav, screen readers, contrast?",
        }
    }

    /// Lookup by [`EdgeCaseKind::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }
}

impl fmt::Display for EdgeCaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EdgeCaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("Unknown edge case: {}", s))
    }
}

/// Sections of an analysis, in canonical navigation and scoring order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    /// Feature name, requestor and origin.
    #[default]
    Overview,
    /// Problem & Purpose.
    Problem,
    /// User Context.
    Context,
    /// Assumption list.
    Assumptions,
    /// Edge-case checklist.
    Edges,
    /// Scope & Versions.
    Scope,
    /// Open questions.
    Questions,
    /// Confidence and next steps.
    Summary,
}

impl SectionId {
    /// Every section, in order.
    pub const ALL: [SectionId; 8] = [
        SectionId::Overview,
        SectionId::Problem,
        SectionId::Context,
        SectionId::Assumptions,
        SectionId::Edges,
        SectionId::Scope,
        SectionId::Questions,
        SectionId::Summary,
    ];

    /// Lowercase key used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            SectionId::Overview => "overview",
            SectionId::Problem => "problem",
            SectionId::Context => "context",
            SectionId::Assumptions => "assumptions",
            SectionId::Edges => "edges",
            SectionId::Scope => "scope",
            SectionId::Questions => "questions",
            SectionId::Summary => "summary",
        }
    }

    /// Heading used in navigation and reports.
    pub fn label(self) -> &'static str {
        match self {
            SectionId::Overview => "Overview",
            SectionId::Problem => "Problem & Purpose",
            SectionId::Context => "User Context",
            SectionId::Assumptions => "Assumptions",
            SectionId::Edges => "Edge Cases",
            SectionId::Scope => "Scope & Versions",
            SectionId::Questions => "Open Questions",
            SectionId::Summary => "Summary",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .iter()
            .copied()
            .find(|id| id.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown section: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for phase in VersionPhase::ALL {
            assert_eq!(VersionPhase::from_label(phase.label()), Some(*phase));
        }
        assert_eq!(VersionPhase::from_label("v1"), None);
        assert_eq!(VersionPhase::from_label(""), None);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("v1.1".parse::<VersionPhase>(), Ok(VersionPhase::V1_1));
        assert_eq!("won't".parse::<Priority>(), Ok(Priority::WontHave));
        assert_eq!(
            "needs research".parse::<AssumptionStatus>(),
            Ok(AssumptionStatus::NeedsResearch)
        );
        assert!("Someday".parse::<VersionPhase>().is_err());
    }

    #[test]
    fn test_option_serializes_as_label() {
        let json = serde_json::to_string(&QuestionType::NeedsStakeholderDecision).unwrap();
        assert_eq!(json, "\"Needs Stakeholder Decision\"");
        let back: Priority = serde_json::from_str("\"Won't\"").unwrap();
        assert_eq!(back, Priority::WontHave);
    }

    #[test]
    fn test_edge_catalog_has_ten_unique_keys() {
        let mut keys: Vec<_> = EdgeCaseKind::ALL.iter().map(|k| k.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 10);
        assert_eq!(EdgeCaseKind::from_key("firstTime"), Some(EdgeCaseKind::FirstTime));
        assert_eq!(EdgeCaseKind::from_key("first_time"), None);
    }

    #[test]
    fn test_section_order_is_canonical() {
        let keys: Vec<_> = SectionId::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            vec![
                "overview",
                "problem",
                "context",
                "assumptions",
                "edges",
                "scope",
                "questions",
                "summary"
            ]
        );
        assert_eq!("Edges".parse::<SectionId>(), Ok(SectionId::Edges));
    }
}

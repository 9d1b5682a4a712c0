//! Completion scoring for analysis documents.
//!
//! Sections are scored differently: the overview is either started or not,
//! text sections and the edge-case checklist report a percentage, and list
//! sections report how many items they hold. [`SectionCompletion`] keeps
//! those kinds apart and gives them one "filled" rule.

use serde::Serialize;

use crate::model::{Analysis, EdgeCaseKind, SectionId};

/// Progress indicator for a single section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SectionCompletion {
    /// Whether any key field has been started.
    Presence(bool),
    /// Share of fields filled, 0-100.
    Percent(u8),
    /// Number of items in a list section.
    Count(usize),
}

impl SectionCompletion {
    /// A section counts towards overall completion once it holds anything.
    pub fn is_filled(self) -> bool {
        match self {
            SectionCompletion::Presence(present) => present,
            SectionCompletion::Percent(pct) => pct > 0,
            SectionCompletion::Count(n) => n > 0,
        }
    }
}

impl std::fmt::Display for SectionCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionCompletion::Presence(true) => write!(f, "started"),
            SectionCompletion::Presence(false) => write!(f, "not started"),
            SectionCompletion::Percent(pct) => write!(f, "{}%", pct),
            SectionCompletion::Count(1) => write!(f, "1 item"),
            SectionCompletion::Count(n) => write!(f, "{} items", n),
        }
    }
}

/// `filled / total` as a whole percentage, rounding halves up.
fn percent(filled: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((filled as f64 / total as f64) * 100.0).round() as u8
}

fn count_non_empty(fields: &[&String]) -> usize {
    fields.iter().filter(|f| !f.is_empty()).count()
}

/// Score one section of a document.
pub fn section_completion(section: SectionId, analysis: &Analysis) -> SectionCompletion {
    match section {
        SectionId::Overview => {
            let o = &analysis.overview;
            SectionCompletion::Presence(
                !o.feature_name.is_empty() || !o.description.is_empty() || !o.origin.is_empty(),
            )
        }
        SectionId::Problem => {
            let p = &analysis.problem;
            let filled = count_non_empty(&[
                &p.problem,
                &p.who,
                &p.outcome,
                &p.metrics,
                &p.if_not_built,
            ]);
            SectionCompletion::Percent(percent(filled, 5))
        }
        SectionId::Context => {
            let c = &analysis.context;
            let filled = count_non_empty(&[
                &c.segments,
                &c.workflow,
                &c.workarounds,
                &c.triggers,
                &c.before_after,
            ]);
            SectionCompletion::Percent(percent(filled, 5))
        }
        SectionId::Assumptions => SectionCompletion::Count(analysis.assumptions.len()),
        SectionId::Edges => SectionCompletion::Percent(percent(
            analysis.edges.considered_count(),
            EdgeCaseKind::ALL.len(),
        )),
        SectionId::Scope => SectionCompletion::Count(analysis.scope.items.len()),
        SectionId::Questions => SectionCompletion::Count(analysis.questions.len()),
        SectionId::Summary => {
            let s = &analysis.summary;
            let filled = count_non_empty(&[&s.confidence, &s.concerns, &s.next_steps]);
            SectionCompletion::Percent(percent(filled, 3))
        }
    }
}

/// Scores for every section, in canonical order.
pub fn section_breakdown(analysis: &Analysis) -> Vec<(SectionId, SectionCompletion)> {
    SectionId::ALL
        .iter()
        .map(|section| (*section, section_completion(*section, analysis)))
        .collect()
}

/// Share of sections that hold anything, as a whole percentage.
pub fn overall_completion(analysis: &Analysis) -> u8 {
    let filled = SectionId::ALL
        .iter()
        .filter(|section| section_completion(**section, analysis).is_filled())
        .count();
    percent(filled, SectionId::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldPath, ScopeItem};

    #[test]
    fn test_blank_document_is_zero() {
        let analysis = Analysis::blank(None);
        assert_eq!(overall_completion(&analysis), 0);
        for (_, completion) in section_breakdown(&analysis) {
            assert!(!completion.is_filled());
        }
    }

    #[test]
    fn test_zero_values_are_not_filled() {
        assert!(!SectionCompletion::Presence(false).is_filled());
        assert!(!SectionCompletion::Percent(0).is_filled());
        assert!(!SectionCompletion::Count(0).is_filled());
        assert!(SectionCompletion::Presence(true).is_filled());
        assert!(SectionCompletion::Percent(10).is_filled());
        assert!(SectionCompletion::Count(1).is_filled());
    }

    #[test]
    fn test_single_overview_field_scores_thirteen() {
        let mut analysis = Analysis::blank(None);
        analysis
            .set_field(FieldPath::FeatureName, "Login Redesign")
            .unwrap();

        assert_eq!(
            section_completion(SectionId::Overview, &analysis),
            SectionCompletion::Presence(true)
        );
        for section in &SectionId::ALL[1..] {
            assert!(!section_completion(*section, &analysis).is_filled());
        }
        assert_eq!(overall_completion(&analysis), 13);
    }

    #[test]
    fn test_overview_ignores_date_and_requestor() {
        let mut analysis = Analysis::blank(None);
        analysis.set_field(FieldPath::Date, "2024-05-01").unwrap();
        analysis.set_field(FieldPath::Requestor, "Dana").unwrap();
        assert_eq!(
            section_completion(SectionId::Overview, &analysis),
            SectionCompletion::Presence(false)
        );
    }

    #[test]
    fn test_problem_three_of_five() {
        let mut analysis = Analysis::blank(None);
        analysis.set_field(FieldPath::Problem, "Slow login").unwrap();
        analysis.set_field(FieldPath::Who, "All users").unwrap();
        analysis.set_field(FieldPath::Outcome, "Sub-second").unwrap();
        assert_eq!(
            section_completion(SectionId::Problem, &analysis),
            SectionCompletion::Percent(60)
        );
    }

    #[test]
    fn test_edges_three_of_ten() {
        let mut analysis = Analysis::blank(None);
        analysis.toggle_edge(EdgeCaseKind::Empty);
        analysis.toggle_edge(EdgeCaseKind::Offline);
        analysis.toggle_edge(EdgeCaseKind::Accessibility);
        assert_eq!(
            section_completion(SectionId::Edges, &analysis),
            SectionCompletion::Percent(30)
        );
    }

    #[test]
    fn test_summary_rounds_thirds() {
        let mut analysis = Analysis::blank(None);
        analysis.set_field(FieldPath::Confidence, "Low").unwrap();
        assert_eq!(
            section_completion(SectionId::Summary, &analysis),
            SectionCompletion::Percent(33)
        );
        analysis.set_field(FieldPath::Concerns, "Timeline").unwrap();
        assert_eq!(
            section_completion(SectionId::Summary, &analysis),
            SectionCompletion::Percent(67)
        );
    }

    #[test]
    fn test_list_sections_report_counts() {
        let mut analysis = Analysis::blank(None);
        analysis.add_assumption("a");
        analysis.add_assumption("b");
        analysis.add_scope_item(ScopeItem::new("x"));
        assert_eq!(
            section_completion(SectionId::Assumptions, &analysis),
            SectionCompletion::Count(2)
        );
        assert_eq!(
            section_completion(SectionId::Scope, &analysis),
            SectionCompletion::Count(1)
        );
        assert_eq!(
            section_completion(SectionId::Questions, &analysis),
            SectionCompletion::Count(0)
        );
    }

    #[test]
    fn test_three_sections_round_to_thirty_eight() {
        let mut analysis = Analysis::blank(None);
        analysis.set_field(FieldPath::Origin, "Other").unwrap();
        analysis.add_question("q");
        analysis.set_field(FieldPath::NextSteps, "Ship").unwrap();
        assert_eq!(overall_completion(&analysis), 38);
    }

    #[test]
    fn test_fully_filled_is_one_hundred() {
        let mut analysis = Analysis::blank(None);
        analysis.set_field(FieldPath::Description, "d").unwrap();
        analysis.set_field(FieldPath::Metrics, "m").unwrap();
        analysis.set_field(FieldPath::Triggers, "t").unwrap();
        analysis.add_assumption("a");
        analysis.toggle_edge(EdgeCaseKind::Error);
        analysis.add_scope_item(ScopeItem::new("s"));
        analysis.add_question("q");
        analysis.set_field(FieldPath::Concerns, "c").unwrap();
        assert_eq!(overall_completion(&analysis), 100);
    }

    #[test]
    fn test_overall_matches_filled_rule() {
        let mut analysis = Analysis::blank(None);
        analysis.set_field(FieldPath::Workflow, "w").unwrap();
        analysis.add_scope_item(ScopeItem::new("s"));
        let filled = section_breakdown(&analysis)
            .iter()
            .filter(|(_, c)| c.is_filled())
            .count();
        let expected = (100.0 * filled as f64 / 8.0).round() as u8;
        assert_eq!(overall_completion(&analysis), expected);
        assert_eq!(expected, 25);
    }

    #[test]
    fn test_display() {
        assert_eq!(SectionCompletion::Percent(40).to_string(), "40%");
        assert_eq!(SectionCompletion::Count(1).to_string(), "1 item");
        assert_eq!(SectionCompletion::Count(3).to_string(), "3 items");
        assert_eq!(SectionCompletion::Presence(true).to_string(), "started");
    }
}

//! Markdown report rendering.

use crate::model::{Analysis, SectionId};

/// Heading used when a document has no name.
const UNNAMED_REPORT_TITLE: &str = "Requirement Analysis";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn heading(section: SectionId) -> String {
    format!("## {}", section.label())
}

fn field(label: &str, value: &str) -> String {
    format!("**{}:** {}", label, value)
}

/// Render a document as a Markdown report.
///
/// One-way: the report is for reading and is never parsed back.
pub fn to_report(analysis: &Analysis) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "# {}\n",
        or_default(&analysis.name, UNNAMED_REPORT_TITLE)
    ));
    lines.push(field("Phase", or_default(&analysis.phase, "N/A")));
    lines.push(format!(
        "{}\n",
        field(
            "Last Updated",
            &analysis.updated_at.format("%Y-%m-%d").to_string()
        )
    ));
    lines.push("---\n".to_string());

    let o = &analysis.overview;
    lines.push(heading(SectionId::Overview));
    lines.push(field("Feature Name", &o.feature_name));
    lines.push(field("Date", &o.date));
    lines.push(field("Requestor", &o.requestor));
    lines.push(field("Origin", &o.origin));
    lines.push(format!("{}\n", field("Description", &o.description)));

    let p = &analysis.problem;
    lines.push(heading(SectionId::Problem));
    lines.push(field("Problem", &p.problem));
    lines.push(field("Who", &p.who));
    lines.push(field("Desired Outcome", &p.outcome));
    lines.push(field("Success Metrics", &p.metrics));
    lines.push(format!("{}\n", field("If Not Built", &p.if_not_built)));

    let c = &analysis.context;
    lines.push(heading(SectionId::Context));
    lines.push(field("User Segments", &c.segments));
    lines.push(field("Current Workflow", &c.workflow));
    lines.push(field("Existing Workarounds", &c.workarounds));
    lines.push(field("What Triggers This Need", &c.triggers));
    lines.push(format!("{}\n", field("Before/After", &c.before_after)));

    lines.push(heading(SectionId::Assumptions));
    for (i, a) in analysis.assumptions.iter().enumerate() {
        lines.push(format!("{}. **{}** ({})", i + 1, a.assumption, a.status));
        if !a.validation.is_empty() {
            lines.push(format!("   - Validation: {}", a.validation));
        }
    }
    lines.push(String::new());

    lines.push(heading(SectionId::Edges));
    for (kind, entry) in analysis.edges.iter() {
        if entry.considered {
            lines.push(format!(
                "- **{}:** {}",
                kind.label(),
                or_default(&entry.notes, "Considered")
            ));
        }
    }
    lines.push(String::new());

    let s = &analysis.scope;
    lines.push(heading(SectionId::Scope));
    lines.push(field("Affected Areas", &s.affected));
    lines.push(field("New Patterns", &s.new_patterns));
    lines.push(field("Technical Considerations", &s.technical));
    if !s.items.is_empty() {
        lines.push("\n### Scope Items".to_string());
        for (i, item) in s.items.iter().enumerate() {
            lines.push(format!(
                "{}. {} [{}] [{}]",
                i + 1,
                item.item,
                or_default(&item.version, crate::scope::UNTAGGED),
                item.priority
            ));
            if !item.description.is_empty() {
                lines.push(format!("   {}", item.description));
            }
        }
    }
    lines.push(String::new());

    lines.push(heading(SectionId::Questions));
    for (i, q) in analysis.questions.iter().enumerate() {
        lines.push(format!(
            "{}. **{}** ({}) [{}]",
            i + 1,
            q.question,
            q.kind,
            q.status
        ));
        if !q.answer.is_empty() {
            lines.push(format!("   - Answer: {}", q.answer));
        }
    }
    lines.push(String::new());

    let sm = &analysis.summary;
    lines.push(heading(SectionId::Summary));
    lines.push(field("Confidence Level", &sm.confidence));
    lines.push(field("Concerns/Risks", &sm.concerns));
    lines.push(field("Next Steps", &sm.next_steps));

    lines.join("\n")
}

//! Analysis document model.
//!
//! An [`Analysis`] is the root record edited by the user. Every field
//! deserializes leniently: a missing field, a `null` or a value of the wrong
//! type takes its default, so documents written by older versions (or
//! hand-edited share tokens) load without errors. They are then brought up to
//! shape by [`Analysis::normalize`].

mod fields;
mod lenient;
mod options;


pub use fields::{AssumptionField, FieldPath, QuestionField, ScopeItemField};
pub use options::{
    AssumptionStatus, Confidence, EdgeCaseKind, Origin, Priority, QuestionStatus, QuestionType,
    SectionId, VersionPhase,
};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Name given to documents created without one.
pub const DEFAULT_ANALYSIS_NAME: &str = "Untitled Analysis";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_name() -> String {
    DEFAULT_ANALYSIS_NAME.to_string()
}

/// A requirement analysis document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Unique identifier, fixed at creation.
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    /// Display name.
    #[serde(default = "default_name", deserialize_with = "lenient::name")]
    pub name: String,
    /// Target release phase label, empty when unset.
    #[serde(default, deserialize_with = "lenient::string")]
    pub phase: String,
    /// When the document was created.
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    pub created_at: DateTime<Utc>,
    /// When any field of the document last changed.
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Overview section.
    #[serde(default, deserialize_with = "lenient::record")]
    pub overview: Overview,
    /// Problem & Purpose section.
    #[serde(default, deserialize_with = "lenient::record")]
    pub problem: Problem,
    /// User Context section.
    #[serde(default, deserialize_with = "lenient::record")]
    pub context: Context,
    /// Assumptions, in the order they were added.
    #[serde(default, deserialize_with = "lenient::list")]
    pub assumptions: Vec<Assumption>,
    /// Edge-case checklist.
    #[serde(default, deserialize_with = "lenient::record")]
    pub edges: EdgeCases,
    /// Scope & Versions section.
    #[serde(default, deserialize_with = "lenient::record")]
    pub scope: Scope,
    /// Open questions, in the order they were added.
    #[serde(default, deserialize_with = "lenient::list")]
    pub questions: Vec<Question>,
    /// Closing summary.
    #[serde(default, deserialize_with = "lenient::record")]
    pub summary: Summary,
}

/// Basic facts about the requested feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Overview {
    /// Short name of the feature.
    #[serde(deserialize_with = "lenient::string")]
    pub feature_name: String,
    /// Free-form request date.
    #[serde(deserialize_with = "lenient::string")]
    pub date: String,
    /// Who asked for it.
    #[serde(deserialize_with = "lenient::string")]
    pub requestor: String,
    /// Longer free-form description.
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    /// One of the [`Origin`] labels, or empty.
    #[serde(deserialize_with = "lenient::string")]
    pub origin: String,
}

/// Problem statement and purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Problem {
    /// The problem being solved.
    #[serde(deserialize_with = "lenient::string")]
    pub problem: String,
    /// Who has the problem.
    #[serde(deserialize_with = "lenient::string")]
    pub who: String,
    /// Desired outcome.
    #[serde(deserialize_with = "lenient::string")]
    pub outcome: String,
    /// Success metrics.
    #[serde(deserialize_with = "lenient::string")]
    pub metrics: String,
    /// What happens if nothing is built.
    #[serde(deserialize_with = "lenient::string")]
    pub if_not_built: String,
}

/// How users encounter the problem today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Context {
    /// User segments affected.
    #[serde(deserialize_with = "lenient::string")]
    pub segments: String,
    /// Current workflow.
    #[serde(deserialize_with = "lenient::string")]
    pub workflow: String,
    /// Existing workarounds.
    #[serde(deserialize_with = "lenient::string")]
    pub workarounds: String,
    /// What triggers the need.
    #[serde(deserialize_with = "lenient::string")]
    pub triggers: String,
    /// Before/after comparison.
    #[serde(deserialize_with = "lenient::string")]
    pub before_after: String,
}

/// An assumption the analysis depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumption {
    /// Identifier within the document.
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// The assumption itself.
    #[serde(deserialize_with = "lenient::string")]
    pub assumption: String,
    /// One of the [`AssumptionStatus`] labels.
    #[serde(deserialize_with = "lenient::assumption_status")]
    pub status: String,
    /// How it will be validated.
    #[serde(deserialize_with = "lenient::string")]
    pub validation: String,
}

impl Default for Assumption {
    fn default() -> Self {
        Self {
            id: String::new(),
            assumption: String::new(),
            status: AssumptionStatus::Unvalidated.label().to_string(),
            validation: String::new(),
        }
    }
}

impl Assumption {
    /// Create an unvalidated assumption with a fresh id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            assumption: text.into(),
            ..Self::default()
        }
    }

    /// Typed status, `None` when the stored label is unrecognized.
    pub fn status(&self) -> Option<AssumptionStatus> {
        AssumptionStatus::from_label(&self.status)
    }
}

/// Whether an edge case was thought through, and what was decided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeCaseEntry {
    /// Checked off in the checklist.
    #[serde(deserialize_with = "lenient::flag")]
    pub considered: bool,
    /// What was decided.
    #[serde(deserialize_with = "lenient::string")]
    pub notes: String,
}

/// Edge-case entries keyed by [`EdgeCaseKind::key`].
///
/// Always holds an entry for every catalog key. Keys outside the catalog are
/// kept as loaded but never scored or reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EdgeCases(BTreeMap<String, EdgeCaseEntry>);

impl<'de> Deserialize<'de> for EdgeCases {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, entry)| (key, serde_json::from_value(entry).unwrap_or_default()))
                .collect(),
            _ => BTreeMap::new(),
        };
        Ok(Self(entries))
    }
}

impl Default for EdgeCases {
    fn default() -> Self {
        let mut edges = Self(BTreeMap::new());
        edges.backfill();
        edges
    }
}

impl EdgeCases {
    /// Insert a blank entry for every catalog key that is missing.
    pub fn backfill(&mut self) {
        for kind in EdgeCaseKind::ALL {
            self.0.entry(kind.key().to_string()).or_default();
        }
    }

    /// Entry for a catalog category.
    pub fn get(&self, kind: EdgeCaseKind) -> Option<&EdgeCaseEntry> {
        self.0.get(kind.key())
    }

    fn entry_mut(&mut self, kind: EdgeCaseKind) -> &mut EdgeCaseEntry {
        self.0.entry(kind.key().to_string()).or_default()
    }

    /// Whether a category is checked off; missing entries are not.
    pub fn is_considered(&self, kind: EdgeCaseKind) -> bool {
        self.get(kind).map(|e| e.considered).unwrap_or(false)
    }

    /// Number of catalog categories marked as considered.
    pub fn considered_count(&self) -> usize {
        EdgeCaseKind::ALL
            .iter()
            .filter(|kind| self.is_considered(**kind))
            .count()
    }

    /// Catalog entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeCaseKind, &EdgeCaseEntry)> + '_ {
        EdgeCaseKind::ALL
            .iter()
            .filter_map(move |kind| self.get(*kind).map(|entry| (*kind, entry)))
    }

    /// Number of stored keys, including any outside the catalog.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` only before backfilling.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scope of the change and its itemized breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scope {
    /// Areas of the product affected.
    #[serde(deserialize_with = "lenient::string")]
    pub affected: String,
    /// New UI or interaction patterns.
    #[serde(deserialize_with = "lenient::string")]
    pub new_patterns: String,
    /// Technical considerations.
    #[serde(deserialize_with = "lenient::string")]
    pub technical: String,
    /// Deliverables, in the order they were added.
    #[serde(deserialize_with = "lenient::list")]
    pub items: Vec<ScopeItem>,
}

/// A single deliverable, tagged with the phase it ships in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeItem {
    /// Identifier within the document.
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// What is delivered.
    #[serde(deserialize_with = "lenient::string")]
    pub item: String,
    /// Longer free-form description.
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    /// One of the [`VersionPhase`] labels, or empty when untagged.
    #[serde(deserialize_with = "lenient::string")]
    pub version: String,
    /// One of the [`Priority`] labels.
    #[serde(deserialize_with = "lenient::priority")]
    pub priority: String,
}

impl Default for ScopeItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            item: String::new(),
            description: String::new(),
            version: String::new(),
            priority: Priority::Must.label().to_string(),
        }
    }
}

impl ScopeItem {
    /// Create an untagged, must-have item with a fresh id.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            item: item.into(),
            ..Self::default()
        }
    }

    /// Tag the item with a phase.
    pub fn with_version(mut self, phase: VersionPhase) -> Self {
        self.version = phase.label().to_string();
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority.label().to_string();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Typed phase, `None` for untagged items and unrecognized labels.
    pub fn phase(&self) -> Option<VersionPhase> {
        VersionPhase::from_label(&self.version)
    }

    /// Typed priority, `None` when the stored label is unrecognized.
    pub fn priority(&self) -> Option<Priority> {
        Priority::from_label(&self.priority)
    }
}

/// A question that must be resolved before or during delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    /// Identifier within the document.
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// The question itself.
    #[serde(deserialize_with = "lenient::string")]
    pub question: String,
    /// One of the [`QuestionType`] labels.
    #[serde(rename = "type", deserialize_with = "lenient::question_type")]
    pub kind: String,
    /// One of the [`QuestionStatus`] labels.
    #[serde(deserialize_with = "lenient::question_status")]
    pub status: String,
    /// Only meaningful once the question is answered.
    #[serde(deserialize_with = "lenient::string")]
    pub answer: String,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            id: String::new(),
            question: String::new(),
            kind: QuestionType::CanAnswerNow.label().to_string(),
            status: QuestionStatus::Open.label().to_string(),
            answer: String::new(),
        }
    }
}

impl Question {
    /// Create an open question with a fresh id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            question: text.into(),
            ..Self::default()
        }
    }

    /// Typed question type, `None` when unrecognized.
    pub fn kind(&self) -> Option<QuestionType> {
        QuestionType::from_label(&self.kind)
    }

    /// Typed status, `None` when unrecognized.
    pub fn status(&self) -> Option<QuestionStatus> {
        QuestionStatus::from_label(&self.status)
    }
}

/// Closing assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Summary {
    /// One of the [`Confidence`] labels, or empty.
    #[serde(deserialize_with = "lenient::string")]
    pub confidence: String,
    /// Concerns and risks.
    #[serde(deserialize_with = "lenient::string")]
    pub concerns: String,
    /// Next steps.
    #[serde(deserialize_with = "lenient::string")]
    pub next_steps: String,
}

impl Analysis {
    /// Create a blank document with a fresh id.
    pub fn blank(name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.map(str::to_string).unwrap_or_else(default_name),
            phase: String::new(),
            created_at: now,
            updated_at: now,
            overview: Overview::default(),
            problem: Problem::default(),
            context: Context::default(),
            assumptions: Vec::new(),
            edges: EdgeCases::default(),
            scope: Scope::default(),
            questions: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Parse a document from loosely shaped JSON and normalize it.
    ///
    /// Fails only when `value` is not a JSON object.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_value(value)?;
        serde_json::from_value::<Self>(serde_json::Value::Object(fields)).map(Self::normalize)
    }

    /// Bring a loaded document up to the current shape.
    ///
    /// Missing records were already defaulted during deserialization; this
    /// fills in identifiers and edge-case keys. Idempotent.
    pub fn normalize(mut self) -> Self {
        if self.id.is_empty() {
            self.id = new_id();
        }
        self.edges.backfill();
        for item in &mut self.assumptions {
            if item.id.is_empty() {
                item.id = new_id();
            }
        }
        for item in &mut self.scope.items {
            if item.id.is_empty() {
                item.id = new_id();
            }
        }
        for item in &mut self.questions {
            if item.id.is_empty() {
                item.id = new_id();
            }
        }
        self
    }

    /// Typed target phase.
    pub fn target_phase(&self) -> Option<VersionPhase> {
        VersionPhase::from_label(&self.phase)
    }

    /// Record that the document changed.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Set any top-level or section text field.
    ///
    /// Enumerated fields accept an empty value (unset) or one of their
    /// options, matched case-insensitively and stored as the canonical label.
    pub fn set_field(&mut self, path: FieldPath, value: &str) -> ModelResult<()> {
        let value = path.canonical_value(value)?;
        *self.field_mut(path) = value;
        self.touch();
        debug!(analysis_id = %self.id, field = %path, "Field updated");
        Ok(())
    }

    /// Current value of a text field.
    pub fn field(&self, path: FieldPath) -> &str {
        match path {
            FieldPath::Name => &self.name,
            FieldPath::Phase => &self.phase,
            FieldPath::FeatureName => &self.overview.feature_name,
            FieldPath::Date => &self.overview.date,
            FieldPath::Requestor => &self.overview.requestor,
            FieldPath::Description => &self.overview.description,
            FieldPath::Origin => &self.overview.origin,
            FieldPath::Problem => &self.problem.problem,
            FieldPath::Who => &self.problem.who,
            FieldPath::Outcome => &self.problem.outcome,
            FieldPath::Metrics => &self.problem.metrics,
            FieldPath::IfNotBuilt => &self.problem.if_not_built,
            FieldPath::Segments => &self.context.segments,
            FieldPath::Workflow => &self.context.workflow,
            FieldPath::Workarounds => &self.context.workarounds,
            FieldPath::Triggers => &self.context.triggers,
            FieldPath::BeforeAfter => &self.context.before_after,
            FieldPath::Affected => &self.scope.affected,
            FieldPath::NewPatterns => &self.scope.new_patterns,
            FieldPath::Technical => &self.scope.technical,
            FieldPath::Confidence => &self.summary.confidence,
            FieldPath::Concerns => &self.summary.concerns,
            FieldPath::NextSteps => &self.summary.next_steps,
        }
    }

    fn field_mut(&mut self, path: FieldPath) -> &mut String {
        match path {
            FieldPath::Name => &mut self.name,
            FieldPath::Phase => &mut self.phase,
            FieldPath::FeatureName => &mut self.overview.feature_name,
            FieldPath::Date => &mut self.overview.date,
            FieldPath::Requestor => &mut self.overview.requestor,
            FieldPath::Description => &mut self.overview.description,
            FieldPath::Origin => &mut self.overview.origin,
            FieldPath::Problem => &mut self.problem.problem,
            FieldPath::Who => &mut self.problem.who,
            FieldPath::Outcome => &mut self.problem.outcome,
            FieldPath::Metrics => &mut self.problem.metrics,
            FieldPath::IfNotBuilt => &mut self.problem.if_not_built,
            FieldPath::Segments => &mut self.context.segments,
            FieldPath::Workflow => &mut self.context.workflow,
            FieldPath::Workarounds => &mut self.context.workarounds,
            FieldPath::Triggers => &mut self.context.triggers,
            FieldPath::BeforeAfter => &mut self.context.before_after,
            FieldPath::Affected => &mut self.scope.affected,
            FieldPath::NewPatterns => &mut self.scope.new_patterns,
            FieldPath::Technical => &mut self.scope.technical,
            FieldPath::Confidence => &mut self.summary.confidence,
            FieldPath::Concerns => &mut self.summary.concerns,
            FieldPath::NextSteps => &mut self.summary.next_steps,
        }
    }

    // Assumptions

    /// Append an assumption and return its id.
    pub fn add_assumption(&mut self, text: impl Into<String>) -> String {
        let item = Assumption::new(text);
        let id = item.id.clone();
        self.assumptions.push(item);
        self.touch();
        id
    }

    pub fn update_assumption(
        &mut self,
        id: &str,
        field: AssumptionField,
        value: &str,
    ) -> ModelResult<()> {
        let value = field.canonical_value(value)?;
        let item = self
            .assumptions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Assumption", id))?;
        match field {
            AssumptionField::Assumption => item.assumption = value,
            AssumptionField::Status => item.status = value,
            AssumptionField::Validation => item.validation = value,
        }
        self.touch();
        Ok(())
    }

    pub fn remove_assumption(&mut self, id: &str) -> ModelResult<Assumption> {
        let pos = self
            .assumptions
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| not_found("Assumption", id))?;
        let removed = self.assumptions.remove(pos);
        self.touch();
        Ok(removed)
    }

    // Edge cases

    /// Flip the considered flag and return the new value.
    pub fn toggle_edge(&mut self, kind: EdgeCaseKind) -> bool {
        let entry = self.edges.entry_mut(kind);
        entry.considered = !entry.considered;
        let considered = entry.considered;
        self.touch();
        considered
    }

    pub fn set_edge_considered(&mut self, kind: EdgeCaseKind, considered: bool) {
        self.edges.entry_mut(kind).considered = considered;
        self.touch();
    }

    pub fn set_edge_notes(&mut self, kind: EdgeCaseKind, notes: impl Into<String>) {
        self.edges.entry_mut(kind).notes = notes.into();
        self.touch();
    }

    // Scope items

    /// Append a scope item and return its id.
    pub fn add_scope_item(&mut self, item: ScopeItem) -> String {
        let mut item = item;
        if item.id.is_empty() {
            item.id = new_id();
        }
        let id = item.id.clone();
        self.scope.items.push(item);
        self.touch();
        id
    }

    pub fn update_scope_item(
        &mut self,
        id: &str,
        field: ScopeItemField,
        value: &str,
    ) -> ModelResult<()> {
        let value = field.canonical_value(value)?;
        let item = self
            .scope
            .items
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Scope item", id))?;
        match field {
            ScopeItemField::Item => item.item = value,
            ScopeItemField::Description => item.description = value,
            ScopeItemField::Version => item.version = value,
            ScopeItemField::Priority => item.priority = value,
        }
        self.touch();
        Ok(())
    }

    pub fn remove_scope_item(&mut self, id: &str) -> ModelResult<ScopeItem> {
        let pos = self
            .scope
            .items
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("Scope item", id))?;
        let removed = self.scope.items.remove(pos);
        self.touch();
        Ok(removed)
    }

    // Questions

    /// Append an open question and return its id.
    pub fn add_question(&mut self, text: impl Into<String>) -> String {
        let item = Question::new(text);
        let id = item.id.clone();
        self.questions.push(item);
        self.touch();
        id
    }

    pub fn update_question(&mut self, id: &str, field: QuestionField, value: &str) -> ModelResult<()> {
        let value = field.canonical_value(value)?;
        let item = self
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| not_found("Question", id))?;
        match field {
            QuestionField::Question => item.question = value,
            QuestionField::Type => item.kind = value,
            QuestionField::Status => item.status = value,
            QuestionField::Answer => item.answer = value,
        }
        self.touch();
        Ok(())
    }

    pub fn remove_question(&mut self, id: &str) -> ModelResult<Question> {
        let pos = self
            .questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| not_found("Question", id))?;
        let removed = self.questions.remove(pos);
        self.touch();
        Ok(removed)
    }
}

fn not_found(kind: &'static str, id: &str) -> ModelError {
    ModelError::ItemNotFound {
        kind,
        id: id.to_string(),
    }
}

//! Addressable fields for narrow document updates.

use std::fmt;
use std::str::FromStr;

use super::options::{
    AssumptionStatus, Confidence, Origin, Priority, QuestionStatus, QuestionType, SectionId,
    VersionPhase,
};
use crate::error::{ModelError, ModelResult};

/// Resolve `value` against an option set.
///
/// Empty input is accepted only when the field may be unset.
fn canonical_option<T>(field: &str, value: &str, allow_empty: bool) -> ModelResult<String>
where
    T: FromStr + fmt::Display,
{
    let trimmed = value.trim();
    if trimmed.is_empty() && allow_empty {
        return Ok(String::new());
    }
    trimmed
        .parse::<T>()
        .map(|option| option.to_string())
        .map_err(|_| ModelError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// A single-valued text field of an [`Analysis`](super::Analysis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// `name`
    Name,
    /// `phase`
    Phase,
    /// `overview.featureName`
    FeatureName,
    /// `overview.date`
    Date,
    /// `overview.requestor`
    Requestor,
    /// `overview.description`
    Description,
    /// `overview.origin`
    Origin,
    /// `problem.problem`
    Problem,
    /// `problem.who`
    Who,
    /// `problem.outcome`
    Outcome,
    /// `problem.metrics`
    Metrics,
    /// `problem.ifNotBuilt`
    IfNotBuilt,
    /// `context.segments`
    Segments,
    /// `context.workflow`
    Workflow,
    /// `context.workarounds`
    Workarounds,
    /// `context.triggers`
    Triggers,
    /// `context.beforeAfter`
    BeforeAfter,
    /// `scope.affected`
    Affected,
    /// `scope.newPatterns`
    NewPatterns,
    /// `scope.technical`
    Technical,
    /// `summary.confidence`
    Confidence,
    /// `summary.concerns`
    Concerns,
    /// `summary.nextSteps`
    NextSteps,
}

impl FieldPath {
    /// Every field, in section order.
    pub const ALL: [FieldPath; 23] = [
        FieldPath::Name,
        FieldPath::Phase,
        FieldPath::FeatureName,
        FieldPath::Date,
        FieldPath::Requestor,
        FieldPath::Description,
        FieldPath::Origin,
        FieldPath::Problem,
        FieldPath::Who,
        FieldPath::Outcome,
        FieldPath::Metrics,
        FieldPath::IfNotBuilt,
        FieldPath::Segments,
        FieldPath::Workflow,
        FieldPath::Workarounds,
        FieldPath::Triggers,
        FieldPath::BeforeAfter,
        FieldPath::Affected,
        FieldPath::NewPatterns,
        FieldPath::Technical,
        FieldPath::Confidence,
        FieldPath::Concerns,
        FieldPath::NextSteps,
    ];

    /// Dotted path matching the persisted JSON layout, e.g. `problem.ifNotBuilt`.
    pub fn path(self) -> &'static str {
        match self {
            FieldPath::Name => "name",
            FieldPath::Phase => "phase",
            FieldPath::FeatureName => "overview.featureName",
            FieldPath::Date => "overview.date",
            FieldPath::Requestor => "overview.requestor",
            FieldPath::Description => "overview.description",
            FieldPath::Origin => "overview.origin",
            FieldPath::Problem => "problem.problem",
            FieldPath::Who => "problem.who",
            FieldPath::Outcome => "problem.outcome",
            FieldPath::Metrics => "problem.metrics",
            FieldPath::IfNotBuilt => "problem.ifNotBuilt",
            FieldPath::Segments => "context.segments",
            FieldPath::Workflow => "context.workflow",
            FieldPath::Workarounds => "context.workarounds",
            FieldPath::Triggers => "context.triggers",
            FieldPath::BeforeAfter => "context.beforeAfter",
            FieldPath::Affected => "scope.affected",
            FieldPath::NewPatterns => "scope.newPatterns",
            FieldPath::Technical => "scope.technical",
            FieldPath::Confidence => "summary.confidence",
            FieldPath::Concerns => "summary.concerns",
            FieldPath::NextSteps => "summary.nextSteps",
        }
    }

    /// Section the field belongs to; `None` for top-level fields.
    pub fn section(self) -> Option<SectionId> {
        let (head, _) = self.path().split_once('.')?;
        head.parse().ok()
    }

    /// Validate and canonicalize a new value for this field.
    pub fn canonical_value(self, value: &str) -> ModelResult<String> {
        let field = self.path();
        match self {
            FieldPath::Phase => canonical_option::<VersionPhase>(field, value, true),
            FieldPath::Origin => canonical_option::<Origin>(field, value, true),
            FieldPath::Confidence => canonical_option::<Confidence>(field, value, true),
            _ => Ok(value.to_string()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for FieldPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::ALL
            .iter()
            .copied()
            .find(|f| f.path() == s.trim())
            .ok_or_else(|| ModelError::UnknownField {
                path: s.to_string(),
            })
    }
}

/// Editable fields of an assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssumptionField {
    /// The assumption text.
    Assumption,
    /// Validation status.
    Status,
    /// How it will be validated.
    Validation,
}

impl AssumptionField {
    /// Validate and canonicalize a new value for this field.
    pub fn canonical_value(self, value: &str) -> ModelResult<String> {
        match self {
            AssumptionField::Status => {
                canonical_option::<AssumptionStatus>("status", value, false)
            }
            _ => Ok(value.to_string()),
        }
    }
}

impl FromStr for AssumptionField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "assumption" | "text" => Ok(AssumptionField::Assumption),
            "status" => Ok(AssumptionField::Status),
            "validation" => Ok(AssumptionField::Validation),
            other => Err(ModelError::UnknownField {
                path: format!("assumption.{}", other),
            }),
        }
    }
}

/// Editable fields of a scope item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeItemField {
    /// Item name.
    Item,
    /// Item description.
    Description,
    /// Phase tag.
    Version,
    /// MoSCoW priority.
    Priority,
}

impl ScopeItemField {
    /// Validate and canonicalize a new value for this field.
    pub fn canonical_value(self, value: &str) -> ModelResult<String> {
        match self {
            ScopeItemField::Version => canonical_option::<VersionPhase>("version", value, true),
            ScopeItemField::Priority => canonical_option::<Priority>("priority", value, false),
            _ => Ok(value.to_string()),
        }
    }
}

impl FromStr for ScopeItemField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "item" | "name" => Ok(ScopeItemField::Item),
            "description" => Ok(ScopeItemField::Description),
            "version" => Ok(ScopeItemField::Version),
            "priority" => Ok(ScopeItemField::Priority),
            other => Err(ModelError::UnknownField {
                path: format!("scope.items.{}", other),
            }),
        }
    }
}

/// Editable fields of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionField {
    /// The question text.
    Question,
    /// Who can resolve it.
    Type,
    /// Open or answered.
    Status,
    /// The answer.
    Answer,
}

impl QuestionField {
    /// Validate and canonicalize a new value for this field.
    pub fn canonical_value(self, value: &str) -> ModelResult<String> {
        match self {
            QuestionField::Type => canonical_option::<QuestionType>("type", value, false),
            QuestionField::Status => canonical_option::<QuestionStatus>("status", value, false),
            _ => Ok(value.to_string()),
        }
    }
}

impl FromStr for QuestionField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "question" | "text" => Ok(QuestionField::Question),
            "type" => Ok(QuestionField::Type),
            "status" => Ok(QuestionField::Status),
            "answer" => Ok(QuestionField::Answer),
            other => Err(ModelError::UnknownField {
                path: format!("question.{}", other),
            }),
        }
    }
}

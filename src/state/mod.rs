//! Editor state: the open documents and what the user is looking at.
//!
//! [`AppState`] is pure and synchronous. [`Workspace`] pairs it with a
//! [`DocumentStore`](crate::storage::DocumentStore) and saves after every
//! change.

mod workspace;

pub use workspace::{Workspace, ACTIVE_ID_KEY};

use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};
use crate::model::{Analysis, SectionId};
use crate::scope::PhaseFilter;

/// The document collection plus view state.
///
/// Always holds at least one document, and the active id always names one of
/// them.
#[derive(Debug, Clone)]
pub struct AppState {
    analyses: Vec<Analysis>,
    active_id: String,
    /// Section currently shown.
    pub active_section: SectionId,
    /// Scope items filter currently applied.
    pub phase_filter: PhaseFilter,
}

impl AppState {
    /// Build state from loaded documents; the first one becomes active.
    pub fn from_documents(mut analyses: Vec<Analysis>) -> Self {
        if analyses.is_empty() {
            analyses.push(Analysis::blank(None));
        }
        let active_id = analyses[0].id.clone();
        Self {
            analyses,
            active_id,
            active_section: SectionId::default(),
            phase_filter: PhaseFilter::default(),
        }
    }

    /// All documents, in creation order.
    pub fn analyses(&self) -> &[Analysis] {
        &self.analyses
    }

    /// Id of the document being edited.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The document being edited.
    pub fn active(&self) -> &Analysis {
        self.analyses
            .iter()
            .find(|a| a.id == self.active_id)
            .unwrap_or(&self.analyses[0])
    }

    /// Look up a document by id.
    pub fn get(&self, id: &str) -> Option<&Analysis> {
        self.analyses.iter().find(|a| a.id == id)
    }

    /// Apply an edit to the active document.
    pub fn update_active<T>(&mut self, edit: impl FnOnce(&mut Analysis) -> T) -> T {
        let active_id = self.active_id.clone();
        let index = self
            .analyses
            .iter()
            .position(|a| a.id == active_id)
            .unwrap_or(0);
        edit(&mut self.analyses[index])
    }

    /// Switch the active document.
    pub fn set_active(&mut self, id: &str) -> ModelResult<()> {
        if self.get(id).is_none() {
            return Err(ModelError::AnalysisNotFound { id: id.to_string() });
        }
        self.active_id = id.to_string();
        debug!(analysis_id = %id, "Active analysis changed");
        Ok(())
    }

    /// Append a blank document, make it active and return its id.
    pub fn add_blank(&mut self, name: Option<&str>) -> String {
        let analysis = Analysis::blank(name);
        let id = analysis.id.clone();
        self.analyses.push(analysis);
        self.active_id = id.clone();
        self.active_section = SectionId::Overview;
        info!(analysis_id = %id, count = self.analyses.len(), "Analysis created");
        id
    }

    /// Delete a document.
    ///
    /// Returns `Ok(false)` without changing anything when it is the only
    /// document. Deleting the active document activates the first remaining
    /// one.
    pub fn remove(&mut self, id: &str) -> ModelResult<bool> {
        let index = self
            .analyses
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| ModelError::AnalysisNotFound { id: id.to_string() })?;

        if self.analyses.len() <= 1 {
            debug!(analysis_id = %id, "Refusing to delete the last analysis");
            return Ok(false);
        }

        self.analyses.remove(index);
        if self.active_id == id {
            self.active_id = self.analyses[0].id.clone();
        }
        info!(analysis_id = %id, count = self.analyses.len(), "Analysis deleted");
        Ok(true)
    }

    /// Replace every document with a shared one and make it active.
    pub fn install_shared(&mut self, analysis: Analysis) {
        self.active_id = analysis.id.clone();
        self.analyses = vec![analysis];
        self.active_section = SectionId::Overview;
        info!(analysis_id = %self.active_id, "Shared analysis installed");
    }
}

//! Project record: the idea, the proposal and the workflow stage.
//!
//! DESIGN
//! ======
//! A `Project` is a plain value. It is only ever changed through the
//! [`store::ProjectStore`], which clones it, applies an update and swaps the
//! whole record back in.

pub mod ethics;
pub mod sections;
pub mod store;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use ethics::{EthicsEvent, EthicsStatus, EthicsTransition};
pub use sections::SectionId;

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// IDEA
// =============================================================================

/// Output of the first wizard stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub concept: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub objective: String,
}

impl Idea {
    /// An idea counts as populated once its concept has been written.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        !self.concept.trim().is_empty()
    }
}

// =============================================================================
// PROPOSAL
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Section text keyed by catalog id. Missing keys read as "".
    #[serde(default)]
    pub sections: BTreeMap<SectionId, String>,
    #[serde(default)]
    pub ethics_status: EthicsStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethics_feedback: Option<String>,
    /// Every accepted ethics transition, oldest first.
    #[serde(default)]
    pub ethics_history: Vec<EthicsTransition>,
}

impl Proposal {
    #[must_use]
    pub fn section_text(&self, id: SectionId) -> &str {
        self.sections.get(&id).map_or("", String::as_str)
    }
}

/// Partial proposal update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalPatch {
    #[serde(default)]
    pub sections: BTreeMap<SectionId, String>,
    #[serde(default)]
    pub ethics_status: Option<EthicsStatus>,
    #[serde(default)]
    pub ethics_feedback: Option<String>,
}

impl ProposalPatch {
    #[must_use]
    pub fn section(id: SectionId, text: impl Into<String>) -> Self {
        let mut sections = BTreeMap::new();
        sections.insert(id, text.into());
        Self { sections, ..Self::default() }
    }

    /// Apply onto `proposal`, replacing only the fields this patch carries.
    pub fn apply(self, proposal: &mut Proposal) {
        proposal.sections.extend(self.sections);
        if let Some(status) = self.ethics_status {
            proposal.ethics_status = status;
        }
        if let Some(feedback) = self.ethics_feedback {
            proposal.ethics_feedback = Some(feedback);
        }
    }
}

// =============================================================================
// STAGE / EXPERTS
// =============================================================================

/// Wizard stage the project is currently in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    #[default]
    Idea,
    Proposal,
    EthicsReview,
    DataCollection,
}

impl ProjectStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Proposal => "proposal",
            Self::EthicsReview => "ethics_review",
            Self::DataCollection => "data_collection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertRole {
    Statistician,
    Ethicist,
    DomainExpert,
}

// =============================================================================
// PROJECT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub idea: Option<Idea>,
    #[serde(default)]
    pub proposal: Proposal,
    #[serde(default)]
    pub stage: ProjectStage,
    /// Assigned expert ids keyed by role.
    #[serde(default)]
    pub experts: BTreeMap<ExpertRole, String>,
    #[serde(default)]
    pub updated_at_ms: i64,
}

impl Project {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            idea: None,
            proposal: Proposal::default(),
            stage: ProjectStage::Idea,
            experts: BTreeMap::new(),
            updated_at_ms: now_ms(),
        }
    }

    #[must_use]
    pub fn has_populated_idea(&self) -> bool {
        self.idea.as_ref().is_some_and(Idea::is_populated)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

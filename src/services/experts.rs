//! Expert directory: the roster projects draw assignments from.
//!
//! The roster is fixed at startup. Ethics approval looks up the predefined
//! statistician by id; an empty roster simply produces no assignment.

use serde::Serialize;

use crate::project::ExpertRole;

/// Id of the statistician assigned when a proposal is approved.
pub const DEFAULT_STATISTICIAN_ID: &str = "expert-stat-001";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expert {
    pub id: String,
    pub name: String,
    pub role: ExpertRole,
}

#[derive(Debug, Clone, Default)]
pub struct ExpertDirectory {
    experts: Vec<Expert>,
}

impl ExpertDirectory {
    #[must_use]
    pub fn new(experts: Vec<Expert>) -> Self {
        Self { experts }
    }

    /// The built-in roster.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Expert { id: DEFAULT_STATISTICIAN_ID.into(), name: "Dr. Maya Chen".into(), role: ExpertRole::Statistician },
            Expert { id: "expert-eth-001".into(), name: "Dr. Samuel Okafor".into(), role: ExpertRole::Ethicist },
        ])
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Expert> {
        self.experts.iter().find(|e| e.id == id)
    }

    /// The predefined statistician, if the roster has one with that role.
    #[must_use]
    pub fn statistician(&self) -> Option<&Expert> {
        self.find(DEFAULT_STATISTICIAN_ID)
            .filter(|e| e.role == ExpertRole::Statistician)
    }

    #[must_use]
    pub fn list(&self) -> &[Expert] {
        &self.experts
    }
}

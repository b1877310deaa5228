//! Static catalog of proposal sections.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Background,
    LiteratureReview,
    ResearchQuestions,
    Methodology,
    DataAnalysis,
    EthicalConsiderations,
    Timeline,
    References,
}

/// One catalog entry: id, display name and placeholder hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    pub id: SectionId,
    pub name: &'static str,
    pub placeholder: &'static str,
}

pub const SECTIONS: [SectionInfo; 8] = [
    SectionInfo {
        id: SectionId::Background,
        name: "Background & Rationale",
        placeholder: "Describe the problem and why this research matters...",
    },
    SectionInfo {
        id: SectionId::LiteratureReview,
        name: "Literature Review",
        placeholder: "Summarize prior work and the gap this study addresses...",
    },
    SectionInfo {
        id: SectionId::ResearchQuestions,
        name: "Research Questions & Hypotheses",
        placeholder: "State the questions and the hypotheses you will test...",
    },
    SectionInfo {
        id: SectionId::Methodology,
        name: "Methodology",
        placeholder: "Outline study design, participants, and procedures...",
    },
    SectionInfo {
        id: SectionId::DataAnalysis,
        name: "Data Analysis Plan",
        placeholder: "Explain how the collected data will be analyzed...",
    },
    SectionInfo {
        id: SectionId::EthicalConsiderations,
        name: "Ethical Considerations",
        placeholder: "Cover consent, risks, privacy, and data handling...",
    },
    SectionInfo {
        id: SectionId::Timeline,
        name: "Timeline",
        placeholder: "List milestones and their expected dates...",
    },
    SectionInfo {
        id: SectionId::References,
        name: "References",
        placeholder: "Cite the sources referenced in this proposal...",
    },
];

impl SectionId {
    #[must_use]
    pub fn first() -> Self {
        SECTIONS[0].id
    }

    #[must_use]
    pub fn info(self) -> &'static SectionInfo {
        // Catalog order matches declaration order.
        &SECTIONS[self as usize]
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::LiteratureReview => "literature_review",
            Self::ResearchQuestions => "research_questions",
            Self::Methodology => "methodology",
            Self::DataAnalysis => "data_analysis",
            Self::EthicalConsiderations => "ethical_considerations",
            Self::Timeline => "timeline",
            Self::References => "references",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        SECTIONS.iter().map(|s| s.id).find(|id| id.as_str() == raw)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "sections_test.rs"]
mod tests;

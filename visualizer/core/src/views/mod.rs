//! Views
//!
//! The switchable display surfaces and the projections that render into
//! them. None of these know whether they are visible; the coordinator
//! decides whether a call animates or lands silently.

mod crm;
mod pipeline;
mod record;

pub use crm::CrmView;
pub use pipeline::{PipelineVisualization, WalkOutcome};
pub use record::RecordView;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A switchable view
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    /// Field-by-field record with typewriter reveals
    #[default]
    Crm,
    /// Staged pipeline board
    Pipeline,
    /// Business card summary
    Card,
}

impl ViewId {
    /// Every view, in tab order
    pub const ALL: [ViewId; 3] = [ViewId::Crm, ViewId::Pipeline, ViewId::Card];

    /// Stable lowercase key
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Crm => "crm",
            Self::Pipeline => "pipeline",
            Self::Card => "card",
        }
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crm" => Ok(Self::Crm),
            "pipeline" => Ok(Self::Pipeline),
            "card" => Ok(Self::Card),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

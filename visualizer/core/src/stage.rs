//! Pipeline Stages
//!
//! The five ordered buckets a lead moves through on the pipeline board.
//! A stage is never stored on its own: it is derived from how many fields
//! have been submitted, so it can only move forward while fields accumulate.

use serde::{Deserialize, Serialize};

/// A pipeline stage, ordered from first contact to customer
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// No qualifying information yet (0 or 1 fields)
    #[default]
    Unqualified,
    /// Marketing qualified (2 fields)
    Marketing,
    /// Sales qualified (3 fields)
    Sales,
    /// Open opportunity (4 fields)
    Opportunity,
    /// Converted customer (5 or more fields)
    Customer,
}

impl PipelineStage {
    /// Every stage, in board order
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Unqualified,
        PipelineStage::Marketing,
        PipelineStage::Sales,
        PipelineStage::Opportunity,
        PipelineStage::Customer,
    ];

    /// Derive the stage from the number of submitted fields
    #[must_use]
    pub fn from_field_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::Unqualified,
            2 => Self::Marketing,
            3 => Self::Sales,
            4 => Self::Opportunity,
            _ => Self::Customer,
        }
    }

    /// Position on the board (0-based)
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage at a board position
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following stage, if any
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Whether this is the last stage
    #[must_use]
    pub fn is_final(self) -> bool {
        self == Self::Customer
    }

    /// Column key on the board
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Unqualified => "unqualified",
            Self::Marketing => "marketing",
            Self::Sales => "sales",
            Self::Opportunity => "opportunity",
            Self::Customer => "customer",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Single-stage hops needed to walk a card from `from` to `to`
///
/// Yields `(stage, next)` pairs over `[from, to)`. Empty when `to` is not
/// ahead of `from`: there is no regression path.
pub fn transitions(
    from: PipelineStage,
    to: PipelineStage,
) -> impl Iterator<Item = (PipelineStage, PipelineStage)> {
    (from.index()..to.index()).filter_map(|i| {
        let stage = PipelineStage::from_index(i)?;
        Some((stage, stage.next()?))
    })
}

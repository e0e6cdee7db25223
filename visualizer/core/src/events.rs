//! Coordinator Events
//!
//! The wizard and the facade talk to the view coordinator only through
//! these messages, delivered in order over one channel.

use tokio::sync::oneshot;

use crate::fields::FormData;
use crate::state::SessionId;
use crate::views::ViewId;

/// Message consumed by the view coordinator
#[derive(Debug)]
pub enum VisualizerEvent {
    /// Form data changed
    Submitted {
        /// Session the snapshot belongs to; stale sessions are dropped
        session: SessionId,
        /// Full snapshot after the change
        form: FormData,
        /// Whether this is a new submission (false for a redraw)
        fresh: bool,
    },

    /// The session was cleared
    Reset,

    /// The visitor picked a view tab
    ViewSelected {
        /// View to show
        view: ViewId,
    },

    /// Barrier: acknowledged once every earlier event is handled
    Flush {
        /// Completed when the coordinator reaches this event
        ack: oneshot::Sender<()>,
    },
}

impl VisualizerEvent {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Reset => "reset",
            Self::ViewSelected { .. } => "view_selected",
            Self::Flush { .. } => "flush",
        }
    }
}

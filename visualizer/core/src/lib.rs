//! Form Visualizer Core
//!
//! A headless engine that keeps three views of one lead record in sync
//! while a visitor fills in a multi-step form:
//!
//! - a CRM record whose fields are revealed by typewriter,
//! - a pipeline board whose card walks stage by stage,
//! - a business card summary.
//!
//! # Architecture
//!
//! ```text
//! Host UI ──► Visualizer (facade)
//!               │
//!               ├─► WizardController ──write──► VisualizerState
//!               │         │
//!               │         └─ VisualizerEvent ─┐
//!               │                             ▼
//!               └──── ViewSelected ──► ViewCoordinator ──► AnimationLedger
//!                                             │
//!                            ┌────────────────┼────────────────┐
//!                            ▼                ▼                ▼
//!                         CrmView   PipelineVisualization   RecordView
//!                            │                │
//!                            └──► TweenEngine / Typewriter ◄───┘
//! ```
//!
//! Display and input surfaces and the tween engine are traits; the crate
//! ships in-memory surfaces plus a frame-stepping and a recording tween
//! engine.

#![warn(missing_docs)]

pub mod animation;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod fields;
pub mod ledger;
pub mod stage;
pub mod state;
pub mod surfaces;
pub mod views;
pub mod visualizer;
pub mod wizard;

pub use animation::{
    EasingFunction, ElementId, FrameTweenEngine, PropertyMap, RecordingTweenEngine,
    TweenEngine, TweenProperty, Typewriter, PLACEHOLDER,
};
pub use config::{
    default_config_path, load_config, load_config_from_path, CompletionMessage, ConfigError,
    ConfigSource, TimingConfig, VisualizerConfig,
};
pub use coordinator::{AbortGuard, AbortHandle, ViewCoordinator};
pub use events::VisualizerEvent;
pub use fields::{is_well_formed_email, Field, FormData, WizardStep};
pub use ledger::{AnimationLedger, LedgerEntry};
pub use stage::PipelineStage;
pub use state::{SessionId, SharedState, VisualizerState};
pub use surfaces::memory::MemorySurfaces;
pub use surfaces::Surfaces;
pub use views::ViewId;
pub use visualizer::Visualizer;
pub use wizard::{Rejection, WizardController, WizardPhase};

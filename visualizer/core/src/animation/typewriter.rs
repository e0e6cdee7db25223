//! Typewriter Effect
//!
//! Reveals a string into a text surface one character per tick.
//!
//! Every reveal and every reset bumps a per-writer generation counter. A
//! reveal checks the counter before each character it writes and stops as
//! soon as it is stale, so a second reveal on the same target restarts from
//! empty and a reset aborts a reveal mid-flight without leaving it dangling.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::MissedTickBehavior;

use crate::fields::Field;
use crate::surfaces::TextSurface;

/// Text shown in an empty or reset display slot
pub const PLACEHOLDER: &str = "-";

/// Shortest tick accepted; `tokio::time::interval` rejects a zero period
const MIN_TICK: Duration = Duration::from_millis(1);

/// How a reveal ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Every character was written
    Completed,
    /// A reset or a newer reveal took over the target
    Aborted,
}

impl RevealOutcome {
    /// Whether the reveal ran to the end
    #[must_use]
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

/// Character-by-character reveal bound to one text surface
#[derive(Clone)]
pub struct Typewriter {
    target: Arc<dyn TextSurface>,
    tick: Duration,
    generation: Arc<AtomicU64>,
    typing: Arc<AtomicBool>,
}

impl Typewriter {
    /// Create a typewriter writing into `target` every `tick`
    pub fn new(target: Arc<dyn TextSurface>, tick: Duration) -> Self {
        Self {
            target,
            tick: tick.max(MIN_TICK),
            generation: Arc::new(AtomicU64::new(0)),
            typing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reveal `text`, starting from an empty target
    pub async fn reveal(&self, text: &str) -> RevealOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.typing.store(true, Ordering::SeqCst);
        self.target.set_text("");

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        let mut revealed = String::with_capacity(text.len());
        for ch in text.chars() {
            interval.tick().await;
            if self.is_stale(generation) {
                return RevealOutcome::Aborted;
            }
            revealed.push(ch);
            self.target.set_text(&revealed);
        }

        if !self.is_stale(generation) {
            self.typing.store(false, Ordering::SeqCst);
        }
        RevealOutcome::Completed
    }

    /// Abort any reveal in flight and show the placeholder
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.typing.store(false, Ordering::SeqCst);
        self.target.set_text(PLACEHOLDER);
    }

    /// Whether a reveal is in flight
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}

impl std::fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typewriter")
            .field("tick", &self.tick)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("typing", &self.is_typing())
            .finish_non_exhaustive()
    }
}

/// Typewriters cached per field slot
///
/// Cloning shares the cache, so the abort path can reset writers while the
/// coordinator is suspended inside one of them.
#[derive(Clone, Debug, Default)]
pub struct TypewriterPool {
    writers: Arc<DashMap<Field, Typewriter>>,
}

impl TypewriterPool {
    /// Empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer for a field, created on first use
    pub fn writer_for(
        &self,
        field: Field,
        target: &Arc<dyn TextSurface>,
        tick: Duration,
    ) -> Typewriter {
        self.writers
            .entry(field)
            .or_insert_with(|| Typewriter::new(Arc::clone(target), tick))
            .clone()
    }

    /// Reset every cached writer and forget them
    pub fn reset_all(&self) {
        for entry in self.writers.iter() {
            entry.value().reset();
        }
        self.writers.clear();
    }

    /// Whether any writer is mid-reveal
    #[must_use]
    pub fn any_typing(&self) -> bool {
        self.writers.iter().any(|entry| entry.value().is_typing())
    }

    /// Number of cached writers
    #[must_use]
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    /// Whether no writer is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

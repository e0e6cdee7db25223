//! Pipeline Visualization
//!
//! One card per session on a board of five stage columns. Content updates
//! are always immediate; only stage changes move the card.
//!
//! An animated ingest walks the card one column at a time over
//! [`transitions`]: wait the settle delay, tween the card's `x` to the next
//! column, re-parent it there and snap `x` back to zero. A silent ingest
//! re-parents straight to the target column. Hops are strictly sequential
//! and only go forward.

use std::sync::Arc;
use std::time::Duration;

use crate::animation::{EasingFunction, PropertyMap, TweenEngine};
use crate::coordinator::AbortGuard;
use crate::fields::{Field, FormData};
use crate::stage::{transitions, PipelineStage};
use crate::surfaces::{CardContent, PipelineBoard};

/// How an ingest ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The card reached the target stage
    Arrived(PipelineStage),
    /// An abort stopped the walk; the card sits at the last stage reached
    Interrupted(PipelineStage),
}

impl WalkOutcome {
    /// Whether the card reached the target
    #[must_use]
    pub fn arrived(self) -> bool {
        matches!(self, Self::Arrived(_))
    }

    /// Stage the card ended on
    #[must_use]
    pub fn stage(self) -> PipelineStage {
        match self {
            Self::Arrived(stage) | Self::Interrupted(stage) => stage,
        }
    }
}

impl From<&FormData> for CardContent {
    fn from(data: &FormData) -> Self {
        let first = data.get(Field::FirstName).unwrap_or_default();
        let last = data.get(Field::LastName).unwrap_or_default();
        Self {
            name: format!("{first} {last}").trim().to_string(),
            company: data.get(Field::CompanyName).unwrap_or_default().to_string(),
            email: data.get(Field::Email).unwrap_or_default().to_string(),
        }
    }
}

/// The staged board and its single card
pub struct PipelineVisualization {
    board: Option<Arc<dyn PipelineBoard>>,
    tween: Arc<dyn TweenEngine>,
    card_stage: Option<PipelineStage>,
    settle: Duration,
    hop: Duration,
}

impl PipelineVisualization {
    /// Bind to a board; without one every call is a no-op
    pub fn new(
        board: Option<Arc<dyn PipelineBoard>>,
        tween: Arc<dyn TweenEngine>,
        settle: Duration,
        hop: Duration,
    ) -> Self {
        crate::surfaces::require(board.as_ref(), "pipeline", "board");
        Self {
            board,
            tween,
            card_stage: None,
            settle,
            hop,
        }
    }

    /// Stage the card sits in, if one exists
    #[must_use]
    pub fn card_stage(&self) -> Option<PipelineStage> {
        self.card_stage
    }

    /// Render `data` onto the card and bring it to the derived stage
    pub async fn ingest(
        &mut self,
        data: &FormData,
        animate: bool,
        guard: &AbortGuard,
    ) -> WalkOutcome {
        let target = PipelineStage::from_field_count(data.len());
        let Some(board) = self.board.clone() else {
            return WalkOutcome::Arrived(target);
        };

        let content = CardContent::from(data);
        let current = match self.card_stage {
            Some(stage) => {
                board.update_card(&content);
                stage
            }
            None => {
                board.mount_card(PipelineStage::Unqualified, &content);
                tracing::debug!(stage = %PipelineStage::Unqualified, "card mounted");
                PipelineStage::Unqualified
            }
        };
        self.card_stage = Some(current);

        if current == target {
            return WalkOutcome::Arrived(target);
        }

        if !animate {
            board.place_card(target);
            self.card_stage = Some(target);
            tracing::debug!(from = %current, to = %target, "card placed");
            return WalkOutcome::Arrived(target);
        }

        for (from, to) in transitions(current, target) {
            if !self.settle.is_zero() {
                tokio::time::sleep(self.settle).await;
            }
            if guard.is_interrupted() {
                tracing::debug!(stage = %from, "pipeline walk interrupted");
                return WalkOutcome::Interrupted(from);
            }
            self.hop(board.as_ref(), from, to).await;
            self.card_stage = Some(to);
        }
        WalkOutcome::Arrived(self.card_stage.unwrap_or(target))
    }

    /// Move an existing card back to `stage` without animation
    ///
    /// Used before replaying a walk the visitor has not seen yet.
    pub fn reseat(&mut self, stage: PipelineStage) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        if let Some(current) = self.card_stage {
            if current != stage {
                board.place_card(stage);
                self.card_stage = Some(stage);
            }
        }
    }

    /// Remove the card
    pub async fn clear(&mut self) {
        if let Some(board) = self.board.as_ref() {
            board.clear();
            self.tween
                .set(&board.card_id(), &PropertyMap::new().x(0.0))
                .await;
        }
        self.card_stage = None;
    }

    async fn hop(&self, board: &dyn PipelineBoard, from: PipelineStage, to: PipelineStage) {
        let card = board.card_id();
        match board.column_offset(from, to) {
            Some(offset) => {
                self.tween
                    .animate(
                        &card,
                        &PropertyMap::new().x(offset),
                        self.hop,
                        EasingFunction::EaseInOutCubic,
                    )
                    .await;
            }
            None => {
                tracing::warn!(from = %from, to = %to, "stage column missing, skipping hop tween");
            }
        }
        board.place_card(to);
        self.tween.set(&card, &PropertyMap::new().x(0.0)).await;
        tracing::debug!(from = %from, to = %to, "card hopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{RecordingTweenEngine, TweenProperty, TypewriterPool};
    use crate::coordinator::AbortHandle;
    use crate::surfaces::memory::MemoryBoard;
    use pretty_assertions::assert_eq;

    const SETTLE: Duration = Duration::from_millis(500);
    const HOP: Duration = Duration::from_millis(800);

    fn form(count: usize) -> FormData {
        let values = ["a@b.com", "Ann", "Lee", "Acme", "Eng"];
        Field::CANONICAL
            .into_iter()
            .zip(values)
            .take(count)
            .map(|(field, value)| (field, value.to_string()))
            .collect()
    }

    fn pipeline(board: Arc<MemoryBoard>) -> (RecordingTweenEngine, PipelineVisualization) {
        let tween = RecordingTweenEngine::new();
        let pipeline =
            PipelineVisualization::new(Some(board), Arc::new(tween.clone()), SETTLE, HOP);
        (tween, pipeline)
    }

    #[tokio::test(start_paused = true)]
    async fn test_animated_walk_visits_every_stage() {
        let board = Arc::new(MemoryBoard::new(240.0));
        let (tween, mut pipeline) = pipeline(board.clone());
        let guard = AbortHandle::new(TypewriterPool::new()).guard();

        pipeline.ingest(&form(1), true, &guard).await;
        let outcome = pipeline.ingest(&form(4), true, &guard).await;

        assert_eq!(outcome, WalkOutcome::Arrived(PipelineStage::Opportunity));
        assert_eq!(
            board.placements(),
            vec![
                PipelineStage::Unqualified,
                PipelineStage::Marketing,
                PipelineStage::Sales,
                PipelineStage::Opportunity,
            ]
        );
        let hops = tween.animated_calls_for("pipeline-card");
        assert_eq!(hops.len(), 3);
        for hop in &hops {
            assert_eq!(hop.properties.get(TweenProperty::X), Some(240.0));
            assert_eq!(hop.duration, HOP);
            assert_eq!(hop.easing, EasingFunction::EaseInOutCubic);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_waits_settle_before_each_hop() {
        let board = Arc::new(MemoryBoard::new(240.0));
        let (_tween, mut pipeline) = pipeline(board);
        let guard = AbortHandle::new(TypewriterPool::new()).guard();
        let started = tokio::time::Instant::now();

        pipeline.ingest(&form(3), true, &guard).await;

        assert!(started.elapsed() >= SETTLE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_ingest_jumps_to_target() {
        let board = Arc::new(MemoryBoard::new(240.0));
        let (tween, mut pipeline) = pipeline(board.clone());
        let guard = AbortHandle::new(TypewriterPool::new()).guard();

        pipeline.ingest(&form(5), false, &guard).await;

        assert_eq!(board.card_stage(), Some(PipelineStage::Customer));
        assert_eq!(
            board.placements(),
            vec![PipelineStage::Unqualified, PipelineStage::Customer]
        );
        assert!(tween.animated_calls_for("pipeline-card").is_empty());
        assert_eq!(
            board.card_content().map(|card| card.name),
            Some("Ann Lee".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_stage_only_updates_content() {
        let board = Arc::new(MemoryBoard::new(240.0));
        let (tween, mut pipeline) = pipeline(board.clone());
        let guard = AbortHandle::new(TypewriterPool::new()).guard();

        pipeline.ingest(&form(0), true, &guard).await;
        pipeline.ingest(&form(1), true, &guard).await;

        assert_eq!(board.placements(), vec![PipelineStage::Unqualified]);
        assert_eq!(
            board.card_content().map(|card| card.email),
            Some("a@b.com".to_string())
        );
        assert!(tween.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_stops_walk_between_hops() {
        let board = Arc::new(MemoryBoard::new(240.0));
        let (_tween, mut pipeline) = pipeline(board.clone());
        let handle = AbortHandle::new(TypewriterPool::new());
        let guard = handle.guard();

        let form = form(5);
        let (outcome, ()) = tokio::join!(pipeline.ingest(&form, true, &guard), async {
            tokio::time::sleep(SETTLE + SETTLE / 2).await;
            handle.trigger();
        });

        assert_eq!(outcome, WalkOutcome::Interrupted(PipelineStage::Marketing));
        assert_eq!(board.card_stage(), Some(PipelineStage::Marketing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_column_still_places_card() {
        let board = Arc::new(MemoryBoard::with_columns(
            240.0,
            &[PipelineStage::Unqualified],
        ));
        let (tween, mut pipeline) = pipeline(board.clone());
        let guard = AbortHandle::new(TypewriterPool::new()).guard();

        pipeline.ingest(&form(2), true, &guard).await;

        assert_eq!(board.card_stage(), Some(PipelineStage::Marketing));
        assert!(tween.animated_calls_for("pipeline-card").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reseat_and_clear() {
        let board = Arc::new(MemoryBoard::new(240.0));
        let (_tween, mut pipeline) = pipeline(board.clone());
        let guard = AbortHandle::new(TypewriterPool::new()).guard();
        pipeline.ingest(&form(3), false, &guard).await;

        pipeline.reseat(PipelineStage::Unqualified);
        assert_eq!(board.card_stage(), Some(PipelineStage::Unqualified));

        pipeline.clear().await;
        assert_eq!(board.card_stage(), None);
        assert_eq!(pipeline.card_stage(), None);
    }

    #[tokio::test]
    async fn test_no_board_is_noop() {
        let tween = RecordingTweenEngine::new();
        let mut pipeline = PipelineVisualization::new(None, Arc::new(tween), SETTLE, HOP);
        let guard = AbortHandle::new(TypewriterPool::new()).guard();

        let outcome = pipeline.ingest(&form(5), true, &guard).await;

        assert_eq!(outcome, WalkOutcome::Arrived(PipelineStage::Customer));
        assert_eq!(pipeline.card_stage(), None);
    }
}

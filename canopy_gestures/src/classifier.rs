// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gesture state machine.
//!
//! States: `Idle → Down → {Dragging | LongPressFired} → Idle`, with `Cancel`
//! short-circuiting back to `Idle` from anywhere. See the crate docs for the
//! emitted gesture vocabulary.

use canopy_scene::ScreenPoint;
use smallvec::SmallVec;

use crate::events::{Gesture, PointerEvent, PointerEventKind};

/// Timing and movement thresholds for gesture classification.
///
/// Consumers override fields as needed; `Default` matches common platform
/// values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Hold duration, in milliseconds, after which a stationary press becomes
    /// a long-press.
    pub long_press_ms: u64,
    /// Maximum distance, in pixels, the pointer may wander from its origin
    /// while still counting as stationary.
    pub slop: f64,
}

impl GestureConfig {
    /// Default long-press threshold in milliseconds.
    pub const DEFAULT_LONG_PRESS_MS: u64 = 500;
    /// Default slop radius in pixels.
    pub const DEFAULT_SLOP: f64 = 8.0;
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: Self::DEFAULT_LONG_PRESS_MS,
            slop: Self::DEFAULT_SLOP,
        }
    }
}

/// Where a touch session currently is in the state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    /// No active session.
    Idle,
    /// Contact made, still within slop, threshold not yet reached.
    Down,
    /// The pointer left the slop radius; moves are being reported.
    Dragging,
    /// A long-press fired for this session; a later up emits `Up`, not `Tap`.
    LongPressFired,
    /// Transient state on pointer-cancel; observable only as the emitted
    /// [`Gesture::Cancel`], after which the classifier is `Idle` again.
    Cancelled,
}

/// Per-session state, created on pointer-down and destroyed on up/cancel or a
/// superseding down.
#[derive(Copy, Clone, Debug)]
struct TouchSession {
    origin: ScreenPoint,
    start_time_ms: u64,
    last_point: ScreenPoint,
    phase: GesturePhase,
}

/// Classifies a raw pointer stream into semantic gestures.
///
/// Feed every raw event to [`on_event`](Self::on_event) in arrival order; call
/// [`tick`](Self::tick) from a timer or frame callback so stationary
/// long-presses fire on time. Malformed streams (a move or up with no
/// preceding down) are tolerated as no-ops.
#[derive(Clone, Debug, Default)]
pub struct GestureClassifier {
    config: GestureConfig,
    session: Option<TouchSession>,
}

/// Gestures emitted for one raw event. A single event emits at most two
/// (a due long-press followed by the event's own gesture).
pub type Emitted = SmallVec<[Gesture; 2]>;

impl GestureClassifier {
    /// Creates a classifier with the given thresholds.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// The configured thresholds.
    #[must_use]
    pub fn config(&self) -> GestureConfig {
        self.config
    }

    /// Current phase of the state machine.
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.session
            .as_ref()
            .map_or(GesturePhase::Idle, |s| s.phase)
    }

    /// Destroys any active session and returns to `Idle`.
    ///
    /// Called by the widget layer when the document is replaced; a gesture
    /// must not span two documents.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Consumes one raw pointer event and returns the gestures it produced.
    ///
    /// Events must arrive in physical order; emitted `Move`s preserve that
    /// order. An event may produce nothing (a down, or a move within slop).
    pub fn on_event(&mut self, event: PointerEvent) -> Emitted {
        let mut emitted = Emitted::new();
        match event.kind {
            PointerEventKind::Down => {
                // A down while a session exists supersedes it silently.
                self.session = Some(TouchSession {
                    origin: event.pos,
                    start_time_ms: event.time_ms,
                    last_point: event.pos,
                    phase: GesturePhase::Down,
                });
            }
            PointerEventKind::Move => {
                let Some(mut session) = self.session else {
                    return emitted;
                };
                // Long-press precedence: the deadline is checked against the
                // position before this event's motion.
                fire_long_press_if_due(&mut session, &self.config, event.time_ms, &mut emitted);
                session.last_point = event.pos;
                let beyond_slop =
                    session.origin.distance_squared(event.pos) > self.config.slop * self.config.slop;
                match session.phase {
                    GesturePhase::Down if beyond_slop => {
                        session.phase = GesturePhase::Dragging;
                        emitted.push(Gesture::Move(event.pos));
                    }
                    GesturePhase::Dragging => emitted.push(Gesture::Move(event.pos)),
                    // Within slop, or after a fired long-press: swallowed.
                    _ => {}
                }
                self.session = Some(session);
            }
            PointerEventKind::Up => {
                let Some(mut session) = self.session.take() else {
                    return emitted;
                };
                // Exactly at the threshold the long-press wins over the tap.
                fire_long_press_if_due(&mut session, &self.config, event.time_ms, &mut emitted);
                match session.phase {
                    GesturePhase::Down => emitted.push(Gesture::Tap(event.pos)),
                    GesturePhase::Dragging | GesturePhase::LongPressFired => {
                        emitted.push(Gesture::Up(event.pos));
                    }
                    GesturePhase::Idle | GesturePhase::Cancelled => {}
                }
            }
            PointerEventKind::Cancel => {
                if self.session.take().is_some() {
                    emitted.push(Gesture::Cancel);
                }
            }
        }
        emitted
    }

    /// Fires a due long-press without waiting for the next pointer event.
    ///
    /// Hosts call this from a timer or per-frame callback with the same
    /// monotonic clock that stamps their pointer events. Returns the
    /// `LongPress` if it fired, at most once per session.
    pub fn tick(&mut self, now_ms: u64) -> Option<Gesture> {
        let session = self.session.as_mut()?;
        let mut emitted = Emitted::new();
        fire_long_press_if_due(session, &self.config, now_ms, &mut emitted);
        emitted.into_iter().next()
    }
}

/// Transitions `Down → LongPressFired` and emits the gesture when the hold
/// duration has elapsed without the pointer leaving the slop radius.
fn fire_long_press_if_due(
    session: &mut TouchSession,
    config: &GestureConfig,
    now_ms: u64,
    emitted: &mut Emitted,
) {
    if session.phase != GesturePhase::Down {
        return;
    }
    let stationary =
        session.origin.distance_squared(session.last_point) <= config.slop * config.slop;
    if stationary && now_ms.saturating_sub(session.start_time_ms) >= config.long_press_ms {
        session.phase = GesturePhase::LongPressFired;
        emitted.push(Gesture::LongPress(session.origin));
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::default()
    }

    const P: ScreenPoint = ScreenPoint::new(10, 10);

    #[test]
    fn new_classifier_is_idle() {
        assert_eq!(classifier().phase(), GesturePhase::Idle);
    }

    #[test]
    fn down_enters_down_phase_without_emitting() {
        let mut c = classifier();
        let emitted = c.on_event(PointerEvent::down(P, 0));
        assert!(emitted.is_empty());
        assert_eq!(c.phase(), GesturePhase::Down);
    }

    #[test]
    fn quick_up_within_slop_is_tap() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        let emitted = c.on_event(PointerEvent::up(P, 100));
        assert_eq!(emitted.as_slice(), [Gesture::Tap(P)]);
        assert_eq!(c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn tap_carries_release_position() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        // Wander a little, but stay inside the 8 px slop radius.
        c.on_event(PointerEvent::moved(ScreenPoint::new(13, 10), 50));
        let release = ScreenPoint::new(12, 11);
        let emitted = c.on_event(PointerEvent::up(release, 100));
        assert_eq!(emitted.as_slice(), [Gesture::Tap(release)]);
    }

    #[test]
    fn moves_within_slop_emit_nothing() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        assert!(c.on_event(PointerEvent::moved(ScreenPoint::new(14, 10), 20)).is_empty());
        assert!(c.on_event(PointerEvent::moved(ScreenPoint::new(10, 15), 40)).is_empty());
        assert_eq!(c.phase(), GesturePhase::Down);
    }

    #[test]
    fn move_beyond_slop_enters_dragging_and_streams_moves() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));

        let first = ScreenPoint::new(30, 10);
        assert_eq!(
            c.on_event(PointerEvent::moved(first, 20)).as_slice(),
            [Gesture::Move(first)]
        );
        assert_eq!(c.phase(), GesturePhase::Dragging);

        // Every subsequent move is reported, even back inside the slop radius.
        let back = ScreenPoint::new(11, 10);
        assert_eq!(
            c.on_event(PointerEvent::moved(back, 40)).as_slice(),
            [Gesture::Move(back)]
        );
    }

    #[test]
    fn drag_then_up_emits_up_and_no_tap() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.on_event(PointerEvent::moved(ScreenPoint::new(40, 40), 30));
        let release = ScreenPoint::new(50, 50);
        let emitted = c.on_event(PointerEvent::up(release, 60));
        assert_eq!(emitted.as_slice(), [Gesture::Up(release)]);
        assert_eq!(c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn drag_move_ordering_is_preserved() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        let path = [
            ScreenPoint::new(25, 10),
            ScreenPoint::new(30, 15),
            ScreenPoint::new(35, 20),
        ];
        let mut seen = Vec::new();
        let mut t = 0;
        for p in path {
            t += 10;
            seen.extend(c.on_event(PointerEvent::moved(p, t)));
        }
        let expected: Vec<_> = path.iter().copied().map(Gesture::Move).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn stationary_hold_fires_long_press_once_via_tick() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        assert_eq!(c.tick(499), None);
        assert_eq!(c.tick(500), Some(Gesture::LongPress(P)));
        assert_eq!(c.phase(), GesturePhase::LongPressFired);
        // Only once per session.
        assert_eq!(c.tick(600), None);
    }

    #[test]
    fn up_after_long_press_emits_up_not_tap() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.tick(500);
        let emitted = c.on_event(PointerEvent::up(P, 700));
        assert_eq!(emitted.as_slice(), [Gesture::Up(P)]);
    }

    #[test]
    fn up_exactly_at_threshold_prefers_long_press() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        // No tick ever ran; the deadline is discovered on the up itself.
        let emitted = c.on_event(PointerEvent::up(P, 500));
        assert_eq!(emitted.as_slice(), [Gesture::LongPress(P), Gesture::Up(P)]);
    }

    #[test]
    fn late_move_discovers_due_long_press() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        // Stationary past the deadline; the move that finally arrives leaves
        // slop, but the long-press was already due.
        let emitted = c.on_event(PointerEvent::moved(ScreenPoint::new(40, 10), 900));
        assert_eq!(emitted.as_slice(), [Gesture::LongPress(P)]);
        assert_eq!(c.phase(), GesturePhase::LongPressFired);
    }

    #[test]
    fn long_press_does_not_fire_after_drag() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.on_event(PointerEvent::moved(ScreenPoint::new(40, 40), 30));
        assert_eq!(c.tick(1000), None);
        assert_eq!(c.phase(), GesturePhase::Dragging);
    }

    #[test]
    fn long_press_does_not_fire_once_pointer_wandered_out() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.on_event(PointerEvent::moved(ScreenPoint::new(100, 100), 30));
        // Back near the origin, but the session is Dragging now.
        c.on_event(PointerEvent::moved(ScreenPoint::new(10, 11), 60));
        assert_eq!(c.tick(1000), None);
    }

    #[test]
    fn moves_after_long_press_are_swallowed() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.tick(500);
        let emitted = c.on_event(PointerEvent::moved(ScreenPoint::new(60, 60), 600));
        assert!(emitted.is_empty());
        assert_eq!(c.phase(), GesturePhase::LongPressFired);
    }

    #[test]
    fn cancel_emits_cancel_and_resets() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        let emitted = c.on_event(PointerEvent::cancel(50));
        assert_eq!(emitted.as_slice(), [Gesture::Cancel]);
        assert_eq!(c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn cancel_during_drag_emits_only_cancel() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.on_event(PointerEvent::moved(ScreenPoint::new(40, 40), 30));
        let emitted = c.on_event(PointerEvent::cancel(60));
        assert_eq!(emitted.as_slice(), [Gesture::Cancel]);
    }

    #[test]
    fn orphan_move_up_cancel_are_noops() {
        let mut c = classifier();
        assert!(c.on_event(PointerEvent::moved(P, 10)).is_empty());
        assert!(c.on_event(PointerEvent::up(P, 20)).is_empty());
        assert!(c.on_event(PointerEvent::cancel(30)).is_empty());
        assert_eq!(c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn superseding_down_starts_a_fresh_session() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.on_event(PointerEvent::moved(ScreenPoint::new(40, 40), 30));
        assert_eq!(c.phase(), GesturePhase::Dragging);

        let other = ScreenPoint::new(200, 200);
        assert!(c.on_event(PointerEvent::down(other, 1000)).is_empty());
        assert_eq!(c.phase(), GesturePhase::Down);

        // The fresh session taps independently of the abandoned one.
        let emitted = c.on_event(PointerEvent::up(other, 1050));
        assert_eq!(emitted.as_slice(), [Gesture::Tap(other)]);
    }

    #[test]
    fn reset_destroys_the_session() {
        let mut c = classifier();
        c.on_event(PointerEvent::down(P, 0));
        c.reset();
        assert_eq!(c.phase(), GesturePhase::Idle);
        assert!(c.on_event(PointerEvent::up(P, 100)).is_empty());
    }

    #[test]
    fn tick_without_session_is_noop() {
        let mut c = classifier();
        assert_eq!(c.tick(10_000), None);
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let mut c = GestureClassifier::new(GestureConfig {
            long_press_ms: 100,
            slop: 2.0,
        });
        c.on_event(PointerEvent::down(P, 0));
        // 3 px exceeds a 2 px slop radius.
        let emitted = c.on_event(PointerEvent::moved(ScreenPoint::new(13, 10), 10));
        assert_eq!(emitted.as_slice(), [Gesture::Move(ScreenPoint::new(13, 10))]);

        let mut c = GestureClassifier::new(GestureConfig {
            long_press_ms: 100,
            slop: 2.0,
        });
        c.on_event(PointerEvent::down(P, 0));
        assert_eq!(c.tick(100), Some(Gesture::LongPress(P)));
    }
}

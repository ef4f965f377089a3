// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer input and the semantic gestures classified from it.

use canopy_scene::ScreenPoint;

/// Kind of a raw pointer event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// The pointer made contact.
    Down,
    /// The pointer moved while in contact.
    Move,
    /// The pointer was released.
    Up,
    /// The host abandoned the stream (focus loss, palm rejection, ...).
    Cancel,
}

/// One raw pointer event as delivered by the host toolkit.
///
/// `time_ms` is a host-supplied monotonic millisecond timestamp. It only ever
/// participates in differences, so any epoch works as long as it is shared by
/// all events of a session and by [`GestureClassifier::tick`].
///
/// [`GestureClassifier::tick`]: crate::GestureClassifier::tick
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerEventKind,
    /// Where it happened, in widget pixels.
    pub pos: ScreenPoint,
    /// When it happened, in host monotonic milliseconds.
    pub time_ms: u64,
}

impl PointerEvent {
    /// A pointer-down event.
    #[must_use]
    pub const fn down(pos: ScreenPoint, time_ms: u64) -> Self {
        Self {
            kind: PointerEventKind::Down,
            pos,
            time_ms,
        }
    }

    /// A pointer-move event.
    #[must_use]
    pub const fn moved(pos: ScreenPoint, time_ms: u64) -> Self {
        Self {
            kind: PointerEventKind::Move,
            pos,
            time_ms,
        }
    }

    /// A pointer-up event.
    #[must_use]
    pub const fn up(pos: ScreenPoint, time_ms: u64) -> Self {
        Self {
            kind: PointerEventKind::Up,
            pos,
            time_ms,
        }
    }

    /// A pointer-cancel event.
    ///
    /// The position of a cancel is ignored by the classifier; hosts that have
    /// no meaningful position may pass anything.
    #[must_use]
    pub const fn cancel(time_ms: u64) -> Self {
        Self {
            kind: PointerEventKind::Cancel,
            pos: ScreenPoint::ORIGIN,
            time_ms,
        }
    }
}

/// A semantic gesture emitted by the classifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// Down and up within slop and below the long-press threshold.
    ///
    /// Carries the release position.
    Tap(ScreenPoint),
    /// The pointer was held stationary past the long-press threshold.
    ///
    /// Carries the session origin; fired at most once per session and
    /// suppresses a later `Tap` for the same session.
    LongPress(ScreenPoint),
    /// A move after the pointer left the slop radius.
    Move(ScreenPoint),
    /// Release ending a drag or a fired long-press (never paired with `Tap`).
    Up(ScreenPoint),
    /// The session was abandoned; no further gestures follow for it.
    Cancel,
}

// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Gestures: a small state machine that turns raw pointer events into
//! semantic gestures.
//!
//! ## Overview
//!
//! The host toolkit delivers a single active pointer stream as
//! [`PointerEvent`]s (down, move, up, cancel), each stamped with a host-supplied
//! monotonic millisecond timestamp. [`GestureClassifier`] consumes that stream
//! and emits [`Gesture`]s:
//!
//! - [`Gesture::Tap`] — down and up without leaving the slop radius, released
//!   before the long-press threshold;
//! - [`Gesture::LongPress`] — held stationary past the threshold, fired at most
//!   once per touch session;
//! - [`Gesture::Move`] — each move after the pointer has left the slop radius;
//! - [`Gesture::Up`] — release after a drag or a fired long-press (never
//!   together with a `Tap`);
//! - [`Gesture::Cancel`] — the host abandoned the stream.
//!
//! The classifier never reads a clock. Timestamps ride on the events, and hosts
//! with a timer or frame loop call [`GestureClassifier::tick`] so a stationary
//! long-press can fire without waiting for the next event. This keeps the state
//! machine deterministic and directly testable.
//!
//! ## Minimal example
//!
//! ```
//! use canopy_gestures::{Gesture, GestureClassifier, PointerEvent};
//! use canopy_scene::ScreenPoint;
//!
//! let mut classifier = GestureClassifier::default();
//! let p = ScreenPoint::new(10, 10);
//!
//! assert!(classifier.on_event(PointerEvent::down(p, 0)).is_empty());
//! let emitted = classifier.on_event(PointerEvent::up(p, 80));
//! assert_eq!(emitted.as_slice(), [Gesture::Tap(p)]);
//! ```
//!
//! Thresholds are configurable through [`GestureConfig`]; the defaults match
//! common platform values (500 ms long-press, 8 px slop).
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod classifier;
mod events;

pub use classifier::{GestureClassifier, GestureConfig, GesturePhase};
pub use events::{Gesture, PointerEvent, PointerEventKind};

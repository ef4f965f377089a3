// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy View: widget logic for displaying a vector scene and dispatching
//! gestures to the objects inside it.
//!
//! ## Overview
//!
//! [`SceneView`] is the composition root of the Canopy stack. It owns no
//! window and inherits from no platform view class; a thin host adapter
//! forwards raw pointer events to it and presents whatever
//! [`displayed_image`](SceneView::displayed_image) holds. The view wires
//! together:
//!
//! - a [`RenderScheduler`] (from `canopy_render`) that rasterizes the current
//!   [`SceneDocument`] off the interactive thread and swaps the finished image
//!   in atomically — a superseded or failed render never disturbs the image on
//!   screen;
//! - a [`GestureClassifier`] (from `canopy_gestures`) that turns the raw
//!   pointer stream into taps, long-presses, drags, and cancellations;
//! - the [`hit`] module, which maps widget pixels through the view transform
//!   and asks the document which objects lie under them;
//! - a consumer-supplied [`SceneGestureListener`], invoked on the interactive
//!   thread for each semantic gesture.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::sync::Arc;
//!
//! use canopy_view::{PointerEvent, SceneGestureListener, SceneView, ScreenPoint};
//! use canopy_scene::{RenderError, SceneDocument, Surface};
//! use kurbo::{Point, Size};
//!
//! struct OneCircle;
//!
//! impl SceneDocument for OneCircle {
//!     type Object = &'static str;
//!     fn size(&self) -> Size {
//!         Size::new(100.0, 100.0)
//!     }
//!     fn objects_at(&self, point: Point) -> Vec<&'static str> {
//!         if point.distance(Point::new(50.0, 50.0)) <= 25.0 {
//!             vec!["circle"]
//!         } else {
//!             Vec::new()
//!         }
//!     }
//!     fn render(&self, surface: &mut Surface) -> Result<(), RenderError> {
//!         surface.data_mut().fill(0xFF);
//!         Ok(())
//!     }
//! }
//!
//! struct TapCounter(Rc<Cell<usize>>);
//!
//! impl SceneGestureListener<&'static str> for TapCounter {
//!     fn on_tap(&mut self, objects: &[&'static str], _point: ScreenPoint) {
//!         if objects.contains(&"circle") {
//!             self.0.set(self.0.get() + 1);
//!         }
//!     }
//! }
//!
//! let taps = Rc::new(Cell::new(0));
//! let mut view = SceneView::new();
//! view.set_document(Some(Arc::new(OneCircle))).unwrap();
//! view.set_gesture_listener(TapCounter(Rc::clone(&taps)));
//!
//! let p = ScreenPoint::new(50, 50);
//! view.on_pointer_event(PointerEvent::down(p, 0));
//! view.on_pointer_event(PointerEvent::up(p, 80));
//! assert_eq!(taps.get(), 1);
//! ```
//!
//! ## Threads
//!
//! All `SceneView` methods must be called from one thread — the interactive
//! context. Rasterization is the only asynchronous operation; call
//! [`tick`](SceneView::tick) (or [`pump_render`](SceneView::pump_render)) from
//! a frame or timer callback to collect finished frames and fire due
//! long-presses.

pub mod hit;
mod view;

pub use view::{SceneGestureListener, SceneView, SceneViewError};

// The types a host adapter and a listener implementation need, so simple
// consumers can depend on this crate alone.
pub use canopy_gestures::{
    Gesture, GestureClassifier, GestureConfig, GesturePhase, PointerEvent, PointerEventKind,
};
pub use canopy_render::{JobState, RenderOutcome, RenderScheduler};
pub use canopy_scene::{RenderError, SceneDocument, ScreenPoint, Surface, SurfaceAllocator};

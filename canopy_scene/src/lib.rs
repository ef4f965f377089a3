// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Scene: the document abstraction the Canopy widget displays and queries.
//!
//! ## Overview
//!
//! A [`SceneDocument`] is an opaque vector scene owned by the application. The
//! widget layer only needs three capabilities from it:
//!
//! - intrinsic dimensions ([`SceneDocument::size`]),
//! - an ordered query for the objects under a point ([`SceneDocument::objects_at`]),
//! - rasterization into a caller-allocated [`Surface`] ([`SceneDocument::render`]).
//!
//! Parsing and geometric rendering of the scene itself live behind this trait;
//! Canopy never looks inside a document. Documents are shared with the render
//! worker via `Arc`, so implementations are typically `Send + Sync`.
//!
//! ## Coordinates
//!
//! Widget-local pixel positions are integer [`ScreenPoint`]s. Document space is
//! `f64` ([`kurbo::Point`]); the widget layer applies any view transform before
//! a query reaches [`SceneDocument::objects_at`], so implementations only ever
//! see their own native coordinate space.
//!
//! ## Minimal example
//!
//! ```
//! use canopy_scene::{RenderError, SceneDocument, Surface};
//! use kurbo::{Point, Size};
//!
//! /// A document with a single unit square at the origin.
//! struct UnitSquare;
//!
//! impl SceneDocument for UnitSquare {
//!     type Object = &'static str;
//!
//!     fn size(&self) -> Size {
//!         Size::new(1.0, 1.0)
//!     }
//!
//!     fn objects_at(&self, point: Point) -> Vec<Self::Object> {
//!         if (0.0..1.0).contains(&point.x) && (0.0..1.0).contains(&point.y) {
//!             vec!["square"]
//!         } else {
//!             Vec::new()
//!         }
//!     }
//!
//!     fn render(&self, surface: &mut Surface) -> Result<(), RenderError> {
//!         surface.data_mut().fill(0xFF);
//!         Ok(())
//!     }
//! }
//!
//! let doc = UnitSquare;
//! assert_eq!(doc.objects_at(Point::new(0.5, 0.5)), vec!["square"]);
//! assert!(doc.objects_at(Point::new(2.0, 0.5)).is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod surface;

pub use surface::{BufferAllocator, Surface, SurfaceAllocator};

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Size};

/// A widget-local pixel position.
///
/// Raw pointer input arrives in integer widget pixels; conversion to document
/// space happens in the widget layer via [`ScreenPoint::to_point`] and the
/// current view transform.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenPoint {
    /// Horizontal position in widget pixels.
    pub x: i32,
    /// Vertical position in widget pixels.
    pub y: i32,
}

impl ScreenPoint {
    /// The widget origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Creates a point from widget-pixel coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to a floating-point [`kurbo::Point`] for transform math.
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Squared Euclidean distance to `other`, in pixels.
    ///
    /// Used for slop-threshold checks, where the square root is unnecessary.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx * dx + dy * dy
    }
}

impl From<(i32, i32)> for ScreenPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An opaque vector scene with dimensions, point queries, and rasterization.
///
/// The widget holds a document behind an `Arc` and treats it as immutable;
/// replacing the document wholesale is the only mutation path. Queries return
/// objects in whatever order the document defines (front-to-back or document
/// order); the widget layer preserves that order and never re-sorts.
pub trait SceneDocument {
    /// Handle to one addressable object within the scene.
    ///
    /// Equality is identity as the document defines it; Canopy only clones and
    /// compares these, it never inspects them.
    type Object: Clone + PartialEq;

    /// Intrinsic document width and height.
    ///
    /// Values that are non-positive or non-finite cause rasterization to fail
    /// with [`RenderError::InvalidDimensions`]; queries are not affected.
    fn size(&self) -> Size;

    /// Returns the objects under `point`, in document coordinates.
    ///
    /// An empty result means nothing is under the point; it is not an error.
    fn objects_at(&self, point: Point) -> Vec<Self::Object>;

    /// Rasterizes the scene into `surface`.
    ///
    /// The surface is allocated by the caller at the ceiling of [`size`]
    /// (or whatever the scheduler's allocator decided); implementations draw
    /// into it and report paint failures via [`RenderError::Paint`].
    ///
    /// [`size`]: SceneDocument::size
    fn render(&self, surface: &mut Surface) -> Result<(), RenderError>;
}

/// Failure during a rasterization attempt.
///
/// Delivered asynchronously through the render-failure path; a failed render
/// never changes the displayed image. Absence of objects under a point is a
/// normal empty query result, not an error, so no variant exists for it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The document reported non-positive, non-finite, or oversized dimensions.
    #[error("document dimensions {width}x{height} are not renderable")]
    InvalidDimensions {
        /// Reported document width.
        width: f64,
        /// Reported document height.
        height: f64,
    },
    /// The raster surface could not be allocated.
    #[error("failed to allocate a {bytes}-byte raster surface")]
    Allocation {
        /// Size of the attempted allocation in bytes.
        bytes: usize,
    },
    /// The document failed while painting into the surface.
    #[error("document rasterization failed: {0}")]
    Paint(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_point_converts_to_f64_point() {
        let p = ScreenPoint::new(3, -7);
        assert_eq!(p.to_point(), Point::new(3.0, -7.0));
    }

    #[test]
    fn screen_point_distance_squared() {
        let a = ScreenPoint::new(0, 0);
        let b = ScreenPoint::new(3, 4);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(b.distance_squared(a), 25.0);
        assert_eq!(a.distance_squared(a), 0.0);
    }

    #[test]
    fn screen_point_from_tuple() {
        let p: ScreenPoint = (10, 20).into();
        assert_eq!(p, ScreenPoint::new(10, 20));
    }
}

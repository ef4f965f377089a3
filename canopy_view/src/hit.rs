// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing: widget pixels in, scene objects out.
//!
//! A thin, stateless façade over [`SceneDocument::objects_at`]. Its only job
//! is coordinate normalization: widget-local integer pixels are mapped through
//! the view-to-document transform before the document is queried, so documents
//! only ever see their own coordinate space.
//!
//! Ordering is the document's: whatever [`SceneDocument::objects_at`] returns
//! (front-to-back or document order) is passed through untouched. Callers that
//! want a single "topmost" object take the first element; [`topmost`] does
//! exactly that. A miss is an empty vector, never an error.

use canopy_scene::{SceneDocument, ScreenPoint};
use kurbo::Affine;

/// Returns the objects under `point`, in the document's own order.
///
/// `view_to_document` maps widget pixels into document coordinates; pass
/// [`Affine::IDENTITY`] when the raster is presented 1:1.
pub fn query<D: SceneDocument>(
    document: &D,
    view_to_document: Affine,
    point: ScreenPoint,
) -> Vec<D::Object> {
    document.objects_at(view_to_document * point.to_point())
}

/// Returns the first object under `point`, if any.
pub fn topmost<D: SceneDocument>(
    document: &D,
    view_to_document: Affine,
    point: ScreenPoint,
) -> Option<D::Object> {
    query(document, view_to_document, point).into_iter().next()
}

// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene-view widget object and its consumer-facing callback surface.

use std::sync::Arc;

use canopy_gestures::{Gesture, GestureClassifier, GestureConfig, PointerEvent};
use canopy_render::{RenderOutcome, RenderScheduler};
use canopy_scene::{
    BufferAllocator, RenderError, SceneDocument, ScreenPoint, Surface, SurfaceAllocator,
};
use kurbo::Affine;

/// Error raised synchronously by [`SceneView`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneViewError {
    /// `set_document` was called without a document; the view is unchanged.
    #[error("a scene view document must not be null")]
    NullDocument,
}

/// Consumer callbacks for gestures resolved against the displayed scene.
///
/// `O` is the document's object handle type. All methods default to no-ops so
/// consumers implement only what they care about. Callbacks arrive on the
/// interactive thread, in the order the underlying pointer events arrived.
pub trait SceneGestureListener<O> {
    /// A tap, with the objects under the release point (document order).
    fn on_tap(&mut self, _objects: &[O], _point: ScreenPoint) {}

    /// The pointer was held stationary past the long-press threshold.
    fn on_long_press(&mut self, _point: ScreenPoint) {}

    /// A drag movement; one call per move, in physical order.
    fn on_move(&mut self, _point: ScreenPoint) {}

    /// The gesture ended. After a drag or long-press, `point` is the release
    /// position and `objects` what lies under it. After a cancellation,
    /// `objects` is empty and `point` is `None`: treat it as "no selection".
    fn on_up(&mut self, _objects: &[O], _point: Option<ScreenPoint>) {}
}

/// Widget logic for a view that displays a rendered vector document and
/// resolves pointer gestures to the objects inside it.
///
/// See the crate docs for an overview and a usage example. All methods must be
/// called from the interactive thread.
pub struct SceneView<D, A = BufferAllocator>
where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator + Send + 'static,
{
    document: Option<Arc<D>>,
    scheduler: RenderScheduler<D, A>,
    classifier: GestureClassifier,
    listener: Option<Box<dyn SceneGestureListener<D::Object>>>,
    rendered_callback: Option<Box<dyn FnMut(&Surface)>>,
    render_failed_callback: Option<Box<dyn FnMut(&RenderError)>>,
    /// The image currently on screen, tagged with its render generation.
    displayed: Option<(u64, Surface)>,
    view_to_document: Affine,
    assistive_mode: bool,
    content_description: Option<String>,
}

impl<D, A> core::fmt::Debug for SceneView<D, A>
where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator + Send + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneView")
            .field("has_document", &self.document.is_some())
            .field("has_listener", &self.listener.is_some())
            .field("displayed_generation", &self.displayed_generation())
            .field("assistive_mode", &self.assistive_mode)
            .finish_non_exhaustive()
    }
}

impl<D> Default for SceneView<D>
where
    D: SceneDocument + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> SceneView<D>
where
    D: SceneDocument + Send + Sync + 'static,
{
    /// Creates a view with default gesture thresholds and the heap-backed
    /// surface allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(GestureConfig::default(), BufferAllocator)
    }

    /// Creates a view with custom gesture thresholds.
    #[must_use]
    pub fn with_config(config: GestureConfig) -> Self {
        Self::with_allocator(config, BufferAllocator)
    }
}

impl<D, A> SceneView<D, A>
where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator + Send + 'static,
{
    /// Creates a view that allocates its raster surfaces through `allocator`.
    #[must_use]
    pub fn with_allocator(config: GestureConfig, allocator: A) -> Self {
        Self {
            document: None,
            scheduler: RenderScheduler::new(allocator),
            classifier: GestureClassifier::new(config),
            listener: None,
            rendered_callback: None,
            render_failed_callback: None,
            displayed: None,
            view_to_document: Affine::IDENTITY,
            assistive_mode: false,
            content_description: None,
        }
    }

    /// Replaces the displayed document and schedules its rasterization.
    ///
    /// Passing `None` fails with [`SceneViewError::NullDocument`] and leaves
    /// every part of the view — including the displayed image — unchanged.
    /// On success the active touch session (if any) is reset, the previous
    /// render job is superseded, and the new job's generation is returned.
    pub fn set_document(&mut self, document: Option<Arc<D>>) -> Result<u64, SceneViewError> {
        let document = document.ok_or(SceneViewError::NullDocument)?;
        // A gesture must not span two documents.
        self.classifier.reset();
        self.document = Some(Arc::clone(&document));
        let generation = self.scheduler.submit(document);
        log::debug!("document replaced; render generation {generation} submitted");
        Ok(generation)
    }

    /// The document currently backing the view, if one was set.
    #[must_use]
    pub fn document(&self) -> Option<&Arc<D>> {
        self.document.as_ref()
    }

    /// Registers the gesture listener. Takes effect on the next raw event;
    /// nothing is re-delivered retroactively.
    pub fn set_gesture_listener(
        &mut self,
        listener: impl SceneGestureListener<D::Object> + 'static,
    ) {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the gesture listener; subsequent raw events are accepted but
    /// produce no callbacks and no hit-test work.
    pub fn clear_gesture_listener(&mut self) {
        self.listener = None;
    }

    /// Registers the callback invoked after each *successful* render, right
    /// after the new image was swapped in. Superseded and failed renders
    /// never invoke it.
    pub fn set_rendered_callback(&mut self, callback: impl FnMut(&Surface) + 'static) {
        self.rendered_callback = Some(Box::new(callback));
    }

    /// Registers the callback for asynchronous render failures. The displayed
    /// image is untouched by a failure; retrying is the consumer's decision,
    /// via another `set_document` call.
    pub fn set_render_failed_callback(&mut self, callback: impl FnMut(&RenderError) + 'static) {
        self.render_failed_callback = Some(Box::new(callback));
    }

    /// Sets the transform from widget pixels to document coordinates, used by
    /// the hit-test path. Identity by default; a host adapter that scales or
    /// letterboxes the raster supplies the matching transform here.
    pub fn set_view_transform(&mut self, view_to_document: Affine) {
        self.view_to_document = view_to_document;
    }

    /// The current widget-pixel to document-coordinate transform.
    #[must_use]
    pub fn view_transform(&self) -> Affine {
        self.view_to_document
    }

    /// Records whether the host reports an assistive interaction mode (for
    /// example touch exploration) as active. Detection itself is the host's
    /// concern; the flag only controls [`on_hover_probe`](Self::on_hover_probe).
    pub fn set_assistive_mode_active(&mut self, active: bool) {
        self.assistive_mode = active;
    }

    /// Whether assistive-mode hover routing is currently enabled.
    #[must_use]
    pub fn assistive_mode_active(&self) -> bool {
        self.assistive_mode
    }

    /// Stores a description of the scene for assistive announcement by the
    /// host adapter. The view only holds the text; announcing it is platform
    /// work and out of scope here.
    pub fn set_content_description(&mut self, description: Option<String>) {
        self.content_description = description;
    }

    /// The stored content description, if any.
    #[must_use]
    pub fn content_description(&self) -> Option<&str> {
        self.content_description.as_deref()
    }

    /// The most recently completed, non-superseded render — what the host
    /// adapter should present.
    #[must_use]
    pub fn displayed_image(&self) -> Option<&Surface> {
        self.displayed.as_ref().map(|(_, surface)| surface)
    }

    /// Generation of the displayed image, for adapter-side frame bookkeeping.
    #[must_use]
    pub fn displayed_generation(&self) -> Option<u64> {
        self.displayed.as_ref().map(|(generation, _)| *generation)
    }

    /// Entry point for every raw pointer event from the host toolkit.
    ///
    /// Without a document and a listener the event is accepted but inert: no
    /// classification, no hit test, no callback. Otherwise the classifier
    /// runs and each emitted gesture is dispatched immediately, in order.
    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        if self.document.is_none() || self.listener.is_none() {
            return;
        }
        for gesture in self.classifier.on_event(event) {
            self.dispatch(gesture);
        }
    }

    /// Routes an assistive hover probe into the pointer path.
    ///
    /// Returns `true` (probe consumed) when assistive mode was reported
    /// active; otherwise `false`, leaving default hover behavior to the host.
    pub fn on_hover_probe(&mut self, event: PointerEvent) -> bool {
        if !self.assistive_mode {
            return false;
        }
        self.on_pointer_event(event);
        true
    }

    /// Interactive-context heartbeat: collects finished renders and fires a
    /// due long-press. `now_ms` uses the same monotonic clock as the pointer
    /// events. Call from a frame or timer callback.
    pub fn tick(&mut self, now_ms: u64) {
        self.pump_render();
        if self.document.is_none() || self.listener.is_none() {
            return;
        }
        if let Some(gesture) = self.classifier.tick(now_ms) {
            self.dispatch(gesture);
        }
    }

    /// Collects finished render jobs and swaps the displayed image.
    ///
    /// Non-blocking. Only the current generation's outcome is ever observed;
    /// the scheduler has already discarded superseded results. On success the
    /// image is swapped in and the rendered callback fires; on failure the
    /// displayed image stays as it was and the failure callback fires.
    pub fn pump_render(&mut self) {
        while let Some(outcome) = self.scheduler.poll() {
            match outcome {
                RenderOutcome::Completed {
                    generation,
                    surface,
                } => {
                    log::debug!("displaying render generation {generation}");
                    self.displayed = Some((generation, surface));
                    if let (Some(callback), Some((_, surface))) =
                        (&mut self.rendered_callback, &self.displayed)
                    {
                        callback(surface);
                    }
                }
                RenderOutcome::Failed { generation, error } => {
                    log::warn!("render generation {generation} failed: {error}");
                    if let Some(callback) = &mut self.render_failed_callback {
                        callback(&error);
                    }
                }
            }
        }
    }

    /// Resolves one classified gesture against the document and invokes the
    /// listener. Cancel becomes exactly one up-with-no-selection callback.
    fn dispatch(&mut self, gesture: Gesture) {
        let (Some(document), Some(listener)) = (&self.document, &mut self.listener) else {
            return;
        };
        match gesture {
            Gesture::Tap(point) => {
                let objects = crate::hit::query(&**document, self.view_to_document, point);
                listener.on_tap(&objects, point);
            }
            Gesture::LongPress(point) => listener.on_long_press(point),
            Gesture::Move(point) => listener.on_move(point),
            Gesture::Up(point) => {
                let objects = crate::hit::query(&**document, self.view_to_document, point);
                listener.on_up(&objects, Some(point));
            }
            Gesture::Cancel => listener.on_up(&[], None),
        }
    }
}

// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster surfaces and the allocation seam the render scheduler draws through.

use alloc::vec::Vec;

use peniko::ImageFormat;

/// Bytes per pixel for the RGBA8 surfaces Canopy allocates.
const RGBA8_BYTES_PER_PIXEL: usize = 4;

use crate::RenderError;

/// A CPU raster target a [`SceneDocument`](crate::SceneDocument) paints into.
///
/// Pixels are tightly packed RGBA8, row-major, premultiplication as the
/// document and presenting backend agree. The surface owns its pixel memory;
/// a completed render transfers the whole surface to the interactive side,
/// where it becomes the displayed image.
#[derive(Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    format: ImageFormat,
    data: Vec<u8>,
}

impl core::fmt::Debug for Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Pixel data is elided; dumping megabytes into debug logs helps no one.
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}

impl Surface {
    /// Allocates a zeroed (transparent) RGBA8 surface.
    ///
    /// Allocation is fallible: running out of memory or overflowing the byte
    /// count yields [`RenderError::Allocation`] rather than aborting, so a
    /// huge document degrades into a failed render instead of taking the
    /// process down.
    pub fn rgba8(width: u32, height: u32) -> Result<Self, RenderError> {
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(RGBA8_BYTES_PER_PIXEL))
            .ok_or(RenderError::Allocation { bytes: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| RenderError::Allocation { bytes })?;
        data.resize(bytes, 0);
        Ok(Self {
            width,
            height,
            format: ImageFormat::Rgba8,
            data,
        })
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format of [`data`](Surface::data).
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Row stride in bytes.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width as usize * RGBA8_BYTES_PER_PIXEL
    }

    /// The raw pixel bytes, row-major, tightly packed.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the raw pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Allocation facility for raster surfaces.
///
/// The render scheduler asks an allocator for the surface each job paints
/// into. Hosts with pooled or mapped memory can substitute their own; the
/// default [`BufferAllocator`] just allocates from the heap.
pub trait SurfaceAllocator {
    /// Allocates a surface of the given pixel dimensions.
    fn allocate(&self, width: u32, height: u32) -> Result<Surface, RenderError>;
}

/// Heap-backed [`SurfaceAllocator`] used when the host supplies nothing else.
#[derive(Copy, Clone, Debug, Default)]
pub struct BufferAllocator;

impl SurfaceAllocator for BufferAllocator {
    fn allocate(&self, width: u32, height: u32) -> Result<Surface, RenderError> {
        Surface::rgba8(width, height)
    }
}

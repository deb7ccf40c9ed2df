// SPDX-License-Identifier: MPL-2.0

//! Color conversion from the decoder's native format to BGR24.
//!
//! The destination buffer is sized with `av_image_get_buffer_size` at
//! alignment 1 and wired into a frame with `av_image_fill_arrays`, so the
//! texture upload sees tightly packed rows. The buffer, the frame and the
//! swscale context are created once and reused for every decoded frame.

use ffmpeg_next as ffmpeg;
use ffmpeg::{
    decoder, ffi,
    format::Pixel,
    frame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use tracing::debug;

use super::{FrameConverter, Plane, check_buffer_size};
use crate::error::{Result, WallpaperError};

/// Pixel format handed to the renderer. Matches SDL's BGR24 byte order.
pub const TARGET_FORMAT: Pixel = Pixel::BGR24;

/// `av_malloc` allocation released with `av_free`.
struct AvBuffer {
    ptr: *mut u8,
    len: usize,
}

impl AvBuffer {
    fn alloc(len: usize) -> Option<Self> {
        let ptr = unsafe { ffi::av_malloc(len) }.cast::<u8>();
        (!ptr.is_null()).then_some(Self { ptr, len })
    }
}

impl Drop for AvBuffer {
    fn drop(&mut self) {
        unsafe { ffi::av_free(self.ptr.cast()) };
    }
}

/// Reusable swscale context plus the frame it writes into.
///
/// Drop order: scaling context, converted frame (which does not own its
/// planes), then the buffer behind those planes.
pub struct FfmpegConverter {
    scaler: ScalingContext,
    converted: frame::Video,
    buffer: AvBuffer,
}

impl FfmpegConverter {
    pub fn new(decoder: &decoder::Video) -> Result<Self> {
        let (width, height, native) = (decoder.width(), decoder.height(), decoder.format());
        let (c_width, c_height) = (width as i32, height as i32);

        let expected = unsafe {
            ffi::av_image_get_buffer_size(TARGET_FORMAT.into(), c_width, c_height, 1)
        };
        if expected <= 0 {
            return Err(WallpaperError::Converter(format!(
                "invalid frame size {width}x{height}: {}",
                ffmpeg::Error::from(expected)
            )));
        }
        let expected = expected as usize;

        let buffer = AvBuffer::alloc(expected).ok_or_else(|| {
            WallpaperError::Converter(format!("failed to allocate {expected} bytes"))
        })?;

        let mut converted = frame::Video::empty();
        let filled = unsafe {
            let raw = converted.as_mut_ptr();
            ffi::av_image_fill_arrays(
                (*raw).data.as_mut_ptr(),
                (*raw).linesize.as_mut_ptr(),
                buffer.ptr,
                TARGET_FORMAT.into(),
                c_width,
                c_height,
                1,
            )
        };
        check_buffer_size(buffer.len, usize::try_from(filled).unwrap_or(0))?;

        converted.set_format(TARGET_FORMAT);
        converted.set_width(width);
        converted.set_height(height);

        let scaler = ScalingContext::get(
            native,
            width,
            height,
            TARGET_FORMAT,
            width,
            height,
            ScalingFlags::BICUBIC,
        )
        .map_err(|e| WallpaperError::Converter(e.to_string()))?;

        debug!(
            from = ?native,
            to = ?TARGET_FORMAT,
            width,
            height,
            bytes = expected,
            stride = converted.stride(0),
            "Created frame converter"
        );

        Ok(Self {
            scaler,
            converted,
            buffer,
        })
    }
}

impl FrameConverter<frame::Video> for FfmpegConverter {
    fn convert(&mut self, frame: &frame::Video) -> eyre::Result<Plane<'_>> {
        self.scaler.run(frame, &mut self.converted)?;

        let stride = self.converted.stride(0);
        let data = self.converted.data(0);
        debug_assert!(data.len() <= self.buffer.len);
        Ok(Plane { data, stride })
    }
}

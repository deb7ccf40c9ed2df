// SPDX-License-Identifier: MPL-2.0

//! FFmpeg container and decoder for the first video stream.

use std::{ffi::CString, ptr};

use ffmpeg_next as ffmpeg;
use ffmpeg::{Packet, codec, decoder, ffi, format, frame, media};
use tracing::{debug, info, trace};

use super::{DecodeOutcome, MediaSource, ReadOutcome, VideoGeometry, select_video_stream};
use crate::error::{Result, WallpaperError};

/// An open container with a decoder bound to its first video stream.
///
/// Fields are declared in reverse acquisition order so that dropping the
/// source frees the frame, then the decoder, then closes the container.
pub struct FfmpegSource {
    /// Reused target of every `receive_frame`.
    decoded: frame::Video,
    decoder: decoder::Video,
    stream_index: usize,
    input: format::context::Input,
}

impl FfmpegSource {
    /// Open `uri`, probe it and open a decoder for its first video stream.
    pub fn open(uri: &str) -> Result<Self> {
        let open_error = |reason: String| WallpaperError::Open {
            uri: uri.to_owned(),
            reason,
        };

        let c_uri = CString::new(uri).map_err(|e| open_error(e.to_string()))?;

        // Opening and probing are separate steps so each reports its own error.
        let mut input = unsafe {
            let mut ctx = ptr::null_mut();
            let ret = ffi::avformat_open_input(&mut ctx, c_uri.as_ptr(), ptr::null(), ptr::null_mut());
            if ret != 0 {
                return Err(open_error(ffmpeg::Error::from(ret).to_string()));
            }
            format::context::Input::wrap(ctx)
        };

        let ret = unsafe { ffi::avformat_find_stream_info(input.as_mut_ptr(), ptr::null_mut()) };
        if ret < 0 {
            return Err(WallpaperError::Probe(ffmpeg::Error::from(ret).to_string()));
        }

        let stream_index = select_video_stream(
            input
                .streams()
                .map(|stream| stream.parameters().medium() == media::Type::Video),
        )
        .ok_or(WallpaperError::NoVideoStream)?;

        let parameters = input
            .stream(stream_index)
            .ok_or(WallpaperError::NoVideoStream)?
            .parameters();

        let codec_id = parameters.id();
        let codec = decoder::find(codec_id)
            .ok_or_else(|| WallpaperError::UnsupportedCodec(format!("{codec_id:?}")))?;

        let mut context = codec::context::Context::new();
        context
            .set_parameters(parameters)
            .map_err(|e| WallpaperError::Decoder(e.to_string()))?;

        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(|e| WallpaperError::Decoder(e.to_string()))?;

        info!(
            uri,
            streams = input.nb_streams(),
            stream_index,
            codec = codec.name(),
            width = decoder.width(),
            height = decoder.height(),
            format = ?decoder.format(),
            "Opened video source"
        );

        Ok(Self {
            decoded: frame::Video::empty(),
            decoder,
            stream_index,
            input,
        })
    }

    pub(crate) fn decoder(&self) -> &decoder::Video {
        &self.decoder
    }
}

impl MediaSource for FfmpegSource {
    type Packet = Packet;
    type Frame = frame::Video;

    fn geometry(&self) -> VideoGeometry {
        VideoGeometry {
            width: self.decoder.width(),
            height: self.decoder.height(),
            pixel_format: format!("{:?}", self.decoder.format()),
        }
    }

    fn read_packet(&mut self) -> ReadOutcome<Packet> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => ReadOutcome::Packet(packet),
            Err(ffmpeg::Error::Eof) => ReadOutcome::EndOfStream,
            Err(err) => ReadOutcome::Failed(err.to_string()),
        }
    }

    fn is_video_packet(&self, packet: &Packet) -> bool {
        packet.stream() == self.stream_index
    }

    fn decode(&mut self, packet: &Packet) -> DecodeOutcome<'_, frame::Video> {
        // A rejected packet still leaves earlier input to drain below.
        if let Err(err) = self.decoder.send_packet(packet) {
            trace!(%err, "Decoder rejected packet");
        }

        match self.decoder.receive_frame(&mut self.decoded) {
            Ok(()) => DecodeOutcome::Frame(&self.decoded),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => {
                DecodeOutcome::NotReady
            }
            Err(ffmpeg::Error::Eof) => DecodeOutcome::NotReady,
            Err(err) => DecodeOutcome::Failed(err.to_string()),
        }
    }

    fn seek_to_start(&mut self) -> eyre::Result<()> {
        let ret = unsafe {
            let ctx = self.input.as_mut_ptr();
            let start = match (*ctx).start_time {
                ffi::AV_NOPTS_VALUE => 0,
                start => start,
            };
            debug!(start, "Seeking to container start");
            ffi::av_seek_frame(ctx, -1, start, ffi::AVSEEK_FLAG_BACKWARD as i32)
        };

        if ret < 0 {
            return Err(eyre::eyre!(
                "Failed to seek to start: {}",
                ffmpeg::Error::from(ret)
            ));
        }
        Ok(())
    }
}

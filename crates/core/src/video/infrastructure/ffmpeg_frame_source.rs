use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

/// Samples frames from a video via ffmpeg-next (libavformat + libavcodec).
///
/// Decodes every frame, keeps one per sampling instant (`sample_fps`),
/// and scales the kept frames to `output_width` (height preserves aspect)
/// in RGB24 before handing them to the pipeline.
pub struct FfmpegFrameSource {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
    sample_fps: f64,
    output_width: u32,
    metadata: Option<VideoMetadata>,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            video_stream_index: 0,
            sample_fps: 1.0,
            output_width: 640,
            metadata: None,
        }
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(
        &mut self,
        path: &Path,
        sample_fps: f64,
        output_width: u32,
    ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        if sample_fps <= 0.0 {
            return Err("sample rate must be positive".into());
        }
        if output_width == 0 {
            return Err("output width must be positive".into());
        }

        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let scaled_height = scaled_height(decoder.width(), decoder.height(), output_width);

        let metadata = VideoMetadata {
            width: output_width,
            height: scaled_height,
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.video_stream_index = video_stream_index;
        self.sample_fps = sample_fps;
        self.output_width = output_width;
        self.metadata = Some(metadata.clone());
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegFrameSource: not opened".into())));
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let time_base = f64::from(stream.time_base());
        let rate = stream.rate();
        let source_fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();

        let out_width = self.output_width;
        let out_height = scaled_height(decoder.width(), decoder.height(), out_width);

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            out_width,
            out_height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        Box::new(SampledFrameIter {
            ictx,
            decoder,
            scaler,
            out_width,
            out_height,
            video_stream_index: self.video_stream_index,
            time_base,
            source_fps,
            cursor: SampleCursor::new(self.sample_fps),
            decoded_count: 0,
            sample_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.input_ctx = None;
        self.metadata = None;
    }
}

/// Lazy iterator that decodes one frame at a time and emits only the
/// frames landing on a sampling instant, so the whole video is never
/// buffered in memory.
struct SampledFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    out_width: u32,
    out_height: u32,
    video_stream_index: usize,
    time_base: f64,
    source_fps: f64,
    cursor: SampleCursor,
    decoded_count: usize,
    sample_index: usize,
    flushing: bool,
    done: bool,
}

impl SampledFrameIter<'_> {
    /// Drains decoded frames, returning the next one that falls on a
    /// sampling instant, already scaled to RGB24.
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let seconds = self.frame_time(&decoded);
            self.decoded_count += 1;

            if !self.cursor.keep(seconds) {
                continue;
            }

            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
            if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
                return Some(Err(Box::new(e)));
            }

            let pixels = extract_rgb_pixels(&rgb_frame, self.out_width, self.out_height);
            let frame = Frame::new(pixels, self.out_width, self.out_height, self.sample_index);
            self.sample_index += 1;
            return Some(Ok(frame));
        }
        None
    }

    fn frame_time(&self, decoded: &ffmpeg_next::util::frame::video::Video) -> f64 {
        match decoded.pts() {
            Some(pts) if self.time_base > 0.0 => pts as f64 * self.time_base,
            _ if self.source_fps > 0.0 => self.decoded_count as f64 / self.source_fps,
            _ => self.decoded_count as f64,
        }
    }
}

impl Iterator for SampledFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Decides which decoded frames land on a sampling instant.
///
/// The cursor anchors on the first observed frame time, so streams whose
/// timestamps do not start at zero still sample at the requested rate.
/// On a keep, the cursor jumps past the frame time in one step, so a
/// timestamp discontinuity yields a single sample rather than a burst.
struct SampleCursor {
    interval: f64,
    next_time: Option<f64>,
}

impl SampleCursor {
    fn new(sample_fps: f64) -> Self {
        Self {
            interval: 1.0 / sample_fps,
            next_time: None,
        }
    }

    fn keep(&mut self, seconds: f64) -> bool {
        // Small epsilon so a frame exactly on the instant is kept.
        let next = self.next_time.get_or_insert(seconds);
        if seconds + 1e-9 < *next {
            return false;
        }
        while seconds + 1e-9 >= *next {
            *next += self.interval;
        }
        true
    }
}

fn scaled_height(src_width: u32, src_height: u32, out_width: u32) -> u32 {
    if src_width == 0 {
        return src_height.max(1);
    }
    ((src_height as u64 * out_width as u64) / src_width as u64).max(1) as u32
}

/// Copies RGB24 pixel rows out of an ffmpeg frame, honoring the stride
/// (ffmpeg pads rows to alignment boundaries).
fn extract_rgb_pixels(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_len = width as usize * 3;
    let data = frame.data(0);

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}

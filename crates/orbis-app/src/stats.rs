//! Frame-rate statistics written to the log.

use tracing::info;

/// Averages over one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frames: u32,
    pub fps: f32,
    pub avg_frame_ms: f32,
}

/// Counts frames and emits a [`FrameReport`] every `interval_secs`.
#[derive(Debug, Clone)]
pub struct FrameStats {
    interval_secs: f32,
    frames: u32,
    elapsed: f32,
    total_frames: u64,
}

impl FrameStats {
    /// An interval of zero or less disables reporting.
    pub fn new(interval_secs: f32) -> Self {
        Self {
            interval_secs,
            frames: 0,
            elapsed: 0.0,
            total_frames: 0,
        }
    }

    /// Record one frame of `dt` seconds. Returns a report when the interval elapses.
    pub fn record(&mut self, dt: f32) -> Option<FrameReport> {
        self.total_frames += 1;
        if self.interval_secs <= 0.0 {
            return None;
        }

        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < self.interval_secs {
            return None;
        }

        let report = FrameReport {
            frames: self.frames,
            fps: self.frames as f32 / self.elapsed,
            avg_frame_ms: self.elapsed * 1000.0 / self.frames as f32,
        };
        info!(
            "{:.1} fps ({:.2} ms/frame over {} frames)",
            report.fps, report.avg_frame_ms, report.frames
        );
        self.frames = 0;
        self.elapsed = 0.0;
        Some(report)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

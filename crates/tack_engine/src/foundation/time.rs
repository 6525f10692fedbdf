//! Time management utilities
//!
//! [`FixedStep`] drives the update and render cadences of the frame loop,
//! [`FrameTime`] is the read-only view of timing handed to game code.

use std::time::{Duration, Instant};

/// Fixed-rate tick accumulator
///
/// Elapsed wall-clock time is fed in with [`FixedStep::accumulate`]; every
/// full interval stored in the accumulator is one due tick.
#[derive(Debug, Clone)]
pub struct FixedStep {
    interval: Duration,
    accumulator: Duration,
}

impl FixedStep {
    /// Create an accumulator ticking `frequency` times per second
    ///
    /// A non-positive frequency falls back to 60 Hz.
    pub fn from_frequency(frequency: f64) -> Self {
        let frequency = if frequency > 0.0 && frequency.is_finite() {
            frequency
        } else {
            log::warn!("Invalid tick frequency {}, falling back to 60 Hz", frequency);
            60.0
        };
        Self {
            interval: Duration::from_secs_f64(1.0 / frequency),
            accumulator: Duration::ZERO,
        }
    }

    /// Length of one tick
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Add elapsed time to the accumulator
    pub fn accumulate(&mut self, elapsed: Duration) {
        self.accumulator += elapsed;
    }

    /// Consume one tick if one is due
    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            true
        } else {
            false
        }
    }

    /// Drop any backlog, used when the loop cannot catch up
    pub fn discard_backlog(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    /// Time left until the next tick is due
    pub fn until_next_tick(&self) -> Duration {
        self.interval.saturating_sub(self.accumulator)
    }
}

/// Frame timing visible to the game and to components
#[derive(Debug, Clone)]
pub struct FrameTime {
    /// Fixed update interval in seconds
    pub delta_time: f32,
    /// Seconds since the engine finished loading
    pub total_time: f32,
    /// Number of completed update ticks
    pub update_count: u64,
    /// Number of completed render ticks
    pub render_count: u64,
    /// Render frames per second measured over the last second
    pub fps: f32,
    started: Instant,
    fps_window_start: Instant,
    fps_window_frames: u32,
}

impl FrameTime {
    /// Create frame timing for an update loop running at `update_frequency`
    pub fn new(update_frequency: f64) -> Self {
        let now = Instant::now();
        Self {
            delta_time: (1.0 / update_frequency.max(f64::EPSILON)) as f32,
            total_time: 0.0,
            update_count: 0,
            render_count: 0,
            fps: 0.0,
            started: now,
            fps_window_start: now,
            fps_window_frames: 0,
        }
    }

    /// Record a completed update tick
    pub(crate) fn record_update(&mut self) {
        self.update_count += 1;
        self.total_time = self.started.elapsed().as_secs_f32();
    }

    /// Record a completed render tick and refresh the FPS measurement
    pub(crate) fn record_render(&mut self) {
        self.render_count += 1;
        self.fps_window_frames += 1;
        let window = self.fps_window_start.elapsed();
        if window >= Duration::from_secs(1) {
            self.fps = self.fps_window_frames as f32 / window.as_secs_f32();
            self.fps_window_frames = 0;
            self.fps_window_start = Instant::now();
        }
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start or resume timing
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    /// Pause timing, keeping the elapsed total
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Total elapsed time including the running segment
    pub fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(start) => self.elapsed + start.elapsed(),
            None => self.elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_consumes_whole_ticks() {
        let mut step = FixedStep::from_frequency(100.0);
        assert_eq!(step.interval(), Duration::from_millis(10));

        step.accumulate(Duration::from_millis(25));
        assert!(step.consume_tick());
        assert!(step.consume_tick());
        assert!(!step.consume_tick());
        assert_eq!(step.until_next_tick(), Duration::from_millis(5));
    }

    #[test]
    fn test_fixed_step_invalid_frequency_falls_back() {
        let step = FixedStep::from_frequency(0.0);
        assert_eq!(step.interval(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn test_discard_backlog() {
        let mut step = FixedStep::from_frequency(10.0);
        step.accumulate(Duration::from_secs(3));
        step.discard_backlog();
        assert!(!step.consume_tick());
    }

    #[test]
    fn test_stopwatch_accumulates_segments() {
        let mut stopwatch = Stopwatch::start_new();
        std::thread::sleep(Duration::from_millis(2));
        stopwatch.stop();
        let first = stopwatch.elapsed();
        assert!(first >= Duration::from_millis(2));
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(stopwatch.elapsed(), first);
    }
}

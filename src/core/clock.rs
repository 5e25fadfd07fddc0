use std::collections::VecDeque;
use std::time::Instant;

/// Samples kept for the profiler graphs
pub const HISTORY_LEN: usize = 200;

/// Frame clock: tracks delta time and a rolling frame-time history
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    history: VecDeque<f32>,
    capacity: usize,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_LEN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            last_tick: Instant::now(),
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.record(delta);
        delta
    }

    /// Push a frame time (seconds), dropping the oldest past capacity
    pub fn record(&mut self, delta: f32) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(delta);
    }

    /// Frame times in seconds, oldest first
    pub fn frame_times(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn last_frame_time(&self) -> Option<f32> {
        self.history.back().copied()
    }

    /// Frames per second over the recorded window
    pub fn fps(&self) -> f32 {
        let total: f32 = self.history.iter().sum();
        if total <= 0.0 {
            0.0
        } else {
            self.history.len() as f32 / total
        }
    }

    /// Reset clock to current time and forget the history
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
        self.history.clear();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009);
        assert_eq!(clock.last_frame_time(), Some(delta));
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();
        clock.record(0.5);

        thread::sleep(Duration::from_millis(10));
        clock.reset();
        assert_eq!(clock.frame_times().len(), 0);

        let delta = clock.tick();
        // Should be very small since we just reset
        assert!(delta < 0.005);
    }

    #[test]
    fn history_is_bounded() {
        let mut clock = Clock::with_capacity(3);
        for dt in [1.0, 2.0, 3.0, 4.0] {
            clock.record(dt);
        }
        let times: Vec<f32> = clock.frame_times().collect();
        assert_eq!(times, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn fps_averages_window() {
        let mut clock = Clock::with_capacity(4);
        assert_eq!(clock.fps(), 0.0);
        for _ in 0..4 {
            clock.record(0.02);
        }
        assert!((clock.fps() - 50.0).abs() < 1e-3);
    }
}

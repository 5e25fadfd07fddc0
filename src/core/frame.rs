use crate::settings::AccumulationMode;

/// Blend weight of the newest frame in constant mode
pub const CONSTANT_BLEND_WEIGHT: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    Constant,
    Weighted,
}

/// What the accumulate stage should do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulationStep {
    pub technique: Technique,
    /// Accumulated frames before this tick
    pub frames: u32,
    /// Weight of the freshly traced frame
    pub weight: f32,
}

/// Total tick count plus the accumulation-frame count that drives blending
#[derive(Debug, Clone, Default)]
pub struct FrameCounter {
    total: u64,
    accumulated: u32,
    last_mode: AccumulationMode,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn accumulated(&self) -> u32 {
        self.accumulated
    }

    /// Advance the accumulation state for this tick.
    ///
    /// Entering `Off` or `Weighted` restarts the count at zero; any other active tick
    /// counts up by one after producing its step.
    pub fn advance(&mut self, mode: AccumulationMode) -> Option<AccumulationStep> {
        if mode != self.last_mode {
            log::debug!("accumulation {:?} -> {:?}", self.last_mode, mode);
            if matches!(mode, AccumulationMode::Off | AccumulationMode::Weighted) {
                self.accumulated = 0;
            }
            self.last_mode = mode;
        }

        let step = match mode {
            AccumulationMode::Off => {
                self.accumulated = 0;
                return None;
            }
            AccumulationMode::Constant => AccumulationStep {
                technique: Technique::Constant,
                frames: self.accumulated,
                weight: CONSTANT_BLEND_WEIGHT,
            },
            AccumulationMode::Weighted => AccumulationStep {
                technique: Technique::Weighted,
                frames: self.accumulated,
                weight: 1.0 / (self.accumulated as f32 + 1.0),
            },
        };
        self.accumulated = self.accumulated.saturating_add(1);
        Some(step)
    }

    /// Restart the running blend without touching the mode transition state.
    /// The next weighted step takes the traced frame at full weight.
    pub fn restart(&mut self) {
        self.accumulated = 0;
    }

    /// Called once per completed draw
    pub fn finish_tick(&mut self) {
        self.total += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_keeps_mode_transitions() {
        let mut counter = FrameCounter::new();
        for _ in 0..4 {
            counter.advance(AccumulationMode::Weighted);
        }
        counter.restart();

        let step = counter.advance(AccumulationMode::Weighted).unwrap();
        assert_eq!(step.frames, 0);
        assert_eq!(step.weight, 1.0);
        assert_eq!(counter.advance(AccumulationMode::Weighted).unwrap().frames, 1);

        // Weighted -> Constant still carries the count over
        assert_eq!(counter.advance(AccumulationMode::Constant).unwrap().frames, 2);
    }

    #[test]
    fn off_never_produces_a_step() {
        let mut counter = FrameCounter::new();
        for _ in 0..4 {
            assert_eq!(counter.advance(AccumulationMode::Off), None);
        }
        assert_eq!(counter.accumulated(), 0);
    }

    #[test]
    fn constant_counts_up_with_fixed_weight() {
        let mut counter = FrameCounter::new();
        for expected in 0..5 {
            let step = counter.advance(AccumulationMode::Constant).unwrap();
            assert_eq!(step.frames, expected);
            assert_eq!(step.weight, CONSTANT_BLEND_WEIGHT);
            assert_eq!(step.technique, Technique::Constant);
        }
        assert_eq!(counter.accumulated(), 5);
    }

    #[test]
    fn weighted_restarts_and_weights_by_count() {
        let mut counter = FrameCounter::new();
        counter.advance(AccumulationMode::Constant);
        counter.advance(AccumulationMode::Constant);

        let first = counter.advance(AccumulationMode::Weighted).unwrap();
        assert_eq!(first.frames, 0);
        assert_eq!(first.weight, 1.0);

        let second = counter.advance(AccumulationMode::Weighted).unwrap();
        assert_eq!(second.frames, 1);
        assert_eq!(second.weight, 0.5);

        let third = counter.advance(AccumulationMode::Weighted).unwrap();
        assert!((third.weight - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn weighted_to_constant_keeps_count() {
        let mut counter = FrameCounter::new();
        counter.advance(AccumulationMode::Weighted);
        counter.advance(AccumulationMode::Weighted);
        let step = counter.advance(AccumulationMode::Constant).unwrap();
        assert_eq!(step.frames, 2);
    }

    #[test]
    fn total_only_moves_on_finish() {
        let mut counter = FrameCounter::new();
        counter.advance(AccumulationMode::Constant);
        assert_eq!(counter.total(), 0);
        counter.finish_tick();
        counter.finish_tick();
        assert_eq!(counter.total(), 2);
    }
}

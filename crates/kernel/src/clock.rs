use std::time::Instant;

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Source {
    Realtime,
    Fixed(f32),
}

/// Frame time source. Sampled exactly once per tick.
///
/// In realtime mode the delta is the wall time since the previous sample,
/// clamped to `max_delta` so a stalled host does not produce a huge step.
/// In fixed mode every sample returns the same step.
#[derive(Debug, Clone)]
pub struct Clock {
    source: Source,
    last: Option<Instant>,
    delta: f32,
    elapsed: f64,
    samples: u64,
    max_delta: f32,
}

impl Clock {
    pub fn realtime(max_delta: f32) -> Self {
        Self {
            source: Source::Realtime,
            last: None,
            delta: 0.0,
            elapsed: 0.0,
            samples: 0,
            max_delta,
        }
    }

    pub fn fixed(step: f32) -> Self {
        Self {
            source: Source::Fixed(step),
            max_delta: step,
            ..Self::realtime(step)
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        match config.fixed_delta {
            Some(step) => Self::fixed(step),
            None => Self::realtime(config.max_delta),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.source, Source::Fixed(_))
    }

    /// Advance the clock and return the new delta in seconds.
    pub fn sample(&mut self) -> f32 {
        let delta = match self.source {
            Source::Fixed(step) => step,
            Source::Realtime => {
                let now = Instant::now();
                let raw = self
                    .last
                    .map(|last| now.duration_since(last).as_secs_f32())
                    .unwrap_or(0.0);
                self.last = Some(now);
                raw.clamp(0.0, self.max_delta)
            }
        };
        self.delta = delta;
        self.elapsed += f64::from(delta);
        self.samples += 1;
        delta
    }

    /// Forget the previous wall-clock sample so the next delta starts from
    /// zero. Elapsed time is kept.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Delta produced by the most recent sample.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Sum of every delta sampled so far, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_deterministic() {
        let mut clock = Clock::fixed(0.5);
        assert_eq!(clock.sample(), 0.5);
        assert_eq!(clock.sample(), 0.5);
        assert_eq!(clock.elapsed(), 1.0);
        assert_eq!(clock.samples(), 2);
        assert!(clock.is_fixed());
    }

    #[test]
    fn realtime_first_sample_is_zero() {
        let mut clock = Clock::realtime(0.1);
        assert_eq!(clock.sample(), 0.0);
        assert!(clock.sample() <= 0.1);
    }

    #[test]
    fn realtime_delta_is_clamped() {
        let mut clock = Clock::realtime(0.001);
        clock.sample();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.sample(), 0.001);
    }

    #[test]
    fn reset_restarts_delta() {
        let mut clock = Clock::realtime(1.0);
        clock.sample();
        clock.reset();
        assert_eq!(clock.sample(), 0.0);
    }

    #[test]
    fn from_config_picks_source() {
        let config = EngineConfig::fixed(0.25);
        assert!(Clock::from_config(&config).is_fixed());
        assert!(!Clock::from_config(&EngineConfig::default()).is_fixed());
    }
}

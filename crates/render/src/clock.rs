use std::time::{Duration, Instant};

/// Source of per-frame elapsed time.
///
/// The first call reports 0.0 (the clock starts on first use); every call
/// returns a finite, non-negative number of seconds.
pub trait Clock {
    /// Seconds since the previous call.
    fn delta(&mut self) -> f32;
}

/// Wall clock backed by [`Instant`].
///
/// Deltas are capped so a stalled frame (window dragged, process suspended)
/// does not hand the camera controller a multi-second step.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::with_max_delta(Duration::from_millis(100))
    }

    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }
}

impl Clock for MonotonicClock {
    fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let Some(last) = self.last.replace(now) else {
            return 0.0;
        };
        // Instant is monotonic; saturating keeps this non-negative regardless.
        now.saturating_duration_since(last)
            .min(self.max_delta)
            .as_secs_f32()
    }
}

/// Deterministic clock advancing by a fixed step, for headless runs and tests.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f32,
    started: bool,
}

impl FixedStepClock {
    /// Negative or non-finite steps are treated as 0.
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
        Self {
            step,
            started: false,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

impl Clock for FixedStepClock {
    fn delta(&mut self) -> f32 {
        if !self.started {
            self.started = true;
            return 0.0;
        }
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_first_delta_is_zero() {
        let mut clock = MonotonicClock::new();
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn monotonic_deltas_never_negative() {
        let mut clock = MonotonicClock::new();
        for _ in 0..100 {
            let dt = clock.delta();
            assert!(dt >= 0.0 && dt.is_finite());
        }
    }

    #[test]
    fn monotonic_delta_is_capped() {
        let mut clock = MonotonicClock::with_max_delta(Duration::from_millis(1));
        clock.delta();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.delta() <= 0.001 + f32::EPSILON);
    }

    #[test]
    fn fixed_step_sequence() {
        let mut clock = FixedStepClock::new(0.5);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.delta(), 0.5);
        assert_eq!(clock.delta(), 0.5);
    }

    #[test]
    fn fixed_step_rejects_negative() {
        let mut clock = FixedStepClock::new(-1.0);
        clock.delta();
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(FixedStepClock::new(f32::NAN).step(), 0.0);
    }
}

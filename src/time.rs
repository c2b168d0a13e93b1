use crate::error::{Error, Result};

/// Simulation clock of a single run.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeController {
    duration: f64,
    time_step: f64,
    elapsed: f64,
    step_count: usize,
    adaptive: bool,
}

impl TimeController {
    /// `duration` and `time_step` in seconds.
    pub fn new(duration: f64, time_step: f64, adaptive: bool) -> Result<Self> {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(Error::InvalidDuration(duration));
        }
        check_time_step(time_step)?;
        Ok(TimeController {
            duration,
            time_step,
            elapsed: 0.0,
            step_count: 0,
            adaptive,
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    pub fn remaining(&self) -> f64 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Move the clock forward by the current step. The last step may
    /// overshoot the duration.
    pub fn advance(&mut self) {
        self.elapsed += self.time_step;
        self.step_count += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Change the step size. Ignored unless the controller is adaptive.
    pub fn adjust_time_step(&mut self, time_step: f64) -> Result<()> {
        if self.adaptive {
            check_time_step(time_step)?;
            self.time_step = time_step;
        }
        Ok(())
    }
}

fn check_time_step(time_step: f64) -> Result<()> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTimeStep(time_step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    #[test]
    fn advance_counts_steps() {
        let mut time = TimeController::new(1.0, 0.25, false).unwrap();
        let mut steps = 0;
        while !time.is_finished() {
            time.advance();
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(time.step_count(), 4);
        assert_eq!(time.elapsed(), 1.0);
        assert_eq!(time.remaining(), 0.0);
    }

    #[test]
    fn advance_does_not_clamp() {
        let mut time = TimeController::new(1.0, 0.4, false).unwrap();
        time.advance();
        time.advance();
        assert!(!time.is_finished());
        time.advance();
        assert!(time.is_finished());
        assert!(time.elapsed() > 1.0);
    }

    #[test]
    fn zero_duration_is_finished_immediately() {
        assert!(TimeController::new(0.0, 0.1, false).unwrap().is_finished());
    }

    #[test_case(true, 0.05; "adaptive")]
    #[test_case(false, 0.1; "fixed")]
    fn adjust_time_step(adaptive: bool, expected: f64) {
        let mut time = TimeController::new(1.0, 0.1, adaptive).unwrap();
        time.adjust_time_step(0.05).unwrap();
        assert_eq!(time.time_step(), expected);
    }

    #[test]
    fn invalid_values() {
        assert_matches!(
            TimeController::new(-1.0, 0.1, false),
            Err(Error::InvalidDuration(_))
        );
        assert_matches!(
            TimeController::new(1.0, 0.0, false),
            Err(Error::InvalidTimeStep(_))
        );
        let mut time = TimeController::new(1.0, 0.1, true).unwrap();
        assert_matches!(
            time.adjust_time_step(f64::NAN),
            Err(Error::InvalidTimeStep(_))
        );
        assert_eq!(time.time_step(), 0.1);
    }
}

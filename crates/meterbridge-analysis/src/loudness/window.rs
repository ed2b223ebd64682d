//! Duration-based sliding energy window.

use std::collections::VecDeque;

/// Slack for floating-point drift when comparing durations.
const DURATION_SLACK: f64 = 1e-9;

/// Sliding accumulator of `(mean square, duration)` pairs.
///
/// Holds at most `length_secs` of audio; once full, the oldest pair is
/// trimmed, fractionally if only part of it falls outside the window.
#[derive(Debug, Clone)]
pub struct EnergyWindow {
    length_secs: f64,
    entries: VecDeque<(f64, f64)>,
    energy: f64,
    duration: f64,
}

impl EnergyWindow {
    pub fn new(length_secs: f64) -> Self {
        Self {
            length_secs: length_secs.max(0.0),
            entries: VecDeque::new(),
            energy: 0.0,
            duration: 0.0,
        }
    }

    /// Append a block. Non-positive or non-finite durations are ignored.
    pub fn push(&mut self, mean_square: f64, duration_secs: f64) {
        if !(duration_secs.is_finite() && duration_secs > 0.0 && mean_square.is_finite()) {
            return;
        }
        let mean_square = mean_square.max(0.0);
        self.entries.push_back((mean_square, duration_secs));
        self.energy += mean_square * duration_secs;
        self.duration += duration_secs;
        self.trim();
    }

    fn trim(&mut self) {
        while self.duration > self.length_secs + DURATION_SLACK {
            let excess = self.duration - self.length_secs;
            let Some(front) = self.entries.front_mut() else {
                break;
            };
            if front.1 <= excess + DURATION_SLACK {
                let (ms, dur) = *front;
                self.entries.pop_front();
                self.energy -= ms * dur;
                self.duration -= dur;
            } else {
                front.1 -= excess;
                self.energy -= front.0 * excess;
                self.duration -= excess;
            }
        }

        if self.entries.is_empty() {
            self.energy = 0.0;
            self.duration = 0.0;
        }
    }

    /// Duration-weighted mean square of the window contents, 0 when empty.
    pub fn mean_square(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.energy / self.duration).max(0.0)
    }

    /// Seconds of audio currently held.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn length(&self) -> f64 {
        self.length_secs
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.energy = 0.0;
        self.duration = 0.0;
    }
}

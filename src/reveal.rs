use std::{ops::Range, time::Duration};

use crate::config::Settings;

/// Staggered "bubble-in": the first few elements show immediately, the rest
/// appear one per `delay`. Knows nothing about bodies, only indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealSchedule {
    total: usize,
    revealed: usize,
    initial: usize,
    delay: Duration,
}

impl RevealSchedule {
    pub fn new(total: usize, initial: usize, delay: Duration) -> Self {
        let initial = initial.min(total);
        Self {
            total,
            revealed: initial,
            initial,
            delay,
        }
    }

    /// Everything visible from the start.
    pub fn immediate(total: usize) -> Self {
        Self::new(total, total, Duration::ZERO)
    }

    pub fn from_settings(total: usize, settings: &Settings) -> Self {
        if settings.bubble_in {
            Self::new(total, settings.bubble_initial, settings.bubble_delay)
        } else {
            Self::immediate(total)
        }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.total
    }

    pub fn is_visible(&self, index: usize) -> bool {
        index < self.revealed
    }

    /// When index `index` becomes visible, measured from the start.
    pub fn reveal_at(&self, index: usize) -> Duration {
        if index < self.initial {
            Duration::ZERO
        } else {
            let step = (index - self.initial + 1).min(u32::MAX as usize) as u32;
            self.delay.saturating_mul(step)
        }
    }

    /// Catches the schedule up to `elapsed` and returns the indices that just
    /// became visible.
    pub fn advance(&mut self, elapsed: Duration) -> Range<usize> {
        let start = self.revealed;
        while self.revealed < self.total && self.reveal_at(self.revealed) <= elapsed {
            self.revealed += 1;
        }
        start..self.revealed
    }
}

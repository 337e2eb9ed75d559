//! Adaptive population sizing
//!
//! Holds per-generation wall time near a target while maximizing the
//! population. Five phases:
//!
//! 1. `Explore` - grow by 50% per generation until the target is breached
//! 2. `BinarySearch` - bisect between the last safe size and the ceiling
//! 3. `Adapt` - grow cautiously on headroom; watch for oscillation
//! 4. `FineTune` - bisect again inside the oscillation band
//! 5. `Locked` - hold, falling back to the safe size on any breach
//!
//! The sizer only proposes the next target size; it never cancels work in
//! flight. The driver applies the proposal by truncating or duplicating.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sizer tuning knobs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutoPopulationConfig {
    /// Target wall time per generation
    pub generation_time_target: Duration,

    pub min_population_size: usize,
    pub max_population_size: usize,
}

impl Default for AutoPopulationConfig {
    fn default() -> Self {
        Self {
            generation_time_target: Duration::from_millis(1500),
            min_population_size: 10,
            max_population_size: 100_000,
        }
    }
}

/// Current sizer phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizerPhase {
    Explore,
    BinarySearch,
    Adapt,
    FineTune,
    Locked,
}

const OSCILLATION_HISTORY: usize = 10;
const OSCILLATION_WINDOW: usize = 6;

/// Sizer state, owned by the evolution driver
#[derive(Clone, Debug)]
pub struct AutoPopState {
    config: AutoPopulationConfig,
    phase: SizerPhase,
    max_safe: Option<usize>,
    search_low: usize,
    search_high: usize,
    fine_low: usize,
    fine_high: usize,
    oscillation: VecDeque<usize>,
}

impl AutoPopState {
    pub fn new(config: AutoPopulationConfig) -> Self {
        Self {
            config,
            phase: SizerPhase::Explore,
            max_safe: None,
            search_low: 0,
            search_high: 0,
            fine_low: 0,
            fine_high: 0,
            oscillation: VecDeque::with_capacity(OSCILLATION_HISTORY),
        }
    }

    pub fn phase(&self) -> SizerPhase {
        self.phase
    }

    /// Largest size observed to stay within the time target
    pub fn max_safe(&self) -> Option<usize> {
        self.max_safe
    }

    /// Observe one generation and propose the next population size
    ///
    /// `size` is the population size that produced `elapsed` (measured
    /// before reproduction inflated it).
    pub fn adjust(&mut self, size: usize, elapsed: Duration) -> usize {
        let target = self.config.generation_time_target;
        let within = elapsed <= target;

        match self.phase {
            SizerPhase::Explore => {
                if within {
                    self.record_safe(size);
                    let grown = (size + size / 2).max(size + 1);
                    grown.min(self.config.max_population_size)
                } else {
                    self.search_low = self.max_safe.unwrap_or(self.config.min_population_size);
                    self.search_high = size;
                    self.phase = SizerPhase::BinarySearch;
                    debug!(
                        ceiling = size,
                        low = self.search_low,
                        high = self.search_high,
                        "sizer found ceiling, entering binary search"
                    );
                    (self.search_low + self.search_high) / 2
                }
            }

            SizerPhase::BinarySearch => {
                if within {
                    self.record_safe(size);
                    self.search_low = size;
                } else {
                    self.search_high = size;
                }
                if self.search_high.saturating_sub(self.search_low) <= 1 {
                    self.phase = SizerPhase::Adapt;
                    let sweet_spot = self.max_safe.unwrap_or(self.search_low);
                    debug!(sweet_spot, "binary search converged, entering adapt");
                    sweet_spot
                } else {
                    (self.search_low + self.search_high) / 2
                }
            }

            SizerPhase::Adapt => {
                self.oscillation.push_back(size);
                while self.oscillation.len() > OSCILLATION_HISTORY {
                    self.oscillation.pop_front();
                }

                if let Some((low, high)) = self.detect_oscillation() {
                    self.fine_low = low;
                    self.fine_high = high;
                    self.phase = SizerPhase::FineTune;
                    debug!(low, high, "oscillation detected, entering fine-tune");
                    return (low + high) / 2;
                }

                if within {
                    match self.max_safe {
                        Some(safe) => {
                            let headroom = headroom_fraction(elapsed, target);
                            let grown = if headroom > 0.10 {
                                safe + safe / 5
                            } else {
                                safe + safe / 20
                            };
                            grown.max(safe + 1).min(self.config.max_population_size)
                        }
                        None => size,
                    }
                } else {
                    self.max_safe.unwrap_or(self.config.min_population_size)
                }
            }

            SizerPhase::FineTune => {
                if within {
                    self.record_safe(size);
                    self.fine_low = size;
                } else {
                    self.fine_high = size;
                }
                if self.fine_high.saturating_sub(self.fine_low) <= 1 {
                    self.phase = SizerPhase::Locked;
                    let locked = self.max_safe.unwrap_or(self.fine_low);
                    debug!(locked, "fine-tune converged, locking size");
                    locked
                } else {
                    (self.fine_low + self.fine_high) / 2
                }
            }

            SizerPhase::Locked => {
                if !within {
                    self.max_safe.unwrap_or(self.config.min_population_size)
                } else if headroom_fraction(elapsed, target) > 0.15 {
                    (size + size / 10)
                        .max(size + 1)
                        .min(self.config.max_population_size)
                } else {
                    size
                }
            }
        }
    }

    fn record_safe(&mut self, size: usize) {
        if self.max_safe.map_or(true, |safe| size > safe) {
            self.max_safe = Some(size);
        }
    }

    /// Alternation between exactly two sizes over the recent window
    fn detect_oscillation(&self) -> Option<(usize, usize)> {
        if self.oscillation.len() < OSCILLATION_WINDOW {
            return None;
        }
        let recent: Vec<usize> = self
            .oscillation
            .iter()
            .rev()
            .take(OSCILLATION_WINDOW)
            .copied()
            .collect();
        let mut values: Vec<usize> = recent.clone();
        values.sort_unstable();
        values.dedup();
        if values.len() == 2 {
            let low_count = recent.iter().filter(|&&v| v == values[0]).count();
            let high_count = recent.iter().filter(|&&v| v == values[1]).count();
            if low_count >= 2 && high_count >= 2 {
                return Some((values[0], values[1]));
            }
        }
        None
    }
}

fn headroom_fraction(elapsed: Duration, target: Duration) -> f64 {
    (target.as_secs_f64() - elapsed.as_secs_f64()) / target.as_secs_f64()
}

//! Tick clock for the frame loop.
//!
//! `draw_web()` runs at display rate with a variable delta. [`GameTime`]
//! turns wall-clock timestamps into whole game ticks, and [`Interval`]
//! schedules the periodic jobs (autosave, market, minigame) on that tick count.

/// Largest frame delta fed into the accumulator, so a backgrounded tab
/// does not resume with a burst of ticks.
const MAX_FRAME_DELTA_MS: f64 = 500.0;

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds not yet consumed as ticks.
    accumulator: f64,
    pub total_ticks: u64,
    /// `None` until the first frame.
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a `performance.now()` timestamp; returns the ticks due this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = self
            .last_timestamp
            .map_or(0.0, |prev| (now_ms - prev).clamp(0.0, MAX_FRAME_DELTA_MS));
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

/// Periodic trigger on the tick clock.
///
/// Fires at `first`, then every `period` ticks. Missed periods collapse into
/// a single firing.
#[derive(Clone, Debug)]
pub struct Interval {
    period: u64,
    next_at: u64,
}

impl Interval {
    pub fn every(period: u64) -> Self {
        Self::starting_at(period, period)
    }

    pub fn starting_at(first: u64, period: u64) -> Self {
        Self {
            period: period.max(1),
            next_at: first,
        }
    }

    /// Whether the interval fired at or before `now_ticks`.
    pub fn due(&mut self, now_ticks: u64) -> bool {
        if now_ticks < self.next_at {
            return false;
        }
        while self.next_at <= now_ticks {
            self.next_at += self.period;
        }
        true
    }
}

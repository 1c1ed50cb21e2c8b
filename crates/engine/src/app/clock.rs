use std::time::Duration;

pub const DEFAULT_RATE_HZ: u32 = 60;

/// Work the loop owes for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationPlan {
    pub updates: u32,
    pub render: bool,
}

/// Dual-accumulator fixed-step clock: logic catches up fully, rendering runs at most once
/// per iteration.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    update_tick: Duration,
    render_tick: Duration,
    max_frame_delta: Duration,
    update_acc: Duration,
    render_acc: Duration,
}

impl FixedStepClock {
    /// Zero rates fall back to [`DEFAULT_RATE_HZ`].
    pub fn new(update_rate_hz: u32, render_rate_hz: u32, max_frame_delta: Duration) -> Self {
        Self {
            update_tick: tick_duration(update_rate_hz),
            render_tick: tick_duration(render_rate_hz),
            max_frame_delta: normalize_non_zero_duration(
                max_frame_delta,
                Duration::from_millis(250),
            ),
            update_acc: Duration::ZERO,
            render_acc: Duration::ZERO,
        }
    }

    pub fn update_tick(&self) -> Duration {
        self.update_tick
    }

    pub fn render_tick(&self) -> Duration {
        self.render_tick
    }

    pub fn advance(&mut self, elapsed: Duration) -> IterationPlan {
        let elapsed = clamp_frame_delta(elapsed, self.max_frame_delta);
        self.update_acc = self.update_acc.saturating_add(elapsed);
        self.render_acc = self.render_acc.saturating_add(elapsed);

        let mut updates = 0u32;
        while self.update_acc >= self.update_tick {
            self.update_acc -= self.update_tick;
            updates = updates.saturating_add(1);
        }

        let render = self.render_acc >= self.render_tick;
        if render {
            self.render_acc -= self.render_tick;
        }

        IterationPlan { updates, render }
    }

    /// Time left until the next render is due.
    pub fn remaining_render_budget(&self) -> Duration {
        self.render_tick.saturating_sub(self.render_acc)
    }
}

fn tick_duration(rate_hz: u32) -> Duration {
    let rate_hz = if rate_hz == 0 { DEFAULT_RATE_HZ } else { rate_hz };
    Duration::from_secs(1) / rate_hz
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_DELTA: Duration = Duration::from_millis(250);

    #[test]
    fn catch_up_runs_several_updates_in_one_iteration() {
        let mut clock = FixedStepClock::new(100, 100, MAX_DELTA);
        let plan = clock.advance(Duration::from_millis(35));
        assert_eq!(plan.updates, 3);
        assert!(plan.render);
    }

    #[test]
    fn at_most_one_render_per_iteration() {
        let mut clock = FixedStepClock::new(100, 100, MAX_DELTA);
        let plan = clock.advance(Duration::from_millis(50));
        assert_eq!(plan.updates, 5);
        assert!(plan.render);

        // Render backlog drains one frame per iteration.
        let next = clock.advance(Duration::ZERO);
        assert_eq!(next.updates, 0);
        assert!(next.render);
    }

    #[test]
    fn fractional_time_carries_over() {
        let mut clock = FixedStepClock::new(100, 50, MAX_DELTA);
        let first = clock.advance(Duration::from_millis(6));
        assert_eq!(first, IterationPlan { updates: 0, render: false });
        let second = clock.advance(Duration::from_millis(6));
        assert_eq!(second, IterationPlan { updates: 1, render: false });
        let third = clock.advance(Duration::from_millis(10));
        assert_eq!(third, IterationPlan { updates: 1, render: true });
    }

    #[test]
    fn elapsed_is_clamped_after_a_stall() {
        let mut clock = FixedStepClock::new(100, 100, MAX_DELTA);
        let plan = clock.advance(Duration::from_secs(5));
        assert_eq!(plan.updates, 25);
    }

    #[test]
    fn update_and_render_rates_are_independent() {
        let mut clock = FixedStepClock::new(120, 30, MAX_DELTA);
        let plan = clock.advance(Duration::from_millis(40));
        assert_eq!(plan.updates, 4);
        assert!(plan.render);
        assert_eq!(clock.render_tick(), Duration::from_secs(1) / 30);
    }

    #[test]
    fn zero_rate_falls_back_to_default() {
        let clock = FixedStepClock::new(0, 0, Duration::ZERO);
        assert_eq!(clock.update_tick(), Duration::from_secs(1) / DEFAULT_RATE_HZ);
        assert_eq!(clock.render_tick(), Duration::from_secs(1) / DEFAULT_RATE_HZ);
    }

    #[test]
    fn remaining_budget_shrinks_with_accumulated_time() {
        let mut clock = FixedStepClock::new(100, 50, MAX_DELTA);
        assert_eq!(clock.remaining_render_budget(), Duration::from_millis(20));
        clock.advance(Duration::from_millis(15));
        assert_eq!(clock.remaining_render_budget(), Duration::from_millis(5));
    }
}

/// Fixed-timestep lag accumulator.
///
/// Elapsed wall time is added by [`advance`](Self::advance); [`drain`](Self::drain)
/// consumes it in whole frame budgets. After a successful drain the lag is
/// always below one budget and the remainder carries into the next iteration.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    budget_ms: u64,
    max_catch_up: Option<u32>,
    previous_ms: u64,
    lag_ms: u64,
}

impl FixedTimestep {
    pub fn new(budget_ms: u64) -> Self {
        debug_assert!(budget_ms > 0, "frame budget must be positive");
        Self {
            budget_ms: budget_ms.max(1),
            max_catch_up: None,
            previous_ms: 0,
            lag_ms: 0,
        }
    }

    /// Caps how many budgets may be pending after a single `advance`.
    ///
    /// Lag beyond the cap is discarded (the sub-budget remainder is kept).
    /// A cap of zero is raised to one so the simulation keeps moving.
    pub fn with_catch_up_limit(mut self, max_updates: Option<u32>) -> Self {
        self.max_catch_up = max_updates.map(|max| max.max(1));
        self
    }

    pub fn budget_ms(&self) -> u64 {
        self.budget_ms
    }

    pub fn lag_ms(&self) -> u64 {
        self.lag_ms
    }

    /// Number of updates the next `drain` will run.
    pub fn pending_updates(&self) -> u64 {
        self.lag_ms / self.budget_ms
    }

    /// Resets the baseline; lag starts at zero.
    pub fn start(&mut self, now_ms: u64) {
        self.previous_ms = now_ms;
        self.lag_ms = 0;
    }

    /// Accumulates time since the previous sample and returns it.
    pub fn advance(&mut self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.previous_ms);
        self.previous_ms = now_ms;
        self.lag_ms = self.lag_ms.saturating_add(elapsed);

        if let Some(max) = self.max_catch_up {
            let cap = self.budget_ms.saturating_mul(u64::from(max));
            if self.lag_ms > cap + self.budget_ms - 1 {
                let kept = cap + self.lag_ms % self.budget_ms;
                log::warn!(
                    "dropping {} ms of simulation time after a stall",
                    self.lag_ms - kept
                );
                self.lag_ms = kept;
            }
        }

        elapsed
    }

    /// Runs `update` once per whole budget of accumulated lag.
    ///
    /// Lag is only decremented after `update` returns `Ok`; the first error
    /// stops the drain and is returned. Returns the number of updates run.
    pub fn drain<E>(&mut self, mut update: impl FnMut(u64) -> Result<(), E>) -> Result<u64, E> {
        let mut ran = 0;
        while self.lag_ms >= self.budget_ms {
            update(self.budget_ms)?;
            self.lag_ms -= self.budget_ms;
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_count(ts: &mut FixedTimestep) -> u64 {
        ts.drain(|_| Ok::<(), ()>(())).unwrap()
    }

    // ── accumulation ──────────────────────────────────────────────────────

    #[test]
    fn ten_ms_samples_against_sixteen_ms_budget() {
        let mut ts = FixedTimestep::new(16);
        ts.start(0);

        ts.advance(10);
        assert_eq!(drain_count(&mut ts), 0);
        assert_eq!(ts.lag_ms(), 10);

        ts.advance(20);
        assert_eq!(drain_count(&mut ts), 1);
        assert_eq!(ts.lag_ms(), 4);

        ts.advance(30);
        assert_eq!(drain_count(&mut ts), 0);
        assert_eq!(ts.lag_ms(), 14);
    }

    #[test]
    fn total_updates_match_floor_of_elapsed() {
        let samples = [3u64, 17, 0, 45, 16, 15, 1, 250, 9, 33, 64, 2];
        let mut ts = FixedTimestep::new(16);
        ts.start(1_000);

        let mut now = 1_000;
        let mut updates = 0;
        for dt in samples {
            now += dt;
            ts.advance(now);
            updates += drain_count(&mut ts);
            assert!(ts.lag_ms() < 16);
        }

        let total: u64 = samples.iter().sum();
        assert_eq!(updates, total / 16);
        assert_eq!(ts.lag_ms(), total % 16);
    }

    #[test]
    fn clock_going_backwards_adds_nothing() {
        let mut ts = FixedTimestep::new(16);
        ts.start(100);
        assert_eq!(ts.advance(90), 0);
        assert_eq!(ts.lag_ms(), 0);
    }

    // ── draining ──────────────────────────────────────────────────────────

    #[test]
    fn long_stall_bursts_without_a_cap() {
        let mut ts = FixedTimestep::new(16);
        ts.start(0);
        ts.advance(1_000);
        assert_eq!(ts.pending_updates(), 62);
        assert_eq!(drain_count(&mut ts), 62);
        assert_eq!(ts.lag_ms(), 8);
    }

    #[test]
    fn catch_up_cap_discards_excess_but_keeps_remainder() {
        let mut ts = FixedTimestep::new(16).with_catch_up_limit(Some(5));
        ts.start(0);
        ts.advance(1_000);
        assert_eq!(drain_count(&mut ts), 5);
        assert_eq!(ts.lag_ms(), 8);
    }

    #[test]
    fn zero_cap_still_advances_one_update_per_budget() {
        let mut ts = FixedTimestep::new(16).with_catch_up_limit(Some(0));
        ts.start(0);

        let mut updates = 0;
        for i in 1..=100 {
            ts.advance(i * 16);
            updates += drain_count(&mut ts);
        }
        assert_eq!(updates, 100);

        ts.advance(100 * 16 + 1_000);
        assert_eq!(drain_count(&mut ts), 1);
    }

    #[test]
    fn failed_update_keeps_its_budget() {
        let mut ts = FixedTimestep::new(16);
        ts.start(0);
        ts.advance(40);

        let mut calls = 0;
        let result = ts.drain(|_| {
            calls += 1;
            if calls == 2 { Err("boom") } else { Ok(()) }
        });

        assert_eq!(result, Err("boom"));
        assert_eq!(ts.lag_ms(), 24);
    }

    #[test]
    fn update_receives_the_budget() {
        let mut ts = FixedTimestep::new(16);
        ts.start(0);
        ts.advance(48);
        let mut deltas = Vec::new();
        ts.drain(|dt| {
            deltas.push(dt);
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(deltas, vec![16, 16, 16]);
    }
}

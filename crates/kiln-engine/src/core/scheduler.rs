use crate::config::HostConfig;
use crate::display::Display;
use crate::error::HostError;
use crate::input::{EventSource, InputTranslator, Translation};
use crate::script::GameScript;
use crate::time::{Clock, FixedTimestep};

/// Lifecycle of the outer loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SchedulerState {
    Idle,
    Running,
    Terminated,
}

/// Counters accumulated over a run.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Outer iterations started, including the one that terminated.
    pub iterations: u64,
    pub updates: u64,
    pub draws: u64,
    pub presents: u64,
}

/// Drives the fixed-timestep loop: input, updates, one draw, present.
#[derive(Debug)]
pub struct FrameScheduler {
    timestep: FixedTimestep,
    state: SchedulerState,
    stats: RunStats,
}

impl FrameScheduler {
    pub fn new(config: &HostConfig) -> Self {
        let timestep = FixedTimestep::new(config.frame_budget_ms())
            .with_catch_up_limit(config.max_catch_up_updates);
        Self::with_timestep(timestep)
    }

    pub fn with_timestep(timestep: FixedTimestep) -> Self {
        Self {
            timestep,
            state: SchedulerState::Idle,
            stats: RunStats::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn lag_ms(&self) -> u64 {
        self.timestep.lag_ms()
    }

    pub fn budget_ms(&self) -> u64 {
        self.timestep.budget_ms()
    }

    /// Takes the baseline time sample. Only has an effect while idle.
    pub fn start<C: Clock + ?Sized>(&mut self, clock: &mut C) {
        if self.state == SchedulerState::Idle {
            self.timestep.start(clock.now_ms());
            self.state = SchedulerState::Running;
            log::debug!("frame scheduler running, budget {} ms", self.timestep.budget_ms());
        }
    }

    /// Performs one outer iteration.
    ///
    /// An idle scheduler is started first. Once terminated, further calls do
    /// nothing. Any error terminates the scheduler before it is returned, and
    /// no later step of that iteration runs.
    pub fn step<C, S, G, D>(
        &mut self,
        clock: &mut C,
        events: &mut S,
        translator: &mut InputTranslator,
        script: &mut G,
        display: &mut D,
    ) -> Result<SchedulerState, HostError>
    where
        C: Clock + ?Sized,
        S: EventSource + ?Sized,
        G: GameScript + ?Sized,
        D: Display + ?Sized,
    {
        match self.state {
            SchedulerState::Terminated => return Ok(self.state),
            SchedulerState::Idle => self.start(clock),
            SchedulerState::Running => {}
        }

        let result = self.iterate(clock, events, translator, script, display);
        if result.is_err() {
            self.state = SchedulerState::Terminated;
        }
        result.map(|()| self.state)
    }

    fn iterate<C, S, G, D>(
        &mut self,
        clock: &mut C,
        events: &mut S,
        translator: &mut InputTranslator,
        script: &mut G,
        display: &mut D,
    ) -> Result<(), HostError>
    where
        C: Clock + ?Sized,
        S: EventSource + ?Sized,
        G: GameScript + ?Sized,
        D: Display + ?Sized,
    {
        self.stats.iterations += 1;
        self.timestep.advance(clock.now_ms());

        if translator.drain(events) == Translation::Terminate {
            log::info!("termination requested");
            self.state = SchedulerState::Terminated;
            return Ok(());
        }

        let stats = &mut self.stats;
        self.timestep.drain(|budget_ms| {
            script.update(budget_ms as f64)?;
            stats.updates += 1;
            Ok::<(), HostError>(())
        })?;

        script.draw(display.pixels_mut())?;
        self.stats.draws += 1;

        display.present()?;
        self.stats.presents += 1;

        Ok(())
    }

    /// Steps until terminated and returns the run's counters.
    pub fn run<C, S, G, D>(
        &mut self,
        clock: &mut C,
        events: &mut S,
        translator: &mut InputTranslator,
        script: &mut G,
        display: &mut D,
    ) -> Result<RunStats, HostError>
    where
        C: Clock + ?Sized,
        S: EventSource + ?Sized,
        G: GameScript + ?Sized,
        D: Display + ?Sized,
    {
        self.start(clock);
        while self.step(clock, events, translator, script, display)? == SchedulerState::Running {}

        let stats = self.stats;
        log::info!(
            "loop finished after {} iterations ({} updates, {} draws, {} presents)",
            stats.iterations,
            stats.updates,
            stats.draws,
            stats.presents
        );
        Ok(stats)
    }
}

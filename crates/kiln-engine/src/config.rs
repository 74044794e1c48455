//! Host configuration.
//!
//! Plain data with sensible defaults. The defaults describe the classic
//! 320×240 surface shown at 2× and stepped at 60 updates per second.

/// Logical game surface width in pixels.
pub const GAME_WIDTH: u32 = 320;

/// Logical game surface height in pixels.
pub const GAME_HEIGHT: u32 = 240;

/// Output surface scale relative to the logical surface.
pub const OUTPUT_SCALE: u32 = 2;

/// Fixed simulation rate.
pub const UPDATES_PER_SECOND: u32 = 60;

/// What the presentation sink does when a frame cannot be shown.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PresentFailurePolicy {
    /// Drop the frame, log it and keep running. Out-of-memory still escalates.
    #[default]
    LogAndContinue,
    /// Any surface failure that a reconfigure cannot fix ends the run.
    Fatal,
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub title: String,

    pub game_width: u32,
    pub game_height: u32,

    /// Integer scale from the logical surface to the window.
    pub scale: u32,

    pub updates_per_second: u32,

    /// Upper bound on catch-up updates after a stall.
    ///
    /// `None` keeps every accumulated frame budget, so a long stall is followed
    /// by a burst of updates. `Some(n)` discards lag beyond `n` budgets.
    pub max_catch_up_updates: Option<u32>,

    pub present_failure: PresentFailurePolicy,

    /// Module name the entry script is registered under.
    pub module: String,

    /// Name of the game class inside `module`.
    pub class: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            game_width: GAME_WIDTH,
            game_height: GAME_HEIGHT,
            scale: OUTPUT_SCALE,
            updates_per_second: UPDATES_PER_SECOND,
            max_catch_up_updates: None,
            present_failure: PresentFailurePolicy::default(),
            module: "main".to_string(),
            class: "Game".to_string(),
        }
    }
}

impl HostConfig {
    /// Duration of one update step in whole milliseconds.
    ///
    /// Integer division is kept on purpose: 60 Hz yields 16 ms, not 16.67 ms.
    pub fn frame_budget_ms(&self) -> u64 {
        1000 / u64::from(self.updates_per_second.max(1))
    }

    /// Output surface size as `(width, height)`.
    pub fn output_size(&self) -> (u32, u32) {
        let scale = self.scale.max(1);
        (self.game_width * scale, self.game_height * scale)
    }
}

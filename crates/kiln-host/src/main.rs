use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kiln_engine::core::{FrameScheduler, RunStats};
use kiln_engine::device::GpuInit;
use kiln_engine::display::{Display, EngineContext};
use kiln_engine::error::{DisplayInitError, ScriptError};
use kiln_engine::input::{EventSource, InputTranslator, SharedKeyStates};
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::script::{GameScript, ScriptHost};
use kiln_engine::time::MonotonicClock;
use kiln_engine::window::Platform;
use kiln_engine::{HostConfig, HostError};

const USAGE: &str = "Usage: kiln [entry path]";

fn main() -> ExitCode {
    let Some(path) = entry_path(std::env::args_os()) else {
        eprintln!("No entry path was provided.");
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    init_logging(LoggingConfig::default());

    ExitCode::from(exit_status(run(&path, &HostConfig::default())))
}

/// The entry script path, when exactly one argument follows the program name.
fn entry_path(args: impl IntoIterator<Item = OsString>) -> Option<PathBuf> {
    let mut args = args.into_iter().skip(1);
    let path = args.next()?;
    match args.next() {
        Some(_) => None,
        None => Some(PathBuf::from(path)),
    }
}

/// Zero on a clean exit; otherwise logs the failure category and returns one.
fn exit_status(result: Result<RunStats, HostError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            log::error!("{} error: {err}", err.category());
            1
        }
    }
}

fn run(path: &Path, config: &HostConfig) -> Result<RunStats, HostError> {
    let source = std::fs::read_to_string(path).map_err(|source| HostError::ReadScript {
        path: path.to_owned(),
        source,
    })?;

    run_with(
        Platform::new()?,
        config,
        |platform, config| EngineContext::create(platform, config, GpuInit::default()),
        |keys| open_script(keys, config, &source),
    )
}

/// Opens a session, runs `source` and resolves the game class.
fn open_script(keys: SharedKeyStates, config: &HostConfig, source: &str) -> Result<ScriptHost, ScriptError> {
    let mut script = ScriptHost::new(keys)?;
    script.load_and_run(&config.module, source)?;
    script.resolve_entry_points(&config.module, &config.class)?;
    Ok(script)
}

/// Acquires the display and the script in order, then runs the loop.
///
/// Whatever was acquired is dropped in reverse on every exit path: the
/// script (handles, then interpreter), the display, then `events`.
fn run_with<S, D, G>(
    mut events: S,
    config: &HostConfig,
    open_display: impl FnOnce(&mut S, &HostConfig) -> Result<D, DisplayInitError>,
    open_script: impl FnOnce(SharedKeyStates) -> Result<G, ScriptError>,
) -> Result<RunStats, HostError>
where
    S: EventSource,
    D: Display,
    G: GameScript,
{
    let mut display = open_display(&mut events, config)?;

    let keys = SharedKeyStates::new();
    let mut script = open_script(keys.clone())?;
    script.init()?;

    let mut translator = InputTranslator::new(keys);
    let mut clock = MonotonicClock::new();
    let mut scheduler = FrameScheduler::new(config);

    let stats = scheduler.run(&mut clock, &mut events, &mut translator, &mut script, &mut display)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kiln_engine::display::PixelBuffer;
    use kiln_engine::error::{ErrorCategory, PresentError};
    use kiln_engine::input::InputEvent;

    use super::*;

    type Trail = Rc<RefCell<Vec<String>>>;

    fn record(trail: &Trail, entry: impl Into<String>) {
        trail.borrow_mut().push(entry.into());
    }

    /// Quits on the given poll; records its own drop.
    struct Events {
        polls: usize,
        quit_at: usize,
        trail: Trail,
    }

    impl EventSource for Events {
        fn poll_events(&mut self, out: &mut Vec<InputEvent>) {
            self.polls += 1;
            if self.polls >= self.quit_at {
                out.push(InputEvent::Quit);
            }
        }
    }

    impl Drop for Events {
        fn drop(&mut self) {
            record(&self.trail, "events");
        }
    }

    struct Screen {
        pixels: PixelBuffer,
        trail: Trail,
    }

    impl Display for Screen {
        fn pixels_mut(&mut self) -> &mut PixelBuffer {
            &mut self.pixels
        }

        fn present(&mut self) -> Result<(), PresentError> {
            Ok(())
        }
    }

    impl Drop for Screen {
        fn drop(&mut self) {
            record(&self.trail, "display");
        }
    }

    /// Drop-time marker placed after the host so it fires once the
    /// interpreter is gone.
    struct Marker(&'static str, Trail);

    impl Drop for Marker {
        fn drop(&mut self) {
            record(&self.1, self.0);
        }
    }

    /// A real script host that records teardown. Fields drop in order.
    struct Traced {
        host: ScriptHost,
        closed: Marker,
    }

    impl GameScript for Traced {
        fn init(&mut self) -> Result<(), ScriptError> {
            self.host.init()
        }

        fn update(&mut self, delta_ms: f64) -> Result<(), ScriptError> {
            self.host.update(delta_ms)
        }

        fn draw(&mut self, canvas: &mut PixelBuffer) -> Result<(), ScriptError> {
            self.host.draw(canvas)
        }
    }

    impl Drop for Traced {
        fn drop(&mut self) {
            record(&self.closed.1, format!("handles:{}", self.host.handles().held()));
        }
    }

    const GAME: &str = r#"
        Game = {}
        function Game:init() end
        function Game:update(dt) end
        function Game:draw() Canvas:pset(0, 0, 0xFFFFFFFF) end
    "#;

    fn launch(source: &str, quit_at: usize, display_fails: bool) -> (Result<RunStats, HostError>, Vec<String>) {
        let trail = Trail::default();
        let config = HostConfig::default();
        let events = Events {
            polls: 0,
            quit_at,
            trail: trail.clone(),
        };

        let result = run_with(
            events,
            &config,
            |_, config| {
                if display_fails {
                    return Err(DisplayInitError::from(anyhow::anyhow!("no adapter")));
                }
                Ok(Screen {
                    pixels: PixelBuffer::new(config.game_width, config.game_height),
                    trail: trail.clone(),
                })
            },
            |keys| {
                let host = open_script(keys, &config, source)?;
                Ok(Traced {
                    host,
                    closed: Marker("interpreter", trail.clone()),
                })
            },
        );

        let entries = trail.borrow().clone();
        (result, entries)
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    // ── arguments ─────────────────────────────────────────────────────────

    #[test]
    fn single_argument_is_the_entry_path() {
        assert_eq!(entry_path(os(&["kiln", "game.lua"])), Some(PathBuf::from("game.lua")));
    }

    #[test]
    fn missing_argument_is_rejected() {
        assert_eq!(entry_path(os(&["kiln"])), None);
        assert_eq!(entry_path(os(&[])), None);
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert_eq!(entry_path(os(&["kiln", "game.lua", "--fast"])), None);
    }

    // ── exit status ───────────────────────────────────────────────────────

    #[test]
    fn clean_quit_exits_zero_and_releases_in_reverse() {
        let (result, trail) = launch(GAME, 3, false);
        let stats = result.unwrap();

        assert_eq!(stats.draws, 2);
        assert_eq!(trail, vec!["handles:4", "interpreter", "display", "events"]);
        assert_eq!(exit_status(Ok(stats)), 0);
    }

    #[test]
    fn unreadable_script_is_a_startup_failure() {
        let err = run(Path::new("/nonexistent/kiln/main.lua"), &HostConfig::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Startup);
        assert_eq!(exit_status(Err(err)), 1);
    }

    // ── cleanup on failure ────────────────────────────────────────────────

    #[test]
    fn display_failure_releases_only_the_event_source() {
        let (result, trail) = launch(GAME, 1, true);
        let err = result.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Startup);
        assert_eq!(trail, vec!["events"]);
        assert_eq!(exit_status(Err(err)), 1);
    }

    #[test]
    fn missing_drawer_fails_load_and_releases_display_once() {
        let source = "Game = {} function Game:init() end function Game:update(dt) end";
        let (result, trail) = launch(source, 1, false);
        let err = result.unwrap_err();

        assert!(matches!(err, HostError::Script(ScriptError::EntryPointMissing { .. })));
        assert_eq!(err.category(), ErrorCategory::Load);
        assert_eq!(trail, vec!["display", "events"]);
        assert_eq!(exit_status(Err(err)), 1);
    }

    #[test]
    fn syntax_error_fails_load() {
        let (result, trail) = launch("Game = {", 1, false);
        assert_eq!(result.unwrap_err().category(), ErrorCategory::Load);
        assert_eq!(trail, vec!["display", "events"]);
    }

    #[test]
    fn init_failure_is_a_runtime_failure() {
        let source = r#"
            Game = {}
            function Game:init() error("no assets") end
            function Game:update(dt) end
            function Game:draw() end
        "#;
        let (result, trail) = launch(source, 1, false);

        assert_eq!(result.unwrap_err().category(), ErrorCategory::Runtime);
        assert_eq!(trail, vec!["handles:4", "interpreter", "display", "events"]);
    }

    #[test]
    fn draw_failure_releases_handles_then_interpreter_then_display() {
        let source = r#"
            Game = {}
            function Game:init() end
            function Game:update(dt) end
            function Game:draw() error("bad frame") end
        "#;
        let (result, trail) = launch(source, 100, false);
        let err = result.unwrap_err();

        assert!(matches!(err, HostError::Script(ScriptError::Runtime { call: "draw()", .. })));
        assert_eq!(err.category(), ErrorCategory::Runtime);
        assert_eq!(trail, vec!["handles:4", "interpreter", "display", "events"]);
        assert_eq!(exit_status(Err(err)), 1);
    }
}

/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod scene;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use log::{error, info};

use config::GameConfig;
use error::GameResult;
use sim::session::Session;
use ui::gamepad::GamepadState;
use ui::input::{Action, InputState};
use ui::renderer::TerminalSurface;
use ui::sound::{Cue, SoundEngine};

const LOG_FILE: &str = "cavebrave.log";

fn main() {
    init_logging();
    let config = GameConfig::load();

    let grid = match config.grid() {
        Ok(grid) => grid,
        Err(e) => {
            error!("bad map: {e}");
            eprintln!("Map error: {e}");
            std::process::exit(1);
        }
    };

    let surface = TerminalSurface::new(
        &config.assets,
        config.display.tile_length,
        grid.rows(),
        grid.cols(),
    );
    let mut session = Session::new(surface, grid, config.session_settings());

    // Validate map and assets before touching the terminal.
    if let Err(e) = session.start() {
        error!("start failed: {e}");
        eprintln!("Cave Brave cannot start: {e}");
        std::process::exit(1);
    }

    if let Err(e) = session.surface_mut().init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, sound.as_ref(), &config);

    if let Err(e) = session.surface_mut().cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    println!("Thanks for playing Cave Brave!");
}

/// Log to a file in the temp dir; the terminal is in raw mode while playing.
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let path = std::env::temp_dir().join(LOG_FILE);
    match File::create(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("Warning: cannot open {}: {e}", path.display()),
    }
    builder.init();
}

fn game_loop(
    session: &mut Session<TerminalSurface>,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> GameResult<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = config.tick_rate();
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_requested() || gp.cancel_pressed() {
            info!("quit");
            break;
        }

        let mut actions: Vec<Action> = kb.actions().to_vec();
        if gp.confirm_pressed() {
            actions.push(Action::Trigger);
        }
        actions.extend(gp.directions_pressed().map(Action::Move));

        for action in actions {
            match action {
                Action::Trigger => session.trigger()?,
                Action::Move(dir) => {
                    if let Some(outcome) = session.handle_direction(dir)? {
                        if let Some(sfx) = sound {
                            sfx.play(Cue::for_outcome(outcome));
                        }
                    }
                }
                Action::Quit => {}
            }
        }

        let now = Instant::now();
        session.surface_mut().advance(now - last_frame);
        last_frame = now;
        session.poll();

        session.surface_mut().render()?;
        std::thread::sleep(frame_sleep(tick_rate, last_frame.elapsed()));
    }

    Ok(())
}

fn frame_sleep(tick_rate: Duration, spent: Duration) -> Duration {
    tick_rate.saturating_sub(spent)
}

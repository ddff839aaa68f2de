/// Game session: the Menu → Playing → Finished state machine.
///
/// ## Input admission
///   A direction is processed only while `Playing`, input is armed and no
///   relocation is in flight. Everything else is dropped, never queued.
///   Relocations disarm input; `poll()` re-arms it once the surface reports
///   the tween complete and the token has been placed on its final cell.
///
/// ## Ownership
///   The session owns the grid, the per-cell visuals, the caveman token,
///   the player and the asset cache. The cache outlives restarts; every
///   other piece of mutable state is rebuilt when play begins.

use log::{debug, info, warn};

use super::resolver::{resolve, MoveTiming, Outcome};
use crate::domain::grid::Grid;
use crate::domain::player::{Direction, Player};
use crate::error::GameResult;
use crate::scene::cache::RenderCache;
use crate::scene::cells::CellObjects;
use crate::scene::surface::{Completion, RenderSurface};
use crate::scene::visual::{AssetId, TextColor, Transform, VisualObject};

pub const MENU_PROMPT: &str = "CLICK OR PRESS ENTER TO ENTER THE CAVE";
pub const VICTORY_BANNER: &str = "CAVEMAN FOUND THE WHEEL!";
pub const DEFEAT_BANNER: &str = "R.I.P CAVEMAN";
pub const RESTART_HINT: &str = "Click or press ENTER to start a new game";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Ending {
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSettings {
    /// Edge length of one cell, in scene units.
    pub tile_length: f32,
    pub timing: MoveTiming,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            tile_length: 100.0,
            timing: MoveTiming::default(),
        }
    }
}

/// Everything that exists only while a game is on.
#[derive(Debug)]
struct Board<V> {
    cells: CellObjects<V>,
    token: VisualObject<V>,
    player: Player,
}

pub struct Session<R: RenderSurface> {
    surface: R,
    grid: Grid,
    settings: SessionSettings,
    phase: Phase,
    cache: Option<RenderCache<R::Visual>>,
    menu: Vec<VisualObject<R::Visual>>,
    board: Option<Board<R::Visual>>,
    in_flight: Option<Completion>,
    accepting_input: bool,
    ending: Option<Ending>,
}

impl<R: RenderSurface> Session<R> {
    pub fn new(surface: R, grid: Grid, settings: SessionSettings) -> Self {
        Session {
            surface,
            grid,
            settings,
            phase: Phase::Menu,
            cache: None,
            menu: Vec::new(),
            board: None,
            in_flight: None,
            accepting_input: false,
            ending: None,
        }
    }

    // ── Host entry points ──

    /// Validate the map, load assets and show the menu.
    pub fn start(&mut self) -> GameResult<()> {
        self.grid.find_init()?;
        self.enter_menu()
    }

    /// Start/restart trigger: Menu → Playing, Finished → Menu.
    pub fn trigger(&mut self) -> GameResult<()> {
        match self.phase {
            Phase::Menu => self.begin_play(),
            Phase::Finished => self.enter_menu(),
            Phase::Playing => {
                debug!("trigger ignored while playing");
                Ok(())
            }
        }
    }

    /// Try to move the caveman. Returns the outcome, or None when the
    /// request was not admitted.
    pub fn handle_direction(&mut self, dir: Direction) -> GameResult<Option<Outcome>> {
        if self.phase != Phase::Playing || !self.accepting_input {
            debug!("{dir:?} ignored: phase {:?}, input armed {}", self.phase, self.accepting_input);
            return Ok(None);
        }
        let Some(board) = self.board.as_mut() else {
            return Ok(None);
        };
        if board.player.is_on_move {
            debug!("{dir:?} ignored: move in flight");
            return Ok(None);
        }

        let from = board.player.pos();
        let r = resolve(&self.grid, from, board.player.start, dir, &self.settings.timing)?;
        debug!("{dir:?} from {from:?} -> {:?} at {:?}", r.outcome, r.target);

        if let Some(pos) = r.reveal {
            if board.cells.reveal(pos, &mut self.surface) {
                debug!("revealed {pos:?}, {} cells still fogged", board.cells.concealed());
            }
        }
        if let Some(advisory) = r.advisory {
            warn!("{}", advisory.text);
            self.surface
                .show_transient_text(advisory.text, advisory.duration, advisory.color);
        }

        match r.outcome {
            Outcome::Blocked => {}
            Outcome::Relocate | Outcome::Reset => {
                board.player.set_pos(r.destination);
                if let Some(motion) = r.motion {
                    let to = Transform::cell(motion.to.row, motion.to.col, self.settings.tile_length);
                    board.player.is_on_move = true;
                    self.accepting_input = false;
                    self.in_flight = Some(self.surface.animate(
                        &board.token,
                        (to.x, to.y),
                        motion.duration,
                        motion.ease,
                    ));
                }
            }
            Outcome::Defeat => self.finish(Ending::Defeat),
            Outcome::Victory => self.finish(Ending::Victory),
        }

        Ok(Some(r.outcome))
    }

    /// Settle a finished relocation. Returns true when one settled.
    pub fn poll(&mut self) -> bool {
        let Some(done) = &self.in_flight else {
            return false;
        };
        if !done.is_complete() {
            return false;
        }
        self.in_flight = None;

        if let Some(board) = self.board.as_mut() {
            let at = Transform::cell(board.player.row, board.player.col, self.settings.tile_length);
            self.surface.place(&mut board.token, at);
            board.player.is_on_move = false;
        }
        if self.phase == Phase::Playing {
            self.accepting_input = true;
        }
        true
    }

    // ── Queries ──

    #[allow(dead_code)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[allow(dead_code)]
    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    pub fn accepting_input(&self) -> bool {
        self.accepting_input
    }

    #[allow(dead_code)]
    pub fn player(&self) -> Option<&Player> {
        self.board.as_ref().map(|b| &b.player)
    }

    #[allow(dead_code)]
    pub fn cells(&self) -> Option<&CellObjects<R::Visual>> {
        self.board.as_ref().map(|b| &b.cells)
    }

    #[allow(dead_code)]
    pub fn token(&self) -> Option<&VisualObject<R::Visual>> {
        self.board.as_ref().map(|b| &b.token)
    }

    #[allow(dead_code)]
    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    // ── Transitions ──

    fn enter_menu(&mut self) -> GameResult<()> {
        let cache = Self::loaded(&mut self.cache, &mut self.surface)?;

        self.surface.clear();
        self.board = None;
        self.in_flight = None;
        self.accepting_input = false;
        self.ending = None;
        self.menu.clear();

        let at = Transform::cell(
            self.grid.rows() / 2,
            self.grid.cols() / 2,
            self.settings.tile_length,
        );
        for asset in [AssetId::Cave, AssetId::Caveman] {
            let mut visual = cache.get(&mut self.surface, asset)?;
            self.surface.place(&mut visual, at);
            self.surface.show(&visual);
            self.menu.push(visual);
        }
        self.surface.show_banner(MENU_PROMPT, TextColor::Yellow);

        self.phase = Phase::Menu;
        info!("menu");
        Ok(())
    }

    fn begin_play(&mut self) -> GameResult<()> {
        let start = self.grid.find_init()?;
        let tile_length = self.settings.tile_length;
        let cache = Self::loaded(&mut self.cache, &mut self.surface)?;

        self.surface.clear();
        self.menu.clear();

        let cells = CellObjects::build(&self.grid, cache, &mut self.surface, tile_length)?;
        let mut token = cache.get(&mut self.surface, AssetId::Caveman)?;
        debug!("board built from {} asset templates", cache.len());
        self.surface
            .place(&mut token, Transform::cell(start.row, start.col, tile_length));
        self.surface.show(&token);

        self.board = Some(Board {
            cells,
            token,
            player: Player::spawn(start),
        });
        self.in_flight = None;
        self.ending = None;
        self.phase = Phase::Playing;
        self.accepting_input = true;
        info!(
            "entered the cave at ({}, {}), {}x{} map",
            start.row,
            start.col,
            self.grid.rows(),
            self.grid.cols()
        );
        Ok(())
    }

    fn finish(&mut self, ending: Ending) {
        self.phase = Phase::Finished;
        self.accepting_input = false;
        self.ending = Some(ending);

        let (text, color) = match ending {
            Ending::Victory => (VICTORY_BANNER, TextColor::Lime),
            Ending::Defeat => (DEFEAT_BANNER, TextColor::Red),
        };
        info!("game over: {ending:?}");
        self.surface.show_banner(text, color);
        self.surface.show_banner(RESTART_HINT, TextColor::Yellow);
    }

    /// The asset cache, loading every asset on first use.
    fn loaded<'a>(
        cache: &'a mut Option<RenderCache<R::Visual>>,
        surface: &mut R,
    ) -> GameResult<&'a mut RenderCache<R::Visual>> {
        match cache {
            Some(loaded) => Ok(loaded),
            None => {
                let assets = surface.load_assets(&AssetId::ALL)?;
                info!("loaded {} assets", assets.len());
                Ok(cache.insert(RenderCache::new(assets)))
            }
        }
    }
}

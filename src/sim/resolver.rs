/// Move resolution: what happens when the caveman tries to step.
///
/// Pure function of (grid, position, entrance, direction). It never
/// mutates the player or touches the surface; the session applies the
/// returned `Resolution`.
///
/// | target tile      | outcome    | destination | tween            | advisory      |
/// |------------------|------------|-------------|------------------|---------------|
/// | off the grid     | `Blocked`  | unchanged   | none             | none          |
/// | `Wall`           | `Blocked`  | unchanged   | none             | wall, 1 s     |
/// | `Bats`           | `Reset`    | entrance    | bounce, 900 ms   | bats, 2 s     |
/// | `Dino`           | `Defeat`   | unchanged   | none             | none          |
/// | `Dest`           | `Victory`  | unchanged   | none             | none          |
/// | `Free` / `Init`  | `Relocate` | target      | linear, 350 ms   | none          |
///
/// Every on-grid target that is not the entrance gets its fog lifted.

use std::time::Duration;

use crate::domain::grid::{Grid, Pos};
use crate::domain::player::Direction;
use crate::domain::tile::Tile;
use crate::error::GameResult;
use crate::scene::ease::Ease;
use crate::scene::visual::TextColor;

pub const WALL_MESSAGE: &str = "Caveman cannot pass the wall!";
pub const BATS_MESSAGE: &str = "Bats scared him. He ran away to the cave entrance.";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Blocked,
    Reset,
    Defeat,
    Victory,
    Relocate,
}

impl Outcome {
    /// Does this outcome end the game?
    #[allow(dead_code)]
    pub fn is_final(self) -> bool {
        matches!(self, Outcome::Defeat | Outcome::Victory)
    }
}

/// Durations for tweens and advisory messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveTiming {
    pub step: Duration,
    pub scare: Duration,
    pub wall_notice: Duration,
    pub bats_notice: Duration,
}

impl Default for MoveTiming {
    fn default() -> Self {
        MoveTiming {
            step: Duration::from_millis(350),
            scare: Duration::from_millis(900),
            wall_notice: Duration::from_millis(1000),
            bats_notice: Duration::from_millis(2000),
        }
    }
}

/// Relocation tween of the caveman token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Motion {
    pub to: Pos,
    pub duration: Duration,
    pub ease: Ease,
}

/// Transient message accompanying an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advisory {
    pub text: &'static str,
    pub duration: Duration,
    pub color: TextColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Cell the move aimed at (the current cell when the step left the grid).
    pub target: Pos,
    /// Where the caveman stands once the move settles.
    pub destination: Pos,
    pub motion: Option<Motion>,
    pub advisory: Option<Advisory>,
    /// Cell whose fog should be lifted.
    pub reveal: Option<Pos>,
}

pub fn resolve(
    grid: &Grid,
    from: Pos,
    start: Pos,
    dir: Direction,
    timing: &MoveTiming,
) -> GameResult<Resolution> {
    // Edge of the map: silent no-op.
    let Some(target) = grid.neighbor(from, dir) else {
        return Ok(Resolution {
            outcome: Outcome::Blocked,
            target: from,
            destination: from,
            motion: None,
            advisory: None,
            reveal: None,
        });
    };

    let tile = grid.tile_at(target.row, target.col)?;
    let reveal = (tile != Tile::Init).then_some(target);

    let resolution = match tile {
        Tile::Wall => Resolution {
            outcome: Outcome::Blocked,
            target,
            destination: from,
            motion: None,
            advisory: Some(Advisory {
                text: WALL_MESSAGE,
                duration: timing.wall_notice,
                color: TextColor::Yellow,
            }),
            reveal,
        },
        Tile::Bats => Resolution {
            outcome: Outcome::Reset,
            target,
            destination: start,
            motion: Some(Motion {
                to: start,
                duration: timing.scare,
                ease: Ease::BounceInOut,
            }),
            advisory: Some(Advisory {
                text: BATS_MESSAGE,
                duration: timing.bats_notice,
                color: TextColor::Orange,
            }),
            reveal,
        },
        Tile::Dino | Tile::Dest => Resolution {
            outcome: if tile == Tile::Dest { Outcome::Victory } else { Outcome::Defeat },
            target,
            destination: from,
            motion: None,
            advisory: None,
            reveal,
        },
        Tile::Free | Tile::Init => Resolution {
            outcome: Outcome::Relocate,
            target,
            destination: target,
            motion: Some(Motion {
                to: target,
                duration: timing.step,
                ease: Ease::Linear,
            }),
            advisory: None,
            reveal,
        },
    };

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Pos = Pos::new(4, 0);

    fn cave() -> Grid {
        Grid::cave().unwrap()
    }

    fn go(grid: &Grid, from: Pos, dir: Direction) -> Resolution {
        resolve(grid, from, START, dir, &MoveTiming::default()).unwrap()
    }

    fn expected(tile: Tile) -> Outcome {
        match tile {
            Tile::Wall => Outcome::Blocked,
            Tile::Bats => Outcome::Reset,
            Tile::Dino => Outcome::Defeat,
            Tile::Dest => Outcome::Victory,
            Tile::Free | Tile::Init => Outcome::Relocate,
        }
    }

    #[test]
    fn every_interior_move_matches_the_target_tile() {
        let g = cave();
        for (from, tile) in g.cells() {
            if tile == Tile::Wall {
                continue;
            }
            for dir in Direction::ALL {
                let Some(target) = g.neighbor(from, dir) else { continue };
                let target_tile = g.tile_at(target.row, target.col).unwrap();
                let r = go(&g, from, dir);
                assert_eq!(r.outcome, expected(target_tile), "{from:?} {dir:?}");
                assert_eq!(r.target, target);
            }
        }
    }

    #[test]
    fn wall_blocks_with_advisory() {
        let g = cave();
        let r = go(&g, START, Direction::Up);
        assert_eq!(r.outcome, Outcome::Blocked);
        assert_eq!(r.destination, START);
        assert_eq!(r.motion, None);
        let advisory = r.advisory.unwrap();
        assert_eq!(advisory.text, WALL_MESSAGE);
        assert_eq!(advisory.duration, Duration::from_millis(1000));
        assert_eq!(advisory.color, TextColor::Yellow);
        assert_eq!(r.reveal, Some(Pos::new(3, 0)));
    }

    #[test]
    fn blocking_is_idempotent() {
        let g = cave();
        let first = go(&g, START, Direction::Up);
        for _ in 0..5 {
            assert_eq!(go(&g, START, Direction::Up), first);
        }
    }

    #[test]
    fn free_cell_relocates_linearly() {
        let g = cave();
        let r = go(&g, START, Direction::Down);
        assert_eq!(r.outcome, Outcome::Relocate);
        assert_eq!(r.destination, Pos::new(5, 0));
        assert_eq!(
            r.motion,
            Some(Motion {
                to: Pos::new(5, 0),
                duration: Duration::from_millis(350),
                ease: Ease::Linear,
            })
        );
        assert_eq!(r.advisory, None);
        assert_eq!(r.reveal, Some(Pos::new(5, 0)));
    }

    #[test]
    fn bats_send_the_caveman_to_the_entrance() {
        let g = cave();
        let approaches = [
            (Pos::new(3, 3), Direction::Right),
            (Pos::new(4, 4), Direction::Up),
            (Pos::new(3, 5), Direction::Left),
            (Pos::new(1, 4), Direction::Up),
            (Pos::new(0, 5), Direction::Left),
        ];
        for (from, dir) in approaches {
            let r = go(&g, from, dir);
            assert_eq!(r.outcome, Outcome::Reset, "from {from:?}");
            assert_eq!(r.destination, START);
            let motion = r.motion.unwrap();
            assert_eq!(motion.to, START);
            assert_eq!(motion.ease, Ease::BounceInOut);
            assert_eq!(motion.duration, Duration::from_millis(900));
            assert_eq!(r.advisory.unwrap().text, BATS_MESSAGE);
            assert_eq!(r.reveal, Some(r.target));
        }
    }

    #[test]
    fn reset_uses_the_given_start() {
        let g = cave();
        let elsewhere = Pos::new(1, 1);
        let r = resolve(&g, Pos::new(3, 3), elsewhere, Direction::Right, &MoveTiming::default())
            .unwrap();
        assert_eq!(r.destination, elsewhere);
    }

    #[test]
    fn dino_and_wheel_end_the_game() {
        let g = cave();
        let defeat = go(&g, Pos::new(1, 1), Direction::Up);
        assert_eq!(defeat.outcome, Outcome::Defeat);
        assert_eq!(defeat.reveal, Some(Pos::new(0, 1)));
        assert_eq!(defeat.motion, None);

        let victory = go(&g, Pos::new(1, 4), Direction::Down);
        assert_eq!(victory.outcome, Outcome::Victory);
        assert_eq!(victory.reveal, Some(Pos::new(2, 4)));
        assert!(victory.outcome.is_final());
        assert_eq!(go(&g, Pos::new(2, 5), Direction::Left).outcome, Outcome::Victory);
    }

    #[test]
    fn edges_block_silently() {
        let g = cave();
        let r = go(&g, START, Direction::Left);
        assert_eq!(r.outcome, Outcome::Blocked);
        assert_eq!(r.target, START);
        assert_eq!(r.destination, START);
        assert_eq!(r.advisory, None);
        assert_eq!(r.reveal, None);

        let corner = go(&g, Pos::new(0, 5), Direction::Up);
        assert_eq!(corner.outcome, Outcome::Blocked);
        assert_eq!(corner.advisory, None);
    }

    #[test]
    fn stepping_onto_the_entrance_keeps_it_clear() {
        let g = cave();
        let r = go(&g, Pos::new(4, 1), Direction::Left);
        assert_eq!(r.outcome, Outcome::Relocate);
        assert_eq!(r.destination, START);
        assert_eq!(r.reveal, None);
    }

    #[test]
    fn timing_is_configurable() {
        let g = cave();
        let timing = MoveTiming {
            step: Duration::from_millis(10),
            ..MoveTiming::default()
        };
        let r = resolve(&g, START, START, Direction::Down, &timing).unwrap();
        assert_eq!(r.motion.unwrap().duration, Duration::from_millis(10));
    }
}

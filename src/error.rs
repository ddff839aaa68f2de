/// Error kinds surfaced by the game core and its terminal host.
///
/// Map and asset problems are detected at or before the Menu → Playing
/// transition. Once play begins no move can fail: `OutOfBounds` only
/// signals a broken bounds check.

use crate::scene::visual::AssetId;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("map invariant violated: {0}")]
    MapInvariantViolation(String),
    #[error("failed to load asset `{}`: {reason}", asset.key())]
    AssetLoadFailure { asset: AssetId, reason: String },
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type GameResult<T> = Result<T, GameError>;

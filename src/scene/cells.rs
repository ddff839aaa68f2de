/// Per-cell visual layers of the board.
///
/// Every cell owns a `base` visual derived from its tile and, unless it is
/// the cave entrance, a fog `overlay`. Revealing a cell hides and drops its
/// overlay; the concealment never comes back for the rest of the game.

use super::cache::RenderCache;
use super::surface::RenderSurface;
use super::visual::{Transform, VisualObject};
use crate::domain::grid::{Grid, Pos};
use crate::error::GameResult;

#[derive(Clone, Debug)]
pub struct CellVisuals<V> {
    pub base: VisualObject<V>,
    pub overlay: Option<VisualObject<V>>,
}

#[derive(Debug)]
pub struct CellObjects<V> {
    cols: usize,
    cells: Vec<CellVisuals<V>>,
}

impl<V: Clone> CellObjects<V> {
    /// Build, place and show both layers for every grid cell, row by row.
    pub fn build<R>(
        grid: &Grid,
        cache: &mut RenderCache<V>,
        surface: &mut R,
        tile_length: f32,
    ) -> GameResult<Self>
    where
        R: RenderSurface<Visual = V>,
    {
        let mut cells = Vec::with_capacity(grid.rows() * grid.cols());
        for (pos, tile) in grid.cells() {
            let at = Transform::cell(pos.row, pos.col, tile_length);

            let mut base = cache.get(surface, tile.base_asset())?;
            surface.place(&mut base, at);
            surface.show(&base);

            let overlay = match tile.overlay_asset() {
                Some(asset) => {
                    let mut fog = cache.get(surface, asset)?;
                    surface.place(&mut fog, at);
                    surface.show(&fog);
                    Some(fog)
                }
                None => None,
            };

            cells.push(CellVisuals { base, overlay });
        }

        Ok(CellObjects { cols: grid.cols(), cells })
    }

    #[allow(dead_code)]
    pub fn get(&self, pos: Pos) -> Option<&CellVisuals<V>> {
        if pos.col >= self.cols {
            return None;
        }
        self.cells.get(pos.row * self.cols + pos.col)
    }

    /// Lift the fog over `pos`. Returns false if it was already clear.
    pub fn reveal<R>(&mut self, pos: Pos, surface: &mut R) -> bool
    where
        R: RenderSurface<Visual = V>,
    {
        if pos.col >= self.cols {
            return false;
        }
        let Some(cell) = self.cells.get_mut(pos.row * self.cols + pos.col) else {
            return false;
        };
        match cell.overlay.take() {
            Some(fog) => {
                surface.hide(&fog);
                true
            }
            None => false,
        }
    }

    /// Cells still under fog.
    pub fn concealed(&self) -> usize {
        self.cells.iter().filter(|c| c.overlay.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;
    use crate::scene::testing::RecordingSurface;
    use crate::scene::visual::AssetId;

    fn board() -> (Grid, RecordingSurface, CellObjects<AssetId>) {
        let grid = Grid::cave().unwrap();
        let mut surface = RecordingSurface::new();
        let mut cache = RenderCache::new(surface.load_assets(&AssetId::ALL).unwrap());
        let cells = CellObjects::build(&grid, &mut cache, &mut surface, 100.0).unwrap();
        (grid, surface, cells)
    }

    #[test]
    fn every_cell_gets_its_layers() {
        let (grid, surface, cells) = board();
        for (pos, tile) in grid.cells() {
            let cell = cells.get(pos).unwrap();
            assert_eq!(cell.base.sprite, tile.base_asset());
            assert_eq!(cell.base.transform, Transform::cell(pos.row, pos.col, 100.0));
            assert!(surface.is_shown(cell.base.id));
            match &cell.overlay {
                Some(fog) => {
                    assert_ne!(tile, Tile::Init);
                    assert_eq!(fog.sprite, AssetId::Fog);
                    assert!(surface.is_shown(fog.id));
                }
                None => assert_eq!(tile, Tile::Init),
            }
        }
        assert_eq!(cells.concealed(), 35);
        // Fog drawables are built once and copied for all 35 cells.
        assert_eq!(surface.created(AssetId::Fog), 1);
    }

    #[test]
    fn fog_sits_above_base() {
        let (_, surface, cells) = board();
        let cell = cells.get(Pos::new(0, 0)).unwrap();
        let fog = cell.overlay.as_ref().unwrap();
        let base_at = surface.display.iter().position(|s| s.id == cell.base.id).unwrap();
        let fog_at = surface.display.iter().position(|s| s.id == fog.id).unwrap();
        assert!(fog_at > base_at);
    }

    #[test]
    fn reveal_is_permanent_and_once_only() {
        let (_, mut surface, mut cells) = board();
        let pos = Pos::new(5, 0);
        let fog_id = cells.get(pos).unwrap().overlay.as_ref().unwrap().id;

        assert!(cells.reveal(pos, &mut surface));
        assert!(!surface.is_shown(fog_id));
        assert!(cells.get(pos).unwrap().overlay.is_none());
        assert!(!cells.reveal(pos, &mut surface));
        assert_eq!(cells.concealed(), 34);
    }

    #[test]
    fn entrance_cannot_be_revealed() {
        let (_, mut surface, mut cells) = board();
        assert!(!cells.reveal(Pos::new(4, 0), &mut surface));
        assert!(surface.hidden.is_empty());
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let (_, mut surface, mut cells) = board();
        assert!(cells.get(Pos::new(0, 6)).is_none());
        assert!(cells.get(Pos::new(6, 0)).is_none());
        assert!(!cells.reveal(Pos::new(9, 9), &mut surface));
    }
}

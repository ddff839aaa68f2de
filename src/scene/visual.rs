/// Visual objects handed between the session and the rendering surface.
///
/// A `VisualObject` is owned by whoever built it (the session, for cell
/// layers and the caveman token). The surface only displays what it is
/// handed and identifies objects by their `VisualId`.

use std::collections::HashMap;

use crate::error::{GameError, GameResult};

/// Natural edge length of every sprite, in scene units.
pub const SPRITE_SIZE: f32 = 200.0;

/// Every asset the game draws. Closed set, known at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AssetId {
    Cave,
    Caveman,
    Wall,
    Bat,
    Fog,
    Footprint,
    Dino,
    Wheel,
}

impl AssetId {
    pub const ALL: [AssetId; 8] = [
        AssetId::Cave,
        AssetId::Caveman,
        AssetId::Wall,
        AssetId::Bat,
        AssetId::Fog,
        AssetId::Footprint,
        AssetId::Dino,
        AssetId::Wheel,
    ];

    /// Key used in config files and logs.
    pub fn key(self) -> &'static str {
        match self {
            AssetId::Cave => "cave",
            AssetId::Caveman => "caveman",
            AssetId::Wall => "wall",
            AssetId::Bat => "bat",
            AssetId::Fog => "fog",
            AssetId::Footprint => "footprint",
            AssetId::Dino => "dino",
            AssetId::Wheel => "wheel",
        }
    }

    pub fn from_key(key: &str) -> Option<AssetId> {
        AssetId::ALL.into_iter().find(|a| a.key() == key)
    }
}

/// Opaque token for a loaded asset, issued by the surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AssetHandle(pub usize);

/// Handles for every asset loaded by `RenderSurface::load_assets`.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    handles: HashMap<AssetId, AssetHandle>,
}

impl AssetTable {
    pub fn insert(&mut self, asset: AssetId, handle: AssetHandle) {
        self.handles.insert(asset, handle);
    }

    pub fn handle(&self, asset: AssetId) -> GameResult<AssetHandle> {
        self.handles
            .get(&asset)
            .copied()
            .ok_or_else(|| GameError::AssetLoadFailure {
                asset,
                reason: "asset was never loaded".into(),
            })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct VisualId(pub u32);

/// Absolute placement in scene units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { x: 0.0, y: 0.0, scale_x: 1.0, scale_y: 1.0 };

    /// Placement of a sprite covering cell (row, col).
    pub fn cell(row: usize, col: usize, tile_length: f32) -> Self {
        let scale = tile_length / SPRITE_SIZE;
        Transform {
            x: tile_length * col as f32,
            y: tile_length * row as f32,
            scale_x: scale,
            scale_y: scale,
        }
    }
}

/// A positionable instance of a loaded asset.
/// `V` is the surface's own drawable (glyph, texture handle, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct VisualObject<V> {
    pub id: VisualId,
    pub asset: AssetId,
    pub sprite: V,
    pub transform: Transform,
}

impl<V: Clone> VisualObject<V> {
    /// Independent copy under a new identity.
    pub fn duplicate(&self, id: VisualId) -> Self {
        VisualObject {
            id,
            asset: self.asset,
            sprite: self.sprite.clone(),
            transform: self.transform,
        }
    }
}

/// Palette for advisory and banner text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextColor {
    Yellow,
    Orange,
    Lime,
    Red,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_transform_scales_to_tile() {
        let t = Transform::cell(2, 3, 100.0);
        assert_eq!(t.x, 300.0);
        assert_eq!(t.y, 200.0);
        assert_eq!(t.scale_x, 0.5);
        assert_eq!(t.scale_y, 0.5);
    }

    #[test]
    fn missing_handle_is_an_asset_failure() {
        let mut table = AssetTable::default();
        table.insert(AssetId::Fog, AssetHandle(0));
        assert_eq!(table.handle(AssetId::Fog).unwrap(), AssetHandle(0));
        assert!(matches!(
            table.handle(AssetId::Dino),
            Err(GameError::AssetLoadFailure { asset: AssetId::Dino, .. })
        ));
    }

    #[test]
    fn asset_keys_are_distinct() {
        let mut keys: Vec<&str> = AssetId::ALL.iter().map(|a| a.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), AssetId::ALL.len());
        for asset in AssetId::ALL {
            assert_eq!(AssetId::from_key(asset.key()), Some(asset));
        }
        assert_eq!(AssetId::from_key("wheels"), None);
    }
}

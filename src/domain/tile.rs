/// Tile kinds and their properties.
/// Asset choice and map symbols are queried via methods,
/// so tile semantics stay centralized here.

use crate::scene::visual::AssetId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Free,
    Wall, // Impassable
    Init, // Cave entrance: start and reset position
    Bats, // Hazard: sends the caveman back to the entrance
    Dino, // Lethal
    Dest, // The wheel
}

impl Tile {
    #[cfg(test)]
    pub const ALL: [Tile; 6] = [
        Tile::Free,
        Tile::Wall,
        Tile::Init,
        Tile::Bats,
        Tile::Dino,
        Tile::Dest,
    ];

    /// Does this tile end the game when entered?
    #[allow(dead_code)]
    pub fn is_terminal(self) -> bool {
        matches!(self, Tile::Dino | Tile::Dest)
    }

    /// Asset drawn as the cell's base layer.
    pub fn base_asset(self) -> AssetId {
        match self {
            Tile::Free => AssetId::Footprint,
            Tile::Wall => AssetId::Wall,
            Tile::Init => AssetId::Cave,
            Tile::Bats => AssetId::Bat,
            Tile::Dino => AssetId::Dino,
            Tile::Dest => AssetId::Wheel,
        }
    }

    /// Asset concealing the cell until it is revealed.
    /// The entrance is never fogged: the player token sits on top of it.
    pub fn overlay_asset(self) -> Option<AssetId> {
        match self {
            Tile::Init => None,
            _ => Some(AssetId::Fog),
        }
    }

    /// Map legend:
    ///   '.' = Free   '#' = Wall   'C' = Cave entrance (Init)
    ///   'B' = Bats   'D' = Dino   'W' = Wheel (Dest)
    pub fn from_symbol(ch: char) -> Option<Tile> {
        match ch {
            '.' => Some(Tile::Free),
            '#' => Some(Tile::Wall),
            'C' => Some(Tile::Init),
            'B' => Some(Tile::Bats),
            'D' => Some(Tile::Dino),
            'W' => Some(Tile::Dest),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn symbol(self) -> char {
        match self {
            Tile::Free => '.',
            Tile::Wall => '#',
            Tile::Init => 'C',
            Tile::Bats => 'B',
            Tile::Dino => 'D',
            Tile::Dest => 'W',
        }
    }
}

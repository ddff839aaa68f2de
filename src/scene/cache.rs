/// Memoized visual templates, one per asset.
///
/// The first request for an asset asks the surface to build its drawable
/// and keeps the result as a template. Every request, the first included,
/// returns a fresh copy with its own `VisualId`, so placing one cell's
/// visual never moves another's. Entries are never evicted: there is one
/// per `AssetId` at most.

use std::collections::HashMap;

use super::surface::RenderSurface;
use super::visual::{AssetId, AssetTable, Transform, VisualId, VisualObject};
use crate::error::GameResult;

#[derive(Debug)]
pub struct RenderCache<V> {
    assets: AssetTable,
    templates: HashMap<AssetId, VisualObject<V>>,
    next_id: u32,
}

impl<V: Clone> RenderCache<V> {
    pub fn new(assets: AssetTable) -> Self {
        RenderCache {
            assets,
            templates: HashMap::with_capacity(AssetId::ALL.len()),
            next_id: 0,
        }
    }

    /// A new, independently positionable visual for `asset`.
    pub fn get<R>(&mut self, surface: &mut R, asset: AssetId) -> GameResult<VisualObject<V>>
    where
        R: RenderSurface<Visual = V>,
    {
        if !self.templates.contains_key(&asset) {
            let handle = self.assets.handle(asset)?;
            let template = VisualObject {
                id: self.allocate(),
                asset,
                sprite: surface.create_visual(handle),
                transform: Transform::IDENTITY,
            };
            self.templates.insert(asset, template);
        }

        let id = self.allocate();
        Ok(self.templates[&asset].duplicate(id))
    }

    /// Number of assets with a stored template.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    fn allocate(&mut self) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        id
    }
}

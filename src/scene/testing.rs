/// In-memory `RenderSurface` that records every call, for tests.
/// Tweens stay pending until `finish_animations` fires them.

use std::collections::HashMap;
use std::time::Duration;

use super::ease::Ease;
use super::surface::{completion, Completion, CompletionSignal, RenderSurface};
use super::visual::{AssetHandle, AssetId, AssetTable, TextColor, Transform, VisualId, VisualObject};
use crate::error::{GameError, GameResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Shown {
    pub id: VisualId,
    pub asset: AssetId,
    pub transform: Transform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationCall {
    pub id: VisualId,
    pub to: (f32, f32),
    pub duration: Duration,
    pub ease: Ease,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    slots: Vec<AssetId>,
    created: HashMap<AssetId, usize>,
    pub load_calls: usize,
    pub fail_asset: Option<AssetId>,
    pub display: Vec<Shown>,
    pub hidden: Vec<VisualId>,
    pub texts: Vec<(String, Duration, TextColor)>,
    pub banners: Vec<(String, TextColor)>,
    pub animations: Vec<AnimationCall>,
    pending: Vec<CompletionSignal>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many drawables were built for `asset`.
    pub fn created(&self, asset: AssetId) -> usize {
        self.created.get(&asset).copied().unwrap_or(0)
    }

    pub fn is_shown(&self, id: VisualId) -> bool {
        self.display.iter().any(|s| s.id == id)
    }

    pub fn pending_animations(&self) -> usize {
        self.pending.len()
    }

    pub fn finish_animations(&mut self) {
        for signal in self.pending.drain(..) {
            signal.fire();
        }
    }
}

impl RenderSurface for RecordingSurface {
    type Visual = AssetId;

    fn load_assets(&mut self, ids: &[AssetId]) -> GameResult<AssetTable> {
        self.load_calls += 1;
        let mut table = AssetTable::default();
        for &asset in ids {
            if self.fail_asset == Some(asset) {
                return Err(GameError::AssetLoadFailure {
                    asset,
                    reason: "refused by test surface".into(),
                });
            }
            table.insert(asset, AssetHandle(self.slots.len()));
            self.slots.push(asset);
        }
        Ok(table)
    }

    fn create_visual(&mut self, handle: AssetHandle) -> AssetId {
        let asset = self.slots[handle.0];
        *self.created.entry(asset).or_default() += 1;
        asset
    }

    fn place(&mut self, visual: &mut VisualObject<AssetId>, transform: Transform) {
        visual.transform = transform;
        if let Some(shown) = self.display.iter_mut().find(|s| s.id == visual.id) {
            shown.transform = transform;
        }
    }

    fn show(&mut self, visual: &VisualObject<AssetId>) {
        self.display.retain(|s| s.id != visual.id);
        self.display.push(Shown {
            id: visual.id,
            asset: visual.sprite,
            transform: visual.transform,
        });
    }

    fn hide(&mut self, visual: &VisualObject<AssetId>) {
        self.display.retain(|s| s.id != visual.id);
        self.hidden.push(visual.id);
    }

    fn animate(
        &mut self,
        visual: &VisualObject<AssetId>,
        to: (f32, f32),
        duration: Duration,
        ease: Ease,
    ) -> Completion {
        self.animations.push(AnimationCall { id: visual.id, to, duration, ease });
        let (signal, done) = completion();
        self.pending.push(signal);
        done
    }

    fn show_transient_text(&mut self, message: &str, duration: Duration, color: TextColor) {
        self.texts.push((message.to_string(), duration, color));
    }

    fn show_banner(&mut self, message: &str, color: TextColor) {
        self.banners.push((message.to_string(), color));
    }

    fn clear(&mut self) {
        self.display.clear();
        self.banners.clear();
    }
}

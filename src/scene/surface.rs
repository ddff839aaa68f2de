/// The rendering collaborator the game core drives.
///
/// The core never draws. It hands `VisualObject`s to a `RenderSurface`
/// and asks it to show, hide, place and tween them, and to flash
/// advisory text. Relocation tweens report back through a one-shot
/// `Completion`; the session polls it before re-arming input.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use super::ease::Ease;
use super::visual::{AssetHandle, AssetId, AssetTable, TextColor, Transform, VisualObject};
use crate::error::GameResult;

pub trait RenderSurface {
    /// The surface's drawable behind a visual (glyph, texture, ...).
    type Visual: Clone + std::fmt::Debug;

    /// Acquire every listed asset. Must succeed before play starts.
    fn load_assets(&mut self, ids: &[AssetId]) -> GameResult<AssetTable>;

    /// Build the drawable for a loaded asset.
    fn create_visual(&mut self, handle: AssetHandle) -> Self::Visual;

    /// Position a visual absolutely. Updates the display if it is shown.
    fn place(&mut self, visual: &mut VisualObject<Self::Visual>, transform: Transform);

    /// Add to the display, on top of everything shown so far.
    fn show(&mut self, visual: &VisualObject<Self::Visual>);

    /// Remove from the display without destroying the object.
    fn hide(&mut self, visual: &VisualObject<Self::Visual>);

    /// Tween a shown visual to (to_x, to_y). The returned completion fires
    /// once the visual has arrived.
    fn animate(
        &mut self,
        visual: &VisualObject<Self::Visual>,
        to: (f32, f32),
        duration: Duration,
        ease: Ease,
    ) -> Completion;

    /// Flash a message that removes itself after `duration`.
    fn show_transient_text(&mut self, message: &str, duration: Duration, color: TextColor);

    /// Persistent headline text (menu prompt, ending).
    fn show_banner(&mut self, message: &str, color: TextColor);

    /// Drop everything displayed: visuals, banners and pending messages.
    fn clear(&mut self);
}

/// Firing half of a completion, held by the surface.
#[derive(Debug)]
pub struct CompletionSignal(Sender<()>);

impl CompletionSignal {
    pub fn fire(self) {
        // Receiver gone means nobody waits any more.
        let _ = self.0.send(());
    }
}

/// Waiting half of a completion, held by the session.
#[derive(Debug)]
pub struct Completion(Receiver<()>);

impl Completion {
    /// Has the operation finished? A signal dropped without firing counts
    /// as finished, so an abandoned tween never locks input forever.
    pub fn is_complete(&self) -> bool {
        match self.0.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => true,
        }
    }
}

pub fn completion() -> (CompletionSignal, Completion) {
    let (tx, rx) = mpsc::channel();
    (CompletionSignal(tx), Completion(rx))
}

/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// `TerminalSurface` is the `RenderSurface` of the terminal host. Each
/// visual is a two-column `Glyph`; scene coordinates are divided by the
/// tile length to find the board cell it covers. Tweens and advisory
/// timers run on the host's frame clock through `advance()`.

use std::collections::HashMap;
use std::io::{self, BufWriter, Write};
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use log::{debug, warn};

use crate::error::{GameError, GameResult};
use crate::scene::ease::Ease;
use crate::scene::surface::{completion, Completion, CompletionSignal, RenderSurface};
use crate::scene::visual::{
    AssetHandle, AssetId, AssetTable, TextColor, Transform, VisualId, VisualObject,
};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the gap
    /// between rows matches the cell colour on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }

    /// Write a string centred on row y.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        self.put_str(self.width.saturating_sub(len) / 2, y, s, fg);
    }
}

// ── Glyphs ──

/// Terminal drawable: two single-column characters on a background.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Glyph {
    pub chars: [char; 2],
    pub fg: Color,
    pub bg: Color,
}

impl Glyph {
    const fn new(a: char, b: char, fg: Color, bg: Color) -> Self {
        Glyph { chars: [a, b], fg, bg }
    }

    fn missing() -> Self {
        Glyph::new('?', '?', Color::Magenta, Color::Black)
    }
}

const BROWN: Color = Color::Rgb { r: 139, g: 90, b: 43 };
const STONE: Color = Color::Rgb { r: 96, g: 96, b: 104 };
const FOG: Color = Color::Rgb { r: 58, g: 58, b: 70 };
const GROUND: Color = Color::Rgb { r: 40, g: 34, b: 30 };

fn default_glyph(asset: AssetId) -> Glyph {
    match asset {
        AssetId::Cave => Glyph::new('∩', '∩', BROWN, GROUND),
        AssetId::Caveman => Glyph::new('@', '@', Color::Yellow, GROUND),
        AssetId::Wall => Glyph::new('█', '█', STONE, STONE),
        AssetId::Bat => Glyph::new('w', 'w', Color::Magenta, GROUND),
        AssetId::Fog => Glyph::new('░', '░', Color::Grey, FOG),
        AssetId::Footprint => Glyph::new('·', '·', Color::DarkGrey, GROUND),
        AssetId::Dino => Glyph::new('§', '§', Color::Green, GROUND),
        AssetId::Wheel => Glyph::new('(', ')', Color::White, GROUND),
    }
}

/// Rough East Asian Wide / emoji test. Wide characters would break the
/// two-column cell layout.
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD)
}

/// One or two narrow printable characters; a single one is doubled.
fn parse_glyph_chars(text: &str) -> Result<[char; 2], String> {
    let chars: Vec<char> = text.chars().collect();
    if let Some(bad) = chars.iter().find(|c| c.is_control() || is_wide(**c)) {
        return Err(format!("glyph {text:?} contains unprintable or wide character {bad:?}"));
    }
    match chars.as_slice() {
        [c] => Ok([*c, *c]),
        [a, b] => Ok([*a, *b]),
        _ => Err(format!("glyph {text:?} must be one or two characters")),
    }
}

fn text_color(color: TextColor) -> Color {
    match color {
        TextColor::Yellow => Color::Yellow,
        TextColor::Orange => Color::Rgb { r: 255, g: 165, b: 0 },
        TextColor::Lime => Color::Rgb { r: 50, g: 205, b: 50 },
        TextColor::Red => Color::Red,
    }
}

// ── Scene state ──

struct Drawn {
    id: VisualId,
    glyph: Glyph,
    x: f32,
    y: f32,
}

struct Tween {
    id: VisualId,
    from: (f32, f32),
    to: (f32, f32),
    elapsed: Duration,
    duration: Duration,
    ease: Ease,
    done: CompletionSignal,
}

struct Notice {
    text: String,
    color: Color,
    remaining: Duration,
}

// ── Layout ──

/// Each board cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Notices shown at once, newest first.
const MAX_NOTICES: usize = 2;

const HELP_LINE: &str = "Arrows/WASD: move   Enter/Space/Click: start   Q/Esc: quit";

pub struct TerminalSurface {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,

    overrides: HashMap<AssetId, String>,
    slots: Vec<Glyph>,
    tile_length: f32,
    rows: usize,
    cols: usize,

    display: Vec<Drawn>,
    tweens: Vec<Tween>,
    notices: Vec<Notice>,
    banners: Vec<(String, Color)>,
}

impl TerminalSurface {
    /// `overrides` maps asset keys (`"wall"`) to replacement glyph text.
    /// Board size is in cells; `tile_length` in scene units.
    pub fn new(
        overrides: &HashMap<String, String>,
        tile_length: f32,
        rows: usize,
        cols: usize,
    ) -> Self {
        let mut known = HashMap::new();
        for (key, text) in overrides {
            match AssetId::from_key(key) {
                Some(asset) => {
                    known.insert(asset, text.clone());
                }
                None => warn!("unknown asset {key:?} in [assets], ignored"),
            }
        }

        TerminalSurface {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            overrides: known,
            slots: Vec::new(),
            tile_length,
            rows,
            cols,
            display: Vec::new(),
            tweens: Vec::new(),
            notices: Vec::new(),
            banners: Vec::new(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Run tweens and advisory timers forward by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let mut finished = Vec::new();
        for (i, tween) in self.tweens.iter_mut().enumerate() {
            tween.elapsed += dt;
            let t = if tween.duration.is_zero() {
                1.0
            } else {
                tween.elapsed.as_secs_f32() / tween.duration.as_secs_f32()
            };
            let k = tween.ease.apply(t);
            let x = tween.from.0 + (tween.to.0 - tween.from.0) * k;
            let y = tween.from.1 + (tween.to.1 - tween.from.1) * k;
            if let Some(d) = self.display.iter_mut().find(|d| d.id == tween.id) {
                (d.x, d.y) = if t >= 1.0 { tween.to } else { (x, y) };
            }
            if t >= 1.0 {
                finished.push(i);
            }
        }
        for i in finished.into_iter().rev() {
            self.tweens.swap_remove(i).done.fire();
        }

        for notice in &mut self.notices {
            notice.remaining = notice.remaining.saturating_sub(dt);
        }
        self.notices.retain(|n| !n.remaining.is_zero());
    }

    pub fn render(&mut self) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose();
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors. ResetColor would fall back to the
        // terminal's own default and show as lines between rows.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Top-left terminal cell of the board interior.
    fn board_origin(&self) -> (usize, usize) {
        let framed_w = self.cols * CELL_W + 2;
        (self.front.width.saturating_sub(framed_w) / 2 + 1, MAP_ROW + 1)
    }

    fn compose(&mut self) {
        self.front.clear();
        self.front.put_centered(HUD_ROW, "C A V E   B R A V E", Color::Yellow);

        let (ox, oy) = self.board_origin();
        self.compose_frame(ox, oy);

        for i in 0..self.display.len() {
            let d = &self.display[i];
            let (glyph, x, y) = (d.glyph, d.x, d.y);
            let col = (x / self.tile_length).round();
            let row = (y / self.tile_length).round();
            if col < 0.0 || row < 0.0 {
                continue;
            }
            let (col, row) = (col as usize, row as usize);
            if col >= self.cols || row >= self.rows {
                continue;
            }
            for (k, ch) in glyph.chars.into_iter().enumerate() {
                self.front.set(
                    ox + col * CELL_W + k,
                    oy + row,
                    Cell { ch, fg: glyph.fg, bg: glyph.bg },
                );
            }
        }

        let mut line = oy + self.rows + 2;
        for (text, color) in &self.banners {
            self.front.put_centered(line, text, *color);
            line += 1;
        }
        line += 1;
        for notice in self.notices.iter().rev().take(MAX_NOTICES) {
            self.front.put_centered(line, &notice.text, notice.color);
            line += 1;
        }

        if self.front.height > 0 {
            self.front.put_centered(self.front.height - 1, HELP_LINE, Color::DarkGrey);
        }
    }

    fn compose_frame(&mut self, ox: usize, oy: usize) {
        let inner_w = self.cols * CELL_W;
        let edge = Color::DarkGrey;
        let (left, right) = (ox - 1, ox + inner_w);
        let (top, bottom) = (oy - 1, oy + self.rows);

        self.front.put_str(left, top, "┌", edge);
        self.front.put_str(right, top, "┐", edge);
        self.front.put_str(left, bottom, "└", edge);
        self.front.put_str(right, bottom, "┘", edge);
        for x in ox..right {
            self.front.put_str(x, top, "─", edge);
            self.front.put_str(x, bottom, "─", edge);
        }
        for y in oy..bottom {
            self.front.put_str(left, y, "│", edge);
            self.front.put_str(right, y, "│", edge);
        }
    }

    // ── Internal ──

    fn position_of(&self, id: VisualId) -> Option<(f32, f32)> {
        self.display.iter().find(|d| d.id == id).map(|d| (d.x, d.y))
    }

    /// Stop any tween on `id`; its waiter is released.
    fn cancel_tweens(&mut self, id: VisualId) {
        let mut i = 0;
        while i < self.tweens.len() {
            if self.tweens[i].id == id {
                self.tweens.swap_remove(i).done.fire();
            } else {
                i += 1;
            }
        }
    }
}

impl RenderSurface for TerminalSurface {
    type Visual = Glyph;

    fn load_assets(&mut self, ids: &[AssetId]) -> GameResult<AssetTable> {
        let mut table = AssetTable::default();
        for &asset in ids {
            let mut glyph = default_glyph(asset);
            if let Some(text) = self.overrides.get(&asset) {
                glyph.chars = parse_glyph_chars(text)
                    .map_err(|reason| GameError::AssetLoadFailure { asset, reason })?;
            }
            table.insert(asset, AssetHandle(self.slots.len()));
            self.slots.push(glyph);
        }
        debug!("{} glyphs loaded", table.len());
        Ok(table)
    }

    fn create_visual(&mut self, handle: AssetHandle) -> Glyph {
        self.slots.get(handle.0).copied().unwrap_or_else(|| {
            warn!("unknown asset handle {}", handle.0);
            Glyph::missing()
        })
    }

    fn place(&mut self, visual: &mut VisualObject<Glyph>, transform: Transform) {
        visual.transform = transform;
        self.cancel_tweens(visual.id);
        if let Some(d) = self.display.iter_mut().find(|d| d.id == visual.id) {
            d.x = transform.x;
            d.y = transform.y;
        }
    }

    fn show(&mut self, visual: &VisualObject<Glyph>) {
        let (x, y) = self
            .position_of(visual.id)
            .unwrap_or((visual.transform.x, visual.transform.y));
        self.display.retain(|d| d.id != visual.id);
        self.display.push(Drawn { id: visual.id, glyph: visual.sprite, x, y });
    }

    fn hide(&mut self, visual: &VisualObject<Glyph>) {
        self.cancel_tweens(visual.id);
        self.display.retain(|d| d.id != visual.id);
    }

    fn animate(
        &mut self,
        visual: &VisualObject<Glyph>,
        to: (f32, f32),
        duration: Duration,
        ease: Ease,
    ) -> Completion {
        let (signal, done) = completion();
        self.cancel_tweens(visual.id);
        match self.position_of(visual.id) {
            Some(from) if !duration.is_zero() => self.tweens.push(Tween {
                id: visual.id,
                from,
                to,
                elapsed: Duration::ZERO,
                duration,
                ease,
                done: signal,
            }),
            _ => {
                if let Some(d) = self.display.iter_mut().find(|d| d.id == visual.id) {
                    (d.x, d.y) = to;
                }
                signal.fire();
            }
        }
        done
    }

    fn show_transient_text(&mut self, message: &str, duration: Duration, color: TextColor) {
        self.notices.push(Notice {
            text: message.to_string(),
            color: text_color(color),
            remaining: duration,
        });
    }

    fn show_banner(&mut self, message: &str, color: TextColor) {
        self.banners.push((message.to_string(), text_color(color)));
    }

    fn clear(&mut self) {
        for tween in self.tweens.drain(..) {
            tween.done.fire();
        }
        self.display.clear();
        self.notices.clear();
        self.banners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(overrides: &[(&str, &str)]) -> TerminalSurface {
        let map = overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut s = TerminalSurface::new(&map, 100.0, 6, 6);
        s.front.resize(40, 16);
        s
    }

    fn visual(s: &mut TerminalSurface, asset: AssetId, id: u32) -> VisualObject<Glyph> {
        let table = s.load_assets(&[asset]).unwrap();
        let sprite = s.create_visual(table.handle(asset).unwrap());
        VisualObject { id: VisualId(id), asset, sprite, transform: Transform::IDENTITY }
    }

    #[test]
    fn glyph_overrides_are_validated() {
        assert_eq!(parse_glyph_chars("#"), Ok(['#', '#']));
        assert_eq!(parse_glyph_chars("<>"), Ok(['<', '>']));
        assert!(parse_glyph_chars("").is_err());
        assert!(parse_glyph_chars("abc").is_err());
        assert!(parse_glyph_chars("\t").is_err());
        assert!(parse_glyph_chars("🦖").is_err());
        assert!(parse_glyph_chars("░").is_ok());
    }

    #[test]
    fn bad_override_fails_the_load() {
        let mut s = surface(&[("dino", "RAWR")]);
        assert!(matches!(
            s.load_assets(&AssetId::ALL),
            Err(GameError::AssetLoadFailure { asset: AssetId::Dino, .. })
        ));
    }

    #[test]
    fn override_replaces_default_chars() {
        let mut s = surface(&[("wall", "X"), ("nonsense", "?")]);
        let v = visual(&mut s, AssetId::Wall, 1);
        assert_eq!(v.sprite.chars, ['X', 'X']);
        assert_eq!(v.sprite.fg, default_glyph(AssetId::Wall).fg);
    }

    #[test]
    fn tween_lands_exactly_and_completes() {
        let mut s = surface(&[]);
        let mut v = visual(&mut s, AssetId::Caveman, 1);
        s.place(&mut v, Transform::cell(4, 0, 100.0));
        s.show(&v);

        let done = s.animate(&v, (0.0, 500.0), Duration::from_millis(350), Ease::Linear);
        s.advance(Duration::from_millis(100));
        assert!(!done.is_complete());
        let (_, y) = s.position_of(v.id).unwrap();
        assert!(y > 400.0 && y < 500.0);

        s.advance(Duration::from_millis(300));
        assert!(done.is_complete());
        assert_eq!(s.position_of(v.id), Some((0.0, 500.0)));
        assert!(s.tweens.is_empty());
    }

    #[test]
    fn hidden_or_instant_tweens_complete_at_once() {
        let mut s = surface(&[]);
        let v = visual(&mut s, AssetId::Caveman, 1);
        let done = s.animate(&v, (100.0, 0.0), Duration::from_millis(350), Ease::Linear);
        assert!(done.is_complete());

        s.show(&v);
        let done = s.animate(&v, (100.0, 0.0), Duration::ZERO, Ease::BounceInOut);
        assert!(done.is_complete());
        assert_eq!(s.position_of(v.id), Some((100.0, 0.0)));
    }

    #[test]
    fn clear_releases_pending_tweens() {
        let mut s = surface(&[]);
        let v = visual(&mut s, AssetId::Caveman, 1);
        s.show(&v);
        let done = s.animate(&v, (0.0, 100.0), Duration::from_secs(5), Ease::Linear);
        s.show_banner("hello", TextColor::Yellow);
        s.clear();
        assert!(done.is_complete());
        assert!(s.display.is_empty());
        assert!(s.banners.is_empty());
    }

    #[test]
    fn notices_expire() {
        let mut s = surface(&[]);
        s.show_transient_text("wall", Duration::from_millis(1000), TextColor::Yellow);
        s.show_transient_text("bats", Duration::from_millis(2000), TextColor::Orange);
        s.advance(Duration::from_millis(1000));
        assert_eq!(s.notices.len(), 1);
        assert_eq!(s.notices[0].text, "bats");
        s.advance(Duration::from_millis(1000));
        assert!(s.notices.is_empty());
    }

    #[test]
    fn later_visuals_draw_on_top() {
        let mut s = surface(&[]);
        let mut base = visual(&mut s, AssetId::Footprint, 1);
        let mut fog = visual(&mut s, AssetId::Fog, 2);
        let at = Transform::cell(1, 2, 100.0);
        s.place(&mut base, at);
        s.place(&mut fog, at);
        s.show(&base);
        s.show(&fog);
        s.compose();

        let (ox, oy) = s.board_origin();
        assert_eq!(s.front.get(ox + 2 * CELL_W, oy + 1).ch, '░');

        s.hide(&fog);
        s.compose();
        assert_eq!(s.front.get(ox + 2 * CELL_W, oy + 1).ch, '·');
    }

    #[test]
    fn off_board_visuals_are_skipped() {
        let mut s = surface(&[]);
        let mut v = visual(&mut s, AssetId::Dino, 1);
        s.place(&mut v, Transform::cell(9, 9, 100.0));
        s.show(&v);
        s.compose();
        assert!(s.front.cells.iter().all(|c| c.ch != '§'));
    }
}

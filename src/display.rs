//! Rendering layer.  All terminal I/O lives here.
//!
//! Each frame is repainted in full from an immutable view of the game.  The
//! simulation works in canvas pixels; `Viewport` scales those into the
//! bordered play area of the terminal.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use rand::Rng;
use ribbon_shooter::compute::Game;
use ribbon_shooter::entities::{Entity, EntityKind, Rect};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_WAVE: Color = Color::Cyan;
const C_STAR: Color = Color::DarkGrey;
const C_RIBBON: Color = Color::Magenta;
const C_HOSTILE: Color = Color::Green;
const C_HOSTILE_HIT: Color = Color::Red;
const C_BULLET: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;

const STAR_COUNT: usize = 48;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps canvas coordinates onto terminal cells inside the border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    left: u16,
    top: u16,
    cols: u16,
    rows: u16,
    canvas_width: f32,
    canvas_height: f32,
}

impl Viewport {
    /// Play area for a terminal of `width`×`height`: row 0 is the HUD, row 1
    /// and row `height-2` are the border, the last row holds the hint.
    pub fn new(width: u16, height: u16, canvas_width: f32, canvas_height: f32) -> Self {
        Viewport {
            left: 1,
            top: 2,
            cols: width.saturating_sub(2).max(1),
            rows: height.saturating_sub(4).max(1),
            canvas_width,
            canvas_height,
        }
    }

    /// Terminal cell of a canvas point, if it falls inside the play area.
    pub fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.canvas_width || y >= self.canvas_height {
            return None;
        }
        let col = (x / self.canvas_width * self.cols as f32) as u16;
        let row = (y / self.canvas_height * self.rows as f32) as u16;
        Some((self.left + col.min(self.cols - 1), self.top + row.min(self.rows - 1)))
    }

    /// Width of a canvas rectangle in whole cells, never less than one.
    pub fn span(&self, rect: &Rect) -> u16 {
        ((rect.width / self.canvas_width * self.cols as f32).round() as u16).max(1)
    }
}

// ── Star field ────────────────────────────────────────────────────────────────

/// Fixed scatter of stars, scrolled by the background offset.
#[derive(Clone, Debug)]
pub struct StarField {
    stars: Vec<(f32, f32)>,
}

impl StarField {
    pub fn new(rng: &mut impl Rng, canvas_width: f32, canvas_height: f32) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| {
                (
                    rng.gen_range(0.0..canvas_width),
                    rng.gen_range(0.0..canvas_height),
                )
            })
            .collect();
        StarField { stars }
    }

    /// Star positions after panning by `offset`, wrapped into the canvas.
    pub fn positions(&self, offset: f32, canvas_height: f32) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.stars
            .iter()
            .map(move |&(x, y)| (x, (y + offset).rem_euclid(canvas_height)))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    game: &Game,
    stars: &StarField,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let view = Viewport::new(width, height, game.settings.canvas_width, game.settings.canvas_height);
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, game, width)?;
    draw_stars(out, game, stars, &view)?;

    for hostile in game.hostiles.live() {
        draw_entity(out, hostile, &view)?;
    }
    for bullet in game.player.bullets.live() {
        draw_entity(out, bullet, &view)?;
    }
    draw_entity(out, &game.player.entity, &view)?;
    draw_controls_hint(out, height)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, game: &Game, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", game.score)))?;

    let wave = format!("Wave {}  Cells {:>2}", game.waves, game.hostiles.live_count());
    let x = width.saturating_sub(wave.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(x, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(wave))?;
    Ok(())
}

// ── Scene ─────────────────────────────────────────────────────────────────────

fn draw_stars<W: Write>(
    out: &mut W,
    game: &Game,
    stars: &StarField,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_STAR))?;
    for (x, y) in stars.positions(game.background.offset(), game.settings.canvas_height) {
        if let Some((col, row)) = view.cell(x, y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("·"))?;
        }
    }
    Ok(())
}

fn draw_entity<W: Write>(out: &mut W, entity: &Entity, view: &Viewport) -> std::io::Result<()> {
    let rect = &entity.rect;
    // Anchor on the top-centre so partly off-screen hostiles still show up
    // once their middle enters the canvas.
    let Some((col, row)) = view.cell(rect.x + rect.width / 2.0, rect.y.max(0.0)) else {
        return Ok(());
    };
    let span = view.span(rect);
    let (glyph, color) = match entity.kind {
        EntityKind::Ribbon => (ribbon_glyph(span), C_RIBBON),
        EntityKind::Hostile if entity.is_colliding => ("*".repeat(span as usize), C_HOSTILE_HIT),
        EntityKind::Hostile => (hostile_glyph(span), C_HOSTILE),
        EntityKind::Bullet => ("║".to_string(), C_BULLET),
        EntityKind::Background => return Ok(()),
    };
    let start = col.saturating_sub(span / 2).max(1);
    out.queue(cursor::MoveTo(start, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn ribbon_glyph(span: u16) -> String {
    match span {
        0 | 1 => "▲".to_string(),
        2 => "/\\".to_string(),
        n => format!("/{}\\", "▲".repeat(n as usize - 2)),
    }
}

fn hostile_glyph(span: u16) -> String {
    match span {
        0 | 1 => "@".to_string(),
        2 => "()".to_string(),
        n => format!("({})", "@".repeat(n as usize - 2)),
    }
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑→↓ / WASD : Move   SPACE : Fire   R : Restart   Q : Quit"))?;
    Ok(())
}

//! GameView: maps engine state into a terminal framebuffer.
//!
//! Pure (no I/O); reads the engine through its public accessors only.

use crate::core::pieces::shape;
use crate::core::Engine;
use crate::term::fb::{FrameBuffer, Rgb, Style};
use crate::types::{GameMode, GameOverReason, GamePhase, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Renders the playfield, side panel and overlays.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2 columns per cell compensates for terminal glyph aspect ratio.
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn render(&self, engine: &Engine, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);

        let board_px_w = (BOARD_WIDTH as u16) * self.cell_w;
        let board_px_h = BOARD_HEIGHT as u16;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w + 18) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        let bg = Style {
            fg: Rgb::new(80, 80, 90),
            bg: Rgb::new(25, 25, 35),
            bold: false,
            dim: false,
        };
        let border = Style {
            fg: Rgb::new(200, 200, 200),
            ..Style::default()
        };

        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(&mut fb, start_x, start_y, frame_w, frame_h, border);

        // Locked cells.
        for y in 0..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                if let Some(Some(kind)) = engine.board().get(x, y) {
                    self.draw_cell(&mut fb, start_x, start_y, x as u16, y as u16, kind, false);
                }
            }
        }

        // Ghost, then the live piece on top.
        if let Some(ghost) = engine.ghost_cells() {
            let ghost_style = Style {
                fg: Rgb::new(130, 130, 140),
                bg: Rgb::new(25, 25, 35),
                bold: false,
                dim: true,
            };
            for (x, y) in ghost {
                if (0..BOARD_WIDTH as i8).contains(&x) && (0..BOARD_HEIGHT as i8).contains(&y) {
                    let px = start_x + 1 + (x as u16) * self.cell_w;
                    fb.fill_rect(px, start_y + 1 + y as u16, self.cell_w, 1, '░', ghost_style);
                }
            }
        }
        if let Some(piece) = engine.current() {
            for (x, y) in piece.cells() {
                if (0..BOARD_WIDTH as i8).contains(&x) && (0..BOARD_HEIGHT as i8).contains(&y) {
                    self.draw_cell(&mut fb, start_x, start_y, x as u16, y as u16, piece.kind, true);
                }
            }
        }

        self.draw_side_panel(&mut fb, engine, viewport, start_x, start_y, frame_w);

        match engine.phase() {
            GamePhase::Paused => {
                self.draw_overlay(&mut fb, start_x, start_y, frame_w, frame_h, "PAUSED")
            }
            GamePhase::GameOver => {
                self.draw_overlay(&mut fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
                if let Some(reason) = engine.over_reason() {
                    let line = match reason {
                        GameOverReason::BoardFull => "board full",
                        GameOverReason::NoSpaceForNewPiece => "no space for new piece",
                        GameOverReason::PlayerEnded => "ended by player",
                    };
                    let y = start_y.saturating_add(frame_h / 2 + 1);
                    let x = start_x
                        .saturating_add(frame_w.saturating_sub(line.chars().count() as u16) / 2);
                    fb.put_str(x, y, line, Style::default());
                }
            }
            GamePhase::Won => {
                self.draw_overlay(&mut fb, start_x, start_y, frame_w, frame_h, "YOU WIN")
            }
            GamePhase::Idle | GamePhase::Running => {}
        }

        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: Style) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_cell(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        x: u16,
        y: u16,
        kind: PieceKind,
        bold: bool,
    ) {
        let style = Style {
            fg: piece_color(kind),
            bg: Rgb::new(25, 25, 35),
            bold,
            dim: false,
        };
        let px = start_x + 1 + x * self.cell_w;
        fb.fill_rect(px, start_y + 1 + y, self.cell_w, 1, '█', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        engine: &Engine,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = Style {
            bold: true,
            ..Style::default()
        };
        let value = Style {
            fg: Rgb::new(200, 200, 200),
            ..Style::default()
        };

        let mut y = start_y;
        let mut pair = |fb: &mut FrameBuffer, name: &str, val: String| {
            fb.put_str(panel_x, y, name, label);
            fb.put_str(panel_x, y + 1, &val, value);
            y = y.saturating_add(3);
        };

        pair(fb, "SCORE", engine.score().to_string());
        pair(fb, "LEVEL", engine.level().to_string());
        pair(fb, "ROWS", engine.rows().to_string());

        let (singles, doubles, triples, tetrises) = engine.clear_counters();
        pair(
            fb,
            "CLEARS",
            format!("{}/{}/{}/{}", singles, doubles, triples, tetrises),
        );

        match engine.mode() {
            GameMode::Timed => {
                let remaining = engine.remaining_ms().unwrap_or(0);
                pair(fb, "TIME", format_mm_ss(remaining));
            }
            GameMode::Challenge => pair(fb, "MODE", "challenge".to_string()),
            GameMode::Classic => pair(fb, "MODE", "classic".to_string()),
        }

        fb.put_str(panel_x, y, "NEXT", label);
        self.draw_preview(fb, panel_x, y + 1, engine.next_kind());
    }

    /// Draw the next piece's spawn-orientation shape in a small box.
    fn draw_preview(&self, fb: &mut FrameBuffer, x: u16, y: u16, kind: PieceKind) {
        let style = Style {
            fg: piece_color(kind),
            ..Style::default()
        };
        for (dx, dy) in shape(kind, Rotation::North) {
            let px = x + (dx as u16) * 2;
            let py = y + dy as u16;
            fb.put_str(px, py, "██", style);
        }
    }

    fn draw_overlay(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = Style {
            fg: Rgb::new(255, 255, 255),
            bold: true,
            ..Style::default()
        };
        fb.put_str(x, mid_y, text, style);
    }
}

fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
    }
}

fn format_mm_ss(ms: u32) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

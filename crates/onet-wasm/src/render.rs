//! Canvas rendering for the browser UI

use crate::game::{GameState, ScreenState};
use crate::theme::Theme;
use onet_core::{Cell, Point, Position};
use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;

const FONT: &str = "'JetBrains Mono', monospace";
/// Width reserved for the info panel on the right.
pub const PANEL_WIDTH: f64 = 260.0;
const ARROW: [(f64, f64); 3] = [(-10.0, -10.0), (10.0, 0.0), (-10.0, 10.0)];

/// Where the board sits on the canvas, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub x: f64,
    pub y: f64,
    pub cell: f64,
    pub rows: usize,
    pub cols: usize,
}

impl BoardLayout {
    /// Fit a `rows` x `cols` board into the canvas left of the info panel,
    /// leaving one cell of padding on every side for the path margin.
    pub fn fit(width: f64, height: f64, rows: usize, cols: usize) -> Self {
        let avail_w = (width - PANEL_WIDTH).max(200.0);
        let avail_h = (height - 40.0).max(200.0);
        let cell = (avail_w / (cols + 2) as f64)
            .min(avail_h / (rows + 2) as f64)
            .clamp(16.0, 72.0);
        let board_h = cell * rows as f64;
        Self {
            x: cell,
            y: ((height - board_h) / 2.0).max(cell),
            cell,
            rows,
            cols,
        }
    }

    pub fn width(&self) -> f64 {
        self.cell * self.cols as f64
    }

    pub fn height(&self) -> f64 {
        self.cell * self.rows as f64
    }

    /// Top-left corner of a cell.
    pub fn cell_origin(&self, pos: Position) -> (f64, f64) {
        (
            self.x + pos.col as f64 * self.cell,
            self.y + pos.row as f64 * self.cell,
        )
    }

    /// Center of a cell or margin point, unclamped.
    pub fn center(&self, p: Point) -> (f64, f64) {
        (
            self.x + (f64::from(p.col) + 0.5) * self.cell,
            self.y + (f64::from(p.row) + 0.5) * self.cell,
        )
    }

    /// Center of `p` clamped onto the centers of the edge cells. Margin
    /// points are drawn there, marked with an arrow.
    pub fn visible_coord(&self, p: Point) -> (f64, f64) {
        let (x, y) = self.center(p);
        let half = self.cell / 2.0;
        (
            x.clamp(self.x + half, self.x + self.width() - half),
            y.clamp(self.y + half, self.y + self.height() - half),
        )
    }

    pub fn is_on_board(&self, p: Point) -> bool {
        p.row >= 0 && p.col >= 0 && (p.row as usize) < self.rows && (p.col as usize) < self.cols
    }

    /// Board cell under a canvas point.
    pub fn hit(&self, px: f64, py: f64) -> Option<Position> {
        let col = ((px - self.x) / self.cell).floor();
        let row = ((py - self.y) / self.cell).floor();
        if row < 0.0 || col < 0.0 || row >= self.rows as f64 || col >= self.cols as f64 {
            return None;
        }
        Some(Position::new(row as usize, col as usize))
    }
}

/// Rotation of the arrow drawn at `curr` when arriving from `prev`.
pub fn arrow_angle(prev: Point, curr: Point) -> f64 {
    f64::from(curr.row - prev.row).atan2(f64::from(curr.col - prev.col))
}

/// Render the complete game to canvas
pub fn render_game(
    ctx: &CanvasRenderingContext2d,
    state: &GameState,
    theme: &Theme,
    width: u32,
    height: u32,
    now_ms: f64,
) {
    let (w, h) = (f64::from(width), f64::from(height));
    let grid = state.session().grid();
    let layout = BoardLayout::fit(w, h, grid.rows(), grid.cols());

    // Clear background
    ctx.set_fill_style_str(&theme.background.as_css());
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_fill_style_str(&theme.board_bg.as_css());
    ctx.fill_rect(
        layout.x - layout.cell,
        layout.y - layout.cell,
        layout.width() + 2.0 * layout.cell,
        layout.height() + 2.0 * layout.cell,
    );

    let paused = state.screen() == ScreenState::Paused;
    if !paused {
        render_board(ctx, state, theme, &layout);
        render_path(ctx, state, theme, &layout);
    }
    render_info_panel(ctx, state, theme, &layout, w, now_ms);
    render_floats(ctx, state, theme, &layout, now_ms);

    match state.screen() {
        ScreenState::Playing => {}
        ScreenState::Paused => render_overlay(ctx, theme, w, h, "PAUSED", "Press P to resume", theme.message_text),
        ScreenState::Won => {
            render_confetti(ctx, state, now_ms);
            render_overlay(ctx, theme, w, h, "BOARD CLEARED", "Enter: next level   R: replay", theme.win_color);
        }
        ScreenState::TimeUp => {
            render_overlay(ctx, theme, w, h, "TIME'S UP", "Enter or R: new board", theme.lose_color)
        }
    }

    if let Some(msg) = state.message() {
        render_message(ctx, theme, &layout, msg);
    }
}

fn render_board(ctx: &CanvasRenderingContext2d, state: &GameState, theme: &Theme, layout: &BoardLayout) {
    let grid = state.session().grid();
    let selected = state.session().selected();
    let hint = state.hint();
    let cursor = state.cursor();
    let flash = state.flash();
    let inset = (layout.cell * 0.06).max(1.0);

    ctx.set_font(&format!("bold {}px {}", (layout.cell * 0.5).round(), FONT));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    for pos in grid.positions() {
        // Matched tiles stay visible while their path is shown.
        let tile = match grid.get(pos) {
            Some(Cell::Tile(tile)) => Some(tile),
            _ => flash
                .filter(|f| f.first == pos || f.second == pos)
                .map(|f| f.tile),
        };
        let (x, y) = layout.cell_origin(pos);
        let size = layout.cell - 2.0 * inset;

        if let Some(tile) = tile {
            ctx.set_fill_style_str(&theme.tile_bg.as_css());
            ctx.fill_rect(x + inset, y + inset, size, size);
            ctx.set_stroke_style_str(&theme.tile_border.as_css());
            ctx.set_line_width(1.0);
            ctx.stroke_rect(x + inset, y + inset, size, size);

            ctx.set_fill_style_str(&theme.tile_color(tile).as_css());
            let _ = ctx.fill_text(&tile.to_string(), x + layout.cell / 2.0, y + layout.cell / 2.0);
        }

        let outline = if selected == Some(pos) {
            Some((theme.selected, 3.0))
        } else if hint.is_some_and(|h| h.first == pos || h.second == pos) {
            Some((theme.hint, 3.0))
        } else if cursor == pos {
            Some((theme.cursor, 2.0))
        } else {
            None
        };
        if let Some((color, line)) = outline {
            ctx.set_stroke_style_str(&color.as_css());
            ctx.set_line_width(line);
            ctx.stroke_rect(x + inset, y + inset, size, size);
        }
    }
}

fn render_path(ctx: &CanvasRenderingContext2d, state: &GameState, theme: &Theme, layout: &BoardLayout) {
    let Some(flash) = state.flash() else {
        return;
    };
    let points = flash.path.points();
    if points.len() < 2 {
        return;
    }

    ctx.save();
    ctx.set_shadow_color("yellow");
    ctx.set_shadow_blur(15.0);
    ctx.set_stroke_style_str(&theme.path.as_css());
    ctx.set_line_width(2.0);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    ctx.begin_path();
    let (sx, sy) = layout.visible_coord(points[0]);
    ctx.move_to(sx, sy);
    for &p in &points[1..] {
        let (x, y) = layout.visible_coord(p);
        ctx.line_to(x, y);
    }
    ctx.stroke();

    ctx.set_fill_style_str("#ffffff");
    for pair in points.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if layout.is_on_board(curr) {
            continue;
        }
        let (x, y) = layout.visible_coord(curr);
        ctx.save();
        let _ = ctx.translate(x, y);
        let _ = ctx.rotate(arrow_angle(prev, curr));
        ctx.begin_path();
        ctx.move_to(ARROW[0].0, ARROW[0].1);
        ctx.line_to(ARROW[1].0, ARROW[1].1);
        ctx.line_to(ARROW[2].0, ARROW[2].1);
        ctx.close_path();
        ctx.fill();
        ctx.restore();
    }

    let last = points.len() - 1;
    for (i, &p) in points.iter().enumerate() {
        let (x, y) = layout.visible_coord(p);
        let color = if i == 0 || i == last {
            theme.path_end.as_css()
        } else {
            theme.path.as_css()
        };
        ctx.set_fill_style_str(&color);
        ctx.begin_path();
        let _ = ctx.arc(x, y, 4.0, 0.0, TAU);
        ctx.fill();
    }
    ctx.restore();
}

fn render_info_panel(
    ctx: &CanvasRenderingContext2d,
    state: &GameState,
    theme: &Theme,
    layout: &BoardLayout,
    width: f64,
    now_ms: f64,
) {
    let session = state.session();
    let settings = session.settings();
    let x = (layout.x + layout.width() + 2.0 * layout.cell).max(width - PANEL_WIDTH);
    let mut cy = layout.y - layout.cell;
    let line_h = 24.0;

    ctx.set_text_align("left");
    ctx.set_text_baseline("top");

    ctx.set_font(&format!("bold 18px {}", FONT));
    ctx.set_fill_style_str(&theme.message_text.as_css());
    let _ = ctx.fill_text(&session.level().to_string(), x, cy);
    cy += line_h;

    ctx.set_font(&format!("14px {}", FONT));
    ctx.set_fill_style_str(&theme.info_text.as_css());
    let _ = ctx.fill_text(session.level().description, x, cy);
    cy += line_h * 1.5;

    ctx.set_font(&format!("16px {}", FONT));
    let _ = ctx.fill_text(&format!("Score: {}", session.score()), x, cy);
    cy += line_h;
    let _ = ctx.fill_text(&format!("Difficulty: {}", settings.difficulty), x, cy);
    cy += line_h;
    let _ = ctx.fill_text(&format!("Pairs left: {}", session.grid().occupied_count() / 2), x, cy);
    cy += line_h;
    let secs = session.time_remaining().ceil() as u64;
    let _ = ctx.fill_text(&format!("Time: {:02}:{:02}", secs / 60, secs % 60), x, cy);
    cy += line_h;

    // Timer bar
    let bar_w = PANEL_WIDTH - 40.0;
    let fraction = session.time_fraction();
    ctx.set_fill_style_str(&theme.tile_bg.as_css());
    ctx.fill_rect(x, cy, bar_w, 10.0);
    let bar_color = if fraction < 0.25 { theme.timer_low } else { theme.timer_full };
    ctx.set_fill_style_str(&bar_color.as_css());
    ctx.fill_rect(x, cy, bar_w * fraction, 10.0);
    cy += line_h * 1.5;

    ctx.set_font(&format!("bold 16px {}", FONT));
    ctx.set_fill_style_str(&theme.message_text.as_css());
    let _ = ctx.fill_text("Controls", x, cy);
    cy += line_h;

    ctx.set_font(&format!("13px {}", FONT));
    ctx.set_fill_style_str(&theme.info_text.as_css());
    for line in [
        "Click/Enter  select",
        "Arrows/hjkl  move",
        "?            hint",
        "P            pause",
        "R            new board",
        "N            next level",
        "D            difficulty",
        "Esc          deselect",
    ] {
        let _ = ctx.fill_text(line, x, cy);
        cy += 18.0;
    }

    // Pulse the selection reminder so it is noticed.
    if session.selected().is_some() {
        let alpha = 0.6 + 0.4 * (now_ms / 300.0).sin().abs();
        ctx.set_fill_style_str(&theme.selected.as_css_alpha(alpha));
        let _ = ctx.fill_text("Pick its partner", x, cy + 8.0);
    }
}

fn render_floats(
    ctx: &CanvasRenderingContext2d,
    state: &GameState,
    theme: &Theme,
    layout: &BoardLayout,
    now_ms: f64,
) {
    let x = layout.x + layout.width() + 2.0 * layout.cell + 140.0;
    let base_y = layout.y + 60.0;
    ctx.set_font(&format!("bold 18px {}", FONT));
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    for (i, float) in state.floats().iter().enumerate() {
        if !float.is_visible(now_ms) {
            continue;
        }
        let age = float.age(now_ms);
        ctx.set_fill_style_str(&theme.win_color.as_css_alpha(1.0 - age));
        let _ = ctx.fill_text(&float.text, x, base_y + i as f64 * 22.0 - age * 30.0);
    }
}

fn render_message(ctx: &CanvasRenderingContext2d, theme: &Theme, layout: &BoardLayout, msg: &str) {
    ctx.set_font(&format!("16px {}", FONT));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let cx = layout.x + layout.width() / 2.0;
    let cy = layout.y + layout.height() + layout.cell / 2.0 + 4.0;

    let text_w = ctx.measure_text(msg).map(|m| m.width()).unwrap_or(msg.len() as f64 * 9.0);
    ctx.set_fill_style_str(&theme.background.as_css_alpha(0.8));
    ctx.fill_rect(cx - text_w / 2.0 - 8.0, cy - 13.0, text_w + 16.0, 26.0);
    ctx.set_fill_style_str(&theme.message_text.as_css());
    let _ = ctx.fill_text(msg, cx, cy);
}

fn render_overlay(
    ctx: &CanvasRenderingContext2d,
    theme: &Theme,
    width: f64,
    height: f64,
    title: &str,
    subtitle: &str,
    color: crate::theme::Color,
) {
    ctx.set_fill_style_str(&theme.background.as_css_alpha(0.75));
    ctx.fill_rect(0.0, height / 2.0 - 70.0, width, 140.0);

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(&format!("bold 42px {}", FONT));
    ctx.set_fill_style_str(&color.as_css());
    let _ = ctx.fill_text(title, width / 2.0, height / 2.0 - 20.0);

    ctx.set_font(&format!("16px {}", FONT));
    ctx.set_fill_style_str(&theme.info_text.as_css());
    let _ = ctx.fill_text(subtitle, width / 2.0, height / 2.0 + 30.0);
}

fn render_confetti(ctx: &CanvasRenderingContext2d, state: &GameState, now_ms: f64) {
    for piece in state.confetti().visible(now_ms) {
        ctx.save();
        let _ = ctx.translate(piece.x, piece.y);
        let _ = ctx.rotate(piece.rotation);
        ctx.set_fill_style_str(&piece.color.as_css());
        ctx.fill_rect(-piece.size / 2.0, -piece.size / 2.0, piece.size, piece.size);
        ctx.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn layout() -> BoardLayout {
        BoardLayout {
            x: 50.0,
            y: 50.0,
            cell: 50.0,
            rows: 4,
            cols: 6,
        }
    }

    #[test]
    fn test_visible_coord_clamps_margin_points() {
        let layout = layout();
        assert_eq!(layout.visible_coord(Point::new(0, 0)), (75.0, 75.0));
        assert_eq!(layout.visible_coord(Point::new(-1, 2)), (175.0, 75.0));
        assert_eq!(layout.visible_coord(Point::new(-2, -2)), (75.0, 75.0));
        assert_eq!(layout.visible_coord(Point::new(4, 6)), (325.0, 225.0));
    }

    #[test]
    fn test_hit() {
        let layout = layout();
        assert_eq!(layout.hit(51.0, 51.0), Some(Position::new(0, 0)));
        assert_eq!(layout.hit(349.0, 249.0), Some(Position::new(3, 5)));
        assert_eq!(layout.hit(49.0, 60.0), None);
        assert_eq!(layout.hit(350.0, 60.0), None);
        assert_eq!(layout.hit(60.0, 250.0), None);
    }

    #[test]
    fn test_is_on_board() {
        let layout = layout();
        assert!(layout.is_on_board(Point::new(3, 5)));
        assert!(!layout.is_on_board(Point::new(-1, 0)));
        assert!(!layout.is_on_board(Point::new(0, 6)));
    }

    #[test]
    fn test_arrow_angle() {
        let origin = Point::new(0, 0);
        assert_eq!(arrow_angle(origin, Point::new(0, 1)), 0.0);
        assert!((arrow_angle(origin, Point::new(1, 0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((arrow_angle(origin, Point::new(0, -1)) - PI).abs() < 1e-12);
        assert!((arrow_angle(origin, Point::new(-1, 0)) + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_fit_leaves_margin_and_panel() {
        let layout = BoardLayout::fit(1000.0, 700.0, 6, 8);
        assert!(layout.x >= layout.cell);
        assert!(layout.y >= layout.cell);
        assert!(layout.x + layout.width() + layout.cell <= 1000.0 - PANEL_WIDTH + 1e-9);
        assert!(layout.y + layout.height() + layout.cell <= 700.0 + 1e-9);
    }
}

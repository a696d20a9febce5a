use crate::app::{App, BoardGeometry, ScreenState, CELL_W};
use crate::stats::format_time;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use onet_core::{Cell, Direction, GameStatus, Point, Position};
use std::io;

/// Width reserved for the info panel to the right of the board.
const PANEL_W: u16 = 30;
/// Width of the timer bar in characters.
const TIMER_W: usize = 24;

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    let grid = app.session.grid();
    let mut geometry = BoardGeometry {
        x: 0,
        y: 2,
        rows: grid.rows(),
        cols: grid.cols(),
    };
    let (board_w, board_h) = geometry.size();
    let total_w = board_w + 2 + PANEL_W;
    geometry.x = if term_width > total_w {
        (term_width - total_w) / 2
    } else {
        0
    };
    app.geometry = geometry;

    render_board(stdout, app)?;
    render_path(stdout, app)?;
    render_info_panel(stdout, app, geometry.x + board_w + 2, geometry.y)?;
    render_controls(stdout, app, geometry.x, geometry.y + board_h + 1)?;

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    match app.screen_state {
        ScreenState::Won => render_end_banner(stdout, app, term_width, term_height, true)?,
        ScreenState::TimeUp => render_end_banner(stdout, app, term_width, term_height, false)?,
        ScreenState::Playing => {
            if app.session.status() == GameStatus::Paused {
                render_pause_banner(stdout, app)?;
            }
        }
    }

    render_confetti(stdout, app, term_width, term_height)?;

    execute!(stdout, Show, MoveTo(0, term_height.saturating_sub(1)))?;
    Ok(())
}

fn render_board(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let theme = &app.theme;
    let grid = app.session.grid();
    let geometry = app.geometry;
    let selected = app.session.selected();
    let hinted = |pos: Position| {
        app.hint
            .as_ref()
            .is_some_and(|h| h.first == pos || h.second == pos)
    };
    let paused = app.session.status() == GameStatus::Paused;

    for row in -1..=grid.rows() as i32 {
        for col in -1..=grid.cols() as i32 {
            let point = Point::new(row, col);
            let (x, y) = geometry.screen(point);
            execute!(stdout, MoveTo(x, y))?;

            let Some(pos) = grid.position_of(point) else {
                execute!(stdout, SetBackgroundColor(theme.margin), Print("   "))?;
                continue;
            };

            let bg = if selected == Some(pos) {
                theme.selected_bg
            } else if hinted(pos) {
                theme.hint_bg
            } else if app.cursor == pos && app.screen_state == ScreenState::Playing {
                theme.cursor_bg
            } else {
                theme.bg
            };

            match grid.get(pos) {
                // Hide the board while paused.
                Some(Cell::Tile(_)) if paused => {
                    execute!(stdout, SetBackgroundColor(bg), SetForegroundColor(theme.empty), Print(" ? "))?;
                }
                Some(Cell::Tile(tile)) => {
                    let letter = tile.to_char().unwrap_or('#');
                    execute!(
                        stdout,
                        SetBackgroundColor(bg),
                        SetForegroundColor(theme.tile_color(tile)),
                        Print(format!(" {} ", letter))
                    )?;
                }
                _ => {
                    execute!(stdout, SetBackgroundColor(bg), SetForegroundColor(theme.empty), Print(" · "))?;
                }
            }
        }
    }

    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

/// Draw the path of the last match over the board.
fn render_path(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let Some(flash) = &app.flash else {
        return Ok(());
    };
    let theme = &app.theme;
    let geometry = app.geometry;
    let grid = app.session.grid();

    // The matched tiles are already gone; show them where nothing slid in.
    for pos in [flash.first, flash.second] {
        if grid.is_empty(pos) {
            let (x, y) = geometry.screen(pos.into());
            let letter = flash.tile.to_char().unwrap_or('#');
            execute!(
                stdout,
                MoveTo(x, y),
                SetBackgroundColor(theme.selected_bg),
                SetForegroundColor(theme.tile_color(flash.tile)),
                Print(format!(" {} ", letter))
            )?;
        }
    }

    let points = flash.path.points();
    execute!(stdout, SetBackgroundColor(theme.bg), SetForegroundColor(theme.path))?;
    for i in 1..points.len().saturating_sub(1) {
        let (prev, here, next) = (points[i - 1], points[i], points[i + 1]);
        let (x, y) = geometry.screen(here);
        let glyph = match off_ring_arrow(&geometry, here) {
            Some(arrow) => format!(" {} ", arrow),
            None => segment(prev, here, next),
        };
        execute!(stdout, MoveTo(x, y), Print(glyph))?;
    }

    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

/// Arrow for a point that lies beyond the drawn ring, pointing the way the
/// path leaves the screen.
fn off_ring_arrow(geometry: &BoardGeometry, p: Point) -> Option<char> {
    if p.row < -1 {
        Some('↑')
    } else if p.row > geometry.rows as i32 {
        Some('↓')
    } else if p.col < -1 {
        Some('←')
    } else if p.col > geometry.cols as i32 {
        Some('→')
    } else {
        None
    }
}

/// Three-column glyph joining `here` to its neighbours.
fn segment(prev: Point, here: Point, next: Point) -> String {
    // Sides of `here` the path touches.
    let sides = [
        Direction::between(here, prev),
        Direction::between(here, next),
    ];
    let has = |d: Direction| sides.contains(&Some(d));

    let centre = match (has(Direction::Up), has(Direction::Down), has(Direction::Left), has(Direction::Right)) {
        (true, true, _, _) => '│',
        (_, _, true, true) => '─',
        (false, true, false, true) => '┌',
        (false, true, true, false) => '┐',
        (true, false, false, true) => '└',
        (true, false, true, false) => '┘',
        _ => '•',
    };
    let left = if has(Direction::Left) { '─' } else { ' ' };
    let right = if has(Direction::Right) { '─' } else { ' ' };
    let mut out = String::with_capacity(CELL_W as usize * 3);
    out.push(left);
    out.push(centre);
    out.push(right);
    out
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let session = &app.session;
    let settings = session.settings();
    let level = session.level();

    execute!(
        stdout,
        SetBackgroundColor(theme.bg),
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print("═══ ONET ═══")
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 2),
        SetForegroundColor(theme.fg),
        Print(format!("Level {}: {}", level.number, level.name)),
        MoveTo(x, y + 3),
        SetForegroundColor(theme.info),
        Print(level.description)
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 5),
        SetForegroundColor(theme.info),
        Print(format!("Difficulty: {:>10}", format!("{}", settings.difficulty))),
        MoveTo(x, y + 6),
        Print(format!("Score:      {:>10}", session.score())),
        MoveTo(x, y + 7),
        Print(format!("Best:       {:>10}", app.stats.best_score(settings.difficulty))),
        MoveTo(x, y + 8),
        Print(format!("Tiles left: {:>10}", session.grid().occupied_count()))
    )?;

    // Timer bar
    let fraction = session.time_fraction();
    let filled = (fraction * TIMER_W as f64).round() as usize;
    let bar_color = if fraction > 0.5 {
        theme.success
    } else if fraction > 0.2 {
        theme.key
    } else {
        theme.error
    };
    execute!(
        stdout,
        MoveTo(x, y + 10),
        SetForegroundColor(theme.info),
        Print(format!("Time:       {:>10}", format_time(session.time_remaining().ceil() as u64))),
        MoveTo(x, y + 11),
        SetForegroundColor(bar_color),
        Print("█".repeat(filled.min(TIMER_W))),
        SetForegroundColor(theme.empty),
        Print("░".repeat(TIMER_W - filled.min(TIMER_W)))
    )?;

    let rules = format!("Max turns {} / margin {}", settings.max_turns, settings.margin_width);
    execute!(
        stdout,
        MoveTo(x, y + 13),
        SetForegroundColor(theme.info),
        Print(rules)
    )?;

    if session.status() == GameStatus::Paused {
        execute!(stdout, MoveTo(x, y + 15), SetForegroundColor(theme.key), Print("PAUSED"))?;
    }

    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    execute!(stdout, SetBackgroundColor(theme.bg))?;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Enter/Click", "Select"),
        ("Esc", "Deselect"),
        ("?", "Hint"),
        ("p", "Pause"),
        ("r", "New board"),
        ("d", "Difficulty"),
        ("t", "Theme"),
        ("s/o", "Save/Load"),
        ("q", "Quit"),
    ];

    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        let cx = x + (col as u16) * 24;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(stdout: &mut io::Stdout, app: &App, msg: &str, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn render_pause_banner(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (w, h) = app.geometry.size();
    let text = " PAUSED - press p ";
    let x = app.geometry.x + w.saturating_sub(text.len() as u16) / 2;
    let y = app.geometry.y + h / 2;
    execute!(
        stdout,
        MoveTo(x, y),
        SetBackgroundColor(app.theme.selected_bg),
        SetForegroundColor(app.theme.fg),
        Print(text),
        SetBackgroundColor(app.theme.bg)
    )
}

fn render_end_banner(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
    won: bool,
) -> io::Result<()> {
    let theme = &app.theme;
    let level = app.session.level();
    let score = app.session.score();

    let mut lines: Vec<String> = Vec::new();
    if won {
        lines.push(format!("Level {} cleared!", level.number));
        if level.is_last() {
            lines.push("You finished every level!".to_string());
        }
    } else {
        lines.push("Time's up!".to_string());
    }
    lines.push(format!("Score: {}", score));
    if app.new_best {
        lines.push("New best score!".to_string());
    }
    lines.push(String::new());
    if won {
        let next = if level.is_last() { "play again" } else { "next level" };
        lines.push(format!("Enter: {}   r: replay level   q: quit", next));
    } else {
        lines.push("Enter/r: try again   q: quit".to_string());
    }

    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let x = term_width.saturating_sub(width) / 2;
    let y = term_height.saturating_sub(lines.len() as u16 + 2) / 2;
    let accent = if won { theme.success } else { theme.error };

    execute!(stdout, SetBackgroundColor(theme.selected_bg))?;
    for (i, line) in std::iter::once(String::new())
        .chain(lines)
        .chain(std::iter::once(String::new()))
        .enumerate()
    {
        let color = if i == 1 { accent } else { theme.fg };
        execute!(
            stdout,
            MoveTo(x, y + i as u16),
            SetForegroundColor(color),
            Print(format!("  {:<w$}  ", line, w = width as usize - 4))
        )?;
    }
    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

fn render_confetti(stdout: &mut io::Stdout, app: &App, term_width: u16, term_height: u16) -> io::Result<()> {
    if !app.confetti.is_active() {
        return Ok(());
    }
    for p in app.confetti.visible() {
        if p.is_visible(term_width, term_height) {
            execute!(
                stdout,
                MoveTo(p.x as u16, p.y as u16),
                SetForegroundColor(p.color),
                Print(p.char)
            )?;
        }
    }
    execute!(stdout, SetForegroundColor(Color::Reset))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_glyphs() {
        let p = |r, c| Point::new(r, c);
        assert_eq!(segment(p(0, 0), p(0, 1), p(0, 2)), "───");
        assert_eq!(segment(p(0, 0), p(1, 0), p(2, 0)), " │ ");
        // Coming from the left, turning down.
        assert_eq!(segment(p(0, 0), p(0, 1), p(1, 1)), "─┐ ");
        // Coming from below, turning right.
        assert_eq!(segment(p(1, 0), p(0, 0), p(0, 1)), " ┌─");
    }

    #[test]
    fn test_arrows_beyond_ring() {
        let g = BoardGeometry {
            x: 0,
            y: 0,
            rows: 3,
            cols: 4,
        };
        assert_eq!(off_ring_arrow(&g, Point::new(-2, 1)), Some('↑'));
        assert_eq!(off_ring_arrow(&g, Point::new(4, 1)), Some('↓'));
        assert_eq!(off_ring_arrow(&g, Point::new(1, 5)), Some('→'));
        assert_eq!(off_ring_arrow(&g, Point::new(-1, 1)), None);
    }
}

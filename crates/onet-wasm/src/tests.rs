//! Tests for the browser game state. None of these touch the DOM.

use crate::game::{GameState, ScreenState, PATH_FLASH_MS};
use onet_core::{Difficulty, GameSession, GameSettings, GameStatus, Grid, Position};

fn state_with(layout: &str, settings: GameSettings) -> GameState {
    let grid = Grid::from_layout(layout).unwrap();
    GameState::from_session(GameSession::from_grid(grid, settings))
}

fn state(layout: &str) -> GameState {
    state_with(layout, GameSettings::default())
}

fn at(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

/// Tick once per second from 0 through `secs`.
fn run_clock(state: &mut GameState, secs: u32) {
    for s in 0..=secs {
        state.tick(f64::from(s) * 1000.0);
    }
}

#[test]
fn test_game_state_new() {
    let state = GameState::new(GameSettings::default()).unwrap();
    assert_eq!(state.screen(), ScreenState::Playing);
    assert_eq!(state.cursor(), at(0, 0));
    assert_eq!(state.session().grid().rows(), 8);
    assert_eq!(state.session().grid().cols(), 14);
    assert!(state.message().is_none());
    assert!(!state.is_animating());
}

#[test]
fn test_cursor_navigation_wraps() {
    let mut state = state("AABB/CCDD");
    assert!(state.handle_key("ArrowUp", 0.0));
    assert_eq!(state.cursor(), at(1, 0));
    state.handle_key("h", 0.0);
    assert_eq!(state.cursor(), at(1, 3));
    state.handle_key("ArrowDown", 0.0);
    state.handle_key("l", 0.0);
    assert_eq!(state.cursor(), at(0, 0));
    assert!(!state.handle_key("x", 0.0));
}

#[test]
fn test_keyboard_match_shows_path() {
    let mut state = state("AABB/CCDD");
    run_clock(&mut state, 10);
    assert_eq!(state.session().time_remaining(), 80.0);

    state.handle_key("Enter", 10_000.0);
    assert_eq!(state.session().selected(), Some(at(0, 0)));
    state.handle_key("ArrowRight", 10_000.0);
    state.handle_key(" ", 10_000.0);

    assert_eq!(state.session().score(), 10);
    assert_eq!(state.session().time_remaining(), 86.0);
    assert!(state.session().grid().is_empty(at(0, 0)));
    assert_eq!(state.floats().len(), 1);
    assert_eq!(state.floats()[0].text, "+10");

    let flash = state.flash().unwrap();
    assert_eq!((flash.first, flash.second), (at(0, 0), at(0, 1)));
    assert_eq!(flash.path.len(), 2);

    state.tick(10_000.0 + PATH_FLASH_MS / 2.0);
    assert!(state.flash().is_some());
    state.tick(10_000.0 + PATH_FLASH_MS);
    assert!(state.flash().is_none());
}

#[test]
fn test_time_bonus_float_is_delayed() {
    let mut state = state("AABB/CCDD");
    state.tick(0.0);
    state.handle_cell_click(at(0, 0), 0.0);
    state.handle_cell_click(at(0, 1), 0.0);

    // 90 + 6 overflows the 90s clock by 6.
    assert_eq!(state.session().score(), 16);
    assert_eq!(state.session().time_remaining(), 91.0);
    let floats = state.floats();
    assert_eq!(floats.len(), 2);
    assert_eq!(floats[0].text, "+10");
    assert_eq!(floats[1].text, "+6 time bonus");
    assert!(!floats[1].is_visible(100.0));
    assert!(floats[1].is_visible(250.0));

    state.tick(2000.0);
    assert!(state.floats().is_empty());
}

#[test]
fn test_mismatch_and_no_path_messages() {
    let mut state = state("ABAB/CCDD");
    state.handle_cell_click(at(0, 0), 0.0);
    state.handle_cell_click(at(0, 1), 0.0);
    assert_eq!(state.message(), Some("Those tiles don't match"));
    assert_eq!(state.session().selected(), None);

    let settings = GameSettings {
        margin_width: 0,
        ..GameSettings::default()
    };
    let mut state = state_with("ABBA/BBBB", settings);
    state.handle_cell_click(at(0, 0), 0.0);
    state.handle_cell_click(at(0, 3), 0.0);
    assert_eq!(state.message(), Some("No path with at most 2 turns"));
    assert_eq!(state.session().score(), 0);
}

#[test]
fn test_message_expires() {
    let mut state = state("ABAB/CCDD");
    state.tick(0.0);
    state.handle_cell_click(at(0, 0), 0.0);
    state.handle_cell_click(at(0, 1), 0.0);
    state.tick(2900.0);
    assert!(state.message().is_some());
    state.tick(3000.0);
    assert!(state.message().is_none());
}

#[test]
fn test_escape_clears_selection_and_hint() {
    let mut state = state("AB/AB");
    state.handle_key("?", 0.0);
    let hint = state.hint().unwrap();
    assert_eq!((hint.first, hint.second), (at(0, 0), at(1, 0)));
    assert_eq!(state.cursor(), at(0, 0));

    state.handle_key("Enter", 0.0);
    assert_eq!(state.session().selected(), Some(at(0, 0)));
    assert!(state.hint().is_none());

    state.handle_key("Escape", 0.0);
    assert_eq!(state.session().selected(), None);
}

#[test]
fn test_click_outside_board_is_ignored() {
    let mut state = state("AB/AB");
    assert!(!state.handle_cell_click(at(5, 5), 0.0));
    assert!(state.handle_cell_click(at(1, 1), 0.0));
    assert_eq!(state.cursor(), at(1, 1));
    assert_eq!(state.session().selected(), Some(at(1, 1)));
}

#[test]
fn test_pause_stops_clock() {
    let mut state = state("AABB/CCDD");
    state.tick(0.0);
    state.handle_key("p", 0.0);
    assert_eq!(state.screen(), ScreenState::Paused);
    assert_eq!(state.message(), Some("Paused"));

    state.tick(1000.0);
    state.tick(2000.0);
    assert_eq!(state.session().time_remaining(), 90.0);
    assert!(!state.handle_key("Enter", 2000.0));
    assert!(!state.handle_cell_click(at(0, 0), 2000.0));

    state.handle_key("p", 2000.0);
    assert_eq!(state.screen(), ScreenState::Playing);
    state.tick(3000.0);
    assert_eq!(state.session().time_remaining(), 89.0);
}

#[test]
fn test_long_frame_gap_is_capped() {
    let mut state = state("AABB/CCDD");
    state.tick(0.0);
    state.tick(60_000.0);
    assert_eq!(state.session().time_remaining(), 89.0);
}

#[test]
fn test_clearing_board_wins_and_advances() {
    let mut state = state("AA");
    state.tick(0.0);
    state.handle_cell_click(at(0, 0), 0.0);
    state.handle_cell_click(at(0, 1), 0.0);

    assert_eq!(state.screen(), ScreenState::Won);
    assert_eq!(state.session().status(), GameStatus::Won);
    assert!(state.confetti().is_active());
    assert!(state.is_animating());

    // Board keys do nothing on the win screen.
    assert!(!state.handle_key("?", 100.0));

    assert!(state.handle_key("Enter", 100.0));
    assert_eq!(state.screen(), ScreenState::Playing);
    assert_eq!(state.session().level().number, 2);
    assert_eq!(state.session().score(), 0);
    assert!(!state.confetti().is_active());
    assert!(state.flash().is_none());
}

#[test]
fn test_time_up_then_restart() {
    let settings = GameSettings {
        initial_time: 2,
        ..GameSettings::default()
    };
    let mut state = state_with("AABB/CCDD", settings);
    state.handle_cell_click(at(0, 0), 0.0);
    run_clock(&mut state, 2);

    assert_eq!(state.screen(), ScreenState::TimeUp);
    assert_eq!(state.message(), Some("Time's up!"));
    assert_eq!(state.session().selected(), None);
    assert!(!state.handle_cell_click(at(1, 0), 2000.0));

    assert!(state.handle_key("r", 2000.0));
    assert_eq!(state.screen(), ScreenState::Playing);
    assert_eq!(state.session().time_remaining(), 2.0);
    assert_eq!(state.session().level().number, 1);
}

#[test]
fn test_next_level_key_wraps_after_last() {
    let settings = GameSettings {
        level: 4,
        ..GameSettings::default()
    };
    let mut state = state_with("AA", settings);
    state.handle_key("n", 0.0);
    assert_eq!(state.session().level().number, 1);
    assert_eq!(state.message(), Some("All levels complete! Back to level 1"));
}

#[test]
fn test_cycle_difficulty_flags_settings() {
    let mut state = state("AA");
    assert!(!state.take_settings_changed());
    state.handle_key("d", 0.0);
    assert_eq!(state.session().settings().difficulty, Difficulty::MediumPlus);
    assert_eq!(state.message(), Some("Difficulty: Medium+"));
    assert!(state.take_settings_changed());
    assert!(!state.take_settings_changed());
}

#[test]
fn test_apply_settings_deals_new_board() {
    let mut state = state("AA");
    let settings = GameSettings {
        rows: 3,
        cols: 5,
        ..GameSettings::default()
    };
    assert!(state.apply_settings(settings, 0.0));
    assert_eq!(state.session().grid().rows(), 3);
    assert_eq!(state.session().grid().cols(), 6);
    assert_eq!(state.session().grid().occupied_count(), 18);
}

#[test]
fn test_save_and_load_round_trip() {
    let mut state = state("AABB/CCDD");
    run_clock(&mut state, 5);
    state.handle_cell_click(at(1, 2), 5000.0);
    state.handle_cell_click(at(1, 3), 5000.0);

    let json = state.to_json();
    let loaded = GameState::from_json(&json).unwrap();
    assert_eq!(loaded.screen(), ScreenState::Paused);
    assert_eq!(loaded.cursor(), at(1, 3));
    assert_eq!(loaded.session().score(), state.session().score());
    assert_eq!(loaded.session().grid(), state.session().grid());
    assert_eq!(loaded.session().time_remaining(), 91.0);
}

#[test]
fn test_load_rejects_garbage() {
    assert!(GameState::from_json("not json").is_none());
    assert!(GameState::from_json("{}").is_none());
}

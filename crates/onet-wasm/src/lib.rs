//! WebAssembly Onet game rendered on a canvas
//!
//! The page forwards keyboard events, clicks and animation frames to
//! [`OnetGame`]; all game rules live in `onet-core`.

use onet_core::{Difficulty, GameSettings};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, Storage};

mod animations;
mod game;
mod render;
mod theme;

#[cfg(test)]
mod tests;

pub use game::GameState;
pub use theme::Theme;

/// localStorage key for the player's settings.
const SETTINGS_KEY: &str = "gameSettings";

// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

/// Settings saved in localStorage, or the defaults.
fn load_settings() -> GameSettings {
    let Some(json) = storage().and_then(|s| s.get_item(SETTINGS_KEY).ok().flatten()) else {
        return GameSettings::default();
    };
    match GameSettings::from_json(&json) {
        Ok(settings) => settings,
        Err(err) => {
            warn(&format!("ignoring saved settings: {}", err));
            GameSettings::default()
        }
    }
}

fn save_settings(settings: &GameSettings) {
    if let Some(storage) = storage() {
        if storage.set_item(SETTINGS_KEY, &settings.to_json()).is_err() {
            warn("could not save settings");
        }
    }
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct OnetGame {
    state: GameState,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    theme: Theme,
    width: u32,
    height: u32,
    dpr: f64, // Device pixel ratio for crisp rendering
}

#[wasm_bindgen]
impl OnetGame {
    /// Create a new game attached to a canvas element
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<OnetGame, JsValue> {
        let document = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let state = GameState::new(load_settings()).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let mut game = OnetGame {
            state,
            canvas,
            ctx,
            theme: Theme::dark(),
            width: 1000,
            height: 700,
            dpr: 1.0,
        };
        game.resize(1000, 700);
        Ok(game)
    }

    /// Handle keyboard input
    #[wasm_bindgen]
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        if event.ctrl_key() || event.meta_key() {
            return false;
        }
        let handled = self.state.handle_key(&event.key(), now());
        if self.state.take_settings_changed() {
            save_settings(self.state.session().settings());
        }
        self.render();
        handled
    }

    /// Handle a click at canvas coordinates (CSS pixels)
    #[wasm_bindgen]
    pub fn handle_click(&mut self, x: f64, y: f64) -> bool {
        let grid = self.state.session().grid();
        let layout = render::BoardLayout::fit(
            f64::from(self.width),
            f64::from(self.height),
            grid.rows(),
            grid.cols(),
        );
        let handled = match layout.hit(x, y) {
            Some(pos) => self.state.handle_cell_click(pos, now()),
            None => false,
        };
        self.render();
        handled
    }

    /// Update game state (call from requestAnimationFrame)
    #[wasm_bindgen]
    pub fn tick(&mut self) {
        self.state.tick(now());
        self.render();
    }

    /// Start a new game with the given difficulty ("EASY", "MEDIUM", ...)
    #[wasm_bindgen]
    pub fn new_game(&mut self, difficulty: &str) {
        let mut settings = self.state.session().settings().clone();
        match difficulty.parse::<Difficulty>() {
            Ok(d) => settings.difficulty = d,
            Err(err) => warn(&err.to_string()),
        }
        if self.state.apply_settings(settings, now()) {
            save_settings(self.state.session().settings());
        }
        self.render();
    }

    /// Set the color theme
    #[wasm_bindgen]
    pub fn set_theme(&mut self, theme_name: &str) {
        self.theme = Theme::from_name(theme_name);
        self.render();
    }

    /// Current settings as a plain object
    #[wasm_bindgen]
    pub fn get_settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state.session().settings()).map_err(JsValue::from)
    }

    /// Apply settings from a plain object, save them and deal a new board.
    /// Missing fields take their defaults; out-of-range values are clamped.
    #[wasm_bindgen]
    pub fn set_settings(&mut self, value: JsValue) -> Result<(), JsValue> {
        let settings: GameSettings = serde_wasm_bindgen::from_value(value)?;
        if self.state.apply_settings(settings, now()) {
            save_settings(self.state.session().settings());
        }
        self.render();
        Ok(())
    }

    /// Forget saved settings and start over with the defaults
    #[wasm_bindgen]
    pub fn restore_defaults(&mut self) {
        if let Some(storage) = storage() {
            let _ = storage.remove_item(SETTINGS_KEY);
        }
        self.state.apply_settings(GameSettings::default(), now());
        self.render();
    }

    /// Get current game state as JSON
    #[wasm_bindgen]
    pub fn get_state_json(&self) -> String {
        self.state.to_json()
    }

    /// Load game state from JSON
    #[wasm_bindgen]
    pub fn load_state_json(&mut self, json: &str) -> bool {
        match GameState::from_json(json) {
            Some(mut state) => {
                state.set_viewport(f64::from(self.width), f64::from(self.height));
                self.state = state;
                self.render();
                true
            }
            None => {
                warn("could not load saved game");
                false
            }
        }
    }

    #[wasm_bindgen]
    pub fn score(&self) -> u64 {
        self.state.session().score()
    }

    /// Seconds left on the clock
    #[wasm_bindgen]
    pub fn time_remaining(&self) -> f64 {
        self.state.session().time_remaining()
    }

    #[wasm_bindgen]
    pub fn level(&self) -> u8 {
        self.state.session().level().number
    }

    /// Toggle pause
    #[wasm_bindgen]
    pub fn toggle_pause(&mut self) {
        self.state.handle_key("p", now());
        self.render();
    }

    /// Check if paused
    #[wasm_bindgen]
    pub fn is_paused(&self) -> bool {
        self.state.screen() == game::ScreenState::Paused
    }

    /// Resize the game canvas
    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) {
        // Minimum sizes
        let width = width.max(600);
        let height = height.max(400);

        self.width = width;
        self.height = height;

        // Update dpr in case it changed (e.g., moving to different monitor)
        self.dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);

        // Set actual canvas resolution (scaled by dpr for crisp rendering)
        self.canvas.set_width((f64::from(width) * self.dpr) as u32);
        self.canvas.set_height((f64::from(height) * self.dpr) as u32);

        // Set CSS display size (logical pixels)
        let html_element: &HtmlElement = self.canvas.as_ref();
        let style = html_element.style();
        let _ = style.set_property("width", &format!("{}px", width));
        let _ = style.set_property("height", &format!("{}px", height));

        // Reset and scale context to account for dpr
        let _ = self.ctx.reset_transform();
        let _ = self.ctx.scale(self.dpr, self.dpr);

        self.state.set_viewport(f64::from(width), f64::from(height));
        self.render();
    }

    /// Get current width
    #[wasm_bindgen]
    pub fn get_width(&self) -> u32 {
        self.width
    }

    /// Get current height
    #[wasm_bindgen]
    pub fn get_height(&self) -> u32 {
        self.height
    }

    /// Render the game to canvas
    fn render(&self) {
        render::render_game(&self.ctx, &self.state, &self.theme, self.width, self.height, now());
    }
}

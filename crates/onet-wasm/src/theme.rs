//! Color themes for the browser UI

use onet_core::TileId;
use serde::{Deserialize, Serialize};

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn as_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn as_css_alpha(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

/// Color theme for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Page background
    pub background: Color,
    /// Board area behind the tiles
    pub board_bg: Color,
    /// Tile face
    pub tile_bg: Color,
    /// Tile outline
    pub tile_border: Color,
    /// Tile symbols, cycled by tile kind
    pub tile_text: [Color; 8],
    /// Selected tile outline
    pub selected: Color,
    /// Keyboard cursor outline
    pub cursor: Color,
    /// Hinted pair outline
    pub hint: Color,
    /// Connecting path
    pub path: Color,
    /// Path endpoints
    pub path_end: Color,
    /// Info panel text
    pub info_text: Color,
    /// Message text
    pub message_text: Color,
    /// Timer bar while time is plentiful
    pub timer_full: Color,
    /// Timer bar near the end
    pub timer_low: Color,
    /// Win banner color
    pub win_color: Color,
    /// Time-up banner color
    pub lose_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "high_contrast" | "high-contrast" => Self::high_contrast(),
            _ => Self::dark(),
        }
    }

    pub fn tile_color(&self, tile: TileId) -> Color {
        self.tile_text[tile.index() % self.tile_text.len()]
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            background: Color::new(24, 24, 32),
            board_bg: Color::new(32, 32, 44),
            tile_bg: Color::new(48, 48, 64),
            tile_border: Color::new(80, 90, 130),
            tile_text: [
                Color::new(255, 120, 120),
                Color::new(120, 220, 140),
                Color::new(110, 170, 255),
                Color::new(255, 210, 100),
                Color::new(220, 140, 255),
                Color::new(100, 230, 230),
                Color::new(255, 160, 80),
                Color::new(235, 235, 245),
            ],
            selected: Color::new(255, 193, 7),
            cursor: Color::new(70, 130, 220),
            hint: Color::new(100, 255, 150),
            path: Color::new(254, 255, 218),
            path_end: Color::new(115, 237, 119),
            info_text: Color::new(160, 160, 180),
            message_text: Color::new(255, 220, 100),
            timer_full: Color::new(90, 200, 120),
            timer_low: Color::new(255, 100, 100),
            win_color: Color::new(100, 255, 150),
            lose_color: Color::new(255, 100, 100),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            background: Color::new(245, 245, 250),
            board_bg: Color::new(232, 234, 242),
            tile_bg: Color::new(255, 255, 255),
            tile_border: Color::new(33, 150, 243),
            tile_text: [
                Color::new(200, 40, 40),
                Color::new(30, 140, 60),
                Color::new(30, 90, 200),
                Color::new(180, 120, 0),
                Color::new(140, 50, 180),
                Color::new(0, 130, 140),
                Color::new(200, 90, 20),
                Color::new(40, 40, 50),
            ],
            selected: Color::new(255, 193, 7),
            cursor: Color::new(30, 100, 200),
            hint: Color::new(50, 180, 80),
            path: Color::new(230, 150, 0),
            path_end: Color::new(40, 160, 60),
            info_text: Color::new(60, 60, 80),
            message_text: Color::new(180, 120, 0),
            timer_full: Color::new(50, 170, 80),
            timer_low: Color::new(220, 50, 50),
            win_color: Color::new(50, 180, 80),
            lose_color: Color::new(220, 50, 50),
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            background: Color::new(0, 0, 0),
            board_bg: Color::new(0, 0, 0),
            tile_bg: Color::new(20, 20, 20),
            tile_border: Color::new(255, 255, 255),
            tile_text: [
                Color::new(255, 0, 0),
                Color::new(0, 255, 0),
                Color::new(0, 255, 255),
                Color::new(255, 255, 0),
                Color::new(255, 0, 255),
                Color::new(80, 80, 255),
                Color::new(255, 255, 255),
                Color::new(255, 140, 0),
            ],
            selected: Color::new(255, 255, 0),
            cursor: Color::new(0, 160, 255),
            hint: Color::new(0, 255, 0),
            path: Color::new(255, 255, 0),
            path_end: Color::new(0, 255, 0),
            info_text: Color::new(200, 200, 200),
            message_text: Color::new(255, 255, 0),
            timer_full: Color::new(0, 255, 0),
            timer_low: Color::new(255, 0, 0),
            win_color: Color::new(0, 255, 0),
            lose_color: Color::new(255, 0, 0),
        }
    }
}

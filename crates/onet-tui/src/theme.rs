use crossterm::style::Color;
use onet_core::TileId;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Routing band around the board
    pub margin: Color,
    /// Empty board cell
    pub empty: Color,
    /// Tile faces, cycled by tile kind
    pub tiles: [Color; 8],
    /// Selected tile background
    pub selected_bg: Color,
    /// Keyboard cursor background
    pub cursor_bg: Color,
    /// Hinted pair background
    pub hint_bg: Color,
    /// Connecting path
    pub path: Color,
    /// Error color
    pub error: Color,
    /// Success color
    pub success: Color,
    /// Info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
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
            "high-contrast" | "high_contrast" | "contrast" => Self::high_contrast(),
            _ => Self::dark(),
        }
    }

    pub fn tile_color(&self, tile: TileId) -> Color {
        self.tiles[tile.index() % self.tiles.len()]
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            margin: Color::Rgb { r: 45, g: 48, b: 60 },
            empty: Color::Rgb { r: 60, g: 64, b: 80 },
            tiles: [
                Color::Rgb { r: 255, g: 120, b: 120 },
                Color::Rgb { r: 120, g: 220, b: 140 },
                Color::Rgb { r: 110, g: 170, b: 255 },
                Color::Rgb { r: 255, g: 210, b: 100 },
                Color::Rgb { r: 220, g: 140, b: 255 },
                Color::Rgb { r: 100, g: 230, b: 230 },
                Color::Rgb { r: 255, g: 160, b: 80 },
                Color::Rgb { r: 240, g: 240, b: 240 },
            ],
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            cursor_bg: Color::Rgb { r: 50, g: 55, b: 75 },
            hint_bg: Color::Rgb { r: 90, g: 80, b: 30 },
            path: Color::Rgb { r: 255, g: 230, b: 90 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            margin: Color::Rgb { r: 225, g: 226, b: 235 },
            empty: Color::Rgb { r: 190, g: 190, b: 205 },
            tiles: [
                Color::Rgb { r: 200, g: 40, b: 40 },
                Color::Rgb { r: 30, g: 140, b: 60 },
                Color::Rgb { r: 30, g: 90, b: 200 },
                Color::Rgb { r: 180, g: 120, b: 0 },
                Color::Rgb { r: 140, g: 50, b: 180 },
                Color::Rgb { r: 0, g: 130, b: 140 },
                Color::Rgb { r: 200, g: 90, b: 20 },
                Color::Rgb { r: 40, g: 40, b: 50 },
            ],
            selected_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            cursor_bg: Color::Rgb { r: 220, g: 224, b: 240 },
            hint_bg: Color::Rgb { r: 255, g: 235, b: 160 },
            path: Color::Rgb { r: 220, g: 120, b: 0 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            margin: Color::Rgb { r: 30, g: 30, b: 30 },
            empty: Color::Grey,
            tiles: [
                Color::Red,
                Color::Green,
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Blue,
                Color::White,
                Color::DarkYellow,
            ],
            selected_bg: Color::Blue,
            cursor_bg: Color::DarkGrey,
            hint_bg: Color::DarkMagenta,
            path: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }
}

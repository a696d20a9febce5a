use crate::{Cell, Grid, GridError, SettingsError, TileId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of distinct tile faces available.
pub const TILE_KINDS: usize = 26;

/// Difficulty controls how many distinct tile kinds are dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    MediumPlus,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 4] {
        [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::MediumPlus,
            Difficulty::Hard,
        ]
    }

    /// Distinct tile kinds on a board of this difficulty.
    pub fn tile_kinds(self) -> usize {
        match self {
            Difficulty::Easy => TILE_KINDS / 4,
            Difficulty::Medium => TILE_KINDS / 2,
            Difficulty::MediumPlus => TILE_KINDS * 4 / 5,
            Difficulty::Hard => TILE_KINDS,
        }
    }

    pub fn next(self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::MediumPlus,
            Difficulty::MediumPlus => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::MediumPlus => write!(f, "Medium+"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "mediumplus" | "medium+" => Ok(Difficulty::MediumPlus),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(SettingsError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Random board dealer.
pub struct Generator {
    rng: SimpleRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Deal a full board for `difficulty`.
    pub fn generate(&mut self, rows: usize, cols: usize, difficulty: Difficulty) -> Result<Grid, GridError> {
        self.deal(rows, cols, difficulty.tile_kinds())
    }

    /// Deal a full `rows` x `cols` board using the first `kinds` tile faces.
    ///
    /// Kinds are cycled in order, each receiving a random even number of
    /// tiles (2 to 8), or a single pair once the board is nearly full. The
    /// tiles are then shuffled and laid out row-major, so every kind always
    /// appears an even number of times.
    pub fn deal(&mut self, rows: usize, cols: usize, kinds: usize) -> Result<Grid, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyLayout);
        }
        let total = rows * cols;
        if total % 2 != 0 {
            return Err(GridError::OddCellCount { rows, cols });
        }
        let kinds = kinds.clamp(1, TILE_KINDS);

        let mut tiles: Vec<TileId> = Vec::with_capacity(total);
        let mut kind = 0usize;
        while tiles.len() < total {
            let tile = TileId((kind % kinds) as u8);
            let count = (self.rng.next_usize(4) + 1) * 2;
            let count = if tiles.len() + count > total { 2 } else { count };
            tiles.extend(std::iter::repeat(tile).take(count));
            kind += 1;
        }
        tiles.truncate(total);
        self.shuffle(&mut tiles);

        let cells = tiles.into_iter().map(Cell::Tile).collect();
        tracing::debug!(rows, cols, kinds, "dealt board");
        Ok(Grid::from_cells(rows, cols, cells))
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.next_usize(i + 1);
            slice.swap(i, j);
        }
    }
}

/// Small PCG-style generator; seeded from the OS so it also works in the browser.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fall back to a process-wide counter when no entropy source exists.
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        Self::with_seed(u64::from_le_bytes(seed_bytes))
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        xorshifted.rotate_right(rot) as u64
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn counts(grid: &Grid) -> HashMap<TileId, usize> {
        let mut counts = HashMap::new();
        for (_, tile) in grid.tiles() {
            *counts.entry(tile).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_difficulty_kinds() {
        let kinds: Vec<usize> = Difficulty::all().iter().map(|d| d.tile_kinds()).collect();
        assert_eq!(kinds, vec![6, 13, 20, 26]);
    }

    #[test]
    fn test_board_is_full_and_paired() {
        let mut generator = Generator::with_seed(42);
        for difficulty in Difficulty::all() {
            let grid = generator.generate(8, 14, difficulty).unwrap();
            assert_eq!(grid.occupied_count(), 8 * 14);
            let counts = counts(&grid);
            assert!(counts.len() <= difficulty.tile_kinds());
            assert!(counts.values().all(|n| n % 2 == 0));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = Generator::with_seed(9).generate(6, 8, Difficulty::Hard).unwrap();
        let b = Generator::with_seed(9).generate(6, 8, Difficulty::Hard).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_small_board_uses_first_kinds() {
        let grid = Generator::with_seed(1).deal(2, 2, 26).unwrap();
        let counts = counts(&grid);
        assert!(counts.keys().all(|t| t.index() < 2));
        assert!(counts.values().all(|n| n % 2 == 0));
    }

    #[test]
    fn test_rejects_odd_and_empty_boards() {
        let mut generator = Generator::with_seed(0);
        assert_eq!(
            generator.deal(3, 3, 6),
            Err(GridError::OddCellCount { rows: 3, cols: 3 })
        );
        assert_eq!(generator.deal(0, 4, 6), Err(GridError::EmptyLayout));
    }

    #[test]
    fn test_difficulty_parse_and_serde() {
        assert_eq!("medium-plus".parse::<Difficulty>().unwrap(), Difficulty::MediumPlus);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
        assert_eq!(serde_json::to_string(&Difficulty::MediumPlus).unwrap(), "\"MEDIUM_PLUS\"");
    }
}

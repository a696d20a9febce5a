//! Onet tile-matching engine.
//!
//! The crate is split into a small grid model, a breadth-first connectivity
//! solver that bounds the number of direction changes on a path, and the game
//! glue built on top of them (board generation, post-match gravity, levels,
//! settings and a single-player session).
//!
//! ```
//! use onet_core::{find_path, Grid, Position};
//!
//! let grid = Grid::from_layout("A.A").unwrap();
//! let path = find_path(&grid, Position::new(0, 0), Position::new(0, 2))
//!     .unwrap()
//!     .expect("straight corridor");
//! assert_eq!(path.turns(), 0);
//! ```

mod generator;
mod grid;
pub mod gravity;
mod level;
mod session;
mod settings;
mod solver;

pub use generator::{Difficulty, Generator, TILE_KINDS};
pub use gravity::Behavior;
pub use grid::{Cell, Grid, GridError, Point, Position, TileId};
pub use level::{Level, LEVELS};
pub use session::{GameSession, GameStatus, SelectOutcome, SessionSnapshot};
pub use settings::{GameSettings, SettingsError, MAX_COLS, MAX_ROWS, MIN_COLS, MIN_ROWS};
pub use solver::{find_path, Direction, Hint, Path, SolveError, Solver, SolverConfig};

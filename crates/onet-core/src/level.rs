use crate::Behavior;

/// A level and the board movement it applies after every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub number: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub behavior: Behavior,
}

pub const LEVELS: [Level; 4] = [
    Level {
        number: 1,
        name: "Classic",
        description: "Classic matching game",
        behavior: Behavior::Classic,
    },
    Level {
        number: 2,
        name: "Sliding Right",
        description: "Tiles slide right after matches",
        behavior: Behavior::SlideRight,
    },
    Level {
        number: 3,
        name: "Falling Down",
        description: "Tiles fall down after matches",
        behavior: Behavior::SlideDown,
    },
    Level {
        number: 4,
        name: "Sliding Left",
        description: "Tiles slide left after matches",
        behavior: Behavior::SlideLeft,
    },
];

impl Level {
    /// Look up a level by its 1-based number.
    pub fn get(number: u8) -> Option<Level> {
        LEVELS.iter().copied().find(|l| l.number == number)
    }

    pub fn first() -> Level {
        LEVELS[0]
    }

    pub fn is_last(&self) -> bool {
        usize::from(self.number) == LEVELS.len()
    }

    /// The following level; the last one wraps back to the first.
    pub fn next(&self) -> Level {
        if self.is_last() {
            Level::first()
        } else {
            Level::get(self.number + 1).unwrap_or_else(Level::first)
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {}: {}", self.number, self.name)
    }
}

use crate::{Point, Position, TileId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Orthogonal movement direction. The declaration order is the order in which
/// the solver explores neighbours, which decides the path returned when more
/// than one is admissible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Row/column delta of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    pub fn step(self, from: Point) -> Point {
        let (dr, dc) = self.delta();
        from.offset(dr, dc)
    }

    /// Direction of a single step from `from` to `to`, if they are neighbours.
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.step(from) == to)
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
        }
    }
}

/// A connecting route from source to target, both included. Consecutive points
/// are orthogonal neighbours; points may lie in the margin outside the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    points: Vec<Point>,
}

#[derive(Deserialize)]
struct RawPath {
    points: Vec<Point>,
}

impl TryFrom<RawPath> for Path {
    type Error = SolveError;

    fn try_from(raw: RawPath) -> Result<Self, Self::Error> {
        Path::try_from(raw.points)
    }
}

impl TryFrom<Vec<Point>> for Path {
    type Error = SolveError;

    /// Accepts at least two points where every step moves to a neighbour.
    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        if points.len() < 2 {
            return Err(SolveError::invalid(format!(
                "a path needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(w) = points.windows(2).find(|w| Direction::between(w[0], w[1]).is_none()) {
            return Err(SolveError::invalid(format!("{} and {} are not neighbours", w[0], w[1])));
        }
        Ok(Self { points })
    }
}

impl Path {
    pub(crate) fn new(points: Vec<Point>) -> Self {
        debug_assert!(points.len() >= 2);
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn source(&self) -> Point {
        self.points[0]
    }

    pub fn target(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points strictly between source and target.
    pub fn interior(&self) -> &[Point] {
        &self.points[1..self.points.len() - 1]
    }

    /// Direction of every step, in order.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.points
            .windows(2)
            .filter_map(|w| Direction::between(w[0], w[1]))
    }

    /// Number of direction changes along the path.
    pub fn turns(&self) -> usize {
        let dirs: Vec<Direction> = self.directions().collect();
        dirs.windows(2).filter(|w| w[0] != w[1]).count()
    }

    /// Source, every corner, and target: the polyline a renderer needs.
    pub fn waypoints(&self) -> Vec<Point> {
        let mut out = vec![self.source()];
        for (i, w) in self.points.windows(3).enumerate() {
            if Direction::between(w[0], w[1]) != Direction::between(w[1], w[2]) {
                out.push(self.points[i + 1]);
            }
        }
        out.push(self.target());
        out
    }
}

/// A connectable pair found on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub first: Position,
    pub second: Position,
    pub tile: TileId,
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    #[error("search aborted after {limit} expansions")]
    SearchBudgetExceeded { limit: usize },
}

impl SolveError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SolveError::InvalidArgument { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_json_round_trip() {
        let path = Path::new(vec![Point::new(0, 0), Point::new(-1, 0), Point::new(-1, 1)]);
        let json = serde_json::to_string(&path).unwrap();
        assert!(json.starts_with(r#"{"points":["#));
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert_eq!(back.turns(), 1);
    }

    #[test]
    fn test_path_json_rejects_broken_routes() {
        for json in [
            r#"{"points":[]}"#,
            r#"{"points":[{"row":0,"col":0}]}"#,
            r#"{"points":[{"row":0,"col":0},{"row":0,"col":2}]}"#,
            r#"{"points":[{"row":0,"col":0},{"row":1,"col":1}]}"#,
        ] {
            assert!(serde_json::from_str::<Path>(json).is_err(), "{}", json);
        }
    }

    #[test]
    fn test_path_from_points() {
        assert!(Path::try_from(vec![Point::new(2, 2), Point::new(2, 3)]).is_ok());
        assert!(matches!(
            Path::try_from(vec![Point::new(2, 2), Point::new(2, 2)]),
            Err(SolveError::InvalidArgument { .. })
        ));
    }
}

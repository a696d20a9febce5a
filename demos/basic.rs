//! Basic example of using the Onet engine

use onet_core::{find_path, Difficulty, GameSession, GameSettings, Generator, Grid, Position, SelectOutcome, Solver};

fn main() {
    // Deal a board
    println!("Dealing a Medium board...\n");
    let mut generator = Generator::new();
    let board = match generator.generate(6, 8, Difficulty::Medium) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("could not deal a board: {}", err);
            return;
        }
    };
    println!("{}", board);

    // Look for a playable pair
    let solver = Solver::new();
    match solver.find_hint(&board) {
        Some(hint) => {
            println!(
                "Hint: {} at {} and {} ({} turns)",
                hint.tile,
                hint.first,
                hint.second,
                hint.path.turns()
            );
            let corners: Vec<String> = hint.path.waypoints().iter().map(|p| p.to_string()).collect();
            println!("Route: {}\n", corners.join(" -> "));
        }
        None => println!("No playable pair on this board\n"),
    }

    // Parse a board and route through the margin
    println!("--- Routing around a blocked row ---\n");
    if let Ok(grid) = Grid::from_layout("ABBA/BBBB/..../....") {
        println!("{}", grid);
        match find_path(&grid, Position::new(0, 0), Position::new(0, 3)) {
            Ok(Some(path)) => {
                let points: Vec<String> = path.points().iter().map(|p| p.to_string()).collect();
                println!("Path: {}", points.join(" "));
            }
            Ok(None) => println!("No path"),
            Err(err) => println!("Query rejected: {}", err),
        }
    }

    // Play a few moves in a session
    println!("\n--- Playing hints until stuck ---\n");
    let settings = GameSettings {
        rows: 4,
        cols: 6,
        difficulty: Difficulty::Easy,
        ..GameSettings::default()
    };
    let Ok(mut session) = GameSession::new(settings) else {
        return;
    };
    while let Some(hint) = session.hint() {
        session.select(hint.first);
        if let SelectOutcome::Matched { points, .. } = session.select(hint.second) {
            println!("Matched {} for {} points", hint.tile, points);
        }
    }
    println!("\nStatus: {:?}, score {}", session.status(), session.score());
    println!("{}", session.grid());
}

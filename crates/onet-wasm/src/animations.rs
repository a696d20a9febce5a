//! Confetti and floating score text, driven by wall-clock milliseconds.

use crate::theme::Color;

/// Pieces of confetti in one celebration.
const CONFETTI_COUNT: usize = 450;
/// Floating score text lifetime.
const FLOAT_MS: f64 = 1500.0;

const CONFETTI_COLORS: [Color; 6] = [
    Color::new(255, 0, 0),
    Color::new(0, 255, 0),
    Color::new(0, 0, 255),
    Color::new(255, 255, 0),
    Color::new(255, 0, 255),
    Color::new(0, 255, 255),
];

/// Simple PRNG for animations
struct AnimRng {
    state: u64,
}

impl AnimRng {
    fn new(seed: u64) -> Self {
        Self { state: seed.wrapping_add(1) }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.state >> 33) ^ self.state) as u32
    }

    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX)
    }

    fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    fn gen_index(&mut self, len: usize) -> usize {
        self.next_u32() as usize % len
    }
}

/// One falling square of confetti. Positions are in canvas pixels.
#[derive(Debug, Clone)]
pub struct Piece {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Color,
    pub rotation: f64,
    /// Pixels per millisecond
    fall_speed: f64,
    drift: f64,
    spin: f64,
    delay_ms: f64,
    duration_ms: f64,
}

impl Piece {
    /// Fraction of the way through its fall at `elapsed_ms`, if started.
    fn progress(&self, elapsed_ms: f64) -> Option<f64> {
        let t = elapsed_ms - self.delay_ms;
        if t < 0.0 {
            None
        } else {
            Some(t / self.duration_ms)
        }
    }
}

/// Confetti burst over the whole canvas.
pub struct Confetti {
    pieces: Vec<Piece>,
    started_ms: f64,
    rng: AnimRng,
}

impl Confetti {
    pub fn new(seed: u64) -> Self {
        Self {
            pieces: Vec::new(),
            started_ms: 0.0,
            rng: AnimRng::new(seed),
        }
    }

    /// Start a new burst across a `width` x `height` canvas.
    pub fn start(&mut self, width: f64, height: f64, now_ms: f64) {
        self.started_ms = now_ms;
        self.pieces.clear();
        for _ in 0..CONFETTI_COUNT {
            let duration_ms = self.rng.gen_range(2000.0, 5000.0);
            self.pieces.push(Piece {
                x: self.rng.gen_range(0.0, width),
                y: -20.0,
                size: self.rng.gen_range(5.0, 15.0),
                color: CONFETTI_COLORS[self.rng.gen_index(CONFETTI_COLORS.len())],
                rotation: self.rng.gen_range(0.0, std::f64::consts::TAU),
                fall_speed: (height + 40.0) / duration_ms,
                drift: self.rng.gen_range(-0.05, 0.05),
                spin: self.rng.gen_range(-0.01, 0.01),
                delay_ms: self.rng.gen_range(0.0, 500.0),
                duration_ms,
            });
        }
    }

    pub fn stop(&mut self) {
        self.pieces.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.pieces.is_empty()
    }

    /// Move pieces to where they are at `now_ms`; finished pieces are dropped.
    pub fn update(&mut self, now_ms: f64) {
        let elapsed = now_ms - self.started_ms;
        self.pieces.retain(|p| p.progress(elapsed).map_or(true, |f| f < 1.0));
    }

    /// Pieces that are in flight at `now_ms`, positioned for drawing.
    pub fn visible(&self, now_ms: f64) -> Vec<Piece> {
        let elapsed = now_ms - self.started_ms;
        self.pieces
            .iter()
            .filter_map(|p| {
                let t = p.progress(elapsed)? * p.duration_ms;
                // Ease in: pieces accelerate as they fall.
                let eased = t * t / p.duration_ms;
                let mut piece = p.clone();
                piece.y = p.y + p.fall_speed * eased;
                piece.x = p.x + p.drift * t;
                piece.rotation = p.rotation + p.spin * t;
                Some(piece)
            })
            .collect()
    }
}

/// "+N" text that rises and fades next to the score.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub text: String,
    born_ms: f64,
}

impl FloatingText {
    pub fn new(text: String, born_ms: f64) -> Self {
        Self { text, born_ms }
    }

    /// 0.0 when born, 1.0 when expired.
    pub fn age(&self, now_ms: f64) -> f64 {
        ((now_ms - self.born_ms) / FLOAT_MS).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self, now_ms: f64) -> bool {
        now_ms - self.born_ms < FLOAT_MS
    }

    /// Alive and already born; texts can be queued to appear later.
    pub fn is_visible(&self, now_ms: f64) -> bool {
        now_ms >= self.born_ms && self.is_alive(now_ms)
    }
}

use rand::prelude::SliceRandom;
use rand::Rng;

use super::particles::{random_bright_color, Particle, CONFETTI_CHARS};

/// Frames of new confetti after a board is cleared (~3 s at 30 FPS).
const BURST_FRAMES: u32 = 90;

/// Falling confetti shown over the board when it is cleared.
pub struct Confetti {
    pub particles: Vec<Particle>,
    width: u16,
    height: u16,
    frames_left: u32,
}

impl Default for Confetti {
    fn default() -> Self {
        Self::new()
    }
}

impl Confetti {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            width: 80,
            height: 24,
            frames_left: 0,
        }
    }

    /// Start a burst across a `width` x `height` area.
    pub fn start(&mut self, width: u16, height: u16) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.frames_left = BURST_FRAMES;
        self.particles.clear();
    }

    pub fn stop(&mut self) {
        self.frames_left = 0;
        self.particles.clear();
    }

    pub fn is_active(&self) -> bool {
        self.frames_left > 0 || !self.particles.is_empty()
    }

    pub fn update(&mut self) {
        let height = self.height as f32;
        self.particles.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += 0.05;
            p.lifetime -= 0.033;
            p.lifetime > 0.0 && p.y < height + 2.0
        });

        if self.frames_left > 0 {
            self.frames_left -= 1;
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let mut rng = rand::thread_rng();
        for _ in 0..4 {
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width as f32),
                y: -1.0,
                vx: rng.gen_range(-0.5..0.5),
                vy: rng.gen_range(0.2..0.8),
                char: CONFETTI_CHARS.choose(&mut rng).copied().unwrap_or('*'),
                color: random_bright_color(),
                lifetime: rng.gen_range(2.0..4.0),
            });
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Particle> {
        let (width, height) = (self.width, self.height);
        self.particles
            .iter()
            .filter(move |p| p.is_visible(width, height))
    }
}

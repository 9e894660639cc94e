//! Order-flow particles travelling along latency arcs

use rand::Rng;

use crate::data::LatencyReading;
use crate::geo::{arc_control_point, quadratic_bezier, Vec3};

pub const MAX_PARTICLES: usize = 1000;

/// Chance per reading per frame of emitting a particle
const SPAWN_CHANCE: f64 = 0.1;

/// Arc lengths travelled per second
const TRAVEL_SPEED: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowColor {
    Green,
    Yellow,
    Red,
}

impl FlowColor {
    pub fn of(latency: f64) -> Self {
        if latency < 50.0 {
            FlowColor::Green
        } else if latency < 100.0 {
            FlowColor::Yellow
        } else {
            FlowColor::Red
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    start: Vec3,
    control: Vec3,
    end: Vec3,
    /// Position along the arc in 0..=1
    pub progress: f64,
    pub life: f64,
    pub max_life: f64,
    pub size: f64,
    pub color: FlowColor,
}

impl Particle {
    pub fn position(&self) -> Vec3 {
        quadratic_bezier(self.start, self.control, self.end, self.progress)
    }

    /// Size shrinks as the particle ages
    pub fn current_size(&self) -> f64 {
        self.size * (self.life / self.max_life).max(0.0)
    }
}

#[derive(Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self { particles: Vec::with_capacity(MAX_PARTICLES) }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Emit at most one particle per link; `endpoints` resolves a reading to its arc
    pub fn spawn<'a, R, F>(&mut self, links: impl IntoIterator<Item = &'a LatencyReading>, mut endpoints: F, rng: &mut R)
    where
        R: Rng,
        F: FnMut(&LatencyReading) -> Option<(Vec3, Vec3)>,
    {
        for reading in links {
            if rng.gen::<f64>() > SPAWN_CHANCE {
                continue;
            }
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let Some((start, end)) = endpoints(reading) else {
                continue;
            };
            self.particles.push(Particle {
                start,
                control: arc_control_point(start, end),
                end,
                progress: 0.0,
                life: 1.0,
                max_life: 1.0,
                size: 2.0 + rng.gen::<f64>() * 2.0,
                color: FlowColor::of(reading.latency),
            });
        }
    }

    /// Advance by `delta` seconds, dropping expired or arrived particles
    pub fn step(&mut self, delta: f64) {
        self.particles.retain_mut(|p| {
            p.life -= delta;
            if p.life <= 0.0 {
                return false;
            }
            p.progress += delta * TRAVEL_SPEED;
            p.progress < 1.0
        });
    }
}

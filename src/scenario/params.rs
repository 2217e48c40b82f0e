//! Randomized scenario parameters
//!
//! Every random decision a scenario needs is drawn here, up front, from a
//! seeded `Pcg32`. Drivers receive the resolved values and never touch an RNG,
//! which keeps a run a pure function of its seed.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::ScenarioKind;
use crate::settings::{Palette, Settings};
use crate::sim::{BallSpec, Cell, Pendulum, Ring, grid_positions};
use crate::Rgb;

/// Pre-drawn spawn values per pool
pub const SPAWN_POOL: usize = 256;
/// Property draws are redrawn while `gravity + friction / efficiency` exceeds this
pub const MAX_LOAD: f64 = 7.0;

/// A fixed pool of resolved draws consumed in order, wrapping around
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draws<T> {
    items: Vec<T>,
    next: usize,
}

impl<T: Clone> Draws<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, next: 0 }
    }

    pub fn fill<R: Rng + ?Sized>(rng: &mut R, count: usize, mut draw: impl FnMut(&mut R) -> T) -> Self {
        Self::new((0..count).map(|_| draw(rng)).collect())
    }

    /// Next value, or `None` for an empty pool
    pub fn take(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let item = self.items[self.next % self.items.len()].clone();
        self.next = (self.next + 1) % self.items.len();
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ring placement shared by the ring scenarios
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RingParams {
    pub center: DVec2,
    pub radius: f64,
    pub width: f64,
}

impl RingParams {
    fn draw<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> Self {
        Self {
            center: DVec2::new((settings.width / 2.0).floor(), (settings.height / 2.0).floor()),
            radius: randint(rng, settings.width / 3.0, settings.width / 2.0),
            width: randint(rng, 5.0, 20.0),
        }
    }

    pub fn build(&self, color: Rgb) -> Ring {
        Ring::new(self.center, self.radius, self.width, color)
    }
}

/// Color and launch velocity of a respawned countdown ball
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnDraw {
    pub color: Rgb,
    pub vel: DVec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownParams {
    pub ring: RingParams,
    /// Every ball starts from this spec
    pub ball: BallSpec,
    /// Bounces (bounce mode) or frames (time mode) before a ball settles
    pub threshold: u32,
    pub spawns: Draws<SpawnDraw>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButterflyParams {
    pub ring: RingParams,
    pub ball: BallSpec,
    /// One color per ball
    pub colors: Vec<Rgb>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicationParams {
    pub width: f64,
    pub height: f64,
    pub ball: BallSpec,
    /// Ball-ball bounces between spawns
    pub threshold: u32,
    pub spawn_x: Draws<f64>,
    pub colors: Draws<Rgb>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityWellParams {
    pub center: DVec2,
    pub attractor_radius: f64,
    pub strength: f64,
    pub balls: Vec<BallSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainReactionParams {
    pub cells: Vec<Cell>,
    pub activation_radius: f64,
    pub trigger: BallSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingChangeParams {
    pub ring: RingParams,
    pub ball: BallSpec,
    /// Multiplier applied on every ring hit (ball radius or ring radius)
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendulumWaveParams {
    pub pendulums: Vec<Pendulum>,
}

/// Resolved parameters for one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Params {
    BounceCountdown(CountdownParams),
    TimeCountdown(CountdownParams),
    Butterfly(ButterflyParams),
    Duplication(DuplicationParams),
    GravityWell(GravityWellParams),
    ChainReaction(ChainReactionParams),
    GrowingSphere(RingChangeParams),
    ShrinkingRing(RingChangeParams),
    PendulumWave(PendulumWaveParams),
}

impl Params {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Params::BounceCountdown(_) => ScenarioKind::BounceCountdown,
            Params::TimeCountdown(_) => ScenarioKind::TimeCountdown,
            Params::Butterfly(_) => ScenarioKind::Butterfly,
            Params::Duplication(_) => ScenarioKind::Duplication,
            Params::GravityWell(_) => ScenarioKind::GravityWell,
            Params::ChainReaction(_) => ScenarioKind::ChainReaction,
            Params::GrowingSphere(_) => ScenarioKind::GrowingSphere,
            Params::ShrinkingRing(_) => ScenarioKind::ShrinkingRing,
            Params::PendulumWave(_) => ScenarioKind::PendulumWave,
        }
    }

    /// Draw every parameter `kind` needs
    pub fn draw<R: Rng + ?Sized>(kind: ScenarioKind, rng: &mut R, settings: &Settings) -> Self {
        match kind {
            ScenarioKind::BounceCountdown => Params::BounceCountdown(draw_countdown(rng, settings, false)),
            ScenarioKind::TimeCountdown => Params::TimeCountdown(draw_countdown(rng, settings, true)),
            ScenarioKind::Butterfly => Params::Butterfly(draw_butterfly(rng, settings)),
            ScenarioKind::Duplication => Params::Duplication(draw_duplication(rng, settings)),
            ScenarioKind::GravityWell => Params::GravityWell(draw_gravity_well(rng, settings)),
            ScenarioKind::ChainReaction => Params::ChainReaction(draw_chain_reaction(rng, settings)),
            ScenarioKind::GrowingSphere => Params::GrowingSphere(draw_growing_sphere(rng, settings)),
            ScenarioKind::ShrinkingRing => Params::ShrinkingRing(draw_shrinking_ring(rng, settings)),
            ScenarioKind::PendulumWave => Params::PendulumWave(draw_pendulum_wave(rng, settings)),
        }
    }
}

/// Inclusive integer draw over float bounds
fn randint<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    let (lo, hi) = (lo as i64, hi as i64);
    if hi <= lo {
        return lo as f64;
    }
    rng.random_range(lo..=hi) as f64
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..hi)
}

/// `true` with probability `n / d`
fn one_in<R: Rng + ?Sized>(rng: &mut R, n: u32, d: u32) -> bool {
    rng.random_ratio(n, d)
}

fn pick_color<R: Rng + ?Sized>(rng: &mut R, palette: &Palette) -> Rgb {
    let colors = palette.entity_colors();
    colors.choose(rng).copied().unwrap_or(palette.primary)
}

/// `count` colors scattered around `base`
pub fn similar_colors<R: Rng + ?Sized>(rng: &mut R, base: Rgb, count: usize, variance: i32) -> Vec<Rgb> {
    let mut jitter = |c: u8| (c as i32 + rng.random_range(-variance..=variance)).clamp(0, 255) as u8;
    (0..count)
        .map(|_| Rgb(jitter(base.0), jitter(base.1), jitter(base.2)))
        .collect()
}

/// Redraw `draw` until the material load is tame
fn tame<R: Rng + ?Sized>(rng: &mut R, mut draw: impl FnMut(&mut R) -> BallSpec) -> BallSpec {
    loop {
        let spec = draw(rng);
        if spec.gravity + spec.friction / spec.efficiency <= MAX_LOAD {
            return spec;
        }
    }
}

fn velocity<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> DVec2 {
    DVec2::new(randint(rng, lo, hi), randint(rng, lo, hi))
}

fn draw_countdown<R: Rng + ?Sized>(rng: &mut R, settings: &Settings, timed: bool) -> CountdownParams {
    let ring = RingParams::draw(rng, settings);
    let (c, big_r) = (ring.center, ring.radius);

    let r = randint(rng, 10.0, 50.0);
    let trail = randint(rng, 0.0, 30.0) as usize;
    let x = randint(rng, c.x - big_r + r, c.x + big_r - r);
    let y_hi = if timed { c.y + big_r - r } else { c.y };
    let y = randint(rng, c.y - big_r + r, y_hi);
    let ball = BallSpec {
        color: settings.palette.primary,
        pos: DVec2::new(x, y),
        vel: velocity(rng, 2.0, 10.0),
        radius: r,
        gravity: uniform(rng, 0.2, 0.6),
        trail,
        fading: true,
        border: one_in(rng, 2, 3),
        efficiency: uniform(rng, 0.8, 1.1),
        friction: randint(rng, 0.0, 5.0),
    };

    let threshold = randint(rng, 1.0, 6.0) as u32;
    let threshold = if timed { threshold * settings.fps } else { threshold };

    let palette = settings.palette;
    let spawns = Draws::fill(rng, SPAWN_POOL, |rng| SpawnDraw {
        color: pick_color(rng, &palette),
        vel: velocity(rng, 0.0, 5.0),
    });

    CountdownParams {
        ring,
        ball,
        threshold,
        spawns,
    }
}

fn draw_butterfly<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> ButterflyParams {
    let ring = RingParams::draw(rng, settings);
    let (c, big_r) = (ring.center, ring.radius);
    let primary = settings.palette.primary;

    let ball = tame(rng, |rng| {
        let r = randint(rng, 15.0, 60.0);
        BallSpec {
            color: primary,
            pos: DVec2::new(
                randint(rng, c.x - big_r + r * 2.0, c.x + big_r - r * 2.0),
                randint(rng, c.y - big_r + r * 2.0, c.y),
            ),
            vel: velocity(rng, 2.0, 10.0),
            radius: r,
            gravity: uniform(rng, 0.4, 0.7),
            trail: randint(rng, 0.0, 10.0) as usize,
            fading: one_in(rng, 3, 4),
            border: one_in(rng, 1, 4),
            efficiency: uniform(rng, 0.95, 1.0),
            friction: randint(rng, 0.0, 5.0),
        }
    });

    let count = randint(rng, 10.0, 50.0) as usize;
    let colors = similar_colors(rng, primary, count, 40);
    ButterflyParams { ring, ball, colors }
}

fn draw_duplication<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> DuplicationParams {
    let (width, height) = settings.half_size();

    let fading = one_in(rng, 3, 4);
    let border = one_in(rng, 1, 4);
    let gravity = uniform(rng, 0.5, 1.0);
    let friction = randint(rng, 0.0, 5.0);
    let r = randint(rng, 10.0, 30.0);

    let ball = BallSpec {
        color: settings.palette.primary,
        pos: DVec2::new(
            randint(rng, r * 3.0, width - r * 3.0),
            randint(rng, r * 3.0, height - r * 3.0),
        ),
        vel: DVec2::new(randint(rng, 3.0, 10.0), randint(rng, 1.0, 5.0)),
        radius: r,
        gravity,
        trail: randint(rng, 0.0, 10.0) as usize,
        fading,
        border,
        efficiency: 0.9,
        friction,
    };

    let threshold = randint(rng, 4.0, 10.0) as u32;
    let spawn_x = Draws::fill(rng, SPAWN_POOL, |rng| randint(rng, r + 1.0, width - r - 1.0));
    let palette = settings.palette;
    let colors = Draws::fill(rng, SPAWN_POOL, |rng| pick_color(rng, &palette));

    DuplicationParams {
        width,
        height,
        ball,
        threshold,
        spawn_x,
        colors,
    }
}

fn draw_gravity_well<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> GravityWellParams {
    let center = DVec2::new((settings.width / 2.0).floor(), (settings.height / 2.0).floor());
    let attractor_radius = randint(rng, 25.0, 45.0);
    let strength = uniform(rng, 800.0, 2000.0);

    let count = randint(rng, 5.0, 15.0) as usize;
    let colors = similar_colors(rng, settings.palette.primary, count, 40);
    let r = randint(rng, 6.0, 14.0);

    let balls = colors
        .into_iter()
        .map(|color| {
            let angle = uniform(rng, 0.0, TAU);
            let dist = randint(rng, 150.0, 400.0);
            let speed = uniform(rng, 3.0, 7.0);
            let (sin, cos) = angle.sin_cos();
            // Tangential launch for an orbit
            let vel = DVec2::new(
                -speed * sin + uniform(rng, -0.5, 0.5),
                speed * cos + uniform(rng, -0.5, 0.5),
            );
            BallSpec {
                color,
                pos: center + DVec2::new(cos, sin) * dist,
                vel,
                radius: r,
                gravity: 0.0,
                trail: randint(rng, 30.0, 80.0) as usize,
                fading: true,
                border: false,
                efficiency: 1.0,
                friction: 0.0,
            }
        })
        .collect();

    GravityWellParams {
        center,
        attractor_radius,
        strength,
        balls,
    }
}

fn draw_chain_reaction<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> ChainReactionParams {
    use crate::sim::chain::{ACTIVATION_RADIUS_FACTOR, GRID_SPACING_FACTOR};

    let cell_r = randint(rng, 18.0, 28.0);
    let palette = settings.palette;
    let cells = grid_positions(settings.width, settings.height, cell_r)
        .into_iter()
        .map(|pos| Cell::new(pos, cell_r, pick_color(rng, &palette)))
        .collect();
    let activation_radius = cell_r * GRID_SPACING_FACTOR * ACTIVATION_RADIUS_FACTOR;

    let trigger = BallSpec {
        color: palette.accent,
        pos: DVec2::new((settings.width / 2.0).floor(), 50.0),
        vel: DVec2::new(uniform(rng, -3.0, 3.0), uniform(rng, 4.0, 8.0)),
        radius: randint(rng, 12.0, 20.0),
        gravity: 0.3,
        trail: 20,
        fading: true,
        border: false,
        efficiency: 0.95,
        friction: 0.0,
    };

    ChainReactionParams {
        cells,
        activation_radius,
        trigger,
    }
}

fn draw_growing_sphere<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> RingChangeParams {
    let ring = RingParams::draw(rng, settings);
    let (c, big_r) = (ring.center, ring.radius);
    let primary = settings.palette.primary;

    let ball = tame(rng, |rng| {
        let r = randint(rng, 10.0, 50.0);
        let trail = match rng.random_range(0..4) {
            0 => randint(rng, 100.0, 1000.0),
            1 => randint(rng, 200.0, 1000.0),
            2 => randint(rng, 0.0, 20.0),
            _ => randint(rng, 0.0, 30.0),
        } as usize;
        BallSpec {
            color: primary,
            pos: DVec2::new(
                randint(rng, c.x - big_r + r, c.x + big_r - r),
                randint(rng, c.y - big_r + r, c.y),
            ),
            vel: velocity(rng, 2.0, 10.0),
            radius: r,
            gravity: uniform(rng, 0.2, 0.6),
            trail,
            fading: one_in(rng, 3, 4),
            border: if trail < 100 { one_in(rng, 1, 3) } else { true },
            efficiency: uniform(rng, 0.98, 1.01),
            friction: randint(rng, 0.0, 5.0),
        }
    });

    RingChangeParams {
        ring,
        ball,
        rate: uniform(rng, 1.01, 1.06),
    }
}

fn draw_shrinking_ring<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> RingChangeParams {
    let ring = RingParams::draw(rng, settings);
    let (c, big_r) = (ring.center, ring.radius);
    let primary = settings.palette.primary;

    let ball = tame(rng, |rng| {
        let r = randint(rng, 10.0, 50.0);
        BallSpec {
            color: primary,
            pos: DVec2::new(
                randint(rng, c.x - big_r + r, c.x + big_r - r),
                randint(rng, c.y - big_r + r, c.y),
            ),
            vel: velocity(rng, 2.0, 10.0),
            radius: r,
            gravity: uniform(rng, 0.5, 1.0),
            trail: randint(rng, 0.0, 50.0) as usize,
            fading: one_in(rng, 3, 4),
            border: one_in(rng, 1, 3),
            efficiency: uniform(rng, 0.98, 1.0),
            friction: 0.0,
        }
    });

    RingChangeParams {
        ring,
        ball,
        rate: uniform(rng, 0.98, 0.994),
    }
}

fn draw_pendulum_wave<R: Rng + ?Sized>(rng: &mut R, settings: &Settings) -> PendulumWaveParams {
    const MARGIN: f64 = 80.0;

    let count = randint(rng, 15.0, 20.0) as usize;
    let pivot_y = (settings.height * 0.15).floor();
    let min_len = (settings.height * 0.2).floor();
    let max_len = (settings.height * 0.55).floor();
    let angle = uniform(rng, 0.4, 0.8);
    let spacing = (settings.width - 2.0 * MARGIN) / (count.max(2) - 1) as f64;

    let palette = settings.palette;
    let pendulums = (0..count)
        .map(|i| {
            let t = i as f64 / (count.max(2) - 1) as f64;
            let pivot = DVec2::new((MARGIN + i as f64 * spacing).floor(), pivot_y);
            let length = min_len + (max_len - min_len) * t;
            let radius = randint(rng, 10.0, 16.0);
            Pendulum::new(pivot, length, angle, radius, palette.primary.lerp(palette.secondary, t))
        })
        .collect();

    PendulumWaveParams { pendulums }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_draws_wrap_around() {
        let mut draws = Draws::new(vec![1, 2, 3]);
        let taken: Vec<i32> = (0..5).filter_map(|_| draws.take()).collect();
        assert_eq!(taken, vec![1, 2, 3, 1, 2]);
        assert_eq!(Draws::<i32>::new(Vec::new()).take(), None);
    }

    #[test]
    fn test_same_seed_same_params() {
        let settings = Settings::default();
        for kind in ScenarioKind::ALL {
            let a = Params::draw(kind, &mut Pcg32::seed_from_u64(7), &settings);
            let b = Params::draw(kind, &mut Pcg32::seed_from_u64(7), &settings);
            assert_eq!(a.kind(), kind);
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );
        }
    }

    #[test]
    fn test_drawn_material_load_is_tame() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            if let Params::Butterfly(p) = Params::draw(ScenarioKind::Butterfly, &mut rng, &settings) {
                assert!(p.ball.gravity + p.ball.friction / p.ball.efficiency <= MAX_LOAD);
                assert!((10..=50).contains(&p.colors.len()));
            }
        }
    }

    #[test]
    fn test_countdown_ball_starts_inside_ring() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            if let Params::TimeCountdown(p) = Params::draw(ScenarioKind::TimeCountdown, &mut rng, &settings) {
                let ring = p.ring.build(Rgb::default());
                let d = (p.ball.pos - ring.center).abs();
                assert!(d.x + p.ball.radius <= ring.radius() + 1.0);
                assert!(d.y + p.ball.radius <= ring.radius() + 1.0);
                assert_eq!(p.threshold % settings.fps, 0);
            }
        }
    }

    #[test]
    fn test_similar_colors_stay_close() {
        let mut rng = Pcg32::seed_from_u64(5);
        let base = Rgb(128, 10, 250);
        for c in similar_colors(&mut rng, base, 100, 40) {
            assert!((c.0 as i32 - 128).abs() <= 40);
            assert!(c.1 <= 50);
            assert!(c.2 >= 210);
        }
    }
}

//! Procedural point-cloud generators.
//!
//! Each generator returns a flat `[x0, y0, z0, x1, ...]` buffer holding
//! exactly `3 × count` finite floats.

use crate::{
    constants::{
        FIREWORKS_EXTENT, FLOWER_BASE_RADIUS, FLOWER_PETALS, HEART_XY_SCALE, HEART_Y_OFFSET, HEART_Z_SCALE, KNOT_P,
        KNOT_Q, SPHERE_RADIUS,
    },
    utils::{centered_unit, safe_cast::usize_to_f32},
};
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Solid, volume-filled heart
pub fn heart<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    let mut out = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let t = rng.gen::<f32>() * TAU;
        let outline_x = 16.0 * t.sin().powi(3);
        let outline_y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();

        // cube-root ratios fill the volume evenly instead of crowding the centre
        let radial = rng.gen::<f32>().cbrt();
        let normalized_r = outline_x.hypot(outline_y) / 20.0;
        let max_depth = 10.0 * (1.0 - normalized_r.powf(0.8)).max(0.1).sqrt();
        let depth_ratio = rng.gen::<f32>().cbrt();
        let z = centered_unit(rng) * 2.0 * max_depth * depth_ratio;

        let mut x = outline_x * radial;
        let mut y = outline_y * radial;
        let smooth = (1.0 - y.abs() / 25.0).max(0.0);
        x *= 1.0 + smooth * 0.2;
        y *= 1.0 + smooth * 0.15;

        out.extend_from_slice(&[
            x * HEART_XY_SCALE,
            y * HEART_XY_SCALE + HEART_Y_OFFSET,
            z * HEART_Z_SCALE,
        ]);
    }
    out
}

/// Fibonacci sphere of radius 3; deterministic
#[must_use]
pub fn sphere(count: usize) -> Vec<f32> {
    let n = usize_to_f32(count);
    let spiral = (n * PI).sqrt();
    let mut out = Vec::with_capacity(count * 3);
    for i in 0..count {
        let phi = (-1.0 + 2.0 * usize_to_f32(i) / n).clamp(-1.0, 1.0).acos();
        let theta = spiral * phi;
        out.extend_from_slice(&[
            SPHERE_RADIUS * theta.cos() * phi.sin(),
            SPHERE_RADIUS * theta.sin() * phi.sin(),
            SPHERE_RADIUS * phi.cos(),
        ]);
    }
    out
}

/// Five-fold petal surface around a radius-2 sphere
pub fn flower<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    let mut out = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let theta = rng.gen::<f32>() * TAU;
        let phi = rng.gen::<f32>() * PI;
        let r = FLOWER_BASE_RADIUS + (FLOWER_PETALS * theta).sin() * (FLOWER_PETALS * phi).sin();
        out.extend_from_slice(&[
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        ]);
    }
    out
}

/// (3, 7) torus knot
pub fn knot<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    let mut out = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let u = rng.gen::<f32>() * TAU;
        let v = rng.gen::<f32>() * TAU;
        let r = 2.0 + (KNOT_Q * u / KNOT_P).cos() * 0.5;
        let tube = 2.0 + v.cos();
        out.extend_from_slice(&[r * u.cos() * tube, r * u.sin() * tube, r * v.sin()]);
    }
    out
}

/// Uniform scatter in a cube centred on the origin
pub fn fireworks<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    (0..count * 3)
        .map(|_| centered_unit(rng) * FIREWORKS_EXTENT)
        .collect()
}

//! The fixed world a render runs against.

use std::f64::consts::SQRT_2;

use noct_math::{DVec3, Ray};
use thiserror::Error;

use crate::{Color, MaterialKind, Sphere};

/// Errors that can occur while building a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Scene contains no primitives")]
    Empty,

    #[error("Sphere {index} has invalid radius {radius} (must be positive and finite)")]
    InvalidRadius { index: usize, radius: f64 },

    #[error("Sphere {index} has a non-finite {field}")]
    NonFinite { index: usize, field: &'static str },
}

/// The nearest intersection found by [`Scene::intersect`].
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// Distance along the ray
    pub t: f64,
    /// Position of the hit sphere in scene order
    pub index: usize,
    pub sphere: &'a Sphere,
}

/// An immutable, ordered collection of spheres.
#[derive(Debug, Clone)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    /// Validate and wrap a list of spheres.
    pub fn new(spheres: Vec<Sphere>) -> Result<Self, SceneError> {
        if spheres.is_empty() {
            return Err(SceneError::Empty);
        }

        for (index, sphere) in spheres.iter().enumerate() {
            sphere.validate(index)?;
            if sphere.max_albedo() > 1.0 {
                log::warn!(
                    "Sphere {} has albedo {:?} above 1, it will amplify energy",
                    index,
                    sphere.albedo
                );
            }
        }

        let scene = Self { spheres };
        log::debug!(
            "Built scene with {} spheres ({} emissive)",
            scene.len(),
            scene.iter().filter(|s| s.is_emissive()).count()
        );

        Ok(scene)
    }

    /// Moonlit landscape: a sky dome, a moon and three stars lighting a
    /// hill with a hut, a refractive pool and three distant mountains.
    pub fn night_sky() -> Result<Self, SceneError> {
        use MaterialKind::{Diffuse, Refractive};

        let door_offset = 8.0 * SQRT_2;
        Self::new(vec![
            // Moon
            Sphere::new(
                2.5e3,
                DVec3::new(0.82, 0.92, -2.0) * 1e4,
                Color::ONE * 0.8e2,
                Color::ZERO,
                Diffuse,
            ),
            // Sky
            Sphere::new(
                2.5e4,
                DVec3::new(50.0, 0.0, 0.0),
                Color::new(0.114, 0.133, 0.212) * 1e-2,
                Color::new(0.216, 0.384, 1.0) * 0.003,
                Diffuse,
            ),
            // Stars
            Sphere::new(
                5.0,
                DVec3::new(-0.2, 0.16, -1.0) * 1e4,
                Color::new(1.0, 0.843, 0.698) * 1e2,
                Color::ZERO,
                Diffuse,
            ),
            Sphere::new(
                5.0,
                DVec3::new(0.0, 0.18, -1.0) * 1e4,
                Color::new(1.0, 0.851, 0.710) * 1e2,
                Color::ZERO,
                Diffuse,
            ),
            Sphere::new(
                5.0,
                DVec3::new(0.3, 0.15, -1.0) * 1e4,
                Color::new(0.671, 0.780, 1.0) * 1e2,
                Color::ZERO,
                Diffuse,
            ),
            // Pool
            Sphere::new(
                3.5e4,
                DVec3::new(600.0, -3.5e4 + 1.0, 300.0),
                Color::ZERO,
                Color::new(0.6, 0.8, 1.0) * 0.01,
                Refractive,
            ),
            // Hill
            Sphere::new(
                5e4,
                DVec3::new(-500.0, -5e4, 0.0),
                Color::ZERO,
                Color::ONE * 0.35,
                Diffuse,
            ),
            // Hut
            Sphere::new(
                16.5,
                DVec3::new(27.0, 0.0, 47.0),
                Color::ZERO,
                Color::ONE * 0.33,
                Diffuse,
            ),
            // Door
            Sphere::new(
                7.0,
                DVec3::new(27.0 + door_offset, 0.0, 47.0 + door_offset),
                Color::ZERO,
                Color::ONE * 0.33,
                Diffuse,
            ),
            // Mountains
            Sphere::new(
                500.0,
                DVec3::new(-1e3, -300.0, -3e3),
                Color::ZERO,
                Color::ONE * 0.351,
                Diffuse,
            ),
            Sphere::new(
                830.0,
                DVec3::new(0.0, -500.0, -3e3),
                Color::ZERO,
                Color::ONE * 0.354,
                Diffuse,
            ),
            Sphere::new(
                490.0,
                DVec3::new(1e3, -300.0, -3e3),
                Color::ZERO,
                Color::ONE * 0.352,
                Diffuse,
            ),
        ])
    }

    /// Find the nearest sphere hit by `ray`.
    ///
    /// On an exact tie the sphere that comes first in scene order wins.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut closest: Option<Hit<'_>> = None;

        for (index, sphere) in self.spheres.iter().enumerate() {
            let Some(t) = sphere.intersect(ray) else {
                continue;
            };
            if closest.map_or(true, |best| t < best.t) {
                closest = Some(Hit { t, index, sphere });
            }
        }

        closest
    }

    /// Get a sphere by its position in scene order.
    pub fn get(&self, index: usize) -> Option<&Sphere> {
        self.spheres.get(index)
    }

    /// Iterate over the spheres in scene order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sphere> {
        self.spheres.iter()
    }

    /// Get the number of spheres.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Check if the scene is empty. Always false for a constructed scene.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

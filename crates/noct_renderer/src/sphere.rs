//! Sphere primitive for ray tracing.

use crate::{Color, MaterialKind, SceneError};
use noct_math::{DVec3, Interval, Ray};

/// Smallest accepted hit distance.
///
/// Keeps a secondary ray from re-hitting the surface it just left because of
/// rounding at its origin.
pub const HIT_EPSILON: f64 = 1e-4;

/// A sphere with its surface description.
///
/// Very large spheres stand in for ground planes, sky domes and backdrops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f64,
    pub center: DVec3,
    /// Light emitted by the surface, zero for anything that is not a light
    pub emission: Color,
    /// Per-channel reflectance
    pub albedo: Color,
    pub material: MaterialKind,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The radius is not checked here, see [`Sphere::validate`].
    pub const fn new(
        radius: f64,
        center: DVec3,
        emission: Color,
        albedo: Color,
        material: MaterialKind,
    ) -> Self {
        Self {
            radius,
            center,
            emission,
            albedo,
            material,
        }
    }

    /// Check that the sphere is usable, `index` is its position in the scene.
    pub fn validate(&self, index: usize) -> Result<(), SceneError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SceneError::InvalidRadius {
                index,
                radius: self.radius,
            });
        }
        let fields = [
            ("center", self.center),
            ("emission", self.emission),
            ("albedo", self.albedo),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SceneError::NonFinite { index, field });
        }
        Ok(())
    }

    /// Distance along `ray` to the nearest hit beyond [`HIT_EPSILON`].
    ///
    /// `ray.direction` must be unit length.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let op = self.center - ray.origin();
        let b = op.dot(ray.direction());
        let det = b * b - op.dot(op) + self.radius * self.radius;
        if det < 0.0 {
            return None;
        }

        let sqrtd = det.sqrt();
        let valid = Interval::new(HIT_EPSILON, f64::INFINITY);

        // Prefer the near root, fall back to the far one when inside
        [b - sqrtd, b + sqrtd]
            .into_iter()
            .find(|&t| valid.surrounds(t))
    }

    /// Outward unit normal at a point on the surface.
    #[inline]
    pub fn normal_at(&self, point: DVec3) -> DVec3 {
        (point - self.center).normalize()
    }

    /// Whether this sphere is a light source.
    pub fn is_emissive(&self) -> bool {
        self.emission.max_element() > 0.0
    }

    /// Largest albedo channel, the Russian roulette survival probability.
    #[inline]
    pub fn max_albedo(&self) -> f64 {
        self.albedo.max_element()
    }
}

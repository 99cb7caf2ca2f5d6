//! Core path tracing.
//!
//! Implements the recursive Monte Carlo radiance estimate with:
//! - Cosine-weighted diffuse bounces
//! - Perfect mirrors and Fresnel-weighted dielectrics
//! - Russian roulette past a configurable depth, plus a hard depth cap

use crate::sampling::{cosine_hemisphere, gen_f64};
use crate::{reflect, Color, Dielectric, Interface, MaterialKind, RenderError, Scene};
use noct_math::Ray;
use rand::RngCore;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Samples per sub-pixel (each pixel is split 2x2)
    pub samples: u32,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Depth above which Russian roulette may end a path
    pub rr_depth: u32,
    /// Hard recursion cap, paths return emission only at this depth
    pub max_depth: u32,
    /// Index of refraction for refractive spheres
    pub ior: f64,
    /// Constant term of the dielectric reflect/refract selection probability
    pub fresnel_bias: f64,
    /// Reflectance slope of the dielectric reflect/refract selection probability
    pub fresnel_scale: f64,
    /// Trace both dielectric branches while depth is below this value
    pub split_depth: Option<u32>,
    /// Distance secondary rays are pushed off the surface they leave
    pub surface_offset: f64,
    /// Base seed for the per-row generators
    pub seed: u64,
    /// Worker threads, `None` lets rayon decide
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: 4,
            width: 256,
            height: 192,
            rr_depth: 5,
            max_depth: 100,
            ior: 1.5,
            fresnel_bias: 0.25,
            fresnel_scale: 0.5,
            split_depth: None,
            surface_offset: 1e-4,
            seed: 0,
            threads: None,
        }
    }
}

impl RenderConfig {
    /// Set output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set samples per sub-pixel.
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Set the base RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Paths traced per pixel: `samples` for each of the 2x2 sub-pixels.
    pub fn samples_per_pixel(&self) -> u64 {
        u64::from(self.samples) * 4
    }

    /// Dielectric boundary described by this configuration.
    pub fn dielectric(&self) -> Dielectric {
        Dielectric {
            ior: self.ior,
            bias: self.fresnel_bias,
            scale: self.fresnel_scale,
        }
    }

    /// Check the configuration before any work is done.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples == 0 {
            return Err(RenderError::ZeroSamples);
        }
        if !self.ior.is_finite() || self.ior <= 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "index of refraction must be positive, got {}",
                self.ior
            )));
        }
        // The selection probability spans [bias, bias + scale] and both
        // branch weights divide by it
        let lowest = self.fresnel_bias;
        let highest = self.fresnel_bias + self.fresnel_scale;
        if !(self.fresnel_scale >= 0.0 && lowest > 0.0 && highest < 1.0) {
            return Err(RenderError::InvalidConfig(format!(
                "fresnel selection probability must stay inside (0, 1), got [{lowest}, {highest}]"
            )));
        }
        if !self.surface_offset.is_finite() || self.surface_offset < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "surface offset must be non-negative, got {}",
                self.surface_offset
            )));
        }
        if self.threads == Some(0) {
            return Err(RenderError::InvalidConfig(
                "thread count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters gathered while tracing paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathStats {
    /// Number of rays cast, one per `radiance` call
    pub rays: u64,
    /// Deepest recursion level reached
    pub max_depth: u32,
}

impl PathStats {
    #[inline]
    fn record(&mut self, depth: u32) {
        self.rays += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Combine counters from two sets of paths.
    pub fn merged(self, other: PathStats) -> PathStats {
        PathStats {
            rays: self.rays + other.rays,
            max_depth: self.max_depth.max(other.max_depth),
        }
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// `ray.direction` must be unit length. Camera rays start at depth 0.
pub fn radiance(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    stats: &mut PathStats,
) -> Color {
    stats.record(depth);

    // Nothing hit, the background is black
    let Some(hit) = scene.intersect(ray) else {
        return Color::ZERO;
    };

    let sphere = hit.sphere;
    let x = ray.at(hit.t);
    let n = sphere.normal_at(x);
    let nl = if n.dot(ray.direction()) < 0.0 { n } else { -n };
    let emission = sphere.emission;

    if depth >= config.max_depth {
        return emission;
    }

    let mut f = sphere.albedo;
    if depth > config.rr_depth {
        let p = sphere.max_albedo();
        if gen_f64(rng) < p {
            f /= p;
        } else {
            return emission;
        }
    }

    let next = depth + 1;
    let outside = x + nl * config.surface_offset;

    match sphere.material {
        MaterialKind::Diffuse => {
            let bounce = Ray::new(outside, cosine_hemisphere(nl, rng));
            emission + f * radiance(&bounce, scene, next, config, rng, stats)
        }
        MaterialKind::Specular => {
            let mirrored = Ray::new(outside, reflect(ray.direction(), n));
            emission + f * radiance(&mirrored, scene, next, config, rng, stats)
        }
        MaterialKind::Refractive => {
            let reflected = Ray::new(outside, reflect(ray.direction(), n));
            let dielectric = config.dielectric();

            let incoming = match dielectric.interact(ray.direction(), n, nl) {
                Interface::TotalInternalReflection => {
                    radiance(&reflected, scene, next, config, rng, stats)
                }
                Interface::Refraction {
                    direction,
                    reflectance,
                    transmittance,
                } => {
                    let refracted = Ray::new(x - nl * config.surface_offset, direction);

                    if config.split_depth.is_some_and(|split| depth < split) {
                        radiance(&reflected, scene, next, config, rng, stats) * reflectance
                            + radiance(&refracted, scene, next, config, rng, stats) * transmittance
                    } else {
                        let p = dielectric.reflect_probability(reflectance);
                        if gen_f64(rng) < p {
                            radiance(&reflected, scene, next, config, rng, stats)
                                * (reflectance / p)
                        } else {
                            radiance(&refracted, scene, next, config, rng, stats)
                                * (transmittance / (1.0 - p))
                        }
                    }
                }
            };

            emission + f * incoming
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sphere;
    use noct_math::DVec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// A closed glowing shell with one grey sphere in the middle.
    fn furnace(material: MaterialKind, albedo: Color) -> Scene {
        Scene::new(vec![
            Sphere::new(
                1e3,
                DVec3::ZERO,
                Color::ONE,
                Color::ZERO,
                MaterialKind::Diffuse,
            ),
            Sphere::new(10.0, DVec3::ZERO, Color::ZERO, albedo, material),
        ])
        .unwrap()
    }

    fn toward_center() -> Ray {
        Ray::new(DVec3::new(0.0, 0.0, 500.0), -DVec3::Z)
    }

    fn mean_radiance(scene: &Scene, ray: &Ray, config: &RenderConfig, n: u32) -> Color {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut stats = PathStats::default();
        let mut sum = Color::ZERO;
        for _ in 0..n {
            sum += radiance(ray, scene, 0, config, &mut rng, &mut stats);
        }
        sum / n as f64
    }

    #[test]
    fn test_miss_returns_black() {
        let scene = Scene::new(vec![Sphere::new(
            1.0,
            DVec3::new(0.0, 0.0, -5.0),
            Color::ONE * 10.0,
            Color::ONE,
            MaterialKind::Diffuse,
        )])
        .unwrap();
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut stats = PathStats::default();

        for _ in 0..100 {
            let direction = DVec3::new(rng.gen(), rng.gen::<f64>() + 0.1, rng.gen()).normalize();
            let ray = Ray::new(DVec3::ZERO, direction);
            assert_eq!(radiance(&ray, &scene, 0, &config, &mut rng, &mut stats), Color::ZERO);
        }
        assert_eq!(stats.rays, 100);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_emission_is_returned_directly() {
        let scene = furnace(MaterialKind::Diffuse, Color::ZERO);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 500.0), DVec3::Z);
        let mean = mean_radiance(&scene, &ray, &RenderConfig::default(), 16);

        // Looking straight at the shell: its emission plus nothing reflected
        assert!((mean - Color::ONE).abs().max_element() < 1e-12);
    }

    #[test]
    fn test_diffuse_does_not_amplify_energy() {
        let albedo = Color::new(0.6, 0.5, 0.3);
        let scene = furnace(MaterialKind::Diffuse, albedo);
        let mean = mean_radiance(&scene, &toward_center(), &RenderConfig::default(), 2_000);

        // Incoming radiance is 1 everywhere, so a bounce returns exactly albedo
        for (got, limit) in mean.to_array().into_iter().zip(albedo.to_array()) {
            assert!(got <= albedo.max_element() + 1e-9);
            assert!((got - limit).abs() < 1e-9);
        }
    }

    #[test]
    fn test_specular_does_not_amplify_energy() {
        let albedo = Color::new(0.9, 0.2, 0.45);
        let scene = furnace(MaterialKind::Specular, albedo);
        let mean = mean_radiance(&scene, &toward_center(), &RenderConfig::default(), 200);

        assert!(mean.max_element() <= albedo.max_element() + 1e-9);
        assert!((mean - albedo).abs().max_element() < 1e-9);
    }

    #[test]
    fn test_refractive_is_unbiased_in_furnace() {
        // A clear dielectric in a uniform environment returns the environment
        let scene = furnace(MaterialKind::Refractive, Color::ONE);
        let config = RenderConfig::default();

        let mean = mean_radiance(&scene, &toward_center(), &config, 4_000);
        assert!((mean - Color::ONE).abs().max_element() < 0.05, "mean was {mean:?}");

        let split = RenderConfig {
            split_depth: Some(2),
            ..RenderConfig::default()
        };
        let mean = mean_radiance(&scene, &toward_center(), &split, 1_000);
        assert!((mean - Color::ONE).abs().max_element() < 0.05, "mean was {mean:?}");
    }

    #[test]
    fn test_russian_roulette_reweights_survivors() {
        // Viewed from inside, a glowing grey shell converges to e / (1 - a)
        let scene = Scene::new(vec![Sphere::new(
            100.0,
            DVec3::ZERO,
            Color::ONE,
            Color::splat(0.5),
            MaterialKind::Diffuse,
        )])
        .unwrap();
        let config = RenderConfig {
            rr_depth: 0,
            ..RenderConfig::default()
        };
        let ray = Ray::new(DVec3::ZERO, -DVec3::Z);

        let mean = mean_radiance(&scene, &ray, &config, 200_000);
        assert!((mean - Color::splat(2.0)).abs().max_element() < 0.01, "mean was {mean:?}");
    }

    /// A glass ball between the camera and a light, with nothing behind the camera.
    fn lens_in_front_of_light() -> Scene {
        Scene::new(vec![
            Sphere::new(
                10.0,
                DVec3::ZERO,
                Color::ZERO,
                Color::ONE,
                MaterialKind::Refractive,
            ),
            Sphere::new(
                50.0,
                DVec3::new(0.0, 0.0, -200.0),
                Color::ONE,
                Color::ZERO,
                MaterialKind::Diffuse,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_fresnel_branches_are_reweighted() {
        // Head-on, both faces reflect R0 = 0.04. Light only arrives through
        // an even number of internal bounces: T^2 / (1 - R^2)
        let expected = 0.96 * 0.96 / (1.0 - 0.04 * 0.04);
        let scene = lens_in_front_of_light();

        let mean = mean_radiance(&scene, &toward_center(), &RenderConfig::default(), 40_000);
        assert!((mean - Color::splat(expected)).abs().max_element() < 0.02, "mean was {mean:?}");

        let split = RenderConfig {
            split_depth: Some(4),
            ..RenderConfig::default()
        };
        let mean = mean_radiance(&scene, &toward_center(), &split, 500);
        assert!((mean - Color::splat(expected)).abs().max_element() < 0.01, "mean was {mean:?}");
    }

    #[test]
    fn test_samples_per_pixel_does_not_overflow() {
        let config = RenderConfig::default().with_samples(u32::MAX);
        assert_eq!(config.samples_per_pixel(), u64::from(u32::MAX) * 4);
        assert_eq!(RenderConfig::default().samples_per_pixel(), 16);
    }

    #[test]
    fn test_terminates_within_depth_cap() {
        // Perfect mirrors inside a perfect mirror never lose energy, so
        // only the hard cap can stop these paths
        let mirror = |radius: f64, center: DVec3| {
            Sphere::new(radius, center, Color::ZERO, Color::ONE, MaterialKind::Specular)
        };
        let scene = Scene::new(vec![
            mirror(100.0, DVec3::ZERO),
            mirror(20.0, DVec3::new(30.0, 0.0, 0.0)),
            mirror(15.0, DVec3::new(-25.0, 10.0, 5.0)),
            Sphere::new(
                10.0,
                DVec3::new(0.0, -40.0, 0.0),
                Color::ZERO,
                Color::ONE,
                MaterialKind::Refractive,
            ),
            Sphere::new(
                8.0,
                DVec3::new(0.0, 40.0, 30.0),
                Color::ZERO,
                Color::splat(0.9),
                MaterialKind::Diffuse,
            ),
        ])
        .unwrap();
        let config = RenderConfig::default();

        for trial in 0..10_000u64 {
            let mut rng = StdRng::seed_from_u64(trial);
            let mut stats = PathStats::default();
            let direction = DVec3::new(
                rng.gen::<f64>() - 0.5,
                rng.gen::<f64>() - 0.5,
                rng.gen::<f64>() - 0.5,
            )
            .normalize();
            let ray = Ray::new(DVec3::new(0.0, 0.0, 60.0), direction);

            let color = radiance(&ray, &scene, 0, &config, &mut rng, &mut stats);
            assert!(color.is_finite());
            assert!(
                stats.max_depth <= config.max_depth,
                "trial {trial} reached depth {}",
                stats.max_depth
            );
        }
    }

    #[test]
    fn test_russian_roulette_stops_dark_paths() {
        // Zero albedo: every path past rr_depth is terminated immediately
        let scene = furnace(MaterialKind::Diffuse, Color::ZERO);
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut stats = PathStats::default();

        radiance(&toward_center(), &scene, 0, &config, &mut rng, &mut stats);
        assert_eq!(stats.max_depth, config.rr_depth + 1);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(RenderConfig::default().validate().is_ok());

        let zero_width = RenderConfig::default().with_resolution(0, 10);
        assert!(matches!(
            zero_width.validate(),
            Err(RenderError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            RenderConfig::default().with_samples(0).validate(),
            Err(RenderError::ZeroSamples)
        ));

        let bad_ior = RenderConfig {
            ior: 0.0,
            ..RenderConfig::default()
        };
        assert!(matches!(bad_ior.validate(), Err(RenderError::InvalidConfig(_))));

        let bad_fresnel = RenderConfig {
            fresnel_bias: 0.5,
            fresnel_scale: 0.5,
            ..RenderConfig::default()
        };
        assert!(matches!(bad_fresnel.validate(), Err(RenderError::InvalidConfig(_))));

        assert!(matches!(
            RenderConfig::default().with_threads(0).validate(),
            Err(RenderError::InvalidConfig(_))
        ));
    }
}

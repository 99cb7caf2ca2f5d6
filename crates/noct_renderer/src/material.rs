//! Material kinds and the scattering rules they select.

use noct_math::DVec3;

/// Color type alias (linear RGB, typically 0-1 for albedo)
pub type Color = DVec3;

/// How light interacts with a surface.
///
/// This is a closed set: the radiance estimator matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Ideal Lambertian reflector
    Diffuse,
    /// Perfect mirror
    Specular,
    /// Smooth dielectric (glass, water)
    Refractive,
}

/// Outcome of a ray meeting a dielectric boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interface {
    /// No transmitted direction exists, all light is reflected.
    TotalInternalReflection,
    /// Light splits between the mirror direction and `direction`.
    Refraction {
        /// Unit transmitted direction
        direction: DVec3,
        /// Fresnel reflectance (Schlick)
        reflectance: f64,
        /// `1 - reflectance`
        transmittance: f64,
    },
}

/// Smooth dielectric boundary between air (index 1) and a medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    /// Index of refraction of the medium
    pub ior: f64,
    /// Constant term of the reflect/refract selection probability
    pub bias: f64,
    /// Reflectance slope of the reflect/refract selection probability
    pub scale: f64,
}

impl Dielectric {
    /// Create a dielectric with the given index of refraction and the
    /// smallpt selection constants.
    pub fn new(ior: f64) -> Self {
        Self {
            ior,
            bias: 0.25,
            scale: 0.5,
        }
    }

    /// Work out reflection and transmission for a ray with unit direction `d`
    /// hitting a surface with outward normal `n`; `nl` is `n` oriented
    /// against `d`.
    pub fn interact(&self, d: DVec3, n: DVec3, nl: DVec3) -> Interface {
        let into = n.dot(nl) > 0.0;
        let (nc, nt) = (1.0, self.ior);
        let nnt = if into { nc / nt } else { nt / nc };
        let ddn = d.dot(nl);
        let cos2t = 1.0 - nnt * nnt * (1.0 - ddn * ddn);
        if cos2t < 0.0 {
            return Interface::TotalInternalReflection;
        }

        let sign = if into { 1.0 } else { -1.0 };
        let direction = (d * nnt - n * (sign * (ddn * nnt + cos2t.sqrt()))).normalize();

        let a = nt - nc;
        let b = nt + nc;
        let r0 = a * a / (b * b);
        let c = 1.0 - if into { -ddn } else { direction.dot(n) };
        let reflectance = r0 + (1.0 - r0) * c.powi(5);

        Interface::Refraction {
            direction,
            reflectance,
            transmittance: 1.0 - reflectance,
        }
    }

    /// Probability of following the reflected branch when only one branch
    /// is traced. Always inside (0, 1) for a validated configuration.
    #[inline]
    pub fn reflect_probability(&self, reflectance: f64) -> f64 {
        self.bias + self.scale * reflectance
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - n * 2.0 * n.dot(v)
}

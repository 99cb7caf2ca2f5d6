//! Nocturne math types.
//!
//! Everything is double precision: the built-in scenes place spheres with
//! radii up to 5e4 next to surfaces a few units across, and single precision
//! cannot resolve hits on those at the intersection epsilon.

// Re-export glam for convenience
pub use glam::*;

mod basis;
mod interval;
mod ray;

pub use basis::orthonormal_basis;
pub use interval::Interval;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_operations() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, DVec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, DVec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, DVec3::new(2.0, 4.0, 6.0));
        // Component-wise multiply is how colors are attenuated
        assert_eq!(a * b, DVec3::new(4.0, 10.0, 18.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(DVec3::X.cross(DVec3::Y), DVec3::Z);
    }

    #[test]
    fn test_dvec3_normalize() {
        let v = DVec3::new(3.0, 0.0, 4.0).normalize();
        assert!((v.length() - 1.0).abs() < 1e-12);
        assert!((v.x - 0.6).abs() < 1e-12);
    }
}

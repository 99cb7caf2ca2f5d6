//! Pinhole camera for primary rays.

use crate::RenderError;
use noct_math::{DVec3, Ray};

/// A fixed pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: DVec3,
    direction: DVec3,
    /// Half-extent of the image plane at unit distance, vertically
    fov_scale: f64,
    /// Distance primary rays travel before they start
    near: f64,
}

impl Camera {
    /// Create a camera at `origin` looking along `direction`.
    ///
    /// Uses the classic smallpt field of view and no near offset.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            fov_scale: 0.5135,
            near: 0.0,
        }
    }

    /// Set the field of view scale (0.5135 is roughly 55 degrees).
    pub fn with_fov_scale(mut self, fov_scale: f64) -> Self {
        self.fov_scale = fov_scale;
        self
    }

    /// Push ray origins `near` units forward, past geometry around the eye.
    pub fn with_near(mut self, near: f64) -> Self {
        self.near = near;
        self
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Reject poses the image plane cannot be built from.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.origin.is_finite() || self.direction == DVec3::ZERO {
            return Err(RenderError::InvalidConfig(
                "camera needs a finite origin and non-zero direction".to_string(),
            ));
        }
        if self.direction.cross(DVec3::Y).length_squared() < 1e-12 {
            return Err(RenderError::InvalidConfig(
                "camera cannot look straight up or down".to_string(),
            ));
        }
        if !(self.fov_scale.is_finite() && self.fov_scale > 0.0) || !self.near.is_finite() {
            return Err(RenderError::InvalidConfig(format!(
                "camera field of view {} or near distance {} is invalid",
                self.fov_scale, self.near
            )));
        }
        Ok(())
    }

    /// Image plane for a given resolution.
    ///
    /// The camera must have passed [`Camera::validate`].
    pub fn viewport(&self, width: u32, height: u32) -> Viewport {
        let aspect = width as f64 / height as f64;
        let right = self.direction.cross(DVec3::Y).normalize();
        let cx = right * (aspect * self.fov_scale);
        let cy = cx.cross(self.direction).normalize() * self.fov_scale;

        Viewport {
            origin: self.origin,
            direction: self.direction,
            cx,
            cy,
            near: self.near,
            width: width as f64,
            height: height as f64,
        }
    }
}

impl Default for Camera {
    /// The smallpt camera, looking down -Z with a slight downward tilt.
    fn default() -> Self {
        Self::new(DVec3::new(50.0, 52.0, 295.6), DVec3::new(0.0, -0.042612, -1.0)).with_near(140.0)
    }
}

/// Camera basis resolved for one image resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    origin: DVec3,
    direction: DVec3,
    cx: DVec3,
    cy: DVec3,
    near: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Primary ray through continuous image coordinates, with y = 0 at the
    /// bottom edge and (width / 2, height / 2) on the optical axis.
    pub fn ray(&self, x: f64, y: f64) -> Ray {
        let d = self.cx * (x / self.width - 0.5)
            + self.cy * (y / self.height - 0.5)
            + self.direction;
        Ray::new(self.origin + d * self.near, d.normalize())
    }
}

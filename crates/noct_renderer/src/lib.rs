//! Nocturne renderer - CPU path tracing over implicit spheres.
//!
//! A Monte Carlo path tracer in the smallpt tradition: a fixed table of
//! spheres, three closed material kinds, Russian roulette termination and
//! 2x2 tent-filtered supersampling. Rows are rendered in parallel with
//! rayon and reported to an observer as they complete.

mod camera;
mod driver;
mod image;
mod material;
mod observer;
mod renderer;
mod sampling;
mod scene;
mod sphere;

pub use camera::{Camera, Viewport};
pub use driver::{render, CancelToken, RenderError, RenderOutput, Renderer};
pub use image::{color_to_rgb, to_display, ImageBuffer, GAMMA};
pub use material::{reflect, Color, Dielectric, Interface, MaterialKind};
pub use observer::{FnObserver, NullObserver, RenderEvent, RenderObserver};
pub use renderer::{radiance, PathStats, RenderConfig};
pub use sampling::{cosine_hemisphere, row_rng, tent};
pub use scene::{Hit, Scene, SceneError};
pub use sphere::{Sphere, HIT_EPSILON};

/// Re-export the math types from noct_math
pub use noct_math::{DVec3, Interval, Ray};

//! Parallel render driver.
//!
//! Rows are independent: each one is rendered by a single rayon worker into
//! its own slice of the image with its own seeded generator. The only shared
//! state is the read-only scene, a progress counter and the cancel flag.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use crate::sampling::{row_rng, tent};
use crate::{
    color_to_rgb, radiance, Camera, Color, ImageBuffer, PathStats, RenderConfig, RenderEvent,
    RenderObserver, Scene, Viewport,
};

/// Errors that reject a render before it starts.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Sample count must be positive")]
    ZeroSamples,

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Shared flag asking a render to stop early.
///
/// Checked once before each row; a row that has started always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What a render produced.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Linear pixel values; rows that never ran are black
    pub image: ImageBuffer,
    pub completed_rows: u32,
    pub cancelled: bool,
    pub stats: PathStats,
    pub elapsed: Duration,
}

impl RenderOutput {
    /// Tone-mapped pixels in row-major order, top row first.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.image.to_rgb8()
    }

    /// Rays traced per second of wall time.
    pub fn rays_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.stats.rays as f64 / secs
        } else {
            0.0
        }
    }
}

/// Renders one scene through one camera.
pub struct Renderer {
    scene: Arc<Scene>,
    camera: Camera,
    config: RenderConfig,
    cancel: CancelToken,
}

impl Renderer {
    /// Create a renderer using the default camera.
    pub fn new(scene: Arc<Scene>, config: RenderConfig) -> Self {
        Self {
            scene,
            camera: Camera::default(),
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Set the camera.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Token that stops this renderer's current or next render.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Render the full image, reporting each finished row to `observer`.
    pub fn render(&self, observer: &dyn RenderObserver) -> Result<RenderOutput, RenderError> {
        self.config.validate()?;
        self.camera.validate()?;

        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.config.threads {
            pool = pool.num_threads(threads);
        }
        let pool = pool.build()?;

        let RenderConfig {
            width,
            height,
            samples,
            ..
        } = self.config;
        log::info!(
            "Rendering {}x{} @ {} spp ({} samples per sub-pixel) on {} threads",
            width,
            height,
            self.config.samples_per_pixel(),
            samples,
            pool.current_num_threads()
        );

        let viewport = self.camera.viewport(width, height);
        let mut image = ImageBuffer::new(width, height);
        let completed = AtomicU32::new(0);
        let start = Instant::now();

        let stats = pool.install(|| {
            image
                .pixels
                .par_chunks_mut(width as usize)
                .enumerate()
                .map(|(row, pixels)| {
                    if self.cancel.is_cancelled() {
                        return PathStats::default();
                    }

                    let row = row as u32;
                    let row_stats = self.render_row(&viewport, row, pixels);

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    observer.notify(RenderEvent::RowCompleted {
                        row,
                        pixels: pixels.iter().copied().map(color_to_rgb).collect(),
                    });
                    observer.notify(RenderEvent::Progress {
                        completed: done,
                        remaining: height - done,
                    });
                    log::debug!("Row {} done ({}/{})", row, done, height);

                    row_stats
                })
                .reduce(PathStats::default, PathStats::merged)
        });

        let elapsed = start.elapsed();
        let completed_rows = completed.into_inner();
        let cancelled = completed_rows < height;

        observer.notify(RenderEvent::Finished {
            completed_rows,
            cancelled,
        });

        let output = RenderOutput {
            image,
            completed_rows,
            cancelled,
            stats,
            elapsed,
        };
        if cancelled {
            log::warn!(
                "Render cancelled after {}/{} rows in {:.2?}",
                completed_rows,
                height,
                elapsed
            );
        } else {
            log::info!(
                "Rendered in {:.2?}, {} rays ({:.2} Mrays/s)",
                elapsed,
                output.stats.rays,
                output.rays_per_second() / 1e6
            );
        }

        Ok(output)
    }

    /// Render image row `row` (0 at the top) into `pixels`.
    fn render_row(&self, viewport: &Viewport, row: u32, pixels: &mut [Color]) -> PathStats {
        let RenderConfig {
            height,
            samples,
            seed,
            ..
        } = self.config;
        let mut rng = row_rng(seed, row);
        let mut stats = PathStats::default();
        let inv_samples = 1.0 / samples as f64;
        // Camera space has y pointing up
        let y = (height - 1 - row) as f64;

        for (x, pixel) in pixels.iter_mut().enumerate() {
            let x = x as f64;
            let mut color = Color::ZERO;

            // 2x2 sub-pixels, each a running mean of tent-jittered samples
            for sy in 0..2 {
                for sx in 0..2 {
                    let mut sub = Color::ZERO;
                    for _ in 0..samples {
                        let dx = tent(&mut rng);
                        let dy = tent(&mut rng);
                        let ray = viewport.ray(
                            (sx as f64 + 0.5 + dx) / 2.0 + x,
                            (sy as f64 + 0.5 + dy) / 2.0 + y,
                        );
                        sub += radiance(&ray, &self.scene, 0, &self.config, &mut rng, &mut stats)
                            * inv_samples;
                    }
                    color += sub;
                }
            }

            *pixel = color * 0.25;
        }

        stats
    }
}

/// Render `scene` through the default camera.
pub fn render(
    scene: Arc<Scene>,
    config: RenderConfig,
    observer: &dyn RenderObserver,
) -> Result<RenderOutput, RenderError> {
    Renderer::new(scene, config).render(observer)
}

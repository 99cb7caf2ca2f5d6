use clap::{Parser, ValueEnum};
use log::LevelFilter;
use noct_renderer::RenderConfig;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "noct_headless")]
#[command(about = "Render the built-in night scene without a window")]
pub struct Args {
    /// Samples per sub-pixel (each pixel has 2x2 sub-pixels)
    #[arg(long, short = 's', default_value_t = 4)]
    pub samples: u32,

    /// Image width in pixels
    #[arg(long, default_value_t = 256)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 192)]
    pub height: u32,

    /// Base seed for the per-row random generators
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Worker threads (defaults to one per core)
    #[arg(long, short = 'j')]
    pub threads: Option<usize>,

    /// Index of refraction of the pool
    #[arg(long, default_value_t = 1.5)]
    pub ior: f64,

    /// Trace both reflection and refraction below this depth
    #[arg(long)]
    pub split_depth: Option<u32>,

    /// Cancel the render after this many seconds
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Render settings described by these arguments.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            samples: self.samples,
            width: self.width,
            height: self.height,
            seed: self.seed,
            threads: self.threads,
            ior: self.ior,
            split_depth: self.split_depth,
            ..RenderConfig::default()
        }
    }
}

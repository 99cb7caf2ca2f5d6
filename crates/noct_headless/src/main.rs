use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use noct_renderer::{CancelToken, Color, RenderEvent, RenderOutput, Renderer, Scene};

mod cli;

use cli::Args;

/// Log progress in coarse steps so large images don't flood the output.
fn report_progress(events: Receiver<RenderEvent>) {
    let mut last_percent = 0;
    for event in events {
        match event {
            RenderEvent::Progress {
                completed,
                remaining,
            } => {
                let total = completed + remaining;
                let percent = (completed * 100).checked_div(total).unwrap_or(100);
                if percent >= last_percent + 10 || remaining == 0 {
                    last_percent = percent;
                    log::info!("{:>3}% ({}/{} rows)", percent, completed, total);
                }
            }
            RenderEvent::RowCompleted { .. } => {}
            RenderEvent::Finished {
                completed_rows,
                cancelled,
            } => {
                log::debug!(
                    "Render finished with {} rows (cancelled: {})",
                    completed_rows,
                    cancelled
                );
            }
        }
    }
}

/// Cancel `token` once `seconds` have passed.
fn spawn_watchdog(token: CancelToken, seconds: f64) -> Result<()> {
    let limit = Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("Invalid time limit {seconds}"))?;
    thread::Builder::new()
        .name("Watchdog".into())
        .spawn(move || {
            thread::sleep(limit);
            log::warn!("Time limit of {:.1?} reached, cancelling", limit);
            token.cancel();
        })
        .context("Failed to spawn watchdog thread")?;
    Ok(())
}

fn summarize(output: &RenderOutput) {
    let pixels = &output.image.pixels;
    let mean = pixels.iter().copied().sum::<Color>() / pixels.len().max(1) as f64;
    let brightest = pixels
        .iter()
        .map(|c| c.max_element())
        .fold(0.0_f64, f64::max);

    log::info!(
        "{} rays, deepest path {} bounces, {:.2} Mrays/s",
        output.stats.rays,
        output.stats.max_depth,
        output.rays_per_second() / 1e6
    );
    log::info!(
        "Mean radiance ({:.4}, {:.4}, {:.4}), brightest channel {:.4}",
        mean.x,
        mean.y,
        mean.z,
        brightest
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Nocturne headless render");

    let scene = Arc::new(Scene::night_sky().context("Built-in scene is invalid")?);
    let renderer = Renderer::new(scene, args.render_config());

    if let Some(seconds) = args.time_limit {
        spawn_watchdog(renderer.cancel_token(), seconds)?;
    }

    let (tx, rx) = channel();
    let reporter = thread::Builder::new()
        .name("Progress".into())
        .spawn(move || report_progress(rx))
        .context("Failed to spawn progress thread")?;

    let result = renderer.render(&tx);
    drop(tx);
    if reporter.join().is_err() {
        log::error!("Progress thread panicked");
    }

    let output = result.context("Render failed")?;
    summarize(&output);

    Ok(())
}

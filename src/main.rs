// src/main.rs

mod camera;
mod classification;
mod config;
mod decision;
mod detector;
mod error;
mod journal;
mod perf;
mod preprocessing;
mod projection;
mod render;
mod types;
mod zones;

use anyhow::{Context, Result};
use camera::{DepthSource, SyntheticCamera};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use detector::ObstacleDetector;
use journal::DecisionJournal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Progress line cadence, frames.
const PROGRESS_EVERY: u64 = 30;

const SCREENSHOT_DIR: &str = "screenshots";

#[derive(Parser, Debug)]
#[command(name = "depthnav", about = "Depth-camera obstacle avoidance decision loop")]
struct Args {
    /// Configuration file (YAML)
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the near depth threshold, meters
    #[arg(long)]
    near: Option<f32>,

    /// Override the far depth threshold, meters
    #[arg(long)]
    far: Option<f32>,

    /// Override the target loop rate, frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Disable visualization and screenshot rendering
    #[arg(long)]
    no_viz: bool,

    /// Append per-frame decisions to this JSONL file
    #[arg(long)]
    journal: Option<PathBuf>,
}

/// Everything the decision loop owns. No process-wide state.
struct DecisionSystem {
    config: types::Config,
    source: SyntheticCamera,
    detector: ObstacleDetector,
    journal: Option<DecisionJournal>,
    paused: bool,
    take_screenshot: bool,
    screenshot_count: u32,
}

impl DecisionSystem {
    fn new(config: types::Config) -> Result<Self> {
        let detector = ObstacleDetector::new(config.detector, &config.camera)
            .context("invalid detector configuration")?;
        let source = SyntheticCamera::new(&config.camera);
        let journal = match &config.runtime.journal_path {
            Some(path) => Some(DecisionJournal::open(Path::new(path))?),
            None => None,
        };
        Ok(Self {
            config,
            source,
            detector,
            journal,
            paused: false,
            take_screenshot: false,
            screenshot_count: 0,
        })
    }

    fn run(&mut self) -> Result<()> {
        self.source.initialize()?;
        info!(
            "🧭 Decision loop starting | near={:.2}m far={:.2}m res={:.2}m target={}fps",
            self.config.detector.depth_threshold_near,
            self.config.detector.depth_threshold_far,
            self.config.detector.grid_resolution,
            self.config.runtime.target_fps
        );
        info!("Keys: q=quit  p=pause  s=screenshot");

        let frame_budget = Duration::from_secs_f64(1.0 / self.config.runtime.target_fps.max(1) as f64);
        let started = Instant::now();

        loop {
            let iteration_start = Instant::now();

            match poll_key()? {
                Some(KeyCode::Char('q')) => {
                    info!("Quit requested");
                    break;
                }
                Some(KeyCode::Char('p')) => {
                    self.paused = !self.paused;
                    info!("{}", if self.paused { "⏸ Paused" } else { "▶ Resumed" });
                }
                Some(KeyCode::Char('s')) => self.take_screenshot = true,
                _ => {}
            }

            if self.paused {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }

            let Some(depth) = self.source.get_depth_meters() else {
                warn!("No depth frame available, skipping iteration");
                std::thread::sleep(frame_budget);
                continue;
            };

            let (mask, decision) = match self.detector.process(&depth) {
                Ok(result) => result,
                Err(e) if e.is_configuration() => return Err(e.into()),
                Err(e) => {
                    error!("Skipping frame: {e}");
                    continue;
                }
            };

            if let Some(journal) = &mut self.journal {
                journal.append(&decision)?;
            }

            if self.take_screenshot {
                self.take_screenshot = false;
                if self.config.runtime.enable_visualization {
                    let far = self.config.detector.depth_threshold_far;
                    let clean = preprocessing::clean_depth(
                        &depth,
                        self.config.detector.depth_threshold_near,
                        far,
                    );
                    let depth_img = render::render_depth(&clean, far);
                    let overlay = render::render_overlay(&clean, &mask, &decision, far);
                    let color_img = self.source.get_frame().map(|c| render::color_to_image(&c));
                    self.screenshot_count += 1;
                    render::save_screenshots(
                        Path::new(SCREENSHOT_DIR),
                        &depth_img,
                        &overlay,
                        color_img.as_ref(),
                        self.screenshot_count,
                    )?;
                } else {
                    warn!("Visualization disabled, screenshot ignored");
                }
            }

            if decision.frame_index % PROGRESS_EVERY == 0 {
                info!(
                    "Frame {} | {} | obstacles={} zones={} min_depth={} | {:.1}ms ({:.1} fps)",
                    decision.frame_index,
                    decision.suggested_direction.as_str(),
                    decision.obstacle_count,
                    decision.navigable_zones.len(),
                    if decision.min_depth.is_finite() {
                        format!("{:.2}m", decision.min_depth)
                    } else {
                        "-".to_string()
                    },
                    decision.processing_time * 1000.0,
                    self.detector.mean_fps().unwrap_or(0.0)
                );
            }

            let spent = iteration_start.elapsed();
            if spent < frame_budget {
                std::thread::sleep(frame_budget - spent);
            }
        }

        self.source.release();
        let elapsed = started.elapsed().as_secs_f64();
        info!("🏁 Decision loop stopped");
        info!("  Frames processed: {}", self.detector.frame_index());
        info!("  Elapsed: {:.1}s", elapsed);
        if elapsed > 0.0 {
            info!(
                "  Average loop rate: {:.1} fps",
                self.detector.frame_index() as f64 / elapsed
            );
        }
        if let Some(mean) = self.detector.mean_processing_time() {
            info!("  Mean processing time: {:.1}ms", mean * 1000.0);
        }
        Ok(())
    }
}

/// Non-blocking key read. Returns at most one pressed key per call.
fn poll_key() -> Result<Option<KeyCode>> {
    if event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key.code));
            }
        }
    }
    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = types::Config::load_or_default(&args.config)?;
    if let Some(near) = args.near {
        config.detector.depth_threshold_near = near;
    }
    if let Some(far) = args.far {
        config.detector.depth_threshold_far = far;
    }
    if let Some(fps) = args.fps {
        config.runtime.target_fps = fps;
    }
    if args.no_viz {
        config.runtime.enable_visualization = false;
    }
    if let Some(path) = &args.journal {
        config.runtime.journal_path = Some(path.display().to_string());
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!("depthnav={}", config.logging.level))
        .init();

    info!("🤖 Obstacle Avoidance Decision System Starting");

    let mut system = DecisionSystem::new(config)?;

    terminal::enable_raw_mode().context("enabling raw terminal mode")?;
    let result = system.run();
    terminal::disable_raw_mode().context("disabling raw terminal mode")?;
    result
}

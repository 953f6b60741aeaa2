//! Headless renderer: writes the orbit animation to numbered PNG files
//!
//! Usage: render-frames <frames> <out-dir> [scene.ron]

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use solar_raster::rasterizer::{Color, Device, RenderSettings, RenderStats, HEIGHT, WIDTH};
use solar_raster::world::{demo_scene, load_scene, OrbitAnimation, ORBIT_RADIUS, ORBIT_SPEED};

/// Simulated time between frames, in seconds
const FRAME_TIME: f32 = 1.0 / 30.0;

struct Args {
    frames: usize,
    out_dir: PathBuf,
    scene: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: render-frames <frames> <out-dir> [scene.ron]";

    let frames = args
        .next()
        .ok_or(usage)?
        .parse::<usize>()
        .map_err(|e| format!("bad frame count: {}", e))?;
    let out_dir = args.next().map(PathBuf::from).ok_or(usage)?;
    let scene = args.next().map(PathBuf::from);

    Ok(Args { frames, out_dir, scene })
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let (mut scene, settings) = match &args.scene {
        Some(path) => {
            let desc = load_scene(path)?;
            (desc.build()?, desc.settings)
        }
        None => (demo_scene(), RenderSettings::default()),
    };

    fs::create_dir_all(&args.out_dir)?;

    let mut device = Device::new(WIDTH, HEIGHT);
    let mut orbit = OrbitAnimation::new("earth", ORBIT_RADIUS, ORBIT_SPEED);
    let mut totals = RenderStats::default();

    let progress = ProgressBar::new(args.frames as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for index in 0..args.frames {
        orbit.apply(&mut scene);
        scene.prepare()?;

        device.clear(Color::BLACK);
        totals += device.render(&scene, &settings)?;
        device
            .present()
            .save_png(args.out_dir.join(format!("frame_{:04}.png", index)))?;

        orbit.advance(FRAME_TIME);
        progress.inc(1);
    }
    progress.finish();

    log::info!(
        "Wrote {} frames to {} ({} triangles drawn, {} skipped)",
        args.frames,
        args.out_dir.display(),
        totals.triangles_drawn,
        totals.triangles_skipped
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("render-frames: {}", e);
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use image::ImageReader;
use serde::Serialize;
use std::path::PathBuf;

use billiards_vision::render::{draw_detections, label_mask};
use billiards_vision::{BallsLocalization, Line, Localizer, LocalizerConfig, Point};

#[derive(Parser)]
#[command(name = "billiards-vision")]
#[command(about = "Locate the table, pockets and balls in a billiards frame")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON file overriding the default parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Write the per-pixel class map to this PNG
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,

    /// Write the frame with detections drawn on it to this image
    #[arg(long, value_name = "FILE")]
    overlay_out: Option<PathBuf>,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    width: u32,
    height: u32,
    holes: &'a [Point],
    lines: &'a [Line],
    balls: &'a BallsLocalization,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => LocalizerConfig::from_json_file(path)?,
        None => LocalizerConfig::default(),
    };

    log::info!("Loading image: {:?}", args.image_path);
    let frame = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?
        .to_rgb8();
    log::info!("Image loaded: {}x{}", frame.width(), frame.height());

    let mut localizer = Localizer::new(config);
    if let Some(debug_dir) = args.debug_out {
        localizer = localizer.with_debug(debug_dir)?;
    }

    let result = localizer.localize(&frame)?;

    if let Some(path) = &args.labels_out {
        label_mask(&result.field, &result.balls)
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to save labels {}: {}", path.display(), e))?;
    }
    if let Some(path) = &args.overlay_out {
        draw_detections(&frame, &result.field, &result.balls)
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to save overlay {}: {}", path.display(), e))?;
    }

    if args.json {
        let report = Report {
            width: frame.width(),
            height: frame.height(),
            holes: &result.field.holes,
            lines: &result.field.lines,
            balls: &result.balls,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let balls = &result.balls;
    println!("\n=== Table ===");
    println!("Pockets: {}", result.field.holes.len());
    for hole in &result.field.holes {
        println!("  ({}, {})", hole.x, hole.y);
    }

    println!("\n=== Balls ===");
    println!("Total balls detected: {}", balls.ball_count());
    for (label, ball) in balls.labeled() {
        println!(
            "  {:?} at ({:.1}, {:.1}) - radius: {:.1}",
            label, ball.circle.x, ball.circle.y, ball.circle.radius
        );
    }
    if balls.black.is_none() {
        println!("No eight-ball detected.");
    }

    Ok(())
}

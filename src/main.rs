use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use osm_boundaries::api::{build_boundary_query, fetch_overpass};
use osm_boundaries::config::{DEFAULT_ADMIN_LEVEL, DEFAULT_OUTPUT, FileConfig};
use osm_boundaries::domain::BBox;
use osm_boundaries::export::convert_boundaries;

/// Fetch OpenStreetMap administrative boundaries from Overpass and save them as GeoJSON
///
/// Examples:
///   # Kelurahan of Tanjungpinang into public/data/kelurahan_osm.json
///   osm-boundaries
///
///   # Kecamatan (admin_level 6) of another area
///   osm-boundaries --bbox -6.4,106.6,-6.1,107.0 --admin-level 6 -o jakarta.json
///
///   # Use a config file
///   osm-boundaries --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "osm-boundaries")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches osm-boundaries.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output GeoJSON file path (defaults to public/data/kelurahan_osm.json)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Bounding box as south,west,north,east (defaults to Tanjungpinang)
    #[arg(long, allow_hyphen_values = true)]
    bbox: Option<BBox>,

    /// OSM admin_level to query (defaults to 8)
    #[arg(long)]
    admin_level: Option<u8>,

    /// Overpass interpreter URL
    #[arg(long)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Failures are reported, not propagated: the exit status stays 0.
    if let Err(e) = run(args) {
        eprintln!("{}", format_error(&e));
    }
}

/// Error line plus its `Caused by` chain; each message appears once.
fn format_error(e: &anyhow::Error) -> String {
    format!("❌ Error: {:?}", e)
}

fn run(args: Args) -> Result<()> {
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let output = args
        .output
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let bbox = args
        .bbox
        .or_else(|| file_config.as_ref().and_then(|c| c.bbox))
        .unwrap_or_default();
    bbox.validate().context("Invalid bounding box")?;
    let admin_level = args
        .admin_level
        .or_else(|| file_config.as_ref().and_then(|c| c.admin_level))
        .unwrap_or(DEFAULT_ADMIN_LEVEL);
    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);

    let mut overpass_config = file_config
        .as_ref()
        .and_then(|c| c.overpass.clone())
        .unwrap_or_default();
    if let Some(url) = args.url.clone() {
        overpass_config.url = url;
    }
    if let Some(timeout) = args.timeout {
        overpass_config.timeout_secs = timeout;
    }

    let query = build_boundary_query(&bbox, admin_level, overpass_config.timeout_secs);

    if verbose {
        println!("Configuration:");
        println!("  Bounding box: {}", bbox);
        println!("  Admin level: {}", admin_level);
        println!("  Overpass URL: {}", overpass_config.url);
        println!(
            "  Timeout: {}s (client {}s)",
            overpass_config.timeout_secs,
            overpass_config.client_timeout().as_secs()
        );
        println!("  Output: {}", output.display());
        println!();
        println!("Query:");
        println!("{}", query);
    }

    println!("Fetching data from Overpass API...");
    let spinner = create_spinner("Waiting for Overpass response...");
    let start = Instant::now();
    let raw = match fetch_overpass(&query, &overpass_config) {
        Ok(raw) => raw,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.context("Failed to fetch boundaries from Overpass API"));
        }
    };
    spinner.finish_and_clear();
    println!(
        "Downloaded {} bytes [{:.1}s]",
        raw.len(),
        start.elapsed().as_secs_f32()
    );

    let conversion = convert_boundaries(&raw)?;

    if let Some(ref remark) = conversion.remark {
        eprintln!("Warning: Overpass remark: {}", remark);
    }
    if verbose {
        println!(
            "  Administrative relations: {}",
            conversion.stats.admin_relations
        );
        println!(
            "  Skipped without inline geometry: {}",
            conversion.stats.missing_geometry
        );
        println!(
            "  Skipped with 2 or fewer points: {}",
            conversion.stats.too_few_points
        );
    }

    println!("Converted {} features", conversion.features());

    let bytes_written = conversion.write(&output)?;
    println!("✅ Saved to {}", output.display());

    if verbose {
        println!(
            "  Wrote {:.1} KB in {:.1}s total",
            bytes_written as f64 / 1024.0,
            total_start.elapsed().as_secs_f32()
        );
    }

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

use clap::{ArgGroup, Parser};
use std::error::Error;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use grain_counter::batch::{BatchOptions, run_batch};
use grain_counter::config::GrainConfig;
use grain_counter::synth::synthetic_grains;

#[derive(Parser, Debug)]
#[command(
    name = "grains",
    about = "Count grain-shaped objects in grayscale images",
    version,
    group(
        ArgGroup::new("inputs")
            .required(true)
            .multiple(true)
            .args(["paths", "dir", "demo"])
    )
)]
struct Cli {
    /// Image files to process, in order
    paths: Vec<PathBuf>,

    /// Directory of images to process (sorted by name)
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,

    /// Generate and process a synthetic demo image
    #[arg(long)]
    demo: bool,

    /// Write the 8-panel report PNG for each image
    #[arg(short = 'r', long)]
    report: bool,

    /// Write every intermediate stage and overlay as its own PNG
    #[arg(short = 's', long)]
    stages: bool,

    /// Write the batch summary as JSON
    #[arg(short = 'j', long)]
    json: bool,

    /// Directory receiving all output files
    #[arg(short = 'o', long, default_value = "output")]
    out: PathBuf,

    /// Override the minimum grain area in pixels
    #[arg(long)]
    min_area: Option<u32>,
}

fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "bmp" | "gif" | "tif" | "tiff" | "webp"
    )
}

fn demo_image_path(out_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let path = out_dir.join("demo_grains.png");
    fs::create_dir_all(out_dir)?;
    let image = synthetic_grains(
        320,
        240,
        40,
        220,
        &[(60, 60, 14), (150, 100, 16), (240, 170, 12), (90, 180, 15)],
        5,
        1,
    );
    image.save(&path)?;
    println!("wrote {}", path.display());
    Ok(path)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut paths = cli.paths.clone();

    if let Some(dir) = &cli.dir {
        if !dir.is_dir() {
            return Err(format!("Not a directory: {}", dir.display()).into());
        }
        let mut from_dir: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        from_dir.sort();
        paths.extend(from_dir);
    }

    if cli.demo {
        paths.push(demo_image_path(&cli.out)?);
    }

    if paths.is_empty() {
        eprintln!("No images to process");
        return Ok(());
    }

    let mut config = GrainConfig::default();
    if let Some(min_area) = cli.min_area {
        config.min_area = min_area;
    }

    let options = BatchOptions {
        write_report: cli.report,
        write_stages: cli.stages,
        out_dir: cli.out.clone(),
    };

    let summary = run_batch(&paths, &config, &options);

    if cli.json {
        fs::create_dir_all(&cli.out)?;
        let out = cli.out.join("summary.json");
        fs::write(&out, serde_json::to_string_pretty(&summary)?)?;
        println!("wrote {}", out.display());
    }

    println!(
        "processed {} image(s), {} failed, {} grains total",
        summary.processed, summary.failed, summary.total_grains
    );
    Ok(())
}

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use planetgen::config::PlanetConfig;
use planetgen::logging::{DEFAULT_FILTER, init_logging};
use planetgen::render;

/// Procedural planet generator: terrain, climate and biome maps from a seed.
#[derive(Parser, Debug)]
#[command(name = "planetgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Random seed. Same seed and config give the same planet.
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Square map size in cells (also scales erosion droplets).
    #[arg(long)]
    size: Option<usize>,

    /// Map width, overrides --size.
    #[arg(long)]
    width: Option<usize>,

    /// Map height, overrides --size.
    #[arg(long)]
    height: Option<usize>,

    /// Fraction of the map below sea level, in (0, 1).
    #[arg(long)]
    sea_level: Option<f32>,

    /// Base number of tectonic plates.
    #[arg(long)]
    plates: Option<u32>,

    /// Number of erosion droplets.
    #[arg(long)]
    erosion: Option<u32>,

    /// JSON config file; flags override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long, default_value = "artifacts")]
    out: PathBuf,

    /// Also write the raw planet grids to planet.bin.
    #[arg(long)]
    grids: bool,
}

impl Cli {
    fn planet_config(&self) -> Result<PlanetConfig, Box<dyn Error>> {
        let mut cfg = match &self.config {
            Some(path) => {
                let mut cfg = PlanetConfig::from_json_file(path)?;
                if let Some(size) = self.size {
                    cfg.terrain.width = size;
                    cfg.terrain.height = size;
                }
                cfg
            }
            None => PlanetConfig::for_size(self.size.unwrap_or(512)),
        };

        if let Some(w) = self.width {
            cfg.terrain.width = w;
        }
        if let Some(h) = self.height {
            cfg.terrain.height = h;
        }
        if let Some(sl) = self.sea_level {
            cfg.terrain.sea_level = sl;
            cfg.climate.sea_level = sl;
        }
        if let Some(n) = self.plates {
            cfg.terrain.num_plates = n;
        }
        if let Some(n) = self.erosion {
            cfg.terrain.erosion_iterations = n;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn save_png(dir: &Path, name: &str, rgba: &[u8], w: usize, h: usize) -> Result<(), Box<dyn Error>> {
    let path = dir.join(name);
    image::save_buffer(&path, rgba, w as u32, h as u32, image::ColorType::Rgba8)?;
    eprintln!("Saved {}", path.display());
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let cfg = cli.planet_config()?;
    std::fs::create_dir_all(&cli.out)?;

    let (w, h) = (cfg.terrain.width, cfg.terrain.height);
    info!("seed {}, {}x{}, output {}", cli.seed, w, h, cli.out.display());

    let (planet, timings) = planetgen::generate(cli.seed, &cfg);

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    let stats = planet.stats();
    eprintln!("\nLand:         {:.1}%", stats.land_fraction * 100.0);
    eprintln!("Temperature:  {:.1}C average", stats.avg_temperature);
    eprintln!("Moisture:     {:.2} average", stats.avg_moisture);
    eprintln!("Biomes:");
    let cells = (w * h).max(1) as f32;
    for c in &stats.biome_counts {
        eprintln!("  {:22} {:6.2}%", c.name, c.cells as f32 / cells * 100.0);
    }
    eprintln!();

    let out = &cli.out;
    save_png(out, "elevation.png", &render::render_heightmap(&planet.elevation), w, h)?;
    save_png(
        out,
        "terrain.png",
        &render::render_terrain(&planet.elevation, planet.sea_level),
        w,
        h,
    )?;
    save_png(out, "biomes.png", &render::render_biomes(&planet.biome), w, h)?;
    save_png(
        out,
        "temperature.png",
        &render::render_temperature(&planet.temperature),
        w,
        h,
    )?;
    save_png(out, "moisture.png", &render::render_moisture(&planet.moisture), w, h)?;

    if cli.grids {
        let path = out.join("planet.bin");
        let mut file = BufWriter::new(File::create(&path)?);
        planet.write_to(&mut file)?;
        file.flush()?;
        eprintln!("Saved {}", path.display());
    }

    eprintln!("\nDone.");
    Ok(())
}

fn main() -> ExitCode {
    init_logging(DEFAULT_FILTER);
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use planetgen::config::PlanetConfig;
use planetgen::logging::{DEFAULT_FILTER, init_logging};
use planetgen::planet::SurfaceStats;
use planetgen::{Timing, render};

const DEFAULT_SIZE: usize = 256;

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateRequest {
    seed: Option<u64>,
    size: Option<usize>,
    width: Option<usize>,
    height: Option<usize>,
    sea_level: Option<f32>,
    num_plates: Option<u32>,
    plate_jitter: Option<u32>,
    fbm_octaves: Option<u32>,
    mountain_scale: Option<f32>,
    erosion_iterations: Option<u32>,
    // Climate
    axial_tilt: Option<f32>,
    base_temp: Option<f32>,
    temp_range: Option<f32>,
    altitude_lapse: Option<f32>,
    ocean_moisture: Option<f32>,
}

impl GenerateRequest {
    fn planet_config(&self) -> PlanetConfig {
        let mut cfg = PlanetConfig::for_size(self.size.unwrap_or(DEFAULT_SIZE));
        let t = &mut cfg.terrain;
        let c = &mut cfg.climate;

        if let Some(v) = self.width {
            t.width = v;
        }
        if let Some(v) = self.height {
            t.height = v;
        }
        if let Some(v) = self.sea_level {
            t.sea_level = v;
            c.sea_level = v;
        }
        if let Some(v) = self.num_plates {
            t.num_plates = v;
        }
        if let Some(v) = self.fbm_octaves {
            t.fbm_octaves = v;
        }
        if let Some(v) = self.mountain_scale {
            t.mountain_scale = v;
        }
        if let Some(v) = self.erosion_iterations {
            t.erosion_iterations = v;
        }
        if let Some(v) = self.axial_tilt {
            c.axial_tilt = v;
        }
        if let Some(v) = self.base_temp {
            c.base_temp = v;
        }
        if let Some(v) = self.temp_range {
            c.temp_range = v;
        }
        if let Some(v) = self.altitude_lapse {
            c.altitude_lapse = v;
        }
        if let Some(v) = self.ocean_moisture {
            c.ocean_moisture = v;
        }
        if let Some(v) = self.plate_jitter {
            cfg.plate_jitter = v;
        }
        cfg
    }
}

#[derive(Serialize)]
struct GenerateResponse {
    seed: u64,
    layers: Vec<Layer>,
    timings: Vec<Timing>,
    stats: SurfaceStats,
    width: usize,
    height: usize,
}

#[derive(Serialize)]
struct Layer {
    name: &'static str,
    data_url: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, msg: impl ToString) -> ApiError {
    (status, Json(ErrorBody { error: msg.to_string() }))
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn build_response(seed: u64, cfg: &PlanetConfig) -> Result<GenerateResponse, image::ImageError> {
    let (planet, timings) = planetgen::generate(seed, cfg);
    let (w, h) = (planet.width(), planet.height());

    let layers = vec![
        Layer {
            name: "elevation",
            data_url: encode_png(&render::render_heightmap(&planet.elevation), w, h)?,
        },
        Layer {
            name: "terrain",
            data_url: encode_png(&render::render_terrain(&planet.elevation, planet.sea_level), w, h)?,
        },
        Layer {
            name: "biomes",
            data_url: encode_png(&render::render_biomes(&planet.biome), w, h)?,
        },
        Layer {
            name: "temperature",
            data_url: encode_png(&render::render_temperature(&planet.temperature), w, h)?,
        },
        Layer {
            name: "moisture",
            data_url: encode_png(&render::render_moisture(&planet.moisture), w, h)?,
        },
    ];

    Ok(GenerateResponse {
        seed,
        layers,
        timings,
        stats: planet.stats(),
        width: w,
        height: h,
    })
}

async fn generate_handler(Json(req): Json<GenerateRequest>) -> Result<Json<GenerateResponse>, ApiError> {
    let seed = req.seed.unwrap_or(42);
    let cfg = req.planet_config();
    cfg.validate()
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    info!("generate seed={} {}x{}", seed, cfg.terrain.width, cfg.terrain.height);

    let response = tokio::task::spawn_blocking(move || build_response(seed, &cfg))
        .await
        .map_err(|e| {
            error!("generation task failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?
        .map_err(|e| {
            error!("PNG encode failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    Ok(Json(response))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logging(DEFAULT_FILTER);

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("planetgen server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

use clap::Parser;
use partscore::io::{load_image, save_field_png, ColorMode};
use partscore::{
    distance_transform_with, Deformation, DtConfig, DtMethod, Match, ScoreRegion, SsdConfig,
    SsdMatcher, Template,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "PartScore CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    Ssd,
    Dt,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ColorConfig {
    #[default]
    Gray,
    Rgb,
}

impl From<ColorConfig> for ColorMode {
    fn from(value: ColorConfig) -> Self {
        match value {
            ColorConfig::Gray => ColorMode::Gray,
            ColorConfig::Rgb => ColorMode::Rgb,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RegionConfig {
    #[default]
    Valid,
    Full,
}

impl From<RegionConfig> for ScoreRegion {
    fn from(value: RegionConfig) -> Self {
        match value {
            RegionConfig::Valid => ScoreRegion::Valid,
            RegionConfig::Full => ScoreRegion::Full,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MethodConfig {
    #[default]
    DivideAndConquer,
    LowerEnvelope,
}

impl From<MethodConfig> for DtMethod {
    fn from(value: MethodConfig) -> Self {
        match value {
            MethodConfig::DivideAndConquer => DtMethod::DivideAndConquer,
            MethodConfig::LowerEnvelope => DtMethod::LowerEnvelope,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SsdConfigJson {
    region: RegionConfig,
    parallel: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DtConfigJson {
    ax: f64,
    bx: f64,
    ay: f64,
    by: f64,
    method: MethodConfig,
    parallel: bool,
}

impl Default for DtConfigJson {
    fn default() -> Self {
        Self {
            ax: 0.1,
            bx: 0.0,
            ay: 0.1,
            by: 0.0,
            method: MethodConfig::default(),
            parallel: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    mode: ModeConfig,
    image_path: String,
    template_path: String,
    color: ColorConfig,
    output_path: Option<String>,
    map_path: Option<String>,
    topk: usize,
    nms_radius: usize,
    ssd: SsdConfigJson,
    dt: DtConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ModeConfig::default(),
            image_path: String::new(),
            template_path: String::new(),
            color: ColorConfig::default(),
            output_path: None,
            map_path: None,
            topk: 1,
            nms_radius: 4,
            ssd: SsdConfigJson::default(),
            dt: DtConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    x: f64,
    y: f64,
    score: f64,
}

impl From<Match> for MatchRecord {
    fn from(value: Match) -> Self {
        Self {
            x: value.x,
            y: value.y,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct SsdOutput {
    best: Option<MatchRecord>,
    topk: Vec<MatchRecord>,
}

#[derive(Debug, Serialize)]
struct CellRecord {
    x: usize,
    y: usize,
    value: f64,
    source_x: usize,
    source_y: usize,
}

#[derive(Debug, Serialize)]
struct DtOutput {
    width: usize,
    height: usize,
    min: Option<f64>,
    max: Option<f64>,
    best: Option<CellRecord>,
}

fn run_ssd(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    if config.template_path.is_empty() {
        return Err("template_path must be set in ssd mode".into());
    }
    if config.topk == 0 {
        return Err("topk must be at least 1".into());
    }

    let mode = ColorMode::from(config.color);
    let image = load_image(&config.image_path, mode)?;
    let template = Template::from(load_image(&config.template_path, mode)?);

    let matcher = SsdMatcher::from_template(&template)?.with_config(SsdConfig {
        region: config.ssd.region.into(),
        parallel: config.ssd.parallel,
    });

    let image_view = image.view();
    if let Some(path) = &config.map_path {
        let band = matcher.band(image_view)?;
        let map = matcher.score_map(image_view)?;
        save_field_png(&band.crop(&map)?, path)?;
    }

    let matches = matcher.best_matches(image_view, config.topk, config.nms_radius)?;
    tracing::info!(found = matches.len(), "ssd matches");
    let best = matches.first().copied().map(MatchRecord::from);
    let topk = matches.into_iter().map(MatchRecord::from).collect();
    Ok(serde_json::to_string_pretty(&SsdOutput { best, topk })?)
}

fn run_dt(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    let cost = load_image(&config.image_path, ColorMode::Gray)?;
    let deformation = Deformation::new(config.dt.ax, config.dt.bx, config.dt.ay, config.dt.by)?;
    let cfg = DtConfig {
        method: config.dt.method.into(),
        parallel: config.dt.parallel,
    };
    let dt = distance_transform_with(cost.view(), deformation, cfg)?;

    if let Some(path) = &config.map_path {
        save_field_png(dt.values(), path)?;
    }

    let values = dt.values();
    let range = values.finite_range();
    let mut best: Option<CellRecord> = None;
    for y in 0..values.height() {
        for x in 0..values.width() {
            let Some(value) = dt.value(x, y).filter(|v| v.is_finite()) else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.value <= value) {
                continue;
            }
            if let Some((source_x, source_y)) = dt.source_of(x, y) {
                best = Some(CellRecord {
                    x,
                    y,
                    value,
                    source_x,
                    source_y,
                });
            }
        }
    }

    let output = DtOutput {
        width: values.width(),
        height: values.height(),
        min: range.map(|r| r.0),
        max: range.map(|r| r.1),
        best,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("partscore=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let json = match config.mode {
        ModeConfig::Ssd => run_ssd(&config)?,
        ModeConfig::Dt => run_dt(&config)?,
    };

    match &config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

use clap::Parser;
use faceverify::io::{load_bgr_image, save_bgr_image};
use faceverify::lowlevel::{estimate_similarity, warp_affine};
use faceverify::{AlignmentTemplate, FeatureVector, Point, NUM_LANDMARKS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "FaceVerify CLI (JSON config driven)")]
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
enum TemplateConfig {
    #[default]
    Arcface112,
    Arcface96,
}

impl From<TemplateConfig> for AlignmentTemplate {
    fn from(value: TemplateConfig) -> Self {
        match value {
            TemplateConfig::Arcface112 => AlignmentTemplate::ARCFACE_112,
            TemplateConfig::Arcface96 => AlignmentTemplate::ARCFACE_96,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlignTask {
    image_path: String,
    landmarks: [[f32; 2]; NUM_LANDMARKS],
    #[serde(default)]
    template: TemplateConfig,
    #[serde(default)]
    aligned_path: Option<String>,
}

fn default_normalize() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct CompareTask {
    features_a: Vec<f32>,
    features_b: Vec<f32>,
    #[serde(default = "default_normalize")]
    normalize: bool,
    #[serde(default)]
    threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum Task {
    Align(AlignTask),
    Compare(CompareTask),
}

#[derive(Debug, Deserialize)]
struct Config {
    task: Task,
    #[serde(default)]
    output_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct AlignRecord {
    matrix: [f32; 6],
    scale: f32,
    theta_deg: f32,
    iterations: usize,
    loss: f32,
    aligned_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompareRecord {
    similarity: f32,
    same_person: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Align(AlignRecord),
    Compare(CompareRecord),
}

fn run_align(task: AlignTask) -> Result<AlignRecord, Box<dyn std::error::Error>> {
    let template: AlignmentTemplate = task.template.into();
    let landmarks: [Point; NUM_LANDMARKS] = task.landmarks.map(|[x, y]| Point::new(x, y));
    let fit = estimate_similarity(&landmarks, template.points())?;

    if let Some(path) = &task.aligned_path {
        let image = load_bgr_image(&task.image_path)?;
        let aligned = warp_affine(image.view(), &fit.matrix, template.width(), template.height())?;
        save_bgr_image(aligned.view(), path)?;
    }

    Ok(AlignRecord {
        matrix: fit.matrix.as_array(),
        scale: fit.scale,
        theta_deg: fit.theta.to_degrees(),
        iterations: fit.iterations,
        loss: fit.loss,
        aligned_path: task.aligned_path,
    })
}

fn run_compare(task: CompareTask) -> Result<CompareRecord, Box<dyn std::error::Error>> {
    let mut a = FeatureVector::new(task.features_a);
    let mut b = FeatureVector::new(task.features_b);
    if task.normalize {
        a.normalize()?;
        b.normalize()?;
    }
    let similarity = a.similarity(&b)?;
    Ok(CompareRecord {
        similarity,
        same_person: task.threshold.map(|t| similarity > t),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("faceverify=info".parse()?),
            )
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

    let output = match config.task {
        Task::Align(task) => {
            if task.image_path.is_empty() && task.aligned_path.is_some() {
                return Err("image_path must be set to write an aligned crop".into());
            }
            Output::Align(run_align(task)?)
        }
        Task::Compare(task) => {
            if task.features_a.is_empty() || task.features_b.is_empty() {
                return Err("features_a and features_b must be non-empty".into());
            }
            Output::Compare(run_compare(task)?)
        }
    };
    tracing::info!(output = ?output, "task finished");

    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

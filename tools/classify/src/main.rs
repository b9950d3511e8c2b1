//! Classify one or more numeric attributes of a GeoJSON FeatureCollection
//! into natural-breaks levels and write the annotated collection.
//!
//! `RUST_LOG` takes tracing filter directives, e.g. `debug` or
//! `choro_core=debug` (default: info).

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::{fs, path::Path};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use choro_core::{
    ClassificationResult, ClassifyParams, FeatureCollection, LegendEntry, Method,
    DEFAULT_LEVEL_KEY,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "classify", about = "Assign natural-breaks levels to map features")]
struct Args {
    /// FeatureCollection JSON file.
    #[arg(short, long)]
    input: String,

    /// Attribute(s) to classify, comma separated (e.g. population,density).
    #[arg(short, long, value_delimiter = ',', required = true)]
    attribute: Vec<String>,

    /// Output file for the annotated collection; stdout when omitted.
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file with ClassifyParams; flags below override its fields.
    #[arg(short, long)]
    params: Option<String>,

    /// Number of classes.
    #[arg(short = 'k', long)]
    classes: Option<usize>,

    /// natural-breaks or equal-interval.
    #[arg(short, long)]
    method: Option<Method>,

    /// Property that receives the level. With several attributes the
    /// attribute name is prefixed, e.g. population_level.
    #[arg(short, long, default_value = DEFAULT_LEVEL_KEY)]
    level_key: String,

    /// Also write breaks, summary and legend per attribute to this JSON file.
    #[arg(short, long)]
    summary: Option<String>,

    /// Pretty-print output JSON.
    #[arg(long)]
    pretty: bool,
}

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AttributeReport<'a> {
    attribute: &'a str,
    level_key: String,
    #[serde(flatten)]
    result: &'a ClassificationResult,
    legend: Vec<LegendEntry>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_params(args: &Args) -> Result<ClassifyParams> {
    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => ClassifyParams::default(),
    };
    if let Some(k) = args.classes {
        params.class_count = k;
    }
    if let Some(m) = args.method {
        params.method = m;
    }
    params.validate()?;
    Ok(params)
}

fn level_key_for(args: &Args, attribute: &str) -> String {
    if args.attribute.len() == 1 {
        args.level_key.clone()
    } else {
        format!("{attribute}_{}", args.level_key)
    }
}

fn print_legend(attribute: &str, result: &ClassificationResult) {
    let Some(summary) = result.summary() else {
        warn!("{attribute}: no positive values; every feature gets level 0");
        return;
    };
    eprintln!(
        "\n{attribute}: {} positive of {} features, range [{}, {}], method {:?}, GVF {:.4}",
        summary.positive_count,
        result.levels().len(),
        summary.min,
        summary.max,
        result.method(),
        result.goodness_of_fit().unwrap_or(f64::NAN),
    );
    eprintln!("{:>6} {:>14} {:>14} {:>8}", "Level", "Lower", "Upper", "Count");
    eprintln!("{}", "-".repeat(45));
    for e in result.legend() {
        eprintln!("{:>6} {:>14.4} {:>14.4} {:>8}", e.level, e.lower, e.upper, e.count);
    }
}

/// Filter from `RUST_LOG`-style directives, `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn write_json<T: Serialize>(value: &T, pretty: bool, path: Option<&str>) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match path {
        Some(p) => {
            if let Some(dir) = Path::new(p).parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(p, text).with_context(|| format!("writing {p}"))?;
            info!("Wrote {p}");
        }
        None => println!("{text}"),
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let params = load_params(&args)?;

    info!("Reading {} ...", args.input);
    let text = fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input))?;
    let mut collection = FeatureCollection::from_json_str(&text)
        .with_context(|| format!("parsing {}", args.input))?;

    info!(
        "Classifying {} features into {} classes ({:?})",
        collection.len(),
        params.class_count,
        params.method
    );
    let attributes: Vec<&str> = args.attribute.iter().map(String::as_str).collect();
    let results = collection.classify_attributes(&attributes, &params);

    let mut reports = Vec::with_capacity(results.len());
    for (attribute, result) in &results {
        print_legend(attribute, result);
        let key = level_key_for(&args, attribute);
        collection.apply_levels(result, &key);
        reports.push(AttributeReport {
            attribute,
            level_key: key,
            result,
            legend: result.legend(),
        });
    }

    if let Some(path) = &args.summary {
        write_json(&reports, true, Some(path))?;
    }
    write_json(&collection, args.pretty, args.output.as_deref())?;

    Ok(())
}

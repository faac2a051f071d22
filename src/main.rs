//! perspective-split - compute perspective-correct grid points for a mesh
//!
//! Reads a mesh document (or a single quadrilateral from the command line),
//! runs the configured split strategy and writes the resulting points as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use perspective_split::config::Config;
use perspective_split::mesh::{MeshDocument, RegionSpec};
use perspective_split::{CubicBezier, Point, StrategyKind, TargetGrid};

/// perspective-split - perspective-correct subdivision of warped mesh regions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mesh document (JSON)
    #[arg(required_unless_present = "quad", conflicts_with = "quad")]
    input: Option<PathBuf>,

    /// Single region given by its corners: tlx,tly,trx,try,blx,bly,brx,bry
    #[arg(long, allow_hyphen_values = true)]
    quad: Option<String>,

    /// Grid for --quad as ROWSxCOLS
    #[arg(long, default_value = "4x4")]
    grid: String,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "perspective-split.toml")]
    config: PathBuf,

    /// Split strategy (perspective, linear)
    #[arg(short, long)]
    strategy: Option<StrategyKind>,

    /// Strategy used when a region has an invalid perspective shape
    #[arg(long)]
    fallback: Option<StrategyKind>,

    /// Assemble regions on a single thread
    #[arg(long)]
    sequential: bool,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Save the effective configuration to the config path
    #[arg(long)]
    save_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging, stdout carries the result
    FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!("perspective-split v{}", env!("CARGO_PKG_VERSION"));

    // Config file values, with CLI args as overrides
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(strategy) = args.strategy {
        config.split.strategy = strategy;
    }
    if let Some(fallback) = args.fallback {
        config.split.fallback = Some(fallback);
    }
    if args.sequential {
        config.split.parallel = false;
    }
    if args.compact {
        config.output.pretty = false;
    }
    if args.save_config {
        config.save(&args.config)?;
    }

    let mesh = match (&args.input, &args.quad) {
        (Some(path), _) => MeshDocument::load(path)?,
        (None, Some(quad)) => MeshDocument::single(parse_quad(quad, &args.grid)?),
        (None, None) => bail!("Either a mesh document or --quad is required"),
    };

    info!(
        "Splitting {} region(s) with the {} strategy",
        mesh.region_count(),
        config.split.strategy
    );

    let strategy = config.split.build::<CubicBezier>();
    let (regions, grids) = mesh.into_parts();

    let started = Instant::now();
    let points = strategy
        .execute(&regions, &grids)
        .with_context(|| format!("The {} strategy failed", strategy.name()))?;
    info!("Computed split points in {:?}", started.elapsed());

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&points)
    } else {
        serde_json::to_string(&points)
    }
    .context("Failed to serialize split points")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write result to {:?}", path))?;
            info!("Wrote split points to {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write result to stdout")?;
        }
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise info (debug with `--verbose`)
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)))
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Parse `--quad` and `--grid` into a straight-edged region
fn parse_quad(quad: &str, grid: &str) -> Result<RegionSpec> {
    let values = quad
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid coordinate {:?}", v))
        })
        .collect::<Result<Vec<_>>>()?;

    let [tlx, tly, trx, try_, blx, bly, brx, bry] = values[..] else {
        bail!("--quad needs 8 comma separated values, got {}", values.len());
    };

    let (rows, cols) = grid
        .split_once(['x', 'X'])
        .context("--grid must look like ROWSxCOLS")?;
    let rows: usize = rows.trim().parse().context("Invalid grid row count")?;
    let cols: usize = cols.trim().parse().context("Invalid grid column count")?;

    Ok(RegionSpec::from_corners(
        Point::new(tlx, tly),
        Point::new(trx, try_),
        Point::new(blx, bly),
        Point::new(brx, bry),
        TargetGrid::uniform(rows, cols),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quad() {
        let spec = parse_quad("0,0, 100,0, 20,100, 80,100", "2x3").unwrap();
        let corners = spec.region().corners();
        assert_eq!(corners.tl, Point::new(0.0, 0.0));
        assert_eq!(corners.br, Point::new(80.0, 100.0));
        assert_eq!(spec.grid.rows(), 2);
        assert_eq!(spec.grid.cols(), 3);
    }

    #[test]
    fn test_parse_quad_errors() {
        assert!(parse_quad("0,0,1,1", "2x2").is_err());
        assert!(parse_quad("0,0,1,0,0,1,1,one", "2x2").is_err());
        assert!(parse_quad("0,0,1,0,0,1,1,1", "22").is_err());
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(false), "info");
        assert_eq!(default_log_level(true), "debug");
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_log_level(verbose)).is_ok());
        }
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "perspective-split",
            "--quad",
            "-1,0,1,0,-1,1,1,1",
            "--strategy",
            "linear",
        ])
        .unwrap();
        assert_eq!(args.strategy, Some(StrategyKind::Linear));
        assert!(args.input.is_none());

        assert!(Args::try_parse_from(["perspective-split"]).is_err());
    }
}

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use tilelight_lighting::LightWindow;
use tilelight_render::{overlay_quad, write_png, AlphaOverlay};
use tilelight_testkit::{JsonlSink, MetricsReportBuilder, MetricsSink, TestExecutionMetrics};

mod level;
mod workload;

use level::{Level, LevelConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Tile light propagation and darkness overlays", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the level's darkness overlay to a PNG
    Render {
        /// Level file (TOML)
        level: PathBuf,

        /// Output image path
        #[arg(long, default_value = "overlay.png")]
        out: PathBuf,

        /// Overlay colour as r,g,b
        #[arg(long, default_value = "0,0,0", value_parser = parse_tint)]
        tint: [u8; 3],
    },
    /// Print the level's darkness overlay as text
    Inspect {
        /// Level file (TOML)
        level: PathBuf,
    },
    /// Drive random light changes through incremental updates
    Flicker {
        /// Level file (TOML)
        level: PathBuf,

        #[arg(long, default_value_t = 1000)]
        steps: u64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Write a JSON metrics report here
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Write one JSON line per update here
        #[arg(long)]
        events: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Render { level, out, tint } => render(&level, &out, tint),
        Command::Inspect { level } => inspect(&level),
        Command::Flicker {
            level,
            steps,
            seed,
            metrics,
            events,
        } => flicker(&level, steps, seed, metrics.as_deref(), events.as_deref()),
    }
}

fn load_level(path: &Path) -> Result<Level> {
    let level = LevelConfig::load_from_path(path)
        .and_then(|cfg| cfg.build())
        .with_context(|| format!("failed to load level {}", path.display()))?;
    info!(path = %path.display(), size = %level.size(), lights = level.lights.len(), "loaded level");
    Ok(level)
}

/// Composite one frame of the level into a fresh overlay.
fn composite(level: &Level) -> Result<(AlphaOverlay, LightWindow)> {
    let mut map = level.light_map()?;
    let window = level.window();
    let (cols, rows) = window.texel_dims();
    let mut overlay = AlphaOverlay::new(cols, rows)?;
    map.prepare(&window);
    map.apply(&mut overlay);
    Ok((overlay, window))
}

fn render(level_path: &Path, out: &Path, tint: [u8; 3]) -> Result<()> {
    let level = load_level(level_path)?;
    let (overlay, window) = composite(&level)?;
    write_png(out, &overlay, tint)
        .with_context(|| format!("failed to write overlay to {}", out.display()))?;
    let quad = overlay_quad(
        level.viewport.cell_width,
        level.viewport.cell_height,
        window.game_col_span,
        window.game_row_span,
    );
    info!(
        out = %out.display(),
        texels = ?(overlay.cols(), overlay.rows()),
        extent = ?quad[2].position,
        "rendered overlay"
    );
    println!(
        "wrote {}x{} overlay to {}",
        overlay.cols(),
        overlay.rows(),
        out.display()
    );
    Ok(())
}

fn inspect(level_path: &Path) -> Result<()> {
    let level = load_level(level_path)?;
    let (overlay, _) = composite(&level)?;
    print!("{}", overlay.to_ascii());
    Ok(())
}

fn flicker(
    level_path: &Path,
    steps: u64,
    seed: u64,
    metrics: Option<&Path>,
    events: Option<&Path>,
) -> Result<()> {
    let level = load_level(level_path)?;
    let started = Instant::now();
    let mut sink = events
        .map(|path| {
            JsonlSink::create(path)
                .with_context(|| format!("failed to create event log {}", path.display()))
        })
        .transpose()?;
    let report = workload::run_flicker(&level, steps, seed, sink.as_mut())?;
    let lighting = &report.lighting;
    println!(
        "{} updates: {} walks, {} inputs rewritten (max {}), {:.2} us/update, result {:?}",
        lighting.total_updates,
        lighting.total_walks,
        lighting.cells_written,
        lighting.max_cells_written,
        lighting.avg_update_time_us,
        report.result
    );

    if let Some(path) = metrics {
        let result = report.result;
        let metrics_report = MetricsReportBuilder::new("flicker")
            .result(result)
            .lighting(report.lighting)
            .compositing(report.compositing)
            .execution(TestExecutionMetrics {
                duration_seconds: started.elapsed().as_secs_f64(),
                assertions_checked: Some(1),
            })
            .build();
        MetricsSink::create(path)
            .and_then(|sink| sink.write(&metrics_report))
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }

    if report.result != tilelight_testkit::TestResult::Pass {
        bail!("incremental light grid diverged from a full recompute");
    }
    Ok(())
}

fn parse_tint(value: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected r,g,b but got {value:?}"));
    };
    let channel = |s: &str| {
        s.parse::<u8>()
            .map_err(|err| format!("bad colour channel {s:?}: {err}"))
    };
    Ok([channel(*r)?, channel(*g)?, channel(*b)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_parses_three_channels() {
        assert_eq!(parse_tint("10, 20,30"), Ok([10, 20, 30]));
        assert!(parse_tint("1,2").is_err());
        assert!(parse_tint("1,2,300").is_err());
    }

    #[test]
    fn cli_parses_flicker_arguments() {
        let cli = Cli::try_parse_from([
            "tilelight",
            "flicker",
            "levels/cave.toml",
            "--steps",
            "5",
            "--seed",
            "7",
            "--metrics",
            "out.json",
        ])
        .expect("parse");
        match cli.command {
            Command::Flicker {
                steps,
                seed,
                metrics,
                events,
                ..
            } => {
                assert_eq!((steps, seed), (5, 7));
                assert_eq!(metrics, Some(PathBuf::from("out.json")));
                assert_eq!(events, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn composite_lights_the_lamp_block() {
        let level = LevelConfig::from_toml_str(
            r#"
map = ["....", "....", "....", "...."]
[[lights]]
col = 0
row = 0
light = 127
"#,
        )
        .and_then(|cfg| cfg.build())
        .expect("level");
        let (overlay, window) = composite(&level).expect("composite");
        assert_eq!((overlay.cols(), overlay.rows()), window.texel_dims());
        assert_eq!(overlay.light(0), 255);
    }
}

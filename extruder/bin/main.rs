use std::{
    fs,
    io::{stdin, stdout, BufRead, Write},
    path::Path,
    thread,
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use args::Args;
use clap::Parser;
use tracing::{debug, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use common::{misc::human_duration, progress::Progress};
use extruder::{
    export::save_stl,
    extrude::{extrude_segments, ExtrudeConfig},
    preview::{render_preview, PreviewConfig},
    segments::segments_between,
};
use gcode_format::{parse_waypoints, Summary};

mod args;

fn main() -> Result<()> {
    let filter = filter::Targets::new()
        .with_default(LevelFilter::WARN)
        .with_target("gmesher", LevelFilter::INFO)
        .with_target("extruder", LevelFilter::INFO)
        .with_target("gcode_format", LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let now = Instant::now();

    let lines = read_program(&args.input)?;
    info!("Read {} lines from {}", lines.len(), args.input.display());

    if !args.no_summary {
        print!("{}", Summary::scan(&lines));
    }

    // Parse on a worker thread so the progress readout stays responsive on
    // large programs.
    let progress = Progress::new();
    let parser = thread::spawn({
        let progress = progress.clone();
        move || parse_waypoints(&lines, progress)
    });

    while !parser.is_finished() {
        print!("\rParsing: {:.0}%", progress.progress() * 100.0);
        stdout().flush()?;
        thread::sleep(Duration::from_millis(50));
    }
    println!("\rParsing: 100%");
    let waypoints = parser.join().unwrap();

    let segments = segments_between(&waypoints);
    info!(
        "Parsed {} waypoints into {} segments",
        waypoints.len(),
        segments.len()
    );
    if waypoints.is_empty() {
        warn!("No linear moves found, the exported mesh will be empty");
    }

    let mesh = extrude_segments(
        &segments,
        &ExtrudeConfig {
            half_width: args.half_width,
            layer_height: args.layer_height,
        },
    );
    debug!("Mesh is manifold: {}", mesh.is_manifold());

    save_stl(&args.output, &mesh)?;
    info!(
        "Saved {} {{ vert: {}, face: {} }}",
        args.output.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );

    if let Some(path) = &args.preview {
        let image = render_preview(
            &waypoints,
            &PreviewConfig {
                size: args.preview_size,
                height_limit: args.preview_height,
                ..Default::default()
            },
        );
        image
            .save(path)
            .with_context(|| format!("failed to write preview {}", path.display()))?;
        info!("Saved preview {}", path.display());
    }

    info!("Done. Elapsed: {}", human_duration(now.elapsed()));

    Ok(())
}

/// Loads the motion program, either from a `.gcode` file or from stdin when
/// the path is `-`.
fn read_program(path: &Path) -> Result<Vec<String>> {
    if path == Path::new("-") {
        return stdin()
            .lock()
            .lines()
            .collect::<Result<_, _>>()
            .context("failed to read program from stdin");
    }

    ensure!(
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gcode")),
        "{} is not a .gcode file",
        path.display()
    );

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw.lines().map(String::from).collect())
}

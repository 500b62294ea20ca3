use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::{SVector, Scalar, Vector2};

#[derive(Debug, Parser)]
/// Converts a G-code motion program into a solid STL mesh.
pub struct Args {
    /// Path to a .gcode file, or `-` to read the program from stdin.
    pub input: PathBuf,

    #[arg(long, default_value = extruder::export::DEFAULT_OUTPUT)]
    /// File to save the generated mesh to.
    pub output: PathBuf,

    #[arg(long, default_value_t = 0.2)]
    /// Half width of the extrusion cross section in mm, offset along X.
    pub half_width: f64,

    #[arg(long, default_value_t = 0.2)]
    /// Height of each extruded layer in mm.
    pub layer_height: f64,

    #[arg(long)]
    /// Render a top-down toolpath preview to this PNG file.
    pub preview: Option<PathBuf>,

    #[arg(long)]
    /// Only include path segments at or below this height in the preview.
    pub preview_height: Option<f64>,

    #[arg(long, default_value = "1024, 1024", value_parser = vector_value_parser::<u32, 2>)]
    /// Size of the preview image in pixels.
    pub preview_size: Vector2<u32>,

    #[arg(long)]
    /// Skip the print metadata summary.
    pub no_summary: bool,
}

fn vector_value_parser<T, const N: usize>(raw: &str) -> Result<SVector<T, N>>
where
    T: FromStr + Scalar,
    T::Err: Send + Sync + std::error::Error + 'static,
{
    let mut parts = raw.splitn(N, ',');
    let mut elements = Vec::with_capacity(N);
    for _ in 0..N {
        let element = parts.next().context("Missing vector element")?.trim();
        elements.push(
            element
                .parse::<T>()
                .context("Can't convert element from string")?,
        );
    }

    Ok(SVector::from_iterator(elements))
}

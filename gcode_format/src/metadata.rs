//! Header metadata lookups. Each lookup is an independent scan over the raw
//! line sequence, absence or a malformed value is never an error, the scan
//! just moves on to the next candidate line.

use std::fmt::{self, Display};

/// Minimum and maximum of one axis over all extruding moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

pub fn layer_count(lines: &[String]) -> Option<u32> {
    value_after(lines, "total layer number:")
}

pub fn max_z_height(lines: &[String]) -> Option<f64> {
    value_after(lines, "max_z_height:")
}

pub fn filament_length(lines: &[String]) -> Option<f64> {
    value_after(lines, "total filament length [mm] :")
}

pub fn filament_weight(lines: &[String]) -> Option<f64> {
    value_after(lines, "total filament weight [g] :")
}

pub fn nozzle_temperature(lines: &[String]) -> Option<f64> {
    value_after(lines, "; nozzle_temperature =")
}

/// Bed temperature from the first `M190 S<temp>` wait command.
pub fn bed_temperature(lines: &[String]) -> Option<f64> {
    lines.iter().find_map(|line| {
        let value = line.strip_prefix("M190 S")?;
        value.split(';').next()?.trim().parse().ok()
    })
}

/// The slicer writes the model name on the second line of the file.
pub fn model_name(lines: &[String]) -> Option<String> {
    let line = lines.get(1)?;
    line.contains("BambuStudio")
        .then(|| line.trim_matches([';', ' ']).to_owned())
}

/// Estimated print time, kept as the slicer formatted it.
pub fn print_time(lines: &[String]) -> Option<String> {
    lines.iter().find_map(|line| {
        let (_, value) = line.split_once("total estimated time:")?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    })
}

pub fn x_extent(lines: &[String]) -> Option<Extent> {
    axis_extent(lines, b'X')
}

pub fn y_extent(lines: &[String]) -> Option<Extent> {
    axis_extent(lines, b'Y')
}

/// First number following `marker` on any line, scanning past lines where
/// the number fails to parse.
fn value_after<T: std::str::FromStr>(lines: &[String], marker: &str) -> Option<T> {
    lines.iter().find_map(|line| {
        let (_, value) = line.split_once(marker)?;
        value.trim().parse().ok()
    })
}

/// Min/max of one axis letter over linear moves that also deposit material.
fn axis_extent(lines: &[String], axis: u8) -> Option<Extent> {
    let mut extent: Option<Extent> = None;
    for line in lines {
        if line.split_whitespace().next() != Some("G1") || !line.contains(" E") {
            continue;
        }

        for token in line.split_whitespace() {
            if token.as_bytes().first() != Some(&axis) {
                continue;
            }
            let Some(value) = token.get(1..).and_then(|v| v.parse::<f64>().ok()) else {
                continue;
            };

            extent = Some(match extent {
                Some(e) => Extent {
                    min: e.min.min(value),
                    max: e.max.max(value),
                },
                None => Extent {
                    min: value,
                    max: value,
                },
            });
        }
    }

    extent
}

/// Everything the header scan can report about a print, collected up front
/// so it can be shown before any geometry work starts.
#[derive(Debug, Default, Clone)]
pub struct Summary {
    pub model_name: Option<String>,
    pub layer_count: Option<u32>,
    pub max_z_height: Option<f64>,
    pub filament_length: Option<f64>,
    pub filament_weight: Option<f64>,
    pub nozzle_temperature: Option<f64>,
    pub bed_temperature: Option<f64>,
    pub print_time: Option<String>,
    pub x_extent: Option<Extent>,
    pub y_extent: Option<Extent>,
}

impl Summary {
    pub fn scan(lines: &[String]) -> Self {
        Self {
            model_name: model_name(lines),
            layer_count: layer_count(lines),
            max_z_height: max_z_height(lines),
            filament_length: filament_length(lines),
            filament_weight: filament_weight(lines),
            nozzle_temperature: nozzle_temperature(lines),
            bed_temperature: bed_temperature(lines),
            print_time: print_time(lines),
            x_extent: x_extent(lines),
            y_extent: y_extent(lines),
        }
    }

    /// Center of the deposited area on the build plate.
    pub fn build_center(&self) -> Option<(f64, f64)> {
        Some((self.x_extent?.center(), self.y_extent?.center()))
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn row<T: Display>(
            f: &mut fmt::Formatter<'_>,
            label: &str,
            value: &Option<T>,
            unit: &str,
        ) -> fmt::Result {
            match value {
                Some(value) => writeln!(f, "{label}: {value}{unit}"),
                None => writeln!(f, "{label}: unknown"),
            }
        }

        row(f, "Model name", &self.model_name, "")?;
        row(f, "Layer count", &self.layer_count, "")?;
        row(f, "Maximum Z height", &self.max_z_height, " mm")?;
        row(f, "Filament length", &self.filament_length, " mm")?;
        row(f, "Filament weight", &self.filament_weight, " g")?;
        row(f, "Nozzle temperature", &self.nozzle_temperature, " °C")?;
        row(f, "Bed temperature", &self.bed_temperature, " °C")?;
        row(f, "Estimated print time", &self.print_time, "")?;
        if let (Some(x), Some(y)) = (self.x_extent, self.y_extent) {
            writeln!(
                f,
                "Build area: {:.2} x {:.2} mm, centered at ({:.2}, {:.2})",
                x.span(),
                y.span(),
                x.center(),
                y.center()
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &str) -> Vec<String> {
        raw.lines().map(String::from).collect()
    }

    const HEADER: &str = "\
; HEADER_BLOCK_START
; BambuStudio 01.08.00.57
; model printing time: 2h 1m 30s; total estimated time: 2h 13m 16s
; total layer number: 125
; total filament length [mm] : 3975.06
; total filament weight [g] : 11.86
; max_z_height: 25.00
M190 S55 ; wait for bed temperature
; nozzle_temperature = 220
G1 X10.0 Y20.0 Z0.2 E1.0
G1 X30.5 Y5.0 E2.0
G1 X15.0 F3000
";

    #[test]
    fn header_fields_are_found() {
        let lines = lines(HEADER);

        assert_eq!(layer_count(&lines), Some(125));
        assert_eq!(max_z_height(&lines), Some(25.0));
        assert_eq!(filament_length(&lines), Some(3975.06));
        assert_eq!(filament_weight(&lines), Some(11.86));
        assert_eq!(nozzle_temperature(&lines), Some(220.0));
        assert_eq!(bed_temperature(&lines), Some(55.0));
        assert_eq!(model_name(&lines).as_deref(), Some("BambuStudio 01.08.00.57"));
        assert_eq!(print_time(&lines).as_deref(), Some("2h 13m 16s"));
    }

    #[test]
    fn extents_only_cover_extruding_moves() {
        let lines = lines(HEADER);

        // The X15 travel move has no E field and must not widen the extent.
        assert_eq!(x_extent(&lines), Some(Extent { min: 10.0, max: 30.5 }));
        assert_eq!(y_extent(&lines), Some(Extent { min: 5.0, max: 20.0 }));

        let summary = Summary::scan(&lines);
        assert_eq!(summary.build_center(), Some((20.25, 12.5)));
    }

    #[test]
    fn missing_headers_yield_none() {
        let lines = lines("G1 X1 Y1\nG1 X2 Y2");

        assert_eq!(layer_count(&lines), None);
        assert_eq!(bed_temperature(&lines), None);
        assert_eq!(model_name(&lines), None);
        assert_eq!(print_time(&lines), None);
        assert_eq!(x_extent(&lines), None);
    }

    #[test]
    fn malformed_values_are_skipped() {
        let lines = lines("; total layer number: lots\n; total layer number: 12");

        assert_eq!(layer_count(&lines), Some(12));
    }

    #[test]
    fn model_name_requires_second_line() {
        let first_line_only = lines("; BambuStudio on the wrong line");
        assert_eq!(model_name(&first_line_only), None);

        let other_slicer = lines("; generated\n; some other slicer v1.2");
        assert_eq!(model_name(&other_slicer), None);
    }
}

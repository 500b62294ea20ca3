//! Non-interactive toolpath preview: a top-down projection of the path into
//! a PNG-ready image, colored by how much material each segment deposits.

use gcode_format::Waypoint;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use nalgebra::Vector2;

use crate::segments::segments_between;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
// Endpoints of the cold-to-hot deposition ramp.
const COLD: Rgb<u8> = Rgb([59, 76, 192]);
const HOT: Rgb<u8> = Rgb([180, 4, 38]);

#[derive(Debug, Clone, Copy)]
pub struct PreviewConfig {
    /// Output image size in pixels.
    pub size: Vector2<u32>,
    /// Only draw segments whose highest endpoint is at or below this.
    pub height_limit: Option<f64>,
    /// Blank border around the drawing, in pixels.
    pub margin: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            size: Vector2::new(1024, 1024),
            height_limit: None,
            margin: 16,
        }
    }
}

/// Renders a top-down view of the toolpath, each segment colored by the
/// mean deposition of its endpoints. The frame always covers the whole
/// path, so previews rendered at different height limits line up.
pub fn render_preview(waypoints: &[Waypoint], config: &PreviewConfig) -> RgbImage {
    let mut image = RgbImage::from_pixel(config.size.x, config.size.y, BACKGROUND);

    let Some(frame) = Frame::over(waypoints, config) else {
        return image;
    };

    let (min_e, max_e) = waypoints
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), w| {
            (min.min(w.deposition), max.max(w.deposition))
        });

    for segment in segments_between(waypoints) {
        if config
            .height_limit
            .is_some_and(|limit| segment.max_height() > limit)
        {
            continue;
        }

        let mean = (segment.start.deposition + segment.end.deposition) / 2.0;
        let color = ramp(normalize(mean, min_e, max_e));
        draw_line_segment_mut(
            &mut image,
            frame.project(&segment.start),
            frame.project(&segment.end),
            color,
        );
    }

    image
}

/// Maps path XY coordinates into pixel coordinates. Uniform scale on both
/// axes so the path keeps its aspect ratio, Y flipped since image rows grow
/// downward.
struct Frame {
    center: Vector2<f64>,
    image_center: Vector2<f64>,
    scale: f64,
}

impl Frame {
    fn over(waypoints: &[Waypoint], config: &PreviewConfig) -> Option<Self> {
        let first = waypoints.first()?;
        let (min, max) = waypoints.iter().fold(
            (first.position.xy(), first.position.xy()),
            |(min, max), w| {
                (
                    Vector2::new(min.x.min(w.position.x), min.y.min(w.position.y)),
                    Vector2::new(max.x.max(w.position.x), max.y.max(w.position.y)),
                )
            },
        );

        let inner = config
            .size
            .map(|px| px.saturating_sub(2 * config.margin) as f64);
        let span = max - min;
        let scale = [inner.x / span.x, inner.y / span.y]
            .into_iter()
            .filter(|scale| scale.is_finite())
            .fold(f64::INFINITY, f64::min);

        Some(Self {
            center: (min + max) / 2.0,
            image_center: config.size.map(|px| px as f64 / 2.0),
            // A single point has no span on either axis, any scale works.
            scale: if scale.is_finite() { scale } else { 1.0 },
        })
    }

    fn project(&self, waypoint: &Waypoint) -> (f32, f32) {
        let offset = (waypoint.position.xy() - self.center) * self.scale;
        (
            (self.image_center.x + offset.x) as f32,
            (self.image_center.y - offset.y) as f32,
        )
    }
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max - min <= f64::EPSILON {
        0.5
    } else {
        (value - min) / (max - min)
    }
}

fn ramp(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |i: usize| (COLD[i] as f64 + (HOT[i] as f64 - COLD[i] as f64) * t).round() as u8;
    Rgb([channel(0), channel(1), channel(2)])
}

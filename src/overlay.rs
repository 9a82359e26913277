//! Measurement overlay geometry.
//!
//! Built from scratch every frame from the current [`Point3`] list, so the
//! overlay can never disagree with the measurement state.

use egui::Color32;
use glam::Vec3;

use crate::color_scheme::MeasurementColors;
use crate::config::MeasurementStyle;
use crate::data::measurement::Point3;

/// Sphere marking a picked point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPrimitive {
    /// 0 for the first point, 1 for the second.
    pub index: usize,
    pub position: Vec3,
    pub radius: f32,
    pub color: Color32,
}

/// Tube connecting the two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub color: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Marker(MarkerPrimitive),
    Line(LinePrimitive),
}

/// Overlay for the given points: one marker per point, plus a line once
/// both points are set.
pub fn build_primitives(
    points: &[Point3],
    style: &MeasurementStyle,
    colors: MeasurementColors,
) -> Vec<Primitive> {
    let mut out = Vec::with_capacity(3);
    for (index, point) in points.iter().take(2).enumerate() {
        out.push(Primitive::Marker(MarkerPrimitive {
            index,
            position: point.to_vec3(),
            radius: style.marker_radius,
            color: if index == 0 { colors.first } else { colors.second },
        }));
    }
    if let [a, b] = points {
        out.push(Primitive::Line(LinePrimitive {
            start: a.to_vec3(),
            end: b.to_vec3(),
            radius: style.line_radius,
            color: colors.line,
        }));
    }
    out
}

impl LinePrimitive {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Side-wall triangles of an open tube around `start..end`.
    ///
    /// Empty for a degenerate segment. At least three sides are generated.
    pub fn tube(&self, segments: usize) -> Vec<[Vec3; 3]> {
        let axis = self.end - self.start;
        if axis.length_squared() <= f32::EPSILON * f32::EPSILON {
            return Vec::new();
        }
        let segments = segments.max(3);
        let (u, v) = axis.normalize().any_orthonormal_pair();

        let ring = |i: usize| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            let (s, c) = angle.sin_cos();
            (u * c + v * s) * self.radius
        };

        let mut tris = Vec::with_capacity(segments * 2);
        for i in 0..segments {
            let r0 = ring(i);
            let r1 = ring(i + 1);
            let (a0, a1) = (self.start + r0, self.start + r1);
            let (b0, b1) = (self.end + r0, self.end + r1);
            tris.push([a0, b0, b1]);
            tris.push([a0, b1, a1]);
        }
        tris
    }
}

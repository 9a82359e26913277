//! Software rendering of the scene into egui meshes.
//!
//! Triangles are projected on the CPU, sorted back to front and handed to
//! egui as textured meshes. There is no depth buffer; the painter's
//! algorithm is good enough for a single closed model.

use egui::epaint::{Mesh, Vertex, WHITE_UV};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, TextureId};
use glam::{Mat4, Vec3};

use crate::config::LightingConfig;
use crate::overlay::Primitive;
use crate::scene::{Material, OrbitCamera, SceneNode};

/// Base colour of meshes without a texture.
const UNTEXTURED: Color32 = Color32::from_gray(200);
/// Markers never shrink below this many pixels.
const MIN_MARKER_PX: f32 = 4.0;

// ─────────────────────────────────────────────────────────────────────────────
// Projection
// ─────────────────────────────────────────────────────────────────────────────

/// A world point mapped onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub pos: Pos2,
    /// NDC depth, `-1` at the near plane, `1` at the far plane.
    pub depth: f32,
    /// Clip-space `w` (view-space distance along the view axis).
    pub w: f32,
}

/// World to screen mapping for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    view_proj: Mat4,
    rect: Rect,
    /// Pixels per world unit at `w == 1`.
    focal_px: f32,
}

impl Projector {
    pub fn new(camera: &OrbitCamera, rect: Rect) -> Self {
        let aspect = rect.width() / rect.height().max(1.0);
        let proj = camera.projection_matrix(aspect);
        Self {
            view_proj: proj * camera.view_matrix(),
            rect,
            focal_px: proj.y_axis.y * rect.height() * 0.5,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// `None` for points behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= f32::EPSILON || clip.z < -clip.w {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Projected {
            pos: Pos2::new(
                self.rect.left() + (ndc.x + 1.0) * 0.5 * self.rect.width(),
                self.rect.top() + (1.0 - ndc.y) * 0.5 * self.rect.height(),
            ),
            depth: ndc.z,
            w: clip.w,
        })
    }

    /// On-screen size of a world-space length at clip depth `w`.
    pub fn pixels(&self, world_len: f32, w: f32) -> f32 {
        world_len * self.focal_px / w.max(f32::EPSILON)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lighting
// ─────────────────────────────────────────────────────────────────────────────

/// Per-face brightness from ambient plus positional lights.
#[derive(Debug, Clone)]
pub struct Shader {
    eye: Vec3,
    ambient: f32,
    lights: Vec<(Vec3, f32)>,
    /// Brightness of a face lit head-on by every light; maps to white.
    full_scale: f32,
}

impl Shader {
    pub fn new(lighting: &LightingConfig, eye: Vec3) -> Self {
        let lights: Vec<(Vec3, f32)> = lighting
            .lights
            .iter()
            .map(|l| (Vec3::from_array(l.position), l.intensity.max(0.0)))
            .collect();
        let ambient = lighting.ambient.max(0.0);
        let full_scale = ambient + lights.iter().map(|(_, i)| i).sum::<f32>();
        Self {
            eye,
            ambient,
            lights,
            full_scale: full_scale.max(f32::EPSILON),
        }
    }

    /// Brightness in `0..=1` of a face at `point` with normal `normal`.
    /// Faces are lit from whichever side faces the eye.
    pub fn brightness(&self, point: Vec3, normal: Vec3, material: &Material) -> f32 {
        let to_eye = (self.eye - point).normalize_or_zero();
        let mut n = normal.normalize_or_zero();
        if n.dot(to_eye) < 0.0 {
            n = -n;
        }

        let roughness = material.roughness.clamp(0.05, 1.0);
        let shininess = (2.0 / (roughness * roughness) - 2.0).clamp(1.0, 256.0);
        let spec_weight = (1.0 - roughness) * (0.25 + 0.75 * material.metalness.clamp(0.0, 1.0));

        let mut diffuse = 0.0;
        let mut specular = 0.0;
        for (pos, intensity) in &self.lights {
            let l = (*pos - point).normalize_or_zero();
            diffuse += intensity * n.dot(l).max(0.0);
            let h = (l + to_eye).normalize_or_zero();
            specular += intensity * spec_weight * n.dot(h).max(0.0).powf(shininess);
        }

        ((self.ambient + diffuse) / self.full_scale + specular / self.full_scale).clamp(0.0, 1.0)
    }
}

fn tint(color: Color32, brightness: f32) -> Color32 {
    let f = |c: u8| (c as f32 * brightness).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(f(color.r()), f(color.g()), f(color.b()), color.a())
}

// ─────────────────────────────────────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────────────────────────────────────

struct ScreenTriangle {
    pos: [Pos2; 3],
    uv: [Pos2; 3],
    depth: f32,
    color: Color32,
    texture: TextureId,
}

/// Project, shade and sort every triangle of `model`.
///
/// Returns one mesh per run of triangles sharing a texture, in paint order.
pub fn model_meshes(projector: &Projector, shader: &Shader, model: &SceneNode) -> Vec<Mesh> {
    let mut tris: Vec<ScreenTriangle> = Vec::with_capacity(model.triangle_count());

    model.visit_drawables(&mut |mesh, world| {
        let geom = &mesh.geometry;
        let textured = mesh.material.texture.is_some() && !geom.uvs.is_empty();
        let texture = mesh.material.texture.unwrap_or_default();
        let base = if textured { Color32::WHITE } else { UNTEXTURED };

        for idx in geom.triangles() {
            let [Some(p0), Some(p1), Some(p2)] = idx.map(|i| geom.positions.get(i).copied())
            else {
                continue;
            };
            let w = [
                world.transform_point3(p0),
                world.transform_point3(p1),
                world.transform_point3(p2),
            ];
            let (Some(a), Some(b), Some(c)) = (
                projector.project(w[0]),
                projector.project(w[1]),
                projector.project(w[2]),
            ) else {
                continue;
            };

            let normal = (w[1] - w[0]).cross(w[2] - w[0]);
            let centroid = (w[0] + w[1] + w[2]) / 3.0;
            let brightness = shader.brightness(centroid, normal, &mesh.material);

            let uv = if textured {
                idx.map(|i| {
                    let t = geom.uv(i);
                    Pos2::new(t.x, t.y)
                })
            } else {
                [WHITE_UV; 3]
            };

            tris.push(ScreenTriangle {
                pos: [a.pos, b.pos, c.pos],
                uv,
                depth: (a.depth + b.depth + c.depth) / 3.0,
                color: tint(base, brightness),
                texture: if textured { texture } else { TextureId::default() },
            });
        }
    });

    // Farthest first.
    tris.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    let mut meshes: Vec<Mesh> = Vec::new();
    for tri in tris {
        if meshes.last().is_none_or(|m| m.texture_id != tri.texture) {
            meshes.push(Mesh::with_texture(tri.texture));
        }
        let Some(mesh) = meshes.last_mut() else {
            continue;
        };
        let first = mesh.vertices.len() as u32;
        for k in 0..3 {
            mesh.vertices.push(Vertex {
                pos: tri.pos[k],
                uv: tri.uv[k],
                color: tri.color,
            });
        }
        mesh.add_triangle(first, first + 1, first + 2);
    }
    tracing::trace!(meshes = meshes.len(), "Built model meshes");
    meshes
}

pub fn paint_model(painter: &Painter, projector: &Projector, shader: &Shader, model: &SceneNode) {
    for mesh in model_meshes(projector, shader, model) {
        painter.add(Shape::mesh(mesh));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Measurement overlay
// ─────────────────────────────────────────────────────────────────────────────

/// Draw overlay primitives on top of the model. Lines go first so the
/// markers stay visible at the segment ends.
pub fn paint_overlay(
    painter: &Painter,
    projector: &Projector,
    eye: Vec3,
    primitives: &[Primitive],
    tube_segments: usize,
) {
    for prim in primitives {
        let Primitive::Line(line) = prim else {
            continue;
        };
        if let (Some(a), Some(b)) = (projector.project(line.start), projector.project(line.end)) {
            painter.line_segment([a.pos, b.pos], Stroke::new(1.5, line.color));
        }

        let mut tris: Vec<([Projected; 3], f32)> = Vec::new();
        for tri in line.tube(tube_segments) {
            let (Some(a), Some(b), Some(c)) = (
                projector.project(tri[0]),
                projector.project(tri[1]),
                projector.project(tri[2]),
            ) else {
                continue;
            };
            let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            let v = (eye - tri[0]).normalize_or_zero();
            tris.push(([a, b, c], 0.6 + 0.4 * n.dot(v).abs()));
        }
        tris.sort_by(|x, y| {
            let dx = x.0.iter().map(|p| p.depth).sum::<f32>();
            let dy = y.0.iter().map(|p| p.depth).sum::<f32>();
            dy.total_cmp(&dx)
        });

        let mut mesh = Mesh::default();
        for (pts, shade) in tris {
            let first = mesh.vertices.len() as u32;
            for p in pts {
                mesh.colored_vertex(p.pos, tint(line.color, shade));
            }
            mesh.add_triangle(first, first + 1, first + 2);
        }
        if !mesh.is_empty() {
            painter.add(Shape::mesh(mesh));
        }
    }

    let label_font = FontId::proportional(
        painter
            .ctx()
            .style()
            .text_styles
            .get(&egui::TextStyle::Body)
            .map_or(14.0, |f| f.size)
            * 1.2,
    );
    for prim in primitives {
        let Primitive::Marker(marker) = prim else {
            continue;
        };
        let Some(center) = projector.project(marker.position) else {
            continue;
        };
        let radius = projector.pixels(marker.radius, center.w).max(MIN_MARKER_PX);
        painter.circle(
            center.pos,
            radius,
            marker.color,
            Stroke::new(1.0, Color32::from_black_alpha(160)),
        );
        painter.text(
            center.pos + egui::vec2(radius + 4.0, -radius - 2.0),
            Align2::LEFT_BOTTOM,
            format!("P{}", marker.index + 1),
            label_font.clone(),
            marker.color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::cube_mesh;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn target_projects_to_viewport_centre() {
        let projector = Projector::new(&OrbitCamera::default(), rect());
        let p = projector.project(Vec3::ZERO).unwrap();
        assert!((p.pos - rect().center()).length() < 1e-3);
        assert!((p.w - 10.0).abs() < 1e-4);
        assert!(projector.project(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn projected_size_shrinks_with_distance() {
        let projector = Projector::new(&OrbitCamera::default(), rect());
        assert!(projector.pixels(1.0, 5.0) > projector.pixels(1.0, 10.0));
        // 50° vertical FOV over 600 px at distance 10.
        let expected = 300.0 / (25f32.to_radians().tan() * 10.0);
        assert!((projector.pixels(1.0, 10.0) - expected).abs() < 1e-2);
    }

    #[test]
    fn brightness_stays_in_range_and_favours_lit_faces() {
        let shader = Shader::new(&LightingConfig::default(), Vec3::new(0.0, 0.0, 10.0));
        let material = Material::default();
        let towards_light = shader.brightness(Vec3::ZERO, Vec3::ONE, &material);
        let sideways = shader.brightness(Vec3::ZERO, Vec3::new(1.0, -1.0, 0.0), &material);
        assert!((0.0..=1.0).contains(&towards_light));
        assert!((0.0..=1.0).contains(&sideways));
        assert!(towards_light > sideways);
    }

    #[test]
    fn cube_front_faces_paint_last() {
        let cube = SceneNode::Mesh(cube_mesh("cube", 1.0));
        let cam = OrbitCamera::default();
        let projector = Projector::new(&cam, rect());
        let shader = Shader::new(&LightingConfig::default(), cam.eye());
        let meshes = model_meshes(&projector, &shader, &cube);
        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert_eq!(mesh.indices.len(), 12 * 3);

        // The last triangle belongs to the front face, which spans the centre.
        let last: Vec<Pos2> = mesh.vertices[mesh.vertices.len() - 3..]
            .iter()
            .map(|v| v.pos)
            .collect();
        let centre = rect().center();
        let min_x = last.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = last.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        assert!(min_x < centre.x && max_x > centre.x);
    }
}

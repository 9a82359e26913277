//! Scene graph for the loaded model.
//!
//! An OBJ import yields one [`GroupNode`] holding one [`MeshNode`] per OBJ
//! object. Nodes are a tagged enum so traversals can tell drawable leaves
//! from containers without a type hierarchy.

pub mod camera;
pub mod loader;

use egui::TextureId;
use glam::{Mat4, Vec2, Vec3};

pub use camera::OrbitCamera;
pub use loader::{LoadOutcome, LoadedAssets, PendingLoad, TextureImage};

// ─────────────────────────────────────────────────────────────────────────────
// Bounds
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a point set, `None` when empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounds of the eight corners after `transform`.
    pub fn transformed(&self, transform: Mat4) -> Aabb {
        let corners = (0..8).map(|i| {
            let c = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            transform.transform_point3(c)
        });
        // Eight corners, never empty.
        Aabb::from_points(corners).unwrap_or(*self)
    }

    /// Slab test. Returns `(t_near, t_far)` clamped to the ray's forward half.
    pub fn ray_intersect(&self, origin: Vec3, dir_inv: Vec3) -> Option<(f32, f32)> {
        let t1 = (self.min - origin) * dir_inv;
        let t2 = (self.max - origin) * dir_inv;
        let t_min = t1.min(t2).max_element();
        let t_max = t1.max(t2).min_element();

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// Indexed triangle list with optional per-vertex UVs (top-left origin).
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of each complete triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Local-space bounds of the referenced positions.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// UV for vertex `i`, or the origin when the mesh has no UVs.
    pub fn uv(&self, i: usize) -> Vec2 {
        self.uvs.get(i).copied().unwrap_or(Vec2::ZERO)
    }
}

/// Surface parameters shared by every drawable node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub texture: Option<TextureId>,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            texture: None,
            roughness: 0.5,
            metalness: 0.2,
        }
    }
}

/// A drawable leaf.
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    pub transform: Mat4,
    pub geometry: Geometry,
    pub material: Material,
}

/// A container of child nodes.
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub name: String,
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone)]
pub enum SceneNode {
    Group(GroupNode),
    Mesh(MeshNode),
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Group(g) => &g.name,
            SceneNode::Mesh(m) => &m.name,
        }
    }

    pub fn transform(&self) -> Mat4 {
        match self {
            SceneNode::Group(g) => g.transform,
            SceneNode::Mesh(m) => m.transform,
        }
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        match self {
            SceneNode::Group(g) => g.transform = transform,
            SceneNode::Mesh(m) => m.transform = transform,
        }
    }

    pub fn is_drawable(&self) -> bool {
        matches!(self, SceneNode::Mesh(_))
    }

    /// Visit every drawable leaf together with its world matrix.
    pub fn visit_drawables<F: FnMut(&MeshNode, Mat4)>(&self, f: &mut F) {
        self.walk(Mat4::IDENTITY, f);
    }

    fn walk<F: FnMut(&MeshNode, Mat4)>(&self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform();
        match self {
            SceneNode::Group(g) => {
                for child in &g.children {
                    child.walk(world, f);
                }
            }
            SceneNode::Mesh(m) => f(m, world),
        }
    }

    /// Apply `f` to every drawable leaf.
    pub fn for_each_drawable_mut<F: FnMut(&mut MeshNode)>(&mut self, f: &mut F) {
        match self {
            SceneNode::Group(g) => {
                for child in &mut g.children {
                    child.for_each_drawable_mut(f);
                }
            }
            SceneNode::Mesh(m) => f(m),
        }
    }

    /// Set the same material on every drawable leaf.
    pub fn apply_material(&mut self, material: Material) {
        self.for_each_drawable_mut(&mut |mesh| mesh.material = material);
    }

    pub fn drawable_count(&self) -> usize {
        let mut n = 0;
        self.visit_drawables(&mut |_, _| n += 1);
        n
    }

    pub fn triangle_count(&self) -> usize {
        let mut n = 0;
        self.visit_drawables(&mut |mesh, _| n += mesh.geometry.triangle_count());
        n
    }

    /// World-space bounds of all drawables.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        self.visit_drawables(&mut |mesh, world| {
            if let Some(local) = mesh.geometry.bounds() {
                let b = local.transformed(world);
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        });
        bounds
    }

    /// Centre the node on the origin and scale it uniformly so its largest
    /// dimension equals `size`. Returns the applied scale (1 for a
    /// degenerate model).
    pub fn normalize(&mut self, size: f32) -> f32 {
        let Some(bounds) = self.world_bounds() else {
            return 1.0;
        };
        let max_dim = bounds.size().max_element();
        let scale = if max_dim > f32::EPSILON {
            size / max_dim
        } else {
            1.0
        };
        let fit = Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-bounds.center());
        self.set_transform(fit * self.transform());
        scale
    }
}

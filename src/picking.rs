//! Screen-space click to world-space surface point.
//!
//! A click is converted to normalized device coordinates, unprojected through
//! the inverse view-projection into a world ray, and intersected against
//! every drawable of the model. The closest hit wins.

use glam::{Mat4, Vec2, Vec3};

use crate::data::measurement::Point3;
use crate::scene::{OrbitCamera, SceneNode};

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;
/// Hits closer than this to the origin are ignored.
const HIT_EPSILON: f32 = 1e-6;

/// Pixel position relative to the surface's top-left corner to NDC.
///
/// `x` maps `0..width` to `-1..1`; `y` is inverted so the top edge is `+1`.
/// Returns `None` for an empty surface.
pub fn pointer_to_ndc(pointer: Vec2, surface_size: Vec2) -> Option<Vec2> {
    if !(surface_size.x > 0.0 && surface_size.y > 0.0) || !pointer.is_finite() {
        return None;
    }
    Some(Vec2::new(
        pointer.x / surface_size.x * 2.0 - 1.0,
        1.0 - pointer.y / surface_size.y * 2.0,
    ))
}

/// A world-space half-line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray from the camera eye through an NDC point.
    pub fn from_camera(camera: &OrbitCamera, ndc: Vec2, aspect: f32) -> Self {
        let inv = camera.view_projection(aspect).inverse();
        Self::unproject(inv, camera.eye(), ndc)
    }

    fn unproject(inv_view_proj: Mat4, eye: Vec3, ndc: Vec2) -> Self {
        let near = inv_view_proj.project_point3(ndc.extend(-1.0));
        let far = inv_view_proj.project_point3(ndc.extend(1.0));
        let direction = far - near;
        Self::new(eye, direction)
    }
}

/// Möller–Trumbore ray/triangle test. Both faces count as hits.
///
/// Returns the ray parameter of the hit.
pub fn ray_triangle_intersect(
    origin: Vec3,
    direction: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(h) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > HIT_EPSILON).then_some(t)
}

/// Closest hit of `ray` against every drawable under `model`, in world space.
pub fn intersect_scene(model: &SceneNode, ray: &Ray) -> Option<Vec3> {
    if ray.direction == Vec3::ZERO {
        return None;
    }
    let dir_inv = ray.direction.recip();
    let mut best: Option<f32> = None;

    model.visit_drawables(&mut |mesh, world| {
        let Some(local_bounds) = mesh.geometry.bounds() else {
            return;
        };
        let Some((t_enter, _)) = local_bounds
            .transformed(world)
            .ray_intersect(ray.origin, dir_inv)
        else {
            return;
        };
        if best.is_some_and(|b| t_enter > b) {
            return;
        }

        let positions = &mesh.geometry.positions;
        for [a, b, c] in mesh.geometry.triangles() {
            let (Some(pa), Some(pb), Some(pc)) =
                (positions.get(a), positions.get(b), positions.get(c))
            else {
                continue;
            };
            let hit = ray_triangle_intersect(
                ray.origin,
                ray.direction,
                world.transform_point3(*pa),
                world.transform_point3(*pb),
                world.transform_point3(*pc),
            );
            if let Some(t) = hit {
                if best.is_none_or(|b| t < b) {
                    best = Some(t);
                }
            }
        }
    });

    best.map(|t| ray.point_at(t))
}

/// Resolve a click to the surface point under it.
///
/// `pointer` is relative to the surface's top-left corner. Returns `None` when
/// no model is loaded, the surface is empty or the ray misses.
pub fn pick(
    model: Option<&SceneNode>,
    camera: &OrbitCamera,
    pointer: Vec2,
    surface_size: Vec2,
) -> Option<Point3> {
    let model = model?;
    let ndc = pointer_to_ndc(pointer, surface_size)?;
    let ray = Ray::from_camera(camera, ndc, surface_size.x / surface_size.y);
    let hit = intersect_scene(model, &ray)?;
    tracing::trace!(?ndc, ?hit, "Pick hit");
    Point3::from_hit(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::cube_mesh;
    use crate::scene::GroupNode;

    const SURFACE: Vec2 = Vec2::new(800.0, 600.0);

    fn normalized_cube() -> SceneNode {
        let mut node = SceneNode::Group(GroupNode {
            name: "cube".into(),
            transform: Mat4::IDENTITY,
            children: vec![SceneNode::Mesh(cube_mesh("cube", 1.0))],
        });
        node.normalize(5.0);
        node
    }

    #[test]
    fn ndc_corners_and_centre() {
        assert_eq!(pointer_to_ndc(Vec2::ZERO, SURFACE), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(pointer_to_ndc(SURFACE, SURFACE), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(pointer_to_ndc(SURFACE * 0.5, SURFACE), Some(Vec2::ZERO));
        assert_eq!(pointer_to_ndc(Vec2::ZERO, Vec2::new(0.0, 600.0)), None);
    }

    #[test]
    fn triangle_hit_from_either_side() {
        let (v0, v1, v2) = (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let front = ray_triangle_intersect(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z, v0, v1, v2);
        assert!((front.unwrap() - 3.0).abs() < 1e-6);
        let back = ray_triangle_intersect(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, v0, v1, v2);
        assert!((back.unwrap() - 2.0).abs() < 1e-6);

        // Outside the triangle, parallel and behind.
        assert!(ray_triangle_intersect(Vec3::new(2.0, 0.0, 3.0), Vec3::NEG_Z, v0, v1, v2).is_none());
        assert!(ray_triangle_intersect(Vec3::new(0.0, 0.0, 3.0), Vec3::X, v0, v1, v2).is_none());
        assert!(ray_triangle_intersect(Vec3::new(0.0, 0.0, 3.0), Vec3::Z, v0, v1, v2).is_none());
    }

    #[test]
    fn centre_click_hits_front_face() {
        let cube = normalized_cube();
        let cam = OrbitCamera::default();
        let hit = pick(Some(&cube), &cam, SURFACE * 0.5, SURFACE).unwrap();
        assert!(hit.x.abs() < 1e-3 && hit.y.abs() < 1e-3);
        assert!((hit.z - 2.5).abs() < 1e-3);
    }

    #[test]
    fn corner_click_misses() {
        let cube = normalized_cube();
        let cam = OrbitCamera::default();
        assert!(pick(Some(&cube), &cam, Vec2::new(2.0, 2.0), SURFACE).is_none());
    }

    #[test]
    fn no_model_means_no_hit() {
        let cam = OrbitCamera::default();
        assert!(pick(None, &cam, SURFACE * 0.5, SURFACE).is_none());
    }

    #[test]
    fn closest_of_several_meshes_wins() {
        let mut far = cube_mesh("far", 1.0);
        far.transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
        let mut near = cube_mesh("near", 0.5);
        near.transform = Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0));
        // Far mesh first so traversal order does not decide.
        let scene = SceneNode::Group(GroupNode {
            name: "root".into(),
            transform: Mat4::IDENTITY,
            children: vec![SceneNode::Mesh(far), SceneNode::Mesh(near)],
        });
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = intersect_scene(&scene, &ray).unwrap();
        assert!((hit.z - 2.5).abs() < 1e-5);
    }

    #[test]
    fn nested_transforms_are_accumulated() {
        let mut child = cube_mesh("child", 1.0);
        child.transform = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        let scene = SceneNode::Group(GroupNode {
            name: "outer".into(),
            transform: Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            children: vec![SceneNode::Group(GroupNode {
                name: "inner".into(),
                transform: Mat4::IDENTITY,
                children: vec![SceneNode::Mesh(child)],
            })],
        });
        let ray = Ray::new(Vec3::new(2.0, 3.0, 10.0), Vec3::NEG_Z);
        let hit = intersect_scene(&scene, &ray).unwrap();
        assert!((hit - Vec3::new(2.0, 3.0, 1.0)).length() < 1e-5);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(intersect_scene(&scene, &ray).is_none());
    }
}

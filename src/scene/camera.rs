//! Orbit camera: perspective projection around a target point.
//!
//! Right-handed, Y-up, GL clip space (`z` in `-1..1`). Drag and scroll input
//! is accumulated into pending deltas and applied with damping, one
//! fraction per frame, so the view eases out after the pointer stops.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Pitch is kept this far from the poles to avoid a degenerate look-at.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Below this the pending motion is dropped.
const SETTLE_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Rotation around +Y, radians. 0 looks down -Z.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    min_distance: f32,
    max_distance: f32,
    damping: f32,
    rotate_speed: f32,
    zoom_speed: f32,

    pending_yaw: f32,
    pending_pitch: f32,
    /// Pending log-scale zoom; positive zooms in.
    pending_zoom: f32,

    home: (Vec3, f32, f32, f32),
}

impl OrbitCamera {
    pub fn from_config(cfg: &CameraConfig) -> Self {
        let target = Vec3::from_array(cfg.target);
        let offset = Vec3::from_array(cfg.position) - target;
        let distance = offset
            .length()
            .clamp(cfg.min_distance, cfg.max_distance.max(cfg.min_distance));
        let (yaw, pitch) = if offset.length_squared() > f32::EPSILON {
            let dir = offset.normalize();
            (dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin())
        } else {
            (0.0, 0.0)
        };
        Self {
            target,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            fov_y: cfg.fov_y_deg.to_radians(),
            near: cfg.near,
            far: cfg.far,
            min_distance: cfg.min_distance,
            max_distance: cfg.max_distance.max(cfg.min_distance),
            damping: cfg.damping.clamp(0.0, 1.0),
            rotate_speed: cfg.rotate_speed,
            zoom_speed: cfg.zoom_speed,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            home: (target, yaw, pitch, distance),
        }
    }

    /// World-space eye position.
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Queue an orbit from a pointer drag in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    /// Queue a zoom from scroll points; positive scrolls in.
    pub fn zoom(&mut self, scroll: f32) {
        self.pending_zoom += scroll * self.zoom_speed;
    }

    /// Apply one frame of damped motion. Returns `true` while still moving.
    pub fn update(&mut self) -> bool {
        let k = if self.damping > 0.0 { self.damping } else { 1.0 };

        self.yaw += self.pending_yaw * k;
        self.pitch = (self.pitch + self.pending_pitch * k).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = (self.distance * (-self.pending_zoom * k).exp())
            .clamp(self.min_distance, self.max_distance);

        self.pending_yaw *= 1.0 - k;
        self.pending_pitch *= 1.0 - k;
        self.pending_zoom *= 1.0 - k;

        let moving = self.pending_yaw.abs() > SETTLE_EPSILON
            || self.pending_pitch.abs() > SETTLE_EPSILON
            || self.pending_zoom.abs() > SETTLE_EPSILON;
        if !moving {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            self.pending_zoom = 0.0;
        }
        moving
    }

    /// Return to the configured pose and drop pending motion.
    pub fn reset(&mut self) {
        let (target, yaw, pitch, distance) = self.home;
        self.target = target;
        self.yaw = yaw;
        self.pitch = pitch;
        self.distance = distance;
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
    }

    pub fn distance_limits(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

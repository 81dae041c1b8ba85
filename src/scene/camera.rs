use glam::{Mat4, Vec3};

use super::frustum::Frustum;
use crate::settings::SHADOW_CASCADES;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far)
    }
    pub fn position(&self) -> Vec3 {
        self.eye
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Context the frame is built for. Changing it invalidates the static cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ViewMode {
    pub editor: bool,
    pub debug: bool,
}

/// Everything the frame pipeline needs to know about the views it renders.
#[derive(Clone, Copy, Debug)]
pub struct FrameView {
    pub view: Mat4,
    pub fov_y_radians: f32,
    pub aspect: f32,
    /// View-projection of each directional shadow cascade.
    pub cascades: [Mat4; SHADOW_CASCADES],
    pub mode: ViewMode,
    /// Build only skybox geometry, for captures.
    pub skybox_only: bool,
}

impl FrameView {
    pub fn from_camera(camera: &Camera, aspect: f32) -> Self {
        Self {
            view: camera.view(),
            fov_y_radians: camera.fov_y_radians,
            aspect,
            cascades: [Mat4::IDENTITY; SHADOW_CASCADES],
            mode: ViewMode::default(),
            skybox_only: false,
        }
    }

    pub fn with_cascades(mut self, cascades: [Mat4; SHADOW_CASCADES]) -> Self {
        self.cascades = cascades;
        self
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_perspective(&self.view, self.fov_y_radians, self.aspect)
    }

    pub fn cascade_frustum(&self, cascade: usize) -> Frustum {
        Frustum::from_orthographic(&self.cascades[cascade])
    }

    pub fn inv_tan_half_fov(&self) -> f32 {
        1.0 / (self.fov_y_radians * 0.5).tan()
    }
}

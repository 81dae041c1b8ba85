use glam::{Mat4, Vec3, Vec4};

/// Distance along the view direction at which the side planes are sampled.
/// Any positive value yields the same planes.
const PLANE_SAMPLE_DISTANCE: f32 = 5.0;

/// Four side planes of a view volume. There is no near or far plane, so
/// anything inside the infinite pyramid (or slab for orthographic views)
/// counts as visible.
///
/// Planes are stored as `(normal, d)` with normals pointing into the volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub top: Vec4,
    pub bottom: Vec4,
    pub left: Vec4,
    pub right: Vec4,
}

impl Frustum {
    /// Planes through the eye of a perspective camera with world-to-view
    /// matrix `view`.
    pub fn from_perspective(view: &Mat4, fov_y_radians: f32, aspect: f32) -> Self {
        let inv = view.inverse();
        let front = -inv.z_axis.truncate();
        let side = inv.x_axis.truncate();
        let up = inv.y_axis.truncate();
        let origin = inv.w_axis.truncate();

        let half_v = PLANE_SAMPLE_DISTANCE * (fov_y_radians * 0.5).tan();
        let half_h = half_v * aspect;
        let ahead = front * PLANE_SAMPLE_DISTANCE;

        let top_right = ahead + side * half_h + up * half_v;
        let bottom_right = ahead + side * half_h - up * half_v;
        let bottom_left = ahead - side * half_h - up * half_v;
        let top_left = ahead - side * half_h + up * half_v;

        let right = -top_right.cross(up).normalize();
        let bottom = -bottom_right.cross(side).normalize();
        let left = bottom_left.cross(up).normalize();
        let top = top_left.cross(side).normalize();

        Self {
            top: plane_through(top, origin),
            bottom: plane_through(bottom, origin),
            left: plane_through(left, origin),
            right: plane_through(right, origin),
        }
    }

    /// Side planes of an orthographic view-projection, such as a shadow
    /// cascade. Depth range is ignored.
    pub fn from_orthographic(view_proj: &Mat4) -> Self {
        let inv = view_proj.inverse();
        let corner = |x: f32, y: f32| inv.project_point3(Vec3::new(x, y, 1.0));

        let top_right = corner(1.0, 1.0);
        let top_left = corner(-1.0, 1.0);
        let bottom_right = corner(1.0, -1.0);

        let down = (bottom_right - top_right).normalize();
        let leftward = (top_left - top_right).normalize();

        Self {
            top: down.extend(-down.dot(top_right)),
            bottom: (-down).extend(down.dot(bottom_right)),
            right: leftward.extend(-leftward.dot(top_right)),
            left: (-leftward).extend(leftward.dot(top_left)),
        }
    }

    /// Cone-enclosing square frustum for a spotlight.
    pub fn from_spotlight(position: Vec3, direction: Vec3, outer_angle: f32) -> Self {
        let direction = if direction.length_squared() > 0.0 {
            direction.normalize()
        } else {
            Vec3::NEG_Z
        };
        let up = if direction.dot(Vec3::Y).abs() > 0.99 {
            Vec3::X
        } else {
            Vec3::Y
        };
        let view = Mat4::look_to_rh(position, direction, up);
        Self::from_perspective(&view, outer_angle * 2.0, 1.0)
    }

    pub fn planes(&self) -> [Vec4; 4] {
        [self.top, self.bottom, self.left, self.right]
    }

    /// True unless the sphere lies entirely behind one of the planes.
    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes()
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }
}

/// Writes one visibility flag per sphere (`xyz` centre, `w` radius).
pub fn cull_spheres(frustum: &Frustum, spheres: &[Vec4], out: &mut [bool]) {
    debug_assert_eq!(spheres.len(), out.len());
    for (visible, sphere) in out.iter_mut().zip(spheres) {
        *visible = frustum.intersects_sphere(sphere.truncate(), sphere.w);
    }
}

fn plane_through(normal: Vec3, point: Vec3) -> Vec4 {
    normal.extend(-normal.dot(point))
}

use glam::{Mat4, Vec3, Vec4};
use render_lists::scene::{cull_spheres, Camera, FrameView, Frustum};

fn view_down_negative_z() -> Frustum {
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    Frustum::from_perspective(&view, 60f32.to_radians(), 16.0 / 9.0)
}

#[test]
fn spheres_outside_are_culled_and_straddling_spheres_kept() {
    let frustum = view_down_negative_z();
    let spheres = [
        // Well inside.
        Vec4::new(0.0, 0.0, -20.0, 1.0),
        // Fully outside the right plane.
        Vec4::new(200.0, 0.0, -20.0, 1.0),
        // Fully above the top plane.
        Vec4::new(0.0, 200.0, -20.0, 1.0),
        // Centre just outside the left plane, radius reaches back in.
        Vec4::new(-20.0 * 16.0 / 9.0 * 30f32.to_radians().tan() - 0.5, 0.0, -20.0, 2.0),
    ];
    let mut visible = [true; 4];
    cull_spheres(&frustum, &spheres, &mut visible);

    assert_eq!(visible, [true, false, false, true]);
}

#[test]
fn no_near_plane_keeps_objects_behind_the_eye() {
    // Only side planes are tested, so a sphere on the view axis behind the
    // camera is inside every half-space.
    let frustum = view_down_negative_z();
    let mut visible = [false];
    cull_spheres(&frustum, &[Vec4::new(0.0, 0.0, 10.0, 1.0)], &mut visible);
    assert!(visible[0]);
}

#[test]
fn frustum_agrees_with_projected_points() {
    let camera = Camera {
        eye: Vec3::new(3.0, 4.0, 10.0),
        target: Vec3::new(0.0, 1.0, 0.0),
        ..Camera::default()
    };
    let aspect = 1.5;
    let view = FrameView::from_camera(&camera, aspect);
    let frustum = view.frustum();
    let view_proj = camera.proj(aspect) * camera.view();

    for x in -10..=10 {
        for y in -10..=10 {
            let point = Vec3::new(x as f32 * 2.0, y as f32 * 2.0, -5.0);
            let clip = view_proj * point.extend(1.0);
            if clip.w <= 0.0 {
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            let inside = ndc.x.abs() < 0.98 && ndc.y.abs() < 0.98;
            let outside = ndc.x.abs() > 1.02 || ndc.y.abs() > 1.02;
            if inside {
                assert!(frustum.intersects_sphere(point, 0.0), "{point:?} should be visible");
            }
            if outside {
                assert!(!frustum.intersects_sphere(point, 0.0), "{point:?} should be culled");
            }
        }
    }
}

#[test]
fn cascade_frustum_bounds_orthographic_box() {
    let light_view = Mat4::look_at_rh(Vec3::new(0.0, 20.0, 0.0), Vec3::ZERO, Vec3::Z);
    let proj = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 50.0);
    let frustum = Frustum::from_orthographic(&(proj * light_view));

    let spheres = [
        Vec4::new(0.0, 0.0, 0.0, 0.5),
        Vec4::new(4.0, -3.0, 4.0, 0.5),
        Vec4::new(7.0, 0.0, 0.0, 0.5),
        Vec4::new(0.0, 0.0, -7.0, 0.5),
        Vec4::new(5.3, 0.0, 0.0, 0.5),
    ];
    let mut visible = [false; 5];
    cull_spheres(&frustum, &spheres, &mut visible);
    assert_eq!(visible, [true, true, false, false, true]);
}

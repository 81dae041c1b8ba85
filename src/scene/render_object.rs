use bitflags::bitflags;
use glam::{Mat4, Vec3};

use crate::asset::{BoundingSphere, Handle, Model};
use crate::renderer::material::Material;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const VISIBLE = 1 << 0;
        const SHADOW_CASTER = 1 << 1;
        const SKYBOX = 1 << 2;
        /// Never moves; classified once into the static cache.
        const STATIC = 1 << 3;
        /// Also drawn in the depth prepass.
        const SORT_FIRST = 1 << 4;
        const LIGHTMAPPED = 1 << 5;
        const OUTLINE = 1 << 6;
        const NO_TAA = 1 << 7;
    }
}

impl Default for ObjectFlags {
    fn default() -> Self {
        ObjectFlags::VISIBLE | ObjectFlags::SHADOW_CASTER
    }
}

/// Renderer-side proxy for one drawable instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderObject {
    pub transform: Mat4,
    pub model: Option<Handle<Model>>,
    pub material_override: Option<Handle<Material>>,
    pub flags: ObjectFlags,
    /// Offset of this object's skinning matrices in the current bone buffer.
    pub bone_offset: Option<u32>,
    pub(crate) prev_transform: Mat4,
    pub(crate) prev_bone_offset: Option<u32>,
}

impl Default for RenderObject {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            model: None,
            material_override: None,
            flags: ObjectFlags::default(),
            bone_offset: None,
            prev_transform: Mat4::IDENTITY,
            prev_bone_offset: None,
        }
    }
}

impl RenderObject {
    pub fn new(model: Handle<Model>, transform: Mat4) -> Self {
        Self {
            transform,
            model: Some(model),
            prev_transform: transform,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_material_override(mut self, material: Handle<Material>) -> Self {
        self.material_override = Some(material);
        self
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(ObjectFlags::STATIC)
    }

    pub fn is_skybox(&self) -> bool {
        self.flags.contains(ObjectFlags::SKYBOX)
    }

    pub fn prev_transform(&self) -> Mat4 {
        self.prev_transform
    }

    /// World-space bounds, or a zero-radius sphere at the origin of the
    /// transform when the model is unknown.
    pub fn world_bounds(&self, model: Option<&Model>) -> BoundingSphere {
        match model {
            Some(model) => model.bounding_sphere.transformed(&self.transform),
            None => BoundingSphere::new(self.transform.w_axis.truncate(), 0.0),
        }
    }

    /// Whether switching from `self` to `next` invalidates cached static
    /// classification.
    pub(crate) fn static_state_differs(&self, next: &RenderObject) -> bool {
        if self.is_static() != next.is_static() {
            return true;
        }
        self.is_static()
            && (self.model != next.model
                || self.material_override != next.material_override
                || self.flags != next.flags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional { direction: Vec3 },
    Point { range: f32 },
    Spot {
        direction: Vec3,
        range: f32,
        /// Half-angle of the outer cone, in radians.
        outer_angle: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLight {
    pub kind: LightKind,
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub casts_shadow: bool,
    pub(crate) shadow_dirty: bool,
}

impl RenderLight {
    pub fn spot(position: Vec3, direction: Vec3, range: f32, outer_angle: f32) -> Self {
        Self {
            kind: LightKind::Spot {
                direction,
                range,
                outer_angle,
            },
            position,
            color: Vec3::ONE,
            intensity: 1.0,
            casts_shadow: true,
            shadow_dirty: true,
        }
    }

    pub fn point(position: Vec3, range: f32) -> Self {
        Self {
            kind: LightKind::Point { range },
            position,
            color: Vec3::ONE,
            intensity: 1.0,
            casts_shadow: false,
            shadow_dirty: false,
        }
    }

    pub fn with_shadows(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    pub fn is_shadow_dirty(&self) -> bool {
        self.shadow_dirty
    }

    pub(crate) fn needs_shadow_update(&self) -> bool {
        self.casts_shadow && self.shadow_dirty && matches!(self.kind, LightKind::Spot { .. })
    }
}

/// Projected box decal. The box is the unit cube under `transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderDecal {
    pub transform: Mat4,
    pub material: Handle<Material>,
    pub ordinal: u32,
}

impl RenderDecal {
    pub fn new(transform: Mat4, material: Handle<Material>) -> Self {
        Self {
            transform,
            material,
            ordinal: 0,
        }
    }

    pub fn world_bounds(&self) -> BoundingSphere {
        // Circumscribed sphere of the [-0.5, 0.5] cube.
        BoundingSphere::new(Vec3::ZERO, 0.75f32.sqrt()).transformed(&self.transform)
    }
}

use std::ops::Range;

use glam::{Mat4, Vec3, Vec4};

use super::Handle;
use crate::renderer::material::Material;

/// Vertex buffer layout a model's geometry lives in. Models sharing a layout
/// share one merged vertex/index buffer pair and can be multi-drawn together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VertexLayout {
    #[default]
    Standard,
    Skinned,
    Lightmapped,
}

impl VertexLayout {
    pub const fn id(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// World-space sphere for a model-space sphere under `transform`. The
    /// radius grows with the largest axis scale so the sphere stays conservative.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let center = transform.transform_point3(self.center);
        let scale = transform
            .x_axis
            .truncate()
            .length()
            .max(transform.y_axis.truncate().length())
            .max(transform.z_axis.truncate().length());
        Self {
            center,
            radius: self.radius * scale,
        }
    }

    pub fn to_vec4(self) -> Vec4 {
        self.center.extend(self.radius)
    }
}

/// One level of detail: a contiguous range of submeshes, used while the
/// object's squared screen percentage is at or below `end_percentage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lod {
    pub end_percentage: f32,
    pub first_submesh: u32,
    pub submesh_count: u32,
}

impl Lod {
    pub fn submeshes(&self) -> Range<usize> {
        let start = self.first_submesh as usize;
        start..start + self.submesh_count as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submesh {
    pub material_index: u32,
    pub base_vertex: i32,
    pub first_index: u32,
    pub index_count: u32,
}

/// Geometry ranges inside the merged buffers for one submesh draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawRange {
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
}

pub struct Model {
    pub uid: u32,
    pub lods: Vec<Lod>,
    pub submeshes: Vec<Submesh>,
    pub materials: Vec<Handle<Material>>,
    pub bounding_sphere: BoundingSphere,
    pub vertex_layout: VertexLayout,
    pub merged_base_vertex: i32,
    pub merged_first_index: u32,
    pub loaded: bool,
    pub skinned: bool,
    pub has_lightmap_coords: bool,
}

impl Model {
    /// A loaded, single-LOD model drawing every submesh.
    pub fn new(uid: u32, submeshes: Vec<Submesh>, materials: Vec<Handle<Material>>) -> Self {
        let lods = vec![Lod {
            end_percentage: f32::MAX,
            first_submesh: 0,
            submesh_count: submeshes.len() as u32,
        }];
        Self {
            uid,
            lods,
            submeshes,
            materials,
            bounding_sphere: BoundingSphere::new(Vec3::ZERO, 1.0),
            vertex_layout: VertexLayout::Standard,
            merged_base_vertex: 0,
            merged_first_index: 0,
            loaded: true,
            skinned: false,
            has_lightmap_coords: false,
        }
    }

    pub fn with_lods(mut self, lods: Vec<Lod>) -> Self {
        if !lods.is_empty() {
            self.lods = lods;
        }
        self
    }

    pub fn with_bounding_sphere(mut self, sphere: BoundingSphere) -> Self {
        self.bounding_sphere = sphere;
        self
    }

    pub fn with_vertex_layout(mut self, layout: VertexLayout) -> Self {
        self.vertex_layout = layout;
        self.skinned = layout == VertexLayout::Skinned;
        self.has_lightmap_coords = layout == VertexLayout::Lightmapped;
        self
    }

    pub fn with_merged_offsets(mut self, base_vertex: i32, first_index: u32) -> Self {
        self.merged_base_vertex = base_vertex;
        self.merged_first_index = first_index;
        self
    }

    pub fn unloaded(mut self) -> Self {
        self.loaded = false;
        self
    }

    /// Submesh index range for `lod`, empty if the LOD does not exist.
    pub fn lod_submeshes(&self, lod: usize) -> Range<usize> {
        self.lods
            .get(lod)
            .map(|lod| {
                let range = lod.submeshes();
                range.start.min(self.submeshes.len())..range.end.min(self.submeshes.len())
            })
            .unwrap_or(0..0)
    }

    pub fn default_material(&self, submesh: usize) -> Option<Handle<Material>> {
        let submesh = self.submeshes.get(submesh)?;
        self.materials.get(submesh.material_index as usize).copied()
    }

    pub fn draw_range(&self, submesh: usize) -> Option<DrawRange> {
        let submesh = self.submeshes.get(submesh)?;
        Some(DrawRange {
            index_count: submesh.index_count,
            first_index: self.merged_first_index + submesh.first_index,
            base_vertex: self.merged_base_vertex + submesh.base_vertex,
        })
    }
}

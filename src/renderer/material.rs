use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use bitflags::bitflags;
use log::trace;

use crate::asset::{AssetCache, Handle, Model, VertexLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    AlphaBlend,
    Additive,
    Multiply,
}

impl BlendMode {
    pub const fn id(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// Permutation bits that select a shader variant for a pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderFlags: u32 {
        const ANIMATED = 1 << 0;
        const DEPTH_ONLY = 1 << 1;
        const FORCED_FORWARD = 1 << 2;
        const LIGHTMAPPED = 1 << 3;
        const EDITOR_ID = 1 << 4;
        const NO_TAA = 1 << 5;
        const DEBUG = 1 << 6;
    }
}

/// Identity of a compiled shader permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShaderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Material {
    pub unique_id: u32,
    pub shader_program: u32,
    pub texture_set: u32,
    pub blend: BlendMode,
    pub backface_culling: bool,
    pub alpha_tested: bool,
    /// Drawn in the forward (transparent) pass instead of the gbuffer.
    pub forward: bool,
    /// Forward material that does not occlude light.
    pub translucent: bool,
    /// Index into the GPU material table. `None` while not resident.
    pub gpu_index: Option<u32>,
    pub shader_valid: bool,
}

impl Material {
    pub fn new(unique_id: u32) -> Self {
        Self {
            unique_id,
            shader_program: 0,
            texture_set: unique_id,
            blend: BlendMode::Opaque,
            backface_culling: true,
            alpha_tested: false,
            forward: false,
            translucent: false,
            gpu_index: Some(unique_id),
            shader_valid: true,
        }
    }

    /// Blended materials are forward rendered and translucent.
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        if blend != BlendMode::Opaque {
            self.forward = true;
            self.translucent = true;
        }
        self
    }

    pub fn with_forward(mut self) -> Self {
        self.forward = true;
        self
    }

    pub fn with_alpha_test(mut self) -> Self {
        self.alpha_tested = true;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.backface_culling = false;
        self
    }

    pub fn with_texture_set(mut self, texture_set: u32) -> Self {
        self.texture_set = texture_set;
        self
    }

    pub fn with_shader_program(mut self, program: u32) -> Self {
        self.shader_program = program;
        self
    }

    pub fn with_gpu_index(mut self, gpu_index: Option<u32>) -> Self {
        self.gpu_index = gpu_index;
        self
    }

    pub fn with_invalid_shader(mut self) -> Self {
        self.shader_valid = false;
        self
    }

    pub fn is_drawable(&self) -> bool {
        self.gpu_index.is_some() && self.shader_valid
    }
}

/// Lookups the classifier needs from the material system.
pub trait MaterialQuery {
    fn material(&self, handle: Handle<Material>) -> Option<&Material>;

    /// Material substituted for anything missing or not drawable.
    fn fallback(&self) -> Handle<Material>;

    fn shader_index(&self, model: &Model, material: &Material, flags: ShaderFlags) -> ShaderId;

    /// Returns the requested material, or the fallback if it is missing, not
    /// resident or its shader failed to build.
    fn resolve(&self, requested: Option<Handle<Material>>) -> Option<(Handle<Material>, &Material)> {
        if let Some(handle) = requested {
            match self.material(handle) {
                Some(material) if material.is_drawable() => return Some((handle, material)),
                _ => trace!("Material {:?} unusable, substituting fallback", handle),
            }
        }

        let fallback = self.fallback();
        self.material(fallback).map(|material| (fallback, material))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PermutationKey {
    program: u32,
    layout: VertexLayout,
    flags: ShaderFlags,
}

/// In-process material store that hands out shader permutation ids on first
/// request.
pub struct MaterialLibrary {
    materials: AssetCache<Material>,
    fallback: Handle<Material>,
    permutations: Mutex<HashMap<PermutationKey, ShaderId>>,
}

impl MaterialLibrary {
    pub fn new(fallback: Material) -> Self {
        let mut materials = AssetCache::new();
        let fallback = materials.insert(fallback);
        Self {
            materials,
            fallback,
            permutations: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&mut self, material: Material) -> Handle<Material> {
        self.materials.insert(material)
    }

    pub fn get_mut(&mut self, handle: Handle<Material>) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn permutation_count(&self) -> usize {
        self.permutations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new(Material::new(0))
    }
}

impl MaterialQuery for MaterialLibrary {
    fn material(&self, handle: Handle<Material>) -> Option<&Material> {
        self.materials.get(handle)
    }

    fn fallback(&self) -> Handle<Material> {
        self.fallback
    }

    fn shader_index(&self, model: &Model, material: &Material, flags: ShaderFlags) -> ShaderId {
        let key = PermutationKey {
            program: material.shader_program,
            layout: model.vertex_layout,
            flags,
        };
        let mut permutations = self
            .permutations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = ShaderId(permutations.len() as u32);
        *permutations.entry(key).or_insert(next)
    }
}

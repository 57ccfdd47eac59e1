//! Renderable components: mesh, material and skeletal skinning data

use crate::assets::{GeometryHandle, SkinHandle, TextureHandle};
use crate::ecs::{Component, ComponentKind, Entity};
use crate::foundation::math::{Mat4, Vec4};

/// Geometry to draw for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    /// Geometry handle from the geometry atlas
    pub geometry: GeometryHandle,
    /// Skin handle; invalid for static geometry
    pub skin: SkinHandle,
    /// Skip this mesh during draw submission
    pub disabled: bool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            geometry: GeometryHandle::INVALID,
            skin: SkinHandle::INVALID,
            disabled: false,
        }
    }
}

impl Mesh {
    /// Static mesh for a geometry handle
    pub fn new(geometry: GeometryHandle) -> Self {
        Self {
            geometry,
            ..Default::default()
        }
    }

    /// Builder pattern: attach a skin
    pub fn with_skin(mut self, skin: SkinHandle) -> Self {
        self.skin = skin;
        self
    }

    /// Whether the mesh is drawn through the skinned path
    pub fn is_skinned(&self) -> bool {
        self.skin.is_valid()
    }
}

impl Component for Mesh {
    const KIND: ComponentKind = ComponentKind::Mesh;
}

/// Surface parameters for a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color (RGBA)
    pub color: Vec4,
    /// Albedo texture; invalid means untextured
    pub texture: TextureHandle,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            texture: TextureHandle::INVALID,
        }
    }
}

impl Material {
    /// Untextured material with a base color
    pub fn from_color(color: Vec4) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Builder pattern: set the albedo texture
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = texture;
        self
    }
}

impl Component for Material {
    const KIND: ComponentKind = ComponentKind::Material;
}

/// Skeleton binding: bone entities indexed by joint slot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    /// Bone entity per joint; [`Entity::INVALID`] slots are skipped
    pub bones: Vec<Entity>,
}

impl Skin {
    /// Create a skin from its joint list
    pub fn new(bones: Vec<Entity>) -> Self {
        Self { bones }
    }
}

impl Component for Skin {
    const KIND: ComponentKind = ComponentKind::Skin;
}

/// Joint data for a bone entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Inverse of the joint's bind-pose world matrix
    pub inverse_bind_matrix: Mat4,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            inverse_bind_matrix: Mat4::identity(),
        }
    }
}

impl Component for Bone {
    const KIND: ComponentKind = ComponentKind::Bone;
}

//! Component trait, kind tags and kind sets

use bitflags::bitflags;

/// Runtime tag for every component kind the scene stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`crate::ecs::components::Transform`]
    Transform,
    /// [`crate::ecs::components::Parent`]
    Parent,
    /// [`crate::ecs::components::Children`]
    Children,
    /// [`crate::ecs::components::Mesh`]
    Mesh,
    /// [`crate::ecs::components::Material`]
    Material,
    /// [`crate::ecs::components::Light`]
    Light,
    /// [`crate::ecs::components::Camera`]
    Camera,
    /// [`crate::ecs::components::Collider`]
    Collider,
    /// [`crate::ecs::components::RigidBody`]
    RigidBody,
    /// [`crate::ecs::components::Name`]
    Name,
    /// [`crate::ecs::components::Skin`]
    Skin,
    /// [`crate::ecs::components::Bone`]
    Bone,
    /// [`crate::ecs::components::PhysicsBody`] (engine-managed)
    PhysicsBody,
    /// [`crate::ecs::components::CameraBuffer`] (engine-managed)
    CameraBuffer,
}

impl ComponentKind {
    /// Every kind, in destruction order
    pub const ALL: [Self; 14] = [
        Self::Transform,
        Self::Parent,
        Self::Children,
        Self::Mesh,
        Self::Material,
        Self::Light,
        Self::Camera,
        Self::Collider,
        Self::RigidBody,
        Self::Name,
        Self::Skin,
        Self::Bone,
        Self::PhysicsBody,
        Self::CameraBuffer,
    ];

    /// The single-bit set for this kind
    pub const fn set(self) -> KindSet {
        match self {
            Self::Transform => KindSet::TRANSFORM,
            Self::Parent => KindSet::PARENT,
            Self::Children => KindSet::CHILDREN,
            Self::Mesh => KindSet::MESH,
            Self::Material => KindSet::MATERIAL,
            Self::Light => KindSet::LIGHT,
            Self::Camera => KindSet::CAMERA,
            Self::Collider => KindSet::COLLIDER,
            Self::RigidBody => KindSet::RIGID_BODY,
            Self::Name => KindSet::NAME,
            Self::Skin => KindSet::SKIN,
            Self::Bone => KindSet::BONE,
            Self::PhysicsBody => KindSet::PHYSICS_BODY,
            Self::CameraBuffer => KindSet::CAMERA_BUFFER,
        }
    }

    /// Kinds the engine attaches and removes itself
    pub const fn is_engine_managed(self) -> bool {
        matches!(self, Self::PhysicsBody | Self::CameraBuffer)
    }

    /// Parse a kind from its name, for tooling that builds views at runtime
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Stable display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::Parent => "Parent",
            Self::Children => "Children",
            Self::Mesh => "Mesh",
            Self::Material => "Material",
            Self::Light => "Light",
            Self::Camera => "Camera",
            Self::Collider => "Collider",
            Self::RigidBody => "RigidBody",
            Self::Name => "Name",
            Self::Skin => "Skin",
            Self::Bone => "Bone",
            Self::PhysicsBody => "PhysicsBody",
            Self::CameraBuffer => "CameraBuffer",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of component kinds, used for entity masks, views and observer predicates
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KindSet: u32 {
        /// Transform
        const TRANSFORM = 1 << 0;
        /// Parent
        const PARENT = 1 << 1;
        /// Children
        const CHILDREN = 1 << 2;
        /// Mesh
        const MESH = 1 << 3;
        /// Material
        const MATERIAL = 1 << 4;
        /// Light
        const LIGHT = 1 << 5;
        /// Camera
        const CAMERA = 1 << 6;
        /// Collider
        const COLLIDER = 1 << 7;
        /// RigidBody
        const RIGID_BODY = 1 << 8;
        /// Name
        const NAME = 1 << 9;
        /// Skin
        const SKIN = 1 << 10;
        /// Bone
        const BONE = 1 << 11;
        /// PhysicsBody
        const PHYSICS_BODY = 1 << 12;
        /// CameraBuffer
        const CAMERA_BUFFER = 1 << 13;
    }
}

impl KindSet {
    /// Iterate the kinds contained in this set
    pub fn kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL.into_iter().filter(move |kind| self.contains(kind.set()))
    }
}

impl From<ComponentKind> for KindSet {
    fn from(kind: ComponentKind) -> Self {
        kind.set()
    }
}

impl FromIterator<ComponentKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, kind| set | kind.set())
    }
}

/// Marker trait for components
///
/// Components are plain values; `Default` acts as the on-construct initializer
/// used by [`crate::ecs::ComponentStore::emplace`].
pub trait Component: Clone + Default + 'static {
    /// The runtime tag for this component type
    const KIND: ComponentKind;
}

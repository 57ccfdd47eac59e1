//! Opaque resource handles
//!
//! Handles are indices into an external atlas. [`ENGINE_INVALID_OBJECT_HANDLE`]
//! marks "absent"; consumers log and skip rather than fail on it.

/// Raw value of an absent handle
pub const ENGINE_INVALID_OBJECT_HANDLE: u32 = u32::MAX;

/// Common behaviour of typed resource handles
pub trait AssetHandle: Copy + Eq + std::fmt::Debug {
    /// The absent handle
    const INVALID: Self;

    /// Wrap a raw atlas index
    fn from_raw(raw: u32) -> Self;

    /// Raw atlas index
    fn raw(self) -> u32;

    /// Whether the handle names a resource
    fn is_valid(self) -> bool {
        self.raw() != ENGINE_INVALID_OBJECT_HANDLE
    }
}

macro_rules! asset_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// The absent handle
            pub const INVALID: Self = Self(ENGINE_INVALID_OBJECT_HANDLE);

            /// Whether the handle names a resource
            pub const fn is_valid(self) -> bool {
                self.0 != ENGINE_INVALID_OBJECT_HANDLE
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl AssetHandle for $name {
            const INVALID: Self = Self(ENGINE_INVALID_OBJECT_HANDLE);

            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

asset_handle!(
    /// Handle for uploaded geometry
    GeometryHandle
);
asset_handle!(
    /// Handle for a GPU texture resource
    TextureHandle
);
asset_handle!(
    /// Handle for skin (joint layout) data
    SkinHandle
);
asset_handle!(
    /// Handle for an animation clip
    AnimationHandle
);

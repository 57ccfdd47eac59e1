//! Name component

use crate::ecs::{Component, ComponentKind};

/// Longest stored name in bytes
pub const NAME_CAPACITY: usize = 64;

/// Human-readable entity name, truncated to [`NAME_CAPACITY`] bytes
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Name(String);

impl Name {
    /// Create a name, truncating on a character boundary if needed
    pub fn new(name: &str) -> Self {
        if name.len() <= NAME_CAPACITY {
            return Self(name.to_string());
        }
        let mut end = NAME_CAPACITY;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        log::warn!("Name '{}' truncated to {} bytes", name, end);
        Self(name[..end].to_string())
    }

    /// The stored name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Component for Name {
    const KIND: ComponentKind = ComponentKind::Name;
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//! Configuration system
//!
//! Scene, physics and render settings, loadable from TOML or RON files.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Physics simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration in world space
    pub gravity: [f32; 3],
    /// Maximum fixed sub-steps taken per simulation step
    pub max_substeps: u32,
    /// Fixed internal time step in seconds
    pub fixed_time_step: f32,
    /// Submit collider outlines to the renderer after each camera pass
    pub debug_draw: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            max_substeps: 10,
            fixed_time_step: 1.0 / 60.0,
            debug_draw: false,
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, gravity: [f32; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    /// Zero gravity preset
    pub fn zero_gravity() -> Self {
        Self::default().with_gravity([0.0, 0.0, 0.0])
    }

    /// Set the maximum number of sub-steps per simulation step
    pub fn with_max_substeps(mut self, substeps: u32) -> Self {
        self.max_substeps = substeps;
        self
    }

    /// Enable or disable physics debug drawing
    pub fn with_debug_draw(mut self, enabled: bool) -> Self {
        self.debug_draw = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".to_string()));
        }
        if !(self.fixed_time_step > 0.0) {
            return Err(ConfigError::Invalid("fixed_time_step must be positive".to_string()));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }
        Ok(())
    }
}

/// Renderer-facing scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Ambient light color
    pub ambient_color: [f32; 3],
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Clear color passed with every viewport
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.1,
            clear_color: [0.05, 0.05, 0.08, 1.0],
        }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Physics settings
    pub physics: PhysicsConfig,
    /// Render settings
    pub render: RenderConfig,
    /// Longest parent chain walked during hierarchy composition
    pub max_hierarchy_depth: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            render: RenderConfig::default(),
            max_hierarchy_depth: 64,
        }
    }
}

impl SceneConfig {
    /// Replace the physics settings
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Replace the render settings
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Set the hierarchy depth bound
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        if self.max_hierarchy_depth == 0 {
            return Err(ConfigError::Invalid("max_hierarchy_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Config for SceneConfig {}

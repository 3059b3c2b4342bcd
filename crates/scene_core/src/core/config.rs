//! # Engine Configuration
//!
//! Every fixed capacity and default used by the frame loop lives here, so a
//! deployment can size its pools for worst-case load from a single TOML or
//! RON file.
//!
//! ## Configuration Categories
//!
//! - **Pools**: slot counts for nodes, transforms, bounding spheres,
//!   partition records (per scene) and pipelines (per renderer)
//! - **Queues**: initial capacities of the opaque and alpha render queues
//! - **Camera**: defaults applied to newly created cameras
//! - **Octree**: bounds and subdivision limits for the octree partition

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};
use crate::spatial::OctreeConfig;

/// # Pool Configuration
///
/// Pools never grow. Exhausting one is a configuration error, so these
/// numbers must cover the worst case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Node records per scene
    pub nodes: usize,
    /// World transforms per scene
    pub transforms: usize,
    /// Bounding spheres per scene
    pub bounding_spheres: usize,
    /// Spatial partition records per scene
    pub partition_records: usize,
    /// Pipelines per renderer
    pub pipelines: usize,
}

impl PoolConfig {
    /// Use the same capacity for all four per-scene pools
    pub fn with_scene_capacity(mut self, capacity: usize) -> Self {
        self.nodes = capacity;
        self.transforms = capacity;
        self.bounding_spheres = capacity;
        self.partition_records = capacity;
        self
    }

    /// Set the pipeline pool capacity
    pub fn with_pipeline_capacity(mut self, capacity: usize) -> Self {
        self.pipelines = capacity;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            nodes: 4096,
            transforms: 4096,
            bounding_spheres: 4096,
            partition_records: 4096,
            pipelines: 256,
        }
    }
}

/// # Render Queue Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Initial capacity of the opaque queue
    pub opaque_capacity: usize,
    /// Initial capacity of the alpha queue
    pub alpha_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            opaque_capacity: 4096,
            alpha_capacity: 1024,
        }
    }
}

/// # Camera Defaults
///
/// Values given to every camera at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefaults {
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Vertical field of view in radians
    pub view_angle: f32,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
            view_angle: std::f32::consts::FRAC_PI_4,
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration handed to [`crate::Renderer::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level used by [`crate::foundation::logging::init_with_level`]
    pub log_level: String,
    /// Pool capacities
    pub pools: PoolConfig,
    /// Render queue capacities
    pub queues: QueueConfig,
    /// Camera defaults
    pub camera: CameraDefaults,
    /// Octree partition settings
    pub octree: OctreeConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            pools: PoolConfig::default(),
            queues: QueueConfig::default(),
            camera: CameraDefaults::default(),
            octree: OctreeConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set pool capacities
    pub fn with_pools(mut self, pools: PoolConfig) -> Self {
        self.pools = pools;
        self
    }

    /// Set queue capacities
    pub fn with_queues(mut self, queues: QueueConfig) -> Self {
        self.queues = queues;
        self
    }

    /// Set camera defaults
    pub fn with_camera(mut self, camera: CameraDefaults) -> Self {
        self.camera = camera;
        self
    }

    /// Set octree settings
    pub fn with_octree(mut self, octree: OctreeConfig) -> Self {
        self.octree = octree;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pools = &self.pools;
        let capacities = [
            ("nodes", pools.nodes),
            ("transforms", pools.transforms),
            ("bounding_spheres", pools.bounding_spheres),
            ("partition_records", pools.partition_records),
            ("pipelines", pools.pipelines),
        ];
        for (name, capacity) in capacities {
            if capacity == 0 {
                return Err(ConfigError::Invalid(format!("pool capacity `{}` must be at least 1", name)));
            }
            if u32::try_from(capacity).is_err() {
                return Err(ConfigError::Invalid(format!("pool capacity `{}` exceeds u32 range", name)));
            }
        }

        let camera = &self.camera;
        if camera.near <= 0.0 {
            return Err(ConfigError::Invalid("camera near plane must be positive".to_string()));
        }
        if camera.far <= camera.near {
            return Err(ConfigError::Invalid("camera far plane must lie beyond the near plane".to_string()));
        }
        if camera.view_angle <= 0.0 || camera.view_angle >= std::f32::consts::PI {
            return Err(ConfigError::Invalid("camera view angle must be within (0, pi)".to_string()));
        }

        self.octree.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_pool_is_rejected() {
        let config = EngineConfig::new().with_pools(PoolConfig::default().with_pipeline_capacity(0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_far_before_near_is_rejected() {
        let config = EngineConfig::new().with_camera(CameraDefaults {
            near: 10.0,
            far: 5.0,
            ..CameraDefaults::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            log_level = "debug"

            [pools]
            nodes = 128
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.pools.nodes, 128);
        assert_eq!(config.pools.transforms, 4096);
        assert_eq!(config.queues, QueueConfig::default());
    }

    #[test]
    fn test_ron_round_trip_through_files() {
        let path = std::env::temp_dir().join(format!("scene_core_config_{}.ron", std::process::id()));
        let config = EngineConfig::new()
            .with_log_level("trace")
            .with_pools(PoolConfig::default().with_scene_capacity(64));

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = EngineConfig::default().save_to_file("engine.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}

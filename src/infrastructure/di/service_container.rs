//! Service container for dependency injection
//!
//! Wires up the distribution service with settings and filesystem access.

use std::sync::Arc;

use crate::application::services::DistributionService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Hierarchy loading and distribution
    pub distribution: DistributionService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let distribution = DistributionService::new(fs.clone(), settings.overall_rate);

        Self {
            settings,
            fs,
            distribution,
        }
    }
}

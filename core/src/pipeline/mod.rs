//! Play and install pipelines
//!
//! - Play: resolve the launch target (extracting into staging when the
//!   system asks for it), launch it, then dispose the staging directory.
//! - Install: download a package, extract it permanently into the install
//!   directory, then delete the downloaded artifact.

mod error;
mod install;


use std::path::Path;
use std::sync::Arc;

use romhub_shared::SystemLaunchConfig;
use tracing::{info, warn};

use crate::archive::{ArchiveExtractor, StagingArena};
use crate::config::Config;
use crate::input::InputCoordinator;
use crate::launch::{LaunchOrchestrator, LaunchReport};
use crate::target::{ResolvedTarget, TargetResolver};

pub use error::PipelineError;
pub use install::{InstallReport, PackageInstaller};

/// Build the shared extractor from configuration.
pub fn extractor_from_config(config: &Config) -> Arc<ArchiveExtractor> {
    let staging = Arc::new(StagingArena::new(config.paths.staging_dir()));
    Arc::new(ArchiveExtractor::new(
        staging,
        config.extraction.seven_zip_path.clone(),
    ))
}

/// Resolve-then-launch for a single play session.
#[derive(Debug, Clone)]
pub struct LaunchPipeline {
    resolver: TargetResolver,
    orchestrator: LaunchOrchestrator,
    staging: Arc<StagingArena>,
    keep_staging: bool,
}

impl LaunchPipeline {
    pub fn new(config: &Config, input: Arc<InputCoordinator>) -> Self {
        let extractor = extractor_from_config(config);
        Self::from_parts(
            extractor,
            LaunchOrchestrator::new(input),
            config.extraction.recursive_payload_search,
            config.extraction.keep_staging,
        )
    }

    pub fn from_parts(
        extractor: Arc<ArchiveExtractor>,
        orchestrator: LaunchOrchestrator,
        recursive_search: bool,
        keep_staging: bool,
    ) -> Self {
        let staging = Arc::clone(extractor.staging());
        Self {
            resolver: TargetResolver::new(extractor).recursive(recursive_search),
            orchestrator,
            staging,
            keep_staging,
        }
    }

    pub fn staging(&self) -> &Arc<StagingArena> {
        &self.staging
    }

    /// Resolve the launch target without launching it.
    ///
    /// The caller owns any staging directory in the result.
    pub async fn resolve(
        &self,
        file: &Path,
        system: &SystemLaunchConfig,
    ) -> Result<ResolvedTarget, PipelineError> {
        Ok(self.resolver.resolve(file, system).await?)
    }

    /// Resolve and launch `file`, waiting for the session to end.
    ///
    /// `emulator` picks an emulator by exact name; `None` uses the system's
    /// preferred one.
    pub async fn play(
        &self,
        file: &Path,
        system: &SystemLaunchConfig,
        emulator: Option<&str>,
    ) -> Result<LaunchReport, PipelineError> {
        let definition = system.emulator(emulator);
        if let Some(name) = emulator
            && definition.is_none()
        {
            return Err(PipelineError::UnknownEmulator {
                system: system.name.clone(),
                name: name.to_string(),
            });
        }

        let target = self.resolver.resolve(file, system).await?;
        let result = self.orchestrator.launch(&target.payload, definition).await;

        if let Some(staging) = &target.staging {
            if self.keep_staging {
                info!("Keeping staging directory {}", staging.display());
            } else if let Err(e) = self.staging.dispose(staging) {
                warn!("Failed to dispose staging directory {}: {}", staging.display(), e);
            }
        }

        Ok(result?)
    }
}

//! Patch selection
//!
//! Picks the diff strategy for the requested mode and materializes the patch
//! into memory.

use stagehand_core::domain::patch::{CommitRange, DiffStrategy, PatchArtifact, PatchMode};
use tracing::{info, warn};

use crate::error::StageError;
use crate::vcs::Vcs;

/// What the selector produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Commit mode found no unpushed commits
    NothingToStage,
    Patch(PatchArtifact),
}

/// Choose a strategy for `mode` and produce the patch text
///
/// In commit mode the unpushed history decides the strategy; in local mode
/// the working tree is compared against `upstream_name`.
pub async fn select_patch(
    vcs: &dyn Vcs,
    mode: PatchMode,
    upstream_name: &str,
) -> Result<Selection, StageError> {
    let strategy = match mode {
        PatchMode::Commit => {
            let unpushed = vcs.unpushed_commits().await?;
            info!("Found {} unpushed commit(s)", unpushed.len());

            match CommitRange::from_unpushed(&unpushed) {
                Some(range) => range.strategy(),
                None => return Ok(Selection::NothingToStage),
            }
        }
        PatchMode::Local => DiffStrategy::WorkingTree {
            upstream: upstream_name.to_string(),
        },
    };

    info!("Creating patch from {}", strategy);
    let raw = vcs.diff(&strategy).await.map_err(StageError::Patch)?;
    let text = String::from_utf8(raw).map_err(|e| StageError::Patch(e.into()))?;

    if text.trim().is_empty() {
        warn!("Patch from {} is empty, staging it anyway", strategy);
    }

    Ok(Selection::Patch(PatchArtifact { strategy, text }))
}

//! Reports returned by the resolver and by batch edits.
//!
//! Neither carries scene data; poses are written straight onto the host
//! `SceneGraph`. Reports only describe what happened.

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;
use crate::time::FrameIndex;

/// Summary of one resolver pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Frame under the playhead for this pass.
    pub frame: FrameIndex,
    /// Entities visited.
    pub entities: usize,
    pub roots_written: usize,
    pub bones_written: usize,
    /// Recoverable problems, oldest first.
    #[serde(default)]
    pub diagnostics: Vec<KeyframeError>,
    /// Diagnostics dropped after the cap was reached.
    #[serde(default)]
    pub dropped_diagnostics: usize,
}

impl TickReport {
    pub fn new(frame: FrameIndex) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// Record a diagnostic unless `cap` entries are already held.
    #[inline]
    pub fn push_diagnostic(&mut self, diagnostic: KeyframeError, cap: usize) {
        if self.diagnostics.len() < cap {
            self.diagnostics.push(diagnostic);
        } else {
            self.dropped_diagnostics += 1;
        }
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.dropped_diagnostics == 0
    }
}

/// Outcome of a batch edit: how many items took effect and what was skipped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditReport {
    pub applied: usize,
    #[serde(default)]
    pub warnings: Vec<KeyframeError>,
}

impl EditReport {
    #[inline]
    pub fn push_warning(&mut self, warning: KeyframeError) {
        log::warn!("skipped edit: {warning}");
        self.warnings.push(warning);
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

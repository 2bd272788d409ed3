//! Progress reporting for a flash run.
//!
//! The library never prints. Frontends implement [`FlashReporter`] to show
//! what is happening in whatever way suits them.

use std::path::Path;
use std::sync::Arc;

use crate::command::{FlashCommand, ResolvedPaths};

/// Callbacks fired while a flash run advances.
pub trait FlashReporter: Send + Sync {
    /// All three identifiers resolved.
    fn resolved(&self, working_dir: &Path, paths: &ResolvedPaths);

    /// The flashing tool is about to be spawned.
    fn invoking(&self, command: &FlashCommand);

    /// The flashing tool exited with code zero.
    fn finished(&self);
}

/// Reporter that stays silent.
#[derive(Debug, Default)]
pub struct NoOpReporter;

impl FlashReporter for NoOpReporter {
    fn resolved(&self, _working_dir: &Path, _paths: &ResolvedPaths) {}

    fn invoking(&self, _command: &FlashCommand) {}

    fn finished(&self) {}
}

pub type FlashReporterArc = Arc<dyn FlashReporter>;

pub fn no_op_reporter() -> FlashReporterArc {
    Arc::new(NoOpReporter)
}

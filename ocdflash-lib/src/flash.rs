use std::path::PathBuf;

use strum::Display;
use tracing::{debug, info};

use crate::command::{FlashCommand, ResolvedPaths};
use crate::process::ProcessRunner;
use crate::report::{FlashReporterArc, no_op_reporter};
use crate::runfiles::Resolver;
use crate::{Error, Result};

/// The three logical identifiers given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRequest {
    pub tool: String,
    pub firmware: String,
    pub config: String,
}

/// Stages of a flash run. A failure in any stage ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    Resolving,
    Building,
    Invoking,
    Done,
}

/// Successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashOutcome {
    pub paths: ResolvedPaths,
    pub command: FlashCommand,
}

/// Resolves the artifacts of a [`FlashRequest`] and runs the flashing tool
/// on them exactly once.
pub struct FlashRunner<R, P> {
    resolver: R,
    runner: P,
    reporter: FlashReporterArc,
    working_dir: Option<PathBuf>,
}

impl<R: Resolver, P: ProcessRunner> FlashRunner<R, P> {
    pub fn new(resolver: R, runner: P) -> Self {
        Self {
            resolver,
            runner,
            reporter: no_op_reporter(),
            working_dir: None,
        }
    }

    pub fn with_reporter(mut self, reporter: FlashReporterArc) -> Self {
        self.reporter = reporter;
        self
    }

    /// Working directory shown to the reporter. Defaults to the process's
    /// current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn run(&self, request: &FlashRequest) -> Result<FlashOutcome> {
        let mut stage = Stage::Resolving;
        let result = self.advance(request, &mut stage);
        match &result {
            Ok(_) => info!("Flash finished"),
            Err(e) => debug!("Flash failed during {}: {}", stage, e),
        }
        result
    }

    fn advance(&self, request: &FlashRequest, stage: &mut Stage) -> Result<FlashOutcome> {
        debug!("Stage {}", stage);
        let paths = ResolvedPaths {
            tool: self.resolver.resolve_executable(&request.tool)?,
            firmware: self.resolver.resolve(&request.firmware)?,
            config: self.resolver.resolve(&request.config)?,
        };
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        self.reporter.resolved(&working_dir, &paths);

        *stage = Stage::Building;
        debug!("Stage {}", stage);
        let command = FlashCommand::new(&paths);

        *stage = Stage::Invoking;
        debug!("Stage {}: {}", stage, command);
        self.reporter.invoking(&command);
        let exit = self.runner.run(&command.argv())?;
        if !exit.success() {
            return Err(Error::Execution { code: exit.code });
        }

        *stage = Stage::Done;
        self.reporter.finished();
        Ok(FlashOutcome { paths, command })
    }
}

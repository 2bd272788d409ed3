pub mod command;
mod error;
pub mod flash;
pub mod process;
pub mod report;
pub mod runfiles;

pub use command::{FlashCommand, ResolvedPaths};
pub use error::{Error, Result};
pub use flash::{FlashOutcome, FlashRequest, FlashRunner, Stage};
pub use process::{ChildExit, ProcessRunner, SystemRunner};
pub use report::{FlashReporter, FlashReporterArc, NoOpReporter};
pub use runfiles::{Resolver, Runfiles, RunfilesLocation};

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::{Error, Result};

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// `None` when the child was terminated without an exit code.
    pub code: Option<i32>,
}

impl ChildExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an argument vector as a child process and waits for it.
pub trait ProcessRunner {
    /// Run `argv` (program first). Fails with [`Error::Launch`] when the
    /// program cannot be started.
    fn run(&self, argv: &[OsString]) -> Result<ChildExit>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(&self, argv: &[OsString]) -> Result<ChildExit> {
        (**self).run(argv)
    }
}

/// Spawns real processes with the caller's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, argv: &[OsString]) -> Result<ChildExit> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::unexpected("empty command line"))?;

        debug!("Spawning {:?}", argv);
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| Error::Launch {
                path: PathBuf::from(program),
                source,
            })?;
        debug!("Child exited with {}", status);

        Ok(ChildExit {
            code: status.code(),
        })
    }
}

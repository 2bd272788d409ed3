use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Paths of the three artifacts a flash run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub tool: PathBuf,
    pub firmware: PathBuf,
    pub config: PathBuf,
}

/// Command line for the flashing tool.
///
/// Built as a literal argument vector and never passed through a shell.
/// Paths stay as OS strings so non-UTF-8 names reach the tool untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl FlashCommand {
    /// `<tool> -f <config> -c 'program "<firmware>" verify reset exit'`
    pub fn new(paths: &ResolvedPaths) -> Self {
        Self {
            program: paths.tool.clone(),
            args: vec![
                OsString::from("-f"),
                paths.config.clone().into_os_string(),
                OsString::from("-c"),
                OsString::from(program_script(&paths.firmware)),
            ],
        }
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.program.clone().into_os_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for FlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) || arg.contains('"') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Script passed to `-c`.
///
/// The tool's script interpreter treats backslashes as escapes, so the
/// firmware path always uses forward slashes.
pub fn program_script(firmware: &Path) -> String {
    let firmware = firmware.to_string_lossy().replace('\\', "/");
    format!("program \"{}\" verify reset exit", firmware)
}

//! Console output for a flash run.

use std::io::{self, Write};
use std::path::Path;

use ocdflash_lib::{FlashCommand, FlashReporter, ResolvedPaths};

/// Prints the resolved paths before the tool runs and a completion line
/// after it succeeds.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    fn print_lines(&self, lines: &[String]) {
        let mut stdout = io::stdout().lock();
        for line in lines {
            let _ = writeln!(stdout, "{}", line);
        }
        let _ = stdout.flush();
    }
}

impl FlashReporter for ConsoleReporter {
    fn resolved(&self, working_dir: &Path, paths: &ResolvedPaths) {
        self.print_lines(&[
            "--- Flashing Firmware ---".to_string(),
            format!("Working Directory:      {}", working_dir.display()),
            format!("Resolved OpenOCD Path:  {}", paths.tool.display()),
            format!("Resolved Firmware Path: {}", paths.firmware.display()),
            format!("Resolved Config Path:   {}", paths.config.display()),
            "-------------------------".to_string(),
        ]);
    }

    fn invoking(&self, _command: &FlashCommand) {}

    fn finished(&self) {
        self.print_lines(&["--- Flash Complete ---".to_string()]);
    }
}

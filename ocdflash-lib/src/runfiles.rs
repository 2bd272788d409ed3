//! Artifact resolution through the Bazel runfiles convention.
//!
//! A build hands the flashing wrapper logical identifiers such as
//! `openocd/bin/openocd` instead of real paths. The runfiles of the
//! wrapper map those identifiers to files on disk, either through a
//! `MANIFEST` text file (the default on Windows) or through a symlink tree
//! laid out under a runfiles directory.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{Error, Result};

/// Environment variable naming the runfiles manifest file.
pub const MANIFEST_FILE_ENV: &str = "RUNFILES_MANIFEST_FILE";
/// Environment variable naming the runfiles directory.
pub const RUNFILES_DIR_ENV: &str = "RUNFILES_DIR";
/// Runfiles directory exported by `bazel test`.
pub const TEST_SRCDIR_ENV: &str = "TEST_SRCDIR";

/// Maps a logical path to an existing file on disk.
pub trait Resolver {
    /// Resolve `identifier` to the path of an existing file.
    fn resolve(&self, identifier: &str) -> Result<PathBuf>;

    /// Suffix the host requires on executable files.
    fn executable_suffix(&self) -> &str {
        std::env::consts::EXE_SUFFIX
    }

    /// Resolve the identifier of an executable.
    ///
    /// The host suffix is part of the identifier that gets looked up, so
    /// `tool/openocd` is found as `tool/openocd.exe` on Windows.
    fn resolve_executable(&self, identifier: &str) -> Result<PathBuf> {
        let suffix = self.executable_suffix();
        if suffix.is_empty() || identifier.ends_with(suffix) {
            return self.resolve(identifier);
        }
        let key = format!("{identifier}{suffix}");
        self.resolve(&key).map_err(|e| match e {
            Error::Resolution { reason, .. } => Error::resolution(identifier, reason),
            other => other,
        })
    }
}

impl<T: Resolver + ?Sized> Resolver for &T {
    fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        (**self).resolve(identifier)
    }

    fn executable_suffix(&self) -> &str {
        (**self).executable_suffix()
    }
}

/// Where to look for runfiles, in order of precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunfilesLocation {
    pub manifest_file: Option<PathBuf>,
    pub runfiles_dir: Option<PathBuf>,
    /// Path the wrapper was started as, used for `<argv0>.runfiles` lookups.
    pub argv0: Option<PathBuf>,
}

impl RunfilesLocation {
    /// Read the location from the process environment.
    pub fn from_env() -> Self {
        let non_empty =
            |value: Option<OsString>| value.filter(|v| !v.is_empty()).map(PathBuf::from);

        Self {
            manifest_file: non_empty(std::env::var_os(MANIFEST_FILE_ENV)),
            runfiles_dir: non_empty(std::env::var_os(RUNFILES_DIR_ENV))
                .or_else(|| non_empty(std::env::var_os(TEST_SRCDIR_ENV))),
            argv0: non_empty(std::env::args_os().next()),
        }
    }

    /// Fill the fields this location leaves unset from `fallback`.
    pub fn or(self, fallback: RunfilesLocation) -> Self {
        Self {
            manifest_file: self.manifest_file.or(fallback.manifest_file),
            runfiles_dir: self.runfiles_dir.or(fallback.runfiles_dir),
            argv0: self.argv0.or(fallback.argv0),
        }
    }
}

#[derive(Debug, Clone)]
enum Source {
    Manifest {
        path: PathBuf,
        entries: HashMap<String, String>,
    },
    Directory(PathBuf),
}

/// A runfiles tree, looked up through a manifest or a directory.
#[derive(Debug, Clone)]
pub struct Runfiles {
    source: Source,
    exe_suffix: String,
}

impl Runfiles {
    /// Load runfiles from a manifest file.
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::unexpected(format!(
                "failed to read runfiles manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        let entries = parse_manifest(&content);
        debug!(
            "Loaded {} runfiles entries from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            source: Source::Manifest {
                path: path.to_path_buf(),
                entries,
            },
            exe_suffix: std::env::consts::EXE_SUFFIX.to_string(),
        })
    }

    /// Use a runfiles directory.
    pub fn from_directory(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Using runfiles directory {}", path.display());
        Self {
            source: Source::Directory(path),
            exe_suffix: std::env::consts::EXE_SUFFIX.to_string(),
        }
    }

    /// Find the runfiles of this process. Relative locations are taken
    /// against the current directory so resolved paths are absolute.
    ///
    /// An explicit manifest wins over an explicit directory; without either,
    /// the `<argv0>.runfiles_manifest`, `<argv0>.runfiles/MANIFEST` and
    /// `<argv0>.runfiles` siblings of the executable are tried in turn.
    pub fn discover(location: &RunfilesLocation) -> Result<Self> {
        if let Some(manifest) = &location.manifest_file {
            return Self::from_manifest(absolute(manifest)?);
        }
        if let Some(dir) = &location.runfiles_dir {
            return Ok(Self::from_directory(absolute(dir)?));
        }

        if let Some(argv0) = &location.argv0 {
            let argv0 = absolute(argv0)?;
            let manifest = with_suffix(&argv0, ".runfiles_manifest");
            if manifest.is_file() {
                return Self::from_manifest(manifest);
            }
            let dir = with_suffix(&argv0, ".runfiles");
            let nested_manifest = dir.join("MANIFEST");
            if nested_manifest.is_file() {
                return Self::from_manifest(nested_manifest);
            }
            if dir.is_dir() {
                return Ok(Self::from_directory(dir));
            }
        }

        Err(Error::unexpected(format!(
            "cannot find runfiles (set {} or {})",
            MANIFEST_FILE_ENV, RUNFILES_DIR_ENV
        )))
    }

    /// Override the executable suffix, e.g. to map Windows identifiers.
    pub fn with_executable_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exe_suffix = suffix.into();
        self
    }

    /// Map `identifier` to a path without checking that the file exists.
    pub fn rlocation(&self, identifier: &str) -> Result<PathBuf> {
        validate_identifier(identifier)?;

        if Path::new(identifier).is_absolute() {
            return Ok(PathBuf::from(identifier));
        }

        match &self.source {
            Source::Directory(dir) => Ok(dir.join(identifier)),
            Source::Manifest { path, entries } => lookup_manifest(entries, identifier)
                .ok_or_else(|| {
                    Error::resolution(
                        identifier,
                        format!("no entry in runfiles manifest {}", path.display()),
                    )
                }),
        }
    }
}

impl Resolver for Runfiles {
    fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        let path = self.rlocation(identifier)?;
        trace!("{} -> {}", identifier, path.display());

        if !path.exists() {
            return Err(Error::resolution(
                identifier,
                format!("file not found at {}", path.display()),
            ));
        }
        if !path.is_file() {
            return Err(Error::resolution(
                identifier,
                format!("not a file: {}", path.display()),
            ));
        }
        Ok(path)
    }

    fn executable_suffix(&self) -> &str {
        &self.exe_suffix
    }
}

/// Anchor a runfiles location at the current directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        Error::unexpected(format!(
            "cannot make runfiles path {} absolute: {}",
            path.display(),
            e
        ))
    })
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Reject identifiers that are empty or not in normalized form.
fn validate_identifier(identifier: &str) -> Result<()> {
    let reason = if identifier.is_empty() {
        Some("identifier is empty")
    } else if identifier.starts_with("../")
        || identifier.contains("/../")
        || identifier.ends_with("/..")
        || identifier == ".."
    {
        Some("identifier must not contain `..` segments")
    } else if identifier.starts_with("./")
        || identifier.contains("/./")
        || identifier.ends_with("/.")
        || identifier == "."
    {
        Some("identifier must not contain `.` segments")
    } else if identifier.contains("//") {
        Some("identifier must not contain empty segments")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::resolution(identifier, reason)),
        None => Ok(()),
    }
}

/// Parse manifest lines of the form `<logical> <real>`.
///
/// Lines starting with a space use the escaped form, where `\s`, `\n` and
/// `\b` stand for space, newline and backslash.
fn parse_manifest(content: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();

    for line in content.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        let (key, value) = match line.strip_prefix(' ') {
            Some(escaped) => {
                let (key, value) = escaped.split_once(' ').unwrap_or((escaped, ""));
                (unescape(key, true), unescape(value, false))
            }
            None => {
                let (key, value) = line.split_once(' ').unwrap_or((line, ""));
                (key.to_string(), value.to_string())
            }
        };
        entries.insert(key, value);
    }

    entries
}

fn unescape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') if is_key => out.push(' '),
            Some('n') => out.push('\n'),
            Some('b') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Exact lookup first, then the longest directory prefix with an entry.
fn lookup_manifest(entries: &HashMap<String, String>, identifier: &str) -> Option<PathBuf> {
    if let Some(value) = entries.get(identifier) {
        return (!value.is_empty()).then(|| PathBuf::from(value));
    }

    let mut prefix = identifier;
    while let Some(idx) = prefix.rfind('/') {
        prefix = &prefix[..idx];
        if let Some(value) = entries.get(prefix).filter(|v| !v.is_empty()) {
            return Some(Path::new(value).join(&identifier[idx + 1..]));
        }
    }

    None
}

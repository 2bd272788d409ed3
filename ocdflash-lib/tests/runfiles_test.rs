use std::fs;
use std::path::PathBuf;

use ocdflash_lib::{Error, FlashCommand, ResolvedPaths, Resolver, Runfiles, RunfilesLocation};
use tempfile::TempDir;

fn touch(dir: &TempDir, rel: &str) -> PathBuf {
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"").unwrap();
    path
}

#[test]
fn directory_mode_joins_identifier() {
    let dir = TempDir::new().unwrap();
    let elf = touch(&dir, "build/app.elf");

    let runfiles = Runfiles::from_directory(dir.path());
    assert_eq!(runfiles.resolve("build/app.elf").unwrap(), elf);
}

#[test]
fn missing_file_is_a_resolution_error() {
    let dir = TempDir::new().unwrap();

    let runfiles = Runfiles::from_directory(dir.path());
    let err = runfiles.resolve("build/app.elf").unwrap_err();
    assert!(matches!(&err, Error::Resolution { identifier, .. } if identifier == "build/app.elf"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn manifest_mode_maps_entries() {
    let dir = TempDir::new().unwrap();
    let tool = touch(&dir, "real/openocd");
    let scripts = dir.path().join("real/scripts");
    let cfg = touch(&dir, "real/scripts/board/stm32.cfg");
    let manifest = dir.path().join("MANIFEST");
    fs::write(
        &manifest,
        format!(
            "tool/openocd {}\ntool/scripts {}\n",
            tool.display(),
            scripts.display()
        ),
    )
    .unwrap();

    let runfiles = Runfiles::from_manifest(&manifest).unwrap();
    assert_eq!(runfiles.resolve("tool/openocd").unwrap(), tool);
    assert_eq!(runfiles.resolve("tool/scripts/board/stm32.cfg").unwrap(), cfg);

    let err = runfiles.resolve("build/app.elf").unwrap_err();
    assert!(matches!(err, Error::Resolution { .. }));
}

#[test]
fn manifest_entry_pointing_at_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("MANIFEST");
    fs::write(
        &manifest,
        format!("build/app.elf {}\n", dir.path().join("gone.elf").display()),
    )
    .unwrap();

    let runfiles = Runfiles::from_manifest(&manifest).unwrap();
    let err = runfiles.resolve("build/app.elf").unwrap_err();
    assert!(err.to_string().contains("build/app.elf"));
}

#[test]
fn executable_suffix_is_appended_before_lookup() {
    let dir = TempDir::new().unwrap();
    let exe = touch(&dir, "tool/openocd.exe");

    let runfiles = Runfiles::from_directory(dir.path()).with_executable_suffix(".exe");
    assert_eq!(runfiles.resolve_executable("tool/openocd").unwrap(), exe);
    assert_eq!(runfiles.resolve_executable("tool/openocd.exe").unwrap(), exe);

    let plain = Runfiles::from_directory(dir.path()).with_executable_suffix("");
    let err = plain.resolve_executable("tool/openocd").unwrap_err();
    assert!(matches!(&err, Error::Resolution { identifier, .. } if identifier == "tool/openocd"));
}

#[test]
fn unnormalized_identifier_is_rejected() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "build/app.elf");

    let runfiles = Runfiles::from_directory(dir.path().join("sub"));
    assert!(matches!(
        runfiles.resolve("../build/app.elf"),
        Err(Error::Resolution { .. })
    ));
    assert!(matches!(runfiles.resolve(""), Err(Error::Resolution { .. })));
}

#[test]
fn absolute_identifier_is_used_as_is() {
    let dir = TempDir::new().unwrap();
    let elf = touch(&dir, "app.elf");

    let runfiles = Runfiles::from_directory("/nonexistent-runfiles");
    assert_eq!(runfiles.resolve(elf.to_str().unwrap()).unwrap(), elf);
}

#[test]
fn discover_prefers_manifest_over_directory() {
    let dir = TempDir::new().unwrap();
    let real = touch(&dir, "real.elf");
    let manifest = dir.path().join("MANIFEST");
    fs::write(&manifest, format!("build/app.elf {}\n", real.display())).unwrap();

    let runfiles = Runfiles::discover(&RunfilesLocation {
        manifest_file: Some(manifest),
        runfiles_dir: Some(dir.path().join("unused")),
        argv0: None,
    })
    .unwrap();
    assert_eq!(runfiles.resolve("build/app.elf").unwrap(), real);
}

#[test]
fn discover_finds_runfiles_next_to_argv0() {
    let dir = TempDir::new().unwrap();
    let elf = touch(&dir, "flash.runfiles/build/app.elf");

    let runfiles = Runfiles::discover(&RunfilesLocation {
        argv0: Some(dir.path().join("flash")),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(runfiles.resolve("build/app.elf").unwrap(), elf);
}

#[test]
fn discover_finds_manifest_next_to_argv0() {
    let dir = TempDir::new().unwrap();
    let real = touch(&dir, "out/app.elf");
    fs::write(
        dir.path().join("flash.runfiles_manifest"),
        format!("build/app.elf {}\n", real.display()),
    )
    .unwrap();

    let runfiles = Runfiles::discover(&RunfilesLocation {
        argv0: Some(dir.path().join("flash")),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(runfiles.resolve("build/app.elf").unwrap(), real);
}

#[test]
fn discover_without_runfiles_is_unexpected() {
    let dir = TempDir::new().unwrap();

    let err = Runfiles::discover(&RunfilesLocation {
        argv0: Some(dir.path().join("flash")),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, Error::Unexpected(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn unreadable_manifest_is_unexpected() {
    let dir = TempDir::new().unwrap();
    let err = Runfiles::from_manifest(dir.path().join("MANIFEST")).unwrap_err();
    assert!(matches!(err, Error::Unexpected(_)));
}

#[test]
fn directory_is_not_a_resolved_file() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "build/app.elf");

    let runfiles = Runfiles::from_directory(dir.path());
    let err = runfiles.resolve("build").unwrap_err();
    assert!(matches!(&err, Error::Resolution { identifier, .. } if identifier == "build"));
    assert!(err.to_string().contains("not a file"));
}

#[test]
fn relative_runfiles_dir_resolves_to_absolute_paths() {
    let dir = tempfile::Builder::new()
        .prefix("rel-runfiles")
        .tempdir_in(".")
        .unwrap();
    touch(&dir, "build/app.elf");
    let relative = PathBuf::from(dir.path().file_name().unwrap());

    let runfiles = Runfiles::discover(&RunfilesLocation {
        runfiles_dir: Some(relative.clone()),
        ..Default::default()
    })
    .unwrap();
    let resolved = runfiles.resolve("build/app.elf").unwrap();
    assert!(resolved.is_absolute());
    assert_eq!(
        resolved,
        std::path::absolute(&relative).unwrap().join("build/app.elf")
    );
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_runfiles_dir_is_kept_in_the_command() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join(OsStr::from_bytes(b"rf\xff"));
    for rel in ["tool/openocd", "build/app.elf", "tool/cfg/board.cfg"] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
    }

    let runfiles = Runfiles::from_directory(&root).with_executable_suffix("");
    let paths = ResolvedPaths {
        tool: runfiles.resolve_executable("tool/openocd").unwrap(),
        firmware: runfiles.resolve("build/app.elf").unwrap(),
        config: runfiles.resolve("tool/cfg/board.cfg").unwrap(),
    };
    let argv = FlashCommand::new(&paths).argv();

    assert_eq!(argv[0], root.join("tool/openocd").into_os_string());
    assert_eq!(argv[2], root.join("tool/cfg/board.cfg").into_os_string());
}

//! Shared fixtures for unit tests that run real processes.

use std::fs::{self, OpenOptions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::TempDir;

use crate::config::CacheConfig;

/// Temporary directory holding a commands file, a cache file and a `bin/`
/// directory that serves as the only entry on the search path.
pub struct Workspace {
    temp_dir: TempDir,
    bin_dir: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let bin_dir = temp_dir.path().join("bin");
        fs::create_dir(&bin_dir).unwrap();

        Self { temp_dir, bin_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn commands_file(&self) -> PathBuf {
        self.path().join("commands.txt")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.path().join("output.cache")
    }

    pub fn write_commands(&self, contents: &str) {
        fs::write(self.commands_file(), contents).unwrap();
    }

    pub fn write_cache(&self, contents: &[u8]) {
        fs::write(self.cache_file(), contents).unwrap();
    }

    pub fn read_cache(&self) -> Vec<u8> {
        fs::read(self.cache_file()).unwrap()
    }

    pub fn config(&self) -> CacheConfig {
        CacheConfig {
            commands_file: self.commands_file(),
            cache_file: self.cache_file(),
            search_path: Some(self.bin_dir.clone().into_os_string()),
            working_dir: self.path().to_path_buf(),
        }
    }
}

/// Write an executable `/bin/sh` script named `name` into `dir`
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();

    path
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

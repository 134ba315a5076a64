//! Common test utilities module
//!
//! Scratch directories are created with `tempfile` and removed when the
//! guard drops.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Scratch directory removed on drop
pub struct TempTestDir {
    dir: TempDir,
}

impl TempTestDir {
    pub fn new(test_name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("sportscope_{}_", test_name))
            .tempdir()
            .expect("create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the directory; the file is not created
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name` and return its path
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, contents).expect("write test file");
        path
    }
}

/// Small match table: one text column, three numeric columns, one gap
pub const MATCHES_CSV: &str = "\
team,round,goals,shots
Lions,1,2,11
Tigers,2,1,8
Lions,3,3,15
Bears,4,NA,9
Tigers,5,2,12
Bears,6,0,5
";

/// `y = 2x + 1` over `x = 0..n`
pub fn line_csv(n: usize) -> String {
    let mut out = String::from("x,y\n");
    for i in 0..n {
        out.push_str(&format!("{},{}\n", i, 2 * i + 1));
    }
    out
}

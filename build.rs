//! Build script for tabrecon - handles DuckDB library detection and linking

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DUCKDB_LIB_PATH");

    // Cargo exposes enabled features to build scripts as environment variables
    if env::var_os("CARGO_FEATURE_BUNDLED").is_some() {
        return;
    }

    if env::var("SKIP_DUCKDB_DETECTION").is_ok() {
        println!("cargo:rustc-link-lib=duckdb");
        return;
    }

    match find_duckdb_library() {
        Some(lib_path) => {
            println!("cargo:rustc-link-search=native={}", lib_path.display());
            println!("cargo:rustc-link-lib=duckdb");
        }
        None => {
            eprintln!("DuckDB library not found.");
            eprintln!("Install libduckdb, set DUCKDB_LIB_PATH=/path/to/duckdb/lib,");
            eprintln!("or build with the default `bundled` feature enabled.");
            panic!("DuckDB library not found");
        }
    }
}

fn find_duckdb_library() -> Option<PathBuf> {
    if let Ok(path) = env::var("DUCKDB_LIB_PATH") {
        let path_buf = PathBuf::from(path);
        if check_duckdb_library(&path_buf) {
            return Some(path_buf);
        }
    }

    try_pkg_config().or_else(|| {
        standard_paths()
            .into_iter()
            .find(|path| check_duckdb_library(path))
    })
}

fn try_pkg_config() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }

    let output = Command::new("pkg-config")
        .args(["--libs-only-L", "duckdb"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .filter_map(|flag| flag.strip_prefix("-L"))
        .map(PathBuf::from)
        .find(|path| check_duckdb_library(path))
}

fn standard_paths() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "macos") {
        &["/opt/homebrew/lib", "/usr/local/lib", "/opt/local/lib"]
    } else if cfg!(target_os = "windows") {
        &["C:\\Program Files\\DuckDB\\lib", "C:\\duckdb\\lib"]
    } else {
        &["/usr/lib", "/usr/local/lib", "/lib", "/usr/lib/x86_64-linux-gnu", "/usr/lib64"]
    };
    paths.iter().map(PathBuf::from).collect()
}

fn check_duckdb_library(path: &Path) -> bool {
    let names: &[&str] = if cfg!(target_os = "windows") {
        &["duckdb.dll", "libduckdb.dll", "duckdb.lib"]
    } else if cfg!(target_os = "macos") {
        &["libduckdb.dylib", "libduckdb.a"]
    } else {
        &["libduckdb.so", "libduckdb.so.1", "libduckdb.a"]
    };
    names.iter().any(|name| path.join(name).exists())
}

#![allow(forbidden_lint_groups)]
#![allow(clippy::missing_panics_doc)]

use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::{
    env,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

pub const PROJECT_NAME: &str = "MIDI_MAP";

lazy_static! {
    pub static ref DATA_FOLDER: Option<PathBuf> = env::var(format!("{PROJECT_NAME}_DATA")).ok().map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> = env::var(format!("{PROJECT_NAME}_CONFIG")).ok().map(PathBuf::from);
    pub static ref LOG_ENV: String = format!("{PROJECT_NAME}_LOGLEVEL");
    pub static ref LOG_FILE: String = format!("{PROJECT_NAME}.log");
}

#[must_use]
pub fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "midimap", env!("CARGO_PKG_NAME"))
}

fn resolve_dir(overridden: Option<&PathBuf>, from_project: fn(&ProjectDirs) -> &Path, fallback: &str) -> PathBuf {
    if let Some(directory) = overridden {
        directory.clone()
    } else if let Some(project_dirs) = project_directory() {
        from_project(&project_dirs).to_path_buf()
    } else {
        PathBuf::from(".").join(fallback)
    }
}

#[must_use]
pub fn get_data_dir() -> PathBuf {
    resolve_dir(DATA_FOLDER.as_ref(), ProjectDirs::data_local_dir, ".data")
}

#[must_use]
pub fn get_config_dir() -> PathBuf {
    resolve_dir(CONFIG_FOLDER.as_ref(), ProjectDirs::config_local_dir, ".config")
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output.status.success().then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Build script helper: exports `_GIT_INFO` and writes `build_time.rs` into `OUT_DIR`.
pub fn create_build_info() {
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        let git_path = Path::new(&git_dir);
        for watched in ["HEAD", "packed-refs", "refs/heads", "refs/tags"] {
            if git_path.join(watched).exists() {
                println!("cargo:rerun-if-changed={git_dir}/{watched}");
            }
        }
    }

    let cargo_pkg_version = env!("CARGO_PKG_VERSION");
    let git_describe = match git(&["describe", "--always", "--tags", "--long", "--dirty"]) {
        Some(git_info) if git_info.contains(cargo_pkg_version) => git_info.replace('g', ""),
        Some(git_info) if !git_info.is_empty() => format!("v{cargo_pkg_version}-{git_info}"),
        _ => cargo_pkg_version.to_string(),
    };

    println!("cargo:rustc-env=_GIT_INFO={git_describe}");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("build_time.rs");

    let formatted_time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut f = File::create(dest_path).unwrap();
    write!(f, "pub const BUILD_TIME: &str = \"{formatted_time}\";").unwrap();
}

use build::{get_config_dir, get_data_dir};

pub static GIT_COMMIT_HASH: &str = env!("_GIT_INFO");
include!(concat!(env!("OUT_DIR"), "/build_time.rs"));

#[must_use]
pub fn version() -> String {
    let author = clap::crate_authors!();

    let commit_hash = GIT_COMMIT_HASH;

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{commit_hash} (built {BUILD_TIME})

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}

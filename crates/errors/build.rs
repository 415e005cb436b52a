use std::process::Command;

use serde_json::Value;

// Exposes the workspace package names so logging can default every workspace crate to `info`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::new("cargo").args(["metadata", "--format-version=1", "--no-deps"]).output()?;

    let metadata = serde_json::from_slice::<Value>(&output.stdout)?;

    let crates = metadata["packages"]
        .as_array()
        .map(|packages| {
            packages
                .iter()
                .filter_map(|package| package["name"].as_str())
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default();

    println!("cargo:rustc-env=_WORKSPACE_CRATES={crates}");
    Ok(())
}

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use skyline_catalog::openapi::ApiDocV1;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let openapi = ApiDocV1::openapi();
    let json = serde_json::to_string_pretty(&openapi).context("failed to render OpenAPI document")?;

    let output_dir = PathBuf::from("openapi");
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let output_path = output_dir.join("skyline-catalog.v1.json");
    fs::write(&output_path, json)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    println!("OpenAPI document written to {}", output_path.display());
    Ok(())
}

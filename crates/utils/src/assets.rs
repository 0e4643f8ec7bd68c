use std::{env, io, path::PathBuf};

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");
const ASSET_DIR_ENV: &str = "IOTGRAPH_ASSET_DIR";
const DATABASE_FILE: &str = "iotgraph.sqlite";

/// Directory holding the database and other runtime files, created on first use.
///
/// `IOTGRAPH_ASSET_DIR` wins; debug builds use `dev_assets` at the workspace root.
pub fn asset_dir() -> io::Result<PathBuf> {
    let path = if let Ok(custom_dir) = env::var(ASSET_DIR_ENV) {
        PathBuf::from(custom_dir)
    } else if cfg!(debug_assertions) {
        PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("dev", "iotgraph", "iotgraph")
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?
            .data_dir()
            .to_path_buf()
    };

    if !path.exists() {
        tracing::debug!("creating asset directory {}", path.display());
        std::fs::create_dir_all(&path)?;
    }

    Ok(path)
    // macOS → ~/Library/Application Support/dev.iotgraph.iotgraph
    // Linux → ~/.local/share/iotgraph
}

pub fn database_path() -> io::Result<PathBuf> {
    Ok(asset_dir()?.join(DATABASE_FILE))
}

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FeatureCollection;

/// Write a FeatureCollection as pretty-printed GeoJSON, replacing any existing file.
///
/// Output is UTF-8 with two-space indentation; non-ASCII names are written
/// as-is rather than escaped. Missing parent directories are created.
///
/// # Returns
/// * Number of bytes written
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<u64> {
    let json =
        serde_json::to_vec_pretty(collection).context("Failed to serialize FeatureCollection")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    writer.flush()?;

    Ok(json.len() as u64)
}

//! Source image loading and reconstructed image export

use image::RgbImage;
use std::path::Path;

use crate::io::error::{PipelineError, Result};

/// Decode every path and convert it to RGB, preserving order
///
/// # Errors
///
/// Returns [`PipelineError::ImageLoad`] naming the first path that cannot be
/// opened or decoded
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RgbImage>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            image::open(path)
                .map(|decoded| decoded.to_rgb8())
                .map_err(|source| PipelineError::ImageLoad {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect()
}

/// Save an RGB image, creating the parent directory if needed
///
/// The format is chosen from the file extension.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn export_image(image: &RgbImage, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image
        .save(output_path)
        .map_err(|e| PipelineError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}

/// Render a byte count as a short human-readable size, e.g. `"3.1 KB"`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} {}", UNITS[UNITS.len() - 1])
}

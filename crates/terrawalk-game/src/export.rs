//! File exports: scenery placements as RON and a heightmap preview PNG.

use std::path::Path;

use anyhow::Context;
use image::{GrayImage, Luma};
use terrawalk_terrain::TerrainWorld;
use tracing::info;

/// Pixels per side of the heightmap preview.
pub const HEIGHTMAP_RESOLUTION: u32 = 256;

/// Write every placement of `world` to `path` as pretty RON.
pub fn write_placements(world: &TerrainWorld, path: &Path) -> anyhow::Result<()> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .enumerate_arrays(false);
    let text = ron::ser::to_string_pretty(&world.placements(), pretty)
        .context("serializing placements")?;
    std::fs::write(path, text)
        .with_context(|| format!("writing placements to {}", path.display()))?;
    info!(path = %path.display(), "Placements exported");
    Ok(())
}

/// Render the heightfield over the terrain square as grayscale, black at
/// `-max_abs_height` and white at `+max_abs_height`. Row 0 is the `-z` edge.
pub fn heightmap_image(world: &TerrainWorld, resolution: u32) -> GrayImage {
    let heightfield = world.heightfield();
    let size = world.terrain_size();
    let half = size / 2.0;
    let step = size / f64::from(resolution.saturating_sub(1).max(1));
    let range = heightfield.max_abs_height();

    GrayImage::from_fn(resolution, resolution, |px, py| {
        let x = f64::from(px) * step - half;
        let z = f64::from(py) * step - half;
        let t = if range > 0.0 {
            (heightfield.height(x, z) / range * 0.5 + 0.5).clamp(0.0, 1.0)
        } else {
            0.5
        };
        Luma([(t * 255.0).round() as u8])
    })
}

/// Write [`heightmap_image`] to `path` as PNG.
pub fn write_heightmap(world: &TerrainWorld, path: &Path) -> anyhow::Result<()> {
    heightmap_image(world, HEIGHTMAP_RESOLUTION)
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing heightmap to {}", path.display()))?;
    info!(path = %path.display(), "Heightmap exported");
    Ok(())
}

//! PNG export of heightfields.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

use crate::error::Result;
use crate::tilemap::Heightfield;

/// Grayscale image of a heightfield. Values are expected in `[0, 1]`.
pub fn heightmap_image(heightfield: &Heightfield) -> GrayImage {
    let mut img: GrayImage = ImageBuffer::new(heightfield.width as u32, heightfield.height as u32);

    for (x, y, &h) in heightfield.iter() {
        let level = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
        img.put_pixel(x as u32, y as u32, Luma([level]));
    }

    img
}

/// Diverging image of a height change map.
/// Red = lowered (eroded), Blue = raised (deposited), Gray = unchanged.
pub fn height_delta_image(delta: &Heightfield) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(delta.width as u32, delta.height as u32);

    let mut max_abs = delta.iter().fold(0.0f32, |acc, (_, _, &d)| acc.max(d.abs()));
    if max_abs < 1e-6 {
        max_abs = 1.0;
    }

    for (x, y, &d) in delta.iter() {
        let normalized = (d / max_abs).clamp(-1.0, 1.0);
        let intensity = (normalized.abs() * 127.0) as u8;
        let color = if normalized < 0.0 {
            [128 + intensity, 128 - intensity, 128 - intensity]
        } else if normalized > 0.0 {
            [128 - intensity, 128 - intensity, 128 + intensity]
        } else {
            [128, 128, 128]
        };
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }

    img
}

pub fn export_heightmap(heightfield: &Heightfield, path: impl AsRef<Path>) -> Result<()> {
    heightmap_image(heightfield).save(path)?;
    Ok(())
}

pub fn export_height_delta(delta: &Heightfield, path: impl AsRef<Path>) -> Result<()> {
    height_delta_image(delta).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::Tilemap;

    #[test]
    fn test_heightmap_levels() {
        let field = Tilemap::from_fn(3, 1, |x, _| x as f32 * 0.5);
        let img = heightmap_image(&field);
        assert_eq!(img.dimensions(), (3, 1));
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(1, 0)[0], 128);
        assert_eq!(img.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_delta_colors_by_sign() {
        let delta = Tilemap::from_fn(3, 1, |x, _| [-0.2, 0.0, 0.1][x]);
        let img = height_delta_image(&delta);
        let lowered = img.get_pixel(0, 0);
        let raised = img.get_pixel(2, 0);
        assert!(lowered[0] > lowered[2]);
        assert!(raised[2] > raised[0]);
        assert_eq!(img.get_pixel(1, 0).0, [128, 128, 128]);
    }
}

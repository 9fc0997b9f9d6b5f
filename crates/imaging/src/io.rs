//! PNG output for intermediate and annotated images

use drawing_common::Result;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::Path;

/// Save an RGB image as PNG, creating parent directories as needed
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    image.save_with_format(path, ImageFormat::Png)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawing_common::PageImage;
    use image::Rgb;

    #[test]
    fn test_save_then_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("page_cropped.png");
        let img = RgbImage::from_pixel(8, 6, Rgb([12, 34, 56]));
        save_rgb(&img, &path).unwrap();

        let page = PageImage::open(&path).unwrap();
        assert_eq!(page.name, "page_cropped");
        assert_eq!(page.image, img);
    }
}

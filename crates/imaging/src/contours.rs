//! External contours of a binary image
//!
//! Only outermost borders are reported (outer borders without a parent), the
//! equivalent of `RETR_EXTERNAL`.

use drawing_common::BBox;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point as ImageProcPoint;

/// A connected foreground region described by its outer border
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Polygon area enclosed by the border pixels (shoelace)
    pub area: f64,
    pub bbox: BBox,
}

/// Outer borders of foreground (non-zero) regions
#[must_use]
pub fn external_regions(binary: &GrayImage) -> Vec<Region> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let bbox = BBox::enclosing(c.points.iter().map(|p| (p.x, p.y)))?;
            Some(Region {
                area: polygon_area(&c.points),
                bbox,
            })
        })
        .collect()
}

/// Region with the largest enclosed area, first one on ties
#[must_use]
pub fn largest_region(regions: &[Region]) -> Option<&Region> {
    regions.iter().fold(None, |best: Option<&Region>, r| match best {
        Some(b) if b.area >= r.area => Some(b),
        _ => Some(r),
    })
}

/// Absolute polygon area via the shoelace formula
#[must_use]
pub fn polygon_area(points: &[ImageProcPoint<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    (twice as f64).abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled_rect(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_polygon_area_square() {
        let pts = [
            ImageProcPoint::new(0, 0),
            ImageProcPoint::new(10, 0),
            ImageProcPoint::new(10, 10),
            ImageProcPoint::new(0, 10),
        ];
        assert_eq!(polygon_area(&pts), 100.0);
        assert_eq!(polygon_area(&pts[..2]), 0.0);
    }

    #[test]
    fn test_external_regions_skip_holes_and_children() {
        let mut img = GrayImage::new(60, 60);
        filled_rect(&mut img, 5, 5, 40, 40);
        // punch a hole with an island inside it
        for y in 15..35 {
            for x in 15..35 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        filled_rect(&mut img, 22, 22, 5, 5);
        filled_rect(&mut img, 50, 50, 4, 4);

        let regions = external_regions(&img);
        assert_eq!(regions.len(), 2);
        let largest = largest_region(&regions).unwrap();
        assert_eq!(largest.bbox, BBox::new(5, 5, 40, 40));
    }

    #[test]
    fn test_no_regions_on_blank_image() {
        let img = GrayImage::new(10, 10);
        assert!(external_regions(&img).is_empty());
        assert!(largest_region(&[]).is_none());
    }
}

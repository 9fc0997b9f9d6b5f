//! Pure Rust inpainting
//!
//! Fills masked pixels from the surrounding image, marching inward from the
//! mask boundary one layer at a time. Each filled pixel is a weighted mean of
//! the already-known pixels within `radius`; weights fall off with squared
//! distance and with the difference in layer index, so a pixel borrows mostly
//! from close neighbours that were reconstructed at the same depth. This
//! plays the role of `INPAINT_TELEA` for erasing text and symbols from line
//! drawings. With the `opencv` feature, [`inpaint`] calls OpenCV's Telea
//! implementation instead.

use drawing_common::{ProcessingError, Result};
use image::{GrayImage, Rgb, RgbImage};

const UNKNOWN: u32 = u32::MAX;

/// Inpaint the non-zero pixels of `mask`
///
/// # Errors
///
/// Returns `InvalidInput` when the mask and image dimensions differ, and
/// `ImageError` when the OpenCV backend fails.
pub fn inpaint(image: &RgbImage, mask: &GrayImage, radius: u32) -> Result<RgbImage> {
    #[cfg(feature = "opencv")]
    {
        crate::cv::inpaint_telea(image, mask, radius)
    }
    #[cfg(not(feature = "opencv"))]
    {
        inpaint_pure(image, mask, radius)
    }
}

/// Pure Rust inpainting of the non-zero pixels of `mask`
///
/// An all-zero mask returns an identical copy. A mask covering the whole
/// image has nothing to borrow from and also returns the input unchanged.
///
/// # Errors
///
/// Returns `InvalidInput` when the mask and image dimensions differ.
pub fn inpaint_pure(image: &RgbImage, mask: &GrayImage, radius: u32) -> Result<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(ProcessingError::InvalidInput(format!(
            "inpaint mask is {:?}, image is {:?}",
            mask.dimensions(),
            image.dimensions()
        )));
    }

    let (width, height) = image.dimensions();
    let mut out = image.clone();
    let index = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

    let mut level = vec![0u32; (width as usize) * (height as usize)];
    let mut masked = 0usize;
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] != 0 {
            level[index(x, y)] = UNKNOWN;
            masked += 1;
        }
    }
    if masked == 0 || masked == level.len() {
        return Ok(out);
    }

    let mut queued = vec![false; level.len()];
    let mut front = Vec::new();
    for (x, y, p) in mask.enumerate_pixels() {
        let on_boundary = || {
            neighbours4(x, y, width, height).any(|(nx, ny)| level[index(nx, ny)] != UNKNOWN)
        };
        if p[0] != 0 && on_boundary() {
            queued[index(x, y)] = true;
            front.push((x, y));
        }
    }

    let radius = i64::from(radius.max(1));
    let mut depth = 1u32;
    while !front.is_empty() {
        let filled: Vec<((u32, u32), Rgb<u8>)> = front
            .iter()
            .filter_map(|&(x, y)| {
                weighted_fill(&out, &level, (x, y), radius, depth).map(|px| ((x, y), px))
            })
            .collect();

        for &((x, y), px) in &filled {
            out.put_pixel(x, y, px);
            level[index(x, y)] = depth;
        }

        let mut next = Vec::new();
        for &((x, y), _) in &filled {
            for (nx, ny) in neighbours4(x, y, width, height) {
                let i = index(nx, ny);
                if level[i] == UNKNOWN && !queued[i] {
                    queued[i] = true;
                    next.push((nx, ny));
                }
            }
        }
        front = next;
        depth += 1;
    }

    Ok(out)
}

fn neighbours4(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let (x, y) = (i64::from(x), i64::from(y));
    [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
        .into_iter()
        .filter(move |&(nx, ny)| {
            nx >= 0 && ny >= 0 && nx < i64::from(width) && ny < i64::from(height)
        })
        .map(|(nx, ny)| (nx as u32, ny as u32))
}

fn weighted_fill(
    image: &RgbImage,
    level: &[u32],
    (x, y): (u32, u32),
    radius: i64,
    depth: u32,
) -> Option<Rgb<u8>> {
    let (width, height) = image.dimensions();
    let (cx, cy) = (i64::from(x), i64::from(y));
    let mut acc = [0.0f64; 3];
    let mut total = 0.0f64;

    for ny in (cy - radius).max(0)..=(cy + radius).min(i64::from(height) - 1) {
        for nx in (cx - radius).max(0)..=(cx + radius).min(i64::from(width) - 1) {
            let d2 = (nx - cx).pow(2) + (ny - cy).pow(2);
            if d2 == 0 || d2 > radius * radius {
                continue;
            }
            let q_level = level[(ny as usize) * (width as usize) + nx as usize];
            if q_level == UNKNOWN {
                continue;
            }
            let weight = 1.0 / (d2 as f64) / (1.0 + f64::from(depth.abs_diff(q_level)));
            let q = image.get_pixel(nx as u32, ny as u32);
            for c in 0..3 {
                acc[c] += weight * f64::from(q[c]);
            }
            total += weight;
        }
    }

    (total > 0.0).then(|| Rgb(acc.map(|v| (v / total).round().clamp(0.0, 255.0) as u8)))
}


#[cfg(all(test, feature = "opencv"))]
mod opencv_tests {
    use super::*;
    use crate::mask::rect_mask;
    use drawing_common::BBox;

    /// Mean absolute channel difference over the masked pixels
    fn masked_error(a: &RgbImage, b: &RgbImage, mask: &GrayImage) -> f64 {
        let mut sum = 0.0;
        let mut n = 0.0;
        for (x, y, m) in mask.enumerate_pixels() {
            if m[0] != 0 {
                let (pa, pb) = (a.get_pixel(x, y), b.get_pixel(x, y));
                for c in 0..3 {
                    sum += f64::from(pa[c].abs_diff(pb[c]));
                    n += 1.0;
                }
            }
        }
        sum / n
    }

    #[test]
    fn test_pure_inpaint_tracks_telea() {
        let mut img = RgbImage::from_fn(60, 40, |x, _| Rgb([(x * 4) as u8, 200, 90]));
        for y in 15..25 {
            for x in 20..40 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let mask = rect_mask(60, 40, [BBox::new(19, 14, 22, 12)]);
        let pure = inpaint_pure(&img, &mask, 3).unwrap();
        let telea = crate::cv::inpaint_telea(&img, &mask, 3).unwrap();
        assert!(masked_error(&pure, &telea, &mask) < 20.0);
    }

    #[test]
    fn test_telea_keeps_unmasked_pixels() {
        let img = RgbImage::from_fn(30, 30, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 50]));
        let mask = rect_mask(30, 30, [BBox::new(10, 10, 6, 6)]);
        let out = inpaint(&img, &mask, 3).unwrap();
        for (x, y, p) in img.enumerate_pixels() {
            if mask.get_pixel(x, y)[0] == 0 {
                assert_eq!(out.get_pixel(x, y), p);
            }
        }
    }
}

//! OpenCV implementations of inpainting and segment extraction
//!
//! Compiled with the `opencv` feature. Pixel buffers are copied into `Mat`s
//! and back; the pure Rust versions stay available for cross-checking.

use crate::segments::SegmentParams;
use drawing_common::{ProcessingError, Result};
use image::{GrayImage, RgbImage};
use opencv::{core, imgproc, photo, prelude::*};

fn cv_error(err: opencv::Error) -> ProcessingError {
    ProcessingError::ImageError(format!("OpenCV error: {err}"))
}

fn to_i32(value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| ProcessingError::InvalidInput(format!("{value} px exceeds OpenCV limits")))
}

/// `cv2.inpaint(image, mask, radius, INPAINT_TELEA)`
///
/// # Errors
///
/// Returns `InvalidInput` on a size mismatch, `ImageError` when OpenCV fails.
pub fn inpaint_telea(image: &RgbImage, mask: &GrayImage, radius: u32) -> Result<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(ProcessingError::InvalidInput(format!(
            "inpaint mask is {:?}, image is {:?}",
            mask.dimensions(),
            image.dimensions()
        )));
    }
    let (width, height) = image.dimensions();
    let (cols, rows) = (to_i32(width)?, to_i32(height)?);

    let pixels: Vec<core::Vec3b> = image
        .pixels()
        .map(|p| core::Vec3b::from([p[0], p[1], p[2]]))
        .collect();
    let src = core::Mat::new_rows_cols_with_data(rows, cols, &pixels).map_err(cv_error)?;
    let mask_mat =
        core::Mat::new_rows_cols_with_data(rows, cols, mask.as_raw()).map_err(cv_error)?;

    let mut dst = core::Mat::default();
    photo::inpaint(&src, &mask_mat, &mut dst, f64::from(radius), photo::INPAINT_TELEA)
        .map_err(cv_error)?;

    let bytes = dst.data_bytes().map_err(cv_error)?.to_vec();
    RgbImage::from_raw(width, height, bytes)
        .ok_or_else(|| ProcessingError::ImageError("OpenCV returned a short buffer".to_string()))
}

/// `cv2.HoughLinesP(edges, 1, pi / 180, ...)` as `(start, end)` pixel pairs
///
/// `suppression_radius` has no OpenCV counterpart and is ignored.
///
/// # Errors
///
/// Returns `ImageError` when OpenCV fails.
pub fn hough_segments(
    edges: &GrayImage,
    params: &SegmentParams,
) -> Result<Vec<((i32, i32), (i32, i32))>> {
    let (cols, rows) = (to_i32(edges.width())?, to_i32(edges.height())?);
    let src = core::Mat::new_rows_cols_with_data(rows, cols, edges.as_raw()).map_err(cv_error)?;
    let threshold = i32::try_from(params.vote_threshold).unwrap_or(i32::MAX);

    let mut lines = core::Vector::<core::Vec4i>::new();
    imgproc::hough_lines_p(
        &src,
        &mut lines,
        1.0,
        std::f64::consts::PI / 180.0,
        threshold,
        params.min_length,
        params.max_gap,
    )
    .map_err(cv_error)?;

    Ok(lines
        .iter()
        .map(|l| ((l[0], l[1]), (l[2], l[3])))
        .collect())
}

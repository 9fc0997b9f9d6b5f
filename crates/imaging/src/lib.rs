//! Image primitives used by the drawing pipeline
//!
//! Thin, documented wrappers over `imageproc` plus the operations it does not
//! ship (inpainting, probabilistic segment extraction):
//! - Otsu binarization and inversion
//! - External contours with area and bounding box
//! - Rectangle masks and square dilation
//! - Neighbourhood-weighted inpainting
//! - Hough-based line segment extraction with gap merging
//! - Annotation drawing with stroke thickness
//!
//! The `opencv` feature routes [`inpaint`] and [`detect_segments`] through
//! OpenCV's Telea inpainting and `HoughLinesP`; the pure Rust versions remain
//! the default and stay public as [`inpaint_pure`] and [`detect_segments_pure`].

// Pixel coordinates cross between u32 (image crate), i32 (contours) and f64 (geometry)
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod binarize;
pub mod contours;
#[cfg(feature = "opencv")]
pub mod cv;
pub mod draw;
pub mod inpaint;
pub mod io;
pub mod mask;
pub mod segments;

pub use binarize::{binarize_otsu, foreground_mask, to_gray, BLUR_5X5_SIGMA};
pub use contours::{external_regions, largest_region, Region};
pub use inpaint::{inpaint, inpaint_pure};
pub use mask::{dilate_square, is_blank, rect_mask};
pub use segments::{detect_segments, detect_segments_pure, SegmentParams};

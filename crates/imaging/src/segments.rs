//! Probabilistic line segments over the Hough transform
//!
//! `imageproc` reports infinite polar lines. Each one is walked across the
//! edge map and broken into segments: edge runs separated by at most
//! `max_gap` pixels are merged, runs shorter than `min_length` are dropped,
//! and pixels of an accepted segment are consumed so that later lines do not
//! report them again (the `HoughLinesP` contract). With the `opencv` feature,
//! [`detect_segments`] calls `HoughLinesP` itself.

use image::GrayImage;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

/// Parameters of the segment extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    /// Minimum accumulator votes for a candidate line
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in the accumulator
    pub suppression_radius: u32,
    /// Shortest segment kept, in pixels
    pub min_length: f64,
    /// Longest run of missing edge pixels bridged inside a segment
    pub max_gap: f64,
}

type Pixel = (i32, i32);

/// Segments as `(start, end)` pixel pairs, in accumulator order
///
/// An OpenCV failure is logged and answered by the pure Rust extraction.
#[must_use]
pub fn detect_segments(edges: &GrayImage, params: &SegmentParams) -> Vec<(Pixel, Pixel)> {
    #[cfg(feature = "opencv")]
    match crate::cv::hough_segments(edges, params) {
        Ok(segments) => return segments,
        Err(e) => tracing::warn!("HoughLinesP failed, using pure extraction: {}", e),
    }
    detect_segments_pure(edges, params)
}

/// Pure Rust segment extraction over `imageproc`'s polar lines
#[must_use]
pub fn detect_segments_pure(edges: &GrayImage, params: &SegmentParams) -> Vec<(Pixel, Pixel)> {
    let options = LineDetectionOptions {
        vote_threshold: params.vote_threshold,
        suppression_radius: params.suppression_radius,
    };
    let lines = detect_lines(edges, options);
    tracing::debug!("Hough transform found {} candidate lines", lines.len());

    let mut live = edges.clone();
    let mut segments = Vec::new();
    for line in &lines {
        for seg in walk_line(&live, line, params) {
            consume(&mut live, seg, line);
            segments.push(seg);
        }
    }
    segments
}

/// Direction and origin of a polar line: `x cos t + y sin t = r`
fn parametrize(line: &PolarLine) -> ((f64, f64), (f64, f64)) {
    let theta = f64::from(line.angle_in_degrees).to_radians();
    let (sin, cos) = theta.sin_cos();
    let r = f64::from(line.r);
    ((r * cos, r * sin), (-sin, cos))
}

fn walk_line(
    edges: &GrayImage,
    line: &PolarLine,
    params: &SegmentParams,
) -> Vec<(Pixel, Pixel)> {
    let (width, height) = edges.dimensions();
    let (origin, dir) = parametrize(line);
    let Some((t0, t1)) = clip_to_image(origin, dir, width, height) else {
        return Vec::new();
    };
    let normal = (dir.1, -dir.0);

    let mut segments = Vec::new();
    let mut run: Option<(Pixel, f64)> = None;
    let mut last: Option<(Pixel, f64)> = None;

    let mut t = t0.ceil();
    while t <= t1 {
        let px = at(origin, dir, t);
        if hit(edges, px, normal) {
            match (run, last) {
                (Some(start), Some(prev)) if t - prev.1 > params.max_gap + 1.0 => {
                    push_if_long(&mut segments, start.0, prev.0, params.min_length);
                    run = Some((px, t));
                }
                (None, _) => run = Some((px, t)),
                _ => {}
            }
            last = Some((px, t));
        }
        t += 1.0;
    }
    if let (Some(start), Some(prev)) = (run, last) {
        push_if_long(&mut segments, start.0, prev.0, params.min_length);
    }
    segments
}

fn push_if_long(out: &mut Vec<(Pixel, Pixel)>, start: Pixel, end: Pixel, min_length: f64) {
    let len = f64::from(end.0 - start.0).hypot(f64::from(end.1 - start.1));
    if len >= min_length {
        out.push((start, end));
    }
}

fn at(origin: (f64, f64), dir: (f64, f64), t: f64) -> Pixel {
    (
        (origin.0 + t * dir.0).round() as i32,
        (origin.1 + t * dir.1).round() as i32,
    )
}

fn is_set(edges: &GrayImage, (x, y): Pixel) -> bool {
    x >= 0
        && y >= 0
        && (x as u32) < edges.width()
        && (y as u32) < edges.height()
        && edges.get_pixel(x as u32, y as u32)[0] != 0
}

/// Edge pixel on the line or one step either side of it
fn hit(edges: &GrayImage, px: Pixel, normal: (f64, f64)) -> bool {
    let (nx, ny) = (normal.0.round() as i32, normal.1.round() as i32);
    is_set(edges, px)
        || is_set(edges, (px.0 + nx, px.1 + ny))
        || is_set(edges, (px.0 - nx, px.1 - ny))
}

fn consume(edges: &mut GrayImage, (start, end): (Pixel, Pixel), line: &PolarLine) {
    let (_, dir) = parametrize(line);
    let normal = (dir.1, -dir.0);
    let (nx, ny) = (normal.0.round() as i32, normal.1.round() as i32);
    let steps = (end.0 - start.0).abs().max((end.1 - start.1).abs());
    for i in 0..=steps {
        let f = if steps == 0 { 0.0 } else { f64::from(i) / f64::from(steps) };
        let x = (f64::from(start.0) + f * f64::from(end.0 - start.0)).round() as i32;
        let y = (f64::from(start.1) + f * f64::from(end.1 - start.1)).round() as i32;
        for (px, py) in [(x, y), (x + nx, y + ny), (x - nx, y - ny)] {
            if is_set(edges, (px, py)) {
                edges.put_pixel(px as u32, py as u32, image::Luma([0]));
            }
        }
    }
}

/// Parameter range of `origin + t * dir` inside `[0, w-1] x [0, h-1]`
fn clip_to_image(
    origin: (f64, f64),
    dir: (f64, f64),
    width: u32,
    height: u32,
) -> Option<(f64, f64)> {
    if width == 0 || height == 0 {
        return None;
    }
    let mut t0 = f64::NEG_INFINITY;
    let mut t1 = f64::INFINITY;
    for (o, d, max) in [
        (origin.0, dir.0, f64::from(width - 1)),
        (origin.1, dir.1, f64::from(height - 1)),
    ] {
        if d.abs() < 1e-9 {
            if o < -0.5 || o > max + 0.5 {
                return None;
            }
        } else {
            let a = -o / d;
            let b = (max - o) / d;
            t0 = t0.max(a.min(b));
            t1 = t1.min(a.max(b));
        }
    }
    (t0 <= t1).then_some((t0, t1))
}


#[cfg(all(test, feature = "opencv"))]
mod opencv_tests {
    use super::*;
    use image::Luma;

    fn params() -> SegmentParams {
        SegmentParams {
            vote_threshold: 40,
            suppression_radius: 8,
            min_length: 30.0,
            max_gap: 5.0,
        }
    }

    fn span(segs: &[(Pixel, Pixel)]) -> (i32, i32) {
        let xs = segs.iter().flat_map(|&((x0, _), (x1, _))| [x0, x1]);
        (xs.clone().min().unwrap_or(0), xs.max().unwrap_or(0))
    }

    #[test]
    fn test_pure_segments_cover_the_same_run_as_houghlinesp() {
        let mut edges = GrayImage::new(160, 60);
        for x in 10..150 {
            edges.put_pixel(x, 30, Luma([255]));
        }
        let pure = detect_segments_pure(&edges, &params());
        let cv = crate::cv::hough_segments(&edges, &params()).unwrap();
        assert!(!pure.is_empty() && !cv.is_empty());
        let (p0, p1) = span(&pure);
        let (c0, c1) = span(&cv);
        assert!((p0 - c0).abs() <= 3 && (p1 - c1).abs() <= 3);
    }

    #[test]
    fn test_houghlinesp_on_blank_edges() {
        let edges = GrayImage::new(50, 50);
        assert!(detect_segments(&edges, &params()).is_empty());
    }
}

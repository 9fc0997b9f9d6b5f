//! Text direction from box corners

use drawing_common::Point;

/// Direction of the longest edge of a quadrilateral, in degrees
///
/// Edges run `corners[i] -> corners[(i + 1) % 4]`; the first longest edge
/// wins ties. The result is `atan2(dy, dx)` normalized to (-180, 180].
#[must_use]
pub fn orientation_degrees(corners: &[Point; 4]) -> f64 {
    let mut longest = 0;
    let mut longest_len = f64::NEG_INFINITY;
    for i in 0..4 {
        let len = corners[i].distance(&corners[(i + 1) % 4]);
        if len > longest_len {
            longest = i;
            longest_len = len;
        }
    }

    let (a, b) = (corners[longest], corners[(longest + 1) % 4]);
    let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    if angle <= -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

#![allow(dead_code)] // Complete geometry kit, not every helper is used by every structure
//! Vector arithmetic over canvas coordinate lists
//!
//! Coordinates are flat `f64` slices: length 2 is a point, length 4 is a
//! bounding box, length 2k is a polyline. Binary operations zip the two
//! inputs and truncate to the shorter one, so adding a `(dx, dy)` pair to a
//! bounding box yields the translated upper-left point. All functions are
//! pure; mismatched arity is a caller bug, not a recoverable error.

/// Element-wise sum, truncated to the shorter input.
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

/// Element-wise difference, truncated to the shorter input.
pub fn subtract(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x - y).collect()
}

/// Scale every component by `k`.
pub fn multiply(a: &[f64], k: f64) -> Vec<f64> {
    a.iter().map(|x| x * k).collect()
}

/// Divide every component by `k`.
pub fn divide(a: &[f64], k: f64) -> Vec<f64> {
    a.iter().map(|x| x / k).collect()
}

/// Translate every `(x, y)` pair of a coordinate list by `delta`.
pub fn translate(coords: &[f64], delta: [f64; 2]) -> Vec<f64> {
    coords
        .iter()
        .enumerate()
        .map(|(i, c)| c + delta[i % 2])
        .collect()
}

/// Rotate each `(x, y)` pair counterclockwise by `degrees` around the origin.
pub fn rotate(coords: &[f64], degrees: f64) -> Vec<f64> {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let mut out = Vec::with_capacity(coords.len());
    for pair in coords.chunks(2) {
        if pair.len() == 2 {
            out.push(pair[0] * cos - pair[1] * sin);
            out.push(pair[0] * sin + pair[1] * cos);
        } else {
            out.push(pair[0]);
        }
    }
    out
}

/// Dot product over the shorter input.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Squared length of a vector.
pub fn len2(v: &[f64]) -> f64 {
    dot(v, v)
}

/// Unit vector in the direction of `v`. Vectors shorter than `min_length`
/// are scaled up to it first so degenerate arrows keep a usable direction.
pub fn unit(v: [f64; 2], min_length: f64) -> [f64; 2] {
    let len = len2(&v).sqrt();
    if len == 0.0 {
        return [min_length, 0.0];
    }
    let scale = min_length.max(len) / len;
    let scaled = [v[0] * scale, v[1] * scale];
    let slen = len2(&scaled).sqrt();
    [scaled[0] / slen, scaled[1] / slen]
}

/// Perpendicular of a 2-D vector (rotated 90 degrees counterclockwise).
pub fn normal2d(v: [f64; 2]) -> [f64; 2] {
    [-v[1], v[0]]
}

/// Smallest box containing both boxes.
pub fn bbox_union(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
}

/// Center point of a box (or of any 4-coordinate pair of corners).
pub fn bbox_center(b: &[f64]) -> [f64; 2] {
    [(b[0] + b[2]) / 2.0, (b[1] + b[3]) / 2.0]
}

/// Whether `pt` lies inside the box, edges inclusive.
pub fn bbox_contains(b: &[f64], pt: [f64; 2]) -> bool {
    b[0] <= pt[0] && pt[0] <= b[2] && b[1] <= pt[1] && pt[1] <= b[3]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_truncates() {
        // bbox + point offset yields the translated corner
        assert_eq!(add(&[10.0, 20.0, 30.0, 40.0], &[5.0, 5.0]), vec![15.0, 25.0]);
    }

    #[test]
    fn test_translate_pairs() {
        assert_eq!(
            translate(&[0.0, 0.0, 10.0, 10.0], [3.0, -2.0]),
            vec![3.0, -2.0, 13.0, 8.0]
        );
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let r = rotate(&[1.0, 0.0], 90.0);
        assert!((r[0] - 0.0).abs() < 1e-9);
        assert!((r[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_of_zero_vector() {
        let u = unit([0.0, 0.0], 1.0);
        assert!((len2(&u).sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_union_and_center() {
        let u = bbox_union([0.0, 0.0, 10.0, 10.0], [5.0, -5.0, 20.0, 5.0]);
        assert_eq!(u, [0.0, -5.0, 20.0, 10.0]);
        assert_eq!(bbox_center(&u), [10.0, 2.5]);
    }

    #[test]
    fn test_bbox_contains_edges() {
        let b = [0.0, 0.0, 10.0, 10.0];
        assert!(bbox_contains(&b, [0.0, 10.0]));
        assert!(!bbox_contains(&b, [10.1, 5.0]));
    }
}

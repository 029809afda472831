//! Ordering large point buffers, lexicographically and in Morton order.
//!
//! Both orders return a permutation of indices rather than moving the
//! points. Above `PARALLEL_THRESHOLD` the sort runs on the rayon pool with
//! the same comparator as the serial path, so the result is identical.

use crate::cgmath64::*;
use rayon::prelude::*;

/// Point count above which sorting goes parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Maps a float to a key whose unsigned order matches the float order.
#[inline(always)]
fn ordered_bits(x: f64) -> u64 {
    let bits = x.to_bits();
    match bits >> 63 == 1 {
        true => !bits,
        false => bits | 0x8000_0000_0000_0000,
    }
}

/// Whether the most significant differing bit of `a ^ b` is higher than any
/// previously seen dimension. Classic floating-point Morton comparison on
/// order-preserving integer keys.
#[inline(always)]
fn less_msb(a: u64, b: u64) -> bool { a < b && a < (a ^ b) }

/// Morton (Z-order) comparison of two points.
fn less_z_order(p: &Point3, q: &Point3) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    let pk = [ordered_bits(p.x), ordered_bits(p.y), ordered_bits(p.z)];
    let qk = [ordered_bits(q.x), ordered_bits(q.y), ordered_bits(q.z)];
    let mut dim = 0;
    let mut best = pk[0] ^ qk[0];
    for k in 1..3 {
        let x = pk[k] ^ qk[k];
        if less_msb(best, x) {
            dim = k;
            best = x;
        }
    }
    match pk[dim] < qk[dim] {
        true => Ordering::Less,
        false if pk[dim] == qk[dim] => Ordering::Equal,
        false => Ordering::Greater,
    }
}

/// Lexicographic comparison of two points.
fn less_lexicographic(p: &Point3, q: &Point3) -> std::cmp::Ordering {
    (p.x, p.y, p.z).partial_cmp(&(q.x, q.y, q.z)).unwrap()
}

fn order_by(
    points: &[Point3],
    cmp: impl Fn(&Point3, &Point3) -> std::cmp::Ordering + Sync,
) -> Vec<u32> {
    let mut index: Vec<u32> = (0..points.len() as u32).collect();
    let compare = |i: &u32, j: &u32| cmp(&points[*i as usize], &points[*j as usize]);
    match points.len() > PARALLEL_THRESHOLD {
        true => index.par_sort_by(compare),
        false => index.sort_by(compare),
    }
    index
}

/// Permutation putting `points` into lexicographic (dictionary) order.
pub fn order_points_lexicographic(points: &[Point3]) -> Vec<u32> {
    order_by(points, less_lexicographic)
}

/// Permutation putting `points` into Morton (Z-curve) order.
pub fn order_points_morton(points: &[Point3]) -> Vec<u32> {
    order_by(points, less_z_order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points(n: usize) -> Vec<Point3> {
        (0..n)
            .map(|i| {
                let h = crate::hash::hash1(i as f64);
                let g = crate::hash::hash1(h + 1.0);
                let k = crate::hash::hash1(g + 2.0);
                Point3::new(h * 2.0 - 1.0, g * 2.0 - 1.0, k * 2.0 - 1.0)
            })
            .collect()
    }

    #[test]
    fn lexicographic_is_sorted() {
        let pts = sample_points(100);
        let order = order_points_lexicographic(&pts);
        for w in order.windows(2) {
            let (p, q) = (pts[w[0] as usize], pts[w[1] as usize]);
            assert!((p.x, p.y, p.z) <= (q.x, q.y, q.z));
        }
    }

    #[test]
    fn morton_parallel_matches_serial() {
        let pts = sample_points(PARALLEL_THRESHOLD + 100);
        let parallel = order_points_morton(&pts);
        let mut serial: Vec<u32> = (0..pts.len() as u32).collect();
        serial.sort_by(|i, j| less_z_order(&pts[*i as usize], &pts[*j as usize]));
        assert_eq!(parallel, serial);
    }

    #[test]
    fn morton_groups_neighbors() {
        // neighbors within an octant stay contiguous
        let pts = vec![
            Point3::new(0.1, 0.1, 0.1),
            Point3::new(10.0, 10.0, 10.0),
            Point3::new(0.2, 0.1, 0.1),
            Point3::new(10.1, 10.0, 10.0),
        ];
        let order = order_points_morton(&pts);
        let pos = |i: u32| order.iter().position(|&x| x == i).unwrap();
        assert_eq!((pos(0) as i64 - pos(2) as i64).abs(), 1);
        assert_eq!((pos(1) as i64 - pos(3) as i64).abs(), 1);
    }
}

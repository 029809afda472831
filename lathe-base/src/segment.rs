use crate::cgmath64::*;
use crate::tolerance::*;

/// 2-dimensional line segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment2 {
    /// start point
    pub start: Point2,
    /// end point
    pub end: Point2,
}

/// 3-dimensional line segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment3 {
    /// start point
    pub start: Point3,
    /// end point
    pub end: Point3,
}

impl Segment2 {
    /// constructor
    #[inline(always)]
    pub const fn new(start: Point2, end: Point2) -> Self { Self { start, end } }

    /// segment length
    #[inline(always)]
    pub fn length(&self) -> f64 { self.start.distance(self.end) }

    /// Whether the open interiors of two segments cross. Shared endpoints
    /// do not count as a crossing.
    pub fn crosses(&self, other: &Self) -> bool {
        let d1 = self.end - self.start;
        let d2 = other.end - other.start;
        let denom = d1.perp_dot(d2);
        if denom.so_small() {
            return false;
        }
        let diff = other.start - self.start;
        let s = diff.perp_dot(d2) / denom;
        let t = diff.perp_dot(d1) / denom;
        let eps = TOLERANCE;
        eps < s && s < 1.0 - eps && eps < t && t < 1.0 - eps
    }

    /// distance from `pos` to the segment
    pub fn distance(&self, pos: Point2) -> f64 {
        let dir = self.end - self.start;
        let len2 = dir.magnitude2();
        if len2.so_small2() {
            return self.start.distance(pos);
        }
        let t = f64::clamp((pos - self.start).dot(dir) / len2, 0.0, 1.0);
        (self.start + dir * t).distance(pos)
    }
}

impl Segment3 {
    /// constructor
    #[inline(always)]
    pub const fn new(start: Point3, end: Point3) -> Self { Self { start, end } }

    /// segment length
    #[inline(always)]
    pub fn length(&self) -> f64 { self.start.distance(self.end) }

    /// whether `pos` lies on the segment within `tol`
    pub fn point_on_segment(&self, pos: Point3, tol: f64) -> bool {
        let dir = self.end - self.start;
        let len2 = dir.magnitude2();
        if len2.so_small2() {
            return self.start.distance(pos) <= tol;
        }
        let t = f64::clamp((pos - self.start).dot(dir) / len2, 0.0, 1.0);
        (self.start + dir * t).distance(pos) <= tol
    }
}

/// Cumulative chord lengths of a polyline, starting at `0.0`.
pub fn find_lengths(points: &[Point3]) -> Vec<f64> {
    let mut params = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    params.push(0.0);
    for w in points.windows(2) {
        acc += w[0].distance(w[1]);
        params.push(acc);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_crossing() {
        let a = Segment2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let b = Segment2::new(Point2::new(0.0, 1.0), Point2::new(1.0, 0.0));
        let c = Segment2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert!(a.crosses(&b));
        assert!(!a.crosses(&c));
    }

    #[test]
    fn point_on_segment() {
        let s = Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert!(s.point_on_segment(Point3::new(1.0, 0.0, 0.0), 1.0e-6));
        assert!(!s.point_on_segment(Point3::new(1.0, 0.1, 0.0), 1.0e-6));
        assert_eq!(find_lengths(&[s.start, s.end]), vec![0.0, 2.0]);
    }
}

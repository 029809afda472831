use crate::cgmath64::*;
use crate::tolerance::*;
use serde::{Deserialize, Serialize};

/// 1-dimensional parameter interval, closed, possibly unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval1D {
    /// lower bound
    pub min: f64,
    /// upper bound
    pub max: f64,
}

impl Interval1D {
    /// constructor
    #[inline(always)]
    pub const fn new(min: f64, max: f64) -> Self { Self { min, max } }

    /// the whole real line, clamped to `MAX_VALUE`
    #[inline(always)]
    pub const fn unbounded() -> Self { Self { min: -MAX_VALUE, max: MAX_VALUE } }

    /// an inverted interval to be stretched by `add`
    #[inline(always)]
    pub const fn empty() -> Self { Self { min: f64::INFINITY, max: f64::NEG_INFINITY } }

    /// whether no value has been added yet
    #[inline(always)]
    pub fn is_empty(self) -> bool { self.max < self.min }

    /// whether both bounds are finite and well below `MAX_VALUE`
    #[inline(always)]
    pub fn is_bounded(self) -> bool { -MAX_VALUE < self.min && self.max < MAX_VALUE }

    /// length of the interval
    #[inline(always)]
    pub fn length(self) -> f64 { self.max - self.min }

    /// point at the given fraction, `0.0` = min, `1.0` = max
    #[inline(always)]
    pub fn mid_point(self, fraction: f64) -> f64 {
        self.min * (1.0 - fraction) + self.max * fraction
    }

    /// whether `t` lies in the closed interval
    #[inline(always)]
    pub fn contains(self, t: f64) -> bool { self.min <= t && t <= self.max }

    /// whether `t` lies within `tol` of either bound
    #[inline(always)]
    pub fn on_boundary(self, t: f64, tol: f64) -> bool {
        f64::abs(t - self.min) <= tol || f64::abs(t - self.max) <= tol
    }

    /// clamps `t` into the interval
    #[inline(always)]
    pub fn clamp(self, t: f64) -> f64 { f64::min(f64::max(t, self.min), self.max) }

    /// stretches the interval to contain `t`
    #[inline(always)]
    pub fn add(&mut self, t: f64) {
        self.min = f64::min(self.min, t);
        self.max = f64::max(self.max, t);
    }

    /// intersection with another interval; empty when disjoint
    #[inline(always)]
    pub fn intersect(self, other: Self) -> Self {
        Self::new(f64::max(self.min, other.min), f64::min(self.max, other.max))
    }
}

/// uv parameter rectangle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval2D {
    /// u interval
    pub u: Interval1D,
    /// v interval
    pub v: Interval1D,
}

impl Interval2D {
    /// constructor
    #[inline(always)]
    pub const fn new(u: Interval1D, v: Interval1D) -> Self { Self { u, v } }

    /// whether `uv` lies in the rectangle
    #[inline(always)]
    pub fn contains(self, uv: Point2) -> bool { self.u.contains(uv.x) && self.v.contains(uv.y) }

    /// clamps `uv` into the rectangle
    #[inline(always)]
    pub fn clamp(self, uv: Point2) -> Point2 { Point2::new(self.u.clamp(uv.x), self.v.clamp(uv.y)) }

    /// center of the rectangle
    #[inline(always)]
    pub fn center(self) -> Point2 { Point2::new(self.u.mid_point(0.5), self.v.mid_point(0.5)) }
}

/// 3-dimensional axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// minimum corner
    pub min: Point3,
    /// maximum corner
    pub max: Point3,
}

impl Default for BoundingBox {
    fn default() -> Self { Self::empty() }
}

impl BoundingBox {
    /// an inverted box to be stretched by `push`
    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// whether no point has been pushed yet
    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.max.x < self.min.x }

    /// box of a point set
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bb = Self::empty();
        points.into_iter().for_each(|p| bb.push(*p));
        bb
    }

    /// stretches the box to contain `p`
    #[inline]
    pub fn push(&mut self, p: Point3) {
        self.min.x = f64::min(self.min.x, p.x);
        self.min.y = f64::min(self.min.y, p.y);
        self.min.z = f64::min(self.min.z, p.z);
        self.max.x = f64::max(self.max.x, p.x);
        self.max.y = f64::max(self.max.y, p.y);
        self.max.z = f64::max(self.max.z, p.z);
    }

    /// union of two boxes
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        let mut bb = *self;
        if !other.is_empty() {
            bb.push(other.min);
            bb.push(other.max);
        }
        bb
    }

    /// grows the box by `margin` on every side
    #[inline]
    pub fn stretch(&self, margin: f64) -> Self {
        let d = Vector3::new(margin, margin, margin);
        Self { min: self.min - d, max: self.max + d }
    }

    /// diagonal length
    #[inline(always)]
    pub fn diagonal(&self) -> f64 { (self.max - self.min).magnitude() }

    /// center of the box
    #[inline(always)]
    pub fn center(&self) -> Point3 { self.min.midpoint(self.max) }

    /// whether `p` lies inside the box
    #[inline]
    pub fn contains(&self, p: Point3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// whether the two boxes overlap
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// slab test against the ray `origin + t * dir`, any `t`
    pub fn hit_by_line(&self, origin: Point3, dir: Vector3, tol: f64) -> bool {
        let mut t0 = f64::NEG_INFINITY;
        let mut t1 = f64::INFINITY;
        for k in 0..3 {
            let (o, d) = (origin[k], dir[k]);
            let (lo, hi) = (self.min[k] - tol, self.max[k] + tol);
            if d.so_small() {
                if o < lo || hi < o {
                    return false;
                }
            } else {
                let (a, b) = ((lo - o) / d, (hi - o) / d);
                t0 = f64::max(t0, f64::min(a, b));
                t1 = f64::min(t1, f64::max(a, b));
            }
        }
        t0 <= t1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_basics() {
        let i = Interval1D::new(1.0, 3.0);
        assert_eq!(i.length(), 2.0);
        assert_eq!(i.mid_point(0.5), 2.0);
        assert!(i.contains(2.5));
        assert!(!i.contains(3.5));
        assert_eq!(i.clamp(5.0), 3.0);
        assert!(Interval1D::unbounded().contains(1.0e9));
        assert!(!Interval1D::unbounded().is_bounded());
    }

    #[test]
    fn box_line_hit() {
        let bb = BoundingBox::from_points(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]);
        assert!(bb.hit_by_line(Point3::new(-1.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0), 0.0));
        assert!(!bb.hit_by_line(Point3::new(-1.0, 2.5, 0.5), Vector3::new(1.0, 0.0, 0.0), 0.0));
        assert!(bb.contains(Point3::new(0.5, 0.5, 0.5)));
    }
}

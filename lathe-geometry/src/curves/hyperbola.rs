use super::*;

/// one branch of the hyperbola
/// `p(t) = center + a * cosh(t) * x_axis + b * sinh(t) * y_axis`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperbola {
    center: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
    a: f64,
    b: f64,
}

/// parameter bound keeping cosh/sinh in a sane floating range
const HYPERBOLA_RANGE: f64 = 12.0;

impl Hyperbola {
    /// The branch of `x^2/a^2 - y^2/b^2 = 1` opening along `x_axis`.
    pub fn new(center: Point3, normal: Vector3, x_axis: Vector3, a: f64, b: f64) -> Self {
        let normal = normal.normalize();
        let x_axis = (x_axis - normal * x_axis.dot(normal)).normalize();
        let y_axis = normal.cross(x_axis);
        Self { center, x_axis, y_axis, normal, a, b }
    }

    /// center of the hyperbola
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.center }

    /// semi-axis along x
    #[inline(always)]
    pub const fn semi_major(&self) -> f64 { self.a }

    /// semi-axis along y
    #[inline(always)]
    pub const fn semi_minor(&self) -> f64 { self.b }

    /// unit normal of the hyperbola plane
    #[inline(always)]
    pub const fn normal(&self) -> Vector3 { self.normal }

    /// unit x axis
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// whether `other` traces the same hyperbola within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.a, other.a, tol, false)
            && near_equal(self.b, other.b, tol, false)
            && self.center.distance(other.center) <= tol
            && near_equal(f64::abs(self.normal.dot(other.normal)), 1.0, tol, false)
            && near_equal(self.x_axis.dot(other.x_axis), 1.0, tol, false)
    }
}

impl ParametricCurve for Hyperbola {
    #[inline]
    fn subs(&self, t: f64) -> Point3 {
        self.center + self.x_axis * (self.a * t.cosh()) + self.y_axis * (self.b * t.sinh())
    }
    #[inline]
    fn der(&self, t: f64) -> Vector3 {
        self.x_axis * (self.a * t.sinh()) + self.y_axis * (self.b * t.cosh())
    }
    #[inline]
    fn der2(&self, t: f64) -> Vector3 {
        self.x_axis * (self.a * t.cosh()) + self.y_axis * (self.b * t.sinh())
    }
}

impl BoundedCurve for Hyperbola {
    #[inline(always)]
    fn parameter_range(&self) -> Interval1D {
        Interval1D::new(-HYPERBOLA_RANGE, HYPERBOLA_RANGE)
    }
}

impl SearchNearestParameter for Hyperbola {
    type Parameter = f64;
    fn search_nearest_parameter(
        &self,
        point: Point3,
        hint: Option<f64>,
        trials: usize,
    ) -> Option<f64> {
        let diff = point - self.center;
        let (x, y) = (diff.dot(self.x_axis), diff.dot(self.y_axis));
        // asinh of the scaled y coordinate seeds Newton on the closest
        // point condition
        let mut t = hint.unwrap_or_else(|| f64::asinh(y / self.b));
        for _ in 0..usize::max(trials, 16) {
            let (sh, ch) = (t.sinh(), t.cosh());
            let f = (self.a * ch - x) * self.a * sh + (self.b * sh - y) * self.b * ch;
            let fp = (self.a * self.a + self.b * self.b) * (ch * ch + sh * sh)
                - x * self.a * ch
                - y * self.b * sh;
            if fp.so_small() {
                break;
            }
            let step = f / fp;
            t -= step;
            if step.so_small2() {
                break;
            }
        }
        Some(t.clamp(-HYPERBOLA_RANGE, HYPERBOLA_RANGE))
    }
}

impl Transformed for Hyperbola {
    fn transform_by(&mut self, trans: &Transform3) {
        self.center = trans.transform_point(self.center);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.normal = trans.transform_unit(self.normal);
        self.a *= trans.scale_factor();
        self.b *= trans.scale_factor();
    }
}

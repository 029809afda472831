use crate::cgmath64::*;

/// Deterministic hash of a scalar into `[0, 1)`.
#[inline]
pub fn hash1(s: f64) -> f64 {
    let x = f64::sin(s * 61.909685033545934 + 8.436303256302796) * 220.6786200836378;
    x - f64::floor(x)
}

/// Deterministic hash of a uv point into `[0, 1)`.
#[inline]
pub fn hash_uv(uv: Point2) -> f64 {
    let a = hash1(uv.x);
    let b = hash1(uv.y);
    let x = f64::sin(a * 9.784225605373198 + b * 68.94807014710901) * 81.49907289737997;
    x - f64::floor(x)
}

/// Deterministic pseudo-random unit direction keyed to a uv point,
/// used to tie-break containment ray casts.
#[inline]
pub fn jitter_direction(uv: Point2) -> Vector2 {
    let t = 2.0 * std::f64::consts::PI * hash_uv(uv);
    Vector2::new(f64::cos(t), f64::sin(t))
}

/// Deterministic pseudo-random unit direction in 3D keyed to a point,
/// used to retry tangent ray fires.
#[inline]
pub fn jitter_direction3(p: Point3, salt: f64) -> Vector3 {
    let u = hash_uv(Point2::new(hash1(p.x + salt), hash1(p.y - p.z)));
    let w = hash1(u + salt);
    let theta = 2.0 * std::f64::consts::PI * u;
    let z = 2.0 * w - 1.0;
    let r = f64::sqrt(f64::max(0.0, 1.0 - z * z));
    Vector3::new(r * f64::cos(theta), r * f64::sin(theta), z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgmath64::*;

    #[test]
    fn deterministic_and_unit() {
        let uv = Point2::new(0.25, 0.75);
        assert_eq!(jitter_direction(uv), jitter_direction(uv));
        assert!((jitter_direction(uv).magnitude() - 1.0).abs() < 1.0e-12);
        let d = jitter_direction3(Point3::new(1.0, 2.0, 3.0), 0.0);
        assert!((d.magnitude() - 1.0).abs() < 1.0e-12);
    }
}

use lathe_base::prelude::*;
use serde::{Deserialize, Serialize};

/// A similarity transform: rotation, translation, and uniform scale.
///
/// Analytic geometry kinds carry orthonormal frames, so only transforms
/// that keep frames orthonormal are representable. Shear and non-uniform
/// scale are not supported.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3 {
    rotation: Matrix3,
    translation: Vector3,
    scale: f64,
}

impl Transform3 {
    /// the identity transform
    #[inline(always)]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zero(),
            scale: 1.0,
        }
    }

    /// a pure translation
    #[inline(always)]
    pub fn translate(v: Vector3) -> Self {
        Self { translation: v, ..Self::identity() }
    }

    /// a uniform scale about the origin
    #[inline(always)]
    pub fn scale(s: f64) -> Self {
        Self { scale: s, ..Self::identity() }
    }

    /// a rotation about the axis through the origin
    #[inline]
    pub fn rotate(axis: Vector3, angle: Rad<f64>) -> Self {
        Self {
            rotation: Matrix3::from_axis_angle(axis.normalize(), angle),
            ..Self::identity()
        }
    }

    /// a rotation about an axis through `center`
    #[inline]
    pub fn rotate_about(center: Point3, axis: Vector3, angle: Rad<f64>) -> Self {
        let rot = Self::rotate(axis, angle);
        let c = center.to_vec();
        Self {
            translation: c - rot.rotation * c,
            ..rot
        }
    }

    /// the uniform scale factor
    #[inline(always)]
    pub fn scale_factor(&self) -> f64 { self.scale }

    /// applies the transform to a point
    #[inline(always)]
    pub fn transform_point(&self, p: Point3) -> Point3 {
        Point3::from_vec(self.rotation * (p.to_vec() * self.scale) + self.translation)
    }

    /// applies the transform to a displacement vector
    #[inline(always)]
    pub fn transform_vector(&self, v: Vector3) -> Vector3 { self.rotation * (v * self.scale) }

    /// rotates a unit direction; the scale does not apply
    #[inline(always)]
    pub fn transform_unit(&self, v: Vector3) -> Vector3 { self.rotation * v }

    /// the inverse transform
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.transpose();
        let inv_scale = 1.0 / self.scale;
        Self {
            rotation: inv_rot,
            translation: inv_rot * -self.translation * inv_scale,
            scale: inv_scale,
        }
    }

    /// composition: `self` applied after `other`
    pub fn concat(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * (other.translation * self.scale) + self.translation,
            scale: self.scale * other.scale,
        }
    }
}

/// Geometry movable by a similarity transform.
pub trait Transformed {
    /// transforms in place
    fn transform_by(&mut self, trans: &Transform3);
    /// returns the transformed copy
    fn transformed(&self, trans: &Transform3) -> Self
    where
        Self: Clone,
    {
        let mut output = self.clone();
        output.transform_by(trans);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use std::f64::consts::PI;

    #[test]
    fn round_trip() {
        let t = Transform3::rotate_about(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(1.0, 1.0, 0.0),
            Rad(PI / 3.0),
        )
        .concat(&Transform3::scale(2.5))
        .concat(&Transform3::translate(Vector3::new(-1.0, 4.0, 0.5)));
        let p = Point3::new(0.25, -0.75, 2.0);
        assert_near!(t.inverse().transform_point(t.transform_point(p)), p);
        assert_near!(t.concat(&t.inverse()).transform_point(p), p);
    }

    #[test]
    fn unit_vectors_stay_unit() {
        let t = Transform3::rotate(Vector3::new(0.0, 0.0, 1.0), Rad(0.7))
            .concat(&Transform3::scale(3.0));
        let v = Vector3::new(1.0, 0.0, 0.0);
        assert_near!(t.transform_unit(v).magnitude(), 1.0);
        assert_near!(t.transform_vector(v).magnitude(), 3.0);
    }
}

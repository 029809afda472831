use crate::errors::{Error, Result};
use lathe_base::prelude::*;
use lathe_base::solvers::solve_dense;
use lathe_geometry::curves::NubCurve;
use lathe_geometry::knot::KnotVec;

/// chord-length parameters over the interpolation points, normalized to
/// `[0, 1]`
fn chord_parameters(points: &[Point3]) -> Vec<f64> {
    let lengths = lathe_base::segment::find_lengths(points);
    let total = *lengths.last().expect("at least one point");
    match total.so_small() {
        true => (0..points.len())
            .map(|i| i as f64 / (points.len() - 1) as f64)
            .collect(),
        false => lengths.into_iter().map(|l| l / total).collect(),
    }
}

/// Interpolates a cubic B-spline curve through the points, with
/// chord-length parameters unless given.
pub fn create_nub_curve(points: &[Point3], params: Option<&[f64]>) -> Result<NubCurve> {
    if points.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "interpolation needs at least two points, got {}",
            points.len()
        )));
    }
    if points.len() == 2 {
        // a straight segment as a degree-one spline
        let knots = KnotVec::new(vec![0.0, 0.0, 1.0, 1.0]);
        return Ok(NubCurve::new(knots, points.to_vec())?);
    }
    let params = match params {
        Some(p) => p.to_vec(),
        None => chord_parameters(points),
    };
    let degree = usize::min(3, points.len() - 1);
    let knots = KnotVec::from_interpolation_params(&params, degree);
    let n = points.len();
    // the collocation system: basis functions at every parameter
    let mut rows = vec![vec![0.0; n]; n];
    for (i, &t) in params.iter().enumerate() {
        let span = knots.span(degree, n, t);
        let basis = knots.basis_functions(degree, span, t);
        for (j, &b) in basis.iter().enumerate() {
            rows[i][span - degree + j] = b;
        }
    }
    let rhs: Vec<Vector3> = points.iter().map(|p| p.to_vec()).collect();
    let controls = solve_dense(rows, rhs).ok_or_else(|| {
        Error::InsufficientData("interpolation points are degenerate".into())
    })?;
    let controls = controls.into_iter().map(Point3::from_vec).collect();
    Ok(NubCurve::new(knots, controls)?)
}

/// Interpolates a cubic B-spline through the points with prescribed end
/// tangent vectors.
pub fn create_nub_curve_with_end_vectors(
    points: &[Point3],
    start_vector: Vector3,
    end_vector: Vector3,
    params: Option<&[f64]>,
) -> Result<NubCurve> {
    if points.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "interpolation needs at least two points, got {}",
            points.len()
        )));
    }
    let params = match params {
        Some(p) => p.to_vec(),
        None => chord_parameters(points),
    };
    let degree = 3;
    let n = points.len() + 2;
    if n < degree + 1 {
        return Err(Error::InsufficientData(
            "not enough points for a cubic with end vectors".into(),
        ));
    }
    // knots from the parameters with two extra interior rows
    let mut padded = params.clone();
    padded.insert(1, params[0]);
    padded.insert(padded.len() - 1, *params.last().expect("non-empty"));
    let knots = KnotVec::from_interpolation_params(&padded, degree);
    let mut rows = vec![vec![0.0; n]; n];
    let mut rhs = vec![Vector3::zero(); n];
    // position rows
    for (i, &t) in params.iter().enumerate() {
        let row = if i == 0 { 0 } else { i + 1 };
        let span = knots.span(degree, n, t);
        let basis = knots.basis_functions(degree, span, t);
        for (j, &b) in basis.iter().enumerate() {
            rows[row][span - degree + j] = b;
        }
        rhs[row] = points[i].to_vec();
    }
    // derivative rows at the two ends
    for (row, t, vec) in [
        (1, params[0], start_vector),
        (n - 2, *params.last().expect("non-empty"), end_vector),
    ] {
        let span = knots.span(degree, n, t);
        let ders = knots.basis_ders(degree, span, t, 1);
        for (j, &d) in ders[1].iter().enumerate() {
            rows[row][span - degree + j] = d;
        }
        rhs[row] = vec;
    }
    let controls = solve_dense(rows, rhs).ok_or_else(|| {
        Error::InsufficientData("interpolation points are degenerate".into())
    })?;
    let controls = controls.into_iter().map(Point3::from_vec).collect();
    Ok(NubCurve::new(knots, controls)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_base::geom_traits::{BoundedCurve, ParametricCurve};

    /// the five-point spline interpolates and inverts
    #[test]
    fn interpolates_five_points() {
        let points = [
            Point3::new(-2.0, 0.5, 0.0),
            Point3::new(-1.0, 1.5, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.5, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        let curve = create_nub_curve(&points, None).unwrap();
        let curve: lathe_geometry::curves::Curve = curve.into();
        for p in points {
            let (_, close) = curve.inverse(p, None);
            assert!(close.distance(p) < 1.0e-6, "missed {p:?} by {}", close.distance(p));
        }
    }

    #[test]
    fn end_vectors_are_honored() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let start = Vector3::new(0.0, 4.0, 0.0);
        let end = Vector3::new(0.0, -4.0, 0.0);
        let curve = create_nub_curve_with_end_vectors(&points, start, end, None).unwrap();
        for (p, i) in points.iter().zip([0.0, 0.5, 1.0]) {
            let t = curve.parameter_range().mid_point(i);
            assert!(curve.subs(t).distance(*p) < 1.0e-6);
        }
        let d0 = curve.der(curve.parameter_range().min);
        assert_near!(d0.normalize(), start.normalize());
    }

    #[test]
    fn two_points_make_a_segment() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let curve = create_nub_curve(&points, None).unwrap();
        assert_near!(curve.subs(0.5), Point3::new(1.0, 0.0, 0.0));
    }
}

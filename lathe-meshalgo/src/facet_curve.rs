use crate::options::FacetOptions;
use lathe_base::prelude::*;
use lathe_geometry::curves::Curve;
use std::collections::VecDeque;

/// Facets a curve over `domain` into parameters and points satisfying the
/// angle, chord-height, and max-length tolerances.
pub fn facet_curve(
    curve: &Curve,
    domain: Interval1D,
    options: &FacetOptions,
) -> (Vec<f64>, Vec<Point3>) {
    match curve {
        Curve::Line(_) | Curve::PointCurve(_) => {
            let params = vec![domain.min, domain.max];
            let points = params.iter().map(|&t| curve.subs(t)).collect();
            (params, points)
        }
        Curve::Circle(circle) => {
            facet_arc(curve, circle.radius(), domain, options)
        }
        _ => facet_general(curve, domain, options),
    }
}

/// equi-angular sampling for circular arcs
fn facet_arc(
    curve: &Curve,
    radius: f64,
    domain: Interval1D,
    options: &FacetOptions,
) -> (Vec<f64>, Vec<Point3>) {
    let length = domain.length();
    let mut angle = options.edge_angle_tol;
    if let Some(max_length) = options.max_length {
        // facet length is about radius * angle
        angle = f64::min(angle, max_length / radius);
    }
    if let Some(chord_height) = options.chord_height {
        // chord angle = 2 acos(1 - h / r)
        if chord_height < radius {
            angle = f64::min(angle, 2.0 * f64::acos(1.0 - chord_height / radius));
        }
    }
    let mut n = (1.0000001 + length / angle) as usize;
    n = n.clamp(3, options.max_facets.max(3));
    let mut params = Vec::with_capacity(n);
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let t = domain.mid_point(i as f64 / (n - 1) as f64);
        params.push(t);
        points.push(curve.subs(t));
    }
    (params, points)
}

/// Recursive chord bisection: a segment is split at its midpoint while any
/// of three interior probes turns away from the chord by more than the
/// angle tolerance. The minimum span is the domain length times the fit
/// fraction.
fn facet_general(
    curve: &Curve,
    domain: Interval1D,
    options: &FacetOptions,
) -> (Vec<f64>, Vec<Point3>) {
    let mut nodes: VecDeque<(f64, Point3)> = VecDeque::new();
    nodes.push_back((domain.min, curve.subs(domain.min)));
    if curve.is_closed() {
        let mid = domain.mid_point(0.5);
        nodes.push_back((mid, curve.subs(mid)));
    }
    nodes.push_back((domain.max, curve.subs(domain.max)));
    let min_length = domain.length() * FIT;
    let cos_flat = f64::cos(std::f64::consts::PI - options.edge_angle_tol);

    let mut out: Vec<(f64, Point3)> = Vec::new();
    let mut stack: Vec<(f64, Point3, f64, Point3)> = Vec::new();
    let mut iter = nodes.into_iter();
    let mut prev = iter.next().unwrap();
    out.push(prev);
    for next in iter {
        stack.push((prev.0, prev.1, next.0, next.1));
        // refine this span depth-first, emitting in order
        while let Some((t0, p0, t1, p1)) = stack.pop() {
            let ta = t0 * 0.65433 + t1 * 0.34567;
            let tb = (t0 + t1) * 0.5;
            let tc = t0 * 0.34567 + t1 * 0.65433;
            let (pa, pb, pc) = (curve.subs(ta), curve.subs(tb), curve.subs(tc));
            let turn = |probe: Point3| -> f64 {
                let v0 = p0 - probe;
                let v1 = p1 - probe;
                if v0.magnitude().so_small() || v1.magnitude().so_small() {
                    return -1.0;
                }
                v0.normalize().dot(v1.normalize())
            };
            let needs_split = min_length < (tc - ta)
                && (cos_flat < turn(pa) || cos_flat < turn(pb) || cos_flat < turn(pc))
                && out.len() + stack.len() < options.max_facets;
            if needs_split {
                stack.push((tb, pb, t1, p1));
                stack.push((t0, p0, tb, pb));
            } else {
                out.push((t1, p1));
            }
        }
        prev = next;
    }
    out.into_iter().unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_geometry::curves::{Circle, Line, NubCurve};
    use lathe_geometry::knot::KnotVec;
    use std::f64::consts::PI;

    #[test]
    fn line_gets_two_points() {
        let line: Curve =
            Line::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)).into();
        let (params, points) = facet_curve(&line, line.domain(), &FacetOptions::default());
        assert_eq!(params.len(), 2);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn circle_meets_angle_tolerance() {
        let circle: Curve =
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let options = FacetOptions::default();
        let (params, points) = facet_curve(&circle, circle.domain(), &options);
        assert!(points.len() >= 3);
        for w in params.windows(2) {
            assert!(w[1] - w[0] <= options.edge_angle_tol * 1.01);
        }
        // first and last sample close the circle
        assert!(points[0].distance(points[points.len() - 1]) < 1.0e-9);
    }

    #[test]
    fn spline_is_refined_where_it_bends() {
        let curve: Curve = NubCurve::new(
            KnotVec::clamped_uniform(5, 3),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 3.0, 0.0),
                Point3::new(2.0, -3.0, 0.0),
                Point3::new(3.0, 3.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
        )
        .unwrap()
        .into();
        let options = FacetOptions::default();
        let (params, points) = facet_curve(&curve, curve.domain(), &options);
        assert!(points.len() > 8, "only {} points", points.len());
        // parameters strictly increase
        for w in params.windows(2) {
            assert!(w[1] > w[0]);
        }
        // every chord midpoint stays near the curve
        for w in params.windows(2) {
            let mid_t = (w[0] + w[1]) * 0.5;
            let chord_mid = curve.subs(w[0]).midpoint(curve.subs(w[1]));
            let d = chord_mid.distance(curve.subs(mid_t));
            assert!(d < 0.1, "chord deviation {d}");
        }
    }
}

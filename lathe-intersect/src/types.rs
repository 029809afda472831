use lathe_base::prelude::*;

/// how two operands meet at an intersection point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntersectionKind {
    /// a transversal crossing
    Point,
    /// the operands touch without crossing
    Tangent,
    /// the operands agree along a segment
    Coincident,
}

/// one intersection hit
pub type Hit = (Point3, IntersectionKind);

/// An optional interrupt flag checked by the long-running intersectors
/// between outer iterations.
pub type InterruptFlag<'a> = Option<&'a dyn Fn() -> bool>;

/// Sorts hits by signed distance along the axis and collapses pairs closer
/// than `tol`; a collapsed pair keeps the stronger classification. The
/// canonical output order of every hit list.
pub fn order_and_dedup(origin: Point3, axis: Vector3, mut hits: Vec<Hit>, tol: f64) -> Vec<Hit> {
    let dist = |p: Point3| (p - origin).dot(axis);
    hits.sort_by(|a, b| dist(a.0).partial_cmp(&dist(b.0)).unwrap());
    let mut out: Vec<Hit> = Vec::with_capacity(hits.len());
    for hit in hits {
        match out.last_mut() {
            Some(last) if last.0.distance(hit.0) <= tol => {
                // two equal roots are a tangency; coincidence wins outright
                if hit.1 == IntersectionKind::Coincident {
                    last.1 = IntersectionKind::Coincident;
                } else if last.1 == IntersectionKind::Point && hit.1 == IntersectionKind::Tangent {
                    last.1 = IntersectionKind::Tangent;
                }
            }
            _ => out.push(hit),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_collapsed() {
        let origin = Point3::new(0.0, 0.0, 0.0);
        let axis = Vector3::new(1.0, 0.0, 0.0);
        let hits = vec![
            (Point3::new(3.0, 0.0, 0.0), IntersectionKind::Point),
            (Point3::new(1.0, 0.0, 0.0), IntersectionKind::Point),
            (Point3::new(1.0 + 1.0e-8, 0.0, 0.0), IntersectionKind::Tangent),
        ];
        let out = order_and_dedup(origin, axis, hits, 1.0e-6);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].1, IntersectionKind::Tangent);
        assert!(out[0].0.x < out[1].0.x);
    }
}

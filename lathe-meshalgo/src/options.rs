/// 10 degrees
pub(crate) const FACET_FACE_ANGLE_TOLERANCE: f64 = 0.17453292519943295;
/// 5 degrees
pub(crate) const FACET_EDGE_ANGLE_TOLERANCE: f64 = 0.08726646259971647;

/// Controls for edge and face facetting.
#[derive(Clone, Debug)]
pub struct FacetOptions {
    /// largest normal turn across a face triangle edge
    pub face_angle_tol: f64,
    /// largest tangent turn across an edge facet
    pub edge_angle_tol: f64,
    /// optional cap on facet length
    pub max_length: Option<f64>,
    /// optional cap on the chord height of a facet
    pub chord_height: Option<f64>,
    /// hard cap on the number of facets of one curve or face
    pub max_facets: usize,
    /// parameter-space work only: no curvature-driven refinement
    pub parametric: bool,
    /// cancellation flag checked between the outer facetting stages
    pub interrupt: Option<fn() -> bool>,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            face_angle_tol: FACET_FACE_ANGLE_TOLERANCE,
            edge_angle_tol: FACET_EDGE_ANGLE_TOLERANCE,
            max_length: None,
            chord_height: None,
            max_facets: 10_000,
            parametric: false,
            interrupt: None,
        }
    }
}

impl FacetOptions {
    /// whether the caller has asked the facetor to stop
    #[inline]
    pub(crate) fn interrupted(&self) -> bool {
        self.interrupt.map(|check| check()).unwrap_or(false)
    }
}

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::point::Point;

/// Curves are polyline-sampled at this resolution, never drawn analytically.
pub const CURVE_SEGMENTS: usize = 100;
/// Floor for editing: deleting below this count is refused.
pub const MIN_CURVE_POINTS: usize = 2;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Quadratic,
    Cubic,
    Polyline,
}

impl CurveKind {
    /// The nominal control-point count for the kind. A mismatch is a soft
    /// hint, not a save blocker; fewer points degrade to a lower-order curve.
    pub fn ideal_point_count(self) -> Option<usize> {
        match self {
            CurveKind::Quadratic => Some(3),
            CurveKind::Cubic => Some(4),
            CurveKind::Polyline => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CurveKind::Quadratic => "quadratic",
            CurveKind::Cubic => "cubic",
            CurveKind::Polyline => "polyline",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Curve {
    pub id: String,
    pub kind: CurveKind,
    pub name: String,
    pub points: Vec<Point>,
    pub color: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub preview_parameter: Option<f64>,
}

/// Evaluates the curve position at `t` by level-by-level linear
/// interpolation of adjacent control points until one point remains.
/// Iterative rendition of the recursive De Casteljau scheme.
pub fn de_casteljau(points: &[Point], t: f64) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let mut level = points.to_vec();
    while level.len() > 1 {
        level = level
            .windows(2)
            .map(|pair| pair[0].lerp(pair[1], t))
            .collect();
    }
    Some(level[0])
}

/// Every intermediate interpolation level at `t`, outermost first: for `n`
/// control points the result holds levels of `n-1`, `n-2`, ... 1 points.
/// Feeds the pedagogical construction-line overlay.
pub fn construction_levels(points: &[Point], t: f64) -> Vec<Vec<Point>> {
    let mut levels = Vec::new();
    let mut current = points.to_vec();
    while current.len() > 1 {
        current = current
            .windows(2)
            .map(|pair| pair[0].lerp(pair[1], t))
            .collect();
        levels.push(current.clone());
    }
    levels
}

/// Samples the evaluator at `segments + 1` evenly spaced parameters.
pub fn sample(points: &[Point], segments: usize) -> Vec<Point> {
    if points.len() < 2 || segments == 0 {
        return points.to_vec();
    }
    (0..=segments)
        .filter_map(|index| de_casteljau(points, index as f64 / segments as f64))
        .collect()
}

pub fn validate_commit(curve: &Curve) -> Result<(), EngineError> {
    if curve.name.trim().is_empty() {
        return Err(EngineError::EmptyName);
    }
    if curve.points.len() < MIN_CURVE_POINTS {
        return Err(EngineError::TooFewPoints);
    }
    if curve.points.iter().any(|point| !point.is_finite()) {
        return Err(EngineError::NonFinitePoint);
    }
    Ok(())
}

pub fn point_count_hint(curve: &Curve) -> Option<String> {
    let ideal = curve.kind.ideal_point_count()?;
    if curve.points.len() == ideal {
        return None;
    }
    Some(format!(
        "a {} curve ideally has {} control points, this one has {}",
        curve.kind.label(),
        ideal,
        curve.points.len()
    ))
}

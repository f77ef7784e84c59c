//! Polygon queries over terrain footprints: containment, crossings, spans

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Intersects, Line, LineString, Polygon};

use crate::core::types::Position;

/// Problems with a footprint polygon
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonIssue {
    InsufficientVertices { count: usize, minimum: usize },
    SelfIntersecting,
    NonFiniteVertex { index: usize },
}

/// Build a closed geo polygon from footprint vertices
pub fn to_polygon(vertices: &[Position]) -> Polygon<f64> {
    let mut coords: Vec<Coord<f64>> = vertices.iter().map(|&p| p.into()).collect();
    if let Some(first) = coords.first().cloned() {
        coords.push(first);
    }
    Polygon::new(LineString::from(coords), vec![])
}

/// Check a footprint for the problems that would break crossing maths
pub fn validate_polygon(vertices: &[Position]) -> Vec<PolygonIssue> {
    let mut issues = Vec::new();

    if vertices.len() < 3 {
        issues.push(PolygonIssue::InsufficientVertices {
            count: vertices.len(),
            minimum: 3,
        });
        return issues;
    }

    for (index, vertex) in vertices.iter().enumerate() {
        if !vertex.is_finite() {
            issues.push(PolygonIssue::NonFiniteVertex { index });
        }
    }
    if !issues.is_empty() {
        return issues;
    }

    if is_self_intersecting(vertices) {
        issues.push(PolygonIssue::SelfIntersecting);
    }

    issues
}

/// Check if polygon edges cross each other (excluding adjacent edges)
fn is_self_intersecting(vertices: &[Position]) -> bool {
    let n = vertices.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let a1 = vertices[i];
        let a2 = vertices[(i + 1) % n];

        for j in (i + 2)..n {
            if j == (i + n - 1) % n {
                continue;
            }
            let b1 = vertices[j];
            let b2 = vertices[(j + 1) % n];

            if segments_cross(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Proper crossing of two segments (touching does not count)
fn segments_cross(a1: Position, a2: Position, b1: Position, b2: Position) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn cross(a: Position, b: Position, c: Position) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Point inside or on the boundary
pub fn contains_point(polygon: &Polygon<f64>, point: Position) -> bool {
    let p: geo::Point<f64> = point.into();
    polygon.intersects(&p)
}

/// Segment touches or passes through the polygon
pub fn segment_intersects(polygon: &Polygon<f64>, from: Position, to: Position) -> bool {
    if from.distance(&to) < 1e-12 {
        return contains_point(polygon, from);
    }
    let line = Line::new(Coord::from(from), Coord::from(to));
    line.intersects(polygon)
}

/// Parameters in [0, 1] where the segment meets the polygon boundary, sorted
fn boundary_parameters(polygon: &Polygon<f64>, from: Position, to: Position) -> Vec<f64> {
    let segment = Line::new(Coord::from(from), Coord::from(to));
    let length = from.distance(&to);
    let param_of = |c: Coord<f64>| -> f64 {
        if length < 1e-12 {
            0.0
        } else {
            (Position::from(c).distance(&from) / length).clamp(0.0, 1.0)
        }
    };

    let mut params = vec![0.0, 1.0];
    for edge in polygon.exterior().lines() {
        match line_intersection(segment, edge) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => {
                params.push(param_of(intersection));
            }
            Some(LineIntersection::Collinear { intersection }) => {
                params.push(param_of(intersection.start));
                params.push(param_of(intersection.end));
            }
            None => {}
        }
    }
    params.sort_by(|a, b| a.total_cmp(b));
    params.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    params
}

/// Stretches of the segment inside the polygon as `(t0, t1)` parameters.
///
/// A concave footprint can yield several stretches for one segment.
/// Touching pieces are merged and zero-length contacts are dropped.
pub fn inside_intervals(polygon: &Polygon<f64>, from: Position, to: Position) -> Vec<(f64, f64)> {
    if from.distance(&to) < 1e-12 {
        return Vec::new();
    }
    let params = boundary_parameters(polygon, from, to);
    let mut intervals: Vec<(f64, f64)> = Vec::new();
    for pair in params.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        if t1 - t0 < 1e-12 {
            continue;
        }
        let mid = from + (to - from) * ((t0 + t1) / 2.0);
        if !contains_point(polygon, mid) {
            continue;
        }
        match intervals.last_mut() {
            Some(last) if (t0 - last.1).abs() < 1e-12 => last.1 = t1,
            _ => intervals.push((t0, t1)),
        }
    }
    intervals
}

/// Length of the segment that lies inside the polygon
pub fn span_inside(polygon: &Polygon<f64>, from: Position, to: Position) -> f64 {
    let length = from.distance(&to);
    inside_intervals(polygon, from, to)
        .iter()
        .map(|(t0, t1)| (t1 - t0) * length)
        .sum()
}

//! Geometry kernel: base measurement and polygon queries

pub mod measure;
pub mod polygon;

pub use measure::{
    contact_point, edge_distance, edge_distance_at, in_base_contact, in_base_contact_at,
    overlaps_at, radius_towards, unit_edge_distance, units_within_engagement,
    within_engagement_range, within_engagement_range_at,
};
pub use polygon::{
    contains_point, inside_intervals, segment_intersects, span_inside, to_polygon, validate_polygon,
    PolygonIssue,
};

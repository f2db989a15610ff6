pub mod aabb;
pub mod regions;

pub use aabb::BoundingBox;
pub use regions::{
    connected_components, detect_regions, detect_regions_in, filter_min_area, select_largest,
    Region, RegionDetector,
};

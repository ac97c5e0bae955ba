pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod polygon;
pub mod progress;

pub use constants::*;
pub use coordinates::{coordinate_key, distance_km, parse_coordinate, parse_point};
pub use filename::generate_default_export_filename;
pub use polygon::{format_multipolygon, parse_multipolygon};
pub use progress::ProgressReporter;

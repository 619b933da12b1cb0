// ! Spreadsheet source parsing, classification and reshaping

pub mod classifier;
pub mod consistency;
pub mod geo;
pub mod header;
pub mod map_reference;
pub mod rainfall;
pub mod sanitizer;
pub mod schema;
pub mod source;

// Re-export commonly used items
pub use classifier::{classify, SourceKind};
pub use geo::{parse_latlong, GeoPoint};
pub use map_reference::{MapReference, MapReferenceBuilder};
pub use rainfall::{ObservationRecord, RainfallReshaper};
pub use sanitizer::{clean_numeric, sanitize_value, StatusData};
pub use source::RawSource;

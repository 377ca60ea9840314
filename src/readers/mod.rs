pub mod geotiff;
pub mod types;
pub mod utils;

pub use geotiff::GeoTiffReader;
pub use types::{GridDescriptor, MaskedBand};
pub use utils::{is_geotiff, list_geotiffs};

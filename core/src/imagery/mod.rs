pub mod archive;
pub mod export;
pub mod feature;
pub mod raster;
pub mod series;

pub use archive::ArchiveProvider;
pub use export::{ExportReceipt, ExportTask};
pub use feature::{Feature, FeatureCollection, FeatureQuery};
pub use raster::{GridSpec, Raster};
pub use series::{CollectionQuery, ImageSeries, SourceImage};

#[cfg(test)]
pub(crate) mod testing;

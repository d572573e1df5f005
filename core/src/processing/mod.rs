pub mod composite;
pub mod reduce;

pub use composite::{AnnualComposite, AnnualCompositeBuilder, CompositeSet};
pub use reduce::SeriesPoint;

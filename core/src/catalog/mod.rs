pub mod cache;
pub mod identity;
pub mod known;
pub mod object;
pub mod style;
pub mod visibility;

pub use cache::{ObjectCache, ReconcileSummary};
pub use known::{CatalogEntry, ObjectCatalog};
pub use object::{AltitudeBin, ObjectKind, Origin, TrackedObject};
pub use style::{ObjectStyle, Rgb};
pub use visibility::{FilterCriteria, VisibilityCounts, VisibilityFilterEngine};

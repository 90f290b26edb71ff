//! Catalog loading, snapshots, and auditing
//! Rows are derived once per load; scorers only ever read a snapshot.

pub mod audit;
pub mod loader;
pub mod row;
pub mod snapshot;

pub use loader::Dataset;
pub use row::{CatalogKind, CatalogRow};
pub use snapshot::{CatalogSnapshot, CatalogSource, CatalogStore};

//! Catalog access, duration resolution and album import

pub mod album_import;
pub mod catalog;
pub mod discogs_client;
pub mod duration;
pub mod duration_reconciler;

pub use catalog::{Catalog, CatalogError};
pub use discogs_client::DiscogsClient;
pub use duration_reconciler::{DurationReconciler, ReconcileReport, ReconcilerConfig};

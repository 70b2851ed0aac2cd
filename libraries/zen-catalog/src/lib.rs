//! Desert Zen - Catalog
//!
//! The meditation library as the browse screens see it: categories and
//! meditations fetched from the backend, reshaped for display, and the
//! queries the home, discover and favorites screens run over them.

mod browse;
mod error;
mod loader;

pub use browse::{greeting, Catalog, DiscoverFilter, TimeOfDay};
pub use error::{CatalogError, Result, DEFAULT_LOAD_ERROR};
pub use loader::{category_from_row, meditation_from_row, CatalogLoader, CatalogSnapshot};

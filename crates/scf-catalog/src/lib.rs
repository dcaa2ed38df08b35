//! SCF Catalog - paginated loader for the public SCF catalogs
//!
//! Fetches the six read-only catalogs the configurator works from:
//! - Controls (`/public/frameworks/scf`)
//! - Framework mappings (`/maps`)
//! - Risks and threats (`/risks`, `/threats`)
//! - Assessment objectives and evidence requests
//!
//! Pages arrive as a `{items, total, pages, limit, offset}` envelope or as a
//! bare array. Page bodies are cached by URL. A failed catalog never blocks
//! the others.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod page;
pub mod query;
pub mod source;

pub use cache::PageCache;
pub use config::{CatalogConfig, MAX_PAGE_LIMIT};
pub use error::{CatalogError, Result};
pub use loader::{CatalogLoader, LoadReport};
pub use page::{Page, PageBody};
pub use query::{CatalogKind, CatalogQuery};
pub use source::{CatalogSource, HttpSource};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for loading catalogs
    pub use crate::{
        CatalogConfig, CatalogError, CatalogKind, CatalogLoader, CatalogQuery, CatalogSource,
        HttpSource, LoadReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

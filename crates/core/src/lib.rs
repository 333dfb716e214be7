#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod pagination;
pub mod query;
pub mod time;

pub use catalog::{Catalog, CatalogStats, CountMismatch};
pub use pagination::{PageLink, Pagination};
pub use query::{FilterCriteria, FilterField, SearchQuery, StatusFilter};
pub use time::Clock;

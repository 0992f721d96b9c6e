//! In-memory indexed object cache with a filter/order/page query engine for console resources.
//!
//! ```no_run
//! use consolecache::{IndexConfig, QueryRequest, create_object_cache, execute};
//!
//! let store = create_object_cache(&IndexConfig::default())?;
//! let page = execute(&store, &QueryRequest {
//!     index: "id".into(),
//!     prefix: "Address/".into(),
//!     filter: Some("`$.spec.type` = 'queue'".into()),
//!     key_paths: vec!["$.metadata.namespace".into(), "$.metadata.name".into()],
//!     order_by: Some("`$.metadata.name` DESC".into()),
//!     offset: None,
//!     first: Some(10),
//! }, None)?;
//! println!("{} of {}", page.items.len(), page.total);
//! # Ok::<(), consolecache::CacheError>(())
//! ```

pub mod access;
pub mod config;
pub mod errors;
pub mod field;
pub mod filter;
pub mod logger;
pub mod order;
pub mod page;
pub mod query;
pub mod resource;
pub mod store;

pub use access::{AccessState, Authorizer, CachingAccessController, ResourceAttributes};
pub use config::{CacheConfig, IndexConfig, QueryLimits};
pub use errors::CacheError;
pub use field::{FieldPath, FieldSource, Node};
pub use filter::{Expression, Truth, parse_filter_expression, parse_filter_expression_with};
pub use order::{Direction, Orderer, build_orderer, build_orderer_with};
pub use page::{calc_lower_upper, page};
pub use query::{BuiltFilter, Page, QueryRequest, build_filter, execute, execute_with};
pub use resource::{Resource, create_object_cache};
pub use store::{And, IndexSpec, IndexedStore, Predicate};

/// Initializes logging from `log4rs.yaml` when it exists, otherwise from the `CONSOLECACHE_LOG_*` environment.
///
/// # Errors
/// Returns an error for a malformed `log4rs.yaml` or if the log directory cannot be created.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new("log4rs.yaml").exists() {
        logger::init()
    } else {
        logger::configure_from_env()
    }
}

//! Conditional caching for upstream GET requests.
//!
//! This module is catalog-agnostic:
//! - Stores the last full response per canonical request target
//! - Revalidates with the server using the stored ETag
//! - Reuses the cached value on 304, replaces it on a fresh body

mod layer;
mod storage;
mod traits;

pub use layer::FetchPipeline;
pub use storage::Storage;
pub use traits::{Cacheable, RawResponse, Transport};

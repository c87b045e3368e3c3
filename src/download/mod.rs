//! Upstream release discovery, downloads and archive extraction
//!
//! ## Module Organization
//!
//! - `releases` - Release-metadata query and latest-tag selection
//! - `fetch` - HTTP transport and gitiles URL shapes
//! - `extract` - `.tar.gz` unpacking into staging directories

mod extract;
mod fetch;
mod releases;

pub use extract::extract_tar_gz;
pub use fetch::{Fetch, HttpFetcher, RemoteSource};
pub use releases::{ReleaseInfo, parse_releases, resolve_latest, select_latest};

#[cfg(test)]
pub(crate) use extract::testing::tar_gz;
#[cfg(test)]
pub(crate) use fetch::testing::MapFetcher;

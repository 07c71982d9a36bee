//! Shared helper functions for CLI commands

use miette::Result;

use crate::core::resolve;
use crate::core::{HttpTransport, ReferenceCache, Settings};

/// Open the cache and make sure an API key is stored
///
/// Every command except `init` and `completions` goes through here.
pub fn open_authenticated(settings: &Settings) -> Result<ReferenceCache> {
    let cache = ReferenceCache::open(settings)?;
    resolve::api_key(cache.document())?;
    Ok(cache)
}

/// Build a transport using the cached API key
pub fn connect(settings: &Settings, cache: &ReferenceCache) -> Result<HttpTransport> {
    let api_key = resolve::api_key(cache.document())?;
    Ok(HttpTransport::new(settings, api_key))
}

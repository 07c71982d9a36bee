//! Core module - reference cache, transport and issue operations

pub mod cache;
pub mod config;
pub mod issue;
pub mod queries;
pub mod resolve;
pub mod transport;

pub use cache::{CacheDocument, Category, ReferenceCache, StoreError, SyncError, SyncReport, SyncScope, Synchronizer};
pub use config::Settings;
pub use issue::{IssueDraft, IssueError, IssueRef};
pub use resolve::ResolveError;
pub use transport::{GraphqlRequest, HttpTransport, Transport, TransportError};

//! Page fetching layer

mod dynamo;
mod replay;

use crate::error::FetchError;
use crate::model::{ContinuationToken, QuerySpec, RawItem};

pub use self::dynamo::{DynamoFetcher, Operation, Transport};
pub use self::replay::ReplayTransport;

/// One page as returned by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<RawItem>,
    /// `None` means the scan or query is exhausted
    pub next_token: Option<ContinuationToken>,
}

impl Page {
    pub fn new(items: Vec<RawItem>, next_token: Option<ContinuationToken>) -> Self {
        Self { items, next_token }
    }

    /// Final page with no continuation
    pub fn last(items: Vec<RawItem>) -> Self {
        Self::new(items, None)
    }
}

/// Trait for issuing one page request.
///
/// Implementations perform exactly one round trip per call and never retry;
/// a failure returns no partial items.
pub trait PageFetcher: Send {
    fn fetch_page(
        &mut self,
        spec: &QuerySpec,
        token: Option<&ContinuationToken>,
    ) -> Result<Page, FetchError>;
}

use std::sync::Arc;

use smol_str::SmolStr;

use crate::error::Location;
use crate::value::ValueMap;

/// One fully resolved request out of a payload. The document is always
/// present: either freshly compiled, or shared with the cache.
#[derive(Debug, Clone)]
pub struct RequestResult<D> {
    pub operation_name: Option<String>,
    pub named_query: Option<SmolStr>,
    pub document: Arc<D>,
    pub variables: Option<ValueMap>,
    pub extensions: Option<ValueMap>,
}

/// Envelope fields accumulated while scanning, before the query is resolved.
/// The query span borrows from the input buffer and never outlives the parse.
#[derive(Default)]
pub(crate) struct RawRequest<'a> {
    pub operation_name: Option<String>,
    pub named_query: Option<SmolStr>,
    pub query: &'a [u8],
    pub query_location: Option<Location>,
    pub variables: Option<ValueMap>,
    pub extensions: Option<ValueMap>,
    seen: u8,
}

/// Bit per recognized envelope field, for duplicate detection. A field
/// counts as seen even when its value was the `null` keyword.
pub(crate) mod field {
    pub const OPERATION_NAME: u8 = 1 << 0;
    pub const NAMED_QUERY: u8 = 1 << 1;
    pub const QUERY: u8 = 1 << 2;
    pub const VARIABLES: u8 = 1 << 3;
    pub const EXTENSIONS: u8 = 1 << 4;
}

impl<'a> RawRequest<'a> {
    pub fn mark_seen(&mut self, bit: u8) -> bool {
        let duplicate = self.seen & bit != 0;
        self.seen |= bit;
        !duplicate
    }
}

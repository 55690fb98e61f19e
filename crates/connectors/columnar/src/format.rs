//! The seam between the connector and the external table-format library.
//!
//! Split discovery, predicate pushdown and columnar decoding all live behind
//! these traits; the connector only plans groups, iterates them and projects
//! the decoded records.

use std::collections::HashMap;

use floe_common::{Result, Row};
use sqlparser::ast::Expr;
use uuid::Uuid;

/// Opaque handle to an independently readable chunk of a table.
///
/// Produced by the format library's planner; immutable once created. For a
/// file-based store this is a file plus a row range.
#[derive(Debug, Clone)]
pub struct TableSplit {
    pub ordinal: usize,
    pub uri: String,
    /// Byte range within `uri`, if the format reads sub-file ranges.
    pub byte_range: Option<(u64, u64)>,
    pub metadata: HashMap<String, String>,
}

impl TableSplit {
    pub fn new(ordinal: usize, uri: impl Into<String>) -> Self {
        Self {
            ordinal,
            uri: uri.into(),
            byte_range: None,
            metadata: HashMap::new(),
        }
    }
}

/// An ordered run of splits assigned to one parallel worker.
///
/// Built once by the planner and exclusively owned by its worker afterwards.
#[derive(Debug, Clone)]
pub struct SplitGroup {
    pub index: usize,
    pub splits: Vec<TableSplit>,
}

/// Everything the format library needs to scan one table: identifiers, the
/// pushdown projection (non-empty declared column names, in declared order),
/// an optional compiled filter and pass-through storage options.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub database: String,
    pub table: String,
    pub path: String,
    pub columns: Vec<String>,
    pub filter: Option<Expr>,
    pub options: HashMap<String, String>,
}

/// Identity of one reader's attempt over a split group, carried into decoder
/// opens and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadAttempt {
    pub id: Uuid,
}

impl ReadAttempt {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for ReadAttempt {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes one split's raw storage bytes into typed records.
pub trait RecordDecoder: Send {
    /// Names of the decoded columns, in decoded order.
    fn columns(&self) -> &[String];

    /// Pulls the next record, or `None` once the split is exhausted.
    fn next_record(&mut self) -> Result<Option<Row>>;

    /// Releases the decoder's resources. Must be idempotent.
    fn close(&mut self) -> Result<()>;
}

/// The external table-format library.
///
/// All configuration of the library flows through this documented seam; the
/// connector never reaches into its internals.
pub trait TableFormat: Send + Sync {
    /// Discovers the splits covering the table described by `scan`.
    fn list_splits(&self, scan: &ScanRequest) -> Result<Vec<TableSplit>>;

    /// Opens a decoder over one split, honoring the scan's pushdown
    /// projection and filter.
    fn open_decoder(
        &self,
        split: &TableSplit,
        scan: &ScanRequest,
        attempt: ReadAttempt,
    ) -> Result<Box<dyn RecordDecoder>>;
}

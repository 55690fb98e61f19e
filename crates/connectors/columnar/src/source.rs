//! Host-facing lifecycle of the connector: configure, create split groups,
//! open a group, pull rows, close.

use std::fmt;
use std::sync::Arc;

use floe_common::{DataType, Error, Result, Row};
use tracing::info;

use crate::config::Settings;
use crate::filter::compile_filter;
use crate::format::{ScanRequest, SplitGroup, TableFormat};
use crate::planner::plan_groups;
use crate::projection::{BoundProjection, ColumnProjection};
use crate::reader::GroupReader;
use crate::registry::FormatRegistry;

/// A configured read of one table through one `TableFormat` implementation.
///
/// Construction is the configure step: the declared columns, literals and the
/// optional filter are validated here, so every configuration mistake
/// surfaces before any split is opened.
pub struct ColumnarSource {
    format: Arc<dyn TableFormat>,
    scan: Arc<ScanRequest>,
    projection: ColumnProjection,
    parallelism: usize,
}

impl ColumnarSource {
    /// Configures a source, resolving the format implementation by the
    /// `format` key in the settings.
    pub fn configure(settings: &Settings, registry: &FormatRegistry) -> Result<Self> {
        let format = registry.get(&settings.format)?;
        Self::with_format(settings, format)
    }

    pub fn with_format(settings: &Settings, format: Arc<dyn TableFormat>) -> Result<Self> {
        if settings.parallelism == 0 {
            return Err(Error::config("parallelism must be at least 1"));
        }
        let projection = ColumnProjection::from_specs(&settings.columns)?;
        if projection.is_empty() {
            return Err(Error::config("at least one output column must be declared"));
        }
        let filter = settings
            .filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(compile_filter)
            .transpose()?;

        let scan = ScanRequest {
            database: settings.database.clone(),
            table: settings.table.clone(),
            path: settings.path.clone(),
            columns: projection.source_columns(),
            filter,
            options: settings.storage.clone(),
        };
        info!(
            database = %scan.database,
            table = %scan.table,
            columns = scan.columns.len(),
            filtered = scan.filter.is_some(),
            "configured columnar source"
        );
        Ok(Self {
            format,
            scan: Arc::new(scan),
            projection,
            parallelism: settings.parallelism,
        })
    }

    pub fn scan(&self) -> &ScanRequest {
        &self.scan
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Output field names and types of every row this source produces.
    pub fn output_fields(&self) -> Vec<(String, DataType)> {
        self.projection.output_fields()
    }

    /// Asks the format library for splits and plans them into at most
    /// `desired` groups, one per parallel worker.
    pub fn create_splits(&self, desired: usize) -> Result<Vec<SplitGroup>> {
        let splits = self.format.list_splits(&self.scan)?;
        plan_groups(splits, desired)
    }

    /// Opens a pull reader over one group, binding the projection against the
    /// group's decoded schema.
    pub fn open(&self, group: SplitGroup) -> Result<SourceReader> {
        let reader = GroupReader::open(self.format.clone(), self.scan.clone(), group)?;
        // An empty group never produces a record, so binding against the
        // pushdown list (which trivially contains every source name) keeps
        // the reader well-formed without inventing a schema.
        let bound = match reader.decoded_columns() {
            Some(columns) => self.projection.bind(columns)?,
            None => self.projection.bind(&self.scan.columns)?,
        };
        Ok(SourceReader {
            reader,
            projection: bound,
        })
    }
}

// Derive is blocked by the `Arc<dyn TableFormat>` field.
impl fmt::Debug for ColumnarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnarSource")
            .field("scan", &self.scan)
            .field("projection", &self.projection)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

/// Pull-based reader handed to one parallel worker.
///
/// `next_row` is the hasNext/next loop collapsed into the `Option` idiom:
/// `Ok(Some(row))` until the group is exhausted, then `Ok(None)`.
pub struct SourceReader {
    reader: GroupReader,
    projection: BoundProjection,
}

// Derive is blocked by the trait objects inside `GroupReader`.
impl fmt::Debug for SourceReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceReader")
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}

impl SourceReader {
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        match self.reader.next_record()? {
            Some(raw) => Ok(Some(self.projection.project(&raw)?)),
            None => Ok(None),
        }
    }

    /// Width of every row this reader produces.
    pub fn output_width(&self) -> usize {
        self.projection.len()
    }

    /// Releases the underlying decoder. Idempotent; safe to call after a
    /// failed or interrupted read.
    pub fn close(&mut self) -> Result<()> {
        self.reader.close()
    }
}

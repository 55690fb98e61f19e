//! Columnar table-format connector for the Floe data engine.
//!
//! The connector delegates split discovery, predicate pushdown and columnar
//! decoding to an external table-format library behind the [`format`] seam.
//! Its own job is split planning ([`planner`]), sequential per-group reading
//! ([`reader`]) and projecting decoded records into the declared output row
//! shape ([`projection`]).

use arrow::record_batch::RecordBatch;
use floe_common::Result;
use futures::stream::BoxStream;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

pub mod batch;
pub mod config;
pub mod filter;
pub mod format;
pub mod planner;
pub mod projection;
pub mod reader;
pub mod registry;
pub mod source;

pub use config::{ColumnSpec, Settings};
pub use format::{ReadAttempt, RecordDecoder, ScanRequest, SplitGroup, TableFormat, TableSplit};
pub use projection::{BoundProjection, ColumnProjection, OutputColumn};
pub use reader::GroupReader;
pub use registry::FormatRegistry;
pub use source::{ColumnarSource, SourceReader};

/// Rows accumulated per emitted `RecordBatch`.
const BATCH_ROWS: usize = 1024;

/// The async seam the host engine drives: one split-group listing per scan,
/// then one record-batch stream per parallel worker.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Plans the table's splits into at most `desired` groups.
    async fn get_splits(&self, desired: usize) -> Result<Vec<SplitGroup>>;

    /// Reads one group as a stream of `RecordBatch`es.
    async fn read_group(&self, group: SplitGroup) -> Result<BoxStream<'static, Result<RecordBatch>>>;
}

#[async_trait::async_trait]
impl Connector for ColumnarSource {
    async fn get_splits(&self, desired: usize) -> Result<Vec<SplitGroup>> {
        self.create_splits(desired)
    }

    /// Drives a blocking [`SourceReader`] on the blocking pool and forwards
    /// fixed-size batches through a channel. Dropping the returned stream
    /// closes the channel; the blocking loop notices on its next send and
    /// stops, closing the reader on the way out.
    async fn read_group(
        &self,
        group: SplitGroup,
    ) -> Result<BoxStream<'static, Result<RecordBatch>>> {
        let mut reader = self.open(group)?;
        let fields = self.output_fields();
        let (tx, rx) = tokio::sync::mpsc::channel(10);

        tokio::task::spawn_blocking(move || {
            let mut rows = Vec::with_capacity(BATCH_ROWS);
            loop {
                match reader.next_row() {
                    Ok(Some(row)) => {
                        rows.push(row);
                        if rows.len() == BATCH_ROWS {
                            let out = batch::rows_to_batch(&fields, &rows);
                            rows.clear();
                            let stop = out.is_err();
                            if tx.blocking_send(out).is_err() || stop {
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        if !rows.is_empty() {
                            let _ = tx.blocking_send(batch::rows_to_batch(&fields, &rows));
                        }
                        break;
                    }
                    Err(e) => {
                        let _ = tx.blocking_send(Err(e));
                        break;
                    }
                }
            }
            if let Err(e) = reader.close() {
                warn!(error = %e, "failed to close group reader");
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

//! Sequential reading of one split group.
//!
//! A `GroupReader` walks the splits of its group in order, pulling raw
//! records from one decoder at a time. End-of-split is invisible to the
//! caller: the reader closes the finished decoder and opens the next split
//! until a record is produced or the whole group is exhausted.

use std::sync::Arc;

use floe_common::{Error, Result, Row};
use tracing::debug;

use crate::format::{ReadAttempt, RecordDecoder, ScanRequest, SplitGroup, TableFormat};

pub struct GroupReader {
    format: Arc<dyn TableFormat>,
    scan: Arc<ScanRequest>,
    group: SplitGroup,
    attempt: ReadAttempt,
    /// Currently open decoder; `None` once the group is exhausted or closed.
    decoder: Option<Box<dyn RecordDecoder>>,
    /// Index of the next split to open after the current decoder runs dry.
    next_split: usize,
    /// Decoded column names, captured from the first opened decoder.
    columns: Option<Vec<String>>,
}

impl GroupReader {
    /// Opens the reader over `group`. An empty group starts out exhausted.
    pub fn open(
        format: Arc<dyn TableFormat>,
        scan: Arc<ScanRequest>,
        group: SplitGroup,
    ) -> Result<Self> {
        let attempt = ReadAttempt::new();
        let mut reader = Self {
            format,
            scan,
            group,
            attempt,
            decoder: None,
            next_split: 0,
            columns: None,
        };
        if !reader.group.splits.is_empty() {
            let decoder = reader.open_split(0)?;
            reader.columns = Some(decoder.columns().to_vec());
            reader.decoder = Some(decoder);
            reader.next_split = 1;
        }
        debug!(
            attempt = %reader.attempt.id,
            group = reader.group.index,
            splits = reader.group.splits.len(),
            "opened group reader"
        );
        Ok(reader)
    }

    fn open_split(&self, index: usize) -> Result<Box<dyn RecordDecoder>> {
        let split = &self.group.splits[index];
        debug!(
            attempt = %self.attempt.id,
            group = self.group.index,
            split = split.ordinal,
            uri = %split.uri,
            "opening split decoder"
        );
        self.format.open_decoder(split, &self.scan, self.attempt)
    }

    /// Decoded column names, in decoded order. `None` if the group was empty.
    pub fn decoded_columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Pulls the next raw record, advancing across splits as needed.
    ///
    /// Returns `Ok(None)` exactly once all splits are exhausted; an empty
    /// split in the middle of the group contributes nothing and causes no
    /// visible gap. Decoder failures are fatal and propagated as-is; the
    /// host engine owns task-level retry.
    pub fn next_record(&mut self) -> Result<Option<Row>> {
        loop {
            let Some(decoder) = self.decoder.as_mut() else {
                return Ok(None);
            };
            if let Some(record) = decoder.next_record()? {
                return Ok(Some(record));
            }
            decoder.close()?;
            if self.next_split == self.group.splits.len() {
                self.decoder = None;
                debug!(
                    attempt = %self.attempt.id,
                    group = self.group.index,
                    "group exhausted"
                );
                return Ok(None);
            }
            let mut next = self.open_split(self.next_split)?;
            if let Err(e) = self.check_schema(next.columns()) {
                // The rejected decoder still holds external resources.
                let _ = next.close();
                return Err(e);
            }
            self.decoder = Some(next);
            self.next_split += 1;
        }
    }

    /// Splits of one table must decode the same columns; drift between files
    /// is a schema mismatch, not something to paper over.
    fn check_schema(&self, columns: &[String]) -> Result<()> {
        match &self.columns {
            Some(expected) if expected.as_slice() != columns => Err(Error::projection(format!(
                "split {} decodes columns {:?}, previous splits decoded {:?}",
                self.group.splits[self.next_split].ordinal, columns, expected
            ))),
            _ => Ok(()),
        }
    }

    /// Releases the currently open decoder, if any. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut decoder) = self.decoder.take() {
            decoder.close()?;
        }
        Ok(())
    }
}

impl Drop for GroupReader {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use floe_common::Value;

    use super::*;
    use crate::format::TableSplit;

    struct VecDecoder {
        columns: Vec<String>,
        records: Vec<Row>,
        pos: usize,
        closes: Arc<AtomicUsize>,
    }

    impl RecordDecoder for VecDecoder {
        fn columns(&self) -> &[String] {
            &self.columns
        }

        fn next_record(&mut self) -> Result<Option<Row>> {
            if self.pos < self.records.len() {
                self.pos += 1;
                Ok(Some(self.records[self.pos - 1].clone()))
            } else {
                Ok(None)
            }
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// A format whose split ordinal selects a canned record list.
    struct VecFormat {
        per_split: Vec<usize>,
        closes: Arc<AtomicUsize>,
    }

    impl VecFormat {
        fn new(per_split: &[usize]) -> Self {
            Self {
                per_split: per_split.to_vec(),
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn group(&self) -> SplitGroup {
            SplitGroup {
                index: 0,
                splits: (0..self.per_split.len())
                    .map(|i| TableSplit::new(i, format!("mem://part-{i}")))
                    .collect(),
            }
        }
    }

    fn scan() -> Arc<ScanRequest> {
        Arc::new(ScanRequest {
            database: "db".to_string(),
            table: "t".to_string(),
            path: "mem://t".to_string(),
            columns: vec!["id".to_string()],
            filter: None,
            options: Default::default(),
        })
    }

    impl TableFormat for VecFormat {
        fn list_splits(&self, _scan: &ScanRequest) -> Result<Vec<TableSplit>> {
            Ok(self.group().splits)
        }

        fn open_decoder(
            &self,
            split: &TableSplit,
            _scan: &ScanRequest,
            _attempt: ReadAttempt,
        ) -> Result<Box<dyn RecordDecoder>> {
            let count = self.per_split[split.ordinal];
            let records = (0..count)
                .map(|r| vec![Value::Int64((split.ordinal * 100 + r) as i64)])
                .collect();
            Ok(Box::new(VecDecoder {
                columns: vec!["id".to_string()],
                records,
                pos: 0,
                closes: self.closes.clone(),
            }))
        }
    }

    fn read_all(reader: &mut GroupReader) -> Vec<i64> {
        let mut out = Vec::new();
        while let Some(row) = reader.next_record().unwrap() {
            match &row[0] {
                Value::Int64(v) => out.push(*v),
                other => panic!("unexpected value {other:?}"),
            }
        }
        out
    }

    #[test]
    fn reads_across_splits_in_order() {
        let format = Arc::new(VecFormat::new(&[2, 0, 3]));
        let mut reader = GroupReader::open(format.clone(), scan(), format.group()).unwrap();
        // The empty middle split contributes nothing and causes no gap.
        assert_eq!(read_all(&mut reader), vec![0, 1, 200, 201, 202]);
        // Exhaustion is sticky.
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn empty_group_is_exhausted_immediately() {
        let format = Arc::new(VecFormat::new(&[]));
        let mut reader = GroupReader::open(
            format.clone(),
            scan(),
            SplitGroup {
                index: 0,
                splits: Vec::new(),
            },
        )
        .unwrap();
        assert!(reader.decoded_columns().is_none());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn close_is_idempotent() {
        let format = Arc::new(VecFormat::new(&[1]));
        let mut reader = GroupReader::open(format.clone(), scan(), format.group()).unwrap();
        reader.close().unwrap();
        reader.close().unwrap();
        assert_eq!(format.closes.load(Ordering::SeqCst), 1);
        // Closed reader reads as exhausted.
        assert!(reader.next_record().unwrap().is_none());
    }

    /// Decodes a different column name per split ordinal.
    struct DriftFormat {
        closes: Arc<AtomicUsize>,
    }

    impl TableFormat for DriftFormat {
        fn list_splits(&self, _scan: &ScanRequest) -> Result<Vec<TableSplit>> {
            Ok((0..2)
                .map(|i| TableSplit::new(i, format!("mem://part-{i}")))
                .collect())
        }

        fn open_decoder(
            &self,
            split: &TableSplit,
            _scan: &ScanRequest,
            _attempt: ReadAttempt,
        ) -> Result<Box<dyn RecordDecoder>> {
            let column = if split.ordinal == 0 { "id" } else { "renamed" };
            Ok(Box::new(VecDecoder {
                columns: vec![column.to_string()],
                records: vec![vec![Value::Int64(split.ordinal as i64)]],
                pos: 0,
                closes: self.closes.clone(),
            }))
        }
    }

    #[test]
    fn schema_drift_is_an_error_and_releases_the_decoder() {
        let closes = Arc::new(AtomicUsize::new(0));
        let format = Arc::new(DriftFormat {
            closes: closes.clone(),
        });
        let group = SplitGroup {
            index: 0,
            splits: format.list_splits(&scan()).unwrap(),
        };
        let mut reader = GroupReader::open(format, scan(), group).unwrap();

        assert!(reader.next_record().unwrap().is_some());
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, Error::Projection(_)), "got {err:?}");
        // Both the exhausted decoder and the rejected one are closed.
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn every_finished_decoder_is_closed() {
        let format = Arc::new(VecFormat::new(&[2, 0, 3]));
        let mut reader = GroupReader::open(format.clone(), scan(), format.group()).unwrap();
        read_all(&mut reader);
        drop(reader);
        assert_eq!(format.closes.load(Ordering::SeqCst), 3);
    }
}

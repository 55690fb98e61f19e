//! Output-row projection: reorder decoded columns into the declared output
//! shape, substituting constant literals for columns with no source.

use floe_common::{DataType, Error, Result, Row, Value};

use crate::config::ColumnSpec;

/// Where one output column comes from: a source column copied out of the
/// decoded record, or a constant literal parsed at configure time.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputColumn {
    Column { name: String },
    Literal { value: Value },
}

#[derive(Debug, Clone)]
pub struct ProjectedColumn {
    pub output: OutputColumn,
    pub data_type: DataType,
}

/// The declared output columns, in output order. Output position `i` is vec
/// index `i`, so every position appears exactly once by construction. Built
/// once at configure time, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ColumnProjection {
    columns: Vec<ProjectedColumn>,
}

impl ColumnProjection {
    /// Builds the projection from the declared column list.
    ///
    /// A column must carry a non-empty source name or a literal value;
    /// literals are parsed into their declared type here, so a bad literal
    /// fails at configure time.
    pub fn from_specs(specs: &[ColumnSpec]) -> Result<Self> {
        let mut columns = Vec::with_capacity(specs.len());
        for (pos, spec) in specs.iter().enumerate() {
            let output = match (&spec.name, &spec.value) {
                (Some(name), _) if !name.trim().is_empty() => OutputColumn::Column {
                    name: name.clone(),
                },
                (_, Some(text)) => OutputColumn::Literal {
                    value: Value::parse_literal(text, spec.data_type, spec.format.as_deref())?,
                },
                _ => {
                    return Err(Error::config(format!(
                        "output column {pos} has neither a source name nor a literal value"
                    )))
                }
            };
            columns.push(ProjectedColumn {
                output,
                data_type: spec.data_type,
            });
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The pushdown projection: non-empty source names, in declared order.
    pub fn source_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| match &c.output {
                OutputColumn::Column { name } => Some(name.clone()),
                OutputColumn::Literal { .. } => None,
            })
            .collect()
    }

    /// Output field names and types, for engine handoff. Literal columns
    /// without a declared name get a positional one.
    pub fn output_fields(&self) -> Vec<(String, DataType)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(pos, c)| {
                let name = match &c.output {
                    OutputColumn::Column { name } => name.clone(),
                    OutputColumn::Literal { .. } => format!("col{pos}"),
                };
                (name, c.data_type)
            })
            .collect()
    }

    /// Resolves source names against the decoded column order.
    ///
    /// A declared source column absent from the decoded record is a
    /// projection error, never a silent null.
    pub fn bind(&self, decoded: &[String]) -> Result<BoundProjection> {
        let mut outputs = Vec::with_capacity(self.columns.len());
        for (pos, col) in self.columns.iter().enumerate() {
            match &col.output {
                OutputColumn::Column { name } => {
                    let idx = decoded.iter().position(|c| c == name).ok_or_else(|| {
                        Error::projection(format!(
                            "source column '{name}' (output position {pos}) \
                             is not present in the decoded record"
                        ))
                    })?;
                    outputs.push(BoundOutput::Source(idx));
                }
                OutputColumn::Literal { value } => {
                    outputs.push(BoundOutput::Const(value.clone()));
                }
            }
        }
        Ok(BoundProjection { outputs })
    }
}

#[derive(Debug, Clone)]
enum BoundOutput {
    Source(usize),
    Const(Value),
}

/// A projection resolved against a concrete decoder schema.
#[derive(Debug, Clone)]
pub struct BoundProjection {
    outputs: Vec<BoundOutput>,
}

impl BoundProjection {
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Produces one output row from one raw decoded record.
    ///
    /// Source fields are copied verbatim (the decoder already produced the
    /// declared type); literal fields are cloned from the pre-parsed value.
    /// The output width equals the projection length regardless of the raw
    /// record width.
    pub fn project(&self, raw: &[Value]) -> Result<Row> {
        let mut row = Vec::with_capacity(self.outputs.len());
        for (pos, out) in self.outputs.iter().enumerate() {
            match out {
                BoundOutput::Source(idx) => {
                    let value = raw.get(*idx).ok_or_else(|| {
                        Error::projection(format!(
                            "decoded record has {} fields but output position {pos} \
                             reads source index {idx}",
                            raw.len()
                        ))
                    })?;
                    row.push(value.clone());
                }
                BoundOutput::Const(value) => row.push(value.clone()),
            }
        }
        Ok(row)
    }
}

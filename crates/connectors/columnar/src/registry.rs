use std::sync::Arc;

use dashmap::DashMap;
use floe_common::{Error, Result};

use crate::format::TableFormat;

/// Named `TableFormat` implementations, looked up by the `format` key in the
/// connector settings.
#[derive(Default)]
pub struct FormatRegistry {
    formats: DashMap<String, Arc<dyn TableFormat>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            formats: DashMap::new(),
        }
    }

    pub fn register(&self, name: &str, format: Arc<dyn TableFormat>) {
        self.formats.insert(name.to_string(), format);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn TableFormat>> {
        self.formats
            .get(name)
            .map(|f| f.value().clone())
            .ok_or_else(|| Error::config(format!("unknown table format '{name}'")))
    }
}

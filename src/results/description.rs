use serde::{Deserialize, Serialize};

use crate::types::SqlType;

/// Metadata for one column of a row set, in the order the columns were requested.
///
/// Sizes, precision and scale are `None` when the driver does not report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub type_code: SqlType,
    pub display_size: Option<u32>,
    pub internal_size: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub null_ok: Option<bool>,
}

impl ColumnDescription {
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: SqlType) -> Self {
        Self {
            name: name.into(),
            type_code,
            display_size: None,
            internal_size: None,
            precision: None,
            scale: None,
            null_ok: None,
        }
    }

    /// Record a declared length, e.g. `VARCHAR(50)`.
    #[must_use]
    pub fn with_size(mut self, size: Option<u32>) -> Self {
        self.display_size = size;
        self.internal_size = size;
        self
    }

    /// Record declared numeric precision and scale, e.g. `DECIMAL(10,2)`.
    #[must_use]
    pub fn with_precision(mut self, precision: Option<u32>, scale: Option<u32>) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_null_ok(mut self, null_ok: Option<bool>) -> Self {
        self.null_ok = null_ok;
        self
    }
}

//! Parameter binding: arity checks and per-value classification.
//!
//! Binding never executes SQL. Drivers receive a [`BoundParams`] and bind each entry with
//! the setter matching its [`SqlType`].

use crate::error::SqlBridgeError;
use crate::types::{SqlType, Value};

/// What a driver learned about a statement when preparing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementInfo {
    /// Number of parameters the driver expects.
    pub parameter_count: usize,
    /// Whether executing the statement yields a row set.
    pub produces_rows: bool,
}

/// One value attached to a placeholder position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundParam<'a> {
    /// 1-based placeholder position
    pub position: usize,
    pub value: &'a Value,
    pub sql_type: SqlType,
}

/// Parameters validated against a prepared statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams<'a> {
    params: Vec<BoundParam<'a>>,
}

impl<'a> BoundParams<'a> {
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, BoundParam<'a>> {
        self.params.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a, 'b> IntoIterator for &'b BoundParams<'a> {
    type Item = &'b BoundParam<'a>;
    type IntoIter = std::slice::Iter<'b, BoundParam<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Validate `params` against `info` and classify every value.
///
/// # Errors
///
/// Returns `SqlBridgeError::BindingError` when the number of values differs from the number
/// of placeholders the driver reported.
pub fn bind<'a>(info: &StatementInfo, params: &'a [Value]) -> Result<BoundParams<'a>, SqlBridgeError> {
    if params.len() != info.parameter_count {
        return Err(SqlBridgeError::BindingError(format!(
            "statement expects {} parameter(s) but {} were supplied",
            info.parameter_count,
            params.len()
        )));
    }

    let params = params
        .iter()
        .enumerate()
        .map(|(i, value)| BoundParam {
            position: i + 1,
            value,
            sql_type: value.sql_type(),
        })
        .collect();
    Ok(BoundParams { params })
}

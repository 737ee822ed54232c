use std::sync::{Arc, Weak};

use crate::binder;
use crate::connection::SessionSlot;
use crate::driver::{Execution, Session};
use crate::error::SqlBridgeError;
use crate::results::{ColumnDescription, ResultSet, Row};
use crate::types::Value;

#[derive(Debug)]
enum CursorState {
    /// Nothing executed yet, or the last execution failed.
    Idle,
    /// The last statement produced no row set.
    NoResult,
    /// A row set is pending; zero or more rows already fetched.
    WithResult(ResultSet),
    Closed,
}

/// A stateful handle over one statement execution and its pending row set.
///
/// ```rust
/// # #[cfg(feature = "sqlite")] {
/// use sql_bridge::prelude::*;
///
/// let conn = sql_bridge::connect("sqlite", ":memory:")?;
/// let mut cursor = conn.cursor()?;
/// cursor.execute("create table T (ID integer, NAME varchar(20))", &[])?;
/// cursor.executemany(
///     "insert into T values (?, ?)",
///     [vec![Value::Int(1), "a".into()], vec![Value::Int(2), "b".into()]],
/// )?;
/// assert_eq!(cursor.rowcount(), 2);
///
/// cursor.execute("select NAME from T where ID = ?", &[Value::Int(2)])?;
/// assert_eq!(cursor.rowcount(), -1);
/// let rows = cursor.fetchall()?;
/// assert_eq!(rows[0].get("NAME"), Some(&Value::Text("b".into())));
/// # }
/// # Ok::<(), sql_bridge::SqlBridgeError>(())
/// ```
#[derive(Debug)]
pub struct Cursor {
    slot: Weak<SessionSlot>,
    state: CursorState,
    description: Option<Arc<Vec<ColumnDescription>>>,
    rowcount: i64,
    arraysize: usize,
}

impl Cursor {
    pub(crate) fn new(slot: Weak<SessionSlot>, arraysize: usize) -> Self {
        Self {
            slot,
            state: CursorState::Idle,
            description: None,
            rowcount: -1,
            arraysize,
        }
    }

    /// Column metadata of the pending row set; `None` if the last statement produced no rows.
    #[must_use]
    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.description.as_deref().map(Vec::as_slice)
    }

    /// Rows affected by the last statement, or -1 when unknown or not applicable.
    #[must_use]
    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    /// Default batch size for [`Cursor::fetchmany`].
    #[must_use]
    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    /// # Errors
    ///
    /// Returns `SqlBridgeError::ConfigError` for a size of zero.
    pub fn set_arraysize(&mut self, arraysize: usize) -> Result<(), SqlBridgeError> {
        if arraysize == 0 {
            return Err(SqlBridgeError::ConfigError(
                "arraysize must be at least 1".into(),
            ));
        }
        self.arraysize = arraysize;
        Ok(())
    }

    /// Rows of the pending row set not fetched yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        match &self.state {
            CursorState::WithResult(rs) => rs.remaining(),
            _ => 0,
        }
    }

    /// True after [`Cursor::close`] or once the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, CursorState::Closed)
            || self.slot.upgrade().is_none_or(|slot| !slot.is_open())
    }

    /// Execute `sql` once, binding `params` to its placeholders.
    ///
    /// # Errors
    ///
    /// `SqlBridgeError::CursorClosed` if the cursor or its connection is closed,
    /// `SqlBridgeError::BindingError` on a parameter count mismatch, otherwise the driver's
    /// own error. After a failure the cursor has no description and a rowcount of -1.
    pub fn execute(&mut self, sql: &str, params: &[Value]) -> Result<&mut Self, SqlBridgeError> {
        self.reset()?;
        let execution = self.run(|session| {
            let info = session.prepare(sql)?;
            let bound = binder::bind(&info, params)?;
            session.execute(sql, &bound)
        })?;

        match execution {
            Execution::Rows(rs) => {
                self.description = Some(Arc::clone(rs.description()));
                self.rowcount = -1;
                tracing::debug!(sql, params = params.len(), rows = rs.remaining(), "executed query");
                self.state = CursorState::WithResult(rs);
            }
            Execution::Affected(n) => {
                self.rowcount = to_rowcount(n);
                tracing::debug!(sql, params = params.len(), rowcount = self.rowcount, "executed statement");
                self.state = CursorState::NoResult;
            }
        }
        Ok(self)
    }

    /// Execute `sql` once per parameter set, in order. `rowcount` becomes the sum of the
    /// affected rows of every set.
    ///
    /// Sets are independent: a failure aborts the remaining sets and leaves earlier ones
    /// applied. No transaction is opened on the caller's behalf.
    ///
    /// # Errors
    ///
    /// `SqlBridgeError::BatchError` carrying the index of the first failing set,
    /// `SqlBridgeError::ExecutionError` if the statement returns rows, and
    /// `SqlBridgeError::CursorClosed` if the cursor or its connection is closed.
    pub fn executemany<I, P>(&mut self, sql: &str, seq_of_params: I) -> Result<&mut Self, SqlBridgeError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[Value]>,
    {
        self.reset()?;
        let (sets, total) = self.run(|session| {
            let info = session.prepare(sql)?;
            if info.produces_rows {
                return Err(SqlBridgeError::ExecutionError(
                    "executemany cannot run a statement that returns rows".into(),
                ));
            }
            let mut sets = 0_usize;
            let mut total = 0_u64;
            for (index, params) in seq_of_params.into_iter().enumerate() {
                let bound =
                    binder::bind(&info, params.as_ref()).map_err(|e| e.in_batch(index))?;
                match session.execute(sql, &bound).map_err(|e| e.in_batch(index))? {
                    Execution::Affected(n) => total += n,
                    Execution::Rows(_) => {
                        return Err(SqlBridgeError::ExecutionError(
                            "executemany cannot run a statement that returns rows".into(),
                        )
                        .in_batch(index));
                    }
                }
                sets += 1;
            }
            Ok((sets, total))
        })?;

        self.rowcount = to_rowcount(total);
        self.state = CursorState::NoResult;
        tracing::debug!(sql, sets, rowcount = self.rowcount, "executed batch");
        Ok(self)
    }

    /// Next row of the pending row set, or `None` once it is exhausted.
    ///
    /// # Errors
    ///
    /// `SqlBridgeError::NoResultSet` if the last statement produced no rows,
    /// `SqlBridgeError::CursorClosed` if the cursor or its connection is closed.
    pub fn fetchone(&mut self) -> Result<Option<Row>, SqlBridgeError> {
        Ok(self.pending()?.next_row())
    }

    /// Up to `size` rows (default [`Cursor::arraysize`]); empty once exhausted.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::fetchone`].
    pub fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<Row>, SqlBridgeError> {
        let size = size.unwrap_or(self.arraysize);
        Ok(self.pending()?.take_rows(size))
    }

    /// Every remaining row; empty (never an error) when nothing matched.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::fetchone`].
    pub fn fetchall(&mut self) -> Result<Vec<Row>, SqlBridgeError> {
        Ok(self.pending()?.take_all())
    }

    /// Release the pending row set. Closing again is a no-op.
    pub fn close(&mut self) {
        if !matches!(self.state, CursorState::Closed) {
            tracing::trace!("closing cursor");
        }
        self.state = CursorState::Closed;
        self.description = None;
        self.rowcount = -1;
    }

    fn pending(&mut self) -> Result<&mut ResultSet, SqlBridgeError> {
        self.ensure_open()?;
        match &mut self.state {
            CursorState::WithResult(rs) => Ok(rs),
            CursorState::Idle | CursorState::NoResult => Err(SqlBridgeError::NoResultSet),
            CursorState::Closed => Err(SqlBridgeError::CursorClosed),
        }
    }

    fn ensure_open(&mut self) -> Result<Arc<SessionSlot>, SqlBridgeError> {
        if matches!(self.state, CursorState::Closed) {
            return Err(SqlBridgeError::CursorClosed);
        }
        match self.slot.upgrade() {
            Some(slot) if slot.is_open() => Ok(slot),
            _ => {
                self.close();
                Err(SqlBridgeError::CursorClosed)
            }
        }
    }

    /// Forget the previous execution before running a new one.
    fn reset(&mut self) -> Result<(), SqlBridgeError> {
        self.ensure_open()?;
        self.state = CursorState::Idle;
        self.description = None;
        self.rowcount = -1;
        Ok(())
    }

    fn run<R>(
        &mut self,
        f: impl FnOnce(&mut dyn Session) -> Result<R, SqlBridgeError>,
    ) -> Result<R, SqlBridgeError> {
        let slot = self.ensure_open()?;
        let result = slot.with_session(SqlBridgeError::CursorClosed, f);
        if matches!(result, Err(SqlBridgeError::CursorClosed)) {
            self.close();
        }
        result
    }
}

fn to_rowcount(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

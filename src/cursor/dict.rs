use std::ops::{Deref, DerefMut};

use super::Cursor;
use crate::driver::NativeCursor;
use crate::error::Result;
use crate::results::DictRow;

/// Cursor variant that returns rows keyed by column name.
///
/// Only single-row fetching differs from [`Cursor`]; `fetchmany` and
/// `fetchall` are loops over [`fetchone`](Self::fetchone). Everything else is
/// reached through `Deref`.
pub struct DictCursor<C: NativeCursor> {
    inner: Cursor<C>,
}

impl<C: NativeCursor> DictCursor<C> {
    #[must_use]
    pub fn new(inner: Cursor<C>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn into_inner(self) -> Cursor<C> {
        self.inner
    }

    /// # Errors
    ///
    /// Same as [`Cursor::fetchone`].
    pub fn fetchone(&mut self) -> Result<Option<DictRow>> {
        let Some(row) = self.inner.fetchone()? else {
            return Ok(None);
        };
        let description = self.inner.description().unwrap_or_default();
        Ok(Some(DictRow::from_row(&description, row)))
    }

    /// # Errors
    ///
    /// Same as [`Cursor::fetchmany`].
    pub fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<DictRow>> {
        let size = size.unwrap_or(self.inner.arraysize());
        let mut rows = Vec::new();
        while rows.len() < size {
            match self.fetchone()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    /// # Errors
    ///
    /// Same as [`Cursor::fetchall`].
    pub fn fetchall(&mut self) -> Result<Vec<DictRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetchone()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

impl<C: NativeCursor> Deref for DictCursor<C> {
    type Target = Cursor<C>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<C: NativeCursor> DerefMut for DictCursor<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

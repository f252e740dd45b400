use std::collections::VecDeque;

use tracing::trace;

use crate::catalog::ColumnDescriptor;
use crate::error::{DbError, Result};
use super::row::Row;

/// One materialized result set
///
/// Rows are consumed from the front. The column descriptors the driver
/// reported for the set travel with it, so a buffered set can still be
/// described after the driver has moved on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: VecDeque<Row>,
    description: Option<Vec<ColumnDescriptor>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - The initial capacity for the result rows
    ///
    /// # Returns
    ///
    /// A new `ResultSet` instance with preallocated capacity and no
    /// column descriptors
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: VecDeque::with_capacity(capacity),
            description: None,
        }
    }

    /// Attach the column descriptors of this result set
    ///
    /// # Arguments
    ///
    /// * `description` - Descriptors as the driver reported them, `None` when
    ///   the driver had none
    #[must_use]
    pub fn with_description(mut self, description: Option<Vec<ColumnDescriptor>>) -> ResultSet {
        self.description = description;
        self
    }

    /// Column descriptors of this result set
    #[must_use]
    pub fn description(&self) -> Option<&[ColumnDescriptor]> {
        self.description.as_deref()
    }

    /// Add a row to the result set
    ///
    /// # Arguments
    ///
    /// * `row` - The projected values for this row
    pub fn add_row(&mut self, row: Row) {
        self.rows.push_back(row);
    }

    /// Rows not yet consumed
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove and return the first row
    pub fn pop_row(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Remove and return up to `count` rows from the front
    ///
    /// # Returns
    ///
    /// Fewer than `count` rows when the set runs out
    pub fn take_rows(&mut self, count: usize) -> Vec<Row> {
        let count = count.min(self.rows.len());
        self.rows.drain(..count).collect()
    }

    /// Remove and return every remaining row
    pub fn take_all(&mut self) -> Vec<Row> {
        self.rows.drain(..).collect()
    }
}

impl From<Vec<Row>> for ResultSet {
    fn from(rows: Vec<Row>) -> Self {
        ResultSet {
            rows: rows.into(),
            description: None,
        }
    }
}

/// Lifecycle of a [`ResultSetBuffer`] within one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Never populated; cursors talk to the driver directly
    Empty,
    /// Sets queued, nothing read yet from the head
    Populated,
    /// Head partially or fully consumed
    Draining,
    /// Every set was dropped; stays this way until the next execution
    Retired,
}

/// FIFO of result sets produced by one multi-result operation.
#[derive(Debug, Clone)]
pub struct ResultSetBuffer {
    sets: VecDeque<ResultSet>,
    state: BufferState,
}

impl Default for ResultSetBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSetBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: VecDeque::new(),
            state: BufferState::Empty,
        }
    }

    /// Forget everything and return to `Empty`, as at the start of an execution.
    pub fn reset(&mut self) {
        self.sets.clear();
        self.state = BufferState::Empty;
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> BufferState {
        self.state
    }

    /// True once the buffer has been populated for the current execution, even
    /// if it has since been retired.
    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.state != BufferState::Empty
    }

    /// Number of queued sets, including a drained head.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Rows left in the head set.
    #[must_use]
    pub fn head_remaining(&self) -> usize {
        self.sets.front().map_or(0, ResultSet::len)
    }

    /// Column descriptors of the head set, `None` once the buffer is retired
    /// or when the head set carries none.
    #[must_use]
    pub fn head_description(&self) -> Option<&[ColumnDescriptor]> {
        self.sets.front().and_then(ResultSet::description)
    }

    /// Queue a set behind the others.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Interface` once rows have been read or the buffer was
    /// retired.
    pub fn push(&mut self, set: ResultSet) -> Result<()> {
        match self.state {
            BufferState::Empty | BufferState::Populated => {
                trace!(rows = set.len(), queued = self.sets.len() + 1, "result set buffered");
                self.sets.push_back(set);
                self.state = BufferState::Populated;
                Ok(())
            }
            BufferState::Draining | BufferState::Retired => Err(DbError::Interface(
                "cannot queue a result set after fetching has started".to_string(),
            )),
        }
    }

    fn head_mut(&mut self) -> Option<&mut ResultSet> {
        let head = self.sets.front_mut()?;
        self.state = BufferState::Draining;
        Some(head)
    }

    /// Pop the next row of the head set. The head stays queued when it runs
    /// dry; only [`advance`](Self::advance) drops it.
    pub fn fetch_one(&mut self) -> Option<Row> {
        self.head_mut().and_then(ResultSet::pop_row)
    }

    /// Pop up to `count` rows of the head set.
    pub fn fetch_many(&mut self, count: usize) -> Vec<Row> {
        self.head_mut().map(|head| head.take_rows(count)).unwrap_or_default()
    }

    /// Drain the head set entirely.
    pub fn fetch_all(&mut self) -> Vec<Row> {
        self.head_mut().map(ResultSet::take_all).unwrap_or_default()
    }

    /// Discard up to `count` rows of the head set, returning how many went.
    pub fn skip(&mut self, count: usize) -> usize {
        self.fetch_many(count).len()
    }

    /// Drop the head set. Returns whether another set follows; when none does
    /// the buffer retires.
    pub fn advance(&mut self) -> bool {
        self.sets.pop_front();
        if self.sets.is_empty() {
            trace!("result set buffer retired");
            self.state = BufferState::Retired;
            false
        } else {
            self.state = BufferState::Populated;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn set(values: &[i64]) -> ResultSet {
        values.iter().map(|v| vec![Value::Int(*v)]).collect::<Vec<_>>().into()
    }

    #[test]
    fn sets_are_served_in_push_order() {
        let mut buffer = ResultSetBuffer::new();
        assert_eq!(buffer.state(), BufferState::Empty);
        buffer.push(set(&[1, 2])).unwrap();
        buffer.push(set(&[3])).unwrap();
        assert_eq!(buffer.state(), BufferState::Populated);

        assert_eq!(buffer.fetch_one(), Some(vec![Value::Int(1)]));
        assert_eq!(buffer.state(), BufferState::Draining);
        assert_eq!(buffer.fetch_all(), vec![vec![Value::Int(2)]]);
        assert_eq!(buffer.fetch_one(), None);
        assert_eq!(buffer.len(), 2);

        assert!(buffer.advance());
        assert_eq!(buffer.fetch_many(10), vec![vec![Value::Int(3)]]);
        assert!(!buffer.advance());
        assert_eq!(buffer.state(), BufferState::Retired);
        assert!(buffer.is_engaged());
        assert_eq!(buffer.fetch_one(), None);
        assert!(buffer.fetch_all().is_empty());
    }

    #[test]
    fn push_after_fetch_is_rejected() {
        let mut buffer = ResultSetBuffer::new();
        buffer.push(set(&[1])).unwrap();
        buffer.fetch_one();
        assert!(matches!(buffer.push(set(&[2])), Err(DbError::Interface(_))));
        buffer.advance();
        assert!(buffer.push(set(&[2])).is_err());
        buffer.reset();
        assert!(buffer.push(set(&[2])).is_ok());
    }

    #[test]
    fn head_description_follows_the_head() {
        let mut buffer = ResultSetBuffer::new();
        let first = vec![ColumnDescriptor::new("N", crate::catalog::SQL_INTEGER)];
        let second = vec![ColumnDescriptor::new("S", crate::catalog::SQL_VARCHAR)];
        buffer.push(set(&[1]).with_description(Some(first.clone()))).unwrap();
        buffer.push(ResultSet::with_capacity(0).with_description(Some(second.clone()))).unwrap();
        assert_eq!(buffer.head_description(), Some(&first[..]));
        buffer.fetch_all();
        assert_eq!(buffer.head_description(), Some(&first[..]));
        assert!(buffer.advance());
        assert_eq!(buffer.head_description(), Some(&second[..]));
        assert!(!buffer.advance());
        assert_eq!(buffer.head_description(), None);
    }

    #[test]
    fn short_reads_and_skip() {
        let mut buffer = ResultSetBuffer::new();
        buffer.push(set(&[1, 2, 3, 4])).unwrap();
        assert_eq!(buffer.skip(3), 3);
        assert_eq!(buffer.head_remaining(), 1);
        assert_eq!(buffer.fetch_many(5).len(), 1);
        assert!(buffer.fetch_many(5).is_empty());
    }
}

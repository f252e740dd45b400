use std::str::FromStr;

use clap::ValueEnum;

use super::Cursor;
use crate::driver::NativeCursor;
use crate::error::{DbError, Result};

// Fetch orientations understood by the native CLI layer.
pub const FETCH_NEXT: i32 = 1;
pub const FETCH_FIRST: i32 = 2;
pub const FETCH_LAST: i32 = 3;
pub const FETCH_PRIOR: i32 = 4;
pub const FETCH_ABSOLUTE: i32 = 5;
pub const FETCH_RELATIVE: i32 = 6;

/// How `Cursor::scroll` interprets its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ScrollMode {
    /// Move forward from the current row
    #[default]
    Relative,
    /// Move to a fixed row; never supported
    Absolute,
}

impl ScrollMode {
    #[must_use]
    pub fn orientation(self) -> i32 {
        match self {
            ScrollMode::Relative => FETCH_RELATIVE,
            ScrollMode::Absolute => FETCH_ABSOLUTE,
        }
    }
}

impl FromStr for ScrollMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        <ScrollMode as ValueEnum>::from_str(s, true)
            .map_err(|_| DbError::Validation(format!("unknown scroll mode {s:?}")))
    }
}

impl<C: NativeCursor> Cursor<C> {
    /// Move the cursor by `value` rows. Only forward relative moves are
    /// possible: `Absolute` always fails with `NotSupported`, a negative value
    /// fails validation and zero does nothing. Returns the number of rows
    /// skipped, `None` when the driver had no open result set.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Interface` on a closed cursor. Otherwise see above;
    /// driver errors while skipping are propagated.
    pub fn scroll(&mut self, value: i64, mode: ScrollMode) -> Result<Option<usize>> {
        self.ensure_open()?;
        if mode == ScrollMode::Absolute {
            return Err(DbError::NotSupported("absolute scroll".to_string()));
        }
        if value == 0 {
            return Ok(Some(0));
        }
        let count = usize::try_from(value)
            .map_err(|_| DbError::Validation(format!("scroll value must be >= 1, got {value}")))?;
        self.skip(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_names() {
        assert_eq!("relative".parse::<ScrollMode>().unwrap(), ScrollMode::Relative);
        assert_eq!("ABSOLUTE".parse::<ScrollMode>().unwrap(), ScrollMode::Absolute);
        assert!(matches!("sideways".parse::<ScrollMode>(), Err(DbError::Validation(_))));
        assert_eq!(ScrollMode::default().orientation(), FETCH_RELATIVE);
    }
}

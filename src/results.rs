pub mod projector;
pub mod result_set;
pub mod row;

pub use projector::{LobSource, project_row, project_rows, project_value};
pub use result_set::{BufferState, ResultSet, ResultSetBuffer};
pub use row::{DictRow, Row};

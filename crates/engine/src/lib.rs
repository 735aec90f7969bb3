pub mod cell;
pub mod collection;
pub mod column;
pub mod events;
pub mod ids;
pub mod row;
pub mod store;
pub mod worksheet;

pub use cell::CellValue;
pub use collection::WorksheetCollection;
pub use column::{Column, ColumnType};
pub use row::Row;
pub use store::{ColumnPosition, WorksheetStore};
pub use worksheet::Worksheet;

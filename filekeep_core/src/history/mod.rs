pub mod selection;
pub mod table;

pub use selection::SelectionStore;
pub use table::{build_table, FileHistoryTable, FileRow, OperationLink};

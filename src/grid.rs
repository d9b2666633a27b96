pub mod column;
pub mod format;
pub mod table;
pub mod value;

pub use column::{Accessor, ColumnDef};
pub use table::{Grid, Row};
pub use value::{CellValue, ColumnKind, NumberFormat};

mod cell_map;
mod export;

pub use cell_map::{CellEntry, CellPosition, TableCellMap, HEADER_ROW};

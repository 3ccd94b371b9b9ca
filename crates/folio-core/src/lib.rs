//! Shared types for the folio document viewer: the block IR produced by the
//! parser, the color palette layer, and small display enums.

pub mod block;
pub mod theme;
pub mod types;

pub use block::{
    inline_plain_text, Block, BlockId, Checkbox, IndexedBlock, Inline, InlineText, Item,
    TableColumn,
};
pub use theme::{Palette, Rgba, ThemeMode};
pub use types::{Alignment, DisplayMode};

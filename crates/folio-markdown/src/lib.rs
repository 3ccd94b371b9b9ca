//! Document assembly: block IR in, one flat styled buffer out, plus the side
//! indices (attachments, table cell maps, block tags) that let a painter and
//! a clipboard layer treat regions of the buffer as structured objects again.

pub mod assembler;
pub mod attachments;
pub mod buffer;
pub mod config;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod highlight;
pub mod inline;
pub mod interval;
pub mod math;
pub mod table;

pub use assembler::{AssembledDocument, DocumentAssembler, TableOverlay};
pub use attachments::{AttachmentHandle, AttachmentRecord};
pub use buffer::{BlockTag, ParagraphStyle, StyledBuffer, TextStyle};
pub use config::{AssemblyConfig, TableRendering};
pub use error::RenderError;
pub use fonts::{FontFace, FontMetrics, FontSpec, MonospaceMetrics};
pub use highlight::{HighlightedSpan, SyntaxHighlighter, SyntectHighlighter};
pub use math::{MathImage, MathStyle, MathTypesetter};
pub use table::{CellPosition, TableCellMap};

//! Document viewer front half: settings, the assembled document facade,
//! render caches, and the background attachment pipeline.

pub mod cache;
pub mod document;
pub mod pipeline;
pub mod settings;

pub use cache::{CacheKey, RenderCache};
pub use document::{union_rects, CodeBlockRegion, Rect, RenderedDocument, TableClipboard};
pub use pipeline::{
    AttachmentEvent, AttachmentPipeline, AttachmentSlots, DiagramRenderer, ImageRenderer,
    RenderedImage, SlotError, SlotState,
};
pub use settings::ViewerSettings;

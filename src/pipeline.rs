//! Asynchronous replacement of attachment placeholders.
//!
//! Assembly only reserves placeholders. Renders run off the owning thread
//! and come back as [`AttachmentEvent`]s over a channel; the owner applies
//! them to [`AttachmentSlots`] by handle, without re-running assembly.

use async_channel::{Receiver, Sender};
use folio_core::Block;
use folio_markdown::{AttachmentHandle, AttachmentRecord, RenderError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::{CacheKey, RenderCache};
use crate::settings::ViewerSettings;

/// Rendered replacement content for one placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedImage {
    pub width: f32,
    pub height: f32,
    /// Encoded image bytes, opaque to the viewer core.
    pub data: Arc<[u8]>,
}

/// Turns diagram source into an image. Implementations may block.
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, code: &str, theme_id: &str) -> Result<RenderedImage, RenderError>;
}

/// Loads and rasterizes an image block's source. Implementations may block.
pub trait ImageRenderer: Send + Sync {
    fn rasterize(&self, source: &str, theme_id: &str) -> Result<RenderedImage, RenderError>;
}

/// Outcome of one placeholder render
#[derive(Debug)]
pub enum AttachmentEvent {
    Rendered {
        handle: AttachmentHandle,
        image: RenderedImage,
    },
    Failed {
        handle: AttachmentHandle,
        error: RenderError,
    },
}

impl AttachmentEvent {
    pub fn handle(&self) -> AttachmentHandle {
        match self {
            AttachmentEvent::Rendered { handle, .. } | AttachmentEvent::Failed { handle, .. } => *handle,
        }
    }
}

fn diagram_source(block: &Block) -> Option<&str> {
    match block {
        Block::DiagramBlock { code } => Some(code.as_str()),
        _ => None,
    }
}

fn image_source(block: &Block) -> Option<&str> {
    match block {
        Block::Image { source, .. } => Some(source.as_str()),
        _ => None,
    }
}

/// Placeholders sharing one source, rendered once for all of them.
struct RenderGroup {
    key: CacheKey,
    source: String,
    handles: Vec<AttachmentHandle>,
}

/// Group `records` by cache key, in first-seen order.
fn group_by_source(
    records: &[AttachmentRecord],
    theme_id: &str,
    source_of: fn(&Block) -> Option<&str>,
) -> Vec<RenderGroup> {
    let mut groups: Vec<RenderGroup> = Vec::new();
    for record in records {
        let Some(source) = source_of(&record.block) else {
            continue;
        };
        let key = CacheKey::new(source, theme_id);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.handles.push(record.handle),
            None => groups.push(RenderGroup {
                key,
                source: source.to_string(),
                handles: vec![record.handle],
            }),
        }
    }
    groups
}

/// Runs placeholder renders and reports their results
pub struct AttachmentPipeline {
    event_tx: Sender<AttachmentEvent>,
    diagram_cache: Arc<RenderCache<RenderedImage>>,
    image_cache: Arc<RenderCache<RenderedImage>>,
}

impl AttachmentPipeline {
    pub fn new(
        diagram_cache_capacity: usize,
        image_cache_capacity: usize,
    ) -> (Self, Receiver<AttachmentEvent>) {
        let (tx, rx) = async_channel::unbounded();
        (
            Self {
                event_tx: tx,
                diagram_cache: Arc::new(RenderCache::new(diagram_cache_capacity)),
                image_cache: Arc::new(RenderCache::new(image_cache_capacity)),
            },
            rx,
        )
    }

    /// Pipeline with cache capacities taken from the viewer settings.
    pub fn from_settings(settings: &ViewerSettings) -> (Self, Receiver<AttachmentEvent>) {
        Self::new(settings.diagram_cache_capacity, settings.image_cache_capacity)
    }

    pub fn diagram_cache(&self) -> &RenderCache<RenderedImage> {
        &self.diagram_cache
    }

    pub fn image_cache(&self) -> &RenderCache<RenderedImage> {
        &self.image_cache
    }

    /// Run `job` on the blocking thread pool and report its result for
    /// `handle`.
    pub async fn submit<F>(&self, handle: AttachmentHandle, job: F)
    where
        F: FnOnce() -> Result<RenderedImage, RenderError> + Send + 'static,
    {
        let result = smol::unblock(job).await;
        self.report(handle, result).await;
    }

    /// Render a diagram placeholder, going through the diagram cache.
    pub async fn submit_diagram(
        &self,
        record: &AttachmentRecord,
        renderer: Arc<dyn DiagramRenderer>,
        theme_id: &str,
    ) {
        self.render_diagrams(std::slice::from_ref(record), renderer, theme_id)
            .await;
    }

    /// Rasterize an image placeholder, going through the image cache.
    pub async fn submit_image(
        &self,
        record: &AttachmentRecord,
        renderer: Arc<dyn ImageRenderer>,
        theme_id: &str,
    ) {
        self.render_images(std::slice::from_ref(record), renderer, theme_id)
            .await;
    }

    /// Render every diagram placeholder concurrently and wait for all of them.
    /// Placeholders with the same source share one render.
    pub async fn render_diagrams(
        &self,
        records: &[AttachmentRecord],
        renderer: Arc<dyn DiagramRenderer>,
        theme_id: &str,
    ) {
        let jobs = group_by_source(records, theme_id, diagram_source)
            .into_iter()
            .map(|group| {
                let renderer = Arc::clone(&renderer);
                let theme_id = theme_id.to_string();
                let source = group.source.clone();
                self.render_group(&self.diagram_cache, group, move || {
                    renderer.render(&source, &theme_id)
                })
            });
        futures::future::join_all(jobs).await;
    }

    /// Rasterize every image placeholder concurrently and wait for all of
    /// them. Placeholders with the same source share one render.
    pub async fn render_images(
        &self,
        records: &[AttachmentRecord],
        renderer: Arc<dyn ImageRenderer>,
        theme_id: &str,
    ) {
        let jobs = group_by_source(records, theme_id, image_source)
            .into_iter()
            .map(|group| {
                let renderer = Arc::clone(&renderer);
                let theme_id = theme_id.to_string();
                let source = group.source.clone();
                self.render_group(&self.image_cache, group, move || {
                    renderer.rasterize(&source, &theme_id)
                })
            });
        futures::future::join_all(jobs).await;
    }

    async fn render_group<F>(
        &self,
        cache: &Arc<RenderCache<RenderedImage>>,
        group: RenderGroup,
        job: F,
    )
    where
        F: FnOnce() -> Result<RenderedImage, RenderError> + Send + 'static,
    {
        let result = match cache.get(&group.key) {
            Some(image) => {
                log::debug!("Render cache hit for {}", group.key);
                Ok(image)
            }
            None => {
                let cache = Arc::clone(cache);
                let key = group.key;
                smol::unblock(move || cache.get_or_try_insert_with(key, job)).await
            }
        };
        for handle in group.handles {
            self.report(handle, result.clone()).await;
        }
    }

    async fn report(&self, handle: AttachmentHandle, result: Result<RenderedImage, RenderError>) {
        let event = match result {
            Ok(image) => AttachmentEvent::Rendered { handle, image },
            Err(error) => {
                log::warn!("Attachment {:?} failed to render: {}", handle, error);
                AttachmentEvent::Failed { handle, error }
            }
        };
        if self.event_tx.send(event).await.is_err() {
            log::debug!("Attachment receiver closed, dropping result for {:?}", handle);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("no placeholder with handle {0:?}")]
    UnknownHandle(AttachmentHandle),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlotState {
    Pending,
    Filled(RenderedImage),
    /// The placeholder stays unfilled.
    Failed(RenderError),
}

/// Render state of every placeholder in one assembled document.
#[derive(Clone, Debug, Default)]
pub struct AttachmentSlots {
    slots: HashMap<AttachmentHandle, SlotState>,
}

impl AttachmentSlots {
    pub fn new(records: &[AttachmentRecord]) -> Self {
        Self {
            slots: records
                .iter()
                .map(|r| (r.handle, SlotState::Pending))
                .collect(),
        }
    }

    /// Record a render outcome. A later success replaces an earlier failure.
    pub fn apply(&mut self, event: AttachmentEvent) -> Result<AttachmentHandle, SlotError> {
        let handle = event.handle();
        let slot = self
            .slots
            .get_mut(&handle)
            .ok_or(SlotError::UnknownHandle(handle))?;
        *slot = match event {
            AttachmentEvent::Rendered { image, .. } => SlotState::Filled(image),
            AttachmentEvent::Failed { error, .. } => SlotState::Failed(error),
        };
        Ok(handle)
    }

    /// Apply every event already waiting on `events`; returns how many were
    /// applied.
    pub fn drain(&mut self, events: &Receiver<AttachmentEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            match self.apply(event) {
                Ok(_) => applied += 1,
                Err(e) => log::warn!("Ignoring attachment event: {}", e),
            }
        }
        applied
    }

    pub fn state(&self, handle: AttachmentHandle) -> Option<&SlotState> {
        self.slots.get(&handle)
    }

    /// Rendered content for `handle`, if it has arrived.
    pub fn image(&self, handle: AttachmentHandle) -> Option<&RenderedImage> {
        match self.slots.get(&handle)? {
            SlotState::Filled(image) => Some(image),
            _ => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, SlotState::Pending))
            .count()
    }

    pub fn is_settled(&self) -> bool {
        self.pending() == 0
    }
}

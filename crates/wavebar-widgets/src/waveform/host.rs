//! Host contract: containers, drawing surfaces and event listeners
//!
//! A [`Host`] is whatever the view is embedded in. It resolves containers,
//! mounts and styles the drawing surface, hands out a [`DrawContext`] for it
//! and keeps track of listener registrations. Events themselves are
//! delivered by the embedder calling into the view (`on_resize`,
//! `on_click`); a registration only records that the view wants them.
//!
//! [`CanvasHost`] is the retained-mode implementation used with iced: every
//! surface records its draw calls into a [`DrawList`] that the canvas
//! program replays each frame.

use std::collections::HashMap;
use std::fmt;

use wavebar_core::error::ConfigError;

use super::renderer::{DrawContext, Fill};

/// Handle for a container element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Handle for a mounted drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Handle for a listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostListener(pub u64);

/// How the view names its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    /// Selector resolved against the host document
    Selector(String),
    /// An element handle the caller already holds
    Element(ElementId),
}

impl From<&str> for ContainerRef {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for ContainerRef {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<ElementId> for ContainerRef {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

/// Events the view subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Window-level resize
    Resize,
    /// Click on the drawing surface
    Click,
}

/// A CSS-style length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Percent(f32),
    Px(u32),
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{}%", p),
            Self::Px(px) => write!(f, "{}px", px),
        }
    }
}

/// Layout style plus backing-store size of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    pub width: CssLength,
    pub height: CssLength,
    /// Drawing buffer width in pixels
    pub pixel_width: u32,
    /// Drawing buffer height in pixels
    pub pixel_height: u32,
}

/// The environment a waveform view is embedded in
pub trait Host {
    type Context: DrawContext;

    /// Resolve a container reference; an unmatched selector is `ElementNotFound`
    fn resolve(&self, container: &ContainerRef) -> Result<ElementId, ConfigError>;

    /// Rendered width of a container in pixels
    fn container_width(&self, container: ElementId) -> f32;

    /// Left edge of a container in client coordinates
    fn container_left(&self, container: ElementId) -> f32;

    fn mount_surface(&mut self, container: ElementId, style: &SurfaceStyle) -> SurfaceId;
    fn restyle_surface(&mut self, surface: SurfaceId, style: &SurfaceStyle);
    fn unmount_surface(&mut self, surface: SurfaceId);
    fn surface_exists(&self, surface: SurfaceId) -> bool;

    /// Drawing context of a mounted surface
    fn context(&mut self, surface: SurfaceId) -> Option<&mut Self::Context>;

    fn listen(&mut self, event: HostEvent) -> HostListener;
    fn unlisten(&mut self, listener: HostListener);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear { x: f32, y: f32, width: f32, height: f32 },
    Fill { x: f32, y: f32, width: f32, height: f32, fill: Fill },
}

impl DrawOp {
    fn within(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let (ox, oy, ow, oh) = match *self {
            Self::Clear { x, y, width, height } | Self::Fill { x, y, width, height, .. } => {
                (x, y, width, height)
            }
        };
        ox >= x && oy >= y && ox + ow <= x + width && oy + oh <= y + height
    }
}

/// Retained list of draw calls
///
/// A clear drops every recorded call it fully covers, so repeated full
/// redraws do not grow the list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawList {
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of recorded fills
    pub fn fill_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
            .count()
    }

    /// Replay every recorded call onto another context
    pub fn replay<C: DrawContext + ?Sized>(&self, ctx: &mut C) {
        for op in &self.ops {
            match op {
                DrawOp::Clear { x, y, width, height } => ctx.clear_rect(*x, *y, *width, *height),
                DrawOp::Fill {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => ctx.fill_rect(*x, *y, *width, *height, fill),
            }
        }
    }
}

impl DrawContext for DrawList {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.retain(|op| !op.within(x, y, width, height));
        self.ops.push(DrawOp::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &Fill) {
        self.ops.push(DrawOp::Fill {
            x,
            y,
            width,
            height,
            fill: fill.clone(),
        });
    }
}

#[derive(Debug, Clone, Copy)]
struct Container {
    left: f32,
    width: f32,
}

/// A mounted surface of a [`CanvasHost`]
#[derive(Debug, Clone)]
pub struct MountedSurface {
    pub container: ElementId,
    pub style: SurfaceStyle,
    pub draw_list: DrawList,
}

/// Retained-mode host for canvas toolkits
///
/// Containers are registered under a selector with their bounds; the
/// embedder updates the bounds from its layout pass.
#[derive(Debug, Default)]
pub struct CanvasHost {
    next_id: u64,
    selectors: HashMap<String, ElementId>,
    containers: HashMap<ElementId, Container>,
    surfaces: HashMap<SurfaceId, MountedSurface>,
    listeners: HashMap<HostListener, HostEvent>,
}

impl CanvasHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register a container under `selector`
    pub fn add_container(&mut self, selector: &str, left: f32, width: f32) -> ElementId {
        let id = ElementId(self.next());
        self.selectors.insert(selector.to_string(), id);
        self.containers.insert(id, Container { left, width });
        id
    }

    /// Update a container's bounds after a layout change
    pub fn set_container_bounds(&mut self, id: ElementId, left: f32, width: f32) {
        if let Some(container) = self.containers.get_mut(&id) {
            container.left = left;
            container.width = width;
        }
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&MountedSurface> {
        self.surfaces.get(&id)
    }

    /// Surfaces mounted inside a container
    pub fn surfaces_in(&self, container: ElementId) -> impl Iterator<Item = &MountedSurface> {
        self.surfaces
            .values()
            .filter(move |s| s.container == container)
    }

    /// Active registrations for an event
    pub fn listener_count(&self, event: HostEvent) -> usize {
        self.listeners.values().filter(|e| **e == event).count()
    }
}

impl Host for CanvasHost {
    type Context = DrawList;

    fn resolve(&self, container: &ContainerRef) -> Result<ElementId, ConfigError> {
        match container {
            ContainerRef::Selector(selector) => self
                .selectors
                .get(selector)
                .copied()
                .ok_or_else(|| ConfigError::ElementNotFound(selector.clone())),
            ContainerRef::Element(id) if self.containers.contains_key(id) => Ok(*id),
            ContainerRef::Element(id) => Err(ConfigError::InvalidElement(format!(
                "element {} is not attached to this host",
                id.0
            ))),
        }
    }

    fn container_width(&self, container: ElementId) -> f32 {
        self.containers.get(&container).map(|c| c.width).unwrap_or(0.0)
    }

    fn container_left(&self, container: ElementId) -> f32 {
        self.containers.get(&container).map(|c| c.left).unwrap_or(0.0)
    }

    fn mount_surface(&mut self, container: ElementId, style: &SurfaceStyle) -> SurfaceId {
        let id = SurfaceId(self.next());
        self.surfaces.insert(
            id,
            MountedSurface {
                container,
                style: *style,
                draw_list: DrawList::new(),
            },
        );
        id
    }

    fn restyle_surface(&mut self, surface: SurfaceId, style: &SurfaceStyle) {
        if let Some(mounted) = self.surfaces.get_mut(&surface) {
            // Resizing the backing store discards its contents
            if (mounted.style.pixel_width, mounted.style.pixel_height)
                != (style.pixel_width, style.pixel_height)
            {
                mounted.draw_list = DrawList::new();
            }
            mounted.style = *style;
        }
    }

    fn unmount_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(&surface);
    }

    fn surface_exists(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    fn context(&mut self, surface: SurfaceId) -> Option<&mut DrawList> {
        self.surfaces.get_mut(&surface).map(|s| &mut s.draw_list)
    }

    fn listen(&mut self, event: HostEvent) -> HostListener {
        let id = HostListener(self.next());
        self.listeners.insert(id, event);
        id
    }

    fn unlisten(&mut self, listener: HostListener) {
        self.listeners.remove(&listener);
    }
}

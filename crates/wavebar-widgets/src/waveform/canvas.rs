//! iced canvas surface for the bar waveform
//!
//! The view renders into a retained [`DrawList`]; [`WaveformCanvas`] replays
//! it onto an iced [`Frame`] every frame and turns clicks and drags into seek
//! fractions. A responsive view also gets its layout bounds reported back.

use iced::widget::canvas::{self, gradient, Event, Frame, Geometry, Gradient, Program};
use iced::{mouse, Point, Rectangle, Size, Theme};

use super::host::DrawList;
use super::renderer::{DrawContext, Fill};
use crate::theme::{to_color, SURFACE_BACKGROUND};

/// [`DrawContext`] over an iced canvas frame
pub struct FrameContext<'a> {
    frame: &'a mut Frame,
}

impl<'a> FrameContext<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame }
    }
}

impl DrawContext for FrameContext<'_> {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        // Frames start empty; only an opaque background needs painting
        if SURFACE_BACKGROUND.a > 0.0 {
            self.frame.fill_rectangle(
                Point::new(x, y),
                Size::new(width, height),
                SURFACE_BACKGROUND,
            );
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &Fill) {
        let top_left = Point::new(x, y);
        let size = Size::new(width, height);
        match fill {
            Fill::Solid(rgb) => self.frame.fill_rectangle(top_left, size, to_color(*rgb)),
            Fill::Linear(linear) => {
                let mut iced_gradient = gradient::Linear::new(
                    Point::new(linear.start.0, linear.start.1),
                    Point::new(linear.end.0, linear.end.1),
                );
                for (offset, rgb) in &linear.stops {
                    iced_gradient = iced_gradient.add_stop(*offset, to_color(*rgb));
                }
                self.frame.fill_rectangle(
                    top_left,
                    size,
                    canvas::Fill::from(Gradient::Linear(iced_gradient)),
                );
            }
        }
    }
}

/// Canvas state for click and drag seeking
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformInteraction {
    /// Whether the left button is held (drag seeking)
    pub is_dragging: bool,
}

/// Canvas program replaying a waveform draw list
///
/// `on_seek` is called with the normalized position (0.0 to 1.0) when the
/// user clicks or drags, unless `interact` is off. When `tracked` holds the
/// container bounds the view last measured, `on_resize` is called with the
/// canvas bounds whenever they differ.
pub struct WaveformCanvas<'a, Message, SeekFn, ResizeFn>
where
    SeekFn: Fn(f64) -> Message,
    ResizeFn: Fn(Rectangle) -> Message,
{
    pub draw_list: &'a DrawList,
    pub interact: bool,
    /// `(left, width)` of the container; `None` for fixed-width views
    pub tracked: Option<(f32, f32)>,
    pub on_seek: SeekFn,
    pub on_resize: ResizeFn,
}

impl<Message, SeekFn, ResizeFn> WaveformCanvas<'_, Message, SeekFn, ResizeFn>
where
    SeekFn: Fn(f64) -> Message,
    ResizeFn: Fn(Rectangle) -> Message,
{
    /// Whether `bounds` no longer match the tracked container
    pub fn is_stale(&self, bounds: Rectangle) -> bool {
        match self.tracked {
            Some((left, width)) => {
                (bounds.x - left).abs() >= 0.5 || (bounds.width - width).abs() >= 0.5
            }
            None => false,
        }
    }

    fn seek(
        &self,
        interaction: &mut WaveformInteraction,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Message> {
        if !self.interact {
            interaction.is_dragging = false;
            return None;
        }

        if let Some(position) = cursor.position_in(bounds) {
            let fraction = || (position.x / bounds.width).clamp(0.0, 1.0) as f64;
            match event {
                Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                    interaction.is_dragging = true;
                    return Some((self.on_seek)(fraction()));
                }
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                    interaction.is_dragging = false;
                }
                Event::Mouse(mouse::Event::CursorMoved { .. }) if interaction.is_dragging => {
                    return Some((self.on_seek)(fraction()));
                }
                _ => {}
            }
        } else if matches!(event, Event::Mouse(mouse::Event::ButtonReleased(_))) {
            interaction.is_dragging = false;
        }

        None
    }
}

impl<Message, SeekFn, ResizeFn> Program<Message> for WaveformCanvas<'_, Message, SeekFn, ResizeFn>
where
    Message: Clone,
    SeekFn: Fn(f64) -> Message,
    ResizeFn: Fn(Rectangle) -> Message,
{
    type State = WaveformInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if let Some(message) = self.seek(interaction, event, bounds, cursor) {
            return Some(canvas::Action::publish(message));
        }
        // Any event after a layout change reports the new bounds
        if self.is_stale(bounds) {
            return Some(canvas::Action::publish((self.on_resize)(bounds)));
        }
        None
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.interact && cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        self.draw_list.replay(&mut FrameContext::new(&mut frame));
        vec![frame.into_geometry()]
    }
}

//! Waveform view function
//!
//! Plain function taking the view by reference plus seek and resize
//! callbacks, returning an `Element`.
//!
//! ```ignore
//! fn view(&self) -> Element<Message> {
//!     waveform_bars(self.player.view(), Message::Seek, Message::Bounds)
//! }
//!
//! // Message::Bounds(bounds) =>
//! //     self.player.view_mut().on_bounds(bounds.x, bounds.width, Instant::now()),
//! ```

use iced::widget::Canvas;
use iced::{Element, Length, Rectangle};

use super::canvas::WaveformCanvas;
use super::host::{CanvasHost, CssLength, DrawList};
use super::view::WaveformView;

static EMPTY: DrawList = DrawList::new();

fn length(css: CssLength) -> Length {
    match css {
        CssLength::Percent(_) => Length::Fill,
        CssLength::Px(px) => Length::Fixed(px as f32),
    }
}

/// Bar waveform element with click-to-seek
///
/// `on_seek` receives the normalized position (0.0 to 1.0). `on_resize`
/// receives the canvas bounds of a responsive view when they change; feed
/// them to [`WaveformView::on_bounds`]. A destroyed view renders as an
/// empty canvas.
pub fn waveform_bars<'a, Message>(
    view: &'a WaveformView<CanvasHost>,
    on_seek: impl Fn(f64) -> Message + 'a,
    on_resize: impl Fn(Rectangle) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let mounted = view.surface().and_then(|id| view.host().surface(id));
    let (draw_list, width, height) = match mounted {
        Some(surface) => (
            &surface.draw_list,
            length(surface.style.width),
            length(surface.style.height),
        ),
        None => (&EMPTY, Length::Shrink, Length::Shrink),
    };

    Canvas::new(WaveformCanvas {
        draw_list,
        interact: view.options().interact && view.is_ready(),
        tracked: view.tracked_bounds(),
        on_seek,
        on_resize,
    })
    .width(width)
    .height(height)
    .into()
}

//! Waveform view state machine
//!
//! `WaveformView` owns everything a mounted waveform needs: the amplitude
//! series, the derived bar layout, the progress value, the color pairs and
//! the host registrations.
//!
//! ```text
//! Uninitialized ──new()──► Ready ──destroy()──► Destroyed
//! ```
//!
//! `new` only returns a view once the container is resolved and the surface
//! is mounted, so the `Uninitialized` phase is never observable from outside.
//! Every operation on a destroyed view is a no-op.
//!
//! ## Recompute rules
//!
//! | Change | Layout | Colors | Listeners | Surface |
//! |---|---|---|---|---|
//! | data | stale | | | |
//! | progress | | | | |
//! | width / responsive / resize | stale | | | restyle |
//! | height | | | | restyle |
//! | bar width / gap | stale | | | |
//! | wave / progress color | | rebuilt | | |
//! | interact / responsive | | | rewired | |
//!
//! Every visual change ends with a redraw. A stale layout is rebuilt lazily
//! on the next draw.

use std::time::{Duration, Instant};

use wavebar_core::amplitude::AmplitudeSeries;
use wavebar_core::color::{ColorPair, HexColor};
use wavebar_core::config::ViewOptions;
use wavebar_core::error::ConfigError;

use super::debounce::Debouncer;
use super::geometry::BarLayout;
use super::host::{
    CanvasHost, ContainerRef, CssLength, ElementId, Host, HostEvent, HostListener, SurfaceId,
    SurfaceStyle,
};
use super::renderer::{BarFrame, Renderer};

/// Lifecycle phase of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Uninitialized,
    Ready,
    Destroyed,
}

/// A click translated into a playback position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    /// Target position as a fraction of the duration, in [0, 1]
    pub fraction: f64,
}

/// What an option change recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recompute {
    pub geometry: bool,
    pub colors: bool,
    pub listeners: bool,
    pub surface: bool,
    pub redraw: bool,
}

impl Recompute {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Clamp a progress value to [0, 1]; NaN becomes 0
fn clamp_progress(value: f64) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0) as f32
    }
}

/// Waveform view bound to a host
pub struct WaveformView<H: Host> {
    host: H,
    phase: ViewPhase,
    container: ElementId,
    surface: Option<SurfaceId>,
    options: ViewOptions,
    wave_colors: ColorPair,
    progress_colors: ColorPair,
    series: AmplitudeSeries,
    /// `None` while stale
    layout: Option<BarLayout>,
    rendered_width: f32,
    progress: f32,
    resize_listener: Option<HostListener>,
    click_listener: Option<HostListener>,
    resize: Debouncer,
}

impl<H: Host> WaveformView<H> {
    /// Resolve the container, mount the surface and wire listeners
    ///
    /// Fails synchronously when the container cannot be resolved.
    pub fn new(
        host: H,
        container: impl Into<ContainerRef>,
        options: ViewOptions,
    ) -> Result<Self, ConfigError> {
        let container = host.resolve(&container.into())?;

        let mut view = Self {
            phase: ViewPhase::Uninitialized,
            container,
            surface: None,
            wave_colors: ColorPair::from(&options.wave_color),
            progress_colors: ColorPair::from(&options.progress_color),
            series: AmplitudeSeries::empty(),
            layout: None,
            rendered_width: 0.0,
            progress: 0.0,
            resize_listener: None,
            click_listener: None,
            resize: Debouncer::new(Duration::from_millis(options.resize_debounce_ms)),
            options,
            host,
        };

        view.rendered_width = view.measure_width();
        let style = view.surface_style();
        view.surface = Some(view.host.mount_surface(container, &style));
        view.wire_listeners();
        view.phase = ViewPhase::Ready;

        log::debug!(
            "view: Mounted {}x{} surface (responsive: {}, interact: {})",
            style.width,
            style.height,
            view.options.responsive,
            view.options.interact
        );

        Ok(view)
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ViewPhase::Ready
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Mounted surface, `None` after destroy
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn series(&self) -> &AmplitudeSeries {
        &self.series
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn rendered_width(&self) -> f32 {
        self.rendered_width
    }

    pub fn wave_colors(&self) -> &ColorPair {
        &self.wave_colors
    }

    pub fn progress_colors(&self) -> &ColorPair {
        &self.progress_colors
    }

    pub fn has_pending_resize(&self) -> bool {
        self.resize.is_pending()
    }

    /// Current bar layout, rebuilt first if stale
    pub fn layout(&mut self) -> &BarLayout {
        self.layout.get_or_insert_with(|| {
            BarLayout::compute(
                self.series.as_slice(),
                self.rendered_width,
                self.options.bar_width,
                self.options.bar_gap,
            )
        })
    }

    pub fn is_layout_stale(&self) -> bool {
        self.layout.is_none()
    }

    // =========================================================================
    // Data and progress
    // =========================================================================

    /// Replace the amplitude series
    ///
    /// Redraws immediately when `redraw` is enabled; otherwise the layout is
    /// rebuilt on the next draw.
    pub fn set_data(&mut self, series: AmplitudeSeries) {
        if !self.is_ready() {
            return;
        }
        log::debug!("view: New series with {} points", series.len());
        self.series = series;
        self.layout = None;
        if self.options.redraw {
            self.draw();
        }
    }

    /// Drop the series and clear the surface
    pub fn clear_data(&mut self) {
        if !self.is_ready() {
            return;
        }
        self.series = AmplitudeSeries::empty();
        self.layout = None;
        self.draw();
    }

    /// Set playback progress, clamped to [0, 1]
    pub fn set_progress(&mut self, value: f64) {
        if !self.is_ready() {
            return;
        }
        self.progress = clamp_progress(value);
        self.draw();
    }

    /// Progress back to the start
    pub fn reset(&mut self) {
        self.set_progress(0.0);
    }

    // =========================================================================
    // Resize
    // =========================================================================

    /// Window resize notification; debounced, responsive mode only
    pub fn on_resize(&mut self, now: Instant) {
        if self.is_ready() && self.options.responsive {
            self.resize.trigger(now);
        }
    }

    /// Drive the resize debouncer; returns true when a resize was applied
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.is_ready() && self.resize.ready(now) {
            self.flush_resize();
            true
        } else {
            false
        }
    }

    /// Re-measure the container now, bypassing the debounce
    pub fn flush_resize(&mut self) {
        if !self.is_ready() {
            return;
        }
        self.resize.cancel();
        let width = self.measure_width();
        if width == self.rendered_width {
            return;
        }
        log::debug!("view: Resized {} -> {}", self.rendered_width, width);
        self.rendered_width = width;
        self.layout = None;
        self.restyle();
        self.draw();
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Map a click at client x coordinate `client_x` to a seek request
    ///
    /// Does not change progress; the caller decides when progress follows.
    pub fn on_click(&self, client_x: f32) -> Option<SeekRequest> {
        if !self.is_ready() || !self.options.interact || self.rendered_width <= 0.0 {
            return None;
        }
        let offset = client_x - self.host.container_left(self.container);
        let fraction = (offset / self.rendered_width).clamp(0.0, 1.0) as f64;
        Some(SeekRequest { fraction })
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn set_width(&mut self, width: u32) -> Recompute {
        self.apply_options(ViewOptions {
            width,
            ..self.options.clone()
        })
    }

    pub fn set_height(&mut self, height: u32) -> Recompute {
        self.apply_options(ViewOptions {
            height,
            ..self.options.clone()
        })
    }

    pub fn set_bar_width(&mut self, bar_width: u32) -> Recompute {
        self.apply_options(ViewOptions {
            bar_width,
            ..self.options.clone()
        })
    }

    pub fn set_bar_gap(&mut self, bar_gap: u32) -> Recompute {
        self.apply_options(ViewOptions {
            bar_gap,
            ..self.options.clone()
        })
    }

    pub fn set_wave_color(&mut self, hex: &str) -> Result<Recompute, ConfigError> {
        let wave_color = HexColor::parse(hex)?;
        Ok(self.apply_options(ViewOptions {
            wave_color,
            ..self.options.clone()
        }))
    }

    pub fn set_progress_color(&mut self, hex: &str) -> Result<Recompute, ConfigError> {
        let progress_color = HexColor::parse(hex)?;
        Ok(self.apply_options(ViewOptions {
            progress_color,
            ..self.options.clone()
        }))
    }

    pub fn set_gradient(&mut self, gradient: bool) -> Recompute {
        self.apply_options(ViewOptions {
            gradient,
            ..self.options.clone()
        })
    }

    pub fn set_interact(&mut self, interact: bool) -> Recompute {
        self.apply_options(ViewOptions {
            interact,
            ..self.options.clone()
        })
    }

    pub fn set_responsive(&mut self, responsive: bool) -> Recompute {
        self.apply_options(ViewOptions {
            responsive,
            ..self.options.clone()
        })
    }

    pub fn set_redraw(&mut self, redraw: bool) -> Recompute {
        self.apply_options(ViewOptions {
            redraw,
            ..self.options.clone()
        })
    }

    /// Replace the options snapshot, recomputing only what changed
    pub fn apply_options(&mut self, options: ViewOptions) -> Recompute {
        let mut done = Recompute::default();
        if !self.is_ready() || options == self.options {
            return done;
        }

        let old = std::mem::replace(&mut self.options, options);
        let new = &self.options;

        if old.wave_color != new.wave_color || old.progress_color != new.progress_color {
            self.wave_colors = ColorPair::from(&new.wave_color);
            self.progress_colors = ColorPair::from(&new.progress_color);
            done.colors = true;
        }

        if old.bar_width != new.bar_width || old.bar_gap != new.bar_gap {
            done.geometry = true;
        }

        if old.resize_debounce_ms != new.resize_debounce_ms {
            self.resize
                .set_delay(Duration::from_millis(new.resize_debounce_ms));
        }

        let width_mode_changed = old.responsive != new.responsive;
        if width_mode_changed || old.width != new.width || old.height != new.height {
            let width = self.measure_width();
            if width != self.rendered_width {
                self.rendered_width = width;
                done.geometry = true;
            }
            self.restyle();
            done.surface = true;
        }

        if width_mode_changed || old.interact != self.options.interact {
            self.wire_listeners();
            done.listeners = true;
        }

        if done.geometry {
            self.layout = None;
        }

        done.redraw = done.geometry || done.colors || done.surface || old.gradient != self.options.gradient;
        if done.redraw {
            self.draw();
        }

        log::debug!("view: Options applied: {:?}", done);
        done
    }

    // =========================================================================
    // Drawing and teardown
    // =========================================================================

    /// Paint the current state onto the surface
    pub fn draw(&mut self) {
        if !self.is_ready() {
            return;
        }
        let Some(surface) = self.surface else {
            return;
        };

        let layout = self.layout.get_or_insert_with(|| {
            BarLayout::compute(
                self.series.as_slice(),
                self.rendered_width,
                self.options.bar_width,
                self.options.bar_gap,
            )
        });

        let frame = BarFrame {
            layout,
            wave: &self.wave_colors,
            progress: &self.progress_colors,
            progress_value: self.progress,
            width: self.rendered_width,
            height: self.options.height as f32,
            bar_width: self.options.bar_width as f32,
            bar_gap: self.options.bar_gap as f32,
            gradient: self.options.gradient,
        };

        match self.host.context(surface) {
            Some(ctx) => Renderer::draw(ctx, &frame),
            None => log::warn!("view: Surface {:?} has no drawing context", surface),
        }
    }

    /// Detach listeners, unmount the surface and drop all data
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.phase == ViewPhase::Destroyed {
            return;
        }
        self.unwire_listeners();
        if let Some(surface) = self.surface.take() {
            self.host.unmount_surface(surface);
        }
        self.resize.cancel();
        self.series = AmplitudeSeries::empty();
        self.layout = None;
        self.phase = ViewPhase::Destroyed;
        log::debug!("view: Destroyed");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn measure_width(&self) -> f32 {
        if self.options.responsive {
            self.host.container_width(self.container).max(0.0)
        } else {
            self.options.width as f32
        }
    }

    fn surface_style(&self) -> SurfaceStyle {
        SurfaceStyle {
            width: if self.options.responsive {
                CssLength::Percent(100.0)
            } else {
                CssLength::Px(self.options.width)
            },
            height: CssLength::Px(self.options.height),
            pixel_width: self.rendered_width.round() as u32,
            pixel_height: self.options.height,
        }
    }

    fn restyle(&mut self) {
        if let Some(surface) = self.surface {
            let style = self.surface_style();
            self.host.restyle_surface(surface, &style);
        }
    }

    /// Register exactly the listeners the current options call for
    fn wire_listeners(&mut self) {
        match (self.options.responsive, self.resize_listener) {
            (true, None) => self.resize_listener = Some(self.host.listen(HostEvent::Resize)),
            (false, Some(id)) => {
                self.host.unlisten(id);
                self.resize_listener = None;
                self.resize.cancel();
            }
            _ => {}
        }

        match (self.options.interact, self.click_listener) {
            (true, None) => self.click_listener = Some(self.host.listen(HostEvent::Click)),
            (false, Some(id)) => {
                self.host.unlisten(id);
                self.click_listener = None;
            }
            _ => {}
        }
    }

    fn unwire_listeners(&mut self) {
        if let Some(id) = self.resize_listener.take() {
            self.host.unlisten(id);
        }
        if let Some(id) = self.click_listener.take() {
            self.host.unlisten(id);
        }
    }
}

impl WaveformView<CanvasHost> {
    /// Container bounds as last measured, `(left, width)`
    ///
    /// `None` unless the view is ready and responsive; a fixed-width view
    /// does not track its container.
    pub fn tracked_bounds(&self) -> Option<(f32, f32)> {
        if !self.is_ready() || !self.options.responsive {
            return None;
        }
        Some((
            self.host.container_left(self.container),
            self.host.container_width(self.container),
        ))
    }

    /// Layout bounds reported by the canvas widget
    ///
    /// Records the new container bounds and triggers the debounced resize;
    /// the redraw happens on a later [`tick`](Self::tick).
    pub fn on_bounds(&mut self, left: f32, width: f32, now: Instant) {
        if self.tracked_bounds() == Some((left, width)) {
            return;
        }
        let container = self.container;
        self.host.set_container_bounds(container, left, width);
        self.on_resize(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::host::CanvasHost;

    fn host(width: f32) -> CanvasHost {
        let mut host = CanvasHost::new();
        host.add_container("#wave", 20.0, width);
        host
    }

    fn view(options: ViewOptions) -> WaveformView<CanvasHost> {
        WaveformView::new(host(300.0), "#wave", options).unwrap()
    }

    fn fills(view: &WaveformView<CanvasHost>) -> usize {
        let surface = view.surface().unwrap();
        view.host().surface(surface).unwrap().draw_list.fill_count()
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut view = view(ViewOptions::default());
        view.set_progress(1.5);
        assert_eq!(view.progress(), 1.0);
        view.set_progress(-0.5);
        assert_eq!(view.progress(), 0.0);
        view.set_progress(f64::NAN);
        assert_eq!(view.progress(), 0.0);
        view.set_progress(0.25);
        view.reset();
        assert_eq!(view.progress(), 0.0);
    }

    #[test]
    fn test_set_data_draws_one_fill_per_bar() {
        let mut view = view(ViewOptions::default());
        view.set_data(AmplitudeSeries::new(vec![0.5; 800]));
        assert_eq!(fills(&view), 512 / 3);

        view.clear_data();
        assert_eq!(fills(&view), 0);
    }

    #[test]
    fn test_lazy_layout_without_redraw() {
        let mut view = view(ViewOptions {
            redraw: false,
            ..Default::default()
        });
        view.set_data(AmplitudeSeries::new(vec![0.5; 100]));
        assert!(view.is_layout_stale());
        assert_eq!(fills(&view), 0);

        view.draw();
        assert!(!view.is_layout_stale());
        assert_eq!(fills(&view), 170);
    }

    #[test]
    fn test_click_maps_to_fraction_without_moving_progress() {
        let view = view(ViewOptions {
            width: 200,
            ..Default::default()
        });
        // container left edge at 20
        assert_eq!(view.on_click(120.0), Some(SeekRequest { fraction: 0.5 }));
        assert_eq!(view.on_click(0.0), Some(SeekRequest { fraction: 0.0 }));
        assert_eq!(view.on_click(900.0), Some(SeekRequest { fraction: 1.0 }));
        assert_eq!(view.progress(), 0.0);
    }

    #[test]
    fn test_click_ignored_without_interact() {
        let mut view = view(ViewOptions::default());
        let done = view.set_interact(false);
        assert!(done.listeners && !done.geometry && !done.redraw);
        assert_eq!(view.on_click(100.0), None);
        assert_eq!(view.host().listener_count(HostEvent::Click), 0);
    }

    #[test]
    fn test_resize_is_debounced_in_responsive_mode() {
        let mut view = view(ViewOptions {
            responsive: true,
            ..Default::default()
        });
        assert_eq!(view.rendered_width(), 300.0);

        let container = view.container();
        let start = Instant::now();
        view.host_mut().set_container_bounds(container, 0.0, 150.0);
        view.on_resize(start);
        view.on_resize(start + Duration::from_millis(50));

        assert!(!view.tick(start + Duration::from_millis(100)));
        assert_eq!(view.rendered_width(), 300.0);
        assert!(view.tick(start + Duration::from_millis(150)));
        assert_eq!(view.rendered_width(), 150.0);
    }

    #[test]
    fn test_canvas_bounds_drive_debounced_resize() {
        let mut view = view(ViewOptions {
            responsive: true,
            ..Default::default()
        });
        assert_eq!(view.tracked_bounds(), Some((20.0, 300.0)));

        let start = Instant::now();
        view.on_bounds(20.0, 240.0, start);
        assert_eq!(view.tracked_bounds(), Some((20.0, 240.0)));
        assert!(view.has_pending_resize());

        // Same bounds again do not push the deadline out
        view.on_bounds(20.0, 240.0, start + Duration::from_millis(80));
        assert!(view.tick(start + Duration::from_millis(100)));
        assert_eq!(view.rendered_width(), 240.0);
        assert_eq!(fills(&view), 0);

        view.set_data(AmplitudeSeries::new(vec![0.5; 240]));
        assert_eq!(fills(&view), 240 / 3);
    }

    #[test]
    fn test_fixed_view_does_not_track_bounds() {
        let mut view = view(ViewOptions::default());
        assert_eq!(view.tracked_bounds(), None);
        view.on_bounds(0.0, 100.0, Instant::now());
        assert!(!view.has_pending_resize());
        assert_eq!(view.rendered_width(), 512.0);
    }

    #[test]
    fn test_resize_ignored_in_fixed_mode() {
        let mut view = view(ViewOptions::default());
        let start = Instant::now();
        view.on_resize(start);
        assert!(!view.has_pending_resize());
        assert!(!view.tick(start + Duration::from_secs(1)));
        assert_eq!(view.rendered_width(), 512.0);
    }

    #[test]
    fn test_minimal_recompute_per_option() {
        let mut view = view(ViewOptions::default());
        view.set_data(AmplitudeSeries::new(vec![0.5; 100]));

        let done = view.set_gradient(false);
        assert_eq!(
            done,
            Recompute {
                redraw: true,
                ..Default::default()
            }
        );

        let done = view.set_wave_color("#ff0000").unwrap();
        assert!(done.colors && !done.geometry && !done.surface);
        assert_eq!(view.wave_colors().base, wavebar_core::color::Rgb::new(255, 0, 0));

        let done = view.set_bar_gap(2);
        assert!(done.geometry && !done.colors && !done.surface);
        assert_eq!(fills(&view), 512 / 4);

        let done = view.set_height(64);
        assert!(done.surface && !done.geometry);

        assert!(view.set_redraw(true).is_empty());
        assert!(view.set_progress_color("nope").is_err());
    }

    #[test]
    fn test_responsive_toggle_rewires_resize_listener() {
        let mut view = view(ViewOptions::default());
        assert_eq!(view.host().listener_count(HostEvent::Resize), 0);

        let done = view.set_responsive(true);
        assert!(done.listeners && done.surface && done.geometry);
        assert_eq!(view.host().listener_count(HostEvent::Resize), 1);
        assert_eq!(view.rendered_width(), 300.0);

        view.set_responsive(false);
        assert_eq!(view.host().listener_count(HostEvent::Resize), 0);
        assert_eq!(view.rendered_width(), 512.0);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut view = view(ViewOptions {
            responsive: true,
            ..Default::default()
        });
        let surface = view.surface().unwrap();
        view.destroy();
        view.destroy();

        assert_eq!(view.phase(), ViewPhase::Destroyed);
        assert!(!view.host().surface_exists(surface));
        assert_eq!(view.host().listener_count(HostEvent::Resize), 0);
        assert_eq!(view.host().listener_count(HostEvent::Click), 0);

        view.set_progress(0.5);
        assert_eq!(view.progress(), 0.0);
        assert_eq!(view.on_click(50.0), None);
    }
}

//! # interaction
//!
//! Pointer state machine: `Idle` tracks hover and the crosshair,
//! `Dragging` turns pointer movement into horizontal scroll. Wheel input
//! zooms in either state.

use crate::tooltip::{DEFAULT_TOOLTIP_SIZE, HoverSnapshot, place_tooltip};
use crate::{ChartHost, PRIMARY_BUTTON, PointerInput, WheelInput};
use kline_charts::{Crosshair, HIT_PADDING, MarkerId, PaneId, pane_at};
use kline_core::{Point, Size};

/// Horizontal tolerance around the bar centre for wick hits
pub const HIT_WICK_HALF: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer client X when the drag started
        anchor_x: f64,
        /// Container scroll offset when the drag started
        anchor_scroll: f64,
    },
}

/// Marker hover edge detected on a pointer move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTransition {
    Entered(MarkerId),
    Left(MarkerId),
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    drag: DragState,
    crosshair: Option<Crosshair>,
    hovered_index: Option<usize>,
    tooltip_pos: Point,
    tooltip_size: Size,
    marker_transition: Option<MarkerTransition>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            drag: DragState::Idle,
            crosshair: None,
            hovered_index: None,
            tooltip_pos: Point::default(),
            tooltip_size: DEFAULT_TOOLTIP_SIZE,
            marker_transition: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Crosshair to draw this frame, in plot-local coordinates
    pub fn crosshair(&self) -> Option<Crosshair> {
        self.crosshair
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered_index
    }

    pub fn active_pane(&self) -> Option<PaneId> {
        self.crosshair.and_then(|c| c.active_pane)
    }

    pub fn tooltip_pos(&self) -> Point {
        self.tooltip_pos
    }

    /// Marker hover edge produced by the most recent event, if any
    pub fn marker_transition(&self) -> Option<MarkerTransition> {
        self.marker_transition
    }

    pub fn set_tooltip_size(&mut self, size: Size) {
        self.tooltip_size = size;
    }

    pub fn snapshot(&self, host: &impl ChartHost) -> HoverSnapshot {
        HoverSnapshot {
            crosshair: self.crosshair,
            hovered_index: self.hovered_index,
            active_pane: self.active_pane(),
            tooltip: self.tooltip_pos,
            hovered_marker: host.chart().markers().hovered_id(),
        }
    }

    // ========================================================================
    // Pointer events
    // ========================================================================

    /// Start a drag on the primary button. Returns `true` when the event
    /// was consumed (the host should prevent the default action).
    pub fn on_pointer_down(&mut self, host: &mut impl ChartHost, event: PointerInput) -> bool {
        if event.button != PRIMARY_BUTTON {
            return false;
        }

        self.clear_hover(host);
        self.drag = DragState::Dragging {
            anchor_x: event.client_x,
            anchor_scroll: host.scroll_left(),
        };
        tracing::debug!(x = event.client_x, scroll_left = host.scroll_left(), "drag started");
        true
    }

    pub fn on_pointer_move(&mut self, host: &mut impl ChartHost, event: PointerInput) {
        if let DragState::Dragging { anchor_x, anchor_scroll } = self.drag {
            // grabbing the content: pointer left scrolls right
            let scroll_left = (anchor_scroll + (anchor_x - event.client_x)).max(0.0);
            host.set_scroll_left(scroll_left);
            return;
        }

        self.update_hover(host, event);
        host.schedule_draw();
    }

    pub fn on_pointer_up(&mut self) {
        if self.is_dragging() {
            tracing::debug!("drag finished");
        }
        self.drag = DragState::Idle;
    }

    pub fn on_pointer_leave(&mut self, host: &mut impl ChartHost) {
        self.drag = DragState::Idle;
        self.clear_hover(host);
        host.schedule_draw();
    }

    /// Native container scroll (scrollbar, trackpad, or a drag)
    pub fn on_scroll(&mut self, host: &mut impl ChartHost) {
        self.clear_hover(host);
        host.schedule_draw();
    }

    pub fn on_wheel(&mut self, host: &mut impl ChartHost, event: WheelInput) {
        let rect = host.container_rect();
        let anchor_x = event.client_x - rect.x;
        let scroll_left = host.scroll_left();

        self.clear_hover(host);
        let new_scroll = host.chart_mut().zoom_at(anchor_x, scroll_left, event.delta_y);
        let content_width = host.chart().content_width();
        host.set_content_width(content_width);
        host.set_scroll_left(new_scroll);
        host.schedule_draw();
    }

    // ========================================================================
    // Hover
    // ========================================================================

    fn clear_hover(&mut self, host: &mut impl ChartHost) {
        self.crosshair = None;
        self.hovered_index = None;
        self.set_marker_hover(host, None);
    }

    fn update_hover(&mut self, host: &mut impl ChartHost, event: PointerInput) {
        let rect = host.container_rect();
        let local_x = event.client_x - rect.x;
        let local_y = event.client_y - rect.y;

        let view = Size::new(rect.width.round().max(1.0), rect.height.round().max(1.0));
        let dims = host.chart().dimensions(view.width, view.height);
        let (plot_width, plot_height) = (dims.plot_width(), dims.plot_height());

        if !dims.in_plot(local_x, local_y) {
            self.clear_hover(host);
            return;
        }

        let options = host.chart().options();
        let (k_width, k_gap) = (options.k_width, options.k_gap);
        let unit = options.unit();
        let scroll_left = host.scroll_left();
        let world_x = scroll_left + local_x;
        let offset = world_x - k_gap;
        if offset < 0.0 {
            self.clear_hover(host);
            return;
        }

        let candidate = (offset / unit).floor() as usize;
        let bar_count = host.chart().series().len();
        let index = (candidate < bar_count).then_some(candidate);
        let active_pane = pane_at(host.chart().panes(), local_y).map(|p| p.id);

        let x = match index {
            Some(i) => k_gap + i as f64 * unit + k_width / 2.0 - scroll_left,
            None => local_x,
        };
        self.crosshair = Some(Crosshair {
            x: x.clamp(0.0, plot_width),
            y: local_y.clamp(0.0, plot_height),
            index,
            active_pane,
        });

        let marker = host
            .chart()
            .markers()
            .hit_test(world_x, local_y, HIT_PADDING)
            .map(|m| m.id);
        self.set_marker_hover(host, marker);

        let previous = self.hovered_index;
        self.hovered_index = match (index, active_pane) {
            (Some(i), Some(_)) if hits_candle(&*host, i, offset, local_y) => Some(i),
            _ => None,
        };
        if self.hovered_index != previous {
            tracing::trace!(index = ?self.hovered_index, "hovered bar changed");
        }

        if self.hovered_index.is_some() {
            self.tooltip_pos = place_tooltip(Point::new(local_x, local_y), view, self.tooltip_size);
        }
    }

    /// Push a marker hover to the registry and record the edge, if any.
    ///
    /// The registry is synced against its current hover, which a frame may
    /// have dropped; the last hover id only decides Entered/Left.
    fn set_marker_hover(&mut self, host: &mut impl ChartHost, id: Option<MarkerId>) {
        let markers = host.chart().markers();
        let (current, previous) = (markers.hovered_id(), markers.last_hover_id());
        self.marker_transition = match (previous, id) {
            (previous, id) if previous == id => None,
            (_, Some(entered)) => Some(MarkerTransition::Entered(entered)),
            (Some(left), None) => Some(MarkerTransition::Left(left)),
            (None, None) => None,
        };

        if current != id || previous != id {
            host.chart_mut().set_hovered_marker(id);
            tracing::trace!(transition = ?self.marker_transition, ?id, "marker hover");
            host.schedule_draw();
        }
    }
}

/// Body or wick of bar `index` under the pointer. `offset` is the world X
/// minus the leading gap; `canvas_y` is plot local.
fn hits_candle(host: &impl ChartHost, index: usize, offset: f64, canvas_y: f64) -> bool {
    let chart = host.chart();
    let (Some(bar), Some(pane)) = (chart.series().get(index), pane_at(chart.panes(), canvas_y)) else {
        return false;
    };

    let options = chart.options();
    let local_y = canvas_y - pane.top;
    let open_y = pane.price_to_y(bar.open);
    let close_y = pane.price_to_y(bar.close);
    let high_y = pane.price_to_y(bar.high);
    let low_y = pane.price_to_y(bar.low);
    let (body_top, body_bottom) = (open_y.min(close_y), open_y.max(close_y));

    let in_unit_x = offset - index as f64 * options.unit();
    let center = options.k_width / 2.0;

    let hit_body =
        local_y >= body_top && local_y <= body_bottom && in_unit_x >= 0.0 && in_unit_x <= options.k_width;
    let hit_wick = (in_unit_x - center).abs() <= HIT_WICK_HALF && local_y >= high_y && local_y <= low_y;
    hit_body || hit_wick
}

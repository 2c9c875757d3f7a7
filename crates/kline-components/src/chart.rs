//! `KLineChart` component and its browser host

use crate::BarTooltip;
use kline_charts::{CanvasSurface, Chart, ChartOptions, FrameInput};
use kline_core::{Bar, Rect};
use kline_state::{ChartHost, HoverSnapshot, InteractionController, PointerInput, WheelInput};
use leptos::html;
use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

// ============================================================================
// BROWSER HOST
// ============================================================================

/// [`ChartHost`] over the DOM scroll container and spacer
pub struct WebHost {
    chart: Chart,
    container: Option<HtmlElement>,
    spacer: Option<HtmlElement>,
    surface: Option<CanvasSurface>,
    /// CSS size and dpr the canvas backing store was last sized for
    backing: (f64, f64, f64),
    needs_draw: bool,
}

impl WebHost {
    pub fn new(chart: Chart) -> Self {
        Self {
            chart,
            container: None,
            spacer: None,
            surface: None,
            backing: (0.0, 0.0, 0.0),
            needs_draw: false,
        }
    }

    fn attach(&mut self, container: HtmlElement, spacer: HtmlElement, canvas: HtmlCanvasElement) {
        if self.surface.is_none() {
            match CanvasSurface::from_canvas(canvas) {
                Ok(surface) => self.surface = Some(surface),
                Err(err) => tracing::warn!(%err, "canvas unavailable, chart will not draw"),
            }
        }
        self.container = Some(container);
        self.spacer = Some(spacer);
    }

    /// Draw one frame with `crosshair` from the controller
    fn paint(&mut self, controller: &InteractionController) {
        let rect = self.container_rect();
        let scroll_left = self.scroll_left();
        let dpr = window().device_pixel_ratio();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let (width, height) = (rect.width.round().max(1.0), rect.height.round().max(1.0));
        if self.backing != (width, height, dpr) {
            surface.resize(width, height, dpr);
            self.backing = (width, height, dpr);
        }

        surface.begin_frame(width, height);
        let input = FrameInput::new(width, height)
            .scroll_left(scroll_left)
            .dpr(dpr)
            .crosshair(controller.crosshair());
        self.chart.draw(surface, &input);
    }
}

impl ChartHost for WebHost {
    fn chart(&self) -> &Chart {
        &self.chart
    }

    fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }

    fn scroll_left(&self) -> f64 {
        self.container.as_ref().map_or(0.0, |c| c.scroll_left() as f64)
    }

    fn set_scroll_left(&mut self, scroll_left: f64) {
        if let Some(container) = &self.container {
            container.set_scroll_left(scroll_left.round() as i32);
        }
    }

    fn container_rect(&self) -> Rect {
        self.container.as_ref().map_or_else(Rect::default, |c| {
            let r = c.get_bounding_client_rect();
            Rect::new(r.left(), r.top(), r.width(), r.height())
        })
    }

    fn set_content_width(&mut self, width: f64) {
        if let Some(spacer) = &self.spacer {
            if let Err(err) = spacer.style().set_property("width", &format!("{}px", width)) {
                tracing::trace!(?err, "spacer resize failed");
            }
        }
    }

    fn schedule_draw(&mut self) {
        self.needs_draw = true;
    }
}

struct ChartView {
    host: WebHost,
    controller: InteractionController,
    frame_pending: bool,
}

type SharedView = Rc<RefCell<ChartView>>;

/// Run `f` against the controller and host, publish the hover state and
/// request a frame if anything asked for one
fn dispatch(
    view: &SharedView,
    hover: RwSignal<HoverSnapshot>,
    f: impl FnOnce(&mut InteractionController, &mut WebHost),
) {
    let snapshot = {
        let mut state = view.borrow_mut();
        let ChartView { host, controller, .. } = &mut *state;
        f(controller, host);
        controller.snapshot(&*host)
    };
    if hover.get_untracked() != snapshot {
        hover.set(snapshot);
    }
    request_frame(view);
}

/// Coalesce draw requests into one `requestAnimationFrame` callback
fn request_frame(view: &SharedView) {
    {
        let mut state = view.borrow_mut();
        if !state.host.needs_draw || state.frame_pending {
            return;
        }
        state.frame_pending = true;
    }

    let view = Rc::clone(view);
    request_animation_frame(move || {
        let mut state = view.borrow_mut();
        state.frame_pending = false;
        state.host.needs_draw = false;
        let ChartView { host, controller, .. } = &mut *state;
        host.paint(controller);
    });
}

fn pointer(ev: &MouseEvent) -> PointerInput {
    PointerInput::new(ev.client_x() as f64, ev.client_y() as f64).with_button(ev.button())
}

// ============================================================================
// COMPONENT
// ============================================================================

#[component]
pub fn KLineChart(
    #[prop(into)] data: Signal<Vec<Bar>>,
    #[prop(optional)] options: Option<ChartOptions>,
) -> impl IntoView {
    let chart = match Chart::new(options.unwrap_or_default()) {
        Ok(chart) => chart,
        Err(err) => {
            tracing::warn!(%err, "invalid chart options");
            return view! { <div class="kline-chart kline-error">{err.to_string()}</div> }.into_any();
        }
    };

    let container_ref = NodeRef::<html::Div>::new();
    let spacer_ref = NodeRef::<html::Div>::new();
    let canvas_ref = NodeRef::<html::Canvas>::new();
    let hover = RwSignal::new(HoverSnapshot::default());

    let view_state: SharedView = Rc::new(RefCell::new(ChartView {
        host: WebHost::new(chart),
        controller: InteractionController::new(),
        frame_pending: false,
    }));

    // data changes: attach on first run, replace bars, resize the spacer
    {
        let view_state = Rc::clone(&view_state);
        Effect::new(move |_| {
            let bars = data.get();
            let (Some(container), Some(spacer), Some(canvas)) =
                (container_ref.get(), spacer_ref.get(), canvas_ref.get())
            else {
                return;
            };

            {
                let mut state = view_state.borrow_mut();
                let host = &mut state.host;
                host.attach(container.into(), spacer.into(), canvas);
                host.chart_mut().set_data(bars);
                let width = host.chart().content_width();
                host.set_content_width(width);
                host.schedule_draw();
            }
            request_frame(&view_state);
        });
    }

    let on_mouse_down = {
        let view_state = Rc::clone(&view_state);
        move |ev: MouseEvent| {
            dispatch(&view_state, hover, |controller, host| {
                if controller.on_pointer_down(host, pointer(&ev)) {
                    ev.prevent_default();
                }
            });
        }
    };
    let on_mouse_move = {
        let view_state = Rc::clone(&view_state);
        move |ev: MouseEvent| {
            dispatch(&view_state, hover, |controller, host| {
                controller.on_pointer_move(host, pointer(&ev));
            });
        }
    };
    let on_mouse_up = {
        let view_state = Rc::clone(&view_state);
        move |_: MouseEvent| {
            dispatch(&view_state, hover, |controller, _| controller.on_pointer_up());
        }
    };
    let on_mouse_leave = {
        let view_state = Rc::clone(&view_state);
        move |_: MouseEvent| {
            dispatch(&view_state, hover, |controller, host| controller.on_pointer_leave(host));
        }
    };
    let on_scroll = {
        let view_state = Rc::clone(&view_state);
        move |_: web_sys::Event| {
            dispatch(&view_state, hover, |controller, host| controller.on_scroll(host));
        }
    };
    let on_wheel = {
        let view_state = Rc::clone(&view_state);
        move |ev: WheelEvent| {
            ev.prevent_default();
            let input = WheelInput {
                client_x: ev.client_x() as f64,
                client_y: ev.client_y() as f64,
                delta_y: ev.delta_y(),
            };
            dispatch(&view_state, hover, |controller, host| controller.on_wheel(host, input));
        }
    };

    let tooltip = move || {
        let snapshot = hover.get();
        let index = snapshot.hovered_index?;
        let bar = data.with(|bars| bars.get(index).copied())?;
        Some(view! { <BarTooltip bar=bar position=snapshot.tooltip /> })
    };

    view! {
        <div class="kline-chart" style="position: relative; width: 100%; height: 100%">
            <div
                class="kline-scroll"
                node_ref=container_ref
                style="position: absolute; inset: 0; overflow-x: auto; overflow-y: hidden"
                on:mousedown=on_mouse_down
                on:mousemove=on_mouse_move
                on:mouseup=on_mouse_up
                on:mouseleave=on_mouse_leave
                on:scroll=on_scroll
                on:wheel=on_wheel
            >
                <div class="kline-spacer" node_ref=spacer_ref style="height: 100%">
                    <canvas
                        node_ref=canvas_ref
                        style="position: sticky; left: 0; top: 0; display: block"
                    ></canvas>
                </div>
            </div>
            {tooltip}
        </div>
    }
    .into_any()
}

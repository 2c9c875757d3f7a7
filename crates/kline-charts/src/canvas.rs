//! # canvas
//!
//! [`Surface`] back end over an HTML `<canvas>` 2D context.

use crate::surface::{Surface, TextAlign, TextBaseline};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("canvas has no 2d context")]
    NoContext,

    #[error("2d context request failed: {0}")]
    ContextRequest(String),

    #[error("context object is not a CanvasRenderingContext2D")]
    WrongContextType,
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Drop a canvas call error after logging it
fn swallow(op: &'static str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        tracing::trace!(op, error = %js_message(&err), "canvas call failed");
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|err| SurfaceError::ContextRequest(js_message(&err)))?
            .ok_or(SurfaceError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::WrongContextType)?;

        Ok(Self { canvas, ctx, dpr: 1.0 })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Size the backing store to `css * dpr` device pixels and the CSS box to
    /// `css`. Only touches the canvas when something changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        let width = (css_width * dpr).round().max(1.0) as u32;
        let height = (css_height * dpr).round().max(1.0) as u32;

        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            let style = self.canvas.style();
            swallow("style.width", style.set_property("width", &format!("{}px", css_width)));
            swallow("style.height", style.set_property("height", &format!("{}px", css_height)));
            tracing::debug!(width, height, dpr, "resized canvas backing store");
        }
        self.dpr = dpr;
    }

    /// Reset the transform to the `dpr` scale and clear the logical area
    pub fn begin_frame(&mut self, css_width: f64, css_height: f64) {
        swallow(
            "set_transform",
            self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0),
        );
        self.ctx.clear_rect(0.0, 0.0, css_width, css_height);
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        swallow("translate", self.ctx.translate(x, y));
    }

    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.begin_path();
        self.ctx.rect(x, y, width, height);
        self.ctx.clip();
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        let array: js_sys::Array = segments.iter().map(|v| JsValue::from_f64(*v)).collect();
        swallow("set_line_dash", self.ctx.set_line_dash(&array));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.stroke_rect(x, y, width, height);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        swallow("arc", self.ctx.arc(x, y, radius, start_angle, end_angle));
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ctx.set_text_align(align.as_str());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.ctx.set_text_baseline(baseline.as_str());
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        swallow("fill_text", self.ctx.fill_text(text, x, y));
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(err) => {
                tracing::trace!(error = %js_message(&err), "measure_text failed");
                0.0
            }
        }
    }
}

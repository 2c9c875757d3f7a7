//! Hover tooltip for one bar

use kline_core::{
    Bar, CompactVolumeFormatter, DecimalPriceFormatter, Point, PriceFormatter, VolumeFormatter, date_label,
};
use leptos::prelude::*;

#[component]
pub fn BarTooltip(bar: Bar, position: Point) -> impl IntoView {
    let prices = DecimalPriceFormatter::default();
    let color = bar.fill_color();
    let change = if bar.open != 0.0 {
        format!("{:+.2}%", bar.change() / bar.open * 100.0)
    } else {
        "-".to_string()
    };

    let rows = [
        ("Open", prices.format(bar.open)),
        ("High", prices.format(bar.high)),
        ("Low", prices.format(bar.low)),
        ("Close", prices.format(bar.close)),
        ("Change", change),
        ("Volume", CompactVolumeFormatter.format(bar.volume)),
    ];

    view! {
        <div
            class="kline-tooltip"
            style=format!(
                "position: absolute; left: {}px; top: {}px; pointer-events: none",
                position.x,
                position.y,
            )
        >
            <div class="kt-date">{date_label(bar.timestamp).unwrap_or_default()}</div>
            {rows
                .into_iter()
                .map(|(label, value)| {
                    view! {
                        <div class="kt-row">
                            <span class="kt-label">{label}</span>
                            <span class="kt-value" style=format!("color: {}", color)>{value}</span>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}

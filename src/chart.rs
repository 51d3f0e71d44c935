// src/chart.rs
//
// Thin adapter from an aggregated long-format series to a Vega-Lite line
// chart description. No business logic lives here, only parameter wiring;
// rendering is the consumer's problem.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// One (group, time, amount) observation, already aggregated upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesPoint {
    pub group: String,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Build a Vega-Lite spec: one line per group, a legend-bound selection
/// that highlights the clicked line and dims the rest, and tooltips over
/// group/time/amount. `interactive` adds scale-bound pan/zoom; `title`
/// defaults to `"{group_col} over time"`.
///
/// The y axis is always the `amount` field, so neither `group_col` nor
/// `time_col` may be named `"amount"`; the data rows would collide.
pub fn render_timeseries(
    points: &[TimeseriesPoint],
    group_col: &str,
    time_col: &str,
    interactive: bool,
    title: Option<&str>,
) -> Value {
    debug_assert_ne!(group_col, "amount", "group column would shadow the y axis");
    debug_assert_ne!(time_col, "amount", "time column would shadow the y axis");

    let values: Vec<Value> = points
        .iter()
        .map(|p| {
            let mut row = Map::new();
            row.insert(group_col.to_string(), Value::String(p.group.clone()));
            row.insert(
                time_col.to_string(),
                Value::String(p.date.format("%Y-%m-%d").to_string()),
            );
            row.insert("amount".to_string(), json!(p.amount));
            Value::Object(row)
        })
        .collect();

    let mut params = vec![json!({
        "name": "highlight",
        "select": {"type": "point", "fields": [group_col]},
        "bind": "legend",
    })];
    if interactive {
        params.push(json!({
            "name": "view_pan_zoom",
            "select": "interval",
            "bind": "scales",
        }));
    }

    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "title": title.map(str::to_string).unwrap_or_else(|| format!("{group_col} over time")),
        "width": 800,
        "height": 300,
        "data": {"values": values},
        "mark": {"type": "line", "point": true},
        "params": params,
        "encoding": {
            "x": {"field": time_col, "type": "temporal"},
            "y": {"field": "amount", "type": "quantitative"},
            "color": {
                "field": group_col,
                "type": "nominal",
                "scale": {"scheme": "tableau20"},
            },
            "strokeDash": {"field": group_col, "type": "nominal"},
            "tooltip": [
                {"field": group_col, "type": "nominal"},
                {"field": time_col, "type": "temporal"},
                {"field": "amount", "type": "quantitative"},
            ],
            "opacity": {
                "condition": {"param": "highlight", "value": 1.0},
                "value": 0.2,
            },
        },
        "config": {"legend": {"labelLimit": 0}},
    })
}

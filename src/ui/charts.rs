use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::dashboard::ChartResult;
use crate::data::error::ChartError;
use crate::data::stats::Histogram;

const CHART_HEIGHT: f32 = 220.0;

/// Show a chart or, if it failed, its error in place of the chart.
pub fn fault_isolated<T>(ui: &mut Ui, title: &str, result: &ChartResult<T>, draw: impl FnOnce(&mut Ui, &T)) {
    match result {
        Ok(data) => draw(ui, data),
        Err(e) => chart_error(ui, title, e),
    }
}

fn chart_error(ui: &mut Ui, title: &str, error: &ChartError) {
    ui.label(RichText::new(format!("Error in {title}: {error}")).color(Color32::RED));
}

// ---------------------------------------------------------------------------
// Distribution histogram
// ---------------------------------------------------------------------------

/// Bars for the bin counts with the density curve on top.
pub fn histogram_plot(ui: &mut Ui, id: &str, title: &str, histogram: &Histogram) {
    ui.strong(title);
    let bars: Vec<Bar> = histogram
        .bins
        .iter()
        .map(|bin| {
            let width = bin.range.end - bin.range.start;
            Bar::new(bin.range.start + width / 2.0, bin.count as f64)
                .width(width)
                .name(format!("{:.1} to {:.1}", bin.range.start, bin.range.end))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(76, 114, 176)));
            if !histogram.density.is_empty() {
                let points: PlotPoints = histogram.density.iter().copied().collect();
                plot_ui.line(Line::new(points).color(Color32::from_rgb(221, 132, 82)).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Average stay by condition
// ---------------------------------------------------------------------------

pub fn stay_by_condition_plot(ui: &mut Ui, groups: &[(String, Option<f64>)], color_for: impl Fn(&str) -> Color32) {
    let labels: Vec<String> = groups.iter().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, (condition, mean))| {
            mean.map(|m| {
                Bar::new(i as f64, m)
                    .width(0.7)
                    .name(condition)
                    .fill(color_for(condition))
            })
        })
        .collect();

    Plot::new("stay_by_condition")
        .height(CHART_HEIGHT + 60.0)
        .x_axis_label("Medical Condition")
        .y_axis_label("Length of Stay (days)")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Pie of value counts with a percentage legend.
pub fn pie_chart(ui: &mut Ui, counts: &[(String, usize)], color_for: impl Fn(&str) -> Color32) {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return;
    }
    ui.horizontal(|ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(CHART_HEIGHT, CHART_HEIGHT), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = rect.width().min(rect.height()) / 2.0 - 4.0;

        // Start at twelve o'clock and go counter-clockwise.
        let mut angle = -TAU / 4.0;
        for (label, count) in counts {
            let sweep = TAU * *count as f32 / total as f32;
            let color = color_for(label);
            let steps = ((sweep / TAU) * 96.0).ceil().max(1.0) as usize;
            for step in 0..steps {
                let a0 = angle - sweep * step as f32 / steps as f32;
                let a1 = angle - sweep * (step + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![center, point_on_circle(center, radius, a0), point_on_circle(center, radius, a1)],
                    color,
                    Stroke::NONE,
                ));
            }
            angle -= sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, count) in counts {
                let pct = *count as f64 / total as f64 * 100.0;
                ui.label(RichText::new(format!("■ {label}: {pct:.1}% ({count})")).color(color_for(label)));
            }
        });
    });
}

fn point_on_circle(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + radius * egui::vec2(angle.cos(), angle.sin())
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::dashboard::Dashboard;
use crate::data::error::ViewError;
use crate::data::filter::CategoricalColumn;
use crate::data::stats::{ColumnSummary, KeyMetrics};
use crate::state::{AppState, Rendered};
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CareDashApp {
    pub state: AppState,
}

impl CareDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CareDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| dashboard_page(ui, &mut self.state));
        });
    }
}

// ---------------------------------------------------------------------------
// Central page
// ---------------------------------------------------------------------------

fn dashboard_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Healthcare Data Dashboard");

    let rendered = match &state.current {
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view encounters  (File → Open…)");
            });
            return;
        }
        Some(Err(ViewError::EmptyResult)) => {
            let (rows, cols) = state.shape();
            section(ui, "Filter Diagnostics");
            ui.label(format!("Filtered data shape: ({rows}, {cols})"));
            ui.label(
                RichText::new("No data found for the selected filters. Please adjust your selections.")
                    .color(Color32::from_rgb(230, 160, 30)),
            );
            return;
        }
        Some(Ok(rendered)) => rendered,
    };

    let Rendered { dashboard, .. } = rendered;
    let (rows, cols) = dashboard.shape;
    section(ui, "Filter Diagnostics");
    ui.label(format!("Filtered data shape: ({rows}, {cols})"));

    section(ui, "Filtered Data Preview");
    preview_table(ui, dashboard);

    section(ui, "Summary Statistics");
    summary_grid(ui, &dashboard.summary);

    section(ui, "Key Metrics");
    metrics_row(ui, &dashboard.metrics);

    section(ui, "Distributions");
    ui.columns(dashboard.distributions.len().max(1), |columns| {
        for (ui, dist) in columns.iter_mut().zip(&dashboard.distributions) {
            charts::fault_isolated(ui, dist.title, &dist.histogram, |ui, h| {
                charts::histogram_plot(ui, &format!("hist_{}", dist.title), dist.title, h);
            });
        }
    });

    section(ui, "Average Length of Stay by Condition");
    charts::fault_isolated(ui, "bar chart", &dashboard.stay_by_condition, |ui, groups| {
        charts::stay_by_condition_plot(ui, groups, |label| {
            state
                .color_for(CategoricalColumn::MedicalCondition, label)
                .unwrap_or(Color32::GRAY)
        });
    });

    section(ui, "Survival Distribution");
    charts::fault_isolated(ui, "survival pie chart", &dashboard.survival_counts, |ui, counts| {
        charts::pie_chart(ui, counts, |label| {
            state
                .color_for(CategoricalColumn::Survived, label)
                .unwrap_or(Color32::GRAY)
        });
    });

    section(ui, "Readmission Distribution");
    charts::fault_isolated(ui, "readmission pie chart", &dashboard.readmission_counts, |ui, counts| {
        charts::pie_chart(ui, counts, |label| {
            state
                .color_for(CategoricalColumn::Readmission, label)
                .unwrap_or(Color32::GRAY)
        });
    });

    section(ui, "Download Filtered Data");
    if ui.button("Download as CSV").clicked() {
        panels::save_file_dialog(state);
    }
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
    ui.separator();
}

fn preview_table(ui: &mut Ui, dashboard: &Dashboard) {
    ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), dashboard.columns.len())
            .header(20.0, |mut header| {
                for name in &dashboard.columns {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for row in &dashboard.preview {
                    body.row(18.0, |mut table_row| {
                        for cell in row {
                            table_row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}

const SUMMARY_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

fn summary_grid(ui: &mut Ui, summary: &[ColumnSummary]) {
    if summary.is_empty() {
        ui.label("No numeric columns.");
        return;
    }

    egui::Grid::new("summary_stats")
        .striped(true)
        .num_columns(summary.len() + 1)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in summary {
                ui.strong(&col.column);
            }
            ui.end_row();

            for name in SUMMARY_ROWS {
                ui.strong(name);
                for col in summary {
                    ui.label(summary_cell(col, name));
                }
                ui.end_row();
            }
        });
}

fn summary_cell(col: &ColumnSummary, row: &str) -> String {
    if row == "count" {
        return col.count.to_string();
    }
    let value = col.stats.as_ref().and_then(|s| match row {
        "mean" => Some(s.mean),
        "std" => s.std,
        "min" => Some(s.min),
        "25%" => Some(s.q25),
        "50%" => Some(s.median),
        "75%" => Some(s.q75),
        _ => Some(s.max),
    });
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

fn metrics_row(ui: &mut Ui, metrics: &KeyMetrics) {
    let billing = metrics
        .avg_billing
        .map_or_else(|| "n/a".to_string(), |v| format!("₹{v:.2}"));
    let stay = metrics
        .avg_length_of_stay
        .map_or_else(|| "n/a".to_string(), |v| format!("{v:.1} days"));
    let cards = [
        ("Total Patients", metrics.count.to_string()),
        ("Avg Billing Amount", billing),
        ("Avg Length of Stay", stay),
        ("Survival Rate", format!("{:.1}%", metrics.survival_rate)),
    ];
    ui.columns(cards.len(), |columns| {
        for (ui, (label, value)) in columns.iter_mut().zip(cards) {
            ui.label(label);
            ui.label(RichText::new(value).size(24.0).strong());
        }
    });
}

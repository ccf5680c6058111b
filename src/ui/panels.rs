use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::CategoricalColumn;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the sidebar with one multi-select per categorical column.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in CategoricalColumn::ALL {
                let all_values = table.distinct_strings(column.column_name());

                // Show count of selected / total in the header
                let n_selected = state.selection.get(column).len();
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", column.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.column_name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(column);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(column);
                            }
                        });

                        for value in &all_values {
                            let mut checked = state.selection.get(column).contains(value);
                            let mut text = RichText::new(value);
                            if let Some(color) = state.color_for(column, value) {
                                text = text.color(color);
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(column, value);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.view().is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let visible = state.view().map_or(0, |v| v.len());
            ui.label(format!("{} records loaded, {visible} visible", table.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open healthcare data")
        .add_filter("Supported files", &["csv", "txt", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open(&path) {
            log::error!("Failed to load {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

/// Offer the current filtered view as a CSV download.
pub fn save_file_dialog(state: &mut AppState) {
    let Some(view) = state.view() else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(state.config.export_file_name.as_str())
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let result = crate::export::save_csv(view, &path);
    state.status_message = match result {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            Some(format!("Export failed: {e:#}"))
        }
    };
}

/// egui widgets: filter sidebar, top bar and chart renderers.
pub mod charts;
pub mod panels;

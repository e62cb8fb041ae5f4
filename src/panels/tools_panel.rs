use crate::SketchApp;
use crate::components::ToolButton;
use crate::tools::ToolKind;

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active_tool = app.engine().state().active_tool();
            ui.horizontal_wrapped(|ui| {
                for tool in ToolKind::ALL {
                    let button = ToolButton::new(tool, tool == active_tool);
                    if button.show(ui).on_hover_text(tool.name()).clicked() {
                        app.set_tool(tool);
                    }
                }
            });
            ui.separator();

            // Eraser ignores color, so the picker is disabled for it
            ui.horizontal(|ui| {
                ui.label("Color:");
                let mut color = app.engine().state().color();
                ui.add_enabled_ui(active_tool != ToolKind::Eraser, |ui| {
                    if egui::color_picker::color_edit_button_srgba(
                        ui,
                        &mut color,
                        egui::color_picker::Alpha::Opaque,
                    )
                    .changed()
                    {
                        app.set_color(color);
                    }
                });
            });

            let mut size = app.engine().state().brush_size();
            if ui
                .add(egui::Slider::new(&mut size, 1.0..=50.0).text("Size"))
                .changed()
            {
                app.set_brush_size(size);
            }
            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.engine().history().can_undo();
                let can_redo = app.engine().history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
                if ui.button("Clear").clicked() {
                    app.clear();
                }
            });

            if ui.button("💾 Save PNG").clicked() {
                app.export();
            }
            if let Some(status) = app.status() {
                ui.label(status);
            }
            ui.separator();

            let history = app.engine().history();
            ui.horizontal(|ui| {
                ui.label(format!("Undo stack size: {}", history.undo_len()));
                ui.label(format!("Redo stack size: {}", history.redo_len()));
            });
            ui.label(format!(
                "History memory: {:.1} MiB",
                history.memory_bytes() as f64 / (1024.0 * 1024.0)
            ));
            let surface = app.surface();
            ui.label(format!("Canvas: {}×{}", surface.width(), surface.height()));
        });
}

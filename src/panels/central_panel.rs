use crate::SketchApp;
use crate::viewport::ContainerLayout;

pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(egui::Color32::WHITE))
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let canvas_rect = response.rect;

            let layout = ContainerLayout::new(canvas_rect.size(), ctx.pixels_per_point());
            app.sync_viewport(ctx, layout);

            app.handle_input(ctx, canvas_rect);

            app.paint_canvas(ctx, &painter, canvas_rect);
        });
}

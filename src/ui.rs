use egui::Context;

use crate::controller::frame_loop::HudInfo;
use crate::controller::movement::MovementMode;
use crate::model::InfoPanel;

/// Raw input for one overlay pass on a canvas of the given pixel size
pub fn raw_input(width: u32, height: u32, now_ms: f64, events: Vec<egui::Event>) -> egui::RawInput {
    egui::RawInput {
        time: Some(now_ms / 1000.0),
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(width as f32, height as f32),
        )),
        events,
        ..Default::default()
    }
}

/// Build the complete UI and return egui output
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, panel: &InfoPanel, hud: &HudInfo) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_info_panel(ctx, panel);
        draw_debug_window(ctx, hud);
    })
}

fn draw_info_panel(ctx: &Context, panel: &InfoPanel) {
    if !panel.visible {
        return;
    }
    egui::Area::new(egui::Id::new("info_panel"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&panel.text).size(18.0).strong());
                });
        });
}

fn vehicle_status(hud: &HudInfo) -> &'static str {
    if hud.vehicle_loaded {
        "ready"
    } else if hud.load_failed {
        "failed"
    } else {
        "loading"
    }
}

fn draw_debug_window(ctx: &Context, hud: &HudInfo) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .default_open(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", hud.fps)).small());
            ui.label(egui::RichText::new(format!("Mode: {}", hud.mode.label())).small());
            ui.label(egui::RichText::new(format!("Vehicle: {}", vehicle_status(hud))).small());
            ui.label(egui::RichText::new(format!("Hover: {}", hud.hovered)).small());
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            match hud.mode {
                MovementMode::Orbit => {
                    ui.label(egui::RichText::new("W / Up - Drive around the loop").small());
                }
                MovementMode::FreeDrive => {
                    ui.label(egui::RichText::new("W S / Up Down - Throttle").small());
                    ui.label(egui::RichText::new("A D / Left Right - Steer").small());
                }
            }
            ui.label(egui::RichText::new("M - Toggle movement mode").small());
            ui.label(egui::RichText::new("Drag - Orbit camera, Wheel - Zoom").small());
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hud() -> HudInfo {
        HudInfo {
            mode: MovementMode::Orbit,
            fps: 60.0,
            hovered: false,
            vehicle_loaded: false,
            load_failed: false,
        }
    }

    #[test]
    fn test_vehicle_status_labels() {
        assert_eq!(vehicle_status(&hud()), "loading");
        assert_eq!(vehicle_status(&HudInfo { load_failed: true, ..hud() }), "failed");
        assert_eq!(vehicle_status(&HudInfo { vehicle_loaded: true, ..hud() }), "ready");
    }

    #[test]
    fn test_build_ui_runs_headless() {
        let ctx = Context::default();
        let panel = InfoPanel { visible: true, text: "Первая точка".into() };
        // First pass only measures new areas
        build_ui(&ctx, raw_input(800, 600, 0.0, Vec::new()), &panel, &hud());
        let output = build_ui(&ctx, raw_input(800, 600, 16.0, Vec::new()), &panel, &hud());
        assert!(!output.shapes.is_empty());
    }
}

use crate::AppState;
use boxscene_scene::Scene;
use boxscene_tools::{Control, ControlValue, Folder, SceneInspector};

/// Draw the debug side panel. Edits write straight through to the scene and
/// show up on the next frame.
pub(crate) fn draw(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_panel {
        return;
    }

    egui::SidePanel::right("debug_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading(state.panel.title());
            ui.separator();
            draw_folder(ui, state.panel.root(), &mut state.scene);

            ui.separator();
            egui::CollapsingHeader::new("Inspector")
                .default_open(false)
                .show(ui, |ui| {
                    ui.label(SceneInspector::summary(&state.scene).to_string());
                    for info in SceneInspector::list_nodes(&state.scene) {
                        ui.monospace(format!("{} {} ({})", info.id, info.name, info.kind));
                    }
                    let controls = state.driver.controller();
                    let p = state.camera.position;
                    ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                    ui.label(format!("Distance: {:.2}", controls.distance()));
                    if let Some(size) = state.viewport.size() {
                        ui.label(format!("Viewport: {size} (aspect {:.3})", state.camera.aspect));
                    }
                    ui.label(format!("Frame: {}", state.driver.frame_count()));
                });

            ui.separator();
            ui.small("F1: Toggle panel | LMB: Orbit | RMB: Pan | Wheel: Zoom");
        });
}

fn draw_folder(ui: &mut egui::Ui, folder: &Folder, scene: &mut Scene) {
    for control in &folder.controls {
        draw_control(ui, control, scene);
    }
    for sub in &folder.folders {
        egui::CollapsingHeader::new(sub.title.as_str())
            .default_open(true)
            .show(ui, |ui| draw_folder(ui, sub, scene));
    }
}

fn draw_control(ui: &mut egui::Ui, control: &Control, scene: &mut Scene) {
    let value = match control.read(scene) {
        Ok(value) => value,
        Err(e) => {
            ui.colored_label(egui::Color32::RED, e.to_string());
            return;
        }
    };

    let edited = match value {
        ControlValue::Number(mut v) => {
            let bounds = control.bounds().unwrap_or_default();
            let response = match (bounds.min, bounds.max) {
                (Some(min), Some(max)) => {
                    let mut slider = egui::Slider::new(&mut v, min..=max).text(control.label.as_str());
                    if let Some(step) = bounds.step {
                        slider = slider.step_by(f64::from(step));
                    }
                    ui.add(slider)
                }
                _ => {
                    ui.horizontal(|ui| {
                        ui.label(control.label.as_str());
                        ui.add(egui::DragValue::new(&mut v).speed(bounds.step.unwrap_or(0.01)))
                    })
                    .inner
                }
            };
            response.changed().then_some(ControlValue::Number(v))
        }
        ControlValue::Bool(mut b) => ui
            .checkbox(&mut b, control.label.as_str())
            .changed()
            .then_some(ControlValue::Bool(b)),
    };

    if let Some(value) = edited {
        if let Err(e) = control.write(scene, value) {
            tracing::warn!(error = %e, "panel write rejected");
        }
    }
}

use eframe::egui;

use crate::engine::behavior;
use crate::engine::world::World;
use crate::model::entity::Task;

/// Roster of villagers with their current mode, health and memories.
pub fn draw_left_panel(ctx: &egui::Context, world: &World) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Villagers");
            ui.weak(format!("Tick {}", world.ticks()));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for villager in &world.villagers {
                    let state = behavior::classify(villager);
                    ui.label(format!(
                        "{} ({}/{} HP, {})",
                        villager.name,
                        villager.hp.max(0),
                        villager.max_hp,
                        state.label()
                    ));

                    if let Some(Task::GoTo { destination, .. }) = &villager.current_task {
                        ui.weak(format!("Heading to {destination}"));
                    }

                    ui.collapsing(format!("{} remembers", villager.name), |ui| {
                        if villager.memory.is_empty() {
                            ui.label("Nothing yet");
                        } else {
                            for entry in villager.memory.iter() {
                                ui.label(format!("• {entry}"));
                            }
                        }
                    });

                    ui.add_space(6.0);
                }
            });
        });
}

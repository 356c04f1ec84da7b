use eframe::egui;
use egui::{pos2, vec2, Align2, FontId, Painter, Pos2};

use crate::engine::world::World;
use crate::model::entity::Villager;
use crate::model::geometry::Rect;
use crate::ui::app::Theme;

const INSTRUCTIONS: [&str; 4] = [
    "Arrow Keys/WASD: Move",
    "E: Talk to villager in front",
    "P: Attack villager in front",
    "Commands: 'follow me', 'stop following', 'go to house X'",
];

pub fn draw_center_panel(ctx: &egui::Context, world: &World, theme: &Theme) {
    // ---------- Conversation ----------
    if world.dialog.is_active() {
        egui::TopBottomPanel::bottom("dialog").show(ctx, |ui| {
            let dialog = &world.dialog;
            ui.heading(&dialog.title);

            for line in dialog.response_text.lines().take(3) {
                ui.colored_label(theme.response, line);
            }

            ui.label(format!("You: {}|", dialog.input_text));
            ui.weak("Type your message and press ENTER to send, ESC to close");
        });
    }

    // ---------- Village ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        let size = vec2(world.bounds.width as f32, world.bounds.height as f32);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, theme.grass);

        for house in &world.houses {
            painter.rect_filled(to_screen(origin, &house.body), 0.0, theme.house);
            painter.text(
                pos2(
                    origin.x + house.body.center().x as f32,
                    origin.y + house.body.bottom() as f32 + 10.0,
                ),
                Align2::CENTER_CENTER,
                &house.label,
                FontId::proportional(16.0),
                theme.text,
            );
        }

        for tree in &world.trees {
            let b = tree.body;
            let trunk = Rect::new(b.x + 15, b.y + 40, 10, 20);
            painter.rect_filled(to_screen(origin, &trunk), 0.0, theme.trunk);
            painter.circle_filled(
                pos2(origin.x + (b.x + 20) as f32, origin.y + (b.y + 20) as f32),
                20.0,
                theme.canopy,
            );
        }

        painter.rect_filled(to_screen(origin, &world.player.body), 0.0, theme.player);

        for villager in world.villagers.iter().filter(|v| !v.is_defeated()) {
            painter.rect_filled(to_screen(origin, &villager.body), 0.0, theme.villager);
            draw_nameplate(&painter, origin, theme, villager);
        }

        for (i, line) in INSTRUCTIONS.iter().enumerate() {
            painter.text(
                pos2(origin.x + 10.0, origin.y + 10.0 + i as f32 * 20.0),
                Align2::LEFT_TOP,
                *line,
                FontId::proportional(12.0),
                theme.text,
            );
        }
    });
}

fn to_screen(origin: Pos2, r: &Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        pos2(origin.x + r.x as f32, origin.y + r.y as f32),
        vec2(r.width as f32, r.height as f32),
    )
}

fn draw_nameplate(
    painter: &Painter,
    origin: Pos2,
    theme: &Theme,
    villager: &Villager,
) {
    let body = villager.body;
    let (hp, max_hp) = (villager.hp, villager.max_hp);
    let center_x = origin.x + body.center().x as f32;
    painter.text(
        pos2(center_x, origin.y + body.y as f32 - 15.0),
        Align2::CENTER_CENTER,
        &villager.name,
        FontId::proportional(11.0),
        theme.text,
    );

    let bar_width = 30.0;
    let fraction = if max_hp > 0 {
        (hp.max(0) as f32 / max_hp as f32).min(1.0)
    } else {
        0.0
    };
    let bar_min = pos2(center_x - bar_width / 2.0, origin.y + body.y as f32 - 25.0);
    painter.rect_filled(
        egui::Rect::from_min_size(bar_min, vec2(bar_width, 4.0)),
        0.0,
        theme.hp_empty,
    );
    painter.rect_filled(
        egui::Rect::from_min_size(bar_min, vec2(bar_width * fraction, 4.0)),
        0.0,
        theme.hp_full,
    );
}

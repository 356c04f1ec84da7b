use eframe::egui;
use tracing::{info, warn};

use crate::engine::engine::DialogueHandle;
use crate::engine::llm_client::{DialogueGateway, OfflineResponder, FALLBACK_REPLY};
use crate::engine::protocol::DialogueEvent;
use crate::engine::world::{DialogueRequest, World};
use crate::model::entity::MoveInput;
use crate::model::layout::VillageLayout;
use crate::model::settings::Settings;
use crate::ui::center_panel::draw_center_panel;
use crate::ui::left_panel::draw_left_panel;

pub const TICK_SECONDS: f32 = 1.0 / 60.0;
const MAX_TICKS_PER_FRAME: u32 = 5;

/* =========================
   Theme
   ========================= */

#[derive(Clone)]
pub struct Theme {
    pub grass: egui::Color32,
    pub house: egui::Color32,
    pub trunk: egui::Color32,
    pub canopy: egui::Color32,
    pub player: egui::Color32,
    pub villager: egui::Color32,
    pub hp_full: egui::Color32,
    pub hp_empty: egui::Color32,
    pub text: egui::Color32,
    pub response: egui::Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            grass: egui::Color32::from_rgb(0, 255, 0),
            house: egui::Color32::from_rgb(139, 69, 19),
            trunk: egui::Color32::from_rgb(139, 69, 19),
            canopy: egui::Color32::from_rgb(0, 100, 0),
            player: egui::Color32::from_rgb(0, 0, 255),
            villager: egui::Color32::from_rgb(255, 0, 0),
            hp_full: egui::Color32::from_rgb(0, 255, 0),
            hp_empty: egui::Color32::from_rgb(255, 0, 0),
            text: egui::Color32::BLACK,
            response: egui::Color32::from_rgb(0, 0, 255),
        }
    }
}

/* =========================
   App
   ========================= */

pub struct VillageApp {
    pub world: World,
    pub theme: Theme,
    settings: Settings,
    dialogue: DialogueHandle,
    accumulator: f32,
}

impl VillageApp {
    pub fn new(settings: Settings) -> Self {
        let dialogue = match DialogueGateway::new(&settings) {
            Ok(gateway) => DialogueHandle::spawn(gateway),
            Err(err) => {
                warn!(error = %err, "dialogue gateway unavailable; villagers will use canned replies");
                DialogueHandle::spawn(OfflineResponder)
            }
        };

        let world = World::seeded(VillageLayout::default(), settings.seed);
        info!(villagers = world.villagers.len(), seed = ?settings.seed, "village ready");

        Self {
            world,
            theme: Theme::default(),
            settings,
            dialogue,
            accumulator: 0.0,
        }
    }

    fn send(&mut self, request: DialogueRequest) {
        let (villager, conversation) = (request.villager, request.conversation);

        if !self.dialogue.request(request) {
            warn!(villager, "dialogue worker gone; answering with fallback");
            self.world.deliver_reply(villager, conversation, FALLBACK_REPLY);
        }
    }

    fn drain_replies(&mut self) {
        while let Some(DialogueEvent::Reply {
            villager,
            conversation,
            text,
        }) = self.dialogue.try_next()
        {
            self.world.deliver_reply(villager, conversation, &text);
        }
    }

    fn handle_events(&mut self, events: Vec<egui::Event>) {
        let typing = self.world.dialog.is_active();

        for event in events {
            match event {
                egui::Event::Text(text) if typing => {
                    for c in text.chars() {
                        self.world.dialog.add_char(c);
                    }
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => self.on_key(key, typing),
                _ => {}
            }
        }
    }

    fn on_key(&mut self, key: egui::Key, typing: bool) {
        if typing {
            match key {
                egui::Key::Escape => self.world.close_dialog(),
                egui::Key::Enter => {
                    if let Some(request) = self.world.submit_dialog() {
                        self.send(request);
                    }
                }
                egui::Key::Backspace => self.world.dialog.remove_char(),
                _ => {}
            }
            return;
        }

        match key {
            egui::Key::E => {
                self.world.talk();
            }
            egui::Key::P => {
                self.world.attack();
            }
            _ => {}
        }
    }

    fn advance(&mut self, dt: f32, held: MoveInput) {
        self.accumulator += dt;
        let mut ticks = 0;
        while self.accumulator >= TICK_SECONDS && ticks < MAX_TICKS_PER_FRAME {
            self.world.step(held);
            self.accumulator -= TICK_SECONDS;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.accumulator = 0.0;
        }
    }
}

fn held_keys(input: &egui::InputState) -> MoveInput {
    MoveInput {
        left: input.key_down(egui::Key::ArrowLeft) || input.key_down(egui::Key::A),
        right: input.key_down(egui::Key::ArrowRight) || input.key_down(egui::Key::D),
        up: input.key_down(egui::Key::ArrowUp) || input.key_down(egui::Key::W),
        down: input.key_down(egui::Key::ArrowDown) || input.key_down(egui::Key::S),
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for VillageApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.drain_replies();

        let (events, held, dt) = ctx.input(|i| (i.events.clone(), held_keys(i), i.stable_dt));
        self.handle_events(events);
        self.advance(dt, held);

        draw_left_panel(ctx, &self.world);
        draw_center_panel(ctx, &self.world, &self.theme);

        ctx.request_repaint();
    }
}

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::engine::behavior::{self, BehaviorState, Surroundings};
use crate::engine::interpreter::{self, CommandOutcome};
use crate::engine::llm_client::Responder;
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::dialog::DialogBox;
use crate::model::entity::{MoveInput, Player, Villager};
use crate::model::geometry::{Rect, WorldBounds};
use crate::model::layout::{House, Tree, VillageLayout};

pub const THINKING_TEXT: &str = "...";

/// A free-form line waiting on the dialogue service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueRequest {
    pub villager: usize,
    pub conversation: u64,
    pub utterance: String,
    pub context: String,
}

/// The whole simulation: entities, obstacles, conversation state and the RNG.
pub struct World {
    pub bounds: WorldBounds,
    pub player: Player,
    pub villagers: Vec<Villager>,
    pub houses: Vec<House>,
    pub trees: Vec<Tree>,
    pub dialog: DialogBox,
    obstacles: Vec<Rect>,
    rng: StdRng,
    ticks: u64,
}

impl World {
    pub fn new(layout: VillageLayout, mut rng: StdRng) -> Self {
        let villagers = layout
            .villagers
            .iter()
            .map(|seed| seed.spawn(&mut rng))
            .collect();

        Self {
            bounds: layout.bounds,
            player: layout.player(),
            obstacles: layout.obstacles(),
            villagers,
            houses: layout.houses,
            trees: layout.trees,
            dialog: DialogBox::default(),
            rng,
            ticks: 0,
        }
    }

    pub fn seeded(layout: VillageLayout, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(layout, rng)
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn villager_index(&self, name: &str) -> Option<usize> {
        self.villagers.iter().position(|v| v.name == name)
    }

    /* =========================
       Simulation
       ========================= */

    /// One frame: player first, then every villager in declaration order.
    /// Movement is paused while a conversation is open.
    pub fn step(&mut self, input: MoveInput) -> bool {
        if self.dialog.is_active() {
            return false;
        }

        self.player.update(input, self.bounds);
        self.advance_villagers();
        self.ticks += 1;
        true
    }

    pub fn advance_villagers(&mut self) -> Vec<BehaviorState> {
        let surroundings = Surroundings {
            player: self.player.position(),
            obstacles: &self.obstacles,
            bounds: self.bounds,
        };

        self.villagers
            .iter_mut()
            .map(|v| behavior::tick(v, &surroundings, &mut self.rng))
            .collect()
    }

    /* =========================
       Interactions
       ========================= */

    /// First standing villager under the probe box.
    pub fn villager_in_front(&self) -> Option<usize> {
        let probe = self.player.probe_box();
        self.villagers
            .iter()
            .position(|v| !v.is_defeated() && probe.overlaps(&v.body))
    }

    pub fn talk(&mut self) -> Option<usize> {
        let index = self.villager_in_front()?;
        let name = self.villagers[index].name.clone();
        self.dialog.show(index, &name);
        info!(villager = %name, "conversation opened");
        Some(index)
    }

    pub fn attack(&mut self) -> Option<usize> {
        let index = self.villager_in_front()?;
        let villager = &mut self.villagers[index];
        villager.take_damage();
        info!(villager = %villager.name, hp = villager.hp, "villager attacked");
        if villager.is_defeated() {
            info!(villager = %villager.name, "villager defeated");
        }
        Some(index)
    }

    pub fn close_dialog(&mut self) {
        self.dialog.hide();
    }

    /* =========================
       Commands & dialogue
       ========================= */

    /// Runs an utterance through the interpreter for one villager.
    pub fn command(&mut self, villager: usize, utterance: &str) -> Option<CommandOutcome> {
        if self.villagers.get(villager)?.is_defeated() {
            return None;
        }
        interpreter::interpret(&mut self.villagers, villager, utterance, &self.houses)
    }

    pub fn character_context(&self, villager: usize) -> Option<String> {
        self.villagers
            .get(villager)
            .map(PromptBuilder::character_context)
    }

    /// Submits the dialog box line. Canned replies are shown at once; free-form
    /// lines come back as a request for the dialogue service.
    pub fn submit_dialog(&mut self) -> Option<DialogueRequest> {
        if self.dialog.awaiting_reply {
            return None;
        }
        let villager = self.dialog.villager?;
        let utterance = self.dialog.take_input()?;

        match self.command(villager, &utterance)? {
            CommandOutcome::Reply(text) => {
                self.dialog.response_text = text;
                None
            }
            CommandOutcome::NeedsDialogue(utterance) => {
                let context = self.character_context(villager)?;
                self.dialog.response_text = THINKING_TEXT.into();
                self.dialog.awaiting_reply = true;
                Some(DialogueRequest {
                    villager,
                    conversation: self.dialog.conversation,
                    utterance,
                    context,
                })
            }
        }
    }

    /// Records a dialogue reply and shows it if the conversation that asked
    /// for it is still on screen. Replies to a closed conversation only land
    /// in memory.
    pub fn deliver_reply(&mut self, villager: usize, conversation: u64, text: &str) {
        if let Some(v) = self.villagers.get_mut(villager) {
            if !v.is_defeated() {
                v.remember(format!("Said: {text}"));
            }
        }

        if self.dialog.is_showing(villager, conversation) {
            self.dialog.response_text = text.to_string();
            self.dialog.awaiting_reply = false;
            debug!(villager, conversation, "dialogue reply delivered");
        } else {
            debug!(villager, conversation, "reply for a closed conversation");
        }
    }

    /// Synchronous command path: canned reply or a blocking call to `responder`.
    pub fn converse(
        &mut self,
        villager: usize,
        utterance: &str,
        responder: &dyn Responder,
    ) -> Option<String> {
        match self.command(villager, utterance)? {
            CommandOutcome::Reply(text) => Some(text),
            CommandOutcome::NeedsDialogue(utterance) => {
                let context = self.character_context(villager)?;
                let reply = responder.respond(&utterance, &context);
                let conversation = self.dialog.conversation;
                self.deliver_reply(villager, conversation, &reply);
                Some(reply)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::behavior::FLEE_MEMORY;
    use crate::engine::llm_client::{DialogueGateway, FALLBACK_REPLY};
    use crate::model::geometry::Point;
    use crate::model::layout::VillagerSeed;
    use crate::model::settings::Settings;
    use std::cell::Cell;
    use std::net::TcpListener;

    struct Recording {
        calls: Cell<usize>,
    }

    impl Recording {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Responder for Recording {
        fn respond(&self, utterance: &str, _character_context: &str) -> String {
            self.calls.set(self.calls.get() + 1);
            format!("You said {utterance}")
        }
    }

    fn village(seed: u64) -> World {
        World::new(VillageLayout::default(), StdRng::seed_from_u64(seed))
    }

    fn field_with(name: &str, position: Point) -> World {
        let mut layout = VillageLayout::empty();
        layout.villagers.push(VillagerSeed {
            name: name.into(),
            backstory: String::new(),
            position,
        });
        World::new(layout, StdRng::seed_from_u64(11))
    }

    #[test]
    fn bob_follows_along_dominant_axis() {
        let mut world = field_with("Bob", Point::new(400, 100));
        world.villagers[0].following = true;
        let before = world.villagers[0].position().distance_to(world.player.position());
        assert_eq!(before, 300.0);

        assert!(world.step(MoveInput::default()));

        let bob = &world.villagers[0];
        assert_eq!(bob.position(), Point::new(400 - bob.speed, 100));
        assert!(bob.position().distance_to(world.player.position()) < before);
    }

    #[test]
    fn follow_command_skips_dialogue_service() {
        let mut world = village(1);
        let alice = world.villager_index("Alice").unwrap();
        let responder = Recording::new();

        let reply = world.converse(alice, "hey can you follow me please", &responder);

        assert_eq!(reply.as_deref(), Some("Okay, I'll follow you!"));
        assert_eq!(responder.calls.get(), 0);
        assert!(world.villagers[alice].following);
        assert!(world.villagers[alice].current_task.is_none());
    }

    #[test]
    fn free_form_with_unreachable_service_returns_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let gateway = DialogueGateway::new(&Settings {
            base_url: format!("http://{addr}"),
            ..Settings::default()
        })
        .unwrap();

        let mut world = village(2);
        let alice = world.villager_index("Alice").unwrap();
        let before = world.villagers[alice].clone();

        let reply = world.converse(alice, "tell me about bread", &gateway);

        let after = &world.villagers[alice];
        assert_eq!(reply.as_deref(), Some(FALLBACK_REPLY));
        assert_eq!(after.following, before.following);
        assert_eq!(after.current_task, before.current_task);
        assert_eq!(after.hp, before.hp);
        assert_eq!(after.position(), before.position());
        assert_eq!(after.memory.count_matching("Player said: tell me about bread"), 1);
    }

    #[test]
    fn attack_to_four_hp_starts_flee_next_tick() {
        let mut world = field_with("Carol", Point::new(100, 140));
        world.villagers[0].hp = 5;

        assert_eq!(world.attack(), Some(0));
        assert_eq!(world.villagers[0].hp, 4);
        assert!(!world.villagers[0].fleeing);

        world.step(MoveInput::default());

        let carol = &world.villagers[0];
        assert!(carol.fleeing);
        assert!(carol.seeking_help);
        assert_eq!(carol.memory.count_matching(FLEE_MEMORY), 1);
    }

    #[test]
    fn defeated_villager_is_not_a_target() {
        let mut world = field_with("Dave", Point::new(100, 140));
        world.villagers[0].hp = 1;
        assert_eq!(world.attack(), Some(0));
        assert!(world.villagers[0].is_defeated());

        assert_eq!(world.attack(), None);
        assert_eq!(world.talk(), None);
        assert_eq!(world.villagers[0].hp, 0);
    }

    #[test]
    fn empty_probe_is_a_no_op() {
        let mut world = field_with("Dave", Point::new(600, 600));
        assert_eq!(world.attack(), None);
        assert_eq!(world.talk(), None);
        assert_eq!(world.villagers[0].hp, 10);
    }

    #[test]
    fn dialog_submission_round_trip() {
        let mut world = field_with("Alice", Point::new(100, 140));
        assert_eq!(world.talk(), Some(0));
        assert!(!world.step(MoveInput::default()), "movement pauses while talking");

        for c in "what's new?".chars() {
            world.dialog.add_char(c);
        }
        let request = world.submit_dialog().expect("free-form needs the service");
        assert_eq!(request.villager, 0);
        assert_eq!(request.utterance, "what's new?");
        assert!(request.context.starts_with("You are Alice."));
        assert!(request.context.contains("Player said: what's new?"));
        assert!(world.dialog.awaiting_reply);

        world.dialog.add_char('x');
        assert_eq!(world.submit_dialog(), None, "one request at a time");

        world.deliver_reply(0, request.conversation, "Not much, friend.");
        assert_eq!(world.dialog.response_text, "Not much, friend.");
        assert!(!world.dialog.awaiting_reply);
        assert_eq!(world.villagers[0].memory.count_matching("Said: Not much, friend."), 1);
    }

    fn type_line(world: &mut World, line: &str) {
        for c in line.chars() {
            world.dialog.add_char(c);
        }
    }

    #[test]
    fn late_reply_does_not_answer_a_reopened_conversation() {
        let mut world = field_with("Alice", Point::new(100, 140));
        world.talk();
        type_line(&mut world, "tell me about bread");
        let first = world.submit_dialog().expect("first line goes out");
        world.close_dialog();

        world.talk();
        type_line(&mut world, "what is your name");
        let second = world.submit_dialog().expect("second line goes out");
        assert_ne!(first.conversation, second.conversation);

        world.deliver_reply(0, first.conversation, "Bread is my life.");
        assert_eq!(world.dialog.response_text, THINKING_TEXT);
        assert!(world.dialog.awaiting_reply);
        assert_eq!(world.villagers[0].memory.count_matching("Said: Bread is my life."), 1);

        type_line(&mut world, "hello?");
        assert_eq!(world.submit_dialog(), None, "second line still in flight");

        world.deliver_reply(0, second.conversation, "I'm Alice.");
        assert_eq!(world.dialog.response_text, "I'm Alice.");
        assert!(!world.dialog.awaiting_reply);
    }

    #[test]
    fn canned_reply_lands_in_dialog() {
        let mut world = field_with("Bob", Point::new(100, 140));
        world.talk();
        for c in "stop following".chars() {
            world.dialog.add_char(c);
        }
        assert_eq!(world.submit_dialog(), None);
        assert_eq!(world.dialog.response_text, "Alright, I'll stay here.");
    }

    #[test]
    fn go_to_house_two_arrives_in_open_field() {
        let mut layout = VillageLayout::empty();
        layout.houses = VillageLayout::default().houses;
        layout.villagers.push(VillagerSeed {
            name: "Bob".into(),
            backstory: String::new(),
            position: Point::new(450, 600),
        });
        let mut world = World::new(layout, StdRng::seed_from_u64(4));
        // Houses are landmarks only in this layout.
        world.obstacles.clear();

        let reply = world.converse(0, "Go to house 2", &Recording::new());
        assert_eq!(reply.as_deref(), Some("I'll head to house 2!"));
        let target = world.houses[1].body.center();
        assert_eq!(world.villagers[0].current_task.as_ref().map(|t| t.target()), Some(target));

        for _ in 0..500 {
            world.step(MoveInput::default());
            if world.villagers[0].current_task.is_none() {
                break;
            }
        }
        assert!(world.villagers[0].current_task.is_none());
        assert!(world.villagers[0].position().distance_to(target) < 20.0);
    }

    #[test]
    fn long_run_keeps_invariants() {
        let mut world = village(99);
        world.villagers[1].following = true;
        world.villagers[2].hp = 3;
        let inputs = [
            MoveInput { right: true, ..MoveInput::default() },
            MoveInput { down: true, ..MoveInput::default() },
            MoveInput { left: true, ..MoveInput::default() },
            MoveInput { up: true, ..MoveInput::default() },
        ];
        let mut last_hp: Vec<i32> = world.villagers.iter().map(|v| v.hp).collect();

        for frame in 0..3_000 {
            world.step(inputs[(frame / 200) % inputs.len()]);
            if frame % 250 == 0 {
                world.attack();
            }
            for (v, hp) in world.villagers.iter().zip(last_hp.iter_mut()) {
                assert!(v.body.within(world.bounds), "{} left the world", v.name);
                assert!(!v.body.overlaps_any(world.obstacles()), "{} inside obstacle", v.name);
                assert!(v.memory.len() <= 10);
                assert!(v.hp <= *hp);
                *hp = v.hp;
            }
        }
        assert_eq!(world.ticks(), 3_000);
    }

    #[test]
    fn same_seed_same_village() {
        let mut a = village(7);
        let mut b = village(7);
        for _ in 0..500 {
            a.step(MoveInput::default());
            b.step(MoveInput::default());
        }
        let pa: Vec<_> = a.villagers.iter().map(|v| v.position()).collect();
        let pb: Vec<_> = b.villagers.iter().map(|v| v.position()).collect();
        assert_eq!(pa, pb);
    }
}

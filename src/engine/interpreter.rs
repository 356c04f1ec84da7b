use tracing::info;

use crate::model::entity::{Task, Villager};
use crate::model::layout::House;

/// What the player asked a villager to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Follow,
    Unfollow,
    /// 1-based house number.
    GoToLocation(usize),
    AttackRequest(String),
    FreeForm(String),
}

impl Intent {
    pub fn short_name(&self) -> &'static str {
        match self {
            Intent::Follow => "Follow",
            Intent::Unfollow => "Unfollow",
            Intent::GoToLocation(_) => "GoToLocation",
            Intent::AttackRequest(_) => "AttackRequest",
            Intent::FreeForm(_) => "FreeForm",
        }
    }
}

/// Result of handing an utterance to a villager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Handled locally with a canned line.
    Reply(String),
    /// Needs the dialogue service; carries the utterance to send.
    NeedsDialogue(String),
}

/// Keyword classifier. First match wins:
/// "follow me", "stop following", "go to house" + "house N", "attack" + another
/// villager's name, otherwise free-form.
pub fn classify<'a>(
    utterance: &str,
    addressed: &str,
    house_count: usize,
    villager_names: impl IntoIterator<Item = &'a str>,
) -> Intent {
    let lowered = utterance.to_lowercase();

    if lowered.contains("follow me") {
        return Intent::Follow;
    }

    if lowered.contains("stop following") {
        return Intent::Unfollow;
    }

    if lowered.contains("go to house") {
        return (1..=house_count)
            .find(|n| lowered.contains(&format!("house {n}")))
            .map(Intent::GoToLocation)
            .unwrap_or_else(|| Intent::FreeForm(utterance.to_string()));
    }

    if lowered.contains("attack") {
        return villager_names
            .into_iter()
            .filter(|name| *name != addressed)
            .find(|name| lowered.contains(&name.to_lowercase()))
            .map(|name| Intent::AttackRequest(name.to_string()))
            .unwrap_or_else(|| Intent::FreeForm(utterance.to_string()));
    }

    Intent::FreeForm(utterance.to_string())
}

/// Applies an intent to the addressed villager. The raw utterance has already
/// been recorded by the caller; anything that cannot be acted on locally is
/// passed through to the dialogue service as that utterance.
pub fn apply_intent(
    villager: &mut Villager,
    intent: Intent,
    utterance: &str,
    houses: &[House],
) -> CommandOutcome {
    info!(villager = %villager.name, intent = intent.short_name(), "dispatching command");

    match intent {
        Intent::Follow => {
            villager.following = true;
            villager.current_task = None;
            villager.remember("Started following the player");
            CommandOutcome::Reply("Okay, I'll follow you!".into())
        }

        Intent::Unfollow => {
            villager.following = false;
            villager.remember("Stopped following the player");
            CommandOutcome::Reply("Alright, I'll stay here.".into())
        }

        Intent::GoToLocation(n) => match n.checked_sub(1).and_then(|i| houses.get(i)) {
            Some(house) => {
                villager.current_task = Some(Task::GoTo {
                    destination: format!("house {n}"),
                    target: house.body.center(),
                });
                villager.following = false;
                villager.remember(format!("Ordered to go to house {n}"));
                CommandOutcome::Reply(format!("I'll head to house {n}!"))
            }
            None => CommandOutcome::NeedsDialogue(utterance.to_string()),
        },

        Intent::AttackRequest(target) => {
            villager.remember(format!("Ordered to attack {target}"));
            CommandOutcome::Reply(format!("I... I can't attack {target}. That's not right!"))
        }

        Intent::FreeForm(text) => CommandOutcome::NeedsDialogue(text),
    }
}

/// Records the utterance, classifies it against the village, and applies it.
pub fn interpret(
    villagers: &mut [Villager],
    addressed: usize,
    utterance: &str,
    houses: &[House],
) -> Option<CommandOutcome> {
    let names: Vec<String> = villagers.iter().map(|v| v.name.clone()).collect();
    let villager = villagers.get_mut(addressed)?;

    villager.remember(format!("Player said: {utterance}"));

    let intent = classify(
        utterance,
        &villager.name,
        houses.len(),
        names.iter().map(String::as_str),
    );
    Some(apply_intent(villager, intent, utterance, houses))
}

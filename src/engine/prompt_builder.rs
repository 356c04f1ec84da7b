use crate::model::entity::Villager;
use crate::model::memory::PROMPT_MEMORY_LINES;

/// Builds the system-level character context sent with every free-form line.
/// Formatting only; no networking.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn character_context(villager: &Villager) -> String {
        let mut prompt = String::new();

        push_identity(&mut prompt, villager);
        push_vitals(&mut prompt, villager);
        push_recent_memories(&mut prompt, villager);
        push_reminder(&mut prompt);

        prompt
    }
}

fn push_identity(prompt: &mut String, villager: &Villager) {
    prompt.push_str(&format!("You are {}. {}\n", villager.name, villager.backstory));
}

fn push_vitals(prompt: &mut String, villager: &Villager) {
    prompt.push_str(&format!(
        "Your current HP: {}/{}\n",
        villager.hp, villager.max_hp
    ));
}

fn push_recent_memories(prompt: &mut String, villager: &Villager) {
    if villager.memory.is_empty() {
        return;
    }

    prompt.push_str("Recent memories:\n");
    let lines: Vec<String> = villager
        .memory
        .recent(PROMPT_MEMORY_LINES)
        .map(ToString::to_string)
        .collect();
    prompt.push_str(&lines.join("\n"));
    prompt.push('\n');
}

fn push_reminder(prompt: &mut String) {
    prompt.push_str(
        "Respond in character as a villager in this game world. Keep responses brief and natural.",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::{Direction, Point};

    fn alice() -> Villager {
        Villager::new(
            "Alice",
            "You are Alice, a friendly baker.",
            Point::new(250, 100),
            Direction::Up,
        )
    }

    #[test]
    fn context_without_memories() {
        let context = PromptBuilder::character_context(&alice());
        assert_eq!(
            context,
            "You are Alice. You are Alice, a friendly baker.\n\
             Your current HP: 10/10\n\
             Respond in character as a villager in this game world. Keep responses brief and natural."
        );
    }

    #[test]
    fn context_carries_only_last_three_memories() {
        let mut v = alice();
        v.hp = 7;
        for text in ["first", "second", "third", "fourth"] {
            v.remember(text);
        }

        let context = PromptBuilder::character_context(&v);

        assert!(context.contains("Your current HP: 7/10\n"));
        assert!(context.contains("Recent memories:\n"));
        assert!(!context.contains("- first"));
        for text in ["second", "third", "fourth"] {
            assert!(context.contains(&format!("- {text}\n")), "missing {text}");
        }
        assert!(context.ends_with("Keep responses brief and natural."));
    }
}

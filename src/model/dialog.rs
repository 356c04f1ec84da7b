pub const MAX_INPUT_CHARS: usize = 100;

/// Conversation panel state: who is being addressed, what the player is typing,
/// and the last thing the villager said.
#[derive(Debug, Default, Clone)]
pub struct DialogBox {
    pub villager: Option<usize>,
    pub title: String,
    pub input_text: String,
    pub response_text: String,
    pub awaiting_reply: bool,
    /// Bumped on every `show`, so replies can be matched to the conversation
    /// that asked for them.
    pub conversation: u64,
}

impl DialogBox {
    pub fn is_active(&self) -> bool {
        self.villager.is_some()
    }

    pub fn show(&mut self, villager: usize, name: &str) {
        self.villager = Some(villager);
        self.conversation = self.conversation.wrapping_add(1);
        self.title = format!("Talking to {name}");
        self.input_text.clear();
        self.response_text.clear();
        self.awaiting_reply = false;
    }

    pub fn hide(&mut self) {
        *self = Self {
            conversation: self.conversation,
            ..Self::default()
        };
    }

    /// True while conversation `id` is the one on screen.
    pub fn is_showing(&self, villager: usize, id: u64) -> bool {
        self.villager == Some(villager) && self.conversation == id
    }

    pub fn add_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if self.input_text.chars().count() < MAX_INPUT_CHARS {
            self.input_text.push(c);
        }
    }

    pub fn remove_char(&mut self) {
        self.input_text.pop();
    }

    /// Takes the trimmed line, clearing the buffer. Blank lines yield nothing
    /// and leave the buffer untouched.
    pub fn take_input(&mut self) -> Option<String> {
        let line = self.input_text.trim();
        if line.is_empty() {
            return None;
        }
        let line = line.to_string();
        self.input_text.clear();
        Some(line)
    }
}

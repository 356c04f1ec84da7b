/// Sent from the simulation to the dialogue worker.
pub enum DialogueCommand {
    Respond {
        villager: usize,
        conversation: u64,
        utterance: String,
        context: String,
    },
    Shutdown,
}

/// Sent from the dialogue worker back to the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    Reply {
        villager: usize,
        conversation: u64,
        text: String,
    },
}

pub mod engine;
pub mod protocol;
pub mod world;

pub mod behavior;
pub mod interpreter;
pub mod prompt_builder;
pub mod llm_client;

pub mod geometry;
pub mod memory;
pub mod entity;
pub mod layout;
pub mod dialog;
pub mod settings;

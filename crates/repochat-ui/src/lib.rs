//! egui panels and the UI-side projection of chat session events.

pub mod panels;
pub mod state;
pub mod theme;

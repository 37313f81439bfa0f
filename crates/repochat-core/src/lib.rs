//! Client-side core of the repository chat: the streaming session
//! controller and the ports it talks to the backend through.

pub mod ports;
pub mod event_bus;
pub mod payload;
pub mod session;
pub mod mentions;
pub mod projects;

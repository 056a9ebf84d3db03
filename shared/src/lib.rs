//! Types shared between the pool trivia server and its browser client.

pub mod config;
pub mod phase;
pub mod protocol;
pub mod vec2;

//! Pool trivia server library.
//!
//! The game itself (table physics, turns, questions, NPCs) runs in one task
//! owned by [`game_loop`]; [`ws`] connects browsers to it. The repository
//! checks behind the `repo-check` binary live in [`git_files`], [`manifest`]
//! and [`markup`].

pub mod app;
pub mod bot;
pub mod config;
pub mod controller;
pub mod game_loop;
pub mod git_files;
pub mod groups;
pub mod input;
pub mod manifest;
pub mod markup;
pub mod onboarding;
pub mod player;
pub mod protocol;
pub mod question;
pub mod state;
pub mod table;
pub mod ws;

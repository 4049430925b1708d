//! # Connect Four
//!
//! Rules engine and turn-taking game loop for Connect Four. Moves come from
//! pluggable sources: a human at the console or in a terminal UI, a seeded
//! random player, or an external chat-completions policy.
//!
//! ## Modules
//!
//! - [`game`]: Board Engine: grid, moves, win/draw detection
//! - [`source`]: Move-sources: human input, random choice, external policy
//! - [`controller`]: Turn Controller: alternates sources over one board
//! - [`console`]: Text front end
//! - [`ui`]: Terminal UI built with Ratatui
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod game;
pub mod source;
pub mod ui;

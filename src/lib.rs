//! Client for the jokers service.
//!
//! A page holds three joke placeholders (`rJoke`, `pJoke`, `cJoke`). Each is
//! refreshed by one request: `GET /jokes/random`, `GET /jokes/personal`, or
//! `POST /jokes/custom` with a first/last name pair. A reply with status 200
//! replaces the placeholder, tag and all, with the returned markup; anything
//! else leaves the page as it was.

pub mod app;
pub mod client;
pub mod config;
pub mod handler;
pub mod logging;
pub mod page;
pub mod tui;
pub mod ui;
pub mod widget;

pub use client::{JokeAction, JokeClient, JokeError, Person, Reply};
pub use page::Document;
pub use widget::{apply, Applied, Completion, JokeWidget};

#![forbid(unsafe_code)]

pub mod admin;
pub mod app;
pub mod cli;
pub mod commands;
pub mod content_store;
pub mod logging;
pub mod model;
pub mod progress;
pub mod render;
pub mod session;
pub mod slug;
pub mod storage;
pub mod student;

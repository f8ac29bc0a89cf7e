// src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod flow;
pub mod geo;
pub mod places;
pub mod state;

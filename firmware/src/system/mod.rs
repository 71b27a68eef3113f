//! Core system components for the sensing firmware
pub mod board;
pub mod event;
pub mod resources;
pub mod state;

pub mod config;
pub mod engine;
pub mod interrupt;
pub mod lock;
pub mod ui;

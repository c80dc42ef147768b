// Transcoding engine - independent of the console front end

pub mod core;
pub mod params;
pub mod worker;

pub use self::core::*;
pub use params::{NoPrompt, Prompter, decode};
pub use worker::{BatchRunner, BatchSummary};

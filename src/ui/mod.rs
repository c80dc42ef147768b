// Console front end: progress line and interactive prompts

pub mod progress;
pub mod prompt;

pub use progress::{ConsoleProgress, render_bar, render_progress};
pub use prompt::{LinePrompter, wait_for_key};

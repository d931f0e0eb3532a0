//! Command handlers shared by one-shot invocations and the interactive shell.

mod handlers;
mod render;
mod shell;

pub use handlers::run;
pub use shell::run_shell;

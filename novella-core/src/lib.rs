pub mod animator;
pub mod config;
pub mod eval;
pub mod event;
pub mod executor;
pub mod manager;
pub mod renderer;
pub mod runtime;
pub mod storager;

pub use event::{InputEvent, OutputEvent};
pub use executor::{Player, PlayerState};
pub use manager::ScriptManager;
pub use renderer::driver::Driver;
pub use renderer::terminal::TerminalRenderer;
pub use runtime::Ctx;

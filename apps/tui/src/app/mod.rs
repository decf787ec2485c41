// App module for dashboard_tui
// Holds the session state and key handling

pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, LoadState};

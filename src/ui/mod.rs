pub mod keybindings;
pub mod player_view;
pub mod terminal_guard;

pub use keybindings::{command_for_key, PlayerCommand};
pub use player_view::PlayerView;
pub use terminal_guard::{install_panic_hook, TerminalGuard};

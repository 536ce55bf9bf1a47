//! Keyboard shortcuts for the demo player.
//!
//! Single source of truth for both key handling and the help overlay.

use crossterm::event::KeyCode;

/// Player action triggered by a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Show or hide the demo, as if scrolled into or out of view
    ToggleActive,
    /// Start, or replay a finished demo
    Start,
    Reset,
    ToggleHelp,
    Quit,
}

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: KeyCode,
    /// Alternative key for the same command
    pub alt_key: Option<KeyCode>,
    pub label: &'static str,
    pub description: &'static str,
    pub command: PlayerCommand,
}

pub static SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        key: KeyCode::Char(' '),
        alt_key: None,
        label: "space",
        description: "Show / hide demo",
        command: PlayerCommand::ToggleActive,
    },
    Shortcut {
        key: KeyCode::Char('s'),
        alt_key: Some(KeyCode::Enter),
        label: "s",
        description: "Start / replay",
        command: PlayerCommand::Start,
    },
    Shortcut {
        key: KeyCode::Char('r'),
        alt_key: None,
        label: "r",
        description: "Reset",
        command: PlayerCommand::Reset,
    },
    Shortcut {
        key: KeyCode::Char('?'),
        alt_key: None,
        label: "?",
        description: "Toggle help",
        command: PlayerCommand::ToggleHelp,
    },
    Shortcut {
        key: KeyCode::Char('q'),
        alt_key: Some(KeyCode::Esc),
        label: "q",
        description: "Quit",
        command: PlayerCommand::Quit,
    },
];

/// Map a pressed key to a player command
pub fn command_for_key(code: KeyCode) -> Option<PlayerCommand> {
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    SHORTCUTS
        .iter()
        .find(|s| s.key == code || s.alt_key == Some(code))
        .map(|s| s.command)
}

/// One-line hint for the footer: "space show / hide demo · s start / replay ..."
pub fn footer_hint() -> String {
    SHORTCUTS
        .iter()
        .map(|s| format!("{} {}", s.label, s.description.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_and_alt_keys() {
        assert_eq!(
            command_for_key(KeyCode::Char('s')),
            Some(PlayerCommand::Start)
        );
        assert_eq!(command_for_key(KeyCode::Enter), Some(PlayerCommand::Start));
        assert_eq!(command_for_key(KeyCode::Esc), Some(PlayerCommand::Quit));
        assert_eq!(
            command_for_key(KeyCode::Char(' ')),
            Some(PlayerCommand::ToggleActive)
        );
    }

    #[test]
    fn test_uppercase_maps_like_lowercase() {
        assert_eq!(
            command_for_key(KeyCode::Char('R')),
            Some(PlayerCommand::Reset)
        );
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(command_for_key(KeyCode::Char('z')), None);
        assert_eq!(command_for_key(KeyCode::Tab), None);
    }

    #[test]
    fn test_every_command_has_a_shortcut() {
        for command in [
            PlayerCommand::ToggleActive,
            PlayerCommand::Start,
            PlayerCommand::Reset,
            PlayerCommand::ToggleHelp,
            PlayerCommand::Quit,
        ] {
            assert!(SHORTCUTS.iter().any(|s| s.command == command));
        }
    }

    #[test]
    fn test_footer_hint_lists_keys() {
        let hint = footer_hint();
        assert!(hint.contains("r reset"));
        assert!(hint.contains("q quit"));
    }
}

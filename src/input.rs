use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Pause,
    Resume,
    CycleSort,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Up => Some(UiCommand::ScrollUp),
        KeyCode::Down => Some(UiCommand::ScrollDown),
        KeyCode::PageUp => Some(UiCommand::PageUp),
        KeyCode::PageDown => Some(UiCommand::PageDown),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'p' => Some(UiCommand::Pause),
            'r' => Some(UiCommand::Resume),
            's' => Some(UiCommand::CycleSort),
            'k' => Some(UiCommand::ScrollUp),
            'j' => Some(UiCommand::ScrollDown),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_case_insensitively() {
        assert_eq!(
            parse_main_command(&KeyCode::Char('P')),
            Some(UiCommand::Pause)
        );
        assert_eq!(
            parse_main_command(&KeyCode::Char('s')),
            Some(UiCommand::CycleSort)
        );
        assert_eq!(parse_main_command(&KeyCode::Char('z')), None);
    }

    #[test]
    fn arrows_scroll() {
        assert_eq!(parse_main_command(&KeyCode::Up), Some(UiCommand::ScrollUp));
        assert_eq!(
            parse_main_command(&KeyCode::Down),
            Some(UiCommand::ScrollDown)
        );
    }
}

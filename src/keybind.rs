use crate::config::BarConfig;
use crate::host::Host;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Ctrl,
    Shift,
    Alt,
    Space,
    Tab,
    Return,
    Escape,
    Delete,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    /// Function keys F1 through F12.
    Function(u8),
    /// Top-row digits 0 through 9.
    Digit(u8),
    /// Uppercase ASCII letters.
    Letter(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Parse a hotkey string like "Ctrl+Shift+B" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => {
                if let Some(k) = parse_key(&upper) {
                    key = Some(k);
                } else {
                    return None;
                }
            }
        }
    }

    key.map(|k| Hotkey {
        key: k,
        ctrl,
        shift,
        alt,
    })
}

fn parse_key(upper: &str) -> Option<Key> {
    match upper {
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "ENTER" | "RETURN" => Some(Key::Return),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "DELETE" => Some(Key::Delete),
        "BACKSPACE" => Some(Key::Backspace),
        "HOME" => Some(Key::Home),
        "END" => Some(Key::End),
        "PAGEUP" => Some(Key::PageUp),
        "PAGEDOWN" => Some(Key::PageDown),
        "LEFT" | "LEFTARROW" => Some(Key::LeftArrow),
        "RIGHT" | "RIGHTARROW" => Some(Key::RightArrow),
        "UP" | "UPARROW" => Some(Key::UpArrow),
        "DOWN" | "DOWNARROW" => Some(Key::DownArrow),
        _ if upper.len() > 1 && upper.starts_with('F') => upper[1..]
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=12).contains(n))
            .map(Key::Function),
        _ if upper.len() == 1 => {
            let c = upper.chars().next()?;
            if c.is_ascii_digit() {
                Some(Key::Digit(c as u8 - b'0'))
            } else if c.is_ascii_alphabetic() {
                Some(Key::Letter(c))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Polls bound hotkeys each frame and reports which bars fired.
///
/// The bind table is recomputed from the live bar definitions every update
/// tick, so renames and hotkey edits take effect without a restart. Firing is
/// edge triggered: a chord held across frames fires once.
#[derive(Default)]
pub struct KeybindRunner {
    binds: Vec<(usize, Hotkey)>,
    held: HashMap<usize, bool>,
}

impl KeybindRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the bind table from the current bar definitions. Unparsable
    /// hotkey strings bind nothing.
    pub fn setup_hotkeys(&mut self, bars: &[BarConfig]) {
        self.binds.clear();
        for (idx, bar) in bars.iter().enumerate() {
            let Some(spec) = &bar.hotkey else { continue };
            match parse_hotkey(spec) {
                Some(hotkey) => self.binds.push((idx, hotkey)),
                None => tracing::warn!(
                    "hotkey string '{}' for bar '{}' is invalid; ignoring",
                    spec,
                    bar.name
                ),
            }
        }
        let bound: Vec<usize> = self.binds.iter().map(|(idx, _)| *idx).collect();
        self.held.retain(|idx, _| bound.contains(idx));
    }

    /// Poll key state and return the indices of bars whose hotkey was newly
    /// pressed this tick.
    pub fn run(&mut self, host: &dyn Host) -> Vec<usize> {
        let mut fired = Vec::new();
        for (idx, hotkey) in &self.binds {
            let down = host.is_key_down(hotkey.key)
                && (!hotkey.ctrl || host.is_key_down(Key::Ctrl))
                && (!hotkey.shift || host.is_key_down(Key::Shift))
                && (!hotkey.alt || host.is_key_down(Key::Alt));
            let held = self.held.entry(*idx).or_insert(false);
            if down && !*held {
                fired.push(*idx);
            }
            *held = down;
        }
        fired
    }

    pub fn clear(&mut self) {
        self.binds.clear();
        self.held.clear();
    }

    pub fn bind_count(&self) -> usize {
        self.binds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_hotkey, Key};

    #[test]
    fn parses_modifiers_and_key() {
        let hk = parse_hotkey("Ctrl+Shift+B").expect("parse");
        assert_eq!(hk.key, Key::Letter('B'));
        assert!(hk.ctrl);
        assert!(hk.shift);
        assert!(!hk.alt);
    }

    #[test]
    fn parses_function_and_digit_keys() {
        assert_eq!(parse_hotkey("F5").map(|h| h.key), Some(Key::Function(5)));
        assert_eq!(parse_hotkey("alt+3").map(|h| h.key), Some(Key::Digit(3)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_hotkey("Ctrl+Bogus").is_none());
        assert!(parse_hotkey("F13").is_none());
        assert!(parse_hotkey("Ctrl+").is_none());
    }
}

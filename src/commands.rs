use crate::config::BarConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static VISIBLE_ARGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)\s+(.+)$").unwrap());

pub const VISIBLE_USAGE: &str = "Usage: /qolvisible [on|off|toggle] <bar>";

/// Resolve `bar` as a 1-based positional index or a display name and set or
/// flip its hidden state. Unresolvable identifiers produce a user-visible
/// error string, never a panic.
pub fn set_bar_hidden(
    bars: &mut [BarConfig],
    bar: &str,
    toggle: bool,
    hide: bool,
) -> Result<(), String> {
    let idx = match bar.parse::<usize>() {
        Ok(n) => {
            if n == 0 || n > bars.len() {
                return Err(format!("Bar \"{n}\" does not exist."));
            }
            n - 1
        }
        Err(_) => bars
            .iter()
            .position(|b| b.name == bar)
            .ok_or_else(|| format!("Bar \"{bar}\" does not exist."))?,
    };
    let bar = &mut bars[idx];
    bar.hidden = if toggle { !bar.hidden } else { hide };
    Ok(())
}

/// Handle the argument text of `/qolvisible`.
pub fn run_qol_visible(bars: &mut [BarConfig], argument: &str) -> Result<(), String> {
    let caps = VISIBLE_ARGS
        .captures(argument.trim())
        .ok_or_else(|| VISIBLE_USAGE.to_string())?;
    let subcommand = caps[1].to_lowercase();
    let bar = caps[2].trim();
    match subcommand.as_str() {
        "on" | "reveal" | "r" => set_bar_hidden(bars, bar, false, false),
        "off" | "hide" | "h" => set_bar_hidden(bars, bar, false, true),
        "toggle" | "t" => set_bar_hidden(bars, bar, true, false),
        _ => Err("Invalid subcommand.".to_string()),
    }
}

/// Parse an instrument selector: literal numeric text first, then a
/// case-insensitive match against the known instrument table. Zero after
/// both attempts is invalid.
pub fn parse_instrument(argument: &str, table: &[(u8, String)]) -> Option<u8> {
    let argument = argument.trim();
    let id = argument.parse::<u8>().ok().or_else(|| {
        table
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(argument))
            .map(|(id, _)| *id)
    })?;
    (id != 0).then_some(id)
}

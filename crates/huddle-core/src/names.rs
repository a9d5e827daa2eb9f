// Player-name cleanup for provider data.

use crate::team;

/// Remove a trailing team code from a player name, e.g. "John Smith KC" or
/// "John Smith (KC)". Only codes separated from the name by whitespace are
/// stripped, so names that merely end in capital letters are left alone.
pub fn strip_team_suffix(name: &str) -> &str {
    let trimmed = name.trim();
    for abbr in team::abbreviations() {
        let paren = format!("({abbr})");
        if let Some(rest) = trimmed.strip_suffix(paren.as_str()) {
            return rest.trim_end();
        }
        if let Some(rest) = trimmed.strip_suffix(abbr) {
            if rest.ends_with(char::is_whitespace) {
                return rest.trim_end();
            }
        }
    }
    trimmed
}

/// Collapse a value that is one unit repeated several times ("WRWR",
/// "John SmithJohn Smith") down to the unit. Other values are returned
/// unchanged.
pub fn collapse_repeated(text: &str) -> &str {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = chars.len();
    for unit in 1..len {
        if len % unit != 0 {
            continue;
        }
        let byte_end = chars[unit].0;
        let pattern = &text[..byte_end];
        if pattern.repeat(len / unit) == text {
            return pattern;
        }
    }
    text
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full cleanup applied to names coming from scraped or provider sources.
pub fn clean_player_name(raw: &str) -> String {
    let collapsed = collapse_repeated(raw.trim());
    normalize_whitespace(strip_team_suffix(collapsed))
}

//! Key-string normalization: the single choke point every raw key string
//! passes through before it reaches the buffer or the matcher.

/// Normalize a raw key string into the canonical token the matcher and
/// gesture definitions agree on.
///
/// Order of operations mirrors the control-char / hex-literal / prefix
/// handling the original implementation used, since gesture definitions are
/// authored against those exact tokens:
///
/// 1. Strip a leading `key.` prefix and surrounding single quotes.
/// 2. A two-hex-digit literal (`0x01`..`0x1a`) in the control-character range
///    is converted the same way a literal control character would be.
/// 3. A single control character (code points 1..=26) maps to the lowercase
///    letter it represents under `ctrl` (code 1 -> "a", code 26 -> "z").
/// 4. Known modifier aliases collapse onto a canonical name.
/// 5. Anything else is lowercased and passed through unchanged.
pub fn normalize_key(raw: &str) -> String {
    let stripped = strip_prefix_and_quotes(raw);

    if let Some(code) = hex_control_code(stripped) {
        return control_char_to_key(code);
    }

    if stripped.chars().count() == 1 {
        let ch = stripped.chars().next().unwrap();
        let code = ch as u32;
        if (1..=26).contains(&code) {
            return control_char_to_key(code as u8);
        }
    }

    normalize_modifier_name(&stripped.to_lowercase())
}

fn strip_prefix_and_quotes(raw: &str) -> &str {
    let s = raw.strip_prefix("key.").unwrap_or(raw);
    s.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(s)
}

fn hex_control_code(s: &str) -> Option<u8> {
    let digits = s.strip_prefix("0x")?;
    if digits.len() != 2 {
        return None;
    }
    let code = u8::from_str_radix(digits, 16).ok()?;
    (1..=26).contains(&code).then_some(code)
}

fn control_char_to_key(code: u8) -> String {
    let letter = (b'a' + (code - 1)) as char;
    letter.to_string()
}

fn normalize_modifier_name(lower: &str) -> String {
    match lower {
        "control" | "control_l" | "control_r" | "controlleft" | "controlright" | "ctrl_l"
        | "ctrl_r" => "ctrl".into(),
        "alt_gr" | "altgr" | "alt_l" | "alt_r" | "altleft" | "altright" => "alt".into(),
        "win" | "windows" | "meta" | "meta_l" | "meta_r" | "super" | "cmd_l" | "cmd_r" => {
            "cmd".into()
        }
        "shift_l" | "shift_r" | "shiftleft" | "shiftright" => "shift".into(),
        other => other.to_string(),
    }
}

//! Text transforms applied to a copy of an entry before re-copying it
//!
//! All functions are pure and total. They take `&str` and return a new
//! `String`, so stored history is never touched.

/// A transform the browser can apply to the selected entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    ToggleCase,
    PercentDecode,
}

impl Transform {
    /// All transforms in menu order
    pub const ALL: [Transform; 3] = [
        Transform::Trim,
        Transform::ToggleCase,
        Transform::PercentDecode,
    ];

    /// Map a menu key to a transform ('1'..='3')
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Transform::Trim),
            '2' => Some(Transform::ToggleCase),
            '3' => Some(Transform::PercentDecode),
            _ => None,
        }
    }

    /// Menu key for this transform
    pub fn key(self) -> char {
        match self {
            Transform::Trim => '1',
            Transform::ToggleCase => '2',
            Transform::PercentDecode => '3',
        }
    }

    /// Label for the status line
    pub fn label(self) -> &'static str {
        match self {
            Transform::Trim => "Trim",
            Transform::ToggleCase => "ToggleCase",
            Transform::PercentDecode => "URL-Decode",
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            Transform::Trim => trim(text),
            Transform::ToggleCase => toggle_case(text),
            Transform::PercentDecode => percent_decode(text),
        }
    }
}

/// Strip leading and trailing characters at or below U+0020
pub fn trim(text: &str) -> String {
    text.trim_matches(|c: char| c <= ' ').to_string()
}

/// Swap the case of ASCII letters; everything else passes through
pub fn toggle_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// Decode `%XX` escapes and `+` as in a URL query string.
///
/// Malformed escapes are kept literally. Decoded bytes that do not form valid
/// UTF-8 are replaced with U+FFFD.
pub fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

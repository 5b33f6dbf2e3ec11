//! Inline style tags in dialogue text.
//!
//! Supported tags: `<b>`, `<i>`, `<u>`, `<s>`, `<color=#RRGGBB>` (or
//! `#AARRGGBB`) and `<size=N>`, each closed by its `</name>` form. A tag only
//! counts as markup when its name is supported and, for closing tags, it
//! matches the innermost open tag; anything else is literal text.
//!
//! Visible positions are counted in `char`s. Raw positions are byte offsets
//! into the source string and always fall on a char boundary, so
//! `&text[..raw_index_for_visible_index(text, n)]` is the prefix that reveals
//! `n` visible characters with every enclosing tag already open.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)(\w+)(?:=([^>]+))?>").expect("static regex"));

const SUPPORTED_TAGS: [&str; 6] = ["b", "i", "u", "s", "color", "size"];

/// 8-bit ARGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { a: 255, r: 255, g: 255, b: 255 };
    pub const BLACK: Color = Color { a: 255, r: 0, g: 0, b: 0 };
    pub const TRANSPARENT: Color = Color { a: 0, r: 0, g: 0, b: 0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { a: 255, r, g, b }
    }

    pub fn from_argb(argb: u32) -> Color {
        let [a, r, g, b] = argb.to_be_bytes();
        Color { a, r, g, b }
    }

    /// `#RRGGBB` (opaque) or `#AARRGGBB`. Any other shape is `None`.
    pub fn parse_hex(input: &str) -> Option<Color> {
        let hex = input.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Some(Color::from_argb(0xFF00_0000 | value)),
            8 => Some(Color::from_argb(value)),
            _ => None,
        }
    }

    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn with_alpha(self, alpha: f32) -> Color {
        Color { a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8, ..self }
    }

    pub fn lerp(self, to: Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
        Color { a: mix(self.a, to.a), r: mix(self.r, to.r), g: mix(self.g, to.g), b: mix(self.b, to.b) }
    }
}

struct TagToken<'a> {
    start: usize,
    end: usize,
    closing: bool,
    name: String,
    param: Option<&'a str>,
    raw: &'a str,
}

fn scan(text: &str) -> impl Iterator<Item = TagToken<'_>> {
    TAG.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(TagToken {
            start: whole.start(),
            end: whole.end(),
            closing: caps.get(1).is_some_and(|m| m.as_str() == "/"),
            name: caps.get(2)?.as_str().to_lowercase(),
            param: caps.get(3).map(|m| m.as_str()),
            raw: whole.as_str(),
        })
    })
}

fn is_supported(name: &str) -> bool {
    SUPPORTED_TAGS.contains(&name)
}

/// Updates the tag stack; `false` means the token is literal text.
fn consume_tag(stack: &mut Vec<String>, tag: &TagToken<'_>) -> bool {
    if !is_supported(&tag.name) {
        return false;
    }
    if tag.closing {
        if stack.last() == Some(&tag.name) {
            stack.pop();
            true
        } else {
            false
        }
    } else {
        stack.push(tag.name.clone());
        true
    }
}

/// Byte length of the first `chars` characters of `s`.
fn byte_len(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

/// Number of characters left once recognised tags are removed.
pub fn visible_length(text: &str) -> usize {
    let mut length = 0;
    let mut cursor = 0;
    let mut stack = Vec::new();
    for tag in scan(text) {
        length += text[cursor..tag.start].chars().count();
        if !consume_tag(&mut stack, &tag) {
            length += tag.raw.chars().count();
        }
        cursor = tag.end;
    }
    length + text[cursor..].chars().count()
}

/// Raw byte offset at which the `visible`-th visible character boundary falls.
///
/// Recognised tags contribute no visible length, so an offset never lands
/// inside a tag; past the end it clamps to `text.len()`.
pub fn raw_index_for_visible_index(text: &str, visible: usize) -> usize {
    let mut seen = 0;
    let mut cursor = 0;
    let mut stack = Vec::new();
    for tag in scan(text) {
        let before = &text[cursor..tag.start];
        let n = before.chars().count();
        if seen + n >= visible {
            return cursor + byte_len(before, visible - seen);
        }
        seen += n;

        if !consume_tag(&mut stack, &tag) {
            let n = tag.raw.chars().count();
            if seen + n >= visible {
                return tag.start + byte_len(tag.raw, visible - seen);
            }
            seen += n;
        }
        cursor = tag.end;
    }
    let rest = &text[cursor..];
    if seen + rest.chars().count() >= visible {
        return cursor + byte_len(rest, visible - seen);
    }
    text.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub color: Option<Color>,
    pub size: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

/// Text split into runs of uniform style.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StyledText {
    pub spans: Vec<StyledSpan>,
}

impl StyledText {
    fn append(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(StyledSpan { text: text.to_string(), style }),
        }
    }

    /// The text with all markup removed.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Resolves style scopes from tags. Unsupported or unmatched tags, and a
/// `<size>` whose value is not a number, stay in the output as literal text.
pub fn styled_render(text: &str) -> StyledText {
    let mut out = StyledText::default();
    let mut styles = vec![Style::default()];
    let mut names: Vec<String> = Vec::new();
    let mut cursor = 0;

    for tag in scan(text) {
        let current = *styles.last().unwrap_or(&Style::default());
        out.append(&text[cursor..tag.start], current);
        cursor = tag.end;

        if !is_supported(&tag.name) {
            out.append(tag.raw, current);
            continue;
        }
        if tag.closing {
            if names.last() == Some(&tag.name) {
                names.pop();
                styles.pop();
            } else {
                out.append(tag.raw, current);
            }
            continue;
        }

        let mut next = current;
        match tag.name.as_str() {
            "b" => next.bold = true,
            "i" => next.italic = true,
            "u" => next.underline = true,
            "s" => next.strikethrough = true,
            "color" => next.color = tag.param.and_then(Color::parse_hex).or(current.color),
            "size" => match tag.param.and_then(|p| p.trim().parse::<f32>().ok()) {
                Some(size) => next.size = Some(size),
                None => {
                    out.append(tag.raw, current);
                    continue;
                }
            },
            _ => {}
        }
        styles.push(next);
        names.push(tag.name);
    }

    let current = *styles.last().unwrap_or(&Style::default());
    out.append(&text[cursor..], current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_respects_char_boundaries() {
        assert_eq!(byte_len("héllo", 2), 3);
        assert_eq!(byte_len("ab", 5), 2);
    }
}

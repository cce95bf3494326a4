//! Stateless scanning of a story buffer.
//!
//! Every function here looks at the buffer as it is right now and reports
//! complete elements by byte offset. An element whose end marker has not
//! arrived yet is simply not reported; the next scan over a longer buffer
//! will find it. Nothing is remembered between calls, de-duplication is the
//! extractor's job.

pub const NARRATOR_OPEN: &str = "<Narrator>";
pub const NARRATOR_CLOSE: &str = "</Narrator>";
pub const CHARACTER_OPEN: &str = "<character";
pub const CHARACTER_CLOSE: &str = "</character>";
pub const SAY_OPEN: &str = "<say>";
pub const SAY_CLOSE: &str = "</say>";

const EXPRESSION_ATTR: &str = "expression=\"";

/// A complete `<Narrator>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNarration<'a> {
    /// Byte offset of `<Narrator>` in the buffer.
    pub start: usize,
    /// The whole element, markers included.
    pub raw: &'a str,
    /// Untrimmed text between the markers.
    pub content: &'a str,
}

/// A complete `<character>` element with a non-empty `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCharacter<'a> {
    /// Byte offset of `<character` in the buffer.
    pub start: usize,
    /// The whole element, markers included.
    pub raw: &'a str,
    /// Start tag attributes in source order.
    pub attributes: Vec<(&'a str, &'a str)>,
    /// Everything between the start tag and `</character>`.
    pub content: &'a str,
}

impl<'a> RawCharacter<'a> {
    /// First value of `key` in the start tag.
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn name(&self) -> &'a str {
        self.attribute("name").unwrap_or_default()
    }

    /// The element's emotion: the start tag's `expression`, else the first
    /// non-empty `expression="..."` anywhere in the content.
    pub fn expression(&self) -> Option<&'a str> {
        self.attribute("expression")
            .filter(|e| !e.is_empty())
            .or_else(|| find_expression(self.content))
    }

    /// The element's `<say>` segments with any stray say markers removed,
    /// each trimmed, joined by a single space, and trimmed again.
    ///
    /// Blank segments still take part in the join, so
    /// `<say>a</say><say></say><say>b</say>` reads `"a  b"`.
    pub fn dialogue(&self) -> String {
        say_segments(self.content)
            .map(|segment| {
                segment
                    .replace(SAY_OPEN, "")
                    .replace(SAY_CLOSE, "")
                    .trim()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Find every complete narration element, left to right.
///
/// Content runs to the nearest `</Narrator>`, and the next search resumes
/// after it, so matches never overlap.
pub fn narration_matches(buf: &str) -> Vec<RawNarration<'_>> {
    let mut matches = Vec::new();
    let mut cursor = 0;

    while let Some(found) = buf[cursor..].find(NARRATOR_OPEN) {
        let start = cursor + found;
        let content_start = start + NARRATOR_OPEN.len();

        // Any later start would need a close marker after this one too.
        let Some(close) = buf[content_start..].find(NARRATOR_CLOSE) else {
            break;
        };
        let content_end = content_start + close;
        let end = content_end + NARRATOR_CLOSE.len();

        matches.push(RawNarration {
            start,
            raw: &buf[start..end],
            content: &buf[content_start..content_end],
        });
        cursor = end;
    }

    matches
}

/// Find every complete character element, left to right.
///
/// A `<character` whose start tag is malformed, incomplete, or lacks a
/// non-empty `name` is skipped and the search continues after it.
pub fn character_matches(buf: &str) -> Vec<RawCharacter<'_>> {
    let mut matches = Vec::new();
    let mut cursor = 0;

    while let Some(found) = buf[cursor..].find(CHARACTER_OPEN) {
        let start = cursor + found;
        let after_open = start + CHARACTER_OPEN.len();

        let Some((attributes, content_start)) = parse_start_tag(buf, after_open) else {
            cursor = after_open;
            continue;
        };
        let named = attributes
            .iter()
            .find(|(k, _)| *k == "name")
            .is_some_and(|(_, v)| !v.is_empty());
        if !named {
            cursor = after_open;
            continue;
        }

        let Some(close) = buf[content_start..].find(CHARACTER_CLOSE) else {
            break;
        };
        let content_end = content_start + close;
        let end = content_end + CHARACTER_CLOSE.len();

        matches.push(RawCharacter {
            start,
            raw: &buf[start..end],
            attributes,
            content: &buf[content_start..content_end],
        });
        cursor = end;
    }

    matches
}

/// Parse `key="value"` pairs from just after `<character` up to the closing
/// `>`. Returns the attributes and the offset just past `>`.
///
/// At least one whitespace character must separate the tag name from the
/// first attribute. `>` inside a quoted value does not end the tag.
fn parse_start_tag(buf: &str, from: usize) -> Option<(Vec<(&str, &str)>, usize)> {
    if !buf[from..].starts_with(char::is_whitespace) {
        return None;
    }

    let mut attributes = Vec::new();
    let mut pos = from;

    loop {
        let rest = &buf[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.starts_with('>') {
            return Some((attributes, pos + 1));
        }

        let eq = trimmed.find('=')?;
        let key = &trimmed[..eq];
        if key.is_empty() || key.contains(|c: char| c.is_whitespace() || "<>\"/".contains(c)) {
            return None;
        }

        let quoted = &trimmed[eq + 1..];
        let value_body = quoted.strip_prefix('"')?;
        let close = value_body.find('"')?;
        attributes.push((key, &value_body[..close]));

        // key, '=', opening quote, value, closing quote
        pos += eq + 1 + 1 + close + 1;

        let next = &buf[pos..];
        if !(next.starts_with('>') || next.starts_with(char::is_whitespace)) {
            return None;
        }
    }
}

/// Iterate over the raw text of each complete `<say>...</say>` segment.
pub fn say_segments(content: &str) -> impl Iterator<Item = &str> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let open = content[cursor..].find(SAY_OPEN)?;
        let text_start = cursor + open + SAY_OPEN.len();
        let close = content[text_start..].find(SAY_CLOSE)?;
        let text_end = text_start + close;
        cursor = text_end + SAY_CLOSE.len();
        Some(&content[text_start..text_end])
    })
}

/// First non-empty `expression="..."` value in `text`.
pub fn find_expression(text: &str) -> Option<&str> {
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(EXPRESSION_ATTR) {
        let value_start = cursor + found + EXPRESSION_ATTR.len();
        let close = text[value_start..].find('"')?;
        if close > 0 {
            return Some(&text[value_start..value_start + close]);
        }
        cursor = value_start;
    }
    None
}

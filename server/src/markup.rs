//! Page contract checks: the elements, defaults, help copy and stylesheet
//! rule the client script depends on.
//!
//! The HTML is scanned for start tags and their attributes, so attribute
//! order, quoting and whitespace do not matter.

use std::collections::BTreeMap;

pub const REQUIRED_IDS: [&str; 9] = [
    "setup-modal",
    "onboarding-modal",
    "human-count",
    "npc-count",
    "start-game-btn",
    "choices",
    "status-banner",
    "status-detail",
    "sim-canvas",
];

pub const HOW_TO_PLAY_LINES: [&str; 5] = [
    "Answer correctly to unlock your shot.",
    "Click and drag from the white cue ball to aim and set power.",
    "Release to shoot.",
    "After balls settle, a new question appears.",
    "Pool-themed quiz game (not regulation 8-ball)",
];

/// Expected attributes for the setup count inputs: (id, min, max, value).
pub const COUNT_INPUTS: [(&str, &str, &str, &str); 2] = [
    ("human-count", "1", "8", "1"),
    ("npc-count", "0", "8", "1"),
];

pub const HIDDEN_CLASS: &str = "is-hidden";

/// One start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Collect every start tag in document order. Comments, doctype and end tags
/// are skipped.
pub fn parse_elements(html: &str) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        if let Some(after) = rest.strip_prefix("!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }
        if rest.starts_with('/') || rest.starts_with('!') || rest.starts_with('?') {
            continue;
        }
        let (element, consumed) = parse_tag(rest);
        rest = &rest[consumed..];
        if let Some(element) = element {
            elements.push(element);
        }
    }
    elements
}

fn parse_tag(src: &str) -> (Option<Element>, usize) {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    if i == 0 {
        return (None, 0);
    }
    let tag = src[..i].to_ascii_lowercase();
    let mut attrs = BTreeMap::new();

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = src[name_start..i].to_ascii_lowercase();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let value_start = i + 1;
                i = value_start;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = src[value_start..i].to_string();
                i = (i + 1).min(bytes.len());
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = src[value_start..i].to_string();
            }
        }
        if !name.is_empty() {
            attrs.entry(name).or_insert(value);
        }
    }
    (Some(Element { tag, attrs }), i)
}

/// Visible text with tags removed and whitespace collapsed.
pub fn text_content(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when some rule whose selector list names `.class` on its own
/// declares `pointer-events: none`.
pub fn css_rule_has_pointer_events_none(css: &str, class: &str) -> bool {
    let selector = format!(".{class}");
    let mut rest = css;
    while let Some(open) = rest.find('{') {
        let selectors = strip_css_comments(&rest[..open]);
        let Some(close) = rest[open..].find('}') else {
            return false;
        };
        let body = strip_css_comments(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];

        let names_class = selectors.split(',').any(|s| s.trim() == selector);
        if !names_class {
            continue;
        }
        let declares = body.split(';').any(|decl| {
            let mut parts = decl.splitn(2, ':');
            let property = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();
            property.eq_ignore_ascii_case("pointer-events")
                && value.trim_end_matches("!important").trim().eq_ignore_ascii_case("none")
        });
        if declares {
            return true;
        }
    }
    false
}

fn strip_css_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = rest[start + 2..].find("*/").map_or("", |end| &rest[start + 2 + end + 2..]);
    }
    out.push_str(rest);
    out
}

/// Check the page markup. Returns one line per violation.
pub fn check_markup(html: &str) -> Vec<String> {
    let elements = parse_elements(html);
    let by_id: BTreeMap<&str, &Element> = elements
        .iter()
        .filter_map(|e| e.attr("id").map(|id| (id, e)))
        .collect();

    let mut violations = Vec::new();
    for id in REQUIRED_IDS {
        if !by_id.contains_key(id) {
            violations.push(format!("missing element id=\"{id}\""));
        }
    }

    for (id, min, max, value) in COUNT_INPUTS {
        let Some(element) = by_id.get(id) else {
            continue;
        };
        if element.tag != "input" || element.attr("type") != Some("number") {
            violations.push(format!("#{id} must be <input type=\"number\">"));
        }
        for (name, expected) in [("min", min), ("max", max), ("value", value)] {
            let actual = element.attr(name);
            if actual != Some(expected) {
                violations.push(format!(
                    "#{id} {name} must be \"{expected}\", found {}",
                    actual.map_or("nothing".to_string(), |a| format!("\"{a}\""))
                ));
            }
        }
    }

    let text = text_content(html);
    for line in HOW_TO_PLAY_LINES {
        if !text.contains(line) {
            violations.push(format!("missing how-to-play copy: {line:?}"));
        }
    }
    violations
}

/// Check the stylesheet keeps hidden overlays click-through.
pub fn check_stylesheet(css: &str) -> Vec<String> {
    if css_rule_has_pointer_events_none(css, HIDDEN_CLASS) {
        Vec::new()
    } else {
        vec![format!(".{HIDDEN_CLASS} must declare pointer-events: none")]
    }
}

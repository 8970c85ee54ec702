//! Human-readable rendering for console mirroring.

use std::collections::HashSet;

use colored::Colorize;
use flowscope_value::{Class, Value, format_number};

/// Nesting depth used when mirroring objects to the console.
pub const CONSOLE_DEPTH: usize = 10;
/// Depth used for one-line scalar inspection.
pub const DEFAULT_DEPTH: usize = 2;

const BREAK_LENGTH: usize = 80;
const MAX_ARRAY_ITEMS: usize = 100;
const MAX_BUFFER_BYTES: usize = 50;

#[derive(Clone, Copy)]
enum Style {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Special,
}

/// Renders values as an interactive console would print them.
///
/// Containers deeper than the configured depth collapse to `[Object]` /
/// `[Array]`. A container met again on its own path prints as
/// `[Circular]`; one already printed elsewhere prints as `[Repeated]`.
///
/// ```
/// use flowscope_debug::Inspector;
/// use flowscope_value::Value;
///
/// let value = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);
/// assert_eq!(Inspector::new(2, false).inspect(&value), "{ a: 1, b: 'x' }");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Inspector {
    depth: usize,
    colors: bool,
}

impl Inspector {
    /// Inspector descending `depth` levels, with or without ANSI colours.
    #[must_use]
    pub const fn new(depth: usize, colors: bool) -> Self {
        Self { depth, colors }
    }

    /// Render `value`.
    pub fn inspect(&self, value: &Value) -> String {
        self.format(value, 0, &mut Seen::default())
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if !self.colors {
            return text.to_owned();
        }
        match style {
            Style::Undefined => text.dimmed().to_string(),
            Style::Null => text.bold().to_string(),
            Style::Boolean => text.red().to_string(),
            Style::Number => text.yellow().to_string(),
            Style::String => text.green().to_string(),
            Style::Special => text.cyan().to_string(),
        }
    }

    /// `[Circular]` or `[Repeated]` when `identity` must not be expanded.
    fn revisit(&self, identity: usize, seen: &Seen) -> Option<String> {
        if seen.path.contains(&identity) {
            Some(self.paint("[Circular]", Style::Special))
        } else if seen.expanded.contains(&identity) {
            Some(self.paint("[Repeated]", Style::Special))
        } else {
            None
        }
    }

    fn format(&self, value: &Value, level: usize, seen: &mut Seen) -> String {
        match value {
            Value::Undefined => self.paint("undefined", Style::Undefined),
            Value::Null => self.paint("null", Style::Null),
            Value::Bool(b) => self.paint(&b.to_string(), Style::Boolean),
            Value::Number(n) => self.paint(&format_number(*n), Style::Number),
            Value::String(s) => self.paint(&quote(s), Style::String),
            Value::Error(e) => format!("[{e}]"),
            Value::Bytes(bytes) => {
                let shown: Vec<String> = bytes
                    .iter()
                    .take(MAX_BUFFER_BYTES)
                    .map(|b| format!("{b:02x}"))
                    .collect();
                let mut out = format!("<Buffer {}", shown.join(" "));
                if bytes.len() > MAX_BUFFER_BYTES {
                    out.push_str(&format!(" ... {} more bytes", bytes.len() - MAX_BUFFER_BYTES));
                }
                out.push('>');
                out
            }
            Value::Array(array) => {
                let identity = array.identity();
                if let Some(marker) = self.revisit(identity, seen) {
                    return marker;
                }
                if level > self.depth {
                    return self.paint("[Array]", Style::Special);
                }
                let (items, len) = {
                    let guard = array.read();
                    (guard.iter().take(MAX_ARRAY_ITEMS).cloned().collect::<Vec<_>>(), guard.len())
                };
                seen.enter(identity);
                let mut entries: Vec<String> =
                    items.iter().map(|item| self.format(item, level + 1, seen)).collect();
                seen.path.pop();
                if len > MAX_ARRAY_ITEMS {
                    let rest = len - MAX_ARRAY_ITEMS;
                    entries.push(format!("... {rest} more item{}", if rest == 1 { "" } else { "s" }));
                }
                wrap("", "[", "]", &entries, level)
            }
            Value::Object(object) => {
                let class = match object.class() {
                    Class::Named(name) if !name.is_empty() && name != "Object" => Some(name.as_str()),
                    _ => None,
                };
                let identity = object.identity();
                if let Some(marker) = self.revisit(identity, seen) {
                    return marker;
                }
                if level > self.depth {
                    let label = format!("[{}]", class.unwrap_or("Object"));
                    return self.paint(&label, Style::Special);
                }
                let fields: Vec<(String, Value)> = object
                    .read()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                seen.enter(identity);
                let entries: Vec<String> = fields
                    .iter()
                    .map(|(key, item)| format!("{}: {}", format_key(key), self.format(item, level + 1, seen)))
                    .collect();
                seen.path.pop();
                let prefix = class.map(|name| format!("{name} ")).unwrap_or_default();
                wrap(&prefix, "{", "}", &entries, level)
            }
        }
    }
}

/// Containers on the current path, and every container expanded so far.
#[derive(Default)]
struct Seen {
    path: Vec<usize>,
    expanded: HashSet<usize>,
}

impl Seen {
    fn enter(&mut self, identity: usize) {
        self.path.push(identity);
        self.expanded.insert(identity);
    }
}

/// One line when it fits, otherwise one entry per line.
fn wrap(prefix: &str, open: &str, close: &str, entries: &[String], level: usize) -> String {
    if entries.is_empty() {
        return format!("{prefix}{open}{close}");
    }
    let single = format!("{prefix}{open} {} {close}", entries.join(", "));
    if visible_len(&single) <= BREAK_LENGTH && !entries.iter().any(|e| e.contains('\n')) {
        return single;
    }
    let pad = "  ".repeat(level + 1);
    let closing = "  ".repeat(level);
    format!(
        "{prefix}{open}\n{pad}{}\n{closing}{close}",
        entries.join(&format!(",\n{pad}"))
    )
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier { key.to_owned() } else { quote(key) }
}

/// Length in characters, ignoring ANSI colour sequences.
fn visible_len(text: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => len += 1,
        }
    }
    len
}

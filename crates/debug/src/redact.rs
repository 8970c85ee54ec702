//! Depth-first, cycle-safe conversion of structured values to JSON.
//!
//! Rules applied to every member below the root:
//! - members named `_req` or `_res` become `"[internal]"`;
//! - errors become their string form;
//! - arrays longer than the bound become an `__encoded__` wrapper holding
//!   the first `max_length` elements and the original length;
//! - strings longer than the bound are cut and suffixed with `...`;
//! - bytes become `{"type": "Buffer", "data": [...]}`;
//! - a handle already on the current path becomes `"[Circular ~.path]"`;
//! - a handle already expanded elsewhere becomes `"[Repeated ~.path]"`,
//!   naming where it was first written out.
//!
//! Every handle is expanded at most once per call, so the work and the
//! output grow with the number of distinct handles, never with the number
//! of paths through a shared graph.

use std::collections::HashMap;

use flowscope_value::{ArrayRef, ObjectRef, Value, number_to_json};
use serde_json::{Map, Value as Json, json};

/// Replacement for request/response handles.
pub const INTERNAL: &str = "[internal]";
/// Replacement for members nested deeper than [`MAX_DEPTH`].
pub const MAX_DEPTH_MARKER: &str = "[Max depth]";
/// Deepest container nesting the walk descends into.
pub const MAX_DEPTH: usize = 1000;

/// Applies the redaction rules under a fixed size bound.
#[derive(Debug, Clone, Copy)]
pub struct Redactor {
    max_length: usize,
}

impl Redactor {
    /// Redactor truncating at `max_length`.
    #[must_use]
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// The size bound.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Redact a whole value. Top-level `undefined` becomes `null`.
    pub fn redact(&self, root: &Value) -> Json {
        let mut walk = Walk::new(self.max_length);
        match root {
            Value::Array(array) => walk.root_array(array),
            Value::Object(object) => walk.object("", object),
            other => walk.member("", other, false).unwrap_or(Json::Null),
        }
    }

    /// Redact only the named members of `object`, in the given order.
    ///
    /// Missing and undefined members are left out.
    pub fn redact_fields(&self, object: &ObjectRef, keys: &[&str]) -> Json {
        let mut walk = Walk::new(self.max_length);
        walk.enter(Some(object.identity()), "");
        let mut out = Map::new();
        for key in keys {
            if let Some(value) = object.get(key)
                && let Some(json) = walk.member(key, &value, true)
            {
                out.insert((*key).to_owned(), json);
            }
        }
        Json::Object(out)
    }

    /// Cut `text` to the bound, appending `...` when anything was removed.
    #[must_use]
    pub fn truncate(&self, text: &str) -> String {
        truncate_chars(text, self.max_length)
    }
}

/// First `max` characters of `text` plus `...`, or `text` unchanged.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// `{"type": "Buffer", "data": [...]}`, with the long-array rule applied to `data`.
fn buffer_json(bytes: &[u8], max: usize) -> Json {
    let data: Vec<Json> = bytes.iter().take(max).map(|b| Json::from(*b)).collect();
    let data = if bytes.len() > max {
        encoded_array(Json::Array(data), bytes.len())
    } else {
        Json::Array(data)
    };
    json!({ "type": "Buffer", "data": data })
}

fn encoded_array(data: Json, length: usize) -> Json {
    json!({
        "__encoded__": true,
        "type": "array",
        "data": data,
        "length": length,
    })
}

/// A container on the current path.
struct Frame {
    /// Shared-handle identity; `None` for containers made up during the walk.
    identity: Option<usize>,
    /// Key under which the container was reached.
    key: String,
}

impl Frame {
    fn new(identity: Option<usize>, key: &str) -> Self {
        Self {
            identity,
            key: key.to_owned(),
        }
    }
}

struct Walk {
    max: usize,
    frames: Vec<Frame>,
    /// Handles already expanded, with the path they were expanded at.
    expanded: HashMap<usize, String>,
}

impl Walk {
    fn new(max: usize) -> Self {
        Self {
            max,
            frames: Vec::new(),
            expanded: HashMap::new(),
        }
    }

    /// Put a container on the path. Shared handles are remembered so
    /// later encounters off the path are not expanded again.
    fn enter(&mut self, identity: Option<usize>, key: &str) {
        self.frames.push(Frame::new(identity, key));
        if let Some(identity) = identity {
            let path = self.path_to(self.frames.len() - 1);
            self.expanded.entry(identity).or_insert(path);
        }
    }

    /// `None` means the member is omitted (an undefined object member).
    fn member(&mut self, key: &str, value: &Value, in_object: bool) -> Option<Json> {
        if in_object && (key == "_req" || key == "_res") {
            return Some(Json::String(INTERNAL.to_owned()));
        }
        if let Some(identity) = handle_identity(value) {
            if let Some(pos) = self.frames.iter().position(|f| f.identity == Some(identity)) {
                return Some(self.string(&marker("Circular", &self.path_to(pos))));
            }
            if let Some(first) = self.expanded.get(&identity) {
                return Some(self.string(&marker("Repeated", first)));
            }
        }
        Some(match value {
            Value::Undefined => return None,
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => self.string(s),
            Value::Error(e) => self.string(&e.to_string()),
            Value::Bytes(b) => buffer_json(b, self.max),
            Value::Array(array) => self.array(key, array),
            Value::Object(object) => self.object(key, object),
        })
    }

    fn string(&self, text: &str) -> Json {
        Json::String(truncate_chars(text, self.max))
    }

    /// Dotted path from the root to the frame at `pos`; empty for the root.
    fn path_to(&self, pos: usize) -> String {
        let keys: Vec<&str> = self.frames[1..=pos].iter().map(|f| f.key.as_str()).collect();
        keys.join(".")
    }

    fn too_deep(&self) -> bool {
        self.frames.len() >= MAX_DEPTH
    }

    /// The top-level array. When it is longer than the bound it is replaced
    /// by a fresh prefix, so the original array is not on the path.
    fn root_array(&mut self, array: &ArrayRef) -> Json {
        let (items, len) = prefix(array, self.max);
        let identity = (len <= self.max).then(|| array.identity());
        self.enter(identity, "");
        let out = self.elements(&items);
        self.frames.pop();
        Json::Array(out)
    }

    fn array(&mut self, key: &str, array: &ArrayRef) -> Json {
        if self.too_deep() {
            return Json::String(MAX_DEPTH_MARKER.to_owned());
        }
        let (items, len) = prefix(array, self.max);
        self.enter(Some(array.identity()), key);
        let out = if len > self.max {
            self.enter(None, "data");
            let data = self.elements(&items);
            self.frames.pop();
            encoded_array(Json::Array(data), len)
        } else {
            Json::Array(self.elements(&items))
        };
        self.frames.pop();
        out
    }

    fn elements(&mut self, items: &[Value]) -> Vec<Json> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.member(&i.to_string(), item, false).unwrap_or(Json::Null))
            .collect()
    }

    fn object(&mut self, key: &str, object: &ObjectRef) -> Json {
        if self.too_deep() {
            return Json::String(MAX_DEPTH_MARKER.to_owned());
        }
        let fields: Vec<(String, Value)> = object
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.enter(Some(object.identity()), key);
        let mut out = Map::new();
        for (name, value) in &fields {
            if let Some(json) = self.member(name, value, true) {
                out.insert(name.clone(), json);
            }
        }
        self.frames.pop();
        Json::Object(out)
    }
}

fn marker(kind: &str, path: &str) -> String {
    if path.is_empty() {
        format!("[{kind} ~]")
    } else {
        format!("[{kind} ~.{path}]")
    }
}

fn handle_identity(value: &Value) -> Option<usize> {
    match value {
        Value::Array(array) => Some(array.identity()),
        Value::Object(object) => Some(object.identity()),
        _ => None,
    }
}

/// The first `max` elements and the full length, read under one lock.
fn prefix(array: &ArrayRef, max: usize) -> (Vec<Value>, usize) {
    let items = array.read();
    (items.iter().take(max).cloned().collect(), items.len())
}

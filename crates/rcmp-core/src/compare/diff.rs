//! Structural diff over two JSON trees.
//!
//! Objects are matched by key and arrays by index. Every node ends up as
//! unchanged, modified, added (candidate only) or removed (reference only).
//! Container nodes are only kept when at least one descendant changed;
//! otherwise the whole subtree collapses into [`Delta::Unchanged`].

use std::fmt;

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Unchanged(Value),
    Modified { reference: Value, candidate: Value },
    /// Present only in the candidate.
    Added(Value),
    /// Present only in the reference.
    Removed(Value),
    /// An object with at least one changed entry. Entries are sorted by key.
    Object(Vec<(String, Delta)>),
    /// An array with at least one changed element.
    Array(Vec<(usize, Delta)>),
}

impl Delta {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Delta::Unchanged(_))
    }

    /// Every leaf-level change with its path from the root.
    pub fn changes(&self) -> Vec<Change> {
        let mut out = Vec::new();
        collect_changes(self, &mut Vec::new(), &mut out);
        out
    }
}

// ---------------------------------------------------------------------------
// Change: flattened view for counting and assertions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    Modified { reference: Value, candidate: Value },
    Added(Value),
    Removed(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Vec<PathSegment>,
    pub kind: ChangeKind,
}

impl Change {
    /// Dotted path with bracketed indices, e.g. `response.series[2]`.
    pub fn path_string(&self) -> String {
        let mut s = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !s.is_empty() {
                        s.push('.');
                    }
                    s.push_str(key);
                }
                PathSegment::Index(i) => {
                    s.push('[');
                    s.push_str(&i.to_string());
                    s.push(']');
                }
            }
        }
        s
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChangeKind::Modified {
                reference,
                candidate,
            } => write!(f, "{}: modified {reference} -> {candidate}", self.path_string()),
            ChangeKind::Added(value) => write!(f, "{}: added {value}", self.path_string()),
            ChangeKind::Removed(value) => write!(f, "{}: removed {value}", self.path_string()),
        }
    }
}

fn collect_changes(delta: &Delta, path: &mut Vec<PathSegment>, out: &mut Vec<Change>) {
    match delta {
        Delta::Unchanged(_) => {}
        Delta::Modified {
            reference,
            candidate,
        } => out.push(Change {
            path: path.clone(),
            kind: ChangeKind::Modified {
                reference: reference.clone(),
                candidate: candidate.clone(),
            },
        }),
        Delta::Added(value) => out.push(Change {
            path: path.clone(),
            kind: ChangeKind::Added(value.clone()),
        }),
        Delta::Removed(value) => out.push(Change {
            path: path.clone(),
            kind: ChangeKind::Removed(value.clone()),
        }),
        Delta::Object(entries) => {
            for (key, child) in entries {
                path.push(PathSegment::Key(key.clone()));
                collect_changes(child, path, out);
                path.pop();
            }
        }
        Delta::Array(elements) => {
            for (index, child) in elements {
                path.push(PathSegment::Index(*index));
                collect_changes(child, path, out);
                path.pop();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

/// Compare `reference` against `candidate`.
pub fn diff(reference: &Value, candidate: &Value) -> Delta {
    match (reference, candidate) {
        (Value::Object(r), Value::Object(c)) => diff_objects(r, c),
        (Value::Array(r), Value::Array(c)) => diff_arrays(r, c),
        _ if scalars_equal(reference, candidate) => Delta::Unchanged(reference.clone()),
        _ => Delta::Modified {
            reference: reference.clone(),
            candidate: candidate.clone(),
        },
    }
}

fn diff_objects(reference: &Map<String, Value>, candidate: &Map<String, Value>) -> Delta {
    let mut entries: Vec<(String, Delta)> = Vec::with_capacity(reference.len());

    for (key, r) in reference {
        let delta = match candidate.get(key) {
            Some(c) => diff(r, c),
            None => Delta::Removed(r.clone()),
        };
        entries.push((key.clone(), delta));
    }
    for (key, c) in candidate {
        if !reference.contains_key(key) {
            entries.push((key.clone(), Delta::Added(c.clone())));
        }
    }

    if entries.iter().all(|(_, d)| !d.is_changed()) {
        return Delta::Unchanged(Value::Object(reference.clone()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Delta::Object(entries)
}

fn diff_arrays(reference: &[Value], candidate: &[Value]) -> Delta {
    let len = reference.len().max(candidate.len());
    let mut elements = Vec::with_capacity(len);

    for index in 0..len {
        let delta = match (reference.get(index), candidate.get(index)) {
            (Some(r), Some(c)) => diff(r, c),
            (Some(r), None) => Delta::Removed(r.clone()),
            (None, Some(c)) => Delta::Added(c.clone()),
            (None, None) => continue,
        };
        elements.push((index, delta));
    }

    if elements.iter().all(|(_, d)| !d.is_changed()) {
        return Delta::Unchanged(Value::Array(reference.to_vec()));
    }
    Delta::Array(elements)
}

/// Leaf equality. Numbers compare by value, so `1` equals `1.0`; two integers
/// still compare exactly.
fn scalars_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x.is_f64() || y.is_f64() {
                matches!((x.as_f64(), y.as_f64()), (Some(fx), Some(fy)) if fx == fy)
            } else {
                false
            }
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Plain-text rendering of a [`Delta`] tree.
//!
//! One line per node, indented by depth, with array indices written out.
//! The first column marks the line:
//!
//! ```text
//!   {
//!     "response": {
//!       "series": [
//! ~       2: 3 => 4
//!       ]
//!     }
//!   }
//! ```
//!
//! `~` is a modification (`reference => candidate`), `+` a value present only
//! in the candidate, `-` a value present only in the reference. Leaf values
//! are printed as compact JSON so every change fits on a single line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compare::diff::Delta;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RenderOptions {
    /// Also print unchanged siblings of changed nodes.
    pub include_unchanged: bool,
}

pub const MARK_UNCHANGED: char = ' ';
pub const MARK_MODIFIED: char = '~';
pub const MARK_ADDED: char = '+';
pub const MARK_REMOVED: char = '-';

enum Label<'a> {
    None,
    Key(&'a str),
    Index(usize),
}

impl Label<'_> {
    fn prefix(&self) -> String {
        match self {
            Label::None => String::new(),
            Label::Key(key) => format!("{}: ", Value::String((*key).to_string())),
            Label::Index(i) => format!("{i}: "),
        }
    }
}

/// Render `delta` as indented text. Returns an empty string when nothing
/// changed and unchanged lines are not requested.
pub fn render(delta: &Delta, options: &RenderOptions) -> String {
    let mut out = String::new();
    render_node(&mut out, &Label::None, delta, 0, options);
    out
}

fn render_node(
    out: &mut String,
    label: &Label<'_>,
    delta: &Delta,
    depth: usize,
    options: &RenderOptions,
) {
    let prefix = label.prefix();
    match delta {
        Delta::Unchanged(value) => {
            if options.include_unchanged {
                push_line(out, MARK_UNCHANGED, depth, &format!("{prefix}{value}"));
            }
        }
        Delta::Modified {
            reference,
            candidate,
        } => push_line(
            out,
            MARK_MODIFIED,
            depth,
            &format!("{prefix}{reference} => {candidate}"),
        ),
        Delta::Added(value) => push_line(out, MARK_ADDED, depth, &format!("{prefix}{value}")),
        Delta::Removed(value) => push_line(out, MARK_REMOVED, depth, &format!("{prefix}{value}")),
        Delta::Object(entries) => {
            push_line(out, MARK_UNCHANGED, depth, &format!("{prefix}{{"));
            for (key, child) in entries {
                render_node(out, &Label::Key(key), child, depth + 1, options);
            }
            push_line(out, MARK_UNCHANGED, depth, "}");
        }
        Delta::Array(elements) => {
            push_line(out, MARK_UNCHANGED, depth, &format!("{prefix}["));
            for (index, child) in elements {
                render_node(out, &Label::Index(*index), child, depth + 1, options);
            }
            push_line(out, MARK_UNCHANGED, depth, "]");
        }
    }
}

fn push_line(out: &mut String, mark: char, depth: usize, text: &str) {
    out.push(mark);
    out.push(' ');
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::diff::diff;
    use crate::compare::normalize::normalize;
    use serde_json::json;

    fn render_bodies(reference: &str, candidate: &str, include_unchanged: bool) -> String {
        let delta = diff(&normalize(reference).unwrap(), &normalize(candidate).unwrap());
        render(&delta, &RenderOptions { include_unchanged })
    }

    #[test]
    fn modified_index_renders_on_one_line() {
        let text = render_bodies(r#"{"series":[1,2,3]}"#, r#"{"series":[1,2,4]}"#, false);
        let expected = "  {\n    \"response\": {\n      \"series\": [\n~       2: 3 => 4\n      ]\n    }\n  }\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn include_unchanged_shows_context_lines() {
        let text = render_bodies("[1,2,3]", "[1,2,4]", true);
        assert!(text.contains("\n      0: 1\n"));
        assert!(text.contains("\n      1: 2\n"));
        assert!(text.contains("\n~     2: 3 => 4\n"));
    }

    #[test]
    fn added_and_removed_lines_are_marked() {
        let text = render_bodies(r#"{"a":1}"#, r#"{"b":[1,2]}"#, false);
        assert!(text.contains("\n-     \"a\": 1\n"));
        assert!(text.contains("\n+     \"b\": [1,2]\n"));
    }

    #[test]
    fn every_change_occupies_exactly_one_line() {
        let text = render_bodies(
            r#"[{"target":"a","datapoints":[[1,10],[2,20]]}]"#,
            r#"[{"target":"b","datapoints":[[1,10],[3,20]],"tags":{"x":"y"}}]"#,
            false,
        );
        let change_lines = text
            .lines()
            .filter(|l| l.starts_with(['~', '+', '-']))
            .count();
        assert_eq!(change_lines, 3);
    }

    #[test]
    fn keys_are_json_quoted() {
        let delta = diff(&json!({"we\"ird": 1}), &json!({"we\"ird": 2}));
        let text = render(&delta, &RenderOptions::default());
        assert!(text.contains(r#""we\"ird": 1 => 2"#));
    }

    #[test]
    fn unchanged_delta_renders_nothing_by_default() {
        let delta = diff(&json!([1]), &json!([1]));
        assert!(render(&delta, &RenderOptions::default()).is_empty());
    }

    #[test]
    fn unchanged_delta_renders_value_when_requested() {
        let delta = diff(&json!([1]), &json!([1]));
        let text = render(
            &delta,
            &RenderOptions {
                include_unchanged: true,
            },
        );
        assert_eq!(text, "  [1]\n");
    }
}

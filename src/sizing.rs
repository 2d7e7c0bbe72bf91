//! The sizing pre-pass: a non-mutating walk of the JSON event
//! stream that determines `expression_count` and, for every stack depth, how
//! many argument slots that depth will need — all before the tree buffer is
//! allocated, so the populate phase never reallocates the fixed sections.

use std::collections::HashMap;
use std::path::Path;

use crate::csv_inline::{self, CsvShape};
use crate::events::Event;
use crate::{Error, Options};

/// `layer_start[d]` is depth `d`'s next free argument slot: the raw
/// per-depth counts are converted into a running cumulative sum so the
/// builder can use a single flat values array instead of one per depth.
#[derive(Debug, Clone)]
pub struct SizingPlan {
    pub expression_count: u64,
    pub total_arguments: u64,
    pub layer_start: Vec<u64>,
    /// shape of every `.csv` file referenced, keyed by the path used to open
    /// it (`csv_prefix` joined onto the filename), so the builder can detect
    /// a file that grew between passes.
    pub csv_shapes: HashMap<String, CsvShape>,
}

/// Tracks, for each currently open frame (indexed by depth), whether that
/// frame is a JSON-object-entry key-wrapper that auto-closes after its one
/// child. Shared verbatim between the sizing pass and the builder so the two
/// can never disagree about where depth changes happen.
#[derive(Default)]
struct FrameStack {
    is_key_wrapper: Vec<bool>,
}

impl FrameStack {
    fn depth(&self) -> usize {
        self.is_key_wrapper.len()
    }
    fn push(&mut self, is_key_wrapper: bool) {
        self.is_key_wrapper.push(is_key_wrapper);
    }
    fn pop(&mut self) -> Option<bool> {
        self.is_key_wrapper.pop()
    }
    fn top_is_key_wrapper(&self) -> bool {
        self.is_key_wrapper.last().copied().unwrap_or(false)
    }
}

fn ensure_depth(counts: &mut Vec<u64>, depth: usize) {
    if counts.len() <= depth {
        counts.resize(depth + 1, 0);
    }
}

pub fn plan(events: &[Event], options: &Options) -> Result<SizingPlan, Error> {
    let mut expression_count: u64 = 0;
    let mut arg_count: Vec<u64> = Vec::new();
    let mut csv_shapes: HashMap<String, CsvShape> = HashMap::new();
    let mut frames = FrameStack::default();

    for event in events {
        match event {
            Event::Key(_) => {
                let d = frames.depth();
                ensure_depth(&mut arg_count, d);
                arg_count[d] += 1;
                expression_count += 1;
                frames.push(true);
            }
            Event::ObjectStart | Event::ArrayStart => {
                let d = frames.depth();
                ensure_depth(&mut arg_count, d);
                arg_count[d] += 1;
                expression_count += 1;
                frames.push(false);
            }
            Event::ObjectEnd | Event::ArrayEnd => {
                frames.pop();
                if frames.top_is_key_wrapper() {
                    frames.pop();
                }
            }
            Event::Str(s) if !options.disable_csv_handling && is_csv_path(s) => {
                let d = frames.depth();
                ensure_depth(&mut arg_count, d);
                arg_count[d] += 1; // the Table expression's own slot
                expression_count += 1;

                let path = options.csv_prefix.join(s);
                let shape = csv_inline::probe(&path)?;
                let cols = shape.columns.len() as u64;
                let rows = shape.rows as u64;

                ensure_depth(&mut arg_count, d + 2);
                arg_count[d + 1] += cols; // column expressions
                expression_count += cols;
                arg_count[d + 2] += cols * rows; // cell values

                csv_shapes.insert(path.to_string_lossy().into_owned(), shape);

                if frames.top_is_key_wrapper() {
                    frames.pop();
                }
            }
            Event::Null | Event::Bool(_) | Event::Long(_) | Event::Double(_) | Event::Str(_) => {
                let d = frames.depth();
                ensure_depth(&mut arg_count, d);
                arg_count[d] += 1;
                if frames.top_is_key_wrapper() {
                    frames.pop();
                }
            }
        }
    }

    let mut layer_start = vec![0u64; arg_count.len()];
    let mut running = 0u64;
    for (i, n) in arg_count.iter().enumerate() {
        layer_start[i] = running;
        running += n;
    }

    Ok(SizingPlan {
        expression_count,
        total_arguments: running,
        layer_start,
        csv_shapes,
    })
}

pub fn is_csv_path(s: &str) -> bool {
    Path::new(s)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::flatten;

    fn sized(json: &str) -> SizingPlan {
        let v: serde_json::Value = serde_json::from_str(json).unwrap();
        let events = flatten(&v);
        plan(&events, &Options::default()).unwrap()
    }

    #[test]
    fn empty_object() {
        let p = sized("{}");
        assert_eq!(p.expression_count, 1);
        assert_eq!(p.layer_start, vec![0]);
    }

    #[test]
    fn flat_array() {
        let p = sized("[1,2,3]");
        assert_eq!(p.expression_count, 1);
        // depth 0: the List expression itself (1 arg); depth 1: 3 scalars
        assert_eq!(p.layer_start, vec![0, 1]);
    }

    #[test]
    fn object_with_two_keys() {
        let p = sized(r#"{"a":1,"b":2}"#);
        // Object(1) + 2 keys = 3 expressions
        assert_eq!(p.expression_count, 3);
        // depth0: object's own slot(1) + 2 EXPRESSION args for "a","b" wrappers = 3
        // depth1: each key-wrapper's single scalar child = 2
        assert_eq!(p.layer_start, vec![0, 3]);
    }
}

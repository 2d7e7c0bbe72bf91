//! Flattens a `serde_json::Value` tree into an ordered event stream
//! (`null, bool, int, float, string, key, object_start,
//! object_end, array_start, array_end`). `binary` has no representation in
//! `serde_json::Value` and is therefore structurally unreachable rather than
//! merely rejected at runtime.
//!
//! The sizing pre-pass (`sizing.rs`) and the streaming builder (`builder.rs`)
//! each walk this same `Vec<Event>` once, in order, the way the original
//! drives one SAX handler over the same bytes twice.

#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    Str(&'a str),
    Key(&'a str),
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
}

pub fn flatten(value: &serde_json::Value) -> Vec<Event<'_>> {
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

fn walk<'a>(value: &'a serde_json::Value, out: &mut Vec<Event<'a>>) {
    use serde_json::Value;
    match value {
        Value::Null => out.push(Event::Null),
        Value::Bool(b) => out.push(Event::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push(Event::Long(i));
            } else if let Some(u) = n.as_u64() {
                out.push(Event::Long(u as i64));
            } else {
                out.push(Event::Double(n.as_f64().unwrap_or(f64::NAN)));
            }
        }
        Value::String(s) => out.push(Event::Str(s)),
        Value::Array(items) => {
            out.push(Event::ArrayStart);
            for item in items {
                walk(item, out);
            }
            out.push(Event::ArrayEnd);
        }
        Value::Object(map) => {
            out.push(Event::ObjectStart);
            for (k, v) in map {
                out.push(Event::Key(k));
                walk(v, out);
            }
            out.push(Event::ObjectEnd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_nested_object() {
        let v: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":[true,null]}"#).unwrap();
        let events = flatten(&v);
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                Event::Null => "null",
                Event::Bool(_) => "bool",
                Event::Long(_) => "long",
                Event::Double(_) => "double",
                Event::Str(_) => "str",
                Event::Key(_) => "key",
                Event::ObjectStart => "object_start",
                Event::ObjectEnd => "object_end",
                Event::ArrayStart => "array_start",
                Event::ArrayEnd => "array_end",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "object_start",
                "key",
                "long",
                "key",
                "array_start",
                "bool",
                "null",
                "array_end",
                "object_end",
            ]
        );
    }
}

//! Zero-copy traversal of a sealed Wisent tree.
//!
//! `Tree::new` borrows the buffer and validates the header; every string and
//! scalar handed back by `Expr`/`Arg` borrows directly from that buffer with
//! no copying. The tag array is the one exception: RLE folding makes it
//! cheaper to unfold once, up front, into an owned `Vec<u8>` than to
//! re-derive a slot's tag on every lookup.

use crate::layout::{self, ArgType, Header};
use crate::tagrle;
use crate::Error;

pub struct Tree<'a> {
    buf: &'a [u8],
    header: Header,
    tags: Vec<u8>,
}

impl<'a> Tree<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self, Error> {
        if buf.len() < layout::HEADER_LEN {
            return Err(Error::MalformedInput("buffer shorter than header".into()));
        }
        let header = Header::read(buf);
        let expected_end = layout::string_pool_range(&header).end;
        if buf.len() < expected_end {
            return Err(Error::MalformedInput(format!(
                "buffer truncated: header implies {expected_end} bytes, got {}",
                buf.len()
            )));
        }
        let physical_tags = &buf[layout::tags_range(&header)];
        let tags = tagrle::unfold(physical_tags, header.logical_argument_count as usize);
        if tags.len() as u64 != header.logical_argument_count {
            return Err(Error::InternalInvariant(
                "unfolded tag count disagreed with logical_argument_count".into(),
            ));
        }
        Ok(Tree { buf, header, tags })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The document's outermost expression, always expression index 0 for
    /// any tree built from a composite (object/array) JSON root.
    pub fn root(&self) -> Expr<'a, '_> {
        Expr {
            tree: self,
            index: 0,
        }
    }

    pub fn expression_count(&self) -> u64 {
        self.header.expression_count
    }

    fn expr_at(&self, index: usize) -> Expression {
        layout::read_expression(self.buf, &self.header, index)
    }

    fn arg_at(&self, slot: usize) -> Result<Arg<'a, '_>, Error> {
        let tag = self.tags.get(slot).copied().ok_or_else(|| {
            Error::InternalInvariant(format!("argument slot {slot} out of range"))
        })?;
        let ty = ArgType::from_tag_byte(tag)?;
        let base = layout::values_range(&self.header).start + slot * layout::VALUE_SIZE;
        let bytes: [u8; 8] = self.buf[base..base + 8].try_into().unwrap();
        Ok(match ty {
            ArgType::Bool => Arg::Bool(u64::from_le_bytes(bytes) != 0),
            ArgType::Long => Arg::Long(i64::from_le_bytes(bytes)),
            ArgType::Double => Arg::Double(f64::from_le_bytes(bytes)),
            ArgType::Str => Arg::Str(layout::view_string(self.buf, &self.header, u64::from_le_bytes(bytes))?),
            ArgType::Symbol => Arg::Symbol(layout::view_string(self.buf, &self.header, u64::from_le_bytes(bytes))?),
            ArgType::Expression => Arg::Expression(Expr {
                tree: self,
                index: u64::from_le_bytes(bytes) as usize,
            }),
        })
    }
}

use layout::Expression;

#[derive(Clone, Copy)]
pub struct Expr<'a, 't> {
    tree: &'t Tree<'a>,
    index: usize,
}

impl<'a, 't> Expr<'a, 't> {
    pub fn head(&self) -> Result<&'a str, Error> {
        let e = self.tree.expr_at(self.index);
        layout::view_string(self.tree.buf, &self.tree.header, e.symbol_offset)
    }

    pub fn len(&self) -> usize {
        let e = self.tree.expr_at(self.index);
        (e.end_child - e.start_child) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self) -> impl Iterator<Item = Result<Arg<'a, 't>, Error>> + 't {
        let e = self.tree.expr_at(self.index);
        let tree = self.tree;
        (e.start_child..e.end_child).map(move |slot| tree.arg_at(slot as usize))
    }

    /// Reconstruct this subtree as a `serde_json::Value`. `Object`/`List`
    /// round-trip exactly; any other head (e.g. `Table`, from an inlined CSV
    /// sidecar) has no way back to its original source string and is instead
    /// rendered as `{"head": ..., "args": [...]}`.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        let head = self.head()?;
        match head {
            "Object" => {
                let mut map = serde_json::Map::new();
                for child in self.children() {
                    match child? {
                        Arg::Expression(wrapper) => {
                            let key = wrapper.head()?.to_string();
                            let mut grandchildren = wrapper.children();
                            let value = grandchildren
                                .next()
                                .ok_or_else(|| {
                                    Error::MalformedInput("key-wrapper with no child".into())
                                })??
                                .to_json()?;
                            map.insert(key, value);
                        }
                        _ => {
                            return Err(Error::MalformedInput(
                                "Object child was not a key-wrapper expression".into(),
                            ))
                        }
                    }
                }
                Ok(serde_json::Value::Object(map))
            }
            "List" => {
                let mut items = Vec::with_capacity(self.len());
                for child in self.children() {
                    items.push(child?.to_json()?);
                }
                Ok(serde_json::Value::Array(items))
            }
            other => {
                let mut args = Vec::with_capacity(self.len());
                for child in self.children() {
                    args.push(child?.to_json()?);
                }
                let mut map = serde_json::Map::new();
                map.insert("head".to_string(), serde_json::Value::String(other.to_string()));
                map.insert("args".to_string(), serde_json::Value::Array(args));
                Ok(serde_json::Value::Object(map))
            }
        }
    }
}

#[derive(Clone, Copy)]
pub enum Arg<'a, 't> {
    Bool(bool),
    Long(i64),
    Double(f64),
    Str(&'a str),
    Symbol(&'a str),
    Expression(Expr<'a, 't>),
}

impl<'a, 't> Arg<'a, 't> {
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        Ok(match self {
            Arg::Bool(b) => serde_json::Value::Bool(*b),
            Arg::Long(i) => serde_json::Value::Number((*i).into()),
            Arg::Double(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Arg::Str(s) => serde_json::Value::String(s.to_string()),
            Arg::Symbol("Null") => serde_json::Value::Null,
            Arg::Symbol("Missing") => serde_json::Value::Null,
            Arg::Symbol(s) => serde_json::Value::String(format!("`{s}")),
            Arg::Expression(e) => e.to_json()?,
        })
    }
}

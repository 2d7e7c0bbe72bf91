//! The streaming populate pass: walks the same document a
//! second time, now writing argument values, tag bytes, expression triples
//! and string-pool bytes directly into their final positions (as computed by
//! `sizing::plan`), then folds the tag array and seals everything into one
//! contiguous buffer.

use serde_json::Value;

use crate::csv_inline::{self, Column};
use crate::events;
use crate::layout::{self, ArgType, Expression, Header};
use crate::sizing::{self, SizingPlan};
use crate::tagrle;
use crate::{Error, Options};

struct BuildCtx {
    values: Vec<u8>,
    tags: Vec<u8>,
    expressions: Vec<Expression>,
    pool: Vec<u8>,
    cursor: Vec<u64>,
    expr_counter: u64,
    warnings: Vec<String>,
}

const EMPTY_EXPR: Expression = Expression {
    symbol_offset: 0,
    start_child: 0,
    end_child: 0,
};

impl BuildCtx {
    fn new(plan: &SizingPlan) -> Self {
        BuildCtx {
            values: vec![0u8; plan.total_arguments as usize * layout::VALUE_SIZE],
            tags: vec![0u8; plan.total_arguments as usize],
            expressions: vec![EMPTY_EXPR; plan.expression_count as usize],
            pool: Vec::new(),
            cursor: plan.layer_start.clone(),
            expr_counter: 0,
            warnings: Vec::new(),
        }
    }

    fn next_slot(&mut self, depth: usize) -> usize {
        let slot = self.cursor[depth] as usize;
        self.cursor[depth] += 1;
        slot
    }

    fn write_value_bytes(&mut self, slot: usize, bytes: [u8; 8]) {
        let at = slot * layout::VALUE_SIZE;
        self.values[at..at + layout::VALUE_SIZE].copy_from_slice(&bytes);
    }

    fn write_scalar(&mut self, depth: usize, ty: ArgType, bytes: [u8; 8]) {
        let slot = self.next_slot(depth);
        self.write_value_bytes(slot, bytes);
        self.tags[slot] = ty.as_byte();
    }

    fn push_symbol(&mut self, depth: usize, name: &str) {
        let offset = layout::push_string(&mut self.pool, name);
        self.write_scalar(depth, ArgType::Symbol, offset.to_le_bytes());
    }

    fn push_string_arg(&mut self, depth: usize, s: &str) {
        let offset = layout::push_string(&mut self.pool, s);
        self.write_scalar(depth, ArgType::Str, offset.to_le_bytes());
    }

    /// Allocate an expression slot at `depth`, recurse to populate its
    /// children at `depth + 1` via `fill`, then seal the expression triple.
    fn open_expression(
        &mut self,
        depth: usize,
        head: &str,
        fill: impl FnOnce(&mut Self) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let index = self.expr_counter as usize;
        self.expr_counter += 1;

        let slot = self.next_slot(depth);
        self.write_value_bytes(slot, (index as u64).to_le_bytes());
        self.tags[slot] = ArgType::Expression.as_byte();

        let symbol_offset = layout::push_string(&mut self.pool, head);
        if self.cursor.len() <= depth + 1 {
            self.cursor.resize(depth + 1 + 1, 0);
        }
        let start_child = self.cursor[depth + 1];
        fill(self)?;
        let end_child = self.cursor[depth + 1];

        self.expressions[index] = Expression {
            symbol_offset,
            start_child,
            end_child,
        };
        Ok(())
    }
}

pub fn build(input: &[u8], options: &Options) -> Result<(Vec<u8>, Vec<String>), Error> {
    let value: Value =
        serde_json::from_slice(input).map_err(|e| Error::MalformedInput(e.to_string()))?;
    let events = events::flatten(&value);
    let plan = sizing::plan(&events, options)?;

    let mut ctx = BuildCtx::new(&plan);
    write_value(&value, 0, &mut ctx, options)?;

    if ctx.expr_counter != plan.expression_count {
        return Err(Error::SizingMismatch(format!(
            "populate pass produced {} expressions, sizing predicted {}",
            ctx.expr_counter, plan.expression_count
        )));
    }

    let physical_tags = if options.disable_rle {
        ctx.tags.clone()
    } else {
        tagrle::fold(&ctx.tags)
    };

    let mut header = Header {
        logical_argument_count: plan.total_arguments,
        argument_count: physical_tags.len() as u64,
        expression_count: plan.expression_count,
        string_fill: ctx.pool.len() as u64,
        original_address: 0,
    };

    let mut buf = vec![0u8; layout::HEADER_LEN];
    header.write(&mut buf);
    buf.extend_from_slice(&ctx.values);
    buf.extend_from_slice(&physical_tags);
    buf.resize(layout::expressions_range(&header).start, 0);
    for (i, expr) in ctx.expressions.iter().enumerate() {
        layout::write_expression(&mut buf, &header, i, expr);
    }
    buf.extend_from_slice(&ctx.pool);

    // `original_address` records the heap address of the sealed buffer, so it
    // can only be filled in once `buf`'s backing allocation is final.
    header.original_address = buf.as_ptr() as u64;
    header.write(&mut buf);

    Ok((buf, ctx.warnings))
}

fn write_value(
    value: &Value,
    depth: usize,
    ctx: &mut BuildCtx,
    options: &Options,
) -> Result<(), Error> {
    match value {
        Value::Null => ctx.push_symbol(depth, "Null"),
        Value::Bool(b) => ctx.write_scalar(depth, ArgType::Bool, (*b as u64).to_le_bytes()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ctx.write_scalar(depth, ArgType::Long, i.to_le_bytes());
            } else if let Some(u) = n.as_u64() {
                ctx.write_scalar(depth, ArgType::Long, (u as i64).to_le_bytes());
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                ctx.write_scalar(depth, ArgType::Double, f.to_le_bytes());
            }
        }
        Value::String(s) => {
            if !options.disable_csv_handling && sizing::is_csv_path(s) {
                write_csv_table(s, depth, ctx, options)?;
            } else {
                ctx.push_string_arg(depth, s);
            }
        }
        Value::Array(items) => {
            ctx.open_expression(depth, "List", |ctx| {
                for item in items {
                    write_value(item, depth + 1, ctx, options)?;
                }
                Ok(())
            })?;
        }
        Value::Object(map) => {
            ctx.open_expression(depth, "Object", |ctx| {
                for (key, val) in map {
                    ctx.open_expression(depth + 1, key, |ctx| {
                        write_value(val, depth + 2, ctx, options)
                    })?;
                }
                Ok(())
            })?;
        }
    }
    Ok(())
}

fn write_csv_table(
    filename: &str,
    depth: usize,
    ctx: &mut BuildCtx,
    options: &Options,
) -> Result<(), Error> {
    let path = options.csv_prefix.join(filename);
    let columns = csv_inline::load_columns(&path)?;

    ctx.open_expression(depth, "Table", |ctx| {
        for (name, column) in &columns {
            ctx.open_expression(depth + 1, name, |ctx| {
                write_csv_column(column, depth + 2, ctx);
                Ok(())
            })?;
        }
        Ok(())
    })
}

fn write_csv_column(column: &Column, depth: usize, ctx: &mut BuildCtx) {
    match column {
        Column::Long(cells) => {
            for cell in cells {
                match cell {
                    Some(v) => ctx.write_scalar(depth, ArgType::Long, v.to_le_bytes()),
                    None => ctx.push_symbol(depth, "Missing"),
                }
            }
        }
        Column::Double(cells) => {
            for cell in cells {
                match cell {
                    Some(v) => ctx.write_scalar(depth, ArgType::Double, v.to_le_bytes()),
                    None => ctx.push_symbol(depth, "Missing"),
                }
            }
        }
        Column::Str(cells) => {
            for cell in cells {
                match cell {
                    Some(v) => ctx.push_string_arg(depth, v),
                    None => ctx.push_symbol(depth, "Missing"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Tree;
    use std::io::Write;

    #[test]
    fn builds_flat_object() {
        let (buf, warnings) = build(br#"{"a":1,"b":"two"}"#, &Options::default()).unwrap();
        assert!(warnings.is_empty());
        let header = Header::read(&buf);
        assert_eq!(header.expression_count, 3); // Object + 2 key-wrappers
        let tree = Tree::new(&buf).unwrap();
        assert_eq!(tree.root().head().unwrap(), "Object");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = build(b"{not json", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn folds_long_runs_of_identical_tags() {
        let (buf, _) = build(b"[1,1,1,1,1,1,1]", &Options::default()).unwrap();
        let header = Header::read(&buf);
        // 7 LONG args fold to a single 2-byte RLE run.
        assert_eq!(header.argument_count, 2);
        assert_eq!(header.logical_argument_count, 8); // List's own arg + 7 elements
    }

    #[test]
    fn disable_rle_keeps_tags_literal() {
        let opts = Options {
            disable_rle: true,
            ..Options::default()
        };
        let (buf, _) = build(b"[1,1,1,1,1,1,1]", &opts).unwrap();
        let header = Header::read(&buf);
        assert_eq!(header.argument_count, header.logical_argument_count);
    }

    #[test]
    fn inlines_csv_sidecar() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(f, "id,name\n1,alice\n2,bob\n").unwrap();
        let filename = f.path().file_name().unwrap().to_str().unwrap().to_string();
        let prefix = f.path().parent().unwrap().to_path_buf();

        let doc = format!(r#"{{"table":"{filename}"}}"#);
        let opts = Options {
            csv_prefix: prefix,
            ..Options::default()
        };
        let (buf, _) = build(doc.as_bytes(), &opts).unwrap();
        let header = Header::read(&buf);
        // Object(1) + table key-wrapper(1) + Table(1) + 2 columns(2) = 5
        assert_eq!(header.expression_count, 5);
    }
}

//! # Wisent
//!
//! Converts hierarchical JSON (optionally referencing CSV sidecar files) into
//! a compact, self-describing, single-allocation binary tree ("Wisent tree"),
//! and applies a configurable pipeline of general-purpose compression codecs
//! on top.
//!
//! * `layout` — byte-offset accessors for the root buffer's four sections.
//! * `sizing` — the non-mutating pre-pass that counts expressions and
//!   per-depth argument slots before the buffer is allocated.
//! * `events` — a JSON value tree replayed as an ordered event stream, driven
//!   twice (sizing, then population) the way the original drives one SAX
//!   handler over the same input twice.
//! * `builder` — the streaming populate phase, including CSV inlining and
//!   in-place RLE folding of tag bytes.
//! * `reader` — zero-copy traversal of a sealed tree.
//! * `codecs` — RLE, LZ77, canonical Huffman, FSE, Delta, Deflate, BitPacking.
//! * `pipeline` — an ordered composition of codecs.
//!
//! ## Buffer example
//!
//! ```rs
//! use wisent::{Options, load};
//! let doc = br#"{"a": 1, "b": [1,2,3]}"#;
//! let tree = load(doc, &Options::default()).expect("build failed");
//! ```

pub mod builder;
pub mod codecs;
pub mod csv_inline;
pub mod events;
pub mod layout;
pub mod pipeline;
pub mod reader;
pub mod sizing;
pub mod tagrle;

use std::path::PathBuf;

/// Errors surfaced by every Wisent operation, covering the abstract kinds of
/// the error taxonomy: malformed input, unsupported input, a sizing/populate
/// disagreement, I/O, allocation failure, and impossible internal states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("sizing pre-pass disagreed with the populate pass: {0}")]
    SizingMismatch(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("out of memory")]
    OutOfMemory,
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

/// Options controlling the builder and pipeline.
#[derive(Clone, Debug)]
pub struct Options {
    /// skip run-length compaction of argument tags
    pub disable_rle: bool,
    /// treat `.csv`-suffixed strings as ordinary strings instead of inlining
    pub disable_csv_handling: bool,
    /// prepended to csv filenames found in the document
    pub csv_prefix: PathBuf,
    /// 0 means one-shot; N > 0 splits codec input into N-byte blocks
    pub block_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            disable_rle: false,
            disable_csv_handling: false,
            csv_prefix: PathBuf::new(),
            block_size: 0,
        }
    }
}

/// Consume a JSON document and produce a sealed Wisent tree buffer.
///
/// `unload(dataset_name)` — detaching a tree previously handed to a
/// process-wide shared-memory registry — is an external collaborator
/// concern and is intentionally not implemented here.
pub fn load(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    let (tree, _warnings) = builder::build(input, options)?;
    Ok(tree)
}

/// Consume a JSON document, build the tree, then run it through `pipeline`.
pub fn compress(
    input: &[u8],
    options: &Options,
    pipeline: &pipeline::Pipeline,
) -> Result<Vec<u8>, Error> {
    let (tree, _warnings) = builder::build(input, options)?;
    pipeline.compress(&tree)
}

//! General-purpose compression codecs, each a standalone
//! `encode`/`decode` pair over an arbitrary byte slice. `pipeline.rs`
//! composes these into an ordered chain; none of them know about the Wisent
//! tree layout above — they treat the sealed buffer as opaque bytes, the
//! same role the original's `compressor::algorithms` namespace plays.

pub mod bitpacking;
pub mod delta;
pub mod deflate;
pub mod fse;
pub mod huffman;
pub mod lz77;
pub mod rle;

/// Write a `u32` length prefix, little-endian. Every codec's frame begins
/// with the original (pre-compression) byte length, needed because several
/// of these schemes have no other way to know when to stop decoding.
pub(crate) fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn read_u32(buf: &[u8], at: usize) -> Result<u32, crate::Error> {
    let bytes: [u8; 4] = buf
        .get(at..at + 4)
        .ok_or_else(|| crate::Error::MalformedInput("truncated length prefix".into()))?
        .try_into()
        .unwrap();
    Ok(u32::from_le_bytes(bytes))
}

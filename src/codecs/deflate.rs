//! Deflate, via `flate2`'s zlib bindings — the ecosystem's idiomatic
//! drop-in for the original's `compressor::algorithms::Deflate`, which
//! itself wraps system zlib. `flate2` picks a pure-Rust or system-zlib
//! backend per its own Cargo features; this module doesn't care which.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::Error;

pub fn encode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input)?;
    Ok(encoder.finish()?)
}

pub fn decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = ZlibDecoder::new(input);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::MalformedInput(format!("deflate stream: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text() {
        let input = b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly";
        let encoded = encode(input).unwrap();
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn rejects_garbage_stream() {
        assert!(decode(&[1, 2, 3, 4]).is_err());
    }
}

//! Delta coding, grounded on the original's `compressor::algorithms::Delta`:
//! each byte is replaced by its wrapping difference from the previous byte,
//! turning smoothly varying data (offsets, timestamps) into small values that
//! compress better under RLE/Huffman/FSE run downstream in a pipeline.

use crate::Error;

pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + 4);
    super::push_u32(&mut out, input.len() as u32);
    let mut prev = 0u8;
    for &byte in input {
        out.push(byte.wrapping_sub(prev));
        prev = byte;
    }
    out
}

pub fn decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let original_len = super::read_u32(input, 0)? as usize;
    let payload = &input[4..];
    if payload.len() != original_len {
        return Err(Error::MalformedInput(
            "delta payload length did not match its declared length".into(),
        ));
    }
    let mut out = Vec::with_capacity(original_len);
    let mut prev = 0u8;
    for &diff in payload {
        let byte = diff.wrapping_add(prev);
        out.push(byte);
        prev = byte;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_monotonic_sequence() {
        let input: Vec<u8> = (0..=50u8).collect();
        let encoded = encode(&input);
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn round_trips_wrapping_values() {
        let input = vec![250u8, 10, 5, 255, 0];
        let encoded = encode(&input);
        assert_eq!(decode(&encoded).unwrap(), input);
    }
}

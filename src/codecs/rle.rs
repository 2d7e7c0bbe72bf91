//! Byte-oriented run-length encoding, grounded on the original's
//! `compressor::algorithms::RLE` (distinct from `tagrle`, which folds the
//! Wisent tree's own tag-byte array during the build, not the compression
//! pipeline). Every byte is represented by a `(value, run_len)` pair, with
//! `run_len` capped at 255 and split across pairs for longer runs.

use crate::Error;

pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    super::push_u32(&mut out, input.len() as u32);
    let mut i = 0;
    while i < input.len() {
        let byte = input[i];
        let mut run_len = 1usize;
        while i + run_len < input.len() && input[i + run_len] == byte && run_len < 255 {
            run_len += 1;
        }
        out.push(byte);
        out.push(run_len as u8);
        i += run_len;
    }
    out
}

pub fn decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let original_len = super::read_u32(input, 0)? as usize;
    let mut out = Vec::with_capacity(original_len);
    let mut i = 4;
    while i + 1 < input.len() && out.len() < original_len {
        let byte = input[i];
        let run_len = input[i + 1] as usize;
        out.extend(std::iter::repeat(byte).take(run_len));
        i += 2;
    }
    if out.len() != original_len {
        return Err(Error::MalformedInput(
            "rle payload did not reconstruct the declared length".into(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_runs_and_literals() {
        let input = b"aaaaabbbc";
        let encoded = encode(input);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn splits_runs_longer_than_255() {
        let input = vec![7u8; 300];
        let encoded = encode(&input);
        assert_eq!(&encoded[4..6], &[7, 255]);
        assert_eq!(&encoded[6..8], &[7, 45]);
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn empty_input() {
        let encoded = encode(b"");
        assert_eq!(decode(&encoded).unwrap(), Vec::<u8>::new());
    }
}

//! Canonical Huffman coding, grounded on the original's
//! `compressor::algorithms::Huffman`, with bitstream packing done via
//! `bit_vec::BitVec` rather than hand-rolled bit shifting.
//!
//! There is no length-prefixed frame: a synthetic EOF symbol is folded into
//! the alphabet (sharing byte value `0x00`, the same way the original keys
//! its frequency map on `char` and overwrites whatever count a literal `\0`
//! byte accumulated with the EOF's count of 1) and the payload simply ends
//! with that symbol's code. A consequence inherited from the original: a
//! literal `0x00` byte anywhere in the input besides the very last position
//! is indistinguishable from EOF and truncates decoding early, so this codec
//! is only suitable for payloads that do not contain embedded NUL bytes.
//!
//! Frame:
//!
//! ```text
//! [ 1 byte  : EOF code length in bits ]
//! [ bytes   : EOF code, MSB-first, ceil(len/8) bytes ]
//! repeated for every other symbol with a nonzero-length code:
//!   [ 1 byte : symbol (never 0x00) ]
//!   [ 1 byte : code length in bits ]
//!   [ bytes  : code, MSB-first, ceil(len/8) bytes ]
//!   [ 1 byte : 0x00 delimiter ]
//! [ 1 byte  : 0x00 table terminator ]
//! [ payload : bit-packed codes, MSB-first, ending with the EOF code,
//!             last byte left-justified ]
//! ```

use bit_vec::BitVec;

use crate::Error;

const ALPHABET: usize = 256;

enum Node {
    Leaf(u8),
    Internal(usize, usize),
}

struct Arena {
    node: Vec<Node>,
}

struct TrieNode {
    left: Option<usize>,
    right: Option<usize>,
    symbol: Option<u8>,
}

pub fn encode(input: &[u8]) -> Vec<u8> {
    let lengths = code_lengths(input);
    let codes = canonical_codes(&lengths);
    let (eof_code, eof_len) = codes[0].unwrap_or((0, 0));

    let mut out = Vec::new();
    out.push(eof_len);
    out.extend(code_to_bytes(eof_code, eof_len));

    for symbol in 1..ALPHABET {
        if let Some((code, len)) = codes[symbol] {
            out.push(symbol as u8);
            out.push(len);
            out.extend(code_to_bytes(code, len));
            out.push(0x00);
        }
    }
    out.push(0x00);

    let mut bits = BitVec::new();
    for &byte in input {
        let (code, len) = codes[byte as usize].unwrap_or((0, 0));
        push_bits(&mut bits, code, len);
    }
    push_bits(&mut bits, eof_code, eof_len);
    out.extend(bits.to_bytes());
    out
}

pub fn decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut pos = 0usize;
    let eof_len = read_byte(input, &mut pos)?;
    let eof_code = read_code_bytes(input, &mut pos, eof_len)?;

    let mut arena = vec![TrieNode {
        left: None,
        right: None,
        symbol: None,
    }];
    insert_code(&mut arena, eof_code, eof_len, 0);

    loop {
        let symbol = read_byte(input, &mut pos)?;
        if symbol == 0 {
            break;
        }
        let len = read_byte(input, &mut pos)?;
        let code = read_code_bytes(input, &mut pos, len)?;
        insert_code(&mut arena, code, len, symbol);
        let delimiter = read_byte(input, &mut pos)?;
        if delimiter != 0 {
            return Err(Error::MalformedInput(
                "missing huffman table-entry delimiter".into(),
            ));
        }
    }

    let payload = input.get(pos..).unwrap_or(&[]);
    let bits = BitVec::from_bytes(payload);
    let mut out = Vec::new();
    let mut current = 0usize;
    for bit in bits.iter() {
        current = match (bit, &arena[current]) {
            (false, node) => node
                .left
                .ok_or_else(|| Error::MalformedInput("huffman bitstream has no valid code".into()))?,
            (true, node) => node
                .right
                .ok_or_else(|| Error::MalformedInput("huffman bitstream has no valid code".into()))?,
        };
        if arena[current].left.is_none() && arena[current].right.is_none() {
            match arena[current].symbol {
                Some(0) => break,
                Some(symbol) => {
                    out.push(symbol);
                    current = 0;
                }
                None => {
                    return Err(Error::MalformedInput(
                        "huffman bit path led to an unassigned leaf".into(),
                    ))
                }
            }
        }
    }
    Ok(out)
}

fn read_byte(input: &[u8], pos: &mut usize) -> Result<u8, Error> {
    let b = *input
        .get(*pos)
        .ok_or_else(|| Error::MalformedInput("truncated huffman frame".into()))?;
    *pos += 1;
    Ok(b)
}

/// Read `ceil(len/8)` bytes starting at `*pos` and reconstruct the MSB-first,
/// left-justified code they encode.
fn read_code_bytes(input: &[u8], pos: &mut usize, len: u8) -> Result<u32, Error> {
    let nbytes = (len as usize + 7) / 8;
    let raw = input
        .get(*pos..*pos + nbytes)
        .ok_or_else(|| Error::MalformedInput("truncated huffman code bytes".into()))?;
    *pos += nbytes;
    let mut value: u32 = 0;
    for &b in raw {
        value = (value << 8) | b as u32;
    }
    let total_bits = nbytes as u32 * 8;
    Ok(value >> (total_bits - len as u32))
}

/// Pack `len` MSB-first bits of `code` into `ceil(len/8)` left-justified
/// bytes, the same way `encodeStringToBytes` flushes a single code.
fn code_to_bytes(code: u32, len: u8) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc: u32 = 0;
    let mut acc_bits: u8 = 0;
    for i in (0..len).rev() {
        acc = (acc << 1) | ((code >> i) & 1);
        acc_bits += 1;
        if acc_bits == 8 {
            out.push(acc as u8);
            acc = 0;
            acc_bits = 0;
        }
    }
    if acc_bits > 0 {
        out.push((acc << (8 - acc_bits)) as u8);
    }
    out
}

fn push_bits(bits: &mut BitVec, code: u32, len: u8) {
    for i in (0..len).rev() {
        bits.push((code >> i) & 1 == 1);
    }
}

fn insert_code(arena: &mut Vec<TrieNode>, code: u32, len: u8, symbol: u8) {
    let mut current = 0usize;
    for i in (0..len).rev() {
        let bit = (code >> i) & 1 == 1;
        let next = if bit {
            arena[current].right
        } else {
            arena[current].left
        };
        let next = match next {
            Some(n) => n,
            None => {
                arena.push(TrieNode {
                    left: None,
                    right: None,
                    symbol: None,
                });
                let idx = arena.len() - 1;
                if bit {
                    arena[current].right = Some(idx);
                } else {
                    arena[current].left = Some(idx);
                }
                idx
            }
        };
        current = next;
    }
    arena[current].symbol = Some(symbol);
}

fn code_lengths(input: &[u8]) -> [u8; ALPHABET] {
    let mut freq = [0u64; ALPHABET];
    for &byte in input {
        freq[byte as usize] += 1;
    }
    // EOF shares byte value 0x00 with a literal NUL byte, and always wins.
    freq[0] = 1;

    let mut arena = Arena { node: Vec::new() };
    let mut heap: std::collections::BinaryHeap<std::cmp::Reverse<(u64, usize)>> =
        std::collections::BinaryHeap::new();

    for (symbol, &f) in freq.iter().enumerate() {
        if f > 0 {
            let idx = arena.node.len();
            arena.node.push(Node::Leaf(symbol as u8));
            heap.push(std::cmp::Reverse((f, idx)));
        }
    }

    let mut lengths = [0u8; ALPHABET];
    if heap.len() == 1 {
        // A single-symbol alphabet needs no bits at all to name its one member.
        return lengths;
    }

    while heap.len() > 1 {
        let std::cmp::Reverse((fa, a)) = heap.pop().unwrap();
        let std::cmp::Reverse((fb, b)) = heap.pop().unwrap();
        let idx = arena.node.len();
        arena.node.push(Node::Internal(a, b));
        heap.push(std::cmp::Reverse((fa + fb, idx)));
    }
    let std::cmp::Reverse((_, root)) = heap.pop().unwrap();
    assign_depths(&arena, root, 0, &mut lengths);
    lengths
}

fn assign_depths(arena: &Arena, idx: usize, depth: u8, lengths: &mut [u8; ALPHABET]) {
    match arena.node[idx] {
        Node::Leaf(symbol) => lengths[symbol as usize] = depth.max(1),
        Node::Internal(a, b) => {
            assign_depths(arena, a, depth + 1, lengths);
            assign_depths(arena, b, depth + 1, lengths);
        }
    }
}

/// `codes[symbol] = Some((code, length))` for every symbol with a nonzero
/// length, assigned in canonical order (ascending length, ties broken by
/// symbol value).
fn canonical_codes(lengths: &[u8; ALPHABET]) -> Vec<Option<(u32, u8)>> {
    let mut order: Vec<usize> = (0..ALPHABET).filter(|&s| lengths[s] > 0).collect();
    order.sort_by_key(|&s| (lengths[s], s));

    let mut codes = vec![None; ALPHABET];
    let mut code: u32 = 0;
    let mut prev_len = 0u8;
    for symbol in order {
        let len = lengths[symbol];
        code <<= len - prev_len;
        codes[symbol] = Some((code, len));
        code += 1;
        prev_len = len;
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_skewed_frequencies() {
        let input = b"aaaaaaaaaabbbbbbccccd";
        let encoded = encode(input);
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn round_trips_single_symbol() {
        let input = vec![42u8; 10];
        let encoded = encode(&input);
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn round_trips_empty_input() {
        let encoded = encode(b"");
        assert_eq!(decode(&encoded).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn round_trips_wide_alphabet_without_nul_bytes() {
        let input: Vec<u8> = (1..=255).collect();
        let encoded = encode(&input);
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn frame_omits_synthetic_eof_from_table_entries() {
        let input = b"banana";
        let encoded = encode(input);
        // no table entry's symbol byte is ever 0x00
        let eof_len = encoded[0];
        let eof_bytes = (eof_len as usize + 7) / 8;
        let mut pos = 1 + eof_bytes;
        loop {
            let symbol = encoded[pos];
            if symbol == 0 {
                break;
            }
            assert_ne!(symbol, 0);
            let len = encoded[pos + 1];
            pos += 2 + (len as usize + 7) / 8 + 1;
        }
    }
}

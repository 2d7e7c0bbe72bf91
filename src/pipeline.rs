//! Ordered composition of the codecs in `codecs/`, grounded on
//! the original's `CompressionPipeline`/`CompressionPipeline::Builder` and
//! its `compressionAliases` table. A `Pipeline` is just a list of steps
//! applied in order to compress, and in reverse to decompress; an optional
//! block size splits the input into independently compressed chunks instead
//! of treating it as one stream.

use crate::codecs;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Rle,
    Lz77,
    Huffman,
    Fse,
    Delta,
    Deflate,
}

impl CompressionType {
    /// Parse one of the original's accepted spellings for a compression
    /// step (`compressionAliases`), case-insensitively.
    pub fn from_alias(alias: &str) -> Result<Self, Error> {
        match alias.to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionType::None),
            "rle" | "runlengthencoding" => Ok(CompressionType::Rle),
            "lz77" => Ok(CompressionType::Lz77),
            "huffman" => Ok(CompressionType::Huffman),
            "fse" | "finitestateentropy" => Ok(CompressionType::Fse),
            "delta" | "de" => Ok(CompressionType::Delta),
            "deflate" | "zlib" => Ok(CompressionType::Deflate),
            other => Err(Error::UnsupportedInput(format!(
                "unrecognized compression step '{other}'"
            ))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CompressionType::None => "none",
            CompressionType::Rle => "rle",
            CompressionType::Lz77 => "lz77",
            CompressionType::Huffman => "huffman",
            CompressionType::Fse => "fse",
            CompressionType::Delta => "delta",
            CompressionType::Deflate => "deflate",
        }
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(match self {
            CompressionType::None => data.to_vec(),
            CompressionType::Rle => codecs::rle::encode(data),
            CompressionType::Lz77 => codecs::lz77::encode(data),
            CompressionType::Huffman => codecs::huffman::encode(data),
            CompressionType::Fse => codecs::fse::encode(data),
            CompressionType::Delta => codecs::delta::encode(data),
            CompressionType::Deflate => codecs::deflate::encode(data)?,
        })
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            CompressionType::None => Ok(data.to_vec()),
            CompressionType::Rle => codecs::rle::decode(data),
            CompressionType::Lz77 => codecs::lz77::decode(data),
            CompressionType::Huffman => codecs::huffman::decode(data),
            CompressionType::Fse => codecs::fse::decode(data),
            CompressionType::Delta => codecs::delta::decode(data),
            CompressionType::Deflate => codecs::deflate::decode(data),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<CompressionType>,
    block_size: usize,
}

pub struct Builder {
    steps: Vec<CompressionType>,
    block_size: usize,
}

impl Pipeline {
    pub fn builder() -> Builder {
        Builder {
            steps: Vec::new(),
            block_size: 0,
        }
    }

    pub fn log(&self) {
        let names: Vec<&str> = self.steps.iter().map(CompressionType::name).collect();
        log::info!(
            "compression pipeline: [{}] block_size={}",
            names.join(" -> "),
            self.block_size
        );
    }

    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if self.block_size == 0 {
            return self.compress_one(data);
        }
        let mut out = Vec::new();
        let blocks: Vec<&[u8]> = data.chunks(self.block_size).collect();
        codecs::push_u32(&mut out, blocks.len() as u32);
        for block in blocks {
            let compressed = self.compress_one(block)?;
            codecs::push_u32(&mut out, compressed.len() as u32);
            out.extend_from_slice(&compressed);
        }
        Ok(out)
    }

    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if self.block_size == 0 {
            return self.decompress_one(data);
        }
        let block_count = codecs::read_u32(data, 0)? as usize;
        let mut out = Vec::new();
        let mut pos = 4;
        for _ in 0..block_count {
            let len = codecs::read_u32(data, pos)? as usize;
            pos += 4;
            let chunk = data
                .get(pos..pos + len)
                .ok_or_else(|| Error::MalformedInput("truncated pipeline block".into()))?;
            out.extend(self.decompress_one(chunk)?);
            pos += len;
        }
        Ok(out)
    }

    fn compress_one(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut current = data.to_vec();
        for step in &self.steps {
            current = step.encode(&current)?;
        }
        Ok(current)
    }

    fn decompress_one(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut current = data.to_vec();
        for step in self.steps.iter().rev() {
            current = step.decode(&current)?;
        }
        Ok(current)
    }
}

impl Builder {
    pub fn step(mut self, alias: &str) -> Result<Self, Error> {
        self.steps.push(CompressionType::from_alias(alias)?);
        Ok(self)
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            steps: self.steps,
            block_size: self.block_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_stage_round_trips() {
        let pipeline = Pipeline::builder().step("rle").unwrap().build();
        let data = b"aaaaaaaaaabbbbbb";
        let compressed = pipeline.compress(data).unwrap();
        assert_eq!(pipeline.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn chained_stages_round_trip() {
        let pipeline = Pipeline::builder()
            .step("delta")
            .unwrap()
            .step("huffman")
            .unwrap()
            .build();
        let data: Vec<u8> = (0..200).map(|i: u32| (i % 7) as u8 + 1).collect();
        let compressed = pipeline.compress(&data).unwrap();
        assert_eq!(pipeline.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn blocked_pipeline_round_trips() {
        let pipeline = Pipeline::builder()
            .step("lz77")
            .unwrap()
            .block_size(16)
            .build();
        let data = b"the quick brown fox jumps over the lazy dog many times over";
        let compressed = pipeline.compress(data).unwrap();
        assert_eq!(pipeline.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn rejects_unknown_alias() {
        assert!(CompressionType::from_alias("bogus").is_err());
    }

    #[test]
    fn accepts_full_name_aliases() {
        assert_eq!(
            CompressionType::from_alias("RunLengthEncoding").unwrap(),
            CompressionType::Rle
        );
        assert_eq!(
            CompressionType::from_alias("FiniteStateEntropy").unwrap(),
            CompressionType::Fse
        );
    }
}

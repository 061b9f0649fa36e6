//! SPIR-V word stream codec

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("compiler produced an empty binary")]
    Empty,

    #[error("binary length {0} is not a multiple of 4 bytes")]
    Misaligned(usize),
}

/// Split a byte stream into little-endian 32-bit words
pub fn decode(bytes: &[u8]) -> Result<Vec<u32>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::Misaligned(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Inverse of [`decode`]
pub fn encode(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

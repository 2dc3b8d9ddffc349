//! Fixed-width 32 byte words, the unit contract call data is made of.
//!
//! Numbers are big-endian and left-padded with zeros, 20 byte values
//! (addresses, hash160s) are left-padded to a full word.

use crate::Error;

pub const WORD_LENGTH: usize = 32;

pub type Word = [u8; WORD_LENGTH];

pub fn strip_hex_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
}

pub fn number_word(number: u64) -> Word {
    let mut word = [0u8; WORD_LENGTH];
    word[WORD_LENGTH - 8..].copy_from_slice(&number.to_be_bytes());
    word
}

pub fn bytes20_word(bytes: &[u8; 20]) -> Word {
    let mut word = [0u8; WORD_LENGTH];
    word[WORD_LENGTH - 20..].copy_from_slice(bytes);
    word
}

/// Encodes `number` as 64 lower-case hex characters.
pub fn encode_number(number: u64) -> String {
    hex::encode(number_word(number))
}

pub fn decode_number(word: &str) -> Result<u64, Error> {
    let word = decode_word(word)?;

    if word[..WORD_LENGTH - 8].iter().any(|byte| *byte != 0) {
        return Err(Error::InvalidAmount(format!(
            "{} does not fit into 64 bits",
            hex::encode(word)
        )));
    }

    let mut number = [0u8; 8];
    number.copy_from_slice(&word[WORD_LENGTH - 8..]);

    Ok(u64::from_be_bytes(number))
}

/// Encodes a hex address (any case, `0x` optional) as a left-padded word.
/// The absent address encodes to the zero word.
pub fn encode_address(address: Option<&str>) -> Result<String, Error> {
    let address = match address {
        Some(address) => parse_bytes20(address)?,
        None => [0u8; 20],
    };

    Ok(hex::encode(bytes20_word(&address)))
}

pub fn decode_address(word: &str) -> Result<[u8; 20], Error> {
    let word = decode_word(word)?;

    if word[..WORD_LENGTH - 20].iter().any(|byte| *byte != 0) {
        return Err(Error::InvalidAddress(format!(
            "{} is not a left-padded 20 byte value",
            hex::encode(word)
        )));
    }

    let mut address = [0u8; 20];
    address.copy_from_slice(&word[WORD_LENGTH - 20..]);

    Ok(address)
}

pub fn parse_bytes20(hex: &str) -> Result<[u8; 20], Error> {
    let bytes = hex::decode(strip_hex_prefix(hex).to_lowercase())
        .map_err(|e| Error::InvalidAddress(format!("{} is not valid hex: {}", hex, e)))?;

    if bytes.len() != 20 {
        return Err(Error::InvalidAddress(format!(
            "expected 20 bytes, got {} in {}",
            bytes.len(),
            hex
        )));
    }

    let mut address = [0u8; 20];
    address.copy_from_slice(&bytes);

    Ok(address)
}

fn decode_word(word: &str) -> Result<Word, Error> {
    let bytes = hex::decode(strip_hex_prefix(word))
        .map_err(|e| Error::InvalidAmount(format!("{} is not valid hex: {}", word, e)))?;

    if bytes.len() != WORD_LENGTH {
        return Err(Error::InvalidAmount(format!(
            "expected a {} byte word, got {} bytes",
            WORD_LENGTH,
            bytes.len()
        )));
    }

    let mut result = [0u8; WORD_LENGTH];
    result.copy_from_slice(&bytes);

    Ok(result)
}

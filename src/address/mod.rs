//! Address-format collaborators: classification and conversion.
//!
//! Pure functions. Everything fallible returns [`AddressError`]; callers that only need
//! a yes/no answer (the bridge's pre-condition checks) collapse errors into `false`.
//!
//! ```text
//! redeem script (hex) ──hash160──▶ script hash ──base58check──▶ legacy P2SH ──▶ CashAddr
//! ```

pub mod cashaddr;

use bitcoin::hashes::{hash160, Hash};

pub use cashaddr::{CashAddress, MAINNET_PREFIX, REGTEST_PREFIX, TESTNET_PREFIX};

const LEGACY_P2PKH_MAINNET: u8 = 0x00;
const LEGACY_P2SH_MAINNET: u8 = 0x05;
const LEGACY_P2PKH_TESTNET: u8 = 0x6f;
const LEGACY_P2SH_TESTNET: u8 = 0xc4;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("mixed-case address")]
    MixedCase,
    #[error("invalid character '{0}'")]
    InvalidChar(char),
    #[error("invalid prefix '{0}'")]
    InvalidPrefix(String),
    #[error("checksum mismatch")]
    Checksum,
    #[error("non-zero padding")]
    InvalidPadding,
    #[error("invalid version byte {0:#04x}")]
    InvalidVersion(u8),
    #[error("invalid hash length {0}")]
    InvalidLength(usize),
    #[error("base58: {0}")]
    Base58(String),
    #[error("hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFormat { Legacy, Cash }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind { P2PKH, P2SH }

/// Decoded legacy (base58check) address.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LegacyAddress {
    kind: AddressKind,
    prefix: &'static str,
    hash: Vec<u8>,
}

fn decode_legacy(input: &str) -> Result<LegacyAddress, AddressError> {
    let bytes = bitcoin::base58::decode_check(input).map_err(|e| AddressError::Base58(e.to_string()))?;
    let (version, hash) = bytes.split_first().ok_or(AddressError::InvalidLength(0))?;
    if hash.len() != 20 { return Err(AddressError::InvalidLength(hash.len())); }
    let (kind, prefix) = match *version {
        LEGACY_P2PKH_MAINNET => (AddressKind::P2PKH, MAINNET_PREFIX),
        LEGACY_P2SH_MAINNET => (AddressKind::P2SH, MAINNET_PREFIX),
        LEGACY_P2PKH_TESTNET => (AddressKind::P2PKH, TESTNET_PREFIX),
        LEGACY_P2SH_TESTNET => (AddressKind::P2SH, TESTNET_PREFIX),
        v => return Err(AddressError::InvalidVersion(v)),
    };
    Ok(LegacyAddress { kind, prefix, hash: hash.to_vec() })
}

/// Classifies `input`. Fails when it is neither a valid CashAddr nor a valid legacy address.
pub fn detect_format(input: &str) -> Result<AddressFormat, AddressError> {
    match CashAddress::decode(input) {
        Ok(_) => Ok(AddressFormat::Cash),
        Err(cash_err) => match decode_legacy(input) {
            Ok(_) => Ok(AddressFormat::Legacy),
            Err(_) => Err(cash_err),
        },
    }
}

/// Output type the address pays to, in either format.
pub fn detect_kind(input: &str) -> Result<AddressKind, AddressError> {
    match CashAddress::decode(input) {
        Ok(addr) => Ok(addr.kind),
        Err(cash_err) => decode_legacy(input).map(|l| l.kind).map_err(|_| cash_err),
    }
}

pub fn hash160(data: &[u8]) -> [u8; 20] { hash160::Hash::hash(data).to_byte_array() }

/// Mainnet legacy P2SH address for a 20-byte script hash.
pub fn legacy_from_script_hash(hash: &[u8]) -> Result<String, AddressError> {
    if hash.len() != 20 { return Err(AddressError::InvalidLength(hash.len())); }
    let mut payload = Vec::with_capacity(21);
    payload.push(LEGACY_P2SH_MAINNET);
    payload.extend_from_slice(hash);
    Ok(bitcoin::base58::encode_check(&payload))
}

pub fn legacy_to_cash_address(legacy: &str) -> Result<String, AddressError> {
    let l = decode_legacy(legacy)?;
    CashAddress::new(l.prefix, l.kind, l.hash).encode()
}

/// CashAddr of the P2SH output locking to `script_hex`.
pub fn cash_address_from_script(script_hex: &str) -> Result<String, AddressError> {
    let script = hex::decode(script_hex)?;
    let legacy = legacy_from_script_hash(&hash160(&script))?;
    legacy_to_cash_address(&legacy)
}

//! CashAddr codec: base32 payload with a 40-bit BCH checksum over the prefix.

use super::{AddressError, AddressKind};

pub const MAINNET_PREFIX: &str = "bitcoincash";
pub const TESTNET_PREFIX: &str = "bchtest";
pub const REGTEST_PREFIX: &str = "bchreg";

/// Prefixes tried, in order, when the input omits one.
const KNOWN_PREFIXES: &[&str] = &[MAINNET_PREFIX, TESTNET_PREFIX, REGTEST_PREFIX];

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 8;

/// Hash length per size code (low three bits of the version byte).
const HASH_SIZES: [usize; 8] = [20, 24, 28, 32, 40, 48, 56, 64];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashAddress {
    pub prefix: String,
    pub kind: AddressKind,
    pub hash: Vec<u8>,
}

impl CashAddress {
    pub fn new(prefix: impl Into<String>, kind: AddressKind, hash: impl Into<Vec<u8>>) -> Self {
        Self { prefix: prefix.into(), kind, hash: hash.into() }
    }

    pub fn encode(&self) -> Result<String, AddressError> {
        let size = HASH_SIZES.iter().position(|s| *s == self.hash.len())
            .ok_or(AddressError::InvalidLength(self.hash.len()))?;
        let kind_bits: u8 = match self.kind { AddressKind::P2PKH => 0, AddressKind::P2SH => 1 };
        let mut payload = Vec::with_capacity(self.hash.len() + 1);
        payload.push((kind_bits << 3) | size as u8);
        payload.extend_from_slice(&self.hash);

        let mut data = convert_bits(&payload, 8, 5, true).ok_or(AddressError::InvalidPadding)?;
        let checksum = checksum(&self.prefix, &data);
        data.extend_from_slice(&checksum);

        let mut out = String::with_capacity(self.prefix.len() + 1 + data.len());
        out.push_str(&self.prefix);
        out.push(':');
        out.extend(data.iter().map(|d| CHARSET[*d as usize] as char));
        Ok(out)
    }

    /// Accepts `prefix:payload` or a bare payload whose checksum verifies under a known prefix.
    pub fn decode(input: &str) -> Result<Self, AddressError> {
        if input.is_empty() { return Err(AddressError::Empty); }
        let has_lower = input.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = input.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper { return Err(AddressError::MixedCase); }
        let lower = input.to_ascii_lowercase();

        match lower.split_once(':') {
            Some((prefix, payload)) => decode_with_prefix(prefix, payload),
            None => {
                let mut last = AddressError::Checksum;
                for prefix in KNOWN_PREFIXES {
                    match decode_with_prefix(prefix, &lower) {
                        Ok(addr) => return Ok(addr),
                        Err(e) => last = e,
                    }
                }
                Err(last)
            }
        }
    }
}

fn decode_with_prefix(prefix: &str, payload: &str) -> Result<CashAddress, AddressError> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(AddressError::InvalidPrefix(prefix.to_string()));
    }
    let mut data = Vec::with_capacity(payload.len());
    for c in payload.chars() {
        let pos = CHARSET.iter().position(|x| *x as char == c).ok_or(AddressError::InvalidChar(c))?;
        data.push(pos as u8);
    }
    if data.len() <= CHECKSUM_LEN { return Err(AddressError::InvalidLength(data.len())); }

    let mut check = expand_prefix(prefix);
    check.extend_from_slice(&data);
    if polymod(&check) != 0 { return Err(AddressError::Checksum); }

    data.truncate(data.len() - CHECKSUM_LEN);
    let bytes = convert_bits(&data, 5, 8, false).ok_or(AddressError::InvalidPadding)?;
    let (version, hash) = bytes.split_first().ok_or(AddressError::InvalidLength(0))?;
    if version & 0x80 != 0 { return Err(AddressError::InvalidVersion(*version)); }
    let kind = match (version >> 3) & 0x0f {
        0 => AddressKind::P2PKH,
        1 => AddressKind::P2SH,
        _ => return Err(AddressError::InvalidVersion(*version)),
    };
    if HASH_SIZES[(version & 0x07) as usize] != hash.len() { return Err(AddressError::InvalidLength(hash.len())); }
    Ok(CashAddress { prefix: prefix.to_string(), kind, hash: hash.to_vec() })
}

fn expand_prefix(prefix: &str) -> Vec<u8> {
    let mut out: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    out.push(0);
    out
}

fn checksum(prefix: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut values = expand_prefix(prefix);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let m = polymod(&values);
    let mut out = [0u8; CHECKSUM_LEN];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((m >> (5 * (7 - i))) & 0x1f) as u8;
    }
    out
}

fn polymod(values: &[u8]) -> u64 {
    const GEN: [u64; 5] = [0x98_f2bc_8e61, 0x79_b76d_99e2, 0xf3_3e5f_b3c4, 0xae_2eab_e2a8, 0x1e_4f43_e470];
    let mut c: u64 = 1;
    for v in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(*v);
        for (i, g) in GEN.iter().enumerate() {
            if c0 & (1 << i) != 0 { c ^= g; }
        }
    }
    c ^ 1
}

/// Regroups bits; `None` on out-of-range input or non-zero padding.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for v in data {
        let v = u32::from(*v);
        if v >> from != 0 { return None; }
        acc = ((acc << from) | v) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 { out.push(((acc << (to - bits)) & maxv) as u8); }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return None;
    }
    Some(out)
}

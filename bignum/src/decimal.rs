//! Base conversion between binary limbs and decimal text.
//!
//! Rendering walks the limbs from most to least significant, keeping a
//! base-10^9 accumulator: `acc = acc * 2^32 + limb`. That is quadratic in the
//! limb count, which is fine for output. Parsing goes the other way, nine
//! digits at a time.

use crate::error::ParseBigNumError;
use crate::limb::{Limb, Wide, LIMB_BITS};

/// Base of one accumulator chunk.
pub const CHUNK_BASE: u32 = 1_000_000_000;

/// Decimal digits per accumulator chunk.
pub const CHUNK_DIGITS: usize = 9;

/// Decimal number in base 10^9, least significant chunk first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecimalAccumulator {
    chunks: Vec<u32>,
}

impl DecimalAccumulator {
    pub fn new() -> Self {
        Self { chunks: vec![0] }
    }

    /// `self = self * 2^32 + limb`
    pub fn push_limb(&mut self, limb: Limb) {
        let base = CHUNK_BASE as Wide;
        let mut carry = limb as Wide;
        for chunk in self.chunks.iter_mut() {
            let v = ((*chunk as Wide) << LIMB_BITS) + carry;
            *chunk = (v % base) as u32;
            carry = v / base;
        }
        while carry != 0 {
            self.chunks.push((carry % base) as u32);
            carry /= base;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.chunks.iter().all(|&c| c == 0)
    }

    /// Chunks, least significant first.
    pub fn chunks(&self) -> &[u32] {
        &self.chunks
    }

    /// Most significant chunk unpadded, every later one padded to nine digits.
    pub fn render(&self, negative: bool) -> String {
        let top = self.chunks.iter().rposition(|&c| c != 0).unwrap_or(0);
        let mut out = String::with_capacity((top + 1) * CHUNK_DIGITS + 1);
        if negative && !self.is_zero() {
            out.push('-');
        }
        out.push_str(&self.chunks[top].to_string());
        for chunk in self.chunks[..top].iter().rev() {
            out.push_str(&format!("{chunk:09}"));
        }
        out
    }
}

impl Default for DecimalAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render limbs given most significant first.
pub fn render_limbs<I>(negative: bool, limbs_msb_first: I) -> String
where
    I: IntoIterator<Item = Limb>,
{
    let mut acc = DecimalAccumulator::new();
    for limb in limbs_msb_first {
        acc.push_limb(limb);
    }
    acc.render(negative)
}

/// Lowercase hex of limbs given most significant first, no prefix.
pub(crate) fn hex_limbs<I>(limbs_msb_first: I) -> String
where
    I: IntoIterator<Item = Limb>,
{
    let mut hex = String::new();
    for limb in limbs_msb_first {
        if hex.is_empty() {
            if limb != 0 {
                hex.push_str(&format!("{limb:x}"));
            }
        } else {
            hex.push_str(&format!("{limb:08x}"));
        }
    }
    if hex.is_empty() {
        hex.push('0');
    }
    hex
}

/// Parse `[-+]?[0-9]+` into a sign and little-endian limbs with no
/// leading zero limbs (zero is `[0]`).
pub(crate) fn parse_decimal(s: &str) -> Result<(bool, Vec<Limb>), ParseBigNumError> {
    let (negative, digits, offset) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..], 1),
        Some(b'+') => (false, &s[1..], 1),
        _ => (false, s, 0),
    };
    if digits.is_empty() {
        return Err(ParseBigNumError::Empty);
    }
    if let Some((i, c)) = digits.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        return Err(ParseBigNumError::InvalidDigit {
            position: i + offset,
            found: c,
        });
    }

    let mut limbs: Vec<Limb> = vec![0];
    let bytes = digits.as_bytes();
    let head = bytes.len() % CHUNK_DIGITS;
    let groups = std::iter::once(&bytes[..head])
        .filter(|g| !g.is_empty())
        .chain(bytes[head..].chunks(CHUNK_DIGITS));
    for group in groups {
        let mut scale: Wide = 1;
        let mut value: Wide = 0;
        for &d in group {
            scale *= 10;
            value = value * 10 + (d - b'0') as Wide;
        }
        // limbs = limbs * scale + value
        let mut carry = value;
        for limb in limbs.iter_mut() {
            let t = *limb as Wide * scale + carry;
            *limb = t as Limb;
            carry = t >> LIMB_BITS;
        }
        if carry != 0 {
            limbs.push(carry as Limb);
        }
    }
    let zero = limbs.iter().all(|&l| l == 0);
    Ok((negative && !zero, limbs))
}

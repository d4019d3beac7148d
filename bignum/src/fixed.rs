//! Fixed-width sign-magnitude integer held entirely in memory.
//!
//! `FixedInt<N>` stores `N` little-endian 32-bit limbs and a sign flag.
//! Results that need more than `N` limbs are truncated: the operators drop
//! the high limbs silently, and the `overflowing_*` methods report that the
//! truncation happened. Division by zero is defined as `(0, dividend)`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::decimal::{hex_limbs, parse_decimal, render_limbs};
use crate::error::ParseBigNumError;
use crate::limb::{
    add_assign_limbs, bit_len, cmp_limbs, mul_limbs, shl_limbs, shr_limbs, sub_assign_limbs,
    top_index, Limb, LIMB_BITS,
};

/// Signed integer of exactly `N` base-2^32 limbs.
///
/// Invariants: zero is never negative, and `top` is the index of the most
/// significant nonzero limb (0 for zero).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedInt<const N: usize> {
    limbs: [Limb; N],
    negative: bool,
    top: usize,
}

// ============================================================================
// Construction
// ============================================================================

impl<const N: usize> FixedInt<N> {
    const NONZERO_WIDTH: () = assert!(N > 0, "FixedInt needs at least one limb");

    pub const ZERO: Self = {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_WIDTH;
        Self {
            limbs: [0; N],
            negative: false,
            top: 0,
        }
    };

    /// Total bit width, `32 * N`.
    pub const BITS: usize = N * LIMB_BITS as usize;

    pub fn one() -> Self {
        let mut limbs = [0; N];
        limbs[0] = 1;
        Self::from_limbs(limbs, false)
    }

    /// Build from raw little-endian limbs. A zero magnitude drops the sign.
    pub fn from_limbs(limbs: [Limb; N], negative: bool) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_WIDTH;
        let mut v = Self {
            limbs,
            negative,
            top: 0,
        };
        v.normalize();
        v
    }

    /// Sign plus a magnitude of up to 128 bits, truncated to `N` limbs.
    fn from_magnitude(negative: bool, mut magnitude: u128) -> Self {
        let mut limbs = [0; N];
        for limb in limbs.iter_mut() {
            *limb = magnitude as Limb;
            magnitude >>= LIMB_BITS;
            if magnitude == 0 {
                break;
            }
        }
        Self::from_limbs(limbs, negative)
    }

    /// Convert to another width: zero-extends when widening, truncates when
    /// narrowing. The sign is kept unless the truncated magnitude is zero.
    pub fn resize<const M: usize>(&self) -> FixedInt<M> {
        let mut limbs = [0; M];
        let n = N.min(M);
        limbs[..n].copy_from_slice(&self.limbs[..n]);
        FixedInt::from_limbs(limbs, self.negative)
    }

    /// Zero in place, without a `[Limb; N]` temporary.
    fn clear(&mut self) {
        self.limbs.fill(0);
        self.negative = false;
        self.top = 0;
    }

    /// Re-derive `top` and clear the sign of zero. Every mutation ends here.
    #[inline]
    fn normalize(&mut self) {
        self.top = top_index(&self.limbs);
        if self.top == 0 && self.limbs[0] == 0 {
            self.negative = false;
        }
    }
}

impl<const N: usize> Default for FixedInt<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        impl<const N: usize> From<$t> for FixedInt<N> {
            fn from(v: $t) -> Self {
                Self::from_magnitude(false, v as u128)
            }
        }
    )*};
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        impl<const N: usize> From<$t> for FixedInt<N> {
            fn from(v: $t) -> Self {
                Self::from_magnitude(v < 0, (v as i128).unsigned_abs())
            }
        }
    )*};
}

impl_from_unsigned!(u8, u16, u32, u64, u128, usize);
impl_from_signed!(i8, i16, i32, i64, i128, isize);

// ============================================================================
// Queries
// ============================================================================

impl<const N: usize> FixedInt<N> {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.top == 0 && self.limbs[0] == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            negative: false,
            ..*self
        }
    }

    /// All `N` limbs, least significant first.
    pub fn limbs(&self) -> &[Limb; N] {
        &self.limbs
    }

    /// Limbs up to and including the most significant nonzero one.
    pub fn significant_limbs(&self) -> &[Limb] {
        &self.limbs[..=self.top]
    }

    /// Bits needed for the magnitude (0 for zero).
    pub fn bit_len(&self) -> u64 {
        bit_len(self.significant_limbs())
    }

    /// Compare magnitudes, ignoring signs.
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.top
            .cmp(&other.top)
            .then_with(|| cmp_limbs(self.significant_limbs(), &other.limbs[..=other.top]))
    }

    /// Value as `i128`, if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.bit_len() > 128 {
            return None;
        }
        let magnitude = self.magnitude_u128();
        if self.negative {
            (magnitude <= 1 << 127).then(|| (magnitude as i128).wrapping_neg())
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    /// Value as `u128`, if it is non-negative and fits.
    pub fn to_u128(&self) -> Option<u128> {
        (!self.negative && self.bit_len() <= 128).then(|| self.magnitude_u128())
    }

    fn magnitude_u128(&self) -> u128 {
        self.limbs
            .iter()
            .take(4)
            .rev()
            .fold(0u128, |acc, &l| (acc << LIMB_BITS) | l as u128)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl<const N: usize> FixedInt<N> {
    /// `self += (rhs_negative ? -1 : 1) * |rhs|`. Returns whether a carry
    /// left the top limb.
    fn accumulate(&mut self, rhs: &Self, rhs_negative: bool) -> bool {
        let rhs_limbs = rhs.significant_limbs();
        if self.negative == rhs_negative {
            let carry = add_assign_limbs(&mut self.limbs, rhs_limbs);
            self.normalize();
            return carry != 0;
        }
        match self.cmp_magnitude(rhs) {
            Ordering::Equal => *self = Self::ZERO,
            Ordering::Greater => {
                sub_assign_limbs(&mut self.limbs, rhs_limbs);
                self.normalize();
            }
            Ordering::Less => {
                let mut limbs = rhs.limbs;
                sub_assign_limbs(&mut limbs, self.significant_limbs());
                self.limbs = limbs;
                self.negative = rhs_negative;
                self.normalize();
            }
        }
        false
    }

    /// Sum and whether it was truncated to `N` limbs.
    pub fn overflowing_add(mut self, rhs: Self) -> (Self, bool) {
        let lost = self.accumulate(&rhs, rhs.negative);
        (self, lost)
    }

    /// Difference and whether it was truncated to `N` limbs.
    pub fn overflowing_sub(mut self, rhs: Self) -> (Self, bool) {
        let lost = self.accumulate(&rhs, !rhs.negative);
        (self, lost)
    }

    /// Product and whether it was truncated to `N` limbs.
    pub fn overflowing_mul(self, rhs: Self) -> (Self, bool) {
        let mut out = Self::ZERO;
        let lost = mul_limbs(self.significant_limbs(), rhs.significant_limbs(), &mut out.limbs);
        out.negative = self.negative != rhs.negative;
        out.normalize();
        (out, lost)
    }

    /// Quotient and remainder by restoring binary long division.
    ///
    /// The quotient truncates toward zero and its sign is the XOR of the
    /// operand signs; the remainder takes the dividend's sign, so
    /// `q * d + r == self` and `|r| < |d|`. A zero divisor yields
    /// `(0, self)`.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let mut quot = Self::ZERO;
        let mut rem = Self::ZERO;
        self.div_rem_into(divisor, &mut quot, &mut rem);
        (quot, rem)
    }

    /// [`div_rem`](Self::div_rem) writing into caller-owned values, for
    /// widths where extra `[Limb; N]` temporaries would not fit the stack.
    pub fn div_rem_into(&self, divisor: &Self, quot: &mut Self, rem: &mut Self) {
        quot.clear();
        rem.limbs.copy_from_slice(&self.limbs);
        rem.negative = self.negative;
        rem.top = self.top;
        if divisor.is_zero() {
            return;
        }
        let q_negative = self.negative != divisor.negative;
        match self.cmp_magnitude(divisor) {
            Ordering::Less => return,
            Ordering::Equal => {
                rem.clear();
                quot.limbs[0] = 1;
                quot.negative = q_negative;
                return;
            }
            Ordering::Greater => {}
        }

        // Only the dividend's significant limbs take part. Align the
        // divisor's top bit with the dividend's; the shifted divisor has
        // exactly the dividend's bit length, so it fits in `len` limbs.
        let len = self.top + 1;
        let k = (self.bit_len() - divisor.bit_len()) as usize;
        let mut shifted = vec![0; len];
        shifted[..=divisor.top].copy_from_slice(divisor.significant_limbs());
        shl_limbs(&mut shifted, k);

        let rem_limbs = &mut rem.limbs[..len];
        for step in (0..=k).rev() {
            if cmp_limbs(rem_limbs, &shifted) != Ordering::Less {
                sub_assign_limbs(rem_limbs, &shifted);
                quot.limbs[step / LIMB_BITS as usize] |= (1 as Limb) << (step % LIMB_BITS as usize);
            }
            shr_limbs(&mut shifted, 1);
        }
        quot.negative = q_negative;
        quot.normalize();
        rem.normalize();
    }

    /// [`div_rem`](Self::div_rem), but `None` for a zero divisor.
    pub fn checked_div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        (!divisor.is_zero()).then(|| self.div_rem(divisor))
    }

    pub fn inc(&mut self) {
        *self += Self::one();
    }

    pub fn dec(&mut self) {
        *self -= Self::one();
    }
}

impl<const N: usize> Neg for FixedInt<N> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_limbs(self.limbs, !self.negative)
    }
}

impl<const N: usize> Not for FixedInt<N> {
    type Output = Self;

    /// Flips every limb; the sign is kept.
    fn not(self) -> Self {
        Self::from_limbs(self.limbs.map(|l| !l), self.negative)
    }
}

impl<const N: usize> AddAssign for FixedInt<N> {
    fn add_assign(&mut self, rhs: Self) {
        self.accumulate(&rhs, rhs.negative);
    }
}

impl<const N: usize> SubAssign for FixedInt<N> {
    fn sub_assign(&mut self, rhs: Self) {
        self.accumulate(&rhs, !rhs.negative);
    }
}

impl<const N: usize> MulAssign for FixedInt<N> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = self.overflowing_mul(rhs).0;
    }
}

impl<const N: usize> DivAssign for FixedInt<N> {
    fn div_assign(&mut self, rhs: Self) {
        let dividend = *self;
        let mut rem = Self::ZERO;
        dividend.div_rem_into(&rhs, self, &mut rem);
    }
}

impl<const N: usize> RemAssign for FixedInt<N> {
    fn rem_assign(&mut self, rhs: Self) {
        let dividend = *self;
        let mut quot = Self::ZERO;
        dividend.div_rem_into(&rhs, &mut quot, self);
    }
}

/// Limb-wise bitwise ops. The result keeps the left operand's sign.
macro_rules! impl_bitwise_assign {
    ($($trait:ident, $method:ident, $op:tt;)*) => {$(
        impl<const N: usize> $trait for FixedInt<N> {
            fn $method(&mut self, rhs: Self) {
                for (a, b) in self.limbs.iter_mut().zip(rhs.limbs.iter()) {
                    *a $op *b;
                }
                self.normalize();
            }
        }
    )*};
}

impl_bitwise_assign! {
    BitAndAssign, bitand_assign, &=;
    BitOrAssign, bitor_assign, |=;
    BitXorAssign, bitxor_assign, ^=;
}

impl<const N: usize> ShlAssign<usize> for FixedInt<N> {
    /// Shifts the magnitude; bits past the top limb are dropped.
    fn shl_assign(&mut self, bits: usize) {
        shl_limbs(&mut self.limbs, bits);
        self.normalize();
    }
}

impl<const N: usize> ShrAssign<usize> for FixedInt<N> {
    /// Shifts the magnitude, so negative values round toward zero.
    fn shr_assign(&mut self, bits: usize) {
        shr_limbs(&mut self.limbs, bits);
        self.normalize();
    }
}

macro_rules! impl_binary_op {
    ($($trait:ident, $method:ident, $assign:ident, $rhs:ty;)*) => {$(
        impl<const N: usize> $trait<$rhs> for FixedInt<N> {
            type Output = Self;

            fn $method(mut self, rhs: $rhs) -> Self {
                self.$assign(rhs);
                self
            }
        }
    )*};
}

impl_binary_op! {
    Add, add, add_assign, FixedInt<N>;
    Sub, sub, sub_assign, FixedInt<N>;
    Mul, mul, mul_assign, FixedInt<N>;
    Div, div, div_assign, FixedInt<N>;
    Rem, rem, rem_assign, FixedInt<N>;
    BitAnd, bitand, bitand_assign, FixedInt<N>;
    BitOr, bitor, bitor_assign, FixedInt<N>;
    BitXor, bitxor, bitxor_assign, FixedInt<N>;
    Shl, shl, shl_assign, usize;
    Shr, shr, shr_assign, usize;
}

// ============================================================================
// Ordering
// ============================================================================

impl<const N: usize> Ord for FixedInt<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl<const N: usize> PartialOrd for FixedInt<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// Text
// ============================================================================

impl<const N: usize> FixedInt<N> {
    /// Decimal digits with a leading `-` for negative values.
    pub fn to_decimal_string(&self) -> String {
        render_limbs(self.negative, self.significant_limbs().iter().rev().copied())
    }

    /// Lowercase hex of the magnitude, `-` prefixed when negative, no `0x`.
    pub fn to_hex_string(&self) -> String {
        let hex = hex_limbs(self.significant_limbs().iter().rev().copied());
        if self.negative {
            format!("-{hex}")
        } else {
            hex
        }
    }
}

impl<const N: usize> fmt::Display for FixedInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = render_limbs(false, self.significant_limbs().iter().rev().copied());
        f.pad_integral(!self.negative, "", &digits)
    }
}

impl<const N: usize> fmt::LowerHex for FixedInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex_limbs(self.significant_limbs().iter().rev().copied());
        f.pad_integral(!self.negative, "0x", &hex)
    }
}

impl<const N: usize> fmt::Debug for FixedInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedInt<{N}>({self})")
    }
}

impl<const N: usize> FromStr for FixedInt<N> {
    type Err = ParseBigNumError;

    /// Decimal with an optional sign. Values wider than `N` limbs are
    /// rejected rather than truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, parsed) = parse_decimal(s)?;
        if parsed.len() > N {
            return Err(ParseBigNumError::Overflow { bits: Self::BITS });
        }
        let mut limbs = [0; N];
        limbs[..parsed.len()].copy_from_slice(&parsed);
        Ok(Self::from_limbs(limbs, negative))
    }
}

impl<const N: usize> Serialize for FixedInt<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedInt<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================

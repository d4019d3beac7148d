//! Arbitrary-width sign-magnitude integer whose limbs live in a
//! [`PagedVec`].
//!
//! Only one window of limbs is in memory at a time, so every limb access can
//! hit the backing store. The algorithms walk limbs in ascending or
//! descending order and read the other operand a chunk at a time through its
//! read-only path, which never disturbs that operand's window.
//!
//! Every operation that touches limbs returns a [`Result`]: storage failures
//! are reported, while division by zero is defined as `(0, dividend)`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use paged::{BackingStore, FileStore, MemStore, PagedVec, DEFAULT_WINDOW};
use tracing::warn;

use crate::decimal::{hex_limbs, parse_decimal, DecimalAccumulator};
use crate::error::{BigNumError, Result};
use crate::fixed::FixedInt;
use crate::limb::{adc, limb_bits, mac, sbb, Limb, LIMB_BITS};

/// Limbs read per store request when scanning an operand.
const SCAN_CHUNK: usize = 256;

/// Integer of unbounded width backed by a paged limb sequence.
///
/// Invariants: at least one limb, no zero limb on top unless the value is
/// zero, and zero is never negative.
pub struct BigNum<S: BackingStore = FileStore, const W: usize = { DEFAULT_WINDOW }> {
    limbs: PagedVec<Limb, S, W>,
    negative: bool,
}

type Limbs<S, const W: usize> = PagedVec<Limb, S, W>;

// ============================================================================
// Limb scans (read-only path)
// ============================================================================

/// Visit every limb in ascending order.
fn scan_up<S, const W: usize, F>(limbs: &Limbs<S, W>, mut f: F) -> Result<()>
where
    S: BackingStore,
    F: FnMut(usize, Limb) -> Result<()>,
{
    let mut chunk = vec![0; SCAN_CHUNK];
    let mut start = 0;
    while start < limbs.len() {
        let got = limbs.read_into(start, &mut chunk)?;
        for (k, &limb) in chunk[..got].iter().enumerate() {
            f(start + k, limb)?;
        }
        start += got;
    }
    Ok(())
}

/// Visit every limb in descending order.
fn scan_down<S, const W: usize, F>(limbs: &Limbs<S, W>, mut f: F) -> Result<()>
where
    S: BackingStore,
    F: FnMut(usize, Limb) -> Result<()>,
{
    let mut chunk = vec![0; SCAN_CHUNK];
    let mut end = limbs.len();
    while end > 0 {
        let start = end.saturating_sub(SCAN_CHUNK);
        let got = limbs.read_into(start, &mut chunk[..end - start])?;
        for (k, &limb) in chunk[..got].iter().enumerate().rev() {
            f(start + k, limb)?;
        }
        end = start;
    }
    Ok(())
}

// ============================================================================
// Construction
// ============================================================================

impl<S: BackingStore, const W: usize> BigNum<S, W> {
    /// Zero, stored in `store`.
    pub fn zero_in(store: S) -> Result<Self> {
        Self::from_limbs_in(store, false, [0])
    }

    /// Build from little-endian limbs. Leading zero limbs are dropped and a
    /// zero magnitude drops the sign.
    pub fn from_limbs_in<I>(store: S, negative: bool, limbs: I) -> Result<Self>
    where
        I: IntoIterator<Item = Limb>,
    {
        let mut limbs = PagedVec::from_iter_in(store, limbs)?;
        if limbs.is_empty() {
            limbs.emplace(0)?;
        }
        let mut n = Self { limbs, negative };
        n.trim()?;
        Ok(n)
    }

    fn from_magnitude_in(store: S, negative: bool, mut magnitude: u128) -> Result<Self> {
        let mut limbs = Vec::with_capacity(4);
        while magnitude != 0 {
            limbs.push(magnitude as Limb);
            magnitude >>= LIMB_BITS;
        }
        Self::from_limbs_in(store, negative, limbs)
    }

    pub fn from_i128_in(store: S, value: i128) -> Result<Self> {
        Self::from_magnitude_in(store, value < 0, value.unsigned_abs())
    }

    pub fn from_u128_in(store: S, value: u128) -> Result<Self> {
        Self::from_magnitude_in(store, false, value)
    }

    /// Widen a fixed-width value into `store`.
    pub fn from_fixed_in<const N: usize>(store: S, value: &FixedInt<N>) -> Result<Self> {
        Self::from_limbs_in(
            store,
            value.is_negative(),
            value.significant_limbs().iter().copied(),
        )
    }

    /// Parse decimal text with an optional sign into `store`.
    pub fn parse_in(store: S, text: &str) -> Result<Self> {
        let (negative, limbs) = parse_decimal(text)?;
        Self::from_limbs_in(store, negative, limbs)
    }

    /// Deep copy into a duplicated store.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            limbs: self.limbs.try_clone()?,
            negative: self.negative,
        })
    }

    /// Zero in a new store next to this one's.
    fn zero_beside(&self) -> Result<Self> {
        let mut limbs = self.limbs.sibling()?;
        limbs.emplace(0)?;
        Ok(Self {
            limbs,
            negative: false,
        })
    }

    /// Copy of `src`'s magnitude, with `negative`, in a store next to this one's.
    fn copy_beside<S2, const W2: usize>(
        &self,
        src: &BigNum<S2, W2>,
        negative: bool,
    ) -> Result<Self>
    where
        S2: BackingStore,
    {
        let mut limbs = self.limbs.sibling()?;
        limbs.insert_range(0, &src.limbs, 0..src.limbs.len())?;
        Ok(Self { limbs, negative })
    }

    /// Pop zero limbs off the top (keeping one) and clear the sign of zero.
    fn trim(&mut self) -> Result<()> {
        while self.limbs.len() > 1 && self.limbs.fetch(self.limbs.len() - 1)? == 0 {
            self.limbs.pop_back();
        }
        if self.limbs.len() == 1 && self.limbs.fetch(0)? == 0 {
            self.negative = false;
        }
        Ok(())
    }

    fn set_zero(&mut self) -> Result<()> {
        self.limbs.truncate(1);
        self.limbs.set(0, 0)?;
        self.negative = false;
        Ok(())
    }
}

impl BigNum {
    /// Zero in a fresh scratch file.
    pub fn zero() -> Result<Self> {
        Self::zero_in(FileStore::scratch()?)
    }

    pub fn from_i128(value: i128) -> Result<Self> {
        Self::from_i128_in(FileStore::scratch()?, value)
    }

    pub fn from_u128(value: u128) -> Result<Self> {
        Self::from_u128_in(FileStore::scratch()?, value)
    }

    pub fn from_fixed<const N: usize>(value: &FixedInt<N>) -> Result<Self> {
        Self::from_fixed_in(FileStore::scratch()?, value)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_in(FileStore::scratch()?, text)
    }
}

impl FromStr for BigNum {
    type Err = BigNumError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// Queries
// ============================================================================

impl<S: BackingStore, const W: usize> BigNum<S, W> {
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> Result<bool> {
        Ok(self.limbs.len() == 1 && self.limbs.get(0)? == 0)
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> Result<i32> {
        Ok(if self.is_zero()? {
            0
        } else if self.negative {
            -1
        } else {
            1
        })
    }

    /// Number of limbs in use (at least one).
    #[inline]
    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// The underlying limb sequence.
    pub fn limbs(&self) -> &PagedVec<Limb, S, W> {
        &self.limbs
    }

    /// Every limb, least significant first.
    pub fn to_limbs(&self) -> Result<Vec<Limb>> {
        Ok(self.limbs.to_vec()?)
    }

    /// Bits needed for the magnitude (0 for zero).
    pub fn bit_len(&self) -> Result<u64> {
        let top = self.limbs.len() - 1;
        let last = self.limbs.get(top)?;
        Ok(top as u64 * LIMB_BITS as u64 + limb_bits(last) as u64)
    }

    /// Compare magnitudes, ignoring signs. Reads both operands from the top
    /// down and stops at the first differing limb.
    pub fn magnitude_cmp<S2, const W2: usize>(&self, other: &BigNum<S2, W2>) -> Result<Ordering>
    where
        S2: BackingStore,
    {
        let len = self.limbs.len();
        match len.cmp(&other.limbs.len()) {
            Ordering::Equal => {}
            ord => return Ok(ord),
        }
        let mut mine = vec![0; SCAN_CHUNK];
        let mut theirs = vec![0; SCAN_CHUNK];
        let mut end = len;
        while end > 0 {
            let start = end.saturating_sub(SCAN_CHUNK);
            let count = end - start;
            self.limbs.read_into(start, &mut mine[..count])?;
            other.limbs.read_into(start, &mut theirs[..count])?;
            for (a, b) in mine[..count].iter().rev().zip(theirs[..count].iter().rev()) {
                match a.cmp(b) {
                    Ordering::Equal => continue,
                    ord => return Ok(ord),
                }
            }
            end = start;
        }
        Ok(Ordering::Equal)
    }

    /// Total order on values: negatives first.
    pub fn compare<S2, const W2: usize>(&self, other: &BigNum<S2, W2>) -> Result<Ordering>
    where
        S2: BackingStore,
    {
        Ok(match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.magnitude_cmp(other)?,
            (true, true) => self.magnitude_cmp(other)?.reverse(),
        })
    }

    /// Truncate to `N` limbs, keeping the sign unless the result is zero.
    pub fn to_fixed<const N: usize>(&self) -> Result<FixedInt<N>> {
        let mut limbs = [0; N];
        let n = N.min(self.limbs.len());
        self.limbs.read_into(0, &mut limbs[..n])?;
        Ok(FixedInt::from_limbs(limbs, self.negative))
    }
}

// ============================================================================
// Addition and subtraction
// ============================================================================

impl<S: BackingStore, const W: usize> BigNum<S, W> {
    /// `self += (rhs_negative ? -1 : 1) * |rhs|`
    fn accumulate<S2, const W2: usize>(
        &mut self,
        rhs: &BigNum<S2, W2>,
        rhs_negative: bool,
    ) -> Result<()>
    where
        S2: BackingStore,
    {
        if self.negative == rhs_negative {
            return self.add_magnitude(rhs);
        }
        match self.magnitude_cmp(rhs)? {
            Ordering::Equal => self.set_zero(),
            Ordering::Greater => self.sub_magnitude(rhs),
            Ordering::Less => {
                let mut diff = self.copy_beside(rhs, rhs_negative)?;
                diff.sub_magnitude(&*self)?;
                *self = diff;
                Ok(())
            }
        }
    }

    /// `|self| += |rhs|`, appending a limb on carry-out.
    fn add_magnitude<S2, const W2: usize>(&mut self, rhs: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        let limbs = &mut self.limbs;
        let mut carry = 0;
        scan_up(&rhs.limbs, |i, b| {
            if i < limbs.len() {
                let slot = limbs.slot_mut(i)?;
                let (s, c) = adc(*slot, b, carry);
                *slot = s;
                carry = c;
            } else {
                let (s, c) = adc(0, b, carry);
                limbs.emplace(s)?;
                carry = c;
            }
            Ok(())
        })?;
        let mut i = rhs.limbs.len();
        while carry != 0 {
            if i < limbs.len() {
                let slot = limbs.slot_mut(i)?;
                let (s, c) = adc(*slot, 0, carry);
                *slot = s;
                carry = c;
            } else {
                limbs.emplace(carry)?;
                carry = 0;
            }
            i += 1;
        }
        Ok(())
    }

    /// `|self| -= |rhs|`; requires `|self| >= |rhs|`.
    fn sub_magnitude<S2, const W2: usize>(&mut self, rhs: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        let limbs = &mut self.limbs;
        let mut borrow = 0;
        scan_up(&rhs.limbs, |i, b| {
            let slot = limbs.slot_mut(i)?;
            let (d, br) = sbb(*slot, b, borrow);
            *slot = d;
            borrow = br;
            Ok(())
        })?;
        let mut i = rhs.limbs.len();
        while borrow != 0 && i < limbs.len() {
            let slot = limbs.slot_mut(i)?;
            let (d, br) = sbb(*slot, 0, borrow);
            *slot = d;
            borrow = br;
            i += 1;
        }
        debug_assert_eq!(borrow, 0, "subtrahend larger than minuend");
        self.trim()
    }

    pub fn add_assign<S2, const W2: usize>(&mut self, rhs: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        self.accumulate(rhs, rhs.negative)
    }

    pub fn sub_assign<S2, const W2: usize>(&mut self, rhs: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        self.accumulate(rhs, !rhs.negative)
    }

    /// `self + rhs` in a new store.
    pub fn add<S2, const W2: usize>(&self, rhs: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        let mut sum = self.try_clone()?;
        sum.add_assign(rhs)?;
        Ok(sum)
    }

    /// `self - rhs` in a new store. `a.sub(&a)` is canonical zero.
    pub fn sub<S2, const W2: usize>(&self, rhs: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        let mut diff = self.try_clone()?;
        diff.sub_assign(rhs)?;
        Ok(diff)
    }

    pub fn inc(&mut self) -> Result<()> {
        self.add_assign(&one()?)
    }

    pub fn dec(&mut self) -> Result<()> {
        self.sub_assign(&one()?)
    }

    /// Flip the sign; zero stays non-negative.
    pub fn negate(&mut self) -> Result<()> {
        if !self.is_zero()? {
            self.negative = !self.negative;
        }
        Ok(())
    }

    /// `|self|` in a new store.
    pub fn abs(&self) -> Result<Self> {
        let mut out = self.try_clone()?;
        out.negative = false;
        Ok(out)
    }
}

/// One, in memory, for increments.
fn one() -> Result<BigNum<MemStore, 1>> {
    BigNum::from_u128_in(MemStore::new(), 1)
}

// ============================================================================
// Multiplication and division
// ============================================================================

impl<S: BackingStore, const W: usize> BigNum<S, W> {
    /// Schoolbook product in a new store. Row `i` walks the output upward
    /// from limb `i` while the right operand is read in chunks.
    pub fn mul<S2, const W2: usize>(&self, rhs: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        let mut out = self.zero_beside()?;
        let width = self.limbs.len() + rhs.limbs.len();
        for _ in 1..width {
            out.limbs.emplace(0)?;
        }
        let b_len = rhs.limbs.len();
        scan_up(&self.limbs, |i, a| {
            if a == 0 {
                return Ok(());
            }
            let mut carry = 0;
            scan_up(&rhs.limbs, |j, b| {
                let slot = out.limbs.slot_mut(i + j)?;
                let (lo, hi) = mac(a, b, *slot, carry);
                *slot = lo;
                carry = hi;
                Ok(())
            })?;
            out.limbs.set(i + b_len, carry)?;
            Ok(())
        })?;
        out.negative = self.negative != rhs.negative;
        out.trim()?;
        Ok(out)
    }

    pub fn mul_assign<S2, const W2: usize>(&mut self, rhs: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        *self = self.mul(rhs)?;
        Ok(())
    }

    /// Set bit `bit` of the magnitude, growing with zero limbs as needed.
    fn set_bit(&mut self, bit: u64) -> Result<()> {
        let idx = (bit / LIMB_BITS as u64) as usize;
        while self.limbs.len() <= idx {
            self.limbs.emplace(0)?;
        }
        *self.limbs.slot_mut(idx)? |= (1 as Limb) << (bit % LIMB_BITS as u64);
        Ok(())
    }

    /// Quotient and remainder by restoring binary long division, in new
    /// stores.
    ///
    /// The quotient truncates toward zero with the XOR of the operand signs;
    /// the remainder takes the dividend's sign. A zero divisor yields
    /// `(0, self)`.
    pub fn div_rem<S2, const W2: usize>(&self, divisor: &BigNum<S2, W2>) -> Result<(Self, Self)>
    where
        S2: BackingStore,
    {
        if divisor.is_zero()? {
            return Ok((self.zero_beside()?, self.try_clone()?));
        }
        let q_negative = self.negative != divisor.negative;
        match self.magnitude_cmp(divisor)? {
            Ordering::Less => return Ok((self.zero_beside()?, self.try_clone()?)),
            Ordering::Equal => {
                let mut q = self.zero_beside()?;
                q.limbs.set(0, 1)?;
                q.negative = q_negative;
                return Ok((q, self.zero_beside()?));
            }
            Ordering::Greater => {}
        }

        let k = self.bit_len()? - divisor.bit_len()?;
        let mut shifted = self.copy_beside(divisor, false)?;
        shifted.shl_assign(k as usize)?;
        let mut rem = self.abs()?;
        let mut quot = self.zero_beside()?;
        for step in (0..=k).rev() {
            if rem.magnitude_cmp(&shifted)? != Ordering::Less {
                rem.sub_magnitude(&shifted)?;
                quot.set_bit(step)?;
            }
            shifted.shr_assign(1)?;
        }
        quot.negative = q_negative;
        quot.trim()?;
        rem.negative = self.negative;
        rem.trim()?;
        Ok((quot, rem))
    }

    /// [`div_rem`](Self::div_rem), but `None` for a zero divisor.
    pub fn checked_div_rem<S2, const W2: usize>(
        &self,
        divisor: &BigNum<S2, W2>,
    ) -> Result<Option<(Self, Self)>>
    where
        S2: BackingStore,
    {
        if divisor.is_zero()? {
            return Ok(None);
        }
        self.div_rem(divisor).map(Some)
    }

    pub fn div<S2, const W2: usize>(&self, divisor: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        Ok(self.div_rem(divisor)?.0)
    }

    pub fn rem<S2, const W2: usize>(&self, divisor: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        Ok(self.div_rem(divisor)?.1)
    }

    pub fn div_assign<S2, const W2: usize>(&mut self, divisor: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        *self = self.div(divisor)?;
        Ok(())
    }

    pub fn rem_assign<S2, const W2: usize>(&mut self, divisor: &BigNum<S2, W2>) -> Result<()>
    where
        S2: BackingStore,
    {
        *self = self.rem(divisor)?;
        Ok(())
    }
}

// ============================================================================
// Shifts and bitwise operations
// ============================================================================

impl<S: BackingStore, const W: usize> BigNum<S, W> {
    /// Shift the magnitude left by `bits`, growing as needed.
    pub fn shl_assign(&mut self, bits: usize) -> Result<()> {
        if self.is_zero()? {
            return Ok(());
        }
        let word = bits / LIMB_BITS as usize;
        let bit = (bits % LIMB_BITS as usize) as u32;
        if bit > 0 {
            let mut carry = 0;
            self.limbs.update_each(|_, limb| {
                let v = *limb;
                *limb = (v << bit) | carry;
                carry = v >> (LIMB_BITS - bit);
            })?;
            if carry != 0 {
                self.limbs.emplace(carry)?;
            }
        }
        if word > 0 {
            let mut limbs = self.limbs.sibling()?;
            for _ in 0..word {
                limbs.emplace(0)?;
            }
            limbs.insert_range(word, &self.limbs, 0..self.limbs.len())?;
            self.limbs = limbs;
        }
        Ok(())
    }

    /// Shift the magnitude right by `bits`; negative values round toward
    /// zero.
    pub fn shr_assign(&mut self, bits: usize) -> Result<()> {
        let word = bits / LIMB_BITS as usize;
        let bit = (bits % LIMB_BITS as usize) as u32;
        if word >= self.limbs.len() {
            return self.set_zero();
        }
        if word > 0 {
            let mut limbs = self.limbs.sibling()?;
            limbs.insert_range(0, &self.limbs, word..self.limbs.len())?;
            self.limbs = limbs;
        }
        if bit > 0 {
            let mut carry = 0;
            for i in (0..self.limbs.len()).rev() {
                let slot = self.limbs.slot_mut(i)?;
                let v = *slot;
                *slot = (v >> bit) | carry;
                carry = v << (LIMB_BITS - bit);
            }
        }
        self.trim()
    }

    pub fn shl(&self, bits: usize) -> Result<Self> {
        let mut out = self.try_clone()?;
        out.shl_assign(bits)?;
        Ok(out)
    }

    pub fn shr(&self, bits: usize) -> Result<Self> {
        let mut out = self.try_clone()?;
        out.shr_assign(bits)?;
        Ok(out)
    }

    /// Limb-wise `op` over the longer operand's width (missing limbs are
    /// zero). The result keeps `self`'s sign unless it is zero.
    fn bitwise<S2, const W2: usize>(
        &self,
        rhs: &BigNum<S2, W2>,
        op: fn(Limb, Limb) -> Limb,
    ) -> Result<Self>
    where
        S2: BackingStore,
    {
        let width = self.limbs.len().max(rhs.limbs.len());
        let mut limbs = self.limbs.sibling()?;
        limbs.insert_range(0, &self.limbs, 0..self.limbs.len())?;
        for _ in self.limbs.len()..width {
            limbs.emplace(0)?;
        }
        scan_up(&rhs.limbs, |i, b| {
            let slot = limbs.slot_mut(i)?;
            *slot = op(*slot, b);
            Ok(())
        })?;
        if rhs.limbs.len() < width {
            for i in rhs.limbs.len()..width {
                let slot = limbs.slot_mut(i)?;
                *slot = op(*slot, 0);
            }
        }
        let mut out = Self {
            limbs,
            negative: self.negative,
        };
        out.trim()?;
        Ok(out)
    }

    pub fn bitand<S2, const W2: usize>(&self, rhs: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        self.bitwise(rhs, |a, b| a & b)
    }

    pub fn bitor<S2, const W2: usize>(&self, rhs: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        self.bitwise(rhs, |a, b| a | b)
    }

    pub fn bitxor<S2, const W2: usize>(&self, rhs: &BigNum<S2, W2>) -> Result<Self>
    where
        S2: BackingStore,
    {
        self.bitwise(rhs, |a, b| a ^ b)
    }

    /// Flip every limb currently in use; the sign is kept unless the result
    /// is zero.
    pub fn not(&self) -> Result<Self> {
        let mut out = self.try_clone()?;
        out.limbs.update_each(|_, limb| *limb = !*limb)?;
        out.trim()?;
        Ok(out)
    }
}

// ============================================================================
// Text
// ============================================================================

impl<S: BackingStore, const W: usize> BigNum<S, W> {
    fn decimal_digits(&self) -> Result<DecimalAccumulator> {
        let mut acc = DecimalAccumulator::new();
        scan_down(&self.limbs, |_, limb| {
            acc.push_limb(limb);
            Ok(())
        })?;
        Ok(acc)
    }

    /// Decimal digits with a leading `-` for negative values.
    pub fn to_decimal_string(&self) -> Result<String> {
        Ok(self.decimal_digits()?.render(self.negative))
    }

    /// Lowercase hex of the magnitude, `-` prefixed when negative, no `0x`.
    pub fn to_hex_string(&self) -> Result<String> {
        let mut limbs = Vec::with_capacity(self.limbs.len());
        scan_down(&self.limbs, |_, limb| {
            limbs.push(limb);
            Ok(())
        })?;
        let hex = hex_limbs(limbs);
        Ok(if self.negative { format!("-{hex}") } else { hex })
    }
}

impl<S: BackingStore, const W: usize> fmt::Display for BigNum<S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decimal_digits() {
            Ok(acc) => f.pad_integral(!self.negative, "", &acc.render(false)),
            Err(e) => {
                warn!(error = %e, "cannot read limbs for display");
                Err(fmt::Error)
            }
        }
    }
}

impl<S: BackingStore, const W: usize> fmt::Debug for BigNum<S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigNum")
            .field("negative", &self.negative)
            .field("limbs", &self.limbs)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    type Mem = BigNum<MemStore, 4>;
    type Tiny = BigNum<MemStore, 1>;

    fn mem(v: i128) -> Mem {
        Mem::from_i128_in(MemStore::new(), v).unwrap()
    }

    fn tiny(v: i128) -> Tiny {
        Tiny::from_i128_in(MemStore::new(), v).unwrap()
    }

    fn dec<S: BackingStore, const W: usize>(n: &BigNum<S, W>) -> String {
        n.to_decimal_string().unwrap()
    }

    #[test]
    fn test_zero_is_one_limb() {
        let z = Mem::zero_in(MemStore::new()).unwrap();
        assert_eq!(z.limb_count(), 1);
        assert!(z.is_zero().unwrap());
        assert!(!z.is_negative());
        assert_eq!(dec(&z), "0");
    }

    #[test]
    fn test_from_limbs_trims() {
        let n = Mem::from_limbs_in(MemStore::new(), true, [5, 0, 0]).unwrap();
        assert_eq!(n.to_limbs().unwrap(), vec![5]);
        let z = Mem::from_limbs_in(MemStore::new(), true, [0, 0]).unwrap();
        assert!(!z.is_negative());
        assert_eq!(z.limb_count(), 1);
    }

    #[test]
    fn test_hundred_div_seven() {
        let a = mem(100);
        let b = mem(7);
        assert_eq!(dec(&a.div(&b).unwrap()), "14");
        assert_eq!(dec(&a.rem(&b).unwrap()), "2");
    }

    #[test]
    fn test_add_grows_on_carry() {
        let mut a = tiny(u64::MAX as i128);
        a.add_assign(&tiny(1)).unwrap();
        assert_eq!(a.to_limbs().unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_sub_shrinks() {
        let mut a = tiny(1i128 << 64);
        a.sub_assign(&tiny(1)).unwrap();
        assert_eq!(a.to_limbs().unwrap(), vec![u32::MAX, u32::MAX]);
        a.sub_assign(&tiny(u64::MAX as i128)).unwrap();
        assert!(a.is_zero().unwrap());
        assert_eq!(a.limb_count(), 1);
    }

    #[test]
    fn test_signed_add_sub() {
        assert_eq!(dec(&mem(5).add(&mem(-8)).unwrap()), "-3");
        assert_eq!(dec(&mem(-5).add(&mem(8)).unwrap()), "3");
        assert_eq!(dec(&mem(-5).add(&mem(-8)).unwrap()), "-13");
        assert_eq!(dec(&mem(3).sub(&mem(10)).unwrap()), "-7");
        assert_eq!(dec(&mem(-3).sub(&mem(-10)).unwrap()), "7");
    }

    #[test]
    fn test_self_sub_is_zero() {
        let a = tiny(-(1i128 << 100));
        let z = a.sub(&a).unwrap();
        assert!(z.is_zero().unwrap());
        assert!(!z.is_negative());
    }

    #[test]
    fn test_mixed_stores() {
        let mut a = mem(1i128 << 90);
        let b = tiny(-(1i128 << 90));
        a.add_assign(&b).unwrap();
        assert!(a.is_zero().unwrap());
    }

    #[test]
    fn test_mul() {
        let a = tiny(-(u64::MAX as i128));
        let b = tiny(u64::MAX as i128);
        let p = a.mul(&b).unwrap();
        assert!(p.is_negative());
        let magnitude = p.abs().unwrap().to_fixed::<4>().unwrap().to_u128();
        assert_eq!(magnitude, Some(u64::MAX as u128 * u64::MAX as u128));
        let z = a.mul(&tiny(0)).unwrap();
        assert!(!z.is_negative());
        assert_eq!(z.limb_count(), 1);
    }

    #[test]
    fn test_div_rem_signs() {
        let (q, r) = mem(-7).div_rem(&mem(2)).unwrap();
        assert_eq!((dec(&q), dec(&r)), ("-3".to_string(), "-1".to_string()));
        let (q, r) = mem(7).div_rem(&mem(-2)).unwrap();
        assert_eq!((dec(&q), dec(&r)), ("-3".to_string(), "1".to_string()));
        let (q, r) = mem(-9).div_rem(&mem(-9)).unwrap();
        assert_eq!((dec(&q), dec(&r)), ("1".to_string(), "0".to_string()));
    }

    #[test]
    fn test_div_rem_assign() {
        let mut a = tiny(1i128 << 100);
        a.div_assign(&tiny(1i128 << 40)).unwrap();
        assert_eq!(dec(&a), (1i128 << 60).to_string());
        a.rem_assign(&mem(1000)).unwrap();
        assert_eq!(dec(&a), ((1i128 << 60) % 1000).to_string());
    }

    #[test]
    fn test_div_by_zero() {
        let a = mem(-1234);
        let (q, r) = a.div_rem(&mem(0)).unwrap();
        assert!(q.is_zero().unwrap());
        assert_eq!(dec(&r), "-1234");
        assert!(a.checked_div_rem(&mem(0)).unwrap().is_none());
    }

    #[test]
    fn test_div_multi_limb() {
        let a = tiny(i128::MAX);
        let b = tiny(0x1_0000_0001);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q.to_fixed::<4>().unwrap().to_i128(), Some(i128::MAX / 0x1_0000_0001));
        assert_eq!(r.to_fixed::<4>().unwrap().to_i128(), Some(i128::MAX % 0x1_0000_0001));
    }

    #[test]
    fn test_shifts() {
        let x = tiny(0x8000_0001);
        let up = x.shl(33).unwrap();
        assert_eq!(up.to_limbs().unwrap(), vec![0, 2, 1]);
        assert_eq!(up.shr(33).unwrap().to_limbs().unwrap(), vec![0x8000_0001]);
        let gone = x.shr(64).unwrap();
        assert!(gone.is_zero().unwrap());
        let neg = tiny(-1).shr(1).unwrap();
        assert!(neg.is_zero().unwrap());
        assert!(!neg.is_negative());
        assert_eq!(dec(&tiny(-5).shl(1).unwrap()), "-10");
    }

    #[test]
    fn test_bitwise() {
        let a = mem(0b1100);
        let b = mem(0b1010 | (1 << 40));
        assert_eq!(dec(&a.bitand(&b).unwrap()), "8");
        assert_eq!(a.bitor(&b).unwrap().to_limbs().unwrap(), vec![0b1110, 1 << 8]);
        assert_eq!(a.bitxor(&b).unwrap().to_limbs().unwrap(), vec![0b0110, 1 << 8]);
        assert_eq!(mem(0).not().unwrap().to_limbs().unwrap(), vec![u32::MAX]);
        assert!(!mem(-12).bitand(&mem(3)).unwrap().is_negative());
    }

    #[test]
    fn test_inc_dec_negate() {
        let mut x = mem(-1);
        x.inc().unwrap();
        assert!(x.is_zero().unwrap());
        x.negate().unwrap();
        assert!(!x.is_negative());
        x.dec().unwrap();
        assert_eq!(dec(&x), "-1");
        x.negate().unwrap();
        assert_eq!(x.signum().unwrap(), 1);
    }

    #[test]
    fn test_compare() {
        assert_eq!(mem(-3).compare(&mem(2)).unwrap(), Ordering::Less);
        assert_eq!(mem(-3).compare(&mem(-20)).unwrap(), Ordering::Greater);
        assert_eq!(mem(1i128 << 64).compare(&tiny(5)).unwrap(), Ordering::Greater);
        assert_eq!(mem(42).compare(&tiny(42)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_fixed_round_trip() {
        let f = FixedInt::<4>::from(-(1i128 << 80));
        let n = Mem::from_fixed_in(MemStore::new(), &f).unwrap();
        assert_eq!(n.limb_count(), 3);
        assert_eq!(n.to_fixed::<4>().unwrap(), f);
        let narrow: FixedInt<2> = n.to_fixed().unwrap();
        assert!(narrow.is_zero());
    }

    #[test]
    fn test_text() {
        let n = Mem::parse_in(MemStore::new(), "-340282366920938463463374607431768211456").unwrap();
        assert_eq!(n.limb_count(), 5);
        assert_eq!(n.to_hex_string().unwrap(), "-100000000000000000000000000000000");
        assert_eq!(format!("{n}"), "-340282366920938463463374607431768211456");
        assert_eq!(format!("{:>5}", mem(-7)), "   -7");
        assert!(matches!(
            Mem::parse_in(MemStore::new(), "12z"),
            Err(BigNumError::Parse(_))
        ));
    }

    #[test]
    fn test_try_clone_is_independent() {
        let a = tiny(1i128 << 70);
        let mut b = a.try_clone().unwrap();
        b.inc().unwrap();
        assert_eq!(dec(&a), (1i128 << 70).to_string());
        assert_eq!(dec(&b), ((1i128 << 70) + 1).to_string());
    }
}

//! Limb-slice kernels shared by [`FixedInt`](crate::FixedInt) and the
//! decimal renderer.
//!
//! A magnitude is a little-endian run of base-2^32 limbs. The kernels work
//! on plain slices and know nothing about signs.

use std::cmp::Ordering;

pub type Limb = u32;
pub type Wide = u64;

pub const LIMB_BITS: u32 = Limb::BITS;

/// Above this many limbs, multiplication first sums every partial product
/// into a 64-bit-per-limb buffer and resolves carries once at the end.
pub const ACCUMULATE_THRESHOLD: usize = 80_000;

// ============================================================================
// Low-level helpers
// ============================================================================

/// Add with carry: (result, carry) = a + b + carry_in
#[inline(always)]
pub(crate) const fn adc(a: Limb, b: Limb, carry: Limb) -> (Limb, Limb) {
    let tmp = a as Wide + b as Wide + carry as Wide;
    (tmp as Limb, (tmp >> LIMB_BITS) as Limb)
}

/// Subtract with borrow: (result, borrow) = a - b - borrow_in
#[inline(always)]
pub(crate) const fn sbb(a: Limb, b: Limb, borrow: Limb) -> (Limb, Limb) {
    let tmp = (a as Wide)
        .wrapping_sub(b as Wide)
        .wrapping_sub(borrow as Wide);
    (tmp as Limb, (tmp >> 63) as Limb) // borrow is 0 or 1
}

/// Multiply-accumulate: (lo, carry) = a * b + c + carry_in
#[inline(always)]
pub(crate) const fn mac(a: Limb, b: Limb, c: Limb, carry: Limb) -> (Limb, Limb) {
    let tmp = a as Wide * b as Wide + c as Wide + carry as Wide;
    (tmp as Limb, (tmp >> LIMB_BITS) as Limb)
}

/// Bits needed for a single limb (0 for 0).
#[inline]
pub(crate) const fn limb_bits(limb: Limb) -> u32 {
    LIMB_BITS - limb.leading_zeros()
}

// ============================================================================
// Slice kernels
// ============================================================================

/// Index of the most significant nonzero limb, or 0 when all are zero.
pub(crate) fn top_index(limbs: &[Limb]) -> usize {
    limbs.iter().rposition(|&l| l != 0).unwrap_or(0)
}

/// Significant bit length of a magnitude.
pub(crate) fn bit_len(limbs: &[Limb]) -> u64 {
    let top = top_index(limbs);
    top as u64 * LIMB_BITS as u64 + limb_bits(limbs.get(top).copied().unwrap_or(0)) as u64
}

/// Compare two equal-length magnitudes, most significant limb first.
pub(crate) fn cmp_limbs(a: &[Limb], b: &[Limb]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// `a += b` over `a.len()` limbs; `b` may be shorter. Returns the carry out.
pub(crate) fn add_assign_limbs(a: &mut [Limb], b: &[Limb]) -> Limb {
    let mut carry = 0;
    for (i, slot) in a.iter_mut().enumerate() {
        let rhs = b.get(i).copied().unwrap_or(0);
        if i >= b.len() && carry == 0 {
            break;
        }
        let (s, c) = adc(*slot, rhs, carry);
        *slot = s;
        carry = c;
    }
    carry
}

/// `a -= b` over `a.len()` limbs; `b` may be shorter. Returns the borrow out.
pub(crate) fn sub_assign_limbs(a: &mut [Limb], b: &[Limb]) -> Limb {
    let mut borrow = 0;
    for (i, slot) in a.iter_mut().enumerate() {
        let rhs = b.get(i).copied().unwrap_or(0);
        if i >= b.len() && borrow == 0 {
            break;
        }
        let (d, br) = sbb(*slot, rhs, borrow);
        *slot = d;
        borrow = br;
    }
    borrow
}

/// Schoolbook product of `a` and `b` truncated to `out.len()` limbs.
///
/// Returns whether anything nonzero was cut off.
pub(crate) fn mul_schoolbook(a: &[Limb], b: &[Limb], out: &mut [Limb]) -> bool {
    out.fill(0);
    let n = out.len();
    let mut lost = false;
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        if i >= n {
            lost |= b.iter().any(|&bj| bj != 0);
            continue;
        }
        let mut carry = 0;
        let fits = b.len().min(n - i);
        for (j, &bj) in b[..fits].iter().enumerate() {
            let (lo, hi) = mac(ai, bj, out[i + j], carry);
            out[i + j] = lo;
            carry = hi;
        }
        if fits < b.len() {
            lost |= carry != 0 || b[fits..].iter().any(|&bj| bj != 0);
        } else if i + fits < n {
            out[i + fits] = carry;
        } else {
            lost |= carry != 0;
        }
    }
    lost
}

/// Same result as [`mul_schoolbook`], computed by summing every partial
/// product's low and high halves into a 64-bit buffer, then resolving all
/// carries in one pass.
pub(crate) fn mul_accumulate(a: &[Limb], b: &[Limb], out: &mut [Limb]) -> bool {
    let n = out.len();
    let mut lost = false;
    let mut acc: Vec<Wide> = vec![0; n + 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            let p = ai as Wide * bj as Wide;
            let k = i + j;
            if k >= n {
                lost |= p != 0;
                continue;
            }
            acc[k] += p & Limb::MAX as Wide;
            acc[k + 1] += p >> LIMB_BITS;
        }
    }
    let mut carry: Wide = 0;
    for (slot, &sum) in out.iter_mut().zip(&acc) {
        let t = sum + carry;
        *slot = t as Limb;
        carry = t >> LIMB_BITS;
    }
    lost | (carry + acc[n] != 0)
}

/// Product truncated to `out.len()` limbs, picking the kernel by width.
pub(crate) fn mul_limbs(a: &[Limb], b: &[Limb], out: &mut [Limb]) -> bool {
    if out.len() > ACCUMULATE_THRESHOLD {
        tracing::debug!(limbs = out.len(), "using accumulator multiplication");
        mul_accumulate(a, b, out)
    } else {
        mul_schoolbook(a, b, out)
    }
}

/// In-place left shift by `bits`, dropping whatever leaves the top.
///
/// Returns whether anything nonzero was dropped.
pub(crate) fn shl_limbs(limbs: &mut [Limb], bits: usize) -> bool {
    let n = limbs.len();
    let word = bits / LIMB_BITS as usize;
    let bit = (bits % LIMB_BITS as usize) as u32;
    if word >= n {
        let lost = limbs.iter().any(|&l| l != 0);
        limbs.fill(0);
        return lost;
    }
    let lost = limbs[n - word..].iter().any(|&l| l != 0)
        || (bit > 0 && limbs[n - word - 1] >> (LIMB_BITS - bit) != 0);
    for i in (0..n).rev() {
        let hi = if i >= word { limbs[i - word] << bit } else { 0 };
        let lo = if bit > 0 && i > word {
            limbs[i - word - 1] >> (LIMB_BITS - bit)
        } else {
            0
        };
        limbs[i] = hi | lo;
    }
    lost
}

/// In-place right shift by `bits`, filling with zeros.
pub(crate) fn shr_limbs(limbs: &mut [Limb], bits: usize) {
    let n = limbs.len();
    let word = bits / LIMB_BITS as usize;
    let bit = (bits % LIMB_BITS as usize) as u32;
    if word >= n {
        limbs.fill(0);
        return;
    }
    for i in 0..n {
        let src = i + word;
        let lo = if src < n { limbs[src] >> bit } else { 0 };
        let hi = if bit > 0 && src + 1 < n {
            limbs[src + 1] << (LIMB_BITS - bit)
        } else {
            0
        };
        limbs[i] = lo | hi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_adc_sbb_mac() {
        assert_eq!(adc(u32::MAX, 1, 0), (0, 1));
        assert_eq!(adc(u32::MAX, u32::MAX, 1), (u32::MAX, 1));
        assert_eq!(sbb(0, 1, 0), (u32::MAX, 1));
        assert_eq!(sbb(5, 3, 1), (1, 0));
        assert_eq!(mac(u32::MAX, u32::MAX, u32::MAX, u32::MAX), (u32::MAX, u32::MAX));
    }

    #[test]
    fn test_bit_len() {
        assert_eq!(bit_len(&[0, 0]), 0);
        assert_eq!(bit_len(&[1, 0]), 1);
        assert_eq!(bit_len(&[0, 1]), 33);
        assert_eq!(bit_len(&[0, u32::MAX]), 64);
    }

    #[test]
    fn test_add_carry_out() {
        let mut a = [u32::MAX, u32::MAX];
        assert_eq!(add_assign_limbs(&mut a, &[1]), 1);
        assert_eq!(a, [0, 0]);
    }

    #[test]
    fn test_sub_borrow_chain() {
        let mut a = [0, 0, 1];
        assert_eq!(sub_assign_limbs(&mut a, &[1]), 0);
        assert_eq!(a, [u32::MAX, u32::MAX, 0]);
    }

    #[test]
    fn test_mul_truncation_is_reported() {
        let mut out = [0u32; 2];
        assert!(!mul_schoolbook(&[u32::MAX], &[u32::MAX], &mut out));
        assert_eq!(out, [1, u32::MAX - 1]);
        assert!(mul_schoolbook(&[0, 1], &[0, 1], &mut out));
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn test_shift_across_limbs() {
        let mut a = [0x8000_0001, 0, 0];
        assert!(!shl_limbs(&mut a, 33));
        assert_eq!(a, [0, 2, 1]);
        shr_limbs(&mut a, 33);
        assert_eq!(a, [0x8000_0001, 0, 0]);
    }

    #[test]
    fn test_shl_reports_dropped_bits() {
        let mut a = [0, 0x8000_0000];
        assert!(shl_limbs(&mut a, 1));
        assert_eq!(a, [0, 0]);
    }

    fn limbs(max: usize) -> impl Strategy<Value = Vec<Limb>> {
        prop::collection::vec(any::<Limb>(), 1..max)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn prop_accumulate_matches_schoolbook(a in limbs(12), b in limbs(12), n in 1usize..20) {
            let mut x = vec![0; n];
            let mut y = vec![0; n];
            let lost_x = mul_schoolbook(&a, &b, &mut x);
            let lost_y = mul_accumulate(&a, &b, &mut y);
            prop_assert_eq!(x, y);
            prop_assert_eq!(lost_x, lost_y);
        }

        #[test]
        fn prop_shift_round_trip(a in limbs(8), bits in 0usize..300) {
            let mut v = a.clone();
            let lost = shl_limbs(&mut v, bits);
            shr_limbs(&mut v, bits);
            if !lost {
                prop_assert_eq!(v, a);
            }
        }
    }
}

use std::sync::Arc;

use bignum::{BigNum, FixedInt};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};
use paged::{FileStore, MemStore, Scratch, SequentialNames};
use proptest::prelude::*;

/// Small window so that every operation moves it around.
type Mem = BigNum<MemStore, 2>;
type Disk = BigNum<FileStore, 3>;

// ============================================================================
// Helpers
// ============================================================================

fn to_big<S: paged::BackingStore, const W: usize>(x: &BigNum<S, W>) -> BigInt {
    let magnitude = BigInt::from(BigUint::from_slice(&x.to_limbs().unwrap()));
    if x.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

fn mem(limbs: &[u32], negative: bool) -> Mem {
    Mem::from_limbs_in(MemStore::new(), negative, limbs.iter().copied()).unwrap()
}

fn value() -> impl Strategy<Value = (Vec<u32>, bool)> {
    (prop::collection::vec(any::<u32>(), 0..10), any::<bool>())
}

fn scratch(dir: &tempfile::TempDir) -> Scratch {
    Scratch::in_dir(dir.path()).with_names(Arc::new(SequentialNames::new("limbs-")))
}

fn files_in(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

fn disk(scratch: &Scratch, v: i128) -> Disk {
    Disk::from_i128_in(FileStore::create(scratch).unwrap(), v).unwrap()
}

// ============================================================================
// File-backed scenarios
// ============================================================================

#[test]
fn test_hundred_by_seven_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let s = scratch(&dir);
    let a = disk(&s, 100);
    let b = disk(&s, 7);
    assert_eq!(a.div(&b).unwrap().to_decimal_string().unwrap(), "14");
    assert_eq!(a.rem(&b).unwrap().to_decimal_string().unwrap(), "2");
}

#[test]
fn test_factorial_matches_oracle() {
    let dir = tempfile::tempdir().unwrap();
    let s = scratch(&dir);
    let mut acc = disk(&s, 1);
    let mut expected = BigInt::one();
    for i in 1..=60i128 {
        acc.mul_assign(&disk(&s, i)).unwrap();
        expected *= i;
    }
    assert_eq!(acc.to_decimal_string().unwrap(), expected.to_string());
    // Far wider than the window of three limbs.
    assert!(acc.limb_count() > 6);
}

#[test]
fn test_power_of_two_by_shifting_and_adding() {
    let dir = tempfile::tempdir().unwrap();
    let s = scratch(&dir);
    let mut x = disk(&s, 1);
    x.shl_assign(1000).unwrap();
    let copy = x.try_clone().unwrap();
    x.add_assign(&copy).unwrap();
    assert_eq!(to_big(&x), BigInt::one() << 1001usize);
    x.shr_assign(1001).unwrap();
    assert_eq!(x.to_decimal_string().unwrap(), "1");
}

#[test]
fn test_backing_files_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let s = scratch(&dir);
    {
        let a = disk(&s, -123_456_789_012_345_678_901_234);
        let b = a.try_clone().unwrap();
        let c = a.mul(&b).unwrap();
        assert_eq!(files_in(&dir), 3);
        let moved = c;
        assert!(!moved.is_negative());
        assert_eq!(files_in(&dir), 3);
    }
    assert_eq!(files_in(&dir), 0);
}

#[test]
fn test_limbs_on_disk_are_little_endian() {
    let dir = tempfile::tempdir().unwrap();
    let s = scratch(&dir);
    // Appending the fourth limb pushes the first window of three to the file.
    let x = Disk::from_limbs_in(FileStore::create(&s).unwrap(), false, [1, 2, 0x0A0B_0C0D, 4, 5])
        .unwrap();
    let bytes = std::fs::read(x.limbs().store().path()).unwrap();
    assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 0, 0, 0x0D, 0x0C, 0x0B, 0x0A]);
    assert_eq!(x.to_limbs().unwrap(), vec![1, 2, 0x0A0B_0C0D, 4, 5]);
}

#[test]
fn test_fixed_and_paged_agree() {
    let dir = tempfile::tempdir().unwrap();
    let s = scratch(&dir);
    let f: FixedInt<4> = "-98765432109876543210987654321".parse().unwrap();
    let n = Disk::from_fixed_in(FileStore::create(&s).unwrap(), &f).unwrap();
    assert_eq!(n.to_decimal_string().unwrap(), f.to_string());
    assert_eq!(n.to_fixed::<4>().unwrap(), f);
    let squared = n.mul(&n).unwrap();
    let wide: FixedInt<8> = f.resize();
    assert_eq!(squared.to_fixed::<8>().unwrap(), wide * wide);
}

// ============================================================================
// Properties (in-memory store, tiny window)
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_decimal_round_trip(x in any::<i64>()) {
        let n = Mem::from_i128_in(MemStore::new(), x as i128).unwrap();
        prop_assert_eq!(n.to_decimal_string().unwrap(), x.to_string());
        let back = Mem::parse_in(MemStore::new(), &x.to_string()).unwrap();
        prop_assert_eq!(to_big(&back), BigInt::from(x));
    }

    #[test]
    fn prop_arithmetic_matches_oracle((a, an) in value(), (b, bn) in value()) {
        let (x, y) = (mem(&a, an), mem(&b, bn));
        let (bx, by) = (to_big(&x), to_big(&y));
        prop_assert_eq!(to_big(&x.add(&y).unwrap()), &bx + &by);
        prop_assert_eq!(to_big(&x.sub(&y).unwrap()), &bx - &by);
        prop_assert_eq!(to_big(&x.mul(&y).unwrap()), &bx * &by);
        prop_assert_eq!(x.compare(&y).unwrap(), bx.cmp(&by));
    }

    #[test]
    fn prop_results_are_canonical((a, an) in value(), (b, bn) in value()) {
        let (x, y) = (mem(&a, an), mem(&b, bn));
        for r in [x.add(&y).unwrap(), x.sub(&y).unwrap(), x.mul(&y).unwrap()] {
            let limbs = r.to_limbs().unwrap();
            prop_assert!(!limbs.is_empty());
            prop_assert!(limbs.len() == 1 || *limbs.last().unwrap() != 0);
            prop_assert!(!(r.is_zero().unwrap() && r.is_negative()));
        }
    }

    #[test]
    fn prop_add_mul_commute_and_associate(
        (a, an) in value(),
        (b, bn) in value(),
        (c, cn) in value(),
    ) {
        let (x, y, z) = (mem(&a, an), mem(&b, bn), mem(&c, cn));
        prop_assert_eq!(to_big(&x.add(&y).unwrap()), to_big(&y.add(&x).unwrap()));
        prop_assert_eq!(to_big(&x.mul(&y).unwrap()), to_big(&y.mul(&x).unwrap()));
        let left = x.add(&y).unwrap().add(&z).unwrap();
        let right = x.add(&y.add(&z).unwrap()).unwrap();
        prop_assert_eq!(to_big(&left), to_big(&right));
        let left = x.mul(&y).unwrap().mul(&z).unwrap();
        let right = x.mul(&y.mul(&z).unwrap()).unwrap();
        prop_assert_eq!(to_big(&left), to_big(&right));
    }

    #[test]
    fn prop_self_sub_is_canonical_zero((a, an) in value()) {
        let x = mem(&a, an);
        let z = x.sub(&x).unwrap();
        prop_assert!(z.is_zero().unwrap());
        prop_assert!(!z.is_negative());
        prop_assert_eq!(z.limb_count(), 1);
    }

    #[test]
    fn prop_div_identity((a, an) in value(), (b, bn) in value()) {
        let (x, y) = (mem(&a, an), mem(&b, bn));
        prop_assume!(!y.is_zero().unwrap());
        let (q, r) = x.div_rem(&y).unwrap();
        let (bx, by) = (to_big(&x), to_big(&y));
        prop_assert_eq!(to_big(&q), &bx / &by);
        prop_assert_eq!(to_big(&r), &bx % &by);
        prop_assert_eq!(to_big(&q) * &by + to_big(&r), bx);
        prop_assert!(to_big(&r).abs() < by.abs());
    }

    #[test]
    fn prop_div_by_zero((a, an) in value()) {
        let x = mem(&a, an);
        let zero = Mem::zero_in(MemStore::new()).unwrap();
        let (q, r) = x.div_rem(&zero).unwrap();
        prop_assert!(to_big(&q).is_zero());
        prop_assert_eq!(to_big(&r), to_big(&x));
        prop_assert!(x.checked_div_rem(&zero).unwrap().is_none());
    }

    #[test]
    fn prop_shift_round_trip((a, an) in value(), k in 0usize..400) {
        let x = mem(&a, an);
        let up = x.shl(k).unwrap();
        prop_assert_eq!(to_big(&up), to_big(&x) << k);
        prop_assert_eq!(to_big(&up.shr(k).unwrap()), to_big(&x));
        let down = x.shr(k).unwrap();
        let expected = to_big(&x).magnitude() >> k;
        prop_assert_eq!(to_big(&down).magnitude().clone(), expected);
    }

    #[test]
    fn prop_bitwise_is_limbwise((a, an) in value(), (b, bn) in value()) {
        let (x, y) = (mem(&a, an), mem(&b, bn));
        let (mx, my) = (to_big(&x).magnitude().clone(), to_big(&y).magnitude().clone());
        prop_assert_eq!(to_big(&x.bitand(&y).unwrap()).magnitude().clone(), &mx & &my);
        prop_assert_eq!(to_big(&x.bitor(&y).unwrap()).magnitude().clone(), &mx | &my);
        prop_assert_eq!(to_big(&x.bitxor(&y).unwrap()).magnitude().clone(), &mx ^ &my);
    }
}

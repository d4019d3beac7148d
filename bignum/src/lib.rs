//! Sign-magnitude integers over base-2^32 limbs.
//!
//! - [`FixedInt<N>`] holds exactly `N` limbs in memory. Results wider than
//!   `N` limbs are silently truncated (see the `overflowing_*` methods to
//!   detect it).
//! - [`BigNum`] grows without bound and keeps its limbs in a
//!   [`paged::PagedVec`], so only one window of limbs sits in memory.
//!
//! Both use the same policies: zero is never negative, the quotient
//! truncates toward zero, the remainder takes the dividend's sign, and
//! division by zero gives `(0, dividend)`.
//!
//! ```
//! use bignum::FixedInt;
//!
//! let a = FixedInt::<2>::from(0xFFFF_FFFFu32);
//! assert_eq!((a + FixedInt::from(1)).to_string(), "4294967296");
//! ```

pub mod arbitrary;
pub mod decimal;
pub mod error;
pub mod fixed;
pub mod limb;

pub use arbitrary::BigNum;
pub use decimal::{render_limbs, DecimalAccumulator};
pub use error::{BigNumError, ParseBigNumError, Result};
pub use fixed::FixedInt;
pub use limb::{Limb, ACCUMULATE_THRESHOLD, LIMB_BITS};

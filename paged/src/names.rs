//! Unique names for backing files.
//!
//! Name generation is an injected capability: every [`Scratch`](crate::Scratch)
//! carries its own [`NameSource`], so tests can swap in a deterministic one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces filesystem-safe names, unique among live backing stores.
pub trait NameSource: Send + Sync {
    fn generate(&self) -> String;
}

impl<F> NameSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random 128-bit names formatted like a version 4 UUID.
pub struct RandomNames {
    rng: Mutex<StdRng>,
}

impl RandomNames {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of names.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomNames {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSource for RandomNames {
    fn generate(&self) -> String {
        let bits: u128 = match self.rng.lock() {
            Ok(mut rng) => rng.gen(),
            // A poisoned lock still holds a usable generator.
            Err(poisoned) => poisoned.into_inner().gen(),
        };
        format_uuid_v4(bits)
    }
}

/// Stamp the version and variant bits and render as `8-4-4-4-12` hex.
fn format_uuid_v4(bits: u128) -> String {
    let bits = (bits & !(0xfu128 << 76)) | (0x4u128 << 76);
    let bits = (bits & !(0x3u128 << 62)) | (0x2u128 << 62);
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        (bits >> 96) as u32,
        (bits >> 80) as u16,
        (bits >> 64) as u16,
        (bits >> 48) as u16,
        bits & 0xffff_ffff_ffff,
    )
}

/// Deterministic `"<prefix><n>"` names counting up from zero.
pub struct SequentialNames {
    prefix: String,
    next: AtomicU64,
}

impl SequentialNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl NameSource for SequentialNames {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

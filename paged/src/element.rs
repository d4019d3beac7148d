//! Fixed-size element encoding.
//!
//! Elements are stored headerless and little-endian: element `i` lives at
//! byte offset `i * T::SIZE` in the backing store.

use byteorder::{ByteOrder, LittleEndian};

/// A fixed-size value that can live in a [`PagedVec`](crate::PagedVec).
pub trait Element: Copy + Default {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Encode into `buf` (exactly `SIZE` bytes).
    fn encode(&self, buf: &mut [u8]);

    /// Decode from `buf` (exactly `SIZE` bytes).
    fn decode(buf: &[u8]) -> Self;
}

impl Element for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn encode(&self, buf: &mut [u8]) {
        buf[0] = *self;
    }

    #[inline]
    fn decode(buf: &[u8]) -> Self {
        buf[0]
    }
}

impl Element for i8 {
    const SIZE: usize = 1;

    #[inline]
    fn encode(&self, buf: &mut [u8]) {
        buf[0] = *self as u8;
    }

    #[inline]
    fn decode(buf: &[u8]) -> Self {
        buf[0] as i8
    }
}

macro_rules! le_element {
    ($($ty:ty => $size:expr, $read:ident, $write:ident;)*) => {
        $(
            impl Element for $ty {
                const SIZE: usize = $size;

                #[inline]
                fn encode(&self, buf: &mut [u8]) {
                    LittleEndian::$write(buf, *self);
                }

                #[inline]
                fn decode(buf: &[u8]) -> Self {
                    LittleEndian::$read(buf)
                }
            }
        )*
    };
}

le_element! {
    u16 => 2, read_u16, write_u16;
    i16 => 2, read_i16, write_i16;
    u32 => 4, read_u32, write_u32;
    i32 => 4, read_i32, write_i32;
    u64 => 8, read_u64, write_u64;
    i64 => 8, read_i64, write_i64;
}

/// Encode a run of elements into a contiguous byte buffer.
pub(crate) fn encode_all<T: Element>(items: &[T], bytes: &mut Vec<u8>) {
    bytes.clear();
    bytes.resize(items.len() * T::SIZE, 0);
    for (item, chunk) in items.iter().zip(bytes.chunks_exact_mut(T::SIZE)) {
        item.encode(chunk);
    }
}

/// Decode as many whole elements as `bytes` holds into `out`; returns the count.
pub(crate) fn decode_all<T: Element>(bytes: &[u8], out: &mut [T]) -> usize {
    let mut n = 0;
    for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
        *slot = T::decode(chunk);
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_is_little_endian() {
        let mut buf = [0u8; 4];
        0x0403_0201u32.encode(&mut buf);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(u32::decode(&buf), 0x0403_0201);
    }

    #[test]
    fn test_signed_elements() {
        let mut buf = [0u8; 8];
        (-2i64).encode(&mut buf);
        assert_eq!(i64::decode(&buf), -2);

        let mut one = [0u8; 1];
        (-1i8).encode(&mut one);
        assert_eq!(one, [0xff]);
    }

    #[test]
    fn test_decode_all_stops_at_partial_element() {
        let bytes = [1u8, 0, 0, 0, 2, 0, 0, 0, 3, 0];
        let mut out = [0u32; 4];
        assert_eq!(decode_all(&bytes, &mut out), 2);
        assert_eq!(&out[..2], &[1, 2]);
    }
}

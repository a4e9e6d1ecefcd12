//! Value-only codecs.
//!
//! These encodings round-trip exactly but make no ordering promise, so they
//! can be stored as values (including multimap values, which are then sorted
//! by their encoded bytes) but are not [`OrderedKey`](crate::OrderedKey)s.

use crate::error::{CodecError, CodecResult};
use crate::{Decode, Encode};
use serde::de::DeserializeOwned;
use serde::Serialize;

macro_rules! float_value {
    ($($t:ty => $bits:ty),*) => {$(
        impl Encode for $t {
            fn encode(&self) -> CodecResult<Vec<u8>> {
                Ok(self.to_bits().to_be_bytes().to_vec())
            }
        }

        impl Decode for $t {
            fn decode(bytes: &[u8]) -> CodecResult<Self> {
                let array: [u8; std::mem::size_of::<$t>()] = bytes.try_into().map_err(|_| {
                    CodecError::decoding_failed(format!(
                        "expected {} bytes for {}, got {}",
                        std::mem::size_of::<$t>(),
                        stringify!($t),
                        bytes.len()
                    ))
                })?;
                Ok(<$t>::from_bits(<$bits>::from_be_bytes(array)))
            }
        }
    )*};
}

float_value!(f32 => u32, f64 => u64);

/// Wrapper that stores any serde type as CBOR.
///
/// Use it for structured values:
///
/// ```
/// use lmdbmap_codec::{Cbor, Decode, Encode};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let bytes = Cbor(Point { x: 1, y: 2 }).encode().unwrap();
/// let Cbor(point) = Cbor::<Point>::decode(&bytes).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cbor<T>(pub T);

impl<T> Cbor<T> {
    /// Unwraps the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Encode for Cbor<T> {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        ciborium::into_writer(&self.0, &mut out)
            .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
        Ok(out)
    }
}

impl<T: DeserializeOwned> Decode for Cbor<T> {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        ciborium::from_reader(bytes)
            .map(Cbor)
            .map_err(|e| CodecError::decoding_failed(e.to_string()))
    }
}

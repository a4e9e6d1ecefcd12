//! # lmdbmap Codec
//!
//! Encoding layer between typed keys/values and LMDB's opaque byte strings.
//!
//! LMDB orders keys by bytewise comparison. For range queries
//! (`lower_bound`, `upper_bound`, `equal_range`) to agree with the key type's
//! natural order, key encodings must be order-preserving:
//!
//! ```text
//! a < b  <=>  encode(a) < encode(b)   (bytewise)
//! ```
//!
//! Types that satisfy this implement [`OrderedKey`]. Value encodings only have
//! to round-trip.
//!
//! ## Usage
//!
//! ```
//! use lmdbmap_codec::{Decode, Encode};
//!
//! let bytes = (-5i64).encode().unwrap();
//! assert!(bytes < 3i64.encode().unwrap());
//! assert_eq!(i64::decode(&bytes).unwrap(), -5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod key;
mod value;

pub use error::{CodecError, CodecResult};
pub use key::KeyComponent;
pub use value::Cbor;

/// Trait for types that can be encoded to bytes.
pub trait Encode {
    /// Encode this value. Must be deterministic.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from bytes.
pub trait Decode: Sized {
    /// Decode a value previously produced by [`Encode::encode`].
    ///
    /// Bytes not produced by the matching encoder fail with a decoding error.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

/// Marker for key types whose encoding preserves `Ord`.
///
/// Encodings must also be non-empty: LMDB cannot store a zero-length key.
///
/// Implementing this for a type whose byte encoding does not sort the same
/// way as the type itself is a logic error: point lookups keep working, but
/// bound and range queries will silently return wrong positions. The library
/// cannot check this cheaply.
pub trait OrderedKey: Encode + Decode + Ord {}

//! Order-preserving key encodings.
//!
//! Every encoding in this module satisfies `a < b` ⇔ `encode(a) < encode(b)`
//! under bytewise comparison, which is the order LMDB sorts keys in.
//!
//! Fixed-width values are written big-endian (signed integers with the sign
//! bit flipped). Variable-width values (`String`, `Vec<u8>`) are written as a
//! tag byte followed by the raw bytes when they are the whole key, and in an
//! escaped, terminated form when they are a component of a tuple key:
//!
//! ```text
//! whole       -> 0x01 bytes...
//! 0x00        -> 0x00 0xFF
//! terminator  -> 0x00 0x01
//! ```
//!
//! LMDB rejects zero-length keys and drops zero-length duplicate values, so
//! no encoding here is empty; the tag keeps `""` and `[]` storable. The
//! terminator sorts below every escaped byte, so a shorter component always
//! sorts before any longer component it is a prefix of.

use crate::error::{CodecError, CodecResult};
use crate::{Decode, Encode, OrderedKey};

const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;
const WHOLE_TAG: u8 = 0x01;

/// A value that can be one self-delimiting part of a composite key.
///
/// Implementations must write an encoding that preserves `Ord` and that can be
/// read back without knowing where the next component starts.
pub trait KeyComponent: Sized {
    /// Appends the component encoding to `out`.
    fn write_component(&self, out: &mut Vec<u8>);

    /// Reads one component from the front of `input`, advancing it.
    fn read_component(input: &mut &[u8]) -> CodecResult<Self>;
}

fn take_array<const N: usize>(input: &mut &[u8], type_name: &'static str) -> CodecResult<[u8; N]> {
    if input.len() < N {
        return Err(CodecError::UnexpectedEof { type_name });
    }
    let (head, rest) = input.split_at(N);
    *input = rest;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(head);
    Ok(bytes)
}

fn write_whole(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.push(WHOLE_TAG);
    out.extend_from_slice(bytes);
    out
}

fn read_whole<'a>(bytes: &'a [u8], type_name: &'static str) -> CodecResult<&'a [u8]> {
    match bytes.split_first() {
        Some((&WHOLE_TAG, rest)) => Ok(rest),
        Some((&tag, _)) => Err(CodecError::decoding_failed(format!(
            "unexpected tag {tag:#04x} for {type_name}"
        ))),
        None => Err(CodecError::UnexpectedEof { type_name }),
    }
}

/// Decodes `bytes` as exactly one component, rejecting leftovers.
fn decode_whole<T: KeyComponent>(bytes: &[u8], type_name: &'static str) -> CodecResult<T> {
    let mut input = bytes;
    let value = T::read_component(&mut input)?;
    if !input.is_empty() {
        return Err(CodecError::TrailingBytes {
            type_name,
            count: input.len(),
        });
    }
    Ok(value)
}

macro_rules! unsigned_key {
    ($($t:ty),* $(,)?) => {$(
        impl KeyComponent for $t {
            fn write_component(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }

            fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
                let bytes = take_array::<{ std::mem::size_of::<$t>() }>(input, stringify!($t))?;
                Ok(<$t>::from_be_bytes(bytes))
            }
        }

        impl Encode for $t {
            fn encode(&self) -> CodecResult<Vec<u8>> {
                Ok(self.to_be_bytes().to_vec())
            }
        }

        impl Decode for $t {
            fn decode(bytes: &[u8]) -> CodecResult<Self> {
                decode_whole(bytes, stringify!($t))
            }
        }

        impl OrderedKey for $t {}
    )*};
}

macro_rules! signed_key {
    ($($t:ty => $u:ty),* $(,)?) => {$(
        impl KeyComponent for $t {
            fn write_component(&self, out: &mut Vec<u8>) {
                let flipped = (*self as $u) ^ (1 << (<$u>::BITS - 1));
                out.extend_from_slice(&flipped.to_be_bytes());
            }

            fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
                let bytes = take_array::<{ std::mem::size_of::<$t>() }>(input, stringify!($t))?;
                let flipped = <$u>::from_be_bytes(bytes) ^ (1 << (<$u>::BITS - 1));
                Ok(flipped as $t)
            }
        }

        impl Encode for $t {
            fn encode(&self) -> CodecResult<Vec<u8>> {
                let mut out = Vec::with_capacity(std::mem::size_of::<$t>());
                self.write_component(&mut out);
                Ok(out)
            }
        }

        impl Decode for $t {
            fn decode(bytes: &[u8]) -> CodecResult<Self> {
                decode_whole(bytes, stringify!($t))
            }
        }

        impl OrderedKey for $t {}
    )*};
}

unsigned_key!(u8, u16, u32, u64, u128);
signed_key!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128);

impl KeyComponent for bool {
    fn write_component(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
        match take_array::<1>(input, "bool")? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(CodecError::decoding_failed(format!(
                "invalid bool byte {other:#04x}"
            ))),
        }
    }
}

impl Encode for bool {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(vec![u8::from(*self)])
    }
}

impl Decode for bool {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        decode_whole(bytes, "bool")
    }
}

impl OrderedKey for bool {}

impl KeyComponent for char {
    fn write_component(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&u32::from(*self).to_be_bytes());
    }

    fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
        let scalar = u32::from_be_bytes(take_array::<4>(input, "char")?);
        char::from_u32(scalar).ok_or_else(|| {
            CodecError::decoding_failed(format!("{scalar:#x} is not a unicode scalar value"))
        })
    }
}

impl Encode for char {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(u32::from(*self).to_be_bytes().to_vec())
    }
}

impl Decode for char {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        decode_whole(bytes, "char")
    }
}

impl OrderedKey for char {}

fn write_escaped(bytes: &[u8], out: &mut Vec<u8>) {
    out.reserve(bytes.len() + 2);
    for &byte in bytes {
        out.push(byte);
        if byte == ESCAPE {
            out.push(ESCAPED_ZERO);
        }
    }
    out.push(ESCAPE);
    out.push(TERMINATOR);
}

fn read_escaped(input: &mut &[u8], type_name: &'static str) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    loop {
        let byte = *input
            .get(pos)
            .ok_or(CodecError::UnexpectedEof { type_name })?;
        if byte != ESCAPE {
            out.push(byte);
            pos += 1;
            continue;
        }
        let marker = *input
            .get(pos + 1)
            .ok_or(CodecError::UnexpectedEof { type_name })?;
        pos += 2;
        match marker {
            ESCAPED_ZERO => out.push(ESCAPE),
            TERMINATOR => break,
            byte => return Err(CodecError::InvalidEscape { byte }),
        }
    }
    *input = &input[pos..];
    Ok(out)
}

impl KeyComponent for Vec<u8> {
    fn write_component(&self, out: &mut Vec<u8>) {
        write_escaped(self, out);
    }

    fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
        read_escaped(input, "Vec<u8>")
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(write_whole(self))
    }
}

impl Decode for Vec<u8> {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Ok(read_whole(bytes, "Vec<u8>")?.to_vec())
    }
}

impl OrderedKey for Vec<u8> {}

impl KeyComponent for String {
    fn write_component(&self, out: &mut Vec<u8>) {
        write_escaped(self.as_bytes(), out);
    }

    fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
        String::from_utf8(read_escaped(input, "String")?).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl Encode for String {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(write_whole(self.as_bytes()))
    }
}

impl Decode for String {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let raw = read_whole(bytes, "String")?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl OrderedKey for String {}

macro_rules! tuple_key {
    ($name:literal; $($part:ident),+) => {
        impl<$($part: KeyComponent),+> KeyComponent for ($($part,)+) {
            #[allow(non_snake_case)]
            fn write_component(&self, out: &mut Vec<u8>) {
                let ($($part,)+) = self;
                $($part.write_component(out);)+
            }

            fn read_component(input: &mut &[u8]) -> CodecResult<Self> {
                Ok(($($part::read_component(input)?,)+))
            }
        }

        impl<$($part: KeyComponent),+> Encode for ($($part,)+) {
            fn encode(&self) -> CodecResult<Vec<u8>> {
                let mut out = Vec::new();
                self.write_component(&mut out);
                Ok(out)
            }
        }

        impl<$($part: KeyComponent),+> Decode for ($($part,)+) {
            fn decode(bytes: &[u8]) -> CodecResult<Self> {
                decode_whole(bytes, $name)
            }
        }

        impl<$($part: KeyComponent + Ord),+> OrderedKey for ($($part,)+) {}
    };
}

tuple_key!("(A, B)"; A, B);
tuple_key!("(A, B, C)"; A, B, C);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn enc<T: Encode>(value: &T) -> Vec<u8> {
        value.encode().unwrap()
    }

    #[test]
    fn signed_integers_sort_across_zero() {
        let values = [i64::MIN, -1000, -1, 0, 1, 1000, i64::MAX];
        for pair in values.windows(2) {
            assert!(enc(&pair[0]) < enc(&pair[1]), "{} vs {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn i32_roundtrip_extremes() {
        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(i32::decode(&enc(&value)).unwrap(), value);
        }
    }

    #[test]
    fn wrong_width_is_rejected() {
        assert_eq!(
            u32::decode(&[1, 2, 3]),
            Err(CodecError::UnexpectedEof { type_name: "u32" })
        );
        assert_eq!(
            u16::decode(&[1, 2, 3]),
            Err(CodecError::TrailingBytes {
                type_name: "u16",
                count: 1
            })
        );
    }

    #[test]
    fn invalid_bool_byte() {
        assert!(bool::decode(&[2]).is_err());
        assert!(bool::decode(&[1]).unwrap());
    }

    #[test]
    fn invalid_char_scalar() {
        // Surrogate code point
        assert!(char::decode(&0xD800u32.to_be_bytes()).is_err());
    }

    #[test]
    fn string_key_is_tagged_utf8() {
        assert_eq!(enc(&"abc".to_string()), b"\x01abc".to_vec());
    }

    #[test]
    fn empty_variable_width_values_are_not_empty() {
        assert_eq!(enc(&String::new()), vec![WHOLE_TAG]);
        assert_eq!(enc(&Vec::<u8>::new()), vec![WHOLE_TAG]);
        assert_eq!(String::decode(&[WHOLE_TAG]).unwrap(), "");
        assert!(Vec::<u8>::decode(&[WHOLE_TAG]).unwrap().is_empty());
        assert!(enc(&String::new()) < enc(&"\0".to_string()));
    }

    #[test]
    fn untagged_whole_value_is_rejected() {
        assert_eq!(
            String::decode(&[]),
            Err(CodecError::UnexpectedEof { type_name: "String" })
        );
        assert!(Vec::<u8>::decode(b"abc").unwrap_err().is_decode());
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        assert_eq!(
            String::decode(&[WHOLE_TAG, 0xff, 0xfe]),
            Err(CodecError::InvalidUtf8)
        );
    }

    #[test]
    fn escaped_component_handles_embedded_zero() {
        let key = (vec![0u8, 1, 0], 7u8);
        let bytes = enc(&key);
        assert_eq!(bytes, vec![0, 0xFF, 1, 0, 0xFF, 0, 1, 7]);
        assert_eq!(<(Vec<u8>, u8)>::decode(&bytes).unwrap(), key);
    }

    #[test]
    fn prefix_component_sorts_first() {
        let short = ("a".to_string(), 9u32);
        let long = ("ab".to_string(), 0u32);
        let zero = ("a\0".to_string(), 0u32);
        assert!(enc(&short) < enc(&zero));
        assert!(enc(&zero) < enc(&long));
    }

    #[test]
    fn unterminated_component_is_eof() {
        let err = <(String, u8)>::decode(b"abc").unwrap_err();
        assert_eq!(err, CodecError::UnexpectedEof { type_name: "String" });
    }

    #[test]
    fn unknown_escape_is_rejected() {
        let err = <(String, u8)>::decode(&[b'a', 0, 7, 1]).unwrap_err();
        assert_eq!(err, CodecError::InvalidEscape { byte: 7 });
    }

    proptest! {
        #[test]
        fn i64_order_preserved(a: i64, b: i64) {
            prop_assert_eq!(a.cmp(&b), enc(&a).cmp(&enc(&b)));
        }

        #[test]
        fn u32_order_preserved(a: u32, b: u32) {
            prop_assert_eq!(a.cmp(&b), enc(&a).cmp(&enc(&b)));
        }

        #[test]
        fn i16_roundtrip(v: i16) {
            prop_assert_eq!(i16::decode(&enc(&v)).unwrap(), v);
        }

        #[test]
        fn string_order_preserved(a: String, b: String) {
            prop_assert_eq!(a.cmp(&b), enc(&a).cmp(&enc(&b)));
        }

        #[test]
        fn bytes_order_preserved(a: Vec<u8>, b: Vec<u8>) {
            prop_assert_eq!(a.cmp(&b), enc(&a).cmp(&enc(&b)));
        }

        #[test]
        fn bytes_roundtrip(v: Vec<u8>) {
            prop_assert_eq!(Vec::<u8>::decode(&enc(&v)).unwrap(), v);
        }

        #[test]
        fn tuple_order_preserved(a: (String, i32), b: (String, i32)) {
            prop_assert_eq!(a.cmp(&b), enc(&a).cmp(&enc(&b)));
        }

        #[test]
        fn triple_roundtrip(v: (Vec<u8>, bool, i64)) {
            let decoded = <(Vec<u8>, bool, i64)>::decode(&enc(&v)).unwrap();
            prop_assert_eq!(decoded, v);
        }

        #[test]
        fn bytes_tuple_order_preserved(a: (Vec<u8>, u8), b: (Vec<u8>, u8)) {
            prop_assert_eq!(a.cmp(&b), enc(&a).cmp(&enc(&b)));
        }
    }
}

//! Serde helpers for arbitrary-precision snapshot fields.

use num_bigint::BigInt;
use serde::{de, Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Arbitrary-precision integers as decimal strings.
///
/// Deserialization also accepts bare JSON integers of any size, which is how
/// nodes emit big reserves. `serde_json` keeps their digits through
/// `arbitrary_precision`, so values past 64 bits are not rounded to a float.
pub mod bigint_string {
    use super::*;

    pub fn serialize<S>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigInt, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse::<BigInt>().map_err(de::Error::custom),
            Value::Number(n) => n.to_string().parse::<BigInt>().map_err(|_| {
                de::Error::custom(format!("expected big integer, got number {n}"))
            }),
            other => Err(de::Error::custom(format!(
                "expected big integer represented as string or integer, got {other}"
            ))),
        }
    }
}

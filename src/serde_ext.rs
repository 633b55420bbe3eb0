//! Lenient field decoders. Form-backed clients send numbers and numeric
//! strings interchangeably for fields like `year`, `studentId` and `age`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Accepts `"3"`, `3` or `null` and yields a `String` (empty for `null`).
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Str(s)) => s,
        Some(StringOrNumber::Int(n)) => n.to_string(),
        Some(StringOrNumber::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

/// Accepts `19`, `"19"`, `""` or `null`.
pub fn optional_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Int(n)) => i32::try_from(n).map(Some).map_err(D::Error::custom),
        Some(StringOrNumber::Float(f))
            if f.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&f) =>
        {
            Ok(Some(f as i32))
        }
        Some(StringOrNumber::Float(f)) => {
            Err(D::Error::custom(format!("not a 32-bit integer: {f}")))
        }
        Some(StringOrNumber::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(StringOrNumber::Str(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

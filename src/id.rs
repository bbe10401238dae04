use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::convert::Infallible;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Server-assigned bookmark identifier.
///
/// Backends hand out either numbers or strings. Equality, hashing and storage
/// keys all go through [`BookmarkId::key`], so `5` and `"5"` name the same record.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum BookmarkId {
    Num(u64),
    Signed(i64),
    Str(String),
}

impl BookmarkId {
    /// Normalized storage key.
    pub fn key(&self) -> String {
        match self {
            BookmarkId::Num(n) => n.to_string(),
            BookmarkId::Signed(n) => n.to_string(),
            BookmarkId::Str(s) => s.clone(),
        }
    }

    fn from_i64(n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => BookmarkId::Num(n),
            Err(_) => BookmarkId::Signed(n),
        }
    }

    /// Integral floats key like the integer they hold (`5.0` is `5`).
    fn from_f64(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 {
            if n >= 0.0 && n < u64::MAX as f64 {
                return BookmarkId::Num(n as u64);
            }
            if n >= i64::MIN as f64 && n < 0.0 {
                return BookmarkId::Signed(n as i64);
            }
        }
        BookmarkId::Str(n.to_string())
    }
}

impl Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkId::Num(n) => write!(f, "{n}"),
            BookmarkId::Signed(n) => write!(f, "{n}"),
            BookmarkId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl PartialEq for BookmarkId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for BookmarkId {}

impl Hash for BookmarkId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

struct BookmarkIdVisitor;

impl<'de> Visitor<'de> for BookmarkIdVisitor {
    type Value = BookmarkId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a string id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(BookmarkId::Num(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(BookmarkId::from_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(BookmarkId::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(BookmarkId::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(BookmarkId::Str(v))
    }
}

impl<'de> Deserialize<'de> for BookmarkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BookmarkIdVisitor)
    }
}

impl FromStr for BookmarkId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<u64> for BookmarkId {
    fn from(fr: u64) -> Self {
        BookmarkId::Num(fr)
    }
}

impl From<&str> for BookmarkId {
    fn from(fr: &str) -> Self {
        // only exact round-trips become numbers, so "007" stays a string
        if let Ok(n) = fr.parse::<u64>() {
            if n.to_string() == fr {
                return BookmarkId::Num(n);
            }
        }
        if let Ok(n) = fr.parse::<i64>() {
            if n.to_string() == fr {
                return BookmarkId::from_i64(n);
            }
        }
        BookmarkId::Str(fr.to_string())
    }
}

impl From<String> for BookmarkId {
    fn from(fr: String) -> Self {
        BookmarkId::from(fr.as_str())
    }
}

impl From<BookmarkId> for String {
    fn from(fr: BookmarkId) -> Self {
        fr.key()
    }
}

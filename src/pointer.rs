//! RFC 6901 JSON pointers.
//!
//! A [`Pointer`] is an ordered token sequence such as
//! `/paths/~1pets/get/responses/200`. Array indices are stored as their
//! decimal string, so `/servers/0` has the tokens `["servers", "0"]`.

use crate::error::PointerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A location inside a serialized document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    /// The empty pointer, addressing the document root.
    pub fn root() -> Self {
        Pointer { tokens: Vec::new() }
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pointer {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the string form. Accepts `""`, `"/a/b"` and the URI fragment
    /// forms `"#"` and `"#/a/b"` used by `$ref` values.
    pub fn parse(input: &str) -> Result<Pointer, PointerError> {
        let body = input.strip_prefix('#').unwrap_or(input);
        if body.is_empty() {
            return Ok(Pointer::root());
        }
        let Some(rest) = body.strip_prefix('/') else {
            return Err(PointerError {
                input: input.to_string(),
                message: "pointer must start with '/'".to_string(),
            });
        };
        let tokens = rest
            .split('/')
            .map(|raw| {
                unescape(raw).ok_or_else(|| PointerError {
                    input: input.to_string(),
                    message: format!("invalid escape sequence in token '{}'", raw),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pointer { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Returns a new pointer with `token` appended.
    pub fn child(&self, token: impl Into<String>) -> Pointer {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend(self.tokens.iter().cloned());
        tokens.push(token.into());
        Pointer { tokens }
    }

    pub fn index(&self, index: usize) -> Pointer {
        self.child(index.to_string())
    }

    pub fn parent(&self) -> Option<Pointer> {
        if self.tokens.is_empty() {
            return None;
        }
        Some(Pointer {
            tokens: self.tokens[..self.tokens.len() - 1].to_vec(),
        })
    }

    /// True if `prefix` is an ancestor of, or equal to, this pointer.
    /// Comparison is on whole tokens: `/foo` is not a prefix of `/foobar`.
    pub fn starts_with(&self, prefix: &Pointer) -> bool {
        self.tokens.starts_with(&prefix.tokens)
    }

    /// The tokens following `prefix`, or `None` when `prefix` is not an ancestor.
    pub fn strip_prefix(&self, prefix: &Pointer) -> Option<&[String]> {
        self.tokens.strip_prefix(prefix.tokens.as_slice())
    }

    /// This pointer followed by each of its ancestors, ending with the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Pointer> + '_ {
        (0..=self.tokens.len()).rev().map(|len| Pointer {
            tokens: self.tokens[..len].to_vec(),
        })
    }

    /// The `#/...` fragment form used in `$ref` values.
    pub fn to_fragment(&self) -> String {
        format!("#{}", self)
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape(token))?;
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pointer::parse(&raw).map_err(serde::de::Error::custom)
    }
}

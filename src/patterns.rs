//! Naming-convention predicates shared by rules.

use regex::Regex;
use std::sync::LazyLock;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static PATH_VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{[^{}]+\}$").unwrap());

static CAMEL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(?:[A-Z][a-z]+)*$").unwrap());

static PASCAL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?:[A-Z][a-z]+)*$").unwrap());

static HYPHENATED_CAMEL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(?:-[A-Z][a-z]+)+$").unwrap());

static HYPHENATED_PASCAL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,2}[a-z0-9]*(?:-[A-Z]{1,2}[a-z0-9]*)*$").unwrap());

static SNAKE_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)*$").unwrap());

static KEBAB_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

static HYPHENATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.]+(?:-[A-Za-z0-9.]+)*$").unwrap());

pub fn has_trailing_slash(input: &str) -> bool {
    input.ends_with('/')
}

/// `{name}` with a non-empty name.
pub fn is_path_variable(input: &str) -> bool {
    PATH_VARIABLE_RE.is_match(input)
}

pub fn is_camel_case(input: &str) -> bool {
    CAMEL_CASE_RE.is_match(input)
}

pub fn is_pascal_case(input: &str) -> bool {
    PASCAL_CASE_RE.is_match(input)
}

/// `lower-Upper-Upper`, as in `test-Case`.
pub fn is_hyphenated_camel_case(input: &str) -> bool {
    HYPHENATED_CAMEL_CASE_RE.is_match(input)
}

/// Header-style names: `X-Flow-Id`, `ETag`.
pub fn is_hyphenated_pascal_case(input: &str) -> bool {
    HYPHENATED_PASCAL_CASE_RE.is_match(input)
}

pub fn is_snake_case(input: &str) -> bool {
    SNAKE_CASE_RE.is_match(input)
}

pub fn is_kebab_case(input: &str) -> bool {
    KEBAB_CASE_RE.is_match(input)
}

/// Words joined by single hyphens, any case.
pub fn is_hyphenated(input: &str) -> bool {
    HYPHENATED_RE.is_match(input)
}

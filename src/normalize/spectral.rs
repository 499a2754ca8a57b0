//! Spectral type canonicalization.
//!
//! Catalog spectral strings are messy (`K3IIIb`, `M1-2Ia-Iab`, `A0m...`, `DA2`).
//! We keep the leading MK classification only: class letter, subclass digit
//! (optionally decimal), optional luminosity class. Anything that does not start
//! with such a prefix is treated as absent.

use std::sync::LazyLock;

use regex::Regex;

// Alternation is leftmost-first, so longer luminosity classes come first.
static PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([OBAFGKMLTY])(\d(?:\.\d+)?)\s*(Ia\+|Iab|Ia|Ib|III|II|IV|VII|VI|V|I|0)?")
        .expect("spectral prefix regex is valid")
});

static CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[OBAFGKMLTY]\d(?:\.\d+)?(?:Ia\+|Iab|Ia|Ib|III|II|IV|VII|VI|V|I|0)?$")
        .expect("spectral canonical regex is valid")
});

/// Extract the canonical MK prefix from a raw spectral string.
pub fn canonical_spectral_type(raw: &str) -> Option<String> {
    let caps = PREFIX.captures(raw.trim())?;
    let mut out = String::with_capacity(8);
    out.push_str(&caps[1]);
    out.push_str(&caps[2]);
    if let Some(lum) = caps.get(3) {
        out.push_str(lum.as_str());
    }
    Some(out)
}

/// Whether `s` is already in canonical form.
pub fn is_canonical_spectral_type(s: &str) -> bool {
    CANONICAL.is_match(s)
}

//! Cache key canonicalization
//!
//! A selection is reduced to a BLAKE3 content address. Options are sorted by
//! (id, quantity) before hashing so submission order never changes the key.
//! Fields are separated by the ASCII unit separator, which does not occur in
//! configurator identifiers. Each scheme hashes under its own derive-key
//! context, so a pricing key can never collide with a rules key.

use crate::types::selection::Selection;

const FIELD_SEPARATOR: &[u8] = &[0x1f];

const PRICING_CONTEXT: &str = "kitchen-configurator 2024-06 pricing estimate cache key";
const RULES_CONTEXT: &str = "kitchen-configurator 2024-06 rules validation cache key";

/// Which engine the key addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// module, layout, finish, currency, options
    Pricing,
    /// module, layout, finish, length, height, options
    Rules,
}

impl KeyScheme {
    fn context(&self) -> &'static str {
        match self {
            KeyScheme::Pricing => PRICING_CONTEXT,
            KeyScheme::Rules => RULES_CONTEXT,
        }
    }
}

/// Hex-encoded content address of `selection` under `scheme`
pub fn cache_key(scheme: KeyScheme, selection: &Selection) -> String {
    let mut hasher = blake3::Hasher::new_derive_key(scheme.context());

    for field in [&selection.module, &selection.layout, &selection.finish] {
        hasher.update(field.as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }

    match scheme {
        KeyScheme::Pricing => {
            hasher.update(selection.currency.as_bytes());
            hasher.update(FIELD_SEPARATOR);
        }
        KeyScheme::Rules => {
            hasher.update(selection.dimensions.length_mm.to_string().as_bytes());
            hasher.update(FIELD_SEPARATOR);
            hasher.update(selection.dimensions.height_mm.to_string().as_bytes());
            hasher.update(FIELD_SEPARATOR);
        }
    }

    for opt in selection.sorted_options() {
        hasher.update(opt.id.as_bytes());
        hasher.update(b"=");
        hasher.update(opt.quantity.to_string().as_bytes());
        hasher.update(b";");
    }

    hasher.finalize().to_hex().to_string()
}

/// Key for memoized estimates
pub fn pricing_key(selection: &Selection) -> String {
    cache_key(KeyScheme::Pricing, selection)
}

/// Key for memoized validation reports
pub fn rules_key(selection: &Selection) -> String {
    cache_key(KeyScheme::Rules, selection)
}

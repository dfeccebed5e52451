//! Built-in module library
//!
//! Each submodule exposes factory functions returning module descriptors,
//! plus a `descriptors()` list in registration order.
//!
//! Copyright (c) 2025 Cauldron Team
//! Licensed under the Apache-2.0 license

pub mod ciphers;
pub mod encoding;
pub mod extractors;
pub mod hashing;
pub mod json;
pub mod misc;
pub mod text;

use crate::error::Result;
use crate::module::ModuleDescriptor;
use crate::registry::ModuleRegistry;

/// Every built-in descriptor, in registration order
pub fn builtin_descriptors() -> Vec<ModuleDescriptor> {
    let mut all = Vec::new();
    all.extend(encoding::descriptors());
    all.extend(text::descriptors());
    all.extend(json::descriptors());
    all.extend(hashing::descriptors());
    all.extend(ciphers::descriptors());
    all.extend(extractors::descriptors());
    all.extend(misc::descriptors());
    all
}

/// Registry containing every built-in module
pub fn builtin_registry() -> Result<ModuleRegistry> {
    ModuleRegistry::from_descriptors(builtin_descriptors())
}

/// Render bytes as hex digits
pub(crate) fn to_hex(bytes: &[u8], uppercase: bool) -> String {
    if uppercase {
        hex::encode_upper(bytes)
    } else {
        hex::encode(bytes)
    }
}

/// Read a whole-number option, rejecting fractions and out-of-range values
pub(crate) fn integer_option(value: f64, name: &str, min: i64, max: i64) -> anyhow::Result<i64> {
    if value.fract() != 0.0 || value.is_nan() || value < min as f64 || value > max as f64 {
        anyhow::bail!("option '{}' must be a whole number in {}..={}, got {}", name, min, max, value);
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_builds() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.len(), builtin_descriptors().len());
        for id in ["base64_decode", "hex_encode", "json_pretty", "sha256", "entropy"] {
            assert!(registry.contains(id), "missing {id}");
        }
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(to_hex(&[0x0a, 0xff], false), "0aff");
        assert_eq!(to_hex(&[0x0a, 0xff], true), "0AFF");
    }

    #[test]
    fn test_integer_option_bounds() {
        assert_eq!(integer_option(3.0, "n", 0, 5).unwrap(), 3);
        assert!(integer_option(3.5, "n", 0, 5).is_err());
        assert!(integer_option(6.0, "n", 0, 5).is_err());
        assert!(integer_option(f64::NAN, "n", 0, 5).is_err());
    }
}

//! Classical byte-level ciphers
//!
//! Caesar and ROT13 shift ASCII letters only; every other byte passes
//! through unchanged. XOR applies a single-byte key to every byte.

use super::integer_option;
use crate::module::{ModuleDescriptor, OptionSpec};
use crate::options::ResolvedOptions;
use crate::types::{SemanticType, TypedValue};

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![
        caesar_encrypt(),
        caesar_decrypt(),
        rot13_encrypt(),
        rot13_decrypt(),
        xor_encrypt(),
        xor_decrypt(),
    ]
}

/// Shift ASCII letters by `shift` positions, wrapping within the alphabet
pub fn caesar_shift(bytes: &[u8], shift: i64) -> Vec<u8> {
    let shift = shift.rem_euclid(26) as u8;
    bytes
        .iter()
        .map(|&c| match c {
            b'A'..=b'Z' => (c - b'A' + shift) % 26 + b'A',
            b'a'..=b'z' => (c - b'a' + shift) % 26 + b'a',
            _ => c,
        })
        .collect()
}

fn byte_cipher(id: &str, name: &str, category: &str, description: &str) -> crate::module::ModuleDescriptorBuilder {
    ModuleDescriptor::builder(id, name, category)
        .description(description)
        .input(SemanticType::Bytes)
        .output(SemanticType::Bytes)
}

fn shift_option(options: &ResolvedOptions) -> anyhow::Result<i64> {
    integer_option(options.number("shift").unwrap_or(0.0), "shift", -1_000_000, 1_000_000)
}

fn key_option(options: &ResolvedOptions) -> anyhow::Result<u8> {
    Ok(integer_option(options.number("key").unwrap_or(0.0), "key", 0, 255)? as u8)
}

pub fn caesar_encrypt() -> ModuleDescriptor {
    byte_cipher("caesar_encrypt", "Caesar Cipher", "Encryption", "Shifts ASCII letters by N positions.")
        .option(OptionSpec::number("shift").label("Shift").required())
        .run(|input, options| Ok(TypedValue::Bytes(caesar_shift(input.try_bytes()?, shift_option(options)?))))
        .build()
}

pub fn caesar_decrypt() -> ModuleDescriptor {
    byte_cipher("caesar_decrypt", "Caesar Decrypt", "Decryption", "Reverses a Caesar shift on ASCII letters.")
        .option(OptionSpec::number("shift").label("Shift").required())
        .run(|input, options| Ok(TypedValue::Bytes(caesar_shift(input.try_bytes()?, -shift_option(options)?))))
        .build()
}

pub fn rot13_encrypt() -> ModuleDescriptor {
    byte_cipher("rot13_encrypt", "ROT13 Encrypt", "Encryption", "Rotates ASCII letters by 13 positions.")
        .run(|input, _| Ok(TypedValue::Bytes(caesar_shift(input.try_bytes()?, 13))))
        .build()
}

pub fn rot13_decrypt() -> ModuleDescriptor {
    byte_cipher("rot13_decrypt", "ROT13 Decrypt", "Decryption", "Rotates ASCII letters by 13 positions.")
        .run(|input, _| Ok(TypedValue::Bytes(caesar_shift(input.try_bytes()?, 13))))
        .build()
}

pub fn xor_encrypt() -> ModuleDescriptor {
    byte_cipher("xor_encrypt", "XOR Cipher", "Encryption", "XORs every byte with a single-byte key.")
        .option(OptionSpec::number("key").label("Key (0-255)").required())
        .run(|input, options| {
            let key = key_option(options)?;
            Ok(TypedValue::Bytes(input.try_bytes()?.iter().map(|b| b ^ key).collect()))
        })
        .build()
}

pub fn xor_decrypt() -> ModuleDescriptor {
    byte_cipher("xor_decrypt", "XOR Decrypt", "Decryption", "XORs every byte with a single-byte key.")
        .option(OptionSpec::number("key").label("Key (0-255)").required())
        .run(|input, options| {
            let key = key_option(options)?;
            Ok(TypedValue::Bytes(input.try_bytes()?.iter().map(|b| b ^ key).collect()))
        })
        .build()
}

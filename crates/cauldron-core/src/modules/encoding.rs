//! Encoding and decoding modules: Base64, hex, URL percent-encoding, JWT

use super::to_hex;
use crate::module::{ModuleDescriptor, OptionSpec};
use crate::types::{SemanticType, TypedValue};
use anyhow::{anyhow, bail, Context};
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde_json::{Map, Value};

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![
        base64_encode(),
        base64_decode(),
        hex_encode(),
        hex_decode(),
        url_encode(),
        url_decode(),
        jwt_decode(),
    ]
}

pub fn base64_encode() -> ModuleDescriptor {
    ModuleDescriptor::builder("base64_encode", "Base64 Encode", "Encoding")
        .description("Encodes input to Base64.")
        .input(SemanticType::Bytes)
        .output(SemanticType::Text)
        .option(OptionSpec::boolean("urlsafe").label("URL-safe alphabet").default_value(false))
        .run(|input, options| {
            let bytes = input.try_bytes()?;
            let encoded = if options.flag("urlsafe") {
                URL_SAFE.encode(bytes)
            } else {
                STANDARD.encode(bytes)
            };
            Ok(TypedValue::Text(encoded))
        })
        .build()
}

pub fn base64_decode() -> ModuleDescriptor {
    ModuleDescriptor::builder("base64_decode", "Base64 Decode", "Decoding")
        .description("Decodes Base64 to bytes.")
        .input(SemanticType::Text)
        .output(SemanticType::Bytes)
        .option(OptionSpec::boolean("urlsafe").label("URL-safe alphabet").default_value(false))
        .option(OptionSpec::boolean("fix_padding").label("Restore missing padding").default_value(true))
        .run(|input, options| {
            let mut text: String = input.try_text()?.chars().filter(|c| !c.is_whitespace()).collect();
            if options.flag("fix_padding") {
                match text.len() % 4 {
                    2 => text.push_str("=="),
                    3 => text.push('='),
                    _ => {}
                }
            }

            let decoded = if options.flag("urlsafe") {
                URL_SAFE.decode(&text)
            } else {
                STANDARD.decode(&text)
            };
            Ok(TypedValue::Bytes(decoded.context("invalid Base64 input")?))
        })
        .build()
}

pub fn hex_encode() -> ModuleDescriptor {
    ModuleDescriptor::builder("hex_encode", "Hex Encode", "Encoding")
        .description("Encodes bytes as hexadecimal digits.")
        .input(SemanticType::Bytes)
        .output(SemanticType::Text)
        .option(OptionSpec::boolean("uppercase").label("Uppercase digits").default_value(false))
        .run(|input, options| Ok(TypedValue::Text(to_hex(input.try_bytes()?, options.flag("uppercase")))))
        .build()
}

pub fn hex_decode() -> ModuleDescriptor {
    ModuleDescriptor::builder("hex_decode", "Hex Decode", "Decoding")
        .description("Decodes hexadecimal digits to bytes; separators are ignored.")
        .input(SemanticType::Text)
        .output(SemanticType::Bytes)
        .run(|input, _| Ok(TypedValue::Bytes(decode_hex(input.try_text()?)?)))
        .build()
}

fn decode_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text.chars().filter(char::is_ascii_hexdigit).collect();
    hex::decode(&digits).map_err(|e| match e {
        hex::FromHexError::OddLength => anyhow!("odd number of hex digits ({})", digits.len()),
        other => anyhow!("invalid hex input: {}", other),
    })
}

pub fn url_encode() -> ModuleDescriptor {
    ModuleDescriptor::builder("url_encode", "URL Encode", "Encoding")
        .description("Percent-encodes text for use in a URL component.")
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .option(OptionSpec::choice("spaces", ["%20", "+"]).label("Encode spaces as").default_value("%20"))
        .run(|input, options| {
            let plus = options.text("spaces") == Some("+");
            Ok(TypedValue::Text(percent_encode(input.try_text()?, plus)))
        })
        .build()
}

pub fn url_decode() -> ModuleDescriptor {
    ModuleDescriptor::builder("url_decode", "URL Decode", "Decoding")
        .description("Decodes percent-encoded text.")
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .option(OptionSpec::boolean("plus_as_space").label("Treat '+' as space").default_value(false))
        .run(|input, options| {
            let decoded = percent_decode(input.try_text()?, options.flag("plus_as_space"))?;
            Ok(TypedValue::Text(decoded))
        })
        .build()
}

/// Characters left as-is, matching a URI component encoder
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

fn percent_encode(text: &str, space_as_plus: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        match b {
            b' ' if space_as_plus => out.push('+'),
            b if is_unreserved(b) => out.push(b as char),
            b => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn percent_decode(text: &str, plus_as_space: bool) -> anyhow::Result<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| anyhow!("malformed escape at offset {}", i))?;
                out.push(hex);
                i += 3;
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).context("decoded bytes are not valid UTF-8")
}

pub fn jwt_decode() -> ModuleDescriptor {
    ModuleDescriptor::builder("jwt_decode", "JWT Decode", "Decoding")
        .description("Decodes the payload of a JSON Web Token without verifying it.")
        .input(SemanticType::Text)
        .output(SemanticType::Object)
        .run(|input, _| {
            let token = input.try_text()?.trim();
            if token.is_empty() {
                return Ok(TypedValue::Object(Map::new()));
            }

            let parts: Vec<&str> = token.split('.').collect();
            if parts.len() != 3 {
                bail!("JWT must have 3 segments, found {}", parts.len());
            }

            let payload = URL_SAFE_NO_PAD
                .decode(parts[1].trim_end_matches('='))
                .context("JWT payload is not valid Base64url")?;
            match serde_json::from_slice::<Value>(&payload).context("JWT payload is not valid JSON")? {
                Value::Object(claims) => Ok(TypedValue::Object(claims)),
                _ => bail!("JWT payload is not a JSON object"),
            }
        })
        .build()
}

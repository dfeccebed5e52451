//! Generators, forensics and networking helpers
//!
//! `uuid` and `random_bytes` are randomized; every other module here is
//! deterministic.

use super::integer_option;
use crate::module::{ModuleDescriptor, OptionSpec};
use crate::types::{SemanticType, TypedValue};
use anyhow::{anyhow, Context};
use chrono::{DateTime, SecondsFormat};
use rand::RngCore;
use std::net::Ipv4Addr;
use uuid::Uuid;

/// Upper bound for generated byte sequences
pub const MAX_RANDOM_BYTES: i64 = 1 << 20;
/// Upper bound for generated identifiers per call
pub const MAX_UUIDS: i64 = 10_000;

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![uuid(), timestamp_to_date(), random_bytes(), entropy(), ipv4_to_int()]
}

pub fn uuid() -> ModuleDescriptor {
    ModuleDescriptor::builder("uuid", "UUID Generator", "Misc")
        .description("Generates random (v4) UUIDs, one per line; the input is ignored.")
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .option(OptionSpec::number("count").label("Count").default_value(1.0))
        .run(|_, options| {
            let count = integer_option(options.number("count").unwrap_or(1.0), "count", 1, MAX_UUIDS)?;
            let ids: Vec<String> = (0..count).map(|_| Uuid::new_v4().to_string()).collect();
            Ok(TypedValue::Text(ids.join("\n")))
        })
        .build()
}

pub fn timestamp_to_date() -> ModuleDescriptor {
    ModuleDescriptor::builder("timestamp_to_date", "Timestamp to Date", "Misc")
        .description("Renders a Unix timestamp in seconds as an ISO-8601 UTC date.")
        .input(SemanticType::Number)
        .output(SemanticType::Text)
        .run(|input, _| {
            let seconds = input.try_number()?;
            let millis = (seconds * 1000.0).round();
            if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
                return Err(anyhow!("timestamp {} is out of range", seconds));
            }
            let date = DateTime::from_timestamp_millis(millis as i64)
                .ok_or_else(|| anyhow!("timestamp {} is out of range", seconds))?;
            Ok(TypedValue::Text(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
        })
        .build()
}

pub fn random_bytes() -> ModuleDescriptor {
    ModuleDescriptor::builder("random_bytes", "Random Bytes", "Misc")
        .description("Generates the given number of random bytes.")
        .input(SemanticType::Number)
        .output(SemanticType::Bytes)
        .run(|input, _| {
            let length = integer_option(input.try_number()?, "length", 0, MAX_RANDOM_BYTES)?;
            let mut bytes = vec![0u8; length as usize];
            rand::thread_rng().fill_bytes(&mut bytes);
            Ok(TypedValue::Bytes(bytes))
        })
        .build()
}

/// Shannon entropy in bits per byte
pub fn shannon_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let total = bytes.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

pub fn entropy() -> ModuleDescriptor {
    ModuleDescriptor::builder("entropy", "Entropy Analysis", "Forensics")
        .description("Shannon entropy of the input in bits per byte (0 to 8).")
        .input(SemanticType::Bytes)
        .output(SemanticType::Number)
        .run(|input, _| Ok(TypedValue::Number(shannon_entropy(input.try_bytes()?))))
        .build()
}

pub fn ipv4_to_int() -> ModuleDescriptor {
    ModuleDescriptor::builder("ipv4_to_int", "IPv4 to Integer", "Networking")
        .description("Converts a dotted IPv4 address to its 32-bit integer value.")
        .input(SemanticType::Text)
        .output(SemanticType::Number)
        .run(|input, _| {
            let text = input.try_text()?.trim();
            let addr: Ipv4Addr = text
                .parse()
                .with_context(|| format!("'{}' is not an IPv4 address", text))?;
            Ok(TypedValue::Number(u32::from(addr) as f64))
        })
        .build()
}

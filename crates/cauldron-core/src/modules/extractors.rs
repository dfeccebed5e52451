//! Pattern extractors
//!
//! Every extractor scans text for one kind of artifact and returns the
//! matches newline separated. Within one pattern, matches keep their order
//! of appearance; extractors with several patterns list each pattern's
//! matches in turn.

use super::integer_option;
use crate::module::{ModuleDescriptor, OptionSpec};
use crate::types::{SemanticType, TypedValue};
use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").unwrap();
    static ref URL: Regex = Regex::new(r#"(?i)\bhttps?://[^\s'"<>]+"#).unwrap();
    static ref IPV4: Regex = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap();
    static ref MAC: Regex = Regex::new(r"(?i)\b(?:[0-9A-F]{2}:){5}[0-9A-F]{2}\b").unwrap();
    static ref MD5: Regex = Regex::new(r"(?i)\b[a-f0-9]{32}\b").unwrap();
    static ref SHA1: Regex = Regex::new(r"(?i)\b[a-f0-9]{40}\b").unwrap();
    static ref SHA256: Regex = Regex::new(r"(?i)\b[a-f0-9]{64}\b").unwrap();
    static ref JWT: Regex = Regex::new(r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\b").unwrap();
    static ref BASE64: Regex =
        Regex::new(r"\b(?:[A-Za-z0-9+/]{4}){4,}(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?\b").unwrap();
}

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![
        extract_emails(),
        extract_urls(),
        extract_ipv4(),
        extract_mac(),
        extract_hashes(),
        extract_jwt(),
        extract_base64(),
        extract_strings(),
    ]
}

/// Every match of each pattern, pattern by pattern
fn collect_matches<'t>(text: &'t str, patterns: &[&Regex]) -> Vec<&'t str> {
    patterns
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str()))
        .collect()
}

fn extractor(id: &str, name: &str, description: &str, patterns: Vec<&'static Regex>) -> ModuleDescriptor {
    ModuleDescriptor::builder(id, name, "Extractors")
        .description(description)
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .run(move |input, _| Ok(TypedValue::Text(collect_matches(input.try_text()?, &patterns).join("\n"))))
        .build()
}

pub fn extract_emails() -> ModuleDescriptor {
    extractor("extract_emails", "Extract Emails", "Extract email addresses from text", vec![&*EMAIL])
}

pub fn extract_urls() -> ModuleDescriptor {
    extractor("extract_urls", "Extract URLs", "Extract HTTP/HTTPS URLs", vec![&*URL])
}

pub fn extract_ipv4() -> ModuleDescriptor {
    extractor("extract_ipv4", "Extract IPv4", "Extract IPv4 addresses", vec![&*IPV4])
}

pub fn extract_mac() -> ModuleDescriptor {
    extractor("extract_mac", "Extract MAC Address", "Extract MAC addresses", vec![&*MAC])
}

pub fn extract_hashes() -> ModuleDescriptor {
    extractor("extract_hashes", "Extract Hashes", "Extract MD5, SHA1 and SHA256 hashes", vec![&*MD5, &*SHA1, &*SHA256])
}

pub fn extract_jwt() -> ModuleDescriptor {
    extractor("extract_jwt", "Extract JWT", "Extract JSON Web Tokens", vec![&*JWT])
}

pub fn extract_base64() -> ModuleDescriptor {
    extractor("extract_base64", "Extract Base64", "Extract Base64-encoded blobs", vec![&*BASE64])
}

pub fn extract_strings() -> ModuleDescriptor {
    ModuleDescriptor::builder("extract_strings", "Extract ASCII Strings", "Extractors")
        .description("Extract printable ASCII strings from binary data")
        .input(SemanticType::Bytes)
        .output(SemanticType::Text)
        .option(OptionSpec::number("min_length").label("Minimum Length").default_value(4.0))
        .run(|input, options| {
            let min = integer_option(options.number("min_length").unwrap_or(4.0), "min_length", 1, 1024)?;
            let printable = Regex::new(&format!("[ -~]{{{},}}", min)).context("building string pattern")?;
            let text = String::from_utf8_lossy(input.try_bytes()?);
            Ok(TypedValue::Text(collect_matches(&text, &[&printable]).join("\n")))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResolvedOptions;

    fn extract(descriptor: ModuleDescriptor, input: &str) -> String {
        let out = descriptor
            .operation
            .unwrap()
            .run(&TypedValue::from(input), &ResolvedOptions::default())
            .unwrap();
        out.as_text().unwrap().to_string()
    }

    #[test]
    fn test_extract_emails_case_insensitive() {
        let text = "contact Alice@Example.com or bob@test.org, not @nobody";
        assert_eq!(extract(extract_emails(), text), "Alice@Example.com\nbob@test.org");
    }

    #[test]
    fn test_extract_urls_stop_at_quotes() {
        let text = r#"see <a href="https://example.com/a?b=1">x</a> and http://x.io"#;
        assert_eq!(extract(extract_urls(), text), "https://example.com/a?b=1\nhttp://x.io");
    }

    #[test]
    fn test_extract_network_addresses() {
        assert_eq!(extract(extract_ipv4(), "from 10.0.0.1 to 192.168.1.254"), "10.0.0.1\n192.168.1.254");
        assert_eq!(extract(extract_mac(), "hw aa:BB:cc:00:11:22 end"), "aa:BB:cc:00:11:22");
    }

    #[test]
    fn test_extract_hashes_groups_by_kind() {
        let sha1 = "a".repeat(40);
        let md5 = "b".repeat(32);
        let text = format!("{} {}", sha1, md5);
        assert_eq!(extract(extract_hashes(), &text), format!("{}\n{}", md5, sha1));
    }

    #[test]
    fn test_no_matches_yields_empty_text() {
        assert_eq!(extract(extract_jwt(), "nothing here"), "");
    }

    #[test]
    fn test_extract_strings_min_length() {
        let options = ResolvedOptions::from_pairs([("min_length", 3.0)]);
        let out = extract_strings()
            .operation
            .unwrap()
            .run(&TypedValue::Bytes(b"\x00\x01abc\x02de\x03fghij".to_vec()), &options)
            .unwrap();
        assert_eq!(out, TypedValue::from("abc\nfghij"));
    }
}

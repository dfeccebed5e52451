//! Cryptographic digest modules

use super::to_hex;
use crate::module::{ModuleDescriptor, OptionSpec};
use crate::types::{SemanticType, TypedValue};
use sha2::{Digest, Sha256, Sha384, Sha512};

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![sha256(), sha384(), sha512()]
}

fn digest_module<D: Digest + 'static>(id: &str, name: &str) -> ModuleDescriptor {
    ModuleDescriptor::builder(id, name, "Hashing")
        .description(format!("Generates a {} hash of the input data.", name))
        .input(SemanticType::Bytes)
        .output(SemanticType::Text)
        .option(OptionSpec::boolean("uppercase").label("Uppercase Output").default_value(false))
        .run(|input, options| {
            let digest = D::digest(input.try_bytes()?);
            Ok(TypedValue::Text(to_hex(&digest, options.flag("uppercase"))))
        })
        .build()
}

pub fn sha256() -> ModuleDescriptor {
    digest_module::<Sha256>("sha256", "SHA-256")
}

pub fn sha384() -> ModuleDescriptor {
    digest_module::<Sha384>("sha384", "SHA-384")
}

pub fn sha512() -> ModuleDescriptor {
    digest_module::<Sha512>("sha512", "SHA-512")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResolvedOptions;

    fn run(descriptor: ModuleDescriptor, input: &[u8], options: ResolvedOptions) -> String {
        let out = descriptor
            .operation
            .unwrap()
            .run(&TypedValue::Bytes(input.to_vec()), &options)
            .unwrap();
        out.as_text().unwrap().to_string()
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            run(sha256(), b"abc", ResolvedOptions::default()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_uppercase_output() {
        let options = ResolvedOptions::from_pairs([("uppercase", true)]);
        let hash = run(sha256(), b"abc", options);
        assert!(hash.starts_with("BA7816BF"));
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(run(sha384(), b"", ResolvedOptions::default()).len(), 96);
        assert_eq!(run(sha512(), b"", ResolvedOptions::default()).len(), 128);
    }
}

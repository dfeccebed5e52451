//! Text manipulation modules

use crate::module::{ModuleDescriptor, OptionSpec};
use crate::types::{SemanticType, TypedValue};
use anyhow::{bail, Context};
use lazy_static::lazy_static;
use regex::{Captures, Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashSet;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
    static ref SENTENCE_START: Regex = Regex::new(r"(^\s*[a-z])|([.!?]\s*[a-z])").unwrap();
    static ref PARAGRAPH_START: Regex = Regex::new(r"(^\s*[a-z])|(\n\s*[a-z])").unwrap();
}

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![
        reverse(),
        uppercase(),
        lowercase(),
        trim_whitespace(),
        replace_text(),
        regex_extract(),
        remove_duplicate_lines(),
    ]
}

fn text_module(id: &str, name: &str, description: &str) -> crate::module::ModuleDescriptorBuilder {
    ModuleDescriptor::builder(id, name, "Text")
        .description(description)
        .input(SemanticType::Text)
        .output(SemanticType::Text)
}

pub fn reverse() -> ModuleDescriptor {
    text_module("reverse", "Reverse Text", "Reverses the entire text character by character.")
        .run(|input, _| Ok(TypedValue::Text(input.try_text()?.chars().rev().collect())))
        .build()
}

pub fn uppercase() -> ModuleDescriptor {
    text_module(
        "uppercase",
        "Uppercase",
        "Converts text to uppercase, either entirely or at the start of each sentence or paragraph.",
    )
    .option(OptionSpec::choice("scope", ["All", "Word", "Sentence", "Paragraph"]).default_value("All"))
    .run(|input, options| {
        let text = input.try_text()?;
        let out = match options.text("scope") {
            Some("Word") => WORD.replace_all(text, upper).into_owned(),
            Some("Sentence") => SENTENCE_START.replace_all(text, upper).into_owned(),
            Some("Paragraph") => PARAGRAPH_START.replace_all(text, upper).into_owned(),
            _ => text.to_uppercase(),
        };
        Ok(TypedValue::Text(out))
    })
    .build()
}

fn upper(caps: &Captures) -> String {
    caps[0].to_uppercase()
}

pub fn lowercase() -> ModuleDescriptor {
    text_module("lowercase", "Lowercase", "Converts all characters in the text to lowercase.")
        .run(|input, _| Ok(TypedValue::Text(input.try_text()?.to_lowercase())))
        .build()
}

pub fn trim_whitespace() -> ModuleDescriptor {
    text_module(
        "trim_whitespace",
        "Trim Whitespace",
        "Removes whitespace from the beginning, end, or both sides of the text.",
    )
    .option(OptionSpec::choice("mode", ["Left", "Right", "Both"]).default_value("Both"))
    .run(|input, options| {
        let text = input.try_text()?;
        let trimmed = match options.text("mode") {
            Some("Left") => text.trim_start(),
            Some("Right") => text.trim_end(),
            _ => text.trim(),
        };
        Ok(TypedValue::from(trimmed))
    })
    .build()
}

pub fn replace_text() -> ModuleDescriptor {
    text_module(
        "replace_text",
        "Replace Text",
        "Replaces every occurrence of a piece of text with another value.",
    )
    .option(OptionSpec::text("find").label("Text to find").default_value(""))
    .option(OptionSpec::text("replace").label("Replacement").default_value(""))
    .run(|input, options| {
        let text = input.try_text()?;
        let find = options.text("find").unwrap_or_default();
        if find.is_empty() {
            return Ok(TypedValue::from(text));
        }
        let replacement = options.text("replace").unwrap_or_default();
        Ok(TypedValue::Text(text.replace(find, replacement)))
    })
    .build()
}

pub fn regex_extract() -> ModuleDescriptor {
    ModuleDescriptor::builder("regex_extract", "Regex Extract", "Text")
        .description("Collects every match of a regular expression.")
        .input(SemanticType::Text)
        .output(SemanticType::List)
        .option(OptionSpec::text("pattern").label("Regex Pattern").required())
        .option(OptionSpec::text("flags").label("Flags").default_value("g"))
        .run(|input, options| {
            let text = input.try_text()?;
            let pattern = options.text("pattern").unwrap_or_default();
            let flags = options.text("flags").unwrap_or_default();

            let mut builder = RegexBuilder::new(pattern);
            let mut global = false;
            for flag in flags.chars() {
                match flag {
                    'g' => global = true,
                    'i' => {
                        builder.case_insensitive(true);
                    }
                    'm' => {
                        builder.multi_line(true);
                    }
                    's' => {
                        builder.dot_matches_new_line(true);
                    }
                    other => bail!("unsupported regex flag '{}'", other),
                }
            }
            let regex = builder
                .build()
                .with_context(|| format!("invalid pattern '{}'", pattern))?;

            let matches: Vec<Value> = if global {
                regex.find_iter(text).map(|m| Value::from(m.as_str())).collect()
            } else {
                regex.find(text).map(|m| Value::from(m.as_str())).into_iter().collect()
            };
            Ok(TypedValue::List(matches))
        })
        .build()
}

pub fn remove_duplicate_lines() -> ModuleDescriptor {
    text_module(
        "remove_duplicate_lines",
        "Remove Duplicate Lines",
        "Keeps the first occurrence of every line.",
    )
    .run(|input, _| {
        let mut seen = HashSet::new();
        let lines: Vec<&str> = input
            .try_text()?
            .split('\n')
            .filter(|line| seen.insert(*line))
            .collect();
        Ok(TypedValue::Text(lines.join("\n")))
    })
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResolvedOptions;
    use serde_json::json;

    fn run(descriptor: ModuleDescriptor, input: &str, options: ResolvedOptions) -> anyhow::Result<TypedValue> {
        descriptor.operation.unwrap().run(&TypedValue::from(input), &options)
    }

    #[test]
    fn test_reverse_is_character_based() {
        let out = run(reverse(), "héllo", ResolvedOptions::default()).unwrap();
        assert_eq!(out, TypedValue::from("olléh"));
    }

    #[test]
    fn test_uppercase_scopes() {
        let text = "hello world. bye now\nnext para";
        let scoped = |scope: &str| {
            run(uppercase(), text, ResolvedOptions::from_pairs([("scope", scope)]))
                .unwrap()
                .as_text()
                .map(str::to_string)
                .unwrap()
        };

        assert_eq!(scoped("All"), "HELLO WORLD. BYE NOW\nNEXT PARA");
        assert_eq!(scoped("Sentence"), "Hello world. Bye now\nnext para");
        assert_eq!(scoped("Paragraph"), "Hello world. bye now\nNext para");
    }

    #[test]
    fn test_trim_modes() {
        let left = run(trim_whitespace(), "  x  ", ResolvedOptions::from_pairs([("mode", "Left")])).unwrap();
        assert_eq!(left, TypedValue::from("x  "));
        let both = run(trim_whitespace(), "  x  ", ResolvedOptions::default()).unwrap();
        assert_eq!(both, TypedValue::from("x"));
    }

    #[test]
    fn test_replace_text() {
        let options = ResolvedOptions::from_pairs([("find", "a"), ("replace", "o")]);
        assert_eq!(run(replace_text(), "banana", options).unwrap(), TypedValue::from("bonono"));

        let empty = ResolvedOptions::from_pairs([("find", ""), ("replace", "o")]);
        assert_eq!(run(replace_text(), "banana", empty).unwrap(), TypedValue::from("banana"));
    }

    #[test]
    fn test_regex_extract_flags() {
        let all = ResolvedOptions::from_pairs([("pattern", "a\\d"), ("flags", "gi")]);
        assert_eq!(
            run(regex_extract(), "a1 A2 b3", all).unwrap(),
            TypedValue::List(vec![json!("a1"), json!("A2")])
        );

        let first = ResolvedOptions::from_pairs([("pattern", "a\\d"), ("flags", "")]);
        assert_eq!(
            run(regex_extract(), "a1 a2", first).unwrap(),
            TypedValue::List(vec![json!("a1")])
        );
    }

    #[test]
    fn test_regex_extract_rejects_bad_input() {
        let bad_pattern = ResolvedOptions::from_pairs([("pattern", "("), ("flags", "g")]);
        assert!(run(regex_extract(), "x", bad_pattern).is_err());

        let bad_flag = ResolvedOptions::from_pairs([("pattern", "x"), ("flags", "y")]);
        assert!(run(regex_extract(), "x", bad_flag).is_err());
    }

    #[test]
    fn test_remove_duplicate_lines_keeps_first() {
        let out = run(remove_duplicate_lines(), "b\na\nb\nc\na", ResolvedOptions::default()).unwrap();
        assert_eq!(out, TypedValue::from("b\na\nc"));
    }
}

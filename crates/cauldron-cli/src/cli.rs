//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Cauldron CLI - Chain data transformation modules into recipes
///
/// Runs encoders, decoders, hashes, ciphers, extractors and other modules
/// over a value, converting it between text, numbers, booleans, JSON
/// objects, lists and raw bytes as each step requires.
#[derive(Parser, Debug)]
#[command(
    name = "cauldron",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CAULDRON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to `output.format` from the config, then human)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recipe or inline steps over an input value
    Run(RunArgs),

    /// Check a recipe against the module registry without running it
    Check(CheckArgs),

    /// List available modules
    List(ListArgs),

    /// Show a module's types and options
    Show(ShowArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Recipe file, or the name of a recipe in the configured recipes directory
    #[arg(short, long, value_name = "RECIPE")]
    pub recipe: Option<String>,

    /// Inline step, `module` or `module:key=value,key2=value2` (repeatable, runs after the recipe)
    #[arg(short = 's', long = "step", value_name = "STEP")]
    pub steps: Vec<String>,

    /// Input value given directly on the command line
    #[arg(short, long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the input value from a file (raw bytes unless --input-type says otherwise)
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Semantic type of the input value
    #[arg(short = 't', long, value_enum)]
    pub input_type: Option<TypeArg>,

    /// Convert the final value to this type before printing
    #[arg(long = "as", value_enum, value_name = "TYPE")]
    pub as_type: Option<TypeArg>,

    /// Write the result to a file (raw bytes for byte results)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Show the step trace
    #[arg(long)]
    pub trace: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Recipe file, or the name of a recipe in the configured recipes directory
    #[arg(value_name = "RECIPE")]
    pub recipe: Option<String>,

    /// Inline step, appended after the recipe steps
    #[arg(short = 's', long = "step", value_name = "STEP")]
    pub steps: Vec<String>,

    /// Semantic type of the initial value
    #[arg(short = 't', long, value_enum)]
    pub input_type: Option<TypeArg>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list modules in this category
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Module identity
    #[arg(value_name = "MODULE")]
    pub module: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Semantic type names accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    Text,
    Number,
    Boolean,
    Object,
    List,
    Bytes,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl OutputFormat {
    /// Parse a format name as written in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

impl From<TypeArg> for cauldron_core::SemanticType {
    fn from(ty: TypeArg) -> Self {
        match ty {
            TypeArg::Text => cauldron_core::SemanticType::Text,
            TypeArg::Number => cauldron_core::SemanticType::Number,
            TypeArg::Boolean => cauldron_core::SemanticType::Boolean,
            TypeArg::Object => cauldron_core::SemanticType::Object,
            TypeArg::List => cauldron_core::SemanticType::List,
            TypeArg::Bytes => cauldron_core::SemanticType::Bytes,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify that the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            quiet: false,
            config: None,
            output: None,
            no_color: false,
            command: Commands::Show(ShowArgs {
                module: "sha256".to_string(),
            }),
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            verbose: 2,
            quiet: true,
            ..cli
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::parse_from([
            "cauldron",
            "run",
            "-s",
            "base64_decode",
            "-s",
            "sha256:uppercase=true",
            "--input",
            "SGVsbG8=",
            "--as",
            "bytes",
            "--trace",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.steps, vec!["base64_decode", "sha256:uppercase=true"]);
                assert_eq!(args.input.as_deref(), Some("SGVsbG8="));
                assert_eq!(args.as_type, Some(TypeArg::Bytes));
                assert!(args.trace);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_name("json-pretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::from_name("YAML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_name("xml"), None);
    }

    #[test]
    fn test_input_and_input_file_conflict() {
        let result = Cli::try_parse_from(["cauldron", "run", "--input", "x", "--input-file", "y"]);
        assert!(result.is_err());
    }
}

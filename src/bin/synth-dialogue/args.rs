use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "synth-dialogue",
    about = "Generate synthetic discussions between LLM personas and annotate them",
    version
)]
pub struct CliArgs {
    /// Log level or env_logger-style filter, overridden by RUST_LOG.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    /// Write logs to this file (rotated) instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run conversations described by configuration files.
    Converse(ConverseArgs),
    /// Annotate previously generated conversations.
    Annotate(AnnotateArgs),
    /// Generate conversation configurations from personas and topics.
    ConvConfigs(ConvConfigsArgs),
    /// Generate an annotator configuration from personas.
    AnnotatorConfigs(AnnotatorConfigsArgs),
}

/// Endpoint and sampling flags shared by the generating subcommands.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Base URL of an OpenAI-compatible API, e.g. http://localhost:8080/v1
    #[arg(long)]
    pub base_url: String,
    #[arg(long, short = 'm')]
    pub model: String,
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long, default_value_t = 512)]
    pub max_tokens: u32,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Strings deleted from every generated message.
    #[arg(long = "remove", default_value = "```")]
    pub remove_strings: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ConverseArgs {
    /// A conversation configuration file, or a directory of them.
    #[arg(long, short = 'i')]
    pub input: PathBuf,
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,
    #[command(flatten)]
    pub model: ModelArgs,
    /// How many conversations to run at once.
    #[arg(long, default_value_t = 1)]
    pub parallel: usize,
    /// Do not print messages as they are generated.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// An exported conversation, or a directory of them.
    #[arg(long, short = 'c')]
    pub conversations: PathBuf,
    #[arg(long, short = 'a')]
    pub annotator_config: PathBuf,
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,
    #[command(flatten)]
    pub model: ModelArgs,
    #[arg(long, default_value_t = 1)]
    pub parallel: usize,
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct ConvConfigsArgs {
    #[arg(long)]
    pub output_dir: PathBuf,
    /// Directory of persona .json files.
    #[arg(long)]
    pub persona_dir: PathBuf,
    /// Directory of .txt files, one discussion topic each.
    #[arg(long)]
    pub topics_dir: PathBuf,
    /// Turn manager type, conversation length and history length.
    #[arg(long)]
    pub configs_path: PathBuf,
    #[arg(long)]
    pub user_instruction_path: PathBuf,
    #[arg(long)]
    pub mod_instruction_path: PathBuf,
    #[arg(long, default_value_t = 20)]
    pub num_generated_files: usize,
    #[arg(long, default_value_t = 4)]
    pub num_users: usize,
    #[arg(long)]
    pub no_moderator: bool,
    /// Seed for persona and topic sampling.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct AnnotatorConfigsArgs {
    /// Directory the timestamped config file is written to.
    #[arg(long)]
    pub output_dir: PathBuf,
    #[arg(long)]
    pub persona_dir: PathBuf,
    #[arg(long)]
    pub instruction_path: PathBuf,
    #[arg(long, default_value_t = 4)]
    pub history_ctx_len: usize,
}

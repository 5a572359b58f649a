//! apinter CLI - API Linter
//!
//! Lints OpenAPI documents against the built-in api-insights ruleset and any
//! extra rulesets named in the configuration or on the command line.

use anyhow::Context;
use apinter::config::{ColorMode, Config, OutputFormat};
use apinter::engine::Linter;
use apinter::output::{
    CompactFormatter, GithubFormatter, JsonFormatter, OutputFormatter, TextFormatter,
};
use apinter::ruleset::Ruleset;
use apinter::{Rule, Severity};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use glob::glob;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "apinter",
    version,
    about = "API Linter",
    long_about = "A rule-driven linter for OpenAPI documents with Spectral-style rulesets."
)]
struct Cli {
    /// Files or glob patterns to lint
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Extra ruleset files (YAML or JSON)
    #[arg(short, long)]
    ruleset: Vec<PathBuf>,

    /// Run only this rule
    #[arg(long)]
    rule: Option<String>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Only enable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Lowest severity that makes the run fail
    #[arg(long, value_enum)]
    fail_severity: Option<FailSeverity>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detailed information about a rule
    Explain {
        /// Rule code to explain
        code: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Compact,
    Github,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailSeverity {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Compact => OutputFormat::Compact,
            Format::Github => OutputFormat::Github,
        }
    }
}

impl From<FailSeverity> for Severity {
    fn from(severity: FailSeverity) -> Self {
        match severity {
            FailSeverity::Error => Severity::Error,
            FailSeverity::Warning => Severity::Warning,
            FailSeverity::Info => Severity::Information,
            FailSeverity::Hint => Severity::Hint,
        }
    }
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Error => label.red(),
        Severity::Warning => label.yellow(),
        Severity::Information => label.blue(),
        Severity::Hint => label.dimmed(),
    }
}

/// Print a rule in the `--list-rules` format
fn print_rule(rule: &Rule, active: bool) {
    let marker = if !rule.enabled {
        " [off]".red()
    } else if !active {
        " [not recommended]".yellow()
    } else {
        "".normal()
    };

    println!(
        "    {} [{}]{}",
        rule.code.cyan(),
        severity_label(rule.severity),
        marker
    );
    println!("      {}", rule.description);
    if !rule.tags.is_empty() {
        println!("      Tags: {}", rule.tags.join(", "));
    }
}

/// Print detailed rule explanation
fn explain_rule(rule: &Rule) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "Code".bold(), rule.code.cyan());
    println!("  {}: {}", "Severity".bold(), severity_label(rule.severity));
    println!("  {}: {}", "Recommended".bold(), rule.recommended);

    println!();
    println!("  {}", "Description".bold());
    println!("  {}", rule.description);

    if let Some(message) = &rule.message {
        println!();
        println!("  {}: {}", "Message".bold(), message);
    }

    println!();
    println!("  {}", "Given".bold());
    for given in &rule.given {
        println!("    {}", given);
    }

    println!();
    println!("  {}", "Then".bold());
    for then in &rule.then {
        match &then.field {
            Some(field) => println!("    {} -> {}", field, then.function.name()),
            None => println!("    {}", then.function.name()),
        }
    }

    if let Some(docs) = &rule.docs {
        println!();
        println!("  {}: {}", "Documentation".bold(), docs.blue());
    }

    if !rule.tags.is_empty() {
        println!();
        println!("  {}: {}", "Tags".bold(), rule.tags.join(", "));
    }
}

/// Load the built-in ruleset plus every configured ruleset file
fn load_ruleset(config: &Config, extra: &[PathBuf]) -> anyhow::Result<Ruleset> {
    let mut ruleset = Ruleset::builtin();
    for path in config.rulesets.iter().chain(extra) {
        let loaded = Ruleset::load(path)
            .with_context(|| format!("Failed to load ruleset {}", path.display()))?;
        log::debug!(
            "Loaded ruleset '{}' with {} rules",
            loaded.name(),
            loaded.len()
        );
        ruleset.extend(loaded);
    }
    Ok(ruleset)
}

/// Expand glob patterns into the list of files to lint
fn collect_files(patterns: &[String], config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let paths = glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))?;
        for entry in paths.flatten() {
            if entry.is_file() && !config.is_excluded(&entry) && !files.contains(&entry) {
                files.push(entry);
            }
        }
    }
    Ok(files)
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().unwrap_or_else(|e| {
            log::warn!("Ignoring default config: {}", e);
            Config::default()
        }),
    };

    config.merge_cli(
        cli.format.map(OutputFormat::from),
        Some(cli.verbose),
        cli.jobs,
        cli.disable,
        cli.select,
    );

    match config.output.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut ruleset = load_ruleset(&config, &cli.ruleset)?;

    if let Some(Commands::Explain { code }) = &cli.command {
        return match ruleset.get(code) {
            Some(rule) => {
                explain_rule(rule);
                Ok(0)
            }
            None => {
                eprintln!("{}: Rule '{}' not found", "error".red().bold(), code);
                eprintln!();
                eprintln!("Use {} to see all available rules", "--list-rules".cyan());
                Ok(1)
            }
        };
    }

    if let Some(code) = &cli.rule {
        ruleset = ruleset.only(code)?;
        config.all_rules = true;
    }

    if cli.list_rules {
        println!("{} ({} rules)", ruleset.name().bold(), ruleset.len());
        for rule in ruleset.rules() {
            print_rule(rule, config.is_rule_enabled(&rule.code, rule.recommended));
        }
        return Ok(0);
    }

    let patterns = if cli.files.is_empty() {
        config.files.include.clone()
    } else {
        cli.files.clone()
    };
    let files = collect_files(&patterns, &config)?;

    if files.is_empty() {
        eprintln!("{}: No files found to lint", "error".red().bold());
        return Ok(1);
    }

    if config.output.verbose {
        eprintln!("Linting {} files...", files.len());
    }

    let format = config.output.format;
    let linter = Linter::new(ruleset).with_config(config);
    let result = linter.lint(&files);

    let formatter: Box<dyn OutputFormatter> = match format {
        OutputFormat::Text => {
            let mut text = TextFormatter::new();
            if cli.no_color || !colored::control::SHOULD_COLORIZE.should_colorize() {
                text = text.without_color();
            }
            Box::new(text)
        }
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Compact => Box::new(CompactFormatter::new()),
        OutputFormat::Github => Box::new(GithubFormatter::new()),
    };

    print!("{}", formatter.format(&result));

    Ok(match cli.fail_severity {
        Some(threshold) => result.exit_code_for(threshold.into()),
        None => result.exit_code(),
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            std::process::exit(2);
        }
    }
}

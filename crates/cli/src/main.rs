mod runner;
mod tap;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;
use varithon_core::compile::DEFAULT_MAX_PASSES;
use varithon_core::state::DEFAULT_MAX_COLLECTION_SIZE;
use varithon_core::{
    compile_to, compile_with_options, parse_template, CompileError, CompileOptions, Document,
};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Varithon template compiler.
#[derive(Parser)]
#[command(
    name = "varithon",
    version,
    about = "Varithon template compiler: one template, many equivalent programs"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parsing and expansion passes to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template into one or more randomized variants
    Compile {
        /// Path to the .vy template
        template: PathBuf,
        /// Number of variants to produce
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,
        /// Directory to write variants into (prints to stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// File extension for written variants
        #[arg(long, default_value = "py")]
        extension: String,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Expansion passes allowed before giving up
        #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
        max_passes: usize,
        /// Largest size a `collection -b` may build
        #[arg(long, default_value_t = DEFAULT_MAX_COLLECTION_SIZE)]
        max_collection_size: usize,
    },

    /// Parse a template and report problems without compiling it
    Check {
        /// Path to the .vy template
        template: PathBuf,
    },

    /// Compile every template in a suite repeatedly and compare program output
    Test {
        /// Directory holding <name>.vy templates and <name>.expected outputs
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
        /// Variants compiled and run per template
        #[arg(long, default_value = "10")]
        attempts: usize,
        /// Command used to run each compiled variant
        #[arg(long, default_value = "python3")]
        interpreter: String,
        /// Seed for reproducible variants
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            template,
            count,
            out,
            extension,
            seed,
            max_passes,
            max_collection_size,
        } => {
            let options = CompileOptions {
                max_passes,
                max_collection_size,
            };
            cmd_compile(
                &template,
                count,
                out.as_deref(),
                &extension,
                seed,
                &options,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Check { template } => {
            cmd_check(&template, cli.output, cli.quiet);
        }
        Commands::Test {
            suite_dir,
            attempts,
            interpreter,
            seed,
        } => {
            let options = runner::HarnessOptions {
                attempts,
                interpreter,
                seed,
            };
            cmd_test(&suite_dir, &options, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so compiled output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}

fn report_compile_error(err: &CompileError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&err.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", err));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => eprintln!("{}", err),
    }
}

fn load_template(template: &Path, output: OutputFormat, quiet: bool) -> Document {
    match parse_template(template) {
        Ok(doc) => doc,
        Err(e) => {
            report_compile_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_compile(
    template: &Path,
    count: usize,
    out: Option<&Path>,
    extension: &str,
    seed: Option<u64>,
    options: &CompileOptions,
    output: OutputFormat,
    quiet: bool,
) {
    let doc = load_template(template, output, quiet);
    let mut rng = make_rng(seed);

    let Some(out_dir) = out else {
        let mut variants = Vec::with_capacity(count);
        for _ in 0..count {
            match compile_with_options(&doc, &mut rng, options) {
                Ok(text) => variants.push(text),
                Err(e) => {
                    report_compile_error(&e, output, quiet);
                    process::exit(1);
                }
            }
        }
        match output {
            OutputFormat::Text => {
                for text in &variants {
                    print!("{}", text);
                }
            }
            OutputFormat::Json => {
                let pretty = serde_json::to_string_pretty(&variants)
                    .unwrap_or_else(|e| format!("serialization error: {}", e));
                println!("{}", pretty);
            }
        }
        return;
    };

    let stem = template
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let extension = extension.trim_start_matches('.');
    let mut written = Vec::with_capacity(count);
    for i in 0..count {
        let dest = out_dir.join(format!("{}_{}.{}", stem, i, extension));
        if let Err(e) = compile_to(&doc, &dest, &mut rng, options) {
            report_compile_error(&e, output, quiet);
            process::exit(1);
        }
        written.push(dest);
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "compiled {} variant(s) of {} into {}",
                    written.len(),
                    template.display(),
                    out_dir.display()
                );
            }
        }
        OutputFormat::Json => {
            let paths: Vec<String> = written
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            let result = serde_json::json!({
                "template": template.to_string_lossy(),
                "variants": paths,
            });
            let pretty = serde_json::to_string_pretty(&result)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }
}

fn cmd_check(template: &Path, output: OutputFormat, quiet: bool) {
    let doc = load_template(template, output, quiet);
    let commands = doc.command_count();

    match output {
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "{}: ok ({} lines, {} commands)",
                    doc.file,
                    doc.lines.len(),
                    commands
                );
            }
        }
        OutputFormat::Json => {
            let result = serde_json::json!({
                "file": doc.file,
                "valid": true,
                "lines": doc.lines.len(),
                "commands": commands,
            });
            let pretty = serde_json::to_string_pretty(&result)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }
}

fn cmd_test(
    suite_dir: &Path,
    options: &runner::HarnessOptions,
    output: OutputFormat,
    quiet: bool,
) {
    if !suite_dir.is_dir() {
        let msg = format!("test suite directory not found: {}", suite_dir.display());
        report_error(&msg, output, quiet);
        process::exit(1);
    }
    if options.attempts == 0 {
        report_error("--attempts must be at least 1", output, quiet);
        process::exit(1);
    }

    // TAP is the primary output; quiet only affects error reporting
    let result = runner::run_suite(suite_dir, options);
    if result.failed > 0 {
        process::exit(1);
    }
}

//! CertForge CLI - badge certification tooling for the portfolio site
//!
//! Commands: categories, validate, compile, add, medium
//! Human report on stdout, logs on stderr
//! Returns non-zero on validation failure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use certforge_core::{
    append_certification, collect_certification, content_digest, feed, report, write_document,
    CertificationCompiler, CertificationConfig, Compilation, FeedConfig, Prompter,
    BADGE_ASSET_DIR, ENGINE_VERSION,
};

const DEFAULT_CONFIG: &str = "tools/badge_certifications.yaml";
const DEFAULT_OUTPUT: &str = "assets/badge_certifications.json";

#[derive(Parser, Debug)]
#[command(name = "certforge-cli", version)]
#[command(about = "CertForge CLI - Badge certification compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root; default paths are resolved against it
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Certification config [default: <root>/tools/badge_certifications.yaml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Badge image directory [default: <root>/assets/badges]
    #[arg(long, global = true)]
    badges_dir: Option<PathBuf>,

    /// Log verbosity, repeat for more (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List configured categories in display order
    Categories,

    /// Validate the config and print the report without writing anything
    Validate,

    /// Generate the certifications JSON document
    Compile {
        /// Output file [default: <root>/assets/badge_certifications.json]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail if the output file is stale instead of rewriting it
        #[arg(long)]
        check: bool,
    },

    /// Interactively add a certification to the config
    Add,

    /// Refresh the recent Medium posts document
    Medium {
        /// Medium username, without the leading @
        #[arg(long, env = "MEDIUM_USERNAME", default_value = feed::DEFAULT_USERNAME)]
        username: String,

        /// Number of posts to keep
        #[arg(long, env = "MAX_POSTS", default_value_t = feed::DEFAULT_MAX_POSTS)]
        max_posts: usize,

        /// Output file [default: <root>/assets/medium_posts.json]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Resolved file locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Paths {
    config: PathBuf,
    badges_dir: PathBuf,
}

impl Paths {
    fn resolve(cli: &Cli) -> Self {
        Self {
            config: cli
                .config
                .clone()
                .unwrap_or_else(|| cli.root.join(DEFAULT_CONFIG)),
            badges_dir: cli
                .badges_dir
                .clone()
                .unwrap_or_else(|| cli.root.join(BADGE_ASSET_DIR)),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    tracing::debug!(version = ENGINE_VERSION, "certforge starting");

    let paths = Paths::resolve(&cli);
    let result = match &cli.command {
        Commands::Categories => run_categories(&paths),
        Commands::Validate => run_validate(&paths),
        Commands::Compile { output, check } => {
            let output = output
                .clone()
                .unwrap_or_else(|| cli.root.join(DEFAULT_OUTPUT));
            run_compile(&paths, &output, *check)
        }
        Commands::Add => run_add(&paths),
        Commands::Medium {
            username,
            max_posts,
            output,
        } => {
            let config = FeedConfig {
                username: username.trim().to_string(),
                max_posts: *max_posts,
                ..Default::default()
            };
            let output = output
                .clone()
                .unwrap_or_else(|| feed::default_output(&cli.root));
            run_medium(&config, &output)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(paths: &Paths) -> Result<CertificationConfig> {
    CertificationConfig::load(&paths.config).context("loading certification config")
}

fn compile_and_report(paths: &Paths, config: &CertificationConfig) -> Result<Compilation> {
    let compiler = CertificationCompiler::new(&paths.badges_dir);
    let compilation = compiler.compile(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, &compilation).context("writing report")?;
    if !compilation.is_success() {
        writeln!(out, "\n❌ Generation completed with {} errors", compilation.error_count)?;
        writeln!(out, "⚠️  Fix the errors above and run again")?;
    }
    Ok(compilation)
}

fn run_categories(paths: &Paths) -> Result<u8> {
    let config = load_config(paths)?;
    let categories: Vec<_> = config
        .sorted_categories()
        .into_iter()
        .map(|(key, meta)| {
            serde_json::json!({
                "key": key,
                "display_name": meta.display_name_for(key),
                "icon": meta.icon(),
                "color": meta.color(),
                "sort_order": meta.sort_order(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&categories)?);
    Ok(0)
}

fn run_validate(paths: &Paths) -> Result<u8> {
    println!("📄 Reading config: {}", paths.config.display());
    let config = load_config(paths)?;
    let compilation = compile_and_report(paths, &config)?;
    Ok(if compilation.is_success() { 0 } else { 1 })
}

fn run_compile(paths: &Paths, output: &Path, check: bool) -> Result<u8> {
    println!("🔄 Generating badge certifications metadata from YAML...");
    println!("📄 Reading config: {}", paths.config.display());

    let config = load_config(paths)?;
    let compilation = compile_and_report(paths, &config)?;
    if !compilation.is_success() {
        return Ok(1);
    }

    let digest = content_digest(&compilation.document)?;

    if check {
        return if existing_digest(output)?.as_deref() == Some(digest.as_str()) {
            println!("\n✅ Up to date: {}", output.display());
            Ok(0)
        } else {
            println!("\n❌ Out of date: {} (run compile to regenerate)", output.display());
            Ok(1)
        };
    }

    std::fs::create_dir_all(&paths.badges_dir)
        .with_context(|| format!("creating {}", paths.badges_dir.display()))?;
    println!("📁 Badge images directory: {}", paths.badges_dir.display());

    write_document(&compilation.document, output)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(path = %output.display(), %digest, "document written");

    println!("\n✅ Successfully generated: {}", output.display());
    println!("\n📝 Next Steps:");
    println!("   1. Add your actual badge images to {}", paths.badges_dir.display());
    println!("   2. Update verification URLs in {}", paths.config.display());
    println!("   3. Run this command again to regenerate the JSON");
    Ok(0)
}

/// Content digest of the document already on disk, if there is one.
fn existing_digest(output: &Path) -> Result<Option<String>> {
    if !output.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(output)
        .with_context(|| format!("reading {}", output.display()))?;
    // An unparseable file is simply stale.
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => Ok(Some(content_digest(&value)?)),
        Err(e) => {
            tracing::warn!(path = %output.display(), error = %e, "existing output is not JSON");
            Ok(None)
        }
    }
}

fn run_add(paths: &Paths) -> Result<u8> {
    let rule = "=".repeat(60);
    println!("\n{}\n🏆 Add New Badge Certification\n{}\n", rule, rule);

    let config = load_config(paths)?;
    let categories = config.sorted_categories();

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let record = collect_certification(&mut prompter, &categories)?;
    append_certification(&paths.config, &record)?;

    println!("\n{}\n✅ Certification added successfully!\n{}", rule, rule);
    println!("\n📄 Updated: {}", paths.config.display());
    println!("\n🎯 Next Steps:");
    println!(
        "   1. Add badge image: {}",
        paths.badges_dir.join(record.badge_image.as_deref().unwrap_or_default()).display()
    );
    println!("   2. Run: certforge-cli compile");
    println!("{}\n", rule);
    Ok(0)
}

fn run_medium(config: &FeedConfig, output: &Path) -> Result<u8> {
    println!("📰 Fetching Medium feed: {}", config.feed_url());
    let count = feed::refresh_posts(config, output)
        .with_context(|| format!("refreshing {}", output.display()))?;
    println!("✅ Wrote {} posts to {}", count, output.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_compile_defaults() {
        let cli = Cli::try_parse_from(["certforge-cli", "compile"]).unwrap();
        match cli.command {
            Commands::Compile { output, check } => {
                assert!(output.is_none());
                assert!(!check);
            }
            _ => panic!("expected compile"),
        }
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "certforge-cli",
            "compile",
            "--check",
            "--root",
            "/site",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Compile { check: true, .. }));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("/site"));
    }

    #[test]
    fn cli_parse_medium_flags() {
        let cli = Cli::try_parse_from([
            "certforge-cli",
            "medium",
            "--username",
            "someone",
            "--max-posts",
            "3",
            "-o",
            "out/posts.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Medium {
                username,
                max_posts,
                output,
            } => {
                assert_eq!(username, "someone");
                assert_eq!(max_posts, 3);
                assert_eq!(output, Some(PathBuf::from("out/posts.json")));
            }
            _ => panic!("expected medium"),
        }
    }

    #[test]
    fn cli_parse_medium_rejects_bad_count() {
        assert!(Cli::try_parse_from(["certforge-cli", "medium", "--max-posts", "many"]).is_err());
    }

    #[test]
    fn paths_resolve_against_root() {
        let cli = Cli::try_parse_from(["certforge-cli", "--root", "/site", "validate"]).unwrap();
        let paths = Paths::resolve(&cli);
        assert_eq!(paths.config, PathBuf::from("/site/tools/badge_certifications.yaml"));
        assert_eq!(paths.badges_dir, PathBuf::from("/site/assets/badges"));
    }

    #[test]
    fn paths_explicit_overrides() {
        let cli = Cli::try_parse_from([
            "certforge-cli",
            "validate",
            "--config",
            "c.yaml",
            "--badges-dir",
            "img",
        ])
        .unwrap();
        let paths = Paths::resolve(&cli);
        assert_eq!(paths.config, PathBuf::from("c.yaml"));
        assert_eq!(paths.badges_dir, PathBuf::from("img"));
    }
}

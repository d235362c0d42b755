// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! modcheck CLI
//!
//! Command-line interface for the forum policy classifier.
//!
//! # Overview
//!
//! modcheck checks forum posts against the community board usage policy:
//! contact details, naming and shaming, disrespectful language, misplaced
//! posts, competitor links and fee avoidance. Classification is
//! deterministic; a recorded model reply can be routed through the same
//! verdict format with `--llm-replay`.
//!
//! # Dry Run Mode
//!
//! `classify`, `batch` and `init` accept `--dry-run` to preview what would
//! happen. Use `--verbosity verbose` for operation logging on stderr.

use clap::{Parser, Subcommand, ValueEnum};
use llm_analyst::{LlmAnalyst, ReplayClient};
use policy_classifier::{
    truncate_chars, Classifier, ClassifierError, ModerationBackend, Post, RuleSet, Severity,
    Status, Verdict,
};
use review_desk::{baseline_scenarios, Bucket, ReviewConfig, ReviewDesk, ScenarioHarness};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};

/// Output format for results
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine processing
    Json,
    /// Compact single-line output
    Compact,
}

/// Verbosity level
#[derive(Debug, Clone, ValueEnum)]
enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    Normal,
    /// Operation logging
    Verbose,
    /// Debug output including internal state
    Debug,
}

impl Verbosity {
    fn level(&self) -> Level {
        match self {
            Verbosity::Quiet => Level::ERROR,
            Verbosity::Normal => Level::WARN,
            Verbosity::Verbose => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
        }
    }
}

#[derive(Parser)]
#[command(name = "modcheck")]
#[command(author = "Jonathan D.A. Jewell <j.d.a.jewell@open.ac.uk>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Board usage policy checks for community forum posts")]
#[command(long_about = r#"
modcheck - Forum post moderation against the board usage policy

OVERVIEW
  Flags posts that break the community board usage policy:
  1. Personal information (phone numbers, email and postal addresses)
  2. Naming and shaming other members
  3. Profanity and insults
  4. Posts on the wrong board
  5. Competitor links, fee avoidance, moderation discussion

EXAMPLES
  modcheck classify -C "Call me at 02012345678" -b Selling
  modcheck classify -f post.txt -b "General Discussion" --format json
  echo "My app crashes" | modcheck classify -C - -b Selling
  modcheck batch 'queue/*.json'
  modcheck rules --section boards
  modcheck selftest

EXIT CODES
  0  Clean post
  1  Flagged at high or critical priority
  2  Flagged at medium or low priority
  3  Error during execution
"#)]
#[command(after_help = r#"
RULES
  The built-in rules can be exported with `modcheck init` and loaded back
  with --rules-file or the MODCHECK_RULES environment variable.

SHELL COMPLETIONS
  Generate completions with:
    modcheck completions bash > /etc/bash_completion.d/modcheck
    modcheck completions zsh > ~/.zfunc/_modcheck
    modcheck completions fish > ~/.config/fish/completions/modcheck.fish
"#)]
struct Cli {
    /// Output verbosity level
    #[arg(short, long, value_enum, default_value = "normal", global = true)]
    verbosity: Verbosity,

    /// Dry run mode - show what would be done without doing it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Custom rule set (JSON, as written by `modcheck init`)
    #[arg(short, long, global = true, env = "MODCHECK_RULES")]
    rules_file: Option<PathBuf>,

    /// Longest post body checked, in characters
    #[arg(long, global = true, default_value_t = review_desk::DEFAULT_MAX_CONTENT_CHARS)]
    max_chars: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single post
    ///
    /// Either --file or --content must be specified.
    ///
    /// EXAMPLES
    ///   modcheck classify --content "Seller bob99 is a scammer" --board Buying
    ///   modcheck classify --file post.txt --board Selling --format json
    ///   cat post.txt | modcheck classify --content - --board Selling
    #[command(visible_alias = "c")]
    Classify {
        /// File holding the post body
        #[arg(short, long, group = "input")]
        file: Option<PathBuf>,

        /// Post body (use '-' for stdin)
        #[arg(short = 'C', long, group = "input")]
        content: Option<String>,

        /// Board the post was made on
        #[arg(short, long, default_value = "General Discussion")]
        board: String,

        /// Author of the post
        #[arg(short, long, default_value = "anonymous")]
        username: String,

        /// Post title
        #[arg(long)]
        title: Option<String>,

        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Parse a recorded model reply instead of running the rules
        #[arg(long)]
        llm_replay: Option<PathBuf>,
    },

    /// Submit and analyze a batch of posts
    ///
    /// Each file holds one post object or an array of them:
    ///   {"content": "...", "board": "Selling", "username": "bob99"}
    ///
    /// Prints the resulting queues per bucket and the session statistics.
    #[command(visible_alias = "b")]
    Batch {
        /// Glob patterns of JSON post files
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Display the active rule set
    ///
    /// SECTIONS
    ///   pii, naming, profanity, insults, boards, spam,
    ///   fee_avoidance, moderation_discussion
    #[command(visible_alias = "r")]
    Rules {
        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show only one section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Run the built-in reference scenarios against the active rules
    #[command(visible_alias = "t")]
    Selftest {
        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write the default rule set to .modcheck/rules.json
    ///
    /// REVERSIBILITY
    ///   Remove with: rm -rf .modcheck/
    #[command(visible_alias = "i")]
    Init {
        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES
    ///   modcheck completions bash > ~/.local/share/bash-completion/completions/modcheck
    ///   modcheck completions zsh > ~/.zfunc/_modcheck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Generate man page
    ///
    /// EXAMPLE
    ///   modcheck man > /usr/local/share/man/man1/modcheck.1
    Man,
}

/// A batch file holds one post or many.
#[derive(Deserialize)]
#[serde(untagged)]
enum PostInput {
    One(Post),
    Many(Vec<Post>),
}

#[derive(Serialize)]
struct BatchReport<'a> {
    queues: Vec<BatchQueue>,
    stats: &'a review_desk::ModerationStats,
    skipped: usize,
}

#[derive(Serialize)]
struct BatchQueue {
    bucket: Bucket,
    posts: Vec<review_desk::StoredPost>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.level())
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Classify {
            file,
            content,
            board,
            username,
            title,
            format,
            llm_replay,
        } => {
            if cli.dry_run {
                println!("[dry-run] Would classify {} on board '{}'", describe_input(&file, &content), board);
                println!("[dry-run] Backend: {}", if llm_replay.is_some() { "llm" } else { "rules" });
                0
            } else {
                let input = ClassifyInput {
                    file,
                    content,
                    board,
                    username,
                    title,
                };
                classify_post(cli.rules_file.as_deref(), cli.max_chars, input, llm_replay.as_deref(), &format)
            }
        }
        Commands::Batch { patterns, format } => {
            if cli.dry_run {
                for pattern in &patterns {
                    println!("[dry-run] Would load posts matching: {}", pattern);
                }
                0
            } else {
                run_batch(cli.rules_file.as_deref(), cli.max_chars, &patterns, &format)
            }
        }
        Commands::Rules { format, section } => {
            show_rules(cli.rules_file.as_deref(), &format, section.as_deref())
        }
        Commands::Selftest { format } => run_selftest(cli.rules_file.as_deref(), &format),
        Commands::Init { force } => {
            if cli.dry_run {
                println!("[dry-run] Would write .modcheck/rules.json");
                println!("[dry-run] Force: {}", force);
                0
            } else {
                init_config(force)
            }
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            0
        }
        Commands::Man => generate_man_page(),
    };

    std::process::exit(exit_code);
}

// ============ shared helpers ============

fn load_rules(rules_file: Option<&Path>) -> Result<RuleSet, ClassifierError> {
    match rules_file {
        Some(path) => {
            info!(path = %path.display(), "loading rule set");
            RuleSet::from_json_file(path)
        }
        None => Ok(RuleSet::forum_default()),
    }
}

fn load_classifier(rules_file: Option<&Path>) -> Result<Classifier, ClassifierError> {
    Classifier::new(load_rules(rules_file)?)
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            false
        }
    }
}

fn exit_code_for(verdict: &Verdict) -> i32 {
    match (verdict.status, verdict.priority) {
        (Status::Clean, _) => 0,
        (Status::Flagged, Severity::High | Severity::Critical) => 1,
        (Status::Flagged, _) => 2,
    }
}

fn describe_input(file: &Option<PathBuf>, content: &Option<String>) -> String {
    match (file, content) {
        (Some(f), _) => f.display().to_string(),
        (None, Some(c)) if c == "-" => "stdin".to_string(),
        (None, Some(_)) => "inline content".to_string(),
        (None, None) => "nothing".to_string(),
    }
}

// ============ classify ============

struct ClassifyInput {
    file: Option<PathBuf>,
    content: Option<String>,
    board: String,
    username: String,
    title: Option<String>,
}

fn read_content(file: Option<PathBuf>, content: Option<String>) -> Result<String, String> {
    match (file, content) {
        (Some(f), _) => {
            debug!(path = %f.display(), "reading post body");
            std::fs::read_to_string(&f).map_err(|e| format!("Failed to read {}: {}", f.display(), e))
        }
        (None, Some(c)) if c == "-" => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
        (None, Some(c)) => Ok(c),
        (None, None) => Err("Either --file or --content must be provided".to_string()),
    }
}

fn classify_post(
    rules_file: Option<&Path>,
    max_chars: usize,
    input: ClassifyInput,
    llm_replay: Option<&Path>,
    format: &OutputFormat,
) -> i32 {
    let content = match read_content(input.file, input.content) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return 3;
        }
    };
    if content.chars().count() > max_chars {
        warn!(max_chars, "post body truncated");
    }

    let mut post = Post::new(truncate_chars(&content, max_chars), input.board, input.username);
    if let Some(title) = input.title {
        post = post.with_title(title);
    }

    let result = match llm_replay {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(reply) => LlmAnalyst::new(ReplayClient::new(reply)).analyze(&post),
            Err(e) => {
                eprintln!("Failed to read model reply {}: {}", path.display(), e);
                return 3;
            }
        },
        None => match load_classifier(rules_file) {
            Ok(classifier) => {
                if classifier.rules().find_board(&post.board).is_none() {
                    warn!(board = %post.board, "unknown board, placement check skipped");
                }
                classifier.analyze(&post)
            }
            Err(e) => {
                eprintln!("Error loading rules: {}", e);
                return 3;
            }
        },
    };

    let verdict = match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error classifying post: {}", e);
            return 3;
        }
    };

    match format {
        OutputFormat::Json => {
            if !print_json(&verdict) {
                return 3;
            }
        }
        OutputFormat::Compact => println!("{}", compact_verdict(&verdict)),
        OutputFormat::Text => print_verdict(&post, &verdict),
    }

    exit_code_for(&verdict)
}

fn compact_verdict(verdict: &Verdict) -> String {
    match verdict.status {
        Status::Clean => format!("CLEAN confidence={}", verdict.confidence),
        Status::Flagged => format!(
            "FLAGGED priority={} confidence={} violations={} action={}",
            verdict.priority,
            verdict.confidence,
            verdict
                .kinds()
                .iter()
                .map(|k| k.label())
                .collect::<Vec<_>>()
                .join(","),
            verdict.recommended_action.as_str()
        ),
    }
}

fn print_verdict(post: &Post, verdict: &Verdict) {
    println!("=== Moderation Verdict ===\n");
    println!("Board: {}", post.board);
    if let Some(title) = &post.title {
        println!("Title: {}", title);
    }
    println!("Status: {:?}", verdict.status);
    println!("Priority: {}", verdict.priority);
    println!("Confidence: {}%", verdict.confidence);
    println!("Action: {}\n", verdict.recommended_action);

    if verdict.violations.is_empty() {
        println!("No policy violations found.");
        return;
    }

    println!("VIOLATIONS ({}):", verdict.violations.len());
    for v in &verdict.violations {
        println!("  [{}] {} {}% - \"{}\"", v.severity, v.kind, v.confidence, v.evidence);
        println!("      {}", v.policy_reference);
        if let Some(details) = &v.action_details {
            println!("      suggested board: {}", details);
        }
    }
}

// ============ batch ============

fn load_batch(patterns: &[String]) -> Result<Vec<Post>, String> {
    let mut posts = Vec::new();
    for pattern in patterns {
        let paths = glob::glob(pattern).map_err(|e| format!("Invalid pattern '{}': {}", pattern, e))?;
        for entry in paths {
            let path = entry.map_err(|e| format!("Unreadable path: {}", e))?;
            debug!(path = %path.display(), "loading batch file");
            let json = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            match serde_json::from_str::<PostInput>(&json)
                .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?
            {
                PostInput::One(post) => posts.push(post),
                PostInput::Many(many) => posts.extend(many),
            }
        }
    }
    Ok(posts)
}

fn run_batch(
    rules_file: Option<&Path>,
    max_chars: usize,
    patterns: &[String],
    format: &OutputFormat,
) -> i32 {
    let classifier = match load_classifier(rules_file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading rules: {}", e);
            return 3;
        }
    };
    let posts = match load_batch(patterns) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return 3;
        }
    };
    info!(posts = posts.len(), "batch loaded");

    let config = ReviewConfig {
        max_content_chars: max_chars,
        ..Default::default()
    };
    let mut desk = ReviewDesk::with_config(review_desk::InMemoryRepository::new(), classifier, config);

    let mut skipped = 0;
    let mut worst: Option<Verdict> = None;
    for post in posts {
        let id = match desk.submit(post) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "skipping post");
                skipped += 1;
                continue;
            }
        };
        match desk.analyze(id) {
            Ok(verdict) => {
                let worse = worst
                    .as_ref()
                    .map_or(true, |w| exit_rank(&verdict) > exit_rank(w));
                if worse {
                    worst = Some(verdict);
                }
            }
            Err(e) => {
                eprintln!("Error analyzing post {}: {}", id, e);
                return 3;
            }
        }
    }

    let mut queues = Vec::new();
    for bucket in Bucket::all() {
        match desk.queue(*bucket) {
            Ok(posts) if !posts.is_empty() => queues.push(BatchQueue {
                bucket: *bucket,
                posts,
            }),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading queue {}: {}", bucket, e);
                return 3;
            }
        }
    }

    let stats = desk.stats();
    match format {
        OutputFormat::Json => {
            let report = BatchReport {
                queues,
                stats,
                skipped,
            };
            if !print_json(&report) {
                return 3;
            }
        }
        OutputFormat::Compact => {
            println!(
                "analyzed={} flagged={} clean={} skipped={} violation_rate={}%",
                stats.total_analyzed,
                stats.violations_found,
                stats.clean_posts,
                skipped,
                stats.violation_rate()
            );
        }
        OutputFormat::Text => {
            println!("=== Batch Results ===\n");
            println!("Backend: {}\n", desk.backend().name());
            for queue in &queues {
                println!("{} ({}):", queue.bucket.label().to_uppercase(), queue.posts.len());
                for stored in &queue.posts {
                    let kinds = stored
                        .verdict
                        .as_ref()
                        .map(|v| v.kinds().iter().map(|k| k.label()).collect::<Vec<_>>().join(", "))
                        .unwrap_or_default();
                    println!(
                        "  [{}] {} {} ({}) {}",
                        stored.priority(),
                        stored.id,
                        stored.post.board,
                        stored.post.username,
                        kinds
                    );
                }
                println!();
            }
            println!("Analyzed: {}", stats.total_analyzed);
            println!("Flagged: {}", stats.violations_found);
            println!("Clean: {}", stats.clean_posts);
            println!(
                "By severity: critical={} high={} medium={} low={}",
                stats.critical, stats.high, stats.medium, stats.low
            );
            println!("Violation rate: {}%", stats.violation_rate());
            if skipped > 0 {
                println!("Skipped (invalid): {}", skipped);
            }
        }
    }

    worst.as_ref().map_or(0, exit_code_for)
}

/// Orders verdicts the way exit codes rank them: clean, medium/low, high/critical.
fn exit_rank(verdict: &Verdict) -> u8 {
    match exit_code_for(verdict) {
        0 => 0,
        2 => 1,
        _ => 2,
    }
}

// ============ rules ============

fn show_rules(rules_file: Option<&Path>, format: &OutputFormat, section: Option<&str>) -> i32 {
    let rules = match load_rules(rules_file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading rules: {}", e);
            return 3;
        }
    };

    match format {
        OutputFormat::Json => {
            let value = match serde_json::to_value(&rules) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Failed to serialize rules: {}", e);
                    return 3;
                }
            };
            let shown = match section {
                Some(name) => match value.get(name) {
                    Some(part) => part.clone(),
                    None => {
                        eprintln!("Unknown section: {}", name);
                        return 3;
                    }
                },
                None => value,
            };
            if !print_json(&shown) {
                return 3;
            }
        }
        OutputFormat::Compact => {
            println!(
                "rules phone={} email={} address={} profanity={} insults={} boards={} domains={}",
                rules.pii.phone.len(),
                rules.pii.email.len(),
                rules.pii.address.len(),
                rules.profanity.patterns.len(),
                rules.insults.words.len(),
                rules.boards.boards.len(),
                rules.spam.domains.len()
            );
        }
        OutputFormat::Text => print_rules(&rules, section),
    }
    0
}

fn print_rules(rules: &RuleSet, section: Option<&str>) {
    println!("=== {} ===\n", rules.name);

    let show_all = section.is_none();
    let section = section.unwrap_or("");

    if show_all || section == "pii" {
        println!("PERSONAL INFORMATION (confidence {}%):", rules.pii.confidence);
        for p in rules.pii.phone.iter().chain(&rules.pii.email) {
            println!("  {}", p.name);
        }
        for p in &rules.pii.address {
            println!("  {} (within {} of an address keyword)", p.name, rules.pii.context_window);
        }
        println!("  keywords: {}\n", rules.pii.address_keywords.join(", "));
    }

    if show_all || section == "naming" {
        println!("NAMING & SHAMING (confidence {}%):", rules.naming.confidence);
        println!("  roles: {}", rules.naming.member_roles.join(", "));
        println!("  negative: {}\n", rules.naming.negative_keywords.join(", "));
    }

    if show_all || section == "profanity" {
        println!("PROFANITY (confidence {}%):", rules.profanity.confidence);
        println!("  {} patterns\n", rules.profanity.patterns.len());
    }

    if show_all || section == "insults" {
        println!("INSULTS (confidence {}%):", rules.insults.confidence);
        println!("  {}\n", rules.insults.words.join(", "));
    }

    if show_all || section == "boards" {
        println!("BOARDS (confidence {}%):", rules.boards.confidence);
        for b in &rules.boards.boards {
            if rules.is_exempt_board(&b.name) {
                println!("  {} (exempt)", b.name);
            } else {
                println!("  {}: {}", b.name, b.keywords.join(", "));
            }
        }
        println!();
    }

    if show_all || section == "spam" {
        println!("COMPETITOR LINKS (confidence {}%):", rules.spam.confidence);
        println!("  {}\n", rules.spam.domains.join(", "));
    }

    for (name, phrases) in [
        ("fee_avoidance", &rules.fee_avoidance),
        ("moderation_discussion", &rules.moderation_discussion),
    ] {
        if show_all || section == name {
            let state = if phrases.enabled { "" } else { ", disabled" };
            println!(
                "{} (confidence {}%{}):",
                name.replace('_', " ").to_uppercase(),
                phrases.confidence,
                state
            );
            for phrase in &phrases.phrases {
                println!("  \"{}\"", phrase);
            }
            println!();
        }
    }
}

// ============ selftest ============

fn run_selftest(rules_file: Option<&Path>, format: &OutputFormat) -> i32 {
    let classifier = match load_classifier(rules_file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading rules: {}", e);
            return 3;
        }
    };

    let mut harness = ScenarioHarness::new(classifier);
    harness.run_all(&baseline_scenarios());
    let summary = harness.summary();

    match format {
        OutputFormat::Json => {
            if !print_json(&summary) {
                return 3;
            }
        }
        OutputFormat::Compact => {
            println!(
                "{} passed={} failed={}",
                if summary.all_passed() { "PASS" } else { "FAIL" },
                summary.passed,
                summary.failed
            );
        }
        OutputFormat::Text => {
            println!("=== Self Test ===\n");
            for result in &summary.results {
                let mark = if result.passed { "PASS" } else { "FAIL" };
                println!("  {} {} ({}us)", mark, result.name, result.duration_us);
                for failure in &result.failures {
                    println!("       {}", failure);
                }
            }
            println!("\n{}/{} scenarios passed", summary.passed, summary.total);
        }
    }

    if summary.all_passed() {
        0
    } else {
        1
    }
}

// ============ init / completions / man ============

fn init_config(force: bool) -> i32 {
    let config_dir = PathBuf::from(".modcheck");
    let rules_path = config_dir.join("rules.json");

    if rules_path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", rules_path.display());
        return 1;
    }

    if let Err(e) = std::fs::create_dir_all(&config_dir) {
        eprintln!("Failed to create .modcheck directory: {}", e);
        return 3;
    }

    let json = match RuleSet::forum_default().to_json_pretty() {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Failed to serialize rules: {}", e);
            return 3;
        }
    };
    if let Err(e) = std::fs::write(&rules_path, json) {
        eprintln!("Failed to write {}: {}", rules_path.display(), e);
        return 3;
    }

    println!("Initialized modcheck rules in .modcheck/");
    println!("  .modcheck/rules.json  - Board usage policy rules");
    println!();
    println!("Use with: modcheck --rules-file .modcheck/rules.json ...");
    println!("To revert: rm -rf .modcheck/");

    0
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        "modcheck",
        &mut std::io::stdout(),
    );
}

fn generate_man_page() -> i32 {
    use clap::CommandFactory;
    let man = clap_mangen::Man::new(Cli::command());
    let mut buffer: Vec<u8> = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        eprintln!("Failed to render man page: {}", e);
        return 3;
    }
    match String::from_utf8(buffer) {
        Ok(page) => {
            print!("{}", page);
            0
        }
        Err(e) => {
            eprintln!("Man page is not valid UTF-8: {}", e);
            3
        }
    }
}

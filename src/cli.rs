//! Command-line interface for codelens.

use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::{language_tables, module_for_extension, registered_extensions};
use crate::config::{self, Config};
use crate::logging;
use crate::orchestrator::{AnalyzeOptions, Analyzer, BatchFile, BatchRequest};
use crate::practice::{estimate_complexity, HintSelector};
use crate::report::{self, HintReport};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into by `batch`.
const SKIPPED_DIRS: &[&str] = &[
    "vendor",
    "node_modules",
    "target",
    "build",
    "dist",
    "__pycache__",
    "venv",
];

/// Rule-based static analysis for learner code.
///
/// Codelens finds syntax slips, risky patterns and style problems in
/// Python, JavaScript, TypeScript, Java, C, C++, C#, Go and Rust, scores
/// the code from 0 to 10 and suggests what to fix and what to study next.
#[derive(Parser)]
#[command(name = "codelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fully analyze one source file ("-" reads stdin)
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Score a file and list only its major issues
    Quick(QuickArgs),
    /// Analyze every supported file under a directory
    Batch(BatchArgs),
    /// List supported languages
    Languages,
    /// Estimate complexity and suggest a hint for a practice solution
    Hint(HintArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// File to analyze
    pub file: PathBuf,

    /// Language of the file (default: inferred from the extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Minimum acceptable score on the 0-10 scale (exit 1 if below)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Skip suggestions
    #[arg(long)]
    pub no_suggestions: bool,

    /// Skip learning recommendations
    #[arg(long)]
    pub no_recommendations: bool,

    /// Skip model-based enrichment even if configured
    #[arg(long)]
    pub no_enrichment: bool,
}

/// Arguments for the quick command.
#[derive(Parser)]
pub struct QuickArgs {
    /// File to analyze
    pub file: PathBuf,

    /// Language of the file (default: inferred from the extension)
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for the batch command.
#[derive(Parser)]
pub struct BatchArgs {
    /// Directory to scan
    pub path: PathBuf,

    /// Analyze every file as this language instead of inferring it
    #[arg(short, long)]
    pub language: Option<String>,

    /// Minimum acceptable overall score on the 0-10 scale (exit 1 if below)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Glob patterns for paths to skip (adds to batch.exclude)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Skip model-based enrichment even if configured
    #[arg(long)]
    pub no_enrichment: bool,
}

/// Arguments for the hint command.
#[derive(Parser)]
pub struct HintArgs {
    /// Solution file ("-" reads stdin)
    pub file: PathBuf,

    /// Title of the practice problem
    #[arg(short, long)]
    pub problem: String,

    /// Seed for reproducible hint selection
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Validate the output format.
fn check_format(format: &str) -> bool {
    if format != "pretty" && format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", format);
        return false;
    }
    true
}

/// Load configuration and start logging.
fn setup(global: &GlobalArgs) -> Option<Config> {
    match config::load(global.config.as_deref()) {
        Ok((config, path)) => {
            logging::init(global.verbose, &config.log_level);
            if let Some(path) = path {
                debug!(path = %path.display(), "Loaded config");
            }
            Some(config)
        }
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            None
        }
    }
}

/// Read a source file, or stdin for `-`.
fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        return Ok(code);
    }
    std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))
}

/// Language for `path`: the explicit one, the registered module for its
/// extension, or the bare extension (analyzed with the generic checks).
pub fn infer_language(path: &Path, explicit: Option<&str>) -> Option<String> {
    if let Some(language) = explicit {
        return Some(language.to_string());
    }
    let ext = path.extension()?.to_str()?;
    Some(
        module_for_extension(ext)
            .map(|m| m.language_id().to_string())
            .unwrap_or_else(|| ext.to_ascii_lowercase()),
    )
}

/// Read and validate one input file.
fn load_input(
    file: &Path,
    language: Option<&str>,
    config: &Config,
) -> Result<(String, String), String> {
    let language = infer_language(file, language)
        .ok_or_else(|| format!("cannot infer the language of {:?}, pass --language", file))?;
    let code = read_source(file).map_err(|e| e.to_string())?;
    let length = code.chars().count();
    if length > config.max_code_length {
        return Err(format!(
            "{} is {} characters long, the maximum is {}",
            file.display(),
            length,
            config.max_code_length
        ));
    }
    Ok((code, language))
}

/// Collect files with a registered extension under `root`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let extensions = registered_extensions();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            debug!(path = %relative.display(), "Excluded");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

fn build_analyzer(config: &Config, enrichment: bool) -> anyhow::Result<Analyzer> {
    if enrichment {
        Analyzer::from_config(config)
    } else {
        Ok(Analyzer::new().with_pool_size(config.batch.pool_size))
    }
}

/// Run the analyze command.
pub fn run_analyze(global: &GlobalArgs, args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if !check_format(&global.format) {
        return Ok(EXIT_ERROR);
    }
    let Some(config) = setup(global) else {
        return Ok(EXIT_ERROR);
    };

    let (code, language) = match load_input(&args.file, args.language.as_deref(), &config) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut options = AnalyzeOptions::from(&config.analysis);
    options.include_suggestions &= !args.no_suggestions;
    options.include_recommendations &= !args.no_recommendations;
    options.include_enrichment &= !args.no_enrichment;

    let analyzer = build_analyzer(&config, options.include_enrichment)?;
    let result = analyzer.analyze(&code, &language, &options);

    let path = args.file.to_string_lossy().to_string();
    match global.format.as_str() {
        "json" => report::write_analysis_json(&path, &result, args.min_score)?,
        _ => report::write_analysis_pretty(&path, &result, args.min_score),
    }

    if report::passes(result.quality_score, args.min_score) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the quick command.
pub fn run_quick(global: &GlobalArgs, args: &QuickArgs) -> anyhow::Result<i32> {
    if !check_format(&global.format) {
        return Ok(EXIT_ERROR);
    }
    let Some(config) = setup(global) else {
        return Ok(EXIT_ERROR);
    };

    let (code, language) = match load_input(&args.file, args.language.as_deref(), &config) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let result = Analyzer::new().quick(&code, &language);
    let path = args.file.to_string_lossy().to_string();
    match global.format.as_str() {
        "json" => report::write_quick_json(&path, &result)?,
        _ => report::write_quick_pretty(&path, &result),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the batch command.
pub fn run_batch(global: &GlobalArgs, args: &BatchArgs) -> anyhow::Result<i32> {
    if !check_format(&global.format) {
        return Ok(EXIT_ERROR);
    }
    let Some(mut config) = setup(global) else {
        return Ok(EXIT_ERROR);
    };

    config.batch.exclude.extend(args.exclude.iter().cloned());
    if let Err(e) = config::validate(&config) {
        eprintln!("Error: {}", e);
        return Ok(EXIT_ERROR);
    }

    if !args.path.is_dir() {
        eprintln!("Error: {} is not a directory", args.path.display());
        return Ok(EXIT_ERROR);
    }

    let paths = collect_files(&args.path, &config)?;
    if paths.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .strip_prefix(&args.path)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let code = match std::fs::read_to_string(path) {
            Ok(code) => code,
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping unreadable file");
                continue;
            }
        };
        if code.chars().count() > config.max_code_length {
            warn!(file = %name, max = config.max_code_length, "Skipping file over the length limit");
            continue;
        }
        let language = match &args.language {
            Some(_) => None,
            None => infer_language(path, None),
        };
        files.push(BatchFile { name, code, language });
    }

    let request = BatchRequest {
        files,
        language: args.language.clone().unwrap_or_else(|| "unknown".to_string()),
    };

    let mut options = AnalyzeOptions::from(&config.analysis);
    options.include_enrichment &= !args.no_enrichment;
    let analyzer = build_analyzer(&config, options.include_enrichment)?;

    let bar = if global.format == "json" {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(request.files.len() as u64)
    };
    if let Ok(style) = ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    let result = analyzer.batch(&request, &options, |name| {
        bar.set_message(name.to_string());
        bar.inc(1);
    });
    bar.finish_and_clear();

    let path = args.path.to_string_lossy().to_string();
    match global.format.as_str() {
        "json" => report::write_batch_json(&path, &result, args.min_score)?,
        _ => report::write_batch_pretty(&path, &result, args.min_score),
    }

    if report::passes(result.overall_quality, args.min_score) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the languages command.
pub fn run_languages(global: &GlobalArgs) -> anyhow::Result<i32> {
    if !check_format(&global.format) {
        return Ok(EXIT_ERROR);
    }

    if global.format == "json" {
        let languages: Vec<serde_json::Value> = language_tables()
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "name": r.display_name,
                    "capability": r.capability,
                    "extensions": r.extensions,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&languages)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("Supported languages:");
    println!();
    for rules in language_tables() {
        println!(
            "  {:<12} {:<12} {:<8} {}",
            rules.id,
            rules.display_name,
            rules.capability.as_str(),
            rules.extensions.join(", ")
        );
    }
    println!();
    println!("Other languages are analyzed with the generic balance checks only.");

    Ok(EXIT_SUCCESS)
}

/// Run the hint command.
pub fn run_hint(global: &GlobalArgs, args: &HintArgs) -> anyhow::Result<i32> {
    if !check_format(&global.format) {
        return Ok(EXIT_ERROR);
    }
    let Some(_config) = setup(global) else {
        return Ok(EXIT_ERROR);
    };

    let code = match read_source(&args.file) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let complexity = estimate_complexity(&code);
    let mut selector = match args.seed {
        Some(seed) => HintSelector::seeded(seed),
        None => HintSelector::new(),
    };
    let hint = selector.select(&args.problem, &code, complexity);

    let path = args.file.to_string_lossy().to_string();
    let hint_report = HintReport::new(&path, &args.problem, complexity, hint);
    match global.format.as_str() {
        "json" => report::write_hint_json(&hint_report)?,
        _ => report::write_hint_pretty(&hint_report),
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["codelens", "analyze", "a.py", "--format", "json", "-vv"]).unwrap();
        assert_eq!(cli.global.format, "json");
        assert_eq!(cli.global.verbose, 2);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn test_infer_language() {
        assert_eq!(infer_language(Path::new("a.py"), None).as_deref(), Some("python"));
        assert_eq!(infer_language(Path::new("a.HPP"), None).as_deref(), Some("cpp"));
        assert_eq!(infer_language(Path::new("a.rb"), None).as_deref(), Some("rb"));
        assert_eq!(infer_language(Path::new("a.txt"), Some("java")).as_deref(), Some("java"));
        assert_eq!(infer_language(Path::new("Makefile"), None), None);
    }

    #[test]
    fn test_collect_files_skips_hidden_vendor_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/generated")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("src/main.py"), "x = 1\n").unwrap();
        fs::write(root.join("src/App.java"), "class App {}\n").unwrap();
        fs::write(root.join("src/notes.txt"), "hello\n").unwrap();
        fs::write(root.join("src/generated/api.py"), "y = 2\n").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "var a;\n").unwrap();
        fs::write(root.join(".git/hook.py"), "z = 3\n").unwrap();

        let mut config = Config::default();
        config.batch.exclude.push("src/generated/**".to_string());
        let files = collect_files(root, &config).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/App.java", "src/main.py"]);
    }

    #[test]
    fn test_load_input_enforces_max_length() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("long.py");
        fs::write(&file, "x = 1\n".repeat(10)).unwrap();

        let config = Config {
            max_code_length: 20,
            ..Config::default()
        };
        let err = load_input(&file, None, &config).unwrap_err();
        assert!(err.contains("maximum is 20"));

        let (code, language) = load_input(&file, None, &Config::default()).unwrap();
        assert_eq!(language, "python");
        assert_eq!(code.lines().count(), 10);
    }
}

// ============================================================================
// [总线] 程序的组装车间
// ✅ 只能做：pub mod 暴露子模块、解析命令行、初始化日志、分发到 commands
// ⛔ 禁止：直接实现业务逻辑
// ============================================================================

pub mod commands;
pub mod models;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::models::config::CompletionConfig;
use crate::models::dtos::RunSummary;

// ============================================================================
// 命令行定义
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "skeleton-completer")]
#[command(about = "Discover skeleton files, plan their completion and fill them from templates", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan, learn, infer, plan and report without touching skeleton files
    Analyze(RunArgs),
    /// Run the full pipeline and fill skeleton files from templates
    Complete(CompleteArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Root directories to scan; the first one receives the reports
    roots: Vec<PathBuf>,

    /// Extra exclusion pattern (substring of an entry name), repeatable
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Files analyzed concurrently per batch
    #[arg(long)]
    workers: Option<usize>,

    /// Minimum complexity (exclusive) for pattern learning
    #[arg(long)]
    threshold: Option<usize>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not write the Markdown/JSON reports
    #[arg(long)]
    no_report: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CompleteArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Plan and report the writes without performing them
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    /// 默认值 → 配置文件 → 命令行参数
    fn to_config(&self) -> Result<CompletionConfig, String> {
        let mut config = match &self.config {
            Some(path) => CompletionConfig::load_from_file(path)?,
            None => CompletionConfig::default(),
        };

        if !self.roots.is_empty() {
            config.roots = self.roots.clone();
        }
        config.exclude_patterns.extend(self.exclude.iter().cloned());
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(threshold) = self.threshold {
            config.learning_threshold = threshold;
        }
        if self.no_report {
            config.write_reports = false;
        }

        Ok(config)
    }
}

// ============================================================================
// 应用入口
// ============================================================================

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let json = match &cli.command {
        Commands::Analyze(args) => args.json,
        Commands::Complete(args) => args.run.json,
    };

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let result = match &cli.command {
        Commands::Analyze(args) => args
            .to_config()
            .and_then(commands::pipeline::analyze_project),
        Commands::Complete(args) => args.run.to_config().and_then(|mut config| {
            config.dry_run = config.dry_run || args.dry_run;
            commands::pipeline::complete_project(config)
        }),
    };

    match result {
        Ok(summary) => match print_summary(&summary, json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{}", e);
                ExitCode::from(1)
            }
        },
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(summary).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    println!("mode:           {}", summary.mode);
    println!("content files:  {}", summary.content_files);
    println!("skeleton files: {}", summary.skeleton_files);
    for entry in &summary.plan {
        println!(
            "  [{:<8}] {:>4}  {}  ({})",
            entry.tier.as_str(),
            entry.score,
            entry.relative_path,
            entry.template_id
        );
    }
    if let Some(execution) = &summary.execution {
        println!(
            "completed: {}  planned: {}  skipped: {}  failed: {}",
            execution.completed,
            execution.planned,
            execution.skipped(),
            execution.failed
        );
    }
    for report in &summary.reports {
        println!("report: {}", report);
    }
    println!(
        "{} files in {}ms ({:.2} files/s)",
        summary.stats.files_processed,
        summary.stats.total_ms,
        summary.stats.files_per_second()
    );
    Ok(())
}

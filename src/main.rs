mod ai;
mod analyze;
mod cli;
mod config;
mod error;
mod report;
mod scan;
mod types;

use crate::ai::openai::OpenAiClient;
use crate::ai::QualitativeAnalyzer;
use crate::error::{AgileError, Result};
use crate::report::OutputFormat;
use crate::scan::github::GitHubClient;
use crate::scan::{RepoSlug, RepositorySource};
use crate::types::config::{AgileConfig, GitHubSettings};
use crate::types::report::{OrganizationReport, RunMetadata};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NO_SUBJECTS: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 2;
}

fn init_logger(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AgileError::InvalidDate(value.to_string()))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn github_settings(loaded: &AgileConfig, api_url: Option<&str>) -> GitHubSettings {
    let mut settings = loaded.github_settings();
    if let Some(api_url) = api_url {
        settings.api_url = api_url.to_string();
    }
    settings
}

fn build_analyzer(
    access: &cli::AccessArgs,
    loaded: &AgileConfig,
) -> Result<QualitativeAnalyzer<OpenAiClient>> {
    if access.disable_ai {
        tracing::info!("AI analysis disabled by flag");
        return Ok(QualitativeAnalyzer::disabled());
    }
    let key = access
        .openai_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty());
    match key {
        Some(key) => {
            let client = OpenAiClient::new(key, loaded.ai_settings())?;
            Ok(QualitativeAnalyzer::new(Some(client)))
        }
        None => {
            tracing::warn!("no OpenAI API key configured; qualitative scores default to neutral");
            Ok(QualitativeAnalyzer::new(None))
        }
    }
}

fn run_repos(cmd: cli::ReposCommand, loaded: &AgileConfig) -> Result<i32> {
    let created_since = parse_date(&cmd.created_since)?;
    let format = cmd
        .format
        .map(|format| match format {
            cli::RepoFormat::Xlsx => OutputFormat::Xlsx,
            cli::RepoFormat::Md => OutputFormat::Md,
            cli::RepoFormat::Json => OutputFormat::Json,
        })
        .or_else(|| OutputFormat::from_path(&cmd.out))
        .unwrap_or(OutputFormat::Xlsx);

    let mut analysis = loaded.analysis_settings();
    if let Some(workers) = cmd.workers {
        analysis.workers = workers.get();
    }

    let source = GitHubClient::new(
        &github_settings(loaded, cmd.access.api_url.as_deref()),
        cmd.access.token.clone(),
    )?;
    let repos = scan::select_repositories(&source, &cmd.org, start_of_day(created_since))?;
    if repos.is_empty() {
        let err = AgileError::NoSubjects(format!(
            "no repositories in {} created since {}",
            cmd.org, created_since
        ));
        eprintln!("{err}");
        return Ok(exit_code::NO_SUBJECTS);
    }
    println!("Repositories found: {}", repos.len());

    let analyzer = build_analyzer(&cmd.access, loaded)?;
    let options = analyze::BatchOptions {
        workers: analysis.workers,
        messages_since: start_of_day(created_since),
        structure_depth: analysis.structure_depth,
    };
    let reports = analyze::analyze_organization(
        &source,
        repos,
        &analyzer,
        &loaded.weights(),
        options,
        Utc::now(),
    )?;
    if reports.is_empty() {
        eprintln!(
            "{}",
            AgileError::NoSubjects("no repository could be analyzed".to_string())
        );
        return Ok(exit_code::NO_SUBJECTS);
    }

    let report = OrganizationReport {
        metadata: RunMetadata::new(&cmd.org, created_since, reports.len()),
        repositories: reports,
    };
    report::write_organization(&report, format, &cmd.out)?;
    println!("{}", report::organization_summary(&report, &cmd.out));
    Ok(exit_code::SUCCESS)
}

fn run_user(cmd: cli::UserCommand, loaded: &AgileConfig) -> Result<i32> {
    let slug: RepoSlug = cmd.repo.parse()?;
    let since = parse_date(&cmd.since)?;
    let token = cmd
        .access
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AgileError::MissingCredential(
                "a GitHub token is required; set GH_TOKEN or pass --token".to_string(),
            )
        })?;

    let source = GitHubClient::new(
        &github_settings(loaded, cmd.access.api_url.as_deref()),
        Some(token.to_string()),
    )?;
    let login = source.authenticated_login()?;
    println!("Authenticated as: {login}");
    let repo = source.repository(&slug)?;
    println!("Repository found: {}", repo.full_name);

    let analyzer = build_analyzer(&cmd.access, loaded)?;
    let activity = scan::collect_user(
        &source,
        &repo,
        &cmd.user,
        start_of_day(since),
        loaded.analysis_settings().sample_size,
    );
    let user_report = analyze::analyze_user(&activity, &analyzer, since, Utc::now().date_naive());

    let format = match cmd.format {
        Some(cli::UserFormat::Json) => OutputFormat::Json,
        Some(cli::UserFormat::Md) => OutputFormat::Md,
        None => cmd
            .out
            .as_deref()
            .and_then(OutputFormat::from_path)
            .filter(|format| *format == OutputFormat::Json)
            .unwrap_or(OutputFormat::Md),
    };
    let extension = if format == OutputFormat::Json { "json" } else { "md" };
    let out = cmd.out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}-{}-{}-analysis.{extension}",
            cmd.user, slug.owner, slug.name
        ))
    });
    report::write_user(&user_report, format, &out)?;
    println!("{}", report::user_summary(&user_report, &out));
    Ok(exit_code::SUCCESS)
}

fn run(cli: cli::Cli) -> Result<i32> {
    let root = std::env::current_dir()?;
    let loaded = config::load_config(&root)?;
    match cli.command {
        cli::Commands::Repos(cmd) => run_repos(cmd, &loaded),
        cli::Commands::User(cmd) => run_user(cmd, &loaded),
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}

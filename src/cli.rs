use clap::{Args, Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agilemeter",
    version,
    about = "Agile maturity scoring for GitHub repositories and contributors"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every organization repository created since a date
    Repos(ReposCommand),
    /// Detailed report for one contributor in one repository
    User(UserCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RepoFormat {
    Xlsx,
    Md,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum UserFormat {
    Md,
    Json,
}

#[derive(Args)]
pub struct AccessArgs {
    /// GitHub token
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// OpenAI API key; AI analysis is disabled without one
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    #[arg(long)]
    pub disable_ai: bool,

    /// GitHub API base URL
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Args)]
pub struct ReposCommand {
    #[arg(long)]
    pub org: String,

    /// YYYY-MM-DD
    #[arg(long)]
    pub created_since: String,

    #[arg(long, default_value = "repos-analysis.xlsx")]
    pub out: PathBuf,

    /// Output format; defaults to the one implied by --out
    #[arg(long, value_enum)]
    pub format: Option<RepoFormat>,

    /// Parallel repository analyses [default: 4]
    #[arg(long)]
    pub workers: Option<NonZeroUsize>,

    #[command(flatten)]
    pub access: AccessArgs,
}

#[derive(Args)]
pub struct UserCommand {
    /// Repository as owner/name
    #[arg(long)]
    pub repo: String,

    #[arg(long)]
    pub user: String,

    /// YYYY-MM-DD
    #[arg(long)]
    pub since: String,

    /// Defaults to <user>-<owner>-<repo>-analysis.md
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<UserFormat>,

    #[command(flatten)]
    pub access: AccessArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repos_command_parses_defaults() {
        let cli = Cli::try_parse_from([
            "agilemeter",
            "repos",
            "--org",
            "acme",
            "--created-since",
            "2024-01-01",
        ])
        .expect("args should parse");
        let Commands::Repos(cmd) = cli.command else {
            panic!("expected repos command");
        };
        assert_eq!(cmd.org, "acme");
        assert_eq!(cmd.out, PathBuf::from("repos-analysis.xlsx"));
        assert!(cmd.format.is_none());
        assert!(!cmd.access.disable_ai);
    }

    #[test]
    fn zero_workers_are_rejected() {
        let result = Cli::try_parse_from([
            "agilemeter",
            "repos",
            "--org",
            "acme",
            "--created-since",
            "2024-01-01",
            "--workers",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn user_command_requires_since() {
        let result = Cli::try_parse_from(["agilemeter", "user", "--repo", "a/b", "--user", "dev"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbose_counts_and_conflicts_with_quiet() {
        let cli = Cli::try_parse_from([
            "agilemeter", "-vv", "user", "--repo", "a/b", "--user", "dev", "--since", "2024-08-01",
        ])
        .expect("args should parse");
        assert_eq!(cli.verbose, 2);

        let conflict = Cli::try_parse_from([
            "agilemeter", "-v", "-q", "user", "--repo", "a/b", "--user", "dev", "--since",
            "2024-08-01",
        ]);
        assert!(conflict.is_err());
    }
}

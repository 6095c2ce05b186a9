//! CLI command definitions

use clap::{Parser, ValueEnum};
use moa_domain::OutputFormat;
use std::path::PathBuf;

/// Linear hand-off pipelines selectable with `--pipeline`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PipelinePreset {
    /// architect -> executor -> critic
    DesignImplementReview,
    /// researcher -> architect -> executor
    ResearchDesignImplement,
    /// debugger -> executor -> tester
    DebugFixTest,
}

/// CLI arguments for moa-orchestrator
#[derive(Parser, Debug)]
#[command(name = "moa")]
#[command(author, version, about = "Mixture-of-Agents orchestrator - plan, implement, review until it passes")]
#[command(long_about = r#"
moa drives several AI command-line tools through a plan / implement / review
loop until the reviewer passes the work or the iteration limit is reached.

Each iteration has up to four phases:
1. Planning:  the architect designs a solution using the Memory Bank
2. Coding:    the executor implements the plan
3. Reviewing: the critic reviews the implementation and gives a verdict
4. Fix:       the executor addresses the review (skipped once converged)

Project context persists in .orchestrator/ (productContext.md,
activeContext.md, systemPatterns.md) and can be edited by hand.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./moa.toml          Project-level config
3. ~/.config/moa-orchestrator/config.toml   Global config

Example:
  moa "Add a /health endpoint to the HTTP server"
  moa --architect gemini --executor claude --max-iterations 3 "Refactor the parser"
  moa --pipeline debug-fix-test "Login fails with an empty password"
  moa --loop architect,critic --max-turns 6 "Sketch a caching layer"
"#)]
pub struct Cli {
    /// The goal for the agents (not required with --info or --show-config)
    pub goal: Option<String>,

    /// Backend for the architect (planning)
    #[arg(long, value_name = "BACKEND")]
    pub architect: Option<String>,

    /// Backend for the executor (coding and fixes)
    #[arg(long, value_name = "BACKEND")]
    pub executor: Option<String>,

    /// Backend for the critic (review); defaults to the architect's
    #[arg(long, value_name = "BACKEND")]
    pub critic: Option<String>,

    /// Upper bound on plan/implement/review iterations
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Require the test command to pass before stopping
    #[arg(long)]
    pub require_tests: bool,

    /// Shell command used as the test gate (e.g. "cargo test")
    #[arg(long, value_name = "COMMAND")]
    pub test_command: Option<String>,

    /// Memory Bank directory
    #[arg(long, value_name = "DIR")]
    pub memory_dir: Option<PathBuf>,

    /// Working directory handed to backends and the test gate
    #[arg(short = 'C', long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Run a linear pipeline instead of the iterative workflow
    #[arg(long, value_enum, value_name = "PRESET", conflicts_with = "loop_agents")]
    pub pipeline: Option<PipelinePreset>,

    /// Cycle through these agents round-robin instead of the iterative workflow
    #[arg(long = "loop", value_name = "AGENTS", value_delimiter = ',')]
    pub loop_agents: Vec<String>,

    /// Upper bound on recorded turns in --loop mode
    #[arg(long, value_name = "N", requires = "loop_agents")]
    pub max_turns: Option<usize>,

    /// Show configured backends and whether their executables are installed
    #[arg(long)]
    pub info: bool,

    /// Output format (summary, full, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Save the conversation as JSON
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Write the JSONL event transcript to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workflow_flags() {
        let cli = Cli::try_parse_from([
            "moa",
            "--architect",
            "gemini",
            "--executor",
            "claude",
            "--max-iterations",
            "3",
            "-o",
            "json",
            "-vv",
            "Build a parser",
        ])
        .unwrap();

        assert_eq!(cli.goal.as_deref(), Some("Build a parser"));
        assert_eq!(cli.architect.as_deref(), Some("gemini"));
        assert_eq!(cli.executor.as_deref(), Some("claude"));
        assert!(cli.critic.is_none());
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert!(cli.pipeline.is_none());
    }

    #[test]
    fn test_parse_pipeline_preset() {
        let cli =
            Cli::try_parse_from(["moa", "--pipeline", "debug-fix-test", "It crashes"]).unwrap();
        assert_eq!(cli.pipeline, Some(PipelinePreset::DebugFixTest));
    }

    #[test]
    fn test_parse_loop_agents() {
        let cli = Cli::try_parse_from([
            "moa",
            "--loop",
            "architect,critic",
            "--max-turns",
            "6",
            "Sketch a cache",
        ])
        .unwrap();
        assert_eq!(cli.loop_agents, vec!["architect", "critic"]);
        assert_eq!(cli.max_turns, Some(6));

        assert!(
            Cli::try_parse_from(["moa", "--loop", "architect", "--pipeline", "debug-fix-test", "g"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["moa", "--max-turns", "3", "g"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_output_format() {
        assert!(Cli::try_parse_from(["moa", "-o", "xml", "goal"]).is_err());
    }
}

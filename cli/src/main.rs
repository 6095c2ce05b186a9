//! CLI entrypoint for moa-orchestrator
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use moa_application::{
    Agent, AgentLoop, Backend, ConversationLogger, DEFAULT_MAX_TURNS, MemoryBank,
    NoConversationLogger, NoProgress, Pipeline, RunLoopUseCase, RunMoaWorkflowUseCase,
    RunPipelineUseCase, WorkflowConfig, WorkflowProgressNotifier,
};
use moa_domain::{AgentRole, Conversation, ConversationStatus};
use moa_infrastructure::{
    BackendRegistry, CommandTestGate, ConfigLoader, ConversationExporter, FileConfig,
    FileContextStore, JsonlConversationLogger,
};
use moa_presentation::{
    Cli, ConsoleFormatter, OutputFormatter, PipelinePreset, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Backends resolved for the three workflow roles
struct RoleBackends {
    architect: Arc<dyn Backend>,
    executor: Arc<dyn Backend>,
    critic: Arc<dyn Backend>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = load_config(&cli)?;
    apply_overrides(&mut config, &cli);

    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    let _log_guard = init_tracing(cli.verbose, log_file.as_deref())?;

    info!("Starting moa-orchestrator");

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("Invalid configuration ({} problem(s))", issues.len());
    }

    if !config.output.color {
        ConsoleFormatter::set_color(false);
    }

    // === Dependency Injection ===
    let registry = BackendRegistry::from_config_in(&config.backends, cli.working_dir.as_deref());

    if cli.info {
        print_info(&registry, &config).await;
        return Ok(ExitCode::SUCCESS);
    }

    let goal = match cli.goal.as_deref().map(str::trim) {
        Some(goal) if !goal.is_empty() => goal.to_string(),
        _ => bail!("A goal is required. Use --info to list backends."),
    };

    let backends = RoleBackends {
        architect: registry.require(&config.agents.architect)?,
        executor: registry.require(&config.agents.executor)?,
        critic: registry.require(config.agents.critic_backend())?,
    };
    for backend in [&backends.architect, &backends.executor, &backends.critic] {
        if !backend.is_available().await {
            warn!(backend = backend.name(), "Backend executable not found on PATH");
        }
    }

    let mut workflow_config = config
        .workflow
        .to_workflow_config()
        .context("Invalid workflow settings")?;
    if let Some(dir) = &cli.working_dir {
        workflow_config = workflow_config.with_working_dir(dir.clone());
    }

    let logger = conversation_logger(&cli, &config);

    let progress: Box<dyn WorkflowProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    if !cli.quiet {
        println!();
        println!("+============================================================+");
        println!("|           moa - Mixture-of-Agents orchestrator             |");
        println!("+============================================================+");
        println!();
        println!("Goal: {}", goal);
        println!(
            "Agents: architect={} executor={} critic={}",
            backends.architect.name(),
            backends.executor.name(),
            backends.critic.name()
        );
        println!();
    }

    let conversation = match cli.pipeline {
        Some(preset) => {
            run_pipeline(preset, &goal, &backends, &workflow_config, logger, progress.as_ref())
                .await?
        }
        None if !cli.loop_agents.is_empty() => {
            let agent_loop = AgentLoop::new(
                goal.clone(),
                cli.loop_agents.clone(),
                goal.clone(),
                workflow_config.criteria.max_iterations(),
                cli.max_turns.unwrap_or(DEFAULT_MAX_TURNS),
            )
            .context("Invalid loop settings")?;
            run_loop(&agent_loop, &backends, &workflow_config, logger, progress.as_ref()).await?
        }
        None => {
            run_workflow(
                &goal,
                &backends,
                &config,
                &cli,
                workflow_config,
                logger,
                progress.as_ref(),
            )
            .await?
        }
    };

    let format = cli.output.or(config.output.format).unwrap_or_default();
    println!("{}", ConsoleFormatter.format(&conversation, format));

    if let Some(path) = &cli.save {
        ConversationExporter::save(&conversation, path)
            .with_context(|| format!("Failed to save conversation to {}", path.display()))?;
        if !cli.quiet {
            eprintln!("Conversation saved to {}", path.display());
        }
    }

    Ok(match conversation.status() {
        ConversationStatus::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let loaded = match (cli.no_config, cli.config.as_deref()) {
        (true, None) => return Ok(ConfigLoader::load_defaults()),
        (true, Some(path)) => ConfigLoader::load_file(path),
        (false, path) => ConfigLoader::load(path),
    };
    loaded.map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

/// Command-line flags win over every config file
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(architect) = &cli.architect {
        config.agents.architect = architect.clone();
    }
    if let Some(executor) = &cli.executor {
        config.agents.executor = executor.clone();
    }
    if let Some(critic) = &cli.critic {
        config.agents.critic = Some(critic.clone());
    }
    if let Some(max) = cli.max_iterations {
        config.workflow.max_iterations = max;
    }
    if cli.require_tests {
        config.workflow.require_tests_pass = true;
    }
    if let Some(command) = &cli.test_command {
        config.workflow.test_command = Some(command.clone());
    }
    if let Some(dir) = &cli.memory_dir {
        config.workflow.memory_dir = dir.clone();
    }
}

fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(if verbose >= 3 { "trace" } else { "debug" }));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn conversation_logger(cli: &Cli, config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let path = cli
        .conversation_log
        .clone()
        .or_else(|| config.logging.conversation_log.clone());

    match path.and_then(JsonlConversationLogger::new) {
        Some(logger) => {
            info!("Writing conversation transcript to {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}

async fn print_info(registry: &BackendRegistry, config: &FileConfig) {
    println!("Backends:");
    for (name, available) in registry.availability().await {
        let mark = if available { "[FOUND]" } else { "[     ]" };
        println!("  {} {}", mark, name);
    }
    println!();
    println!("Agents:");
    println!("  architect -> {}", config.agents.architect);
    println!("  executor  -> {}", config.agents.executor);
    println!("  critic    -> {}", config.agents.critic_backend());
}

async fn run_workflow(
    goal: &str,
    backends: &RoleBackends,
    config: &FileConfig,
    cli: &Cli,
    workflow_config: WorkflowConfig,
    logger: Arc<dyn ConversationLogger>,
    progress: &dyn WorkflowProgressNotifier,
) -> Result<Conversation> {
    let store = FileContextStore::in_working_dir(
        cli.working_dir.as_deref(),
        &workflow_config.memory_dir,
    );
    info!("Memory Bank at {}", store.dir().display());
    let memory = MemoryBank::new(Arc::new(store));

    let architect = Agent::for_role("architect", AgentRole::Architect, backends.architect.clone());
    let executor = Agent::for_role("executor", AgentRole::Executor, backends.executor.clone());
    let critic = Agent::for_role("critic", AgentRole::Critic, backends.critic.clone());

    let mut use_case = RunMoaWorkflowUseCase::new(architect, executor, memory, workflow_config)
        .with_critic(critic)
        .with_conversation_logger(logger);

    if config.workflow.require_tests_pass
        && let Some(command) = &config.workflow.test_command
    {
        use_case = use_case.with_test_gate(Arc::new(CommandTestGate::new(command.clone())));
    }

    Ok(use_case.execute_with_progress(goal, progress).await?)
}

async fn run_pipeline(
    preset: PipelinePreset,
    goal: &str,
    backends: &RoleBackends,
    workflow_config: &WorkflowConfig,
    logger: Arc<dyn ConversationLogger>,
    progress: &dyn WorkflowProgressNotifier,
) -> Result<Conversation> {
    let pipeline = match preset {
        PipelinePreset::DesignImplementReview => Pipeline::design_implement_review(goal),
        PipelinePreset::ResearchDesignImplement => Pipeline::research_design_implement(goal),
        PipelinePreset::DebugFixTest => Pipeline::debug_fix_test(goal),
    };

    let mut use_case = RunPipelineUseCase::new(workflow_config).with_conversation_logger(logger);
    for agent in named_agents(backends) {
        use_case = use_case.with_agent(agent);
    }

    Ok(use_case.execute_with_progress(&pipeline, progress).await?)
}

async fn run_loop(
    agent_loop: &AgentLoop,
    backends: &RoleBackends,
    workflow_config: &WorkflowConfig,
    logger: Arc<dyn ConversationLogger>,
    progress: &dyn WorkflowProgressNotifier,
) -> Result<Conversation> {
    info!(
        agents = ?agent_loop.agents(),
        max_iterations = agent_loop.max_iterations(),
        max_turns = agent_loop.max_turns(),
        "Running agent loop"
    );
    let mut use_case = RunLoopUseCase::new(workflow_config).with_conversation_logger(logger);
    for agent in named_agents(backends) {
        use_case = use_case.with_agent(agent);
    }

    Ok(use_case.execute_with_progress(agent_loop, progress).await?)
}

/// Agents addressable by name in pipelines and loops
fn named_agents(backends: &RoleBackends) -> Vec<Agent> {
    [
        ("architect", AgentRole::Architect, &backends.architect),
        ("executor", AgentRole::Executor, &backends.executor),
        ("critic", AgentRole::Critic, &backends.critic),
        ("researcher", AgentRole::Researcher, &backends.architect),
        ("debugger", AgentRole::Debugger, &backends.critic),
        ("tester", AgentRole::Tester, &backends.executor),
    ]
    .into_iter()
    .map(|(name, role, backend)| Agent::for_role(name, role, backend.clone()))
    .collect()
}

//! Progress reporting for workflow execution

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use moa_application::ports::progress::WorkflowProgressNotifier;
use moa_domain::{StopReason, Verdict, WorkflowPhase};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one spinner per running phase
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut guard| guard.take())
    }

    fn start_spinner(&self, prefix: String, agent: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(agent.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock()
            && let Some(previous) = guard.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn finish_spinner(&self, label: &str, agent: &str, success: bool) {
        if let Some(pb) = self.take_spinner() {
            pb.set_prefix("");
            pb.finish_with_message(completion_line(label, agent, success));
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn verdict_label(verdict: Option<Verdict>) -> String {
    match verdict {
        Some(Verdict::Pass) => "PASS".green().bold().to_string(),
        Some(Verdict::Fail) => "FAIL".red().bold().to_string(),
        Some(Verdict::NeedsRevision) => "NEEDS_REVISION".yellow().bold().to_string(),
        None => "no verdict".dimmed().to_string(),
    }
}

fn step_label(step: usize) -> String {
    format!("Step {}", step)
}

fn completion_line(label: &str, agent: &str, success: bool) -> String {
    if success {
        format!("{} {} ({})", "v".green(), label, agent)
    } else {
        format!("{} {} ({}) failed", "x".red(), label, agent)
    }
}

fn finished_line(iterations: usize, reason: StopReason) -> String {
    let label = match reason {
        StopReason::Success => "converged".green().bold(),
        StopReason::MaxIterationsReached => "iteration limit reached".yellow().bold(),
        StopReason::BackendError => "backend error".red().bold(),
        StopReason::Continue => "stopped".normal(),
    };
    format!("Finished after {} iteration(s): {}", iterations, label)
}

impl WorkflowProgressNotifier for ProgressReporter {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        println!(
            "{}",
            format!("== Iteration {}/{} ==", iteration, max_iterations)
                .cyan()
                .bold()
        );
    }

    fn on_phase_start(&self, phase: WorkflowPhase, agent: &str) {
        self.start_spinner(phase.display_name().to_string(), agent);
    }

    fn on_phase_complete(&self, phase: WorkflowPhase, agent: &str, success: bool) {
        self.finish_spinner(phase.display_name(), agent, success);
    }

    fn on_step_start(&self, step: usize, agent: &str) {
        self.start_spinner(step_label(step), agent);
    }

    fn on_step_complete(&self, step: usize, agent: &str, success: bool) {
        self.finish_spinner(&step_label(step), agent, success);
    }

    fn on_verdict(&self, _iteration: usize, verdict: Option<Verdict>) {
        println!("  Verdict: {}", verdict_label(verdict));
    }

    fn on_compaction(&self, compacted: bool) {
        if compacted {
            println!("  {} Memory Bank compacted", "*".cyan());
        } else {
            println!(
                "  {} Memory Bank over limit, compaction failed",
                "!".yellow()
            );
        }
    }

    fn on_finished(&self, iterations: usize, reason: StopReason) {
        if let Some(pb) = self.take_spinner() {
            pb.finish_and_clear();
        }
        println!("{}", finished_line(iterations, reason));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl WorkflowProgressNotifier for SimpleProgress {
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize) {
        println!(
            "{} {}",
            "->".cyan(),
            format!("Iteration {}/{}", iteration, max_iterations).bold()
        );
    }

    fn on_phase_start(&self, phase: WorkflowPhase, agent: &str) {
        println!("  {} ({})...", phase.display_name(), agent);
    }

    fn on_phase_complete(&self, phase: WorkflowPhase, agent: &str, success: bool) {
        println!("  {}", completion_line(phase.display_name(), agent, success));
    }

    fn on_step_start(&self, step: usize, agent: &str) {
        println!("  {} ({})...", step_label(step), agent);
    }

    fn on_step_complete(&self, step: usize, agent: &str, success: bool) {
        println!("  {}", completion_line(&step_label(step), agent, success));
    }

    fn on_verdict(&self, _iteration: usize, verdict: Option<Verdict>) {
        println!("  Verdict: {}", verdict_label(verdict));
    }

    fn on_finished(&self, iterations: usize, reason: StopReason) {
        println!("{}", finished_line(iterations, reason));
    }
}

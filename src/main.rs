//! callforge - Main CLI Entry Point

use anyhow::{Context, Result};
use callforge::{
    cli::{Args, BuildArgs, CheckArgs, Commands, Verbosity},
    config::Settings,
    dataset::{load_examples, tool_catalog},
    embedding::SentenceEmbedder,
    hub::HubClient,
    llm::OpenAiClient,
    logging,
    pipeline::{DatasetPipeline, PipelineOutcome},
    tools::{ExecutionChecker, ExecutionReport, FunctionRegistry, ToolContext, ToolRegistry},
};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    logging::init(verbosity)?;

    let settings = Settings::load(args.config.as_deref())?;

    match &args.command {
        Commands::Build(build) => run_build(build, &settings, verbosity).await?,
        Commands::Check(check) => run_check(check, &settings, verbosity).await?,
        Commands::Tools => list_tools(),
    }

    Ok(())
}

async fn run_build(build: &BuildArgs, settings: &Settings, verbosity: Verbosity) -> Result<()> {
    let options = build.to_options(settings);

    let llm = OpenAiClient::with_config(
        &settings.dataset.llm_base_url,
        &settings.dataset.llm_model,
        settings.auth.openai_api_key.clone(),
    )?;
    let hub = Arc::new(HubClient::new(settings.auth.huggingface_token.clone())?);
    let registry: Arc<dyn FunctionRegistry> =
        Arc::new(ToolRegistry::with_system_tools(ToolContext::default()));

    let mut pipeline = DatasetPipeline::new(Arc::new(llm), hub.clone(), hub, registry)
        .with_few_shot_dataset(settings.dataset.few_shot_examples_dataset.clone())
        .with_default_repo_id(settings.auth.hf_dataset_repo_id.clone())
        .with_execution_limits(
            settings.execution.concurrency_limit,
            settings.execution.call_timeout(),
        )
        .with_progress(verbosity.show_progress());

    if options.dedup {
        let model = settings.dataset.sentence_transformer_model.clone();
        let embedder = tokio::task::spawn_blocking(move || SentenceEmbedder::load(&model))
            .await
            .context("embedding model loader panicked")??;
        pipeline = pipeline.with_embedder(Arc::new(embedder));
    }

    let outcome = pipeline.run(&options).await?;
    print_build_summary(&outcome);
    Ok(())
}

async fn run_check(check: &CheckArgs, settings: &Settings, verbosity: Verbosity) -> Result<()> {
    let examples = load_examples(&check.dataset, Some(check.limit))
        .with_context(|| format!("Failed to load dataset {}", check.dataset.display()))?;

    let registry = Arc::new(ToolRegistry::with_system_tools(ToolContext::default()));
    let limit = check.workers.unwrap_or(settings.execution.concurrency_limit);
    let mut checker = ExecutionChecker::new(registry, limit)?;
    let timeout = check
        .timeout_secs
        .map(Duration::from_secs)
        .or_else(|| settings.execution.call_timeout());
    if let Some(timeout) = timeout {
        checker = checker.with_call_timeout(timeout);
    }

    let pb = spinner(verbosity, format!("Checking {} examples...", examples.len()));
    let report = checker.run(&examples).await?;
    pb.finish_and_clear();

    report
        .save(&check.report)
        .with_context(|| format!("Failed to write report {}", check.report.display()))?;

    print_report(&report);
    println!("Report written to {}", check.report.display().to_string().cyan());
    Ok(())
}

fn list_tools() {
    let registry = ToolRegistry::with_system_tools(ToolContext::default());

    println!("{}", "Tool catalog".bold());
    for tool in tool_catalog() {
        let status = if registry.contains(tool.name) { "✓".green() } else { "✗".red() };
        println!("  {} {:<20} {}", status, tool.name.green(), tool.description);
    }

    println!("\n{}", "Registered functions".bold());
    for name in registry.names() {
        println!("  {}", name);
    }
}

fn print_report(report: &ExecutionReport) {
    let rate = format!("{:.2}%", report.success_rate);
    let rate = if report.failed == 0 { rate.green() } else { rate.yellow() };

    println!("\n{}", "Execution check".bold());
    println!("  Executed:     {} calls", report.total_function_calls);
    println!("  Passed:       {}", report.passed.to_string().green());
    println!("  Failed:       {}", report.failed.to_string().red());
    println!("  Success Rate: {}", rate);
}

fn print_build_summary(outcome: &PipelineOutcome) {
    println!("\n{}", "Dataset build".bold());

    if outcome.aborted {
        println!("  {} invalid entries found, dataset not saved", "✗".red());
        return;
    }

    match &outcome.dataset_path {
        Some(path) => println!(
            "  {} {} examples saved to {}",
            "✓".green(),
            outcome.example_count,
            path.display()
        ),
        None => println!("  {} dataset could not be saved", "✗".red()),
    }

    if let Some((valid, invalid)) = outcome.format_counts {
        println!("  Format check: {} valid, {} invalid", valid, invalid);
    }

    if let Some(report) = &outcome.execution {
        print_report(report);
    }

    if let Some(reason) = &outcome.publish_blocked {
        println!("  {} publishing skipped: {}", "!".yellow(), reason);
    }

    if let Some(publication) = &outcome.published {
        println!(
            "  {} published to {} (config {})",
            "✓".green(),
            publication.repo_id.cyan(),
            publication.config_name
        );
    }
}

fn spinner(verbosity: Verbosity, message: String) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

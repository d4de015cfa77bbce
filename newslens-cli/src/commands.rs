//! CLI subcommand handlers.

use crate::render::Renderer;
use crate::{Commands, ConfigAction, InputArgs, MlopsView};
use anyhow::Context;
use newslens_core::health::{HealthMonitor, HealthSnapshot, check_health};
use newslens_core::mlops::{self, AlertFilter, PipelineGraph};
use newslens_core::{
    AnalysisBackend, AnalysisSession, DashboardConfig, HttpBackend, NoOpCallback, SessionError,
    init_workspace_config,
};
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config: &DashboardConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Analyze { input, url } => {
            let text = match url {
                Some(url) => validate_url(&url)?,
                None => read_input(&input)?,
            };
            let session = one_shot_session(config)?;
            let out = run_analyze(&session, &text, input.json, &Renderer::new(&config.ui)).await?;
            print!("{out}");
            Ok(())
        }
        Commands::Summarize { input } => {
            let text = read_input(&input)?;
            let session = one_shot_session(config)?;
            let out =
                run_summarize(&session, &text, input.json, &Renderer::new(&config.ui)).await?;
            print!("{out}");
            Ok(())
        }
        Commands::Similar { input } => {
            let text = read_input(&input)?;
            let session = one_shot_session(config)?;
            let out = run_similar(&session, &text, input.json, &Renderer::new(&config.ui)).await?;
            print!("{out}");
            Ok(())
        }
        Commands::Health { watch, interval } => handle_health(config, watch, interval).await,
        Commands::Mlops { view } => {
            println!("{}", render_mlops(&Renderer::new(&config.ui), &view)?);
            Ok(())
        }
        Commands::Config { action } => handle_config(action, workspace, config).await,
    }
}

/// Build the HTTP backend described by `config`.
pub fn build_backend(config: &DashboardConfig) -> anyhow::Result<Arc<dyn AnalysisBackend>> {
    let backend = HttpBackend::new(&config.backend)
        .with_context(|| format!("Cannot use backend URL '{}'", config.backend.base_url))?;
    Ok(Arc::new(backend))
}

fn one_shot_session(config: &DashboardConfig) -> anyhow::Result<AnalysisSession> {
    Ok(AnalysisSession::new(
        build_backend(config)?,
        Arc::new(NoOpCallback),
    ))
}

/// Check an `--url` argument: it must parse and use http or https.
fn validate_url(raw: &str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .with_context(|| format!("Invalid --url '{raw}': expected an http(s) URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!(
            "Invalid --url '{raw}': scheme '{}' is not http or https",
            parsed.scheme()
        );
    }
    Ok(parsed.to_string())
}

/// Article text from the positional argument, a file, or piped stdin.
fn read_input(input: &InputArgs) -> anyhow::Result<String> {
    if let Some(text) = &input.text {
        return Ok(text.clone());
    }
    if let Some(path) = &input.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No input given. Pass TEXT, --file PATH, or pipe the article on stdin.");
    }
    let mut text = String::new();
    stdin.lock().read_to_string(&mut text)?;
    Ok(text)
}

/// Print the error panel and turn a session failure into a CLI error.
fn fail(renderer: &Renderer, session: &AnalysisSession, title: &str, err: SessionError) -> anyhow::Error {
    eprint!(
        "{}",
        renderer.session_error(title, &err, session.backend().base_url())
    );
    anyhow::anyhow!("{}", title.to_lowercase())
}

/// Analyze `text` and wait for the related-articles lookup.
pub async fn run_analyze(
    session: &AnalysisSession,
    text: &str,
    json: bool,
    renderer: &Renderer,
) -> anyhow::Result<String> {
    let result = match session.analyze(text).await {
        Ok(result) => result,
        Err(e) => return Err(fail(renderer, session, "Analysis Error", e)),
    };
    let lookup = session.wait_for_similar().await;
    let state = session.snapshot();
    let articles = state.display_articles();

    if json {
        let body = serde_json::json!({
            "analysis": result,
            "relatedArticles": articles,
            "similarStatus": lookup,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&body)?));
    }
    Ok(renderer.analysis(&result, articles, lookup))
}

pub async fn run_summarize(
    session: &AnalysisSession,
    text: &str,
    json: bool,
    renderer: &Renderer,
) -> anyhow::Result<String> {
    let summary = match session.summarize(text).await {
        Ok(summary) => summary,
        Err(e) => return Err(fail(renderer, session, "Summarization Error", e)),
    };
    if json {
        let body = serde_json::json!({ "summary": summary });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&body)?));
    }
    Ok(renderer.summary(&summary))
}

pub async fn run_similar(
    session: &AnalysisSession,
    text: &str,
    json: bool,
    renderer: &Renderer,
) -> anyhow::Result<String> {
    let (status, articles) = match session.lookup_similar(text).await {
        Ok(found) => found,
        Err(e) => return Err(fail(renderer, session, "Lookup Error", e)),
    };
    if json {
        let body = serde_json::json!({ "status": status, "articles": articles });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&body)?));
    }
    Ok(renderer.similar_lookup(status, &articles))
}

async fn handle_health(
    config: &DashboardConfig,
    watch: bool,
    interval: Option<u64>,
) -> anyhow::Result<()> {
    let renderer = Renderer::new(&config.ui);
    let backend = build_backend(config)?;

    if !watch {
        let status = check_health(backend.as_ref()).await;
        let online = status.is_online();
        println!(
            "{}",
            renderer.health(&HealthSnapshot {
                status,
                checked_at: Some(chrono::Utc::now()),
            })
        );
        if !online {
            anyhow::bail!("backend at {} is offline", config.backend.base_url);
        }
        return Ok(());
    }

    let secs = interval.unwrap_or(config.backend.health_poll_secs);
    let monitor = HealthMonitor::spawn(backend, Duration::from_secs(secs));
    let mut rx = monitor.subscribe();
    println!(
        "Watching {} every {}s (Ctrl-C to stop)",
        config.backend.base_url,
        secs.max(1)
    );
    let mut last = None;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if last.as_ref() != Some(&snapshot.status) {
                    println!("{}", renderer.health(&snapshot));
                    last = Some(snapshot.status);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Render one MLOps view. Shared by the subcommand and the `/mlops` slash command.
pub fn render_mlops(renderer: &Renderer, view: &MlopsView) -> anyhow::Result<String> {
    Ok(match view {
        MlopsView::Overview => renderer.mlops_overview(),
        MlopsView::Models => renderer.mlops_models(mlops::default_model()),
        MlopsView::Health { model } => {
            let model = match model {
                Some(name) => mlops::find_model(name)
                    .with_context(|| format!("Unknown model '{name}'. Try `newslens mlops models`."))?,
                None => mlops::default_model(),
            };
            renderer.mlops_model_health(model)
        }
        MlopsView::Alerts { filter } => {
            let filter: AlertFilter = filter.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            renderer.mlops_alerts(filter)
        }
        MlopsView::Drift => renderer.mlops_drift(),
        MlopsView::Pipeline => renderer.mlops_pipeline(&PipelineGraph::demo()),
    })
}

async fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config: &DashboardConfig,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let (config_path, created) = init_workspace_config(workspace)?;
            if created {
                println!(
                    "Created default configuration at: {}",
                    config_path.display()
                );
            } else {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
            }
            Ok(())
        }
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

//! REPL (Read-Eval-Print Loop) for interactive mode.

use crate::commands::{build_backend, render_mlops};
use crate::render::Renderer;
use crate::slash::{CommandRegistry, SlashCommand};
use newslens_core::config::config_exists;
use newslens_core::health::{HealthMonitor, HealthSnapshot, check_health};
use newslens_core::{
    ActionKind, AnalysisSession, DashboardConfig, LookupStatus, Notice, RequestPhase,
    SessionCallback, SessionError, SimilarArticle,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A session callback that prints notices and late related-article results.
pub(crate) struct CliCallback {
    renderer: Renderer,
}

impl CliCallback {
    pub(crate) fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }
}

#[async_trait::async_trait]
impl SessionCallback for CliCallback {
    async fn on_notice(&self, notice: &Notice) {
        println!("{}", self.renderer.notice(notice));
    }

    async fn on_phase_change(&self, action: ActionKind, phase: RequestPhase) {
        if phase == RequestPhase::Submitting {
            let label = match action {
                ActionKind::Analyze => "analyzing...",
                ActionKind::Summarize => "summarizing...",
                ActionKind::Similar => "looking up related articles...",
            };
            println!("{}", self.renderer.progress(label));
            let _ = io::stdout().flush();
        }
    }

    async fn on_similar_update(&self, status: LookupStatus, articles: &[SimilarArticle]) {
        if status == LookupStatus::Ready {
            print!("{}", self.renderer.related_articles(articles, status));
            let _ = io::stdout().flush();
        }
    }
}

/// Run the interactive REPL.
pub async fn run_interactive(config: DashboardConfig, workspace: PathBuf) -> anyhow::Result<()> {
    let renderer = Renderer::new(&config.ui);
    println!(
        "{}",
        renderer.banner(
            &config.backend.base_url,
            config.backend.analyze_route,
            &workspace,
            config_exists(Some(&workspace)),
        )
    );

    let backend = build_backend(&config)?;
    let callback = Arc::new(CliCallback::new(renderer.clone()));
    let session = AnalysisSession::new(Arc::clone(&backend), callback);

    // Report backend status changes while the REPL runs.
    let monitor = HealthMonitor::spawn(
        Arc::clone(&backend),
        Duration::from_secs(config.backend.health_poll_secs),
    );
    let mut health_rx = monitor.subscribe();
    let status_renderer = renderer.clone();
    let status_task = tokio::spawn(async move {
        let mut last = None;
        while health_rx.changed().await.is_ok() {
            let snapshot = health_rx.borrow_and_update().clone();
            if last.as_ref() != Some(&snapshot.status) {
                println!("{}", status_renderer.health(&snapshot));
                last = Some(snapshot.status);
            }
        }
    });

    let registry = CommandRegistry::with_defaults();
    let stdin = io::stdin();
    loop {
        print!("{}", renderer.prompt());
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).is_err() || input.is_empty() {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if !input.starts_with('/') {
            analyze(&session, input, &renderer).await;
            continue;
        }

        match registry.parse(input) {
            SlashCommand::Quit => {
                println!("Goodbye!");
                break;
            }
            SlashCommand::Help => println!("{}", registry.help_text()),
            SlashCommand::Clear => print!("\x1b[2J\x1b[H"),
            SlashCommand::Analyze(Some(text)) => analyze(&session, &text, &renderer).await,
            SlashCommand::Analyze(None) => println!("Usage: /analyze <text|url>"),
            SlashCommand::Summarize(text) => {
                let Some(text) = text.or_else(|| session.snapshot().submitted) else {
                    println!("Nothing to summarize yet. Use /summarize <text>.");
                    continue;
                };
                match session.summarize(&text).await {
                    Ok(summary) => print!("{}", renderer.summary(&summary)),
                    Err(e) => print_failure(&renderer, &session, "Summarization Error", &e),
                }
            }
            SlashCommand::Similar(text) => {
                let Some(text) = text.or_else(|| session.snapshot().submitted) else {
                    println!("Nothing to look up yet. Use /similar <text>.");
                    continue;
                };
                match session.lookup_similar(&text).await {
                    // Ready results were already printed by the callback.
                    Ok((LookupStatus::Ready, _)) => {}
                    Ok((status, articles)) => {
                        print!("{}", renderer.similar_lookup(status, &articles))
                    }
                    Err(e) => print_failure(&renderer, &session, "Lookup Error", &e),
                }
            }
            SlashCommand::Health => {
                let status = check_health(session.backend().as_ref()).await;
                println!(
                    "{}",
                    renderer.health(&HealthSnapshot {
                        status,
                        checked_at: Some(chrono::Utc::now()),
                    })
                );
            }
            SlashCommand::Mlops(view) => match render_mlops(&renderer, &view) {
                Ok(out) => println!("{out}"),
                Err(e) => println!("{}", renderer.error_line(&e.to_string())),
            },
            SlashCommand::Unknown { input, suggestion } => match suggestion {
                Some(suggestion) => {
                    println!("Unknown command: {}. Did you mean {}?", input, suggestion)
                }
                None => println!(
                    "Unknown command: {}. Type /help for available commands.",
                    input
                ),
            },
            SlashCommand::Invalid(message) => println!("{}", message),
        }
    }

    status_task.abort();
    drop(monitor);
    Ok(())
}

async fn analyze(session: &AnalysisSession, text: &str, renderer: &Renderer) {
    match session.analyze(text).await {
        Ok(result) => {
            let state = session.snapshot();
            print!(
                "{}",
                renderer.analysis(&result, state.display_articles(), state.similar_status)
            );
        }
        Err(e) => print_failure(renderer, session, "Analysis Error", &e),
    }
}

/// Client failures get the full error panel; input rejections were already
/// reported through the callback's notice.
fn print_failure(renderer: &Renderer, session: &AnalysisSession, title: &str, err: &SessionError) {
    if let SessionError::Client(_) = err {
        print!(
            "{}",
            renderer.session_error(title, err, session.backend().base_url())
        );
    }
}

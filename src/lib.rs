use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod inspector;
pub mod qa;
pub mod session;
pub mod view;

use catalog::Catalog;
use commands::{render, Command};
use config::PartscopeConfig;
use inspector::Inspector;
use qa::HttpQaClient;
use session::{Resolution, SessionController};
use view::ViewProjector;

#[derive(Debug, Parser)]
#[command(name = "partscope", about = "Inspect car parts and ask about them")]
pub struct Cli {
    /// Config file (defaults to ~/.partscope/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Question-answering endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// JSON catalog to load instead of the built-in cars
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Vehicle to start inspecting right away
    #[arg(long)]
    pub car: Option<String>,

    /// Print views as JSON, one per line
    #[arg(long)]
    pub json: bool,
}

/// Settings after merging the config file with command-line flags.
struct Settings {
    config: PartscopeConfig,
    config_path: Option<PathBuf>,
    json: bool,
}

impl Settings {
    async fn resolve(cli: Cli) -> Self {
        let mut config = config::load_config(cli.config.as_deref()).await;
        if let Some(endpoint) = cli.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(catalog) = cli.catalog {
            config.catalog_path = Some(catalog.to_string_lossy().to_string());
        }
        if let Some(car) = cli.car {
            config.default_vehicle = Some(car);
        }
        Self {
            config,
            config_path: cli.config,
            json: cli.json,
        }
    }

    async fn catalog(&self) -> error::Result<Catalog> {
        match &self.config.catalog_path {
            Some(path) => Catalog::load(Path::new(path)).await,
            None => Ok(Catalog::builtin()),
        }
    }

    async fn save(&self, inspector: &Inspector) -> error::Result<()> {
        let mut config = self.config.clone();
        if let Some(session) = inspector.session() {
            config.default_vehicle = Some(session.vehicle().id.clone());
        }
        match &self.config_path {
            Some(path) => config::save_config_to(path, &config).await,
            None => config::save_config(&config).await,
        }
    }
}

/// Run the interactive shell on stdin/stdout until `quit` or end of input.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::resolve(cli).await;
    let catalog = Arc::new(settings.catalog().await?);
    let client = Arc::new(HttpQaClient::new(settings.config.endpoint.clone()));
    let projector = ViewProjector::new(settings.config.detail_models.iter().copied());
    let mut inspector = Inspector::new(SessionController::new(catalog), projector, client);

    tracing::info!(endpoint = %settings.config.endpoint, "partscope ready");

    if let Some(car) = &settings.config.default_vehicle {
        match inspector.start_session(car) {
            Ok(()) => emit(&view_output(&inspector, settings.json)),
            Err(e) => emit(&error_output(&e.to_string(), settings.json)),
        }
    } else {
        emit(&vehicles_output(inspector.controller().catalog(), settings.json));
        if !settings.json {
            emit("Pick one with 'car <id>', or 'help'.");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(&mut inspector, &settings, &line).await {
                    Some(output) => emit(&output),
                    None => break,
                }
            }
            Some((_, resolution)) = inspector.next_resolution() => {
                if resolution != Resolution::Stale {
                    emit(&view_output(&inspector, settings.json));
                }
            }
        }
    }
    Ok(())
}

fn emit(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}

/// What to print in reply to one input line, or `None` when the shell should exit.
///
/// In JSON mode every non-empty reply is a single JSON document.
async fn handle_line(inspector: &mut Inspector, settings: &Settings, line: &str) -> Option<String> {
    let json = settings.json;
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Some(String::new()),
        Err(e) => return Some(error_output(&e.to_string(), json)),
    };

    let output = match command {
        Command::Quit => return None,
        Command::Help => help_output(json),
        Command::Cars => vehicles_output(inspector.controller().catalog(), json),
        Command::Save => match settings.save(inspector).await {
            Ok(()) => saved_output(json),
            Err(e) => error_output(&e.to_string(), json),
        },
        Command::View => view_output(inspector, json),
        ref other => match commands::apply(inspector, other) {
            Ok(()) => view_output(inspector, json),
            Err(e) => error_output(&e.to_string(), json),
        },
    };
    Some(output)
}

fn view_output(inspector: &Inspector, json: bool) -> String {
    let Some(view) = inspector.view() else {
        return error_output("No vehicle selected, try 'car <id>'", json);
    };
    if !json {
        return render::view_text(&view).trim_end().to_string();
    }
    match serde_json::to_string(&view) {
        Ok(line) => line,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode view");
            error_output("failed to encode view", json)
        }
    }
}

fn vehicles_output(catalog: &Catalog, json: bool) -> String {
    if json {
        let vehicles: Vec<_> = catalog.vehicles().collect();
        serde_json::json!({ "vehicles": vehicles }).to_string()
    } else {
        render::vehicle_list(catalog).trim_end().to_string()
    }
}

fn help_output(json: bool) -> String {
    if json {
        serde_json::json!({ "help": commands::HELP }).to_string()
    } else {
        commands::HELP.to_string()
    }
}

fn saved_output(json: bool) -> String {
    if json {
        serde_json::json!({ "saved": true }).to_string()
    } else {
        "Saved.".to_string()
    }
}

fn error_output(message: &str, json: bool) -> String {
    if json {
        serde_json::json!({ "error": message }).to_string()
    } else {
        format!("error: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    #[async_trait::async_trait]
    impl qa::QaClient for Silent {
        async fn ask(&self, _question: &str) -> qa::Answer {
            Ok(String::new())
        }
    }

    fn shell(config_path: PathBuf, json: bool) -> (Inspector, Settings) {
        let controller = SessionController::new(Arc::new(Catalog::builtin()));
        let inspector = Inspector::new(controller, ViewProjector::default(), Arc::new(Silent));
        let settings = Settings {
            config: PartscopeConfig::default(),
            config_path: Some(config_path),
            json,
        };
        (inspector, settings)
    }

    #[tokio::test]
    async fn json_mode_prints_only_json() {
        let dir = tempfile::tempdir().unwrap();
        let (mut inspector, settings) = shell(dir.path().join("config.json"), true);

        let script = [
            "cars", "help", "view", "car Gt", "part engine", "honk", "ask", "save", "back", "",
        ];
        let mut replies = Vec::new();
        for line in script {
            replies.push(handle_line(&mut inspector, &settings, line).await.unwrap());
        }

        for reply in replies.iter().filter(|r| !r.is_empty()) {
            assert_eq!(reply.lines().count(), 1, "multi-line reply: {reply}");
            serde_json::from_str::<serde_json::Value>(reply)
                .unwrap_or_else(|e| panic!("not JSON ({e}): {reply}"));
        }

        let cars: serde_json::Value = serde_json::from_str(&replies[0]).unwrap();
        assert_eq!(cars["vehicles"][1]["id"], "Gt");
        assert_eq!(replies[7], r#"{"saved":true}"#);
        assert!(replies[2].contains("\"error\""));
        assert_eq!(replies[9], "");

        let saved = config::load_config(Some(dir.path().join("config.json").as_path())).await;
        assert_eq!(saved.default_vehicle.as_deref(), Some("Gt"));

        assert_eq!(handle_line(&mut inspector, &settings, "quit").await, None);
    }

    #[tokio::test]
    async fn text_mode_prints_plain_lines() {
        let dir = tempfile::tempdir().unwrap();
        let (mut inspector, settings) = shell(dir.path().join("config.json"), false);

        let help = handle_line(&mut inspector, &settings, "help").await.unwrap();
        assert!(help.contains("quit"));

        let cars = handle_line(&mut inspector, &settings, "cars").await.unwrap();
        assert_eq!(cars.lines().count(), 3);
        assert!(cars.starts_with("Car "));

        let err = handle_line(&mut inspector, &settings, "car Beetle").await.unwrap();
        assert_eq!(err, "error: Unknown vehicle: Beetle");
    }
}

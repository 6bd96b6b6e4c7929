use std::sync::Arc;

use clap::Parser;

use toolcore::cli::{Cli, Commands, SessionsAction};
use toolcore::sandbox::Sandbox;
use toolcore::store::Store;
use toolcore::tools::{default_tools, Runner, ToolContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("toolcore starting");

    let config = toolcore::config::load_config(&cli)?;
    tracing::info!(base_dir = %config.base_dir.display(), "config loaded");

    match cli.command {
        Commands::RunTool { session, name, args } => {
            let sandbox = Arc::new(Sandbox::new(config.allowed_roots.clone()));
            let store = Arc::new(Store::new(config.base_dir.clone()));
            let runner = Runner::new(default_tools().into_iter().map(Some).collect());

            let ctx = ToolContext {
                sandbox,
                cwd: std::env::current_dir()?,
                session_id: session,
                store: Some(store),
                task_executor: None,
                task_manager: None,
                task_depth: 0,
                task_max_depth: config.task_max_depth,
                cancel: tokio_util::sync::CancellationToken::new(),
            };

            let args_json: serde_json::Value = serde_json::from_str(&args)?;
            let result = runner.run(&name, args_json, &ctx).await?;
            if result.is_error {
                eprintln!("{}", result.content);
                std::process::exit(1);
            }
            println!("{}", result.content);
        }
        Commands::Sessions { action } => {
            let store = Store::new(config.base_dir.clone());
            match action {
                SessionsAction::List { limit } => {
                    for session in store.list_sessions(limit)? {
                        println!("{session}");
                    }
                }
                SessionsAction::Show { session } => {
                    for event in store.load_events(&session)? {
                        println!("{event}");
                    }
                }
            }
        }
    }

    Ok(())
}

//! Montage CLI - layer timeline editor
//!
//! Command-line interface for editing Montage project directories.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::debug;

use montage::cli::{commands, Cli, Commands};
use montage::EditorConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Montage v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::from_env()?,
    };

    match cli.command {
        Some(cmd) => handle_command(&cli.project, &config, cmd),
        None => {
            println!("Montage v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(
    project: &std::path::Path,
    config: &EditorConfig,
    cmd: Commands,
) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::New {
            path,
            title,
            frames,
            fps,
            template,
        } => commands::create_project(&path, config, &title, frames, fps, template),
        Commands::Show { json } => commands::show(project, config, json),
        Commands::AddText { at } => commands::add_text(project, config, at),
        Commands::AddImage { media, background } => {
            commands::add_image(project, config, &media, background)
        }
        Commands::AddAudio { media } => commands::add_audio(project, config, &media),
        Commands::AddVideo { media } => commands::add_video(project, config, &media),
        Commands::Update { id, patch } => commands::update(project, config, &id, &patch),
        Commands::Delete { id } => commands::delete(project, config, &id),
        Commands::Split { id, frame } => commands::split(project, config, &id, frame),
        Commands::Reorder { from, to } => commands::reorder(project, config, from, to),
        Commands::MoveUp { id } => commands::move_layer(project, config, &id, true),
        Commands::MoveDown { id } => commands::move_layer(project, config, &id, false),
        Commands::Undo => commands::undo(project, config),
        Commands::Redo => commands::redo(project, config),
        Commands::History => commands::show_history(project, config),
        Commands::Select { id } => commands::select(project, config, id.as_deref()),
        Commands::Seek { frame } => commands::seek(project, config, frame),
        #[cfg(feature = "remote")]
        Commands::Save { composition } => tokio::runtime::Runtime::new()
            .context("starting async runtime")?
            .block_on(commands::save(project, config, composition.as_deref())),
    };

    if let Err(e) = &result {
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
    }
    Ok(result?)
}

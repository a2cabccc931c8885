//! Choicelab serve command for running the session server
//!
//! The serve command runs the choicelab server which provides:
//! - WebSocket endpoint for participants and the observer console
//! - Read-only HTTP API for health, session counts and the experiment log

use std::sync::Arc;

use anyhow::Result;
use choicelab_core::QuizProfile;
use choicelab_server::{AppState, ChoicelabServer};
use clap::Args;
use tracing::info;

use crate::config::{
    ChoicelabConfig, ConfigLoader, RawChoicelabConfig, RawExperimentConfig, RawServerConfig,
};

/// Arguments for the serve command
///
/// Every flag is optional; unset flags fall through to the environment and
/// config files.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Questions each participant answers before the final choice
    #[arg(short = 'n', long)]
    pub quiz_length: Option<usize>,

    /// Quiz-length preset (standard or extended)
    #[arg(long)]
    pub profile: Option<QuizProfile>,
}

impl ServeArgs {
    /// The command-line configuration layer
    fn overrides(&self) -> RawChoicelabConfig {
        RawChoicelabConfig {
            server: RawServerConfig {
                host: self.host.clone(),
                port: self.port,
            },
            experiment: RawExperimentConfig {
                quiz_length: self.quiz_length,
                profile: self.profile,
            },
        }
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config: ChoicelabConfig = ConfigLoader::load_with_overrides(args.overrides())?;
    run_foreground(&config).await
}

/// Run the server in the foreground
async fn run_foreground(config: &ChoicelabConfig) -> Result<()> {
    let server_config = config.server_config();
    let state = Arc::new(AppState::with_config(config.experiment_config()?));

    info!(
        "Starting choicelab server on {} ({} profile, {} questions)",
        server_config.addr(),
        config.experiment.profile,
        config.experiment.quiz_length
    );

    let server = ChoicelabServer::with_state(server_config, state);
    server.run().await.map_err(Into::into)
}

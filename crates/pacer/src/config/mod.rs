use std::sync::Arc;

use pacer_broker::{BrokerConfig, KafkaPublisher};
use pacer_core::emitter::{Emitter, EmitterConfig};
use pacer_core::error::PacerBuildError;
use pacer_server::{Server, ServerConfig};

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Deserialize, Debug)]
pub struct PacerMetadataConfig {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PacerConfig {
    pub metadata: Option<PacerMetadataConfig>,
    pub emitter: Option<EmitterConfig>,
    pub broker: BrokerConfig,
    pub server: ServerConfig,
}

impl PacerConfig {
    pub async fn start(self) -> Result<(), PacerBuildError> {
        //the broker must be reachable before the server starts accepting
        //connections. a failed probe is fatal to startup.
        debug!("building kafka publisher ...");
        let publisher = KafkaPublisher::try_build(&self.broker).await?;

        debug!("spawning telemetry emitter ...");
        let cancel_token = CancellationToken::new();
        let emitter = Emitter::spawn(
            &self.emitter.unwrap_or_default(),
            Arc::new(publisher),
            cancel_token.clone(),
        );

        debug!("building server ...");
        let server = Server::try_build(&self.server, emitter.handle()).await?;

        let shutdown_token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received ctrl-c, shutting down");
                shutdown_token.cancel();
            }
        });

        //the emitter handle resolves once the cancellation token fires
        tokio::select! {
            _ = emitter.join_handle => {},
            _ = server.handle => {},
        }

        Ok(())
    }
}

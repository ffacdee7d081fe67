//!The telemetry emitter actor.
//!
//!All mutable emitter state (the running flag, the lifetime tick counter and
//!the timer) lives inside a single spawned task driven by a command channel,
//!so concurrent start/stop requests from different connections are serialized
//!and at most one timer is ever active.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::publish::{PublishFailure, ReadingPublisher};
use crate::reading::Reading;

pub const DEFAULT_PERIOD_MS: u64 = 2000;
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EmitterConfig {
    pub period_ms: Option<u64>,
    pub channel_size: Option<usize>,
}

#[derive(Debug)]
enum EmitterCmd {
    Start,
    Stop,
}

///Returned from `start`/`stop` when the emitter task is gone.
pub struct EmitterClosed;

impl fmt::Debug for EmitterClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmitterClosed: the emitter task has shut down")
    }
}

///Cloneable control surface for the emitter. This is all callers get: start,
///stop, and the two broadcast channels.
#[derive(Clone)]
pub struct EmitterHandle {
    cmd_tx: mpsc::Sender<EmitterCmd>,
    readings_tx: broadcast::Sender<Reading>,
    errors_tx: broadcast::Sender<PublishFailure>,
}

impl EmitterHandle {
    ///Begin emission. No-op if the emitter is already running.
    pub async fn start(&self) -> Result<(), EmitterClosed> {
        self.cmd_tx
            .send(EmitterCmd::Start)
            .await
            .map_err(|_| EmitterClosed)
    }

    ///Halt emission. No-op if the emitter is not running. The tick counter is
    ///not reset.
    pub async fn stop(&self) -> Result<(), EmitterClosed> {
        self.cmd_tx
            .send(EmitterCmd::Stop)
            .await
            .map_err(|_| EmitterClosed)
    }

    ///Subscribe to the live reading broadcast, one reading per tick.
    pub fn subscribe(&self) -> broadcast::Receiver<Reading> {
        self.readings_tx.subscribe()
    }

    ///Subscribe to publish failure events from the detached publish tasks.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<PublishFailure> {
        self.errors_tx.subscribe()
    }
}

pub struct Emitter {
    pub join_handle: JoinHandle<()>,
    handle: EmitterHandle,
}

impl Emitter {
    pub fn spawn(
        cfg: &EmitterConfig,
        publisher: Arc<dyn ReadingPublisher>,
        cancel_token: CancellationToken,
    ) -> Emitter {
        let period_ms = cfg.period_ms.unwrap_or(DEFAULT_PERIOD_MS);
        let channel_size = cfg.channel_size.unwrap_or(DEFAULT_CHANNEL_SIZE);

        let (cmd_tx, mut cmd_rx) = mpsc::channel(channel_size);
        let (readings_tx, _) = broadcast::channel(channel_size);
        let (errors_tx, _) = broadcast::channel(channel_size);

        let tick_readings_tx = readings_tx.clone();
        let tick_errors_tx = errors_tx.clone();
        let emitter_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(period_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut running = false;
            let mut tick_count: u64 = 0;
            let mut rng = StdRng::from_entropy();

            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(EmitterCmd::Start) => {
                                if !running {
                                    running = true;
                                    //first tick fires one full period from now
                                    interval.reset();
                                    info!("telemetry emitter started");
                                }
                            }
                            Some(EmitterCmd::Stop) => {
                                if running {
                                    running = false;
                                    info!("telemetry emitter stopped after {} ticks", tick_count);
                                }
                            }
                            None => break,
                        }
                    }
                    _ = interval.tick(), if running => {
                        tick_count += 1;
                        let reading = Reading::generate(tick_count, &mut rng);
                        debug!("tick {}: generated reading for {}", tick_count, reading.device_id);

                        //live observers get the reading immediately. zero receivers is fine.
                        let _ = tick_readings_tx.send(reading.clone());

                        //fire-and-forget publish. a failure never delays the next tick.
                        let publisher = publisher.clone();
                        let errors_tx = tick_errors_tx.clone();
                        let tick = tick_count;
                        tokio::spawn(async move {
                            if let Err(error) = publisher.publish(reading).await {
                                warn!("failed to publish reading for tick {}: {}", tick, error);
                                let _ = errors_tx.send(PublishFailure { tick, error });
                            }
                        });
                    }
                }
            }
            debug!("telemetry emitter is done!");
        });

        let join_handle = tokio::spawn(async move {
            cancel_token.cancelled().await;
            debug!("shutting down telemetry emitter task!");
            emitter_task.abort();
        });

        Emitter {
            join_handle,
            handle: EmitterHandle {
                cmd_tx,
                readings_tx,
                errors_tx,
            },
        }
    }

    pub fn handle(&self) -> EmitterHandle {
        self.handle.clone()
    }
}

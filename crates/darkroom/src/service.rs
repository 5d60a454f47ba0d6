//! The service facade: every boundary operation in one place.
//!
//! Transports (HTTP routes, websocket-style connections) stay outside
//! this crate; they validate nothing themselves. Each handler here takes
//! the raw request shape, validates it into a command, and runs it
//! through the lifecycle, auth, sweep, and relay layers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use darkroom_auth::{AccessToken, AuthError, TokenBroker};
use darkroom_protocol::{
    decode_frame, ClientFrame, CreateRequest, DestroyRequest, LoginRequest,
    MessageKey, SendMessageRequest, SubscribeRequest,
};
use darkroom_relay::{PushSender, Relay, Subscription};
use darkroom_room::{now_millis, RoomManager};
use darkroom_store::RoomStore;
use darkroom_sweep::{SweepConfig, SweepHandle, SweepReport, Sweeper};

use crate::error::DarkroomError;
use crate::maintenance::MaintenanceLog;

/// Builds a [`Darkroom`] service.
pub struct DarkroomBuilder<S, B> {
    store: Arc<S>,
    broker: B,
    secret: String,
    sweep: SweepConfig,
    maintenance: Option<MaintenanceLog>,
}

impl<S: RoomStore, B: TokenBroker> DarkroomBuilder<S, B> {
    pub fn new(store: Arc<S>, broker: B, secret: impl Into<String>) -> Self {
        Self {
            store,
            broker,
            secret: secret.into(),
            sweep: SweepConfig::default(),
            maintenance: None,
        }
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep.interval = interval;
        self
    }

    /// Enables the maintenance rate limit. Without it,
    /// [`Darkroom::cleanup_database`] runs unthrottled.
    pub fn with_maintenance_log(mut self, log: MaintenanceLog) -> Self {
        self.maintenance = Some(log);
        self
    }

    pub fn build(self) -> Darkroom<S, B> {
        let rooms = Arc::new(RoomManager::new(Arc::clone(&self.store), self.secret));
        let sweeper = Arc::new(Sweeper::new(Arc::clone(&rooms), self.sweep));
        Darkroom {
            relay: Relay::new(self.store),
            rooms,
            broker: self.broker,
            sweeper,
            maintenance: self.maintenance,
        }
    }
}

/// What a well-formed realtime frame produced.
#[derive(Debug)]
pub enum FrameOutcome {
    /// The connection is now subscribed to a room.
    Subscribed(Subscription),
    /// A message was appended under this key.
    Accepted(MessageKey),
}

/// What a [`Darkroom::cleanup_database`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The rate limit said no; nothing ran.
    NotDue,
    /// A sweep pass ran.
    Swept(SweepReport),
}

/// The assembled service.
pub struct Darkroom<S, B> {
    rooms: Arc<RoomManager<S>>,
    relay: Relay<S>,
    broker: B,
    sweeper: Arc<Sweeper<S>>,
    maintenance: Option<MaintenanceLog>,
}

impl<S: RoomStore, B: TokenBroker> Darkroom<S, B> {
    pub fn builder(store: Arc<S>, broker: B, secret: impl Into<String>) -> DarkroomBuilder<S, B> {
        DarkroomBuilder::new(store, broker, secret)
    }

    /// Creates a room and mints its bearer token.
    pub async fn create_room(
        &self,
        request: CreateRequest,
    ) -> Result<AccessToken, DarkroomError> {
        let cmd = request.validate()?;
        let code = cmd.code.clone();
        self.rooms.create(cmd).await?;
        Ok(self.broker.issue(&code).await?)
    }

    /// Re-enters an existing room and mints a fresh token for the
    /// caller. Expired rooms are destroyed on the way.
    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> Result<AccessToken, DarkroomError> {
        let cmd = request.validate()?;
        self.rooms.login(&cmd.code).await?;
        Ok(self.broker.issue(&cmd.code).await?)
    }

    /// Destroys a room. The token must have been issued for exactly
    /// this room; every token for it dies with it. Destroying a room
    /// that is already gone still succeeds.
    pub async fn destroy_room(
        &self,
        request: DestroyRequest,
    ) -> Result<(), DarkroomError> {
        let cmd = request.validate()?;
        let bound_to = self.broker.verify(&cmd.auth_token).await?;
        if bound_to != cmd.code {
            warn!(room = %cmd.code, "destroy refused: token bound to another room");
            return Err(AuthError::InvalidToken.into());
        }
        self.rooms.destroy(&cmd.code).await?;
        self.broker.revoke(&cmd.code).await?;
        Ok(())
    }

    /// Appends a message through the integrity and expiry checks.
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<MessageKey, DarkroomError> {
        let cmd = request.validate()?;
        Ok(self.rooms.append_message(cmd).await?)
    }

    /// Starts streaming a room to `out`. Subscribing counts as
    /// activity; subscribing to an absent room delivers the destroy
    /// push immediately.
    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
        out: &PushSender,
    ) -> Result<Subscription, DarkroomError> {
        let cmd = request.validate()?;
        self.rooms.store().touch(&cmd.code, now_millis()).await?;
        Ok(self.relay.subscribe(&cmd.code, out.clone()).await?)
    }

    /// Dispatches one raw realtime frame.
    ///
    /// # Errors
    /// A frame that does not decode is an error the transport should
    /// answer with the generic rejection push and a closed connection.
    pub async fn handle_frame(
        &self,
        raw: &[u8],
        out: &PushSender,
    ) -> Result<FrameOutcome, DarkroomError> {
        let frame = decode_frame(raw).inspect_err(|error| {
            warn!(%error, "dropping unparsable frame, possible injection attempt");
        })?;
        match frame {
            ClientFrame::StartDataListener(request) => {
                let subscription = self.subscribe(request, out).await?;
                Ok(FrameOutcome::Subscribed(subscription))
            }
            ClientFrame::SendMessage(request) => {
                let key = self.send_message(request).await?;
                Ok(FrameOutcome::Accepted(key))
            }
        }
    }

    /// Starts the background sweep loop.
    pub fn start_sweeper(&self) -> SweepHandle {
        self.sweeper.spawn()
    }

    /// Runs one sweep pass now, through the same single-flight gate the
    /// loop uses.
    pub async fn run_sweep(&self) -> SweepReport {
        self.sweeper.run_pass().await
    }

    /// Maintenance entry point. Rate-limited through the configured
    /// [`MaintenanceLog`]; callers can invoke it as often as they like.
    /// A pass bounced by the single-flight gate is not recorded — the
    /// window stays open until a pass actually runs.
    pub async fn cleanup_database(&self) -> Result<CleanupOutcome, DarkroomError> {
        let now = now_millis();
        if let Some(log) = &self.maintenance {
            if !log.due(now).await? {
                return Ok(CleanupOutcome::NotDue);
            }
        }
        let report = self.sweeper.run_pass().await;
        if report.skipped {
            return Ok(CleanupOutcome::Swept(report));
        }
        info!(
            evaluated = report.evaluated,
            destroyed = report.destroyed,
            failed = report.failed,
            "maintenance sweep finished"
        );
        if let Some(log) = &self.maintenance {
            log.record(now).await?;
        }
        Ok(CleanupOutcome::Swept(report))
    }

    pub fn rooms(&self) -> &Arc<RoomManager<S>> {
        &self.rooms
    }
}

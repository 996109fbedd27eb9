//! The running availability channel.

use std::collections::BTreeSet;
use std::time::Duration;

use availability::{AvailabilityDelta, ClientFrame, ServerMessage};
use chrono::{DateTime, Utc};
use common::{RouteCode, SailingId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::backoff::ReconnectPolicy;
use crate::error::ChannelError;
use crate::state::{ChannelStatus, ConnectionState};
use crate::transport::{Connection, Transport};

/// Channel tuning knobs.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub reconnect: ReconnectPolicy,
    /// Interval between keepalive probes while connected.
    pub keepalive_interval: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            keepalive_interval: Duration::from_secs(30),
        }
    }
}

/// One normalized inventory change, delivered to the consumer.
///
/// The wire spelling variants and event-level source field are already
/// folded in; this is the only shape the reconciling side ever sees.
#[derive(Debug, Clone)]
pub struct DeltaNotification {
    pub sailing_id: SailingId,
    pub route: RouteCode,
    pub delta: AvailabilityDelta,
    pub updated_at: DateTime<Utc>,
}

enum Command {
    SetRoutes(Vec<RouteCode>),
    Shutdown,
}

enum Disconnect {
    Shutdown,
    Lost(Option<String>),
}

/// Handle to the availability push channel.
///
/// The channel runs as a background task that owns the connection, the
/// subscription interest set, reconnection, and keepalive. Errors are
/// recorded in the published [`ChannelStatus`], never returned to the
/// consumer. Dropping the handle aborts the task, which also cancels any
/// pending backoff sleep or keepalive timer.
pub struct AvailabilityChannel {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ChannelStatus>,
    task: Option<JoinHandle<()>>,
}

impl AvailabilityChannel {
    /// Starts the channel, scoped to the given routes (empty = all routes).
    ///
    /// Returns the handle and the stream of normalized delta notifications.
    pub fn connect<T: Transport>(
        transport: T,
        routes: Vec<RouteCode>,
        config: ChannelConfig,
    ) -> (Self, mpsc::Receiver<DeltaNotification>) {
        let (events_tx, events_rx) = mpsc::channel(256);
        let (status_tx, status_rx) = watch::channel(ChannelStatus::default());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let interest: BTreeSet<RouteCode> = routes.into_iter().collect();

        let task = tokio::spawn(run(
            transport,
            interest,
            config,
            status_tx,
            events_tx,
            commands_rx,
        ));

        (
            Self {
                commands: commands_tx,
                status: status_rx,
                task: Some(task),
            },
            events_rx,
        )
    }

    /// Returns the current connection status.
    pub fn status(&self) -> ChannelStatus {
        self.status.borrow().clone()
    }

    /// Returns a watch receiver for awaiting status changes.
    pub fn watch_status(&self) -> watch::Receiver<ChannelStatus> {
        self.status.clone()
    }

    /// Replaces the route interest set.
    ///
    /// While connected, only the difference against the current set is
    /// (un)subscribed, so recomputing the same list on every render sends
    /// nothing.
    pub fn set_routes(&self, routes: Vec<RouteCode>) {
        let _ = self.commands.send(Command::SetRoutes(routes));
    }

    /// Shuts the channel down and waits for the task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for AvailabilityChannel {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

fn set_state(status: &watch::Sender<ChannelStatus>, state: ConnectionState) {
    status.send_modify(|s| s.state = state);
}

fn record_error(status: &watch::Sender<ChannelStatus>, error: String) {
    tracing::warn!(%error, "availability channel error");
    status.send_modify(|s| s.last_error = Some(error));
}

async fn run<T: Transport>(
    transport: T,
    mut interest: BTreeSet<RouteCode>,
    config: ChannelConfig,
    status: watch::Sender<ChannelStatus>,
    events: mpsc::Sender<DeltaNotification>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut failed_attempts: u32 = 0;

    loop {
        set_state(&status, ConnectionState::Connecting);
        let filter: Vec<RouteCode> = interest.iter().cloned().collect();

        match transport.connect(&filter).await {
            Ok(mut conn) => {
                failed_attempts = 0;
                status.send_modify(|s| {
                    s.state = ConnectionState::Open;
                    s.last_error = None;
                });
                tracing::info!(routes = filter.len(), "availability channel connected");

                let reason = drive(
                    &mut conn,
                    &mut interest,
                    &config,
                    &status,
                    &events,
                    &mut commands,
                )
                .await;
                conn.close().await;

                match reason {
                    Disconnect::Shutdown => {
                        set_state(&status, ConnectionState::Closed);
                        tracing::info!("availability channel shut down");
                        return;
                    }
                    Disconnect::Lost(error) => {
                        record_error(
                            &status,
                            error.unwrap_or_else(|| "connection lost".to_string()),
                        );
                    }
                }
            }
            Err(e) => record_error(&status, e.to_string()),
        }

        failed_attempts += 1;
        metrics::counter!("channel_reconnect_attempts").increment(1);

        if !config.reconnect.allows_attempt(failed_attempts) {
            tracing::warn!(
                attempts = failed_attempts,
                "reconnect attempts exhausted, closing channel"
            );
            set_state(&status, ConnectionState::Closed);
            return;
        }

        set_state(&status, ConnectionState::Backoff(failed_attempts));
        let delay = config.reconnect.delay_for_attempt(failed_attempts);
        tracing::info!(attempt = failed_attempts, ?delay, "reconnecting after backoff");

        let sleep = time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => break,
                command = commands.recv() => match command {
                    // Applied on the next connect; nothing to send while down.
                    Some(Command::SetRoutes(routes)) => {
                        interest = routes.into_iter().collect();
                    }
                    Some(Command::Shutdown) | None => {
                        set_state(&status, ConnectionState::Closed);
                        return;
                    }
                },
            }
        }
    }
}

async fn drive<C: Connection>(
    conn: &mut C,
    interest: &mut BTreeSet<RouteCode>,
    config: &ChannelConfig,
    status: &watch::Sender<ChannelStatus>,
    events: &mpsc::Sender<DeltaNotification>,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> Disconnect {
    if !interest.is_empty() {
        let routes: Vec<RouteCode> = interest.iter().cloned().collect();
        if let Err(e) = conn.send(&ClientFrame::Subscribe { routes }).await {
            return Disconnect::Lost(Some(e.to_string()));
        }
    }

    let mut keepalive = time::interval_at(
        time::Instant::now() + config.keepalive_interval,
        config.keepalive_interval,
    );
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            message = conn.next_message() => match message {
                None => return Disconnect::Lost(None),
                Some(Err(e)) if e.is_malformed() => {
                    tracing::warn!(error = %e, "dropping malformed channel message");
                    metrics::counter!("channel_malformed_messages").increment(1);
                }
                Some(Err(e)) => return Disconnect::Lost(Some(e.to_string())),
                Some(Ok(message)) => {
                    if handle_message(message, status, events).await.is_err() {
                        // Consumer dropped the notification stream.
                        return Disconnect::Shutdown;
                    }
                }
            },
            _ = keepalive.tick() => {
                if let Err(e) = conn.send(&ClientFrame::Ping).await {
                    return Disconnect::Lost(Some(e.to_string()));
                }
            }
            command = commands.recv() => match command {
                Some(Command::SetRoutes(routes)) => {
                    let desired: BTreeSet<RouteCode> = routes.into_iter().collect();
                    if let Err(e) = send_subscription_diff(conn, interest, &desired).await {
                        return Disconnect::Lost(Some(e.to_string()));
                    }
                    *interest = desired;
                }
                Some(Command::Shutdown) | None => return Disconnect::Shutdown,
            },
        }
    }
}

async fn handle_message(
    message: ServerMessage,
    status: &watch::Sender<ChannelStatus>,
    events: &mpsc::Sender<DeltaNotification>,
) -> Result<(), ()> {
    match message {
        ServerMessage::Connected => tracing::debug!("server acknowledged connection"),
        ServerMessage::Subscribed { routes } => {
            tracing::debug!(count = routes.len(), "subscription acknowledged");
            status.send_modify(|s| s.state = ConnectionState::Subscribed);
        }
        ServerMessage::Pong => tracing::trace!("keepalive pong"),
        ServerMessage::Error { message } => {
            tracing::warn!(%message, "server reported channel error");
            status.send_modify(|s| s.last_error = Some(message));
        }
        ServerMessage::AvailabilityUpdate { data } => {
            let route = data.route.clone();
            let updated_at = data.updated_at;
            let (sailing_id, delta) = data.into_canonical();
            metrics::counter!("channel_deltas_received").increment(1);

            let notification = DeltaNotification {
                sailing_id,
                route,
                delta,
                updated_at,
            };
            if events.send(notification).await.is_err() {
                return Err(());
            }
        }
    }
    Ok(())
}

/// Sends only the difference between the current and desired route sets.
async fn send_subscription_diff<C: Connection>(
    conn: &mut C,
    current: &BTreeSet<RouteCode>,
    desired: &BTreeSet<RouteCode>,
) -> Result<(), ChannelError> {
    let added: Vec<RouteCode> = desired.difference(current).cloned().collect();
    let removed: Vec<RouteCode> = current.difference(desired).cloned().collect();

    if !removed.is_empty() {
        conn.send(&ClientFrame::Unsubscribe { routes: removed })
            .await?;
    }
    if !added.is_empty() {
        conn.send(&ClientFrame::Subscribe { routes: added }).await?;
    }
    Ok(())
}

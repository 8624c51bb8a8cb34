//! JSON-RPC Server
//!
//! Serves queue methods over HTTP/WebSocket on a TCP socket. The change feed
//! (`queue.subscribe.v1`) needs a WebSocket connection.

use crate::handler::RpcHandler;
use crate::types::{
    CreateQueueRequest, JoinRequest, ListActiveRequest, MemberRequest, MentorNoteRequest,
    PositionRequest, QueueRequest, RegisterTeamRequest, SetStatusRequest, StatsRequest,
    SubscribeRequest,
};
use jsonrpsee::core::SubscriptionResult;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::Params;
use jsonrpsee::{PendingSubscriptionSink, RpcModule, SubscriptionMessage};
use mentorq_core::application::QueueCoordinator;
use mentorq_core::port::BroadcastNotifier;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// Notification method name used by the change feed
pub const QUEUE_CHANGED_NOTIFICATION: &str = "queue.changed";

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
    notifier: Arc<BroadcastNotifier>,
}

/// Register a request/response method that parses `$req` and calls `$method`
macro_rules! register {
    ($module:expr, $handler:expr, $name:literal, $req:ty, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$method(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        coordinator: Arc<QueueCoordinator>,
        notifier: Arc<BroadcastNotifier>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(coordinator)),
            notifier,
        }
    }

    /// Build the method table (also used by tests without a socket)
    pub fn into_module(self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let handler = self.handler;

        register!(module, handler, "team.register.v1", RegisterTeamRequest, register_team);
        register!(module, handler, "queue.create.v1", CreateQueueRequest, create_queue);
        register!(module, handler, "queue.join.v1", JoinRequest, join);
        register!(module, handler, "queue.approve.v1", MemberRequest, approve);
        register!(module, handler, "queue.reject.v1", MemberRequest, reject);
        register!(module, handler, "queue.leave.v1", MemberRequest, leave);
        register!(module, handler, "queue.advance.v1", QueueRequest, advance);
        register!(module, handler, "queue.status.v1", SetStatusRequest, set_status);
        register!(module, handler, "queue.mentor_note.v1", MentorNoteRequest, set_mentor_note);
        register!(module, handler, "queue.get.v1", QueueRequest, snapshot);
        register!(module, handler, "queue.position.v1", PositionRequest, position);
        register!(module, handler, "queue.stats.v1", StatsRequest, stats);
        register!(module, handler, "queue.list_active.v1", ListActiveRequest, list_active);

        let notifier = self.notifier;
        module
            .register_subscription(
                "queue.subscribe.v1",
                QUEUE_CHANGED_NOTIFICATION,
                "queue.unsubscribe.v1",
                move |params, pending, _, _| forward_changes(params, pending, notifier.clone()),
            )
            .map_err(|e| e.to_string())?;

        Ok(module)
    }

    /// Start the JSON-RPC server. Returns the bound address with the handle
    /// (port 0 picks a free port).
    pub async fn start(self) -> Result<(ServerHandle, SocketAddr), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.into_module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((handle, local_addr))
    }
}

/// Push `queue.changed` notifications to one subscriber until it goes away
async fn forward_changes(
    params: Params<'static>,
    pending: PendingSubscriptionSink,
    notifier: Arc<BroadcastNotifier>,
) -> SubscriptionResult {
    let req: SubscribeRequest = if params.is_object() {
        match params.parse() {
            Ok(req) => req,
            Err(e) => {
                pending.reject(e).await;
                return Ok(());
            }
        }
    } else {
        SubscribeRequest::default()
    };

    // Subscribe before accepting so nothing between the two is missed
    let mut rx = notifier.subscribe();
    let sink = pending.accept().await?;
    debug!(queue_id = ?req.queue_id, "Change feed subscriber attached");

    loop {
        tokio::select! {
            _ = sink.closed() => break,
            event = rx.recv() => match event {
                Ok(event) => {
                    if req.queue_id.as_ref().is_some_and(|id| *id != event.queue_id) {
                        continue;
                    }
                    let msg = SubscriptionMessage::from_json(&event)?;
                    if sink.send(msg).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Subscriber must refetch the snapshot to resync
                    warn!(skipped, "Change feed subscriber fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!(queue_id = ?req.queue_id, "Change feed subscriber detached");
    Ok(())
}

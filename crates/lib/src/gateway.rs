//! Gateway HTTP server: health endpoint and the bot webhook.
//!
//! `POST /api/messages` takes one activity per request. Message activities run
//! a dispatch turn and the reply is delivered through the connector; member
//! joins trigger the greeting. A failed turn sends no reply.

use crate::channels::{
    Activity, ConnectorClient, ACTIVITY_CONVERSATION_UPDATE, ACTIVITY_MESSAGE,
};
use crate::clients::{IntentClient, KnowledgeClient, SchedulerClient};
use crate::config::{self, Config};
use crate::dispatch::Dispatcher;
use crate::greeting;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Dispatcher over the configured HTTP backends.
pub type HttpDispatcher = Dispatcher<KnowledgeClient, IntentClient, SchedulerClient>;

/// Shared state for the gateway (config, dispatcher, connector).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<HttpDispatcher>,
    pub connector: ConnectorClient,
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value.ok_or_else(|| {
        anyhow::anyhow!("{} is not configured; run `denti init` and edit config.json", name)
    })
}

/// Build the dispatcher from config. The three clients are constructed once
/// with their settings injected; nothing else reads the config afterwards.
pub fn build_dispatcher(config: &Config) -> Result<HttpDispatcher> {
    let knowledge = KnowledgeClient::new(
        required(config.knowledge.host(), "knowledge.host")?,
        required(config::resolve_knowledge_key(config), "knowledge.key")?,
        required(config.knowledge.project(), "knowledge.project")?,
    );
    let intent = IntentClient::new(
        required(config.intent.host(), "intent.host")?,
        required(config::resolve_intent_key(config), "intent.key")?,
        required(config.intent.project(), "intent.project")?,
        config.intent.deployment(),
    );
    let scheduler = SchedulerClient::new(required(
        config.scheduler.base_url(),
        "scheduler.baseUrl",
    )?);
    Ok(Dispatcher::new(knowledge, intent, scheduler))
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/messages", post(messages))
        .with_state(state)
}

async fn health(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.config.gateway.port,
    }))
}

async fn messages(State(state): State<GatewayState>, Json(activity): Json<Activity>) -> StatusCode {
    match activity.activity_type.as_str() {
        ACTIVITY_MESSAGE => handle_message_activity(&state, &activity).await,
        ACTIVITY_CONVERSATION_UPDATE => handle_member_join(&state, &activity).await,
        other => {
            log::debug!("gateway: ignoring activity type {}", other);
            StatusCode::OK
        }
    }
}

async fn handle_message_activity(state: &GatewayState, activity: &Activity) -> StatusCode {
    let Some(utterance) = activity.utterance() else {
        log::debug!("gateway: message activity without text");
        return StatusCode::OK;
    };
    let reply = match state.dispatcher.handle_message(utterance).await {
        Ok(reply) => reply,
        Err(e) => {
            log::error!("gateway: dispatch failed: {}", e);
            return StatusCode::BAD_GATEWAY;
        }
    };
    match deliver(state, activity, &reply).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            log::error!("gateway: reply delivery failed: {}", e);
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn handle_member_join(state: &GatewayState, activity: &Activity) -> StatusCode {
    let members = activity.members_added.as_deref().unwrap_or(&[]);
    for member in greeting::welcome_targets(members, activity.recipient_id()) {
        if let Err(e) = deliver(state, activity, greeting::WELCOME_TEXT).await {
            log::warn!("gateway: greeting {:?} failed: {}", member.id, e);
        }
    }
    StatusCode::OK
}

/// Send one text reply to the conversation the activity came from.
async fn deliver(state: &GatewayState, activity: &Activity, text: &str) -> Result<()> {
    let service_url = activity
        .service_url
        .as_deref()
        .context("activity has no serviceUrl")?;
    let conversation_id = activity
        .conversation_id()
        .context("activity has no conversation id")?;
    state
        .connector
        .send_text(service_url, conversation_id, text, activity.id.as_deref())
        .await?;
    Ok(())
}

/// Run the gateway until the process is stopped.
pub async fn run_gateway(config: Config) -> Result<()> {
    let dispatcher = Arc::new(build_dispatcher(&config)?);
    let state = GatewayState {
        config: Arc::new(config),
        dispatcher,
        connector: ConnectorClient::new(),
    };
    let addr = format!("{}:{}", state.config.gateway.bind, state.config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding gateway listener on {}", addr))?;
    log::info!("gateway: listening on {}", addr);
    axum::serve(listener, router(state))
        .await
        .context("serving gateway")?;
    Ok(())
}

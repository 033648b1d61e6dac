//! Session-scoped state. Each session owns its candidate store and its
//! clusterer; nothing is shared across sessions.
//!
//! A session is an `Arc<Mutex<Session>>`. Handlers hold the lock for the whole
//! request, including embedding calls, so uploads and rankings within one
//! session are serialized while different sessions run in parallel.

pub mod store;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::clustering::clusterer::Clusterer;
use crate::errors::AppError;
use crate::session::store::CandidateStore;

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION_ID: &str = "default";
const MAX_SESSION_ID_LEN: usize = 128;

pub struct Session {
    pub store: CandidateStore,
    pub clusterer: Clusterer,
}

impl Session {
    pub fn new(cluster_count: usize) -> Self {
        Self {
            store: CandidateStore::new(),
            clusterer: Clusterer::new(cluster_count),
        }
    }
}

struct SessionSlot {
    session: Arc<Mutex<Session>>,
    last_access: Instant,
}

/// Owns every live session. Sessions are created on first use and evicted
/// after `ttl` without access.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionSlot>>>,
    cluster_count: usize,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(cluster_count: usize, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cluster_count,
            ttl,
        }
    }

    /// Returns the session for `id`, creating it if needed, and marks it as accessed.
    pub async fn session(&self, id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let slot = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!("Creating session {id}");
            SessionSlot {
                session: Arc::new(Mutex::new(Session::new(self.cluster_count))),
                last_access: now,
            }
        });
        slot.last_access = now;
        Arc::clone(&slot.session)
    }

    /// Drops sessions idle for longer than the TTL. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, slot| slot.last_access.elapsed() <= ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Runs [`Self::evict_expired`] every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = registry.evict_expired().await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle session(s)");
                }
            }
        })
    }
}

/// Session key from the `x-session-id` header, or [`DEFAULT_SESSION_ID`] when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(SESSION_HEADER) else {
            return Ok(SessionId(DEFAULT_SESSION_ID.to_string()));
        };

        let id = value
            .to_str()
            .map_err(|_| AppError::Validation(format!("{SESSION_HEADER} must be ASCII")))?
            .trim();
        if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
            return Err(AppError::Validation(format!(
                "{SESSION_HEADER} must be 1-{MAX_SESSION_ID_LEN} characters"
            )));
        }
        Ok(SessionId(id.to_string()))
    }
}

//! The software token and its session pool

use std::sync::Arc;

use parking_lot::Mutex;
use tokencipher_api::{
    BackendError, BackendResult, BlockSession, CipherAlgorithm, Mechanism, Mode, SecretKey,
    SessionId, Token,
};
use tracing::{debug, instrument, warn};

use crate::config::SoftTokenConfig;
use crate::key::SoftKey;
use crate::session::SoftSession;

/// Session call at which an injected fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `BlockSession::init`
    Init,
    /// `BlockSession::update`
    Update,
    /// `BlockSession::finalize`
    Finalize,
}

/// State shared between the token and every session it created
pub(crate) struct TokenContext {
    config: SoftTokenConfig,
    fault: Mutex<Option<(FaultPoint, BackendError)>>,
}

impl TokenContext {
    pub(crate) fn config(&self) -> &SoftTokenConfig {
        &self.config
    }

    /// Consume the pending fault if it targets `point`
    pub(crate) fn take_fault(&self, point: FaultPoint) -> Option<BackendError> {
        let mut slot = self.fault.lock();
        match slot.take() {
            Some((at, error)) if at == point => {
                debug!(?point, %error, "injecting fault");
                Some(error)
            }
            other => {
                *slot = other;
                None
            }
        }
    }
}

#[derive(Default)]
struct Pool {
    idle: Vec<SoftSession>,
    open: usize,
    next_id: SessionId,
}

/// An in-process token implementing AES, DESede and ARCFOUR mechanisms
///
/// Sessions are pooled: a released session is handed out again by the next
/// `acquire_session`, and at most `max_sessions` exist at any time.
pub struct SoftToken {
    context: Arc<TokenContext>,
    pool: Mutex<Pool>,
}

impl SoftToken {
    pub fn new(config: SoftTokenConfig) -> Self {
        debug!(
            label = %config.label,
            max_sessions = config.max_sessions,
            native_padding = config.native_padding,
            can_cancel = config.can_cancel,
            "creating soft token"
        );
        Self {
            context: Arc::new(TokenContext {
                config,
                fault: Mutex::new(None),
            }),
            pool: Mutex::new(Pool {
                next_id: 1,
                ..Pool::default()
            }),
        }
    }

    pub fn config(&self) -> &SoftTokenConfig {
        &self.context.config
    }

    /// Sessions currently in existence, idle or in use
    pub fn open_sessions(&self) -> usize {
        self.pool.lock().open
    }

    /// Sessions waiting in the pool
    pub fn idle_sessions(&self) -> usize {
        self.pool.lock().idle.len()
    }

    /// Make the next session call at `point` fail with `error`
    ///
    /// The fault fires once. A later injection replaces an unfired one.
    pub fn inject_fault(&self, point: FaultPoint, error: BackendError) {
        *self.context.fault.lock() = Some((point, error));
    }
}

impl Default for SoftToken {
    fn default() -> Self {
        Self::new(SoftTokenConfig::default())
    }
}

impl Token for SoftToken {
    type Key = SoftKey;
    type Session = SoftSession;

    fn name(&self) -> &str {
        &self.context.config.label
    }

    #[instrument(skip(self), fields(token = %self.context.config.label))]
    fn acquire_session(&self) -> BackendResult<SoftSession> {
        let mut pool = self.pool.lock();
        if let Some(session) = pool.idle.pop() {
            debug!(session = session.id(), "reusing pooled session");
            return Ok(session);
        }
        if pool.open >= self.context.config.max_sessions {
            warn!(open = pool.open, "session limit reached");
            return Err(BackendError::SessionCount);
        }
        let id = pool.next_id;
        pool.next_id += 1;
        pool.open += 1;
        debug!(session = id, "opened session");
        Ok(SoftSession::new(id, self.context.clone()))
    }

    #[instrument(skip_all, fields(token = %self.context.config.label))]
    fn release_session(&self, mut session: SoftSession) {
        if session.is_active() {
            warn!(
                session = session.id(),
                "released session still had an operation, discarding it"
            );
            session.abort();
        }
        debug!(session = session.id(), "session returned to pool");
        self.pool.lock().idle.push(session);
    }

    #[instrument(skip_all, fields(token = %self.context.config.label))]
    fn kill_session(&self, session: SoftSession) {
        debug!(session = session.id(), "closing session");
        let mut pool = self.pool.lock();
        pool.open = pool.open.saturating_sub(1);
    }

    fn import_key(&self, key: &SecretKey) -> BackendResult<SoftKey> {
        SoftKey::import(key)
    }

    fn supports_native_padding(&self, mechanism: &Mechanism) -> bool {
        self.context.config.native_padding
            && mechanism.algorithm() != CipherAlgorithm::Arcfour
            && matches!(mechanism.mode(), Mode::Ecb | Mode::Cbc)
    }

    fn can_cancel(&self) -> bool {
        self.context.config.can_cancel
    }
}

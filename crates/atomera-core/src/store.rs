//! `WorkflowStore`: contenedor observable del estado compartido.
//!
//! - `get_state` devuelve siempre una copia; la única vía de mutación es
//!   `set_state`.
//! - Cada `set_state` produce exactamente una notificación síncrona (sin
//!   batching). Los suscriptores se invocan fuera del lock, así que pueden
//!   llamar a `set_state` desde la notificación; evitar la recursión sin fin
//!   es responsabilidad del suscriptor.
//! - El store no valida invariantes del estado (ver `WorkflowState`).
//!
//! Registro de suscriptores: `subscribe` crea siempre un registro nuevo;
//! `subscribe_shared` es idempotente para el mismo `Arc` (no duplica
//! notificaciones).
use atomera_domain::StageId;
use chrono::Utc;
use log::debug;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::constants::WORKBENCH_VERSION;
use crate::errors::WorkflowError;
use crate::gating::{gating, section_status, Gating};
use crate::hashing::hash_value;
use crate::state::{WorkflowPatch, WorkflowState};

/// Callback de notificación.
pub type Subscriber = Arc<dyn Fn(&WorkflowState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Bloquea recuperando el dato si otro hilo entró en pánico con el lock.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct StoreInner {
    state: Mutex<WorkflowState>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
    notifications: AtomicU64,
}

/// Handle clonable; todas las copias comparten el mismo estado.
#[derive(Clone)]
pub struct WorkflowStore {
    inner: Arc<StoreInner>,
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::with_state(WorkflowState::default())
    }

    pub fn with_state(state: WorkflowState) -> Self {
        Self { inner: Arc::new(StoreInner { state: Mutex::new(state),
                                            subscribers: Mutex::new(Vec::new()),
                                            next_id: AtomicU64::new(1),
                                            notifications: AtomicU64::new(0) }) }
    }

    /// Snapshot inmutable del estado actual.
    pub fn get_state(&self) -> WorkflowState {
        lock(&self.inner.state).clone()
    }

    /// Proyección sin clonar el estado completo.
    pub fn read<T>(&self, f: impl FnOnce(&WorkflowState) -> T) -> T {
        f(&*lock(&self.inner.state))
    }

    /// Merge superficial de `patch` y una notificación a cada suscriptor.
    pub fn set_state(&self, patch: WorkflowPatch) {
        let fields = patch.fields();
        let snapshot = {
            let mut state = lock(&self.inner.state);
            patch.apply_to(&mut state);
            state.clone()
        };
        debug!("set_state fields={:?}", fields);
        self.notify(&snapshot);
    }

    /// Como `set_state`, pero sólo aplica `patch` si `guard` acepta el estado
    /// actual. Comprobación y escritura ocurren bajo el mismo lock; si se
    /// rechaza no hay notificación y devuelve `false`.
    pub fn set_state_if(&self, guard: impl FnOnce(&WorkflowState) -> bool, patch: WorkflowPatch) -> bool {
        let fields = patch.fields();
        let snapshot = {
            let mut state = lock(&self.inner.state);
            if !guard(&state) {
                debug!("set_state_if rejected fields={:?}", fields);
                return false;
            }
            patch.apply_to(&mut state);
            state.clone()
        };
        debug!("set_state fields={:?}", fields);
        self.notify(&snapshot);
        true
    }

    /// Restaura el estado inicial y notifica.
    pub fn reset_state(&self) {
        let snapshot = {
            let mut state = lock(&self.inner.state);
            *state = WorkflowState::default();
            state.clone()
        };
        debug!("reset_state");
        self.notify(&snapshot);
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
        where F: Fn(&WorkflowState) + Send + Sync + 'static
    {
        self.register(Arc::new(callback))
    }

    /// Registra un callback compartido; si el mismo `Arc` ya está registrado
    /// devuelve el id existente.
    pub fn subscribe_shared(&self, callback: Subscriber) -> SubscriptionId {
        let existing = lock(&self.inner.subscribers).iter()
                                                    .find(|(_, s)| same_callback(s, &callback))
                                                    .map(|(id, _)| *id);
        existing.unwrap_or_else(|| self.register(callback))
    }

    /// Elimina un suscriptor. Devuelve `false` si no existía.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = lock(&self.inner.subscribers);
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        before != subs.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// Número total de notificaciones emitidas.
    pub fn notification_count(&self) -> u64 {
        self.inner.notifications.load(Ordering::SeqCst)
    }

    /// Gating calculado sobre el estado actual (sin caché).
    pub fn gating(&self) -> Gating {
        self.read(gating)
    }

    pub fn is_unlocked(&self, stage: StageId) -> bool {
        self.read(|s| section_status(s, stage).unlocked)
    }

    /// Cambia la sección activa sólo si está desbloqueada. Si no, no hace
    /// nada (ni notifica) y devuelve `GatingViolation`.
    pub fn switch_section(&self, stage: StageId) -> Result<(), WorkflowError> {
        if !self.is_unlocked(stage) {
            debug!("switch_section rejected stage={stage}");
            return Err(WorkflowError::GatingViolation { stage });
        }
        self.set_state(WorkflowPatch::new().active_section(stage));
        Ok(())
    }

    /// Snapshot JSON de la sesión (unidireccional, sin cargador).
    pub fn export_session(&self) -> Result<Value, WorkflowError> {
        let state = serde_json::to_value(self.get_state())?;
        let fingerprint = hash_value(&state);
        Ok(json!({
            "version": WORKBENCH_VERSION,
            "exportedAt": Utc::now().to_rfc3339(),
            "state": state,
            "fingerprint": fingerprint,
        }))
    }

    fn register(&self, callback: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        lock(&self.inner.subscribers).push((id, callback));
        id
    }

    fn notify(&self, snapshot: &WorkflowState) {
        self.inner.notifications.fetch_add(1, Ordering::SeqCst);
        let subs: Vec<Subscriber> = lock(&self.inner.subscribers).iter().map(|(_, s)| s.clone()).collect();
        for s in subs {
            s(snapshot);
        }
    }
}

fn same_callback(a: &Subscriber, b: &Subscriber) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl std::fmt::Debug for WorkflowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowStore")
         .field("subscribers", &self.subscriber_count())
         .field("notifications", &self.notification_count())
         .finish()
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::MAX_PROGRESS;

/// Hito discreto de progreso. `delay` es la espera previa a aplicarlo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub progress: u8,
    pub message: String,
    pub delay: Duration,
}

/// Secuencia ordenada de checkpoints con progreso no decreciente.
///
/// El plan no ejecuta nada: el llamador lo recorre, espera cada `delay` y
/// aplica el checkpoint con `JobManager::update_job`. La cancelación sólo se
/// observa entre checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointPlan {
    steps: Vec<Checkpoint>,
}

impl CheckpointPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Añade un checkpoint. El progreso se satura a 100 y nunca retrocede
    /// respecto al anterior.
    pub fn then(mut self, progress: u8, message: &str, delay_ms: u64) -> Self {
        let floor = self.steps.last().map(|c| c.progress).unwrap_or(0);
        let progress = progress.min(MAX_PROGRESS).max(floor);
        self.steps.push(Checkpoint { progress,
                                     message: message.to_string(),
                                     delay: Duration::from_millis(delay_ms) });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Checkpoint> {
        self.steps.iter()
    }

    /// Suma de las esperas nominales.
    pub fn total_delay(&self) -> Duration {
        self.steps.iter().map(|c| c.delay).sum()
    }
}

impl IntoIterator for CheckpointPlan {
    type Item = Checkpoint;
    type IntoIter = std::vec::IntoIter<Checkpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a CheckpointPlan {
    type Item = &'a Checkpoint;
    type IntoIter = std::slice::Iter<'a, Checkpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

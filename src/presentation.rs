//! Presentación en texto: navegación y barra de estado.
//!
//! Sólo lectura sobre el estado y el gating; nada aquí escribe en el store.

use atomera_core::{gating, Job, JobStatus, WorkflowState};
use atomera_domain::StageId;

fn marker(state: &WorkflowState, stage: StageId, unlocked: bool, complete: bool) -> char {
    if state.active_section == stage {
        '>'
    } else if complete {
        '*'
    } else if unlocked {
        ' '
    } else {
        '#'
    }
}

/// Una línea por etapa: `>` activa, `*` completa, `#` bloqueada.
pub fn render_navigation(state: &WorkflowState) -> String {
    gating(state).iter()
                 .map(|(stage, status)| {
                     let mark = marker(state, *stage, status.unlocked, status.complete);
                     let suffix = if status.unlocked { "" } else { " (locked)" };
                     format!("[{mark}] {}. {}{suffix}", stage.index() + 1, stage.title())
                 })
                 .collect::<Vec<_>>()
                 .join("\n")
}

fn job_segment(job: &Job) -> String {
    match job.status {
        JobStatus::Running | JobStatus::Pending => format!("{} {}% ({})", job.kind, job.progress, job.message),
        other => format!("{} {}", job.kind, other),
    }
}

/// Barra de estado: target, bolsillo, cribado, job de la etapa activa y
/// último mensaje.
pub fn render_status_bar(state: &WorkflowState, active_job: Option<&Job>) -> String {
    let mut parts = Vec::new();
    parts.push(match &state.target {
                   Some(t) => format!("Target: {} ({} res)", t.name, t.residue_count),
                   None => "Target: none".to_string(),
               });
    if let Some(p) = &state.selected_pocket {
        parts.push(format!("Pocket: {}", p.id));
    }
    if state.is_screening_active {
        let sp = &state.screening_progress;
        parts.push(format!("Screening: {}/{} ({}%, {} workers)", sp.processed, sp.total, sp.percent(), sp.workers));
    } else if !state.hits.is_empty() {
        parts.push(format!("Hits: {}", state.hits.len()));
    }
    if let Some(job) = active_job {
        parts.push(format!("Job: {}", job_segment(job)));
    }
    parts.push(state.status_message.clone());
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomera_core::WorkflowPatch;

    #[test]
    fn fresh_state_locks_everything_after_target() {
        let nav = render_navigation(&WorkflowState::default());
        let lines: Vec<&str> = nav.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "[>] 1. Target");
        assert_eq!(lines[1], "[#] 2. Preparation (locked)");
        assert!(lines[5].ends_with("(locked)"));
    }

    #[test]
    fn completed_stage_is_marked() {
        let mut state = WorkflowState::default();
        WorkflowPatch::new().is_target_loaded(true).active_section(StageId::Prep).apply_to(&mut state);
        let nav = render_navigation(&state);
        assert!(nav.contains("[*] 1. Target"));
        assert!(nav.contains("[>] 2. Preparation"));
        assert!(nav.contains("[#] 3. Pocket (locked)"));
    }

    #[test]
    fn status_bar_shows_initial_message() {
        let bar = render_status_bar(&WorkflowState::default(), None);
        assert_eq!(bar, "Target: none | Load a protein target to begin");
    }
}

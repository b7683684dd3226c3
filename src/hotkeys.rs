//! Global shortcut table and what each shortcut does.

use std::sync::Arc;

use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{Code, Modifiers, Shortcut};

use crate::{analysis::CycleOutcome, overlay::Direction, AppState};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Nudge(Direction),
    Scroll(Direction),
    Capture,
    Analyze,
}

#[cfg(target_os = "macos")]
fn primary_modifier() -> Modifiers {
    Modifiers::SUPER
}

#[cfg(not(target_os = "macos"))]
fn primary_modifier() -> Modifiers {
    Modifiers::CONTROL
}

#[cfg(target_os = "macos")]
const PRIMARY_LABEL: &str = "Command";

#[cfg(not(target_os = "macos"))]
const PRIMARY_LABEL: &str = "Ctrl";

/// Human-readable binding for the capture shortcut, used in overlay hints.
pub fn capture_hotkey_label() -> String {
    format!("{PRIMARY_LABEL}+1")
}

/// The fixed binding table.
pub fn bindings() -> Vec<(Shortcut, HotkeyAction)> {
    let primary = primary_modifier();
    let scroll = primary | Modifiers::SHIFT;

    vec![
        (Shortcut::new(Some(primary), Code::ArrowLeft), HotkeyAction::Nudge(Direction::Left)),
        (Shortcut::new(Some(primary), Code::ArrowRight), HotkeyAction::Nudge(Direction::Right)),
        (Shortcut::new(Some(primary), Code::ArrowUp), HotkeyAction::Nudge(Direction::Up)),
        (Shortcut::new(Some(primary), Code::ArrowDown), HotkeyAction::Nudge(Direction::Down)),
        (Shortcut::new(Some(scroll), Code::ArrowUp), HotkeyAction::Scroll(Direction::Up)),
        (Shortcut::new(Some(scroll), Code::ArrowDown), HotkeyAction::Scroll(Direction::Down)),
        (Shortcut::new(Some(primary), Code::Digit1), HotkeyAction::Capture),
        (Shortcut::new(Some(primary), Code::Digit2), HotkeyAction::Analyze),
    ]
}

pub fn action_for(shortcut: &Shortcut) -> Option<HotkeyAction> {
    bindings()
        .into_iter()
        .find(|(binding, _)| binding == shortcut)
        .map(|(_, action)| action)
}

/// Runs `action`. Window moves happen inline; capture and analysis go to the
/// async runtime so the shortcut handler returns immediately.
pub fn dispatch(app: &AppHandle, action: HotkeyAction) {
    let state = app.state::<AppState>();

    match action {
        HotkeyAction::Nudge(direction) => {
            if let Err(err) = state.overlay.nudge(direction) {
                log_error!("Failed to move overlay {direction:?}: {err}");
            }
        }
        HotkeyAction::Scroll(direction) => {
            if let Err(err) = state.overlay.scroll_content(direction) {
                log_error!("Failed to scroll overlay {direction:?}: {err}");
            }
        }
        HotkeyAction::Capture => {
            let store = Arc::clone(&state.captures);
            tauri::async_runtime::spawn_blocking(move || {
                let mut store = store
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                match store.capture() {
                    Ok(record) => log_info!(
                        "Capture #{} stored at {}",
                        record.index,
                        record.captured_at.to_rfc3339()
                    ),
                    Err(err) => log_error!("Error taking screenshot: {err}"),
                }
            });
        }
        HotkeyAction::Analyze => {
            if state.analysis.is_busy() {
                log_warn!("Analyze pressed while a request is still running");
                return;
            }
            let orchestrator = Arc::clone(&state.analysis);
            tauri::async_runtime::spawn(async move {
                match orchestrator.run_cycle().await {
                    CycleOutcome::Answered => log_info!("Analysis cycle answered"),
                    CycleOutcome::Busy => {
                        log_warn!("Analyze pressed while a request is still running")
                    }
                    CycleOutcome::Failed(err) => log_info!("Analysis cycle ended early: {err}"),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_binding_is_unique() {
        let table = bindings();
        for (i, (a, _)) in table.iter().enumerate() {
            for (b, _) in &table[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn shortcuts_map_back_to_their_actions() {
        let primary = primary_modifier();

        assert_eq!(
            action_for(&Shortcut::new(Some(primary), Code::Digit1)),
            Some(HotkeyAction::Capture)
        );
        assert_eq!(
            action_for(&Shortcut::new(Some(primary), Code::Digit2)),
            Some(HotkeyAction::Analyze)
        );
        assert_eq!(
            action_for(&Shortcut::new(Some(primary), Code::ArrowLeft)),
            Some(HotkeyAction::Nudge(Direction::Left))
        );
        assert_eq!(
            action_for(&Shortcut::new(Some(primary | Modifiers::SHIFT), Code::ArrowUp)),
            Some(HotkeyAction::Scroll(Direction::Up))
        );
    }

    #[test]
    fn unbound_shortcuts_do_nothing() {
        assert_eq!(action_for(&Shortcut::new(None, Code::Digit1)), None);
        assert_eq!(
            action_for(&Shortcut::new(Some(Modifiers::ALT), Code::ArrowLeft)),
            None
        );
    }

    #[test]
    fn capture_label_names_the_digit() {
        assert!(capture_hotkey_label().ends_with("+1"));
    }
}

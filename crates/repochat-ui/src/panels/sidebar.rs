//! Project sidebar — indexed repositories with status badges and
//! per-project sync and delete buttons.

use egui::{self, Align, Layout, RichText, ScrollArea};
use crate::state::{UiAction, UiState};
use crate::theme::*;

/// Clicks inside a project row
enum RowAction {
    Select(String),
    Sync(String),
    Delete(String),
}

/// Render the project list. Selecting, syncing and importing produce an
/// action; delete only opens the confirmation.
pub fn sidebar_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading(RichText::new("Projects").color(TEXT_PRIMARY).strong());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.small_button("+ New").on_hover_text("Import a GitHub repository").clicked() {
                action = state.open_new_project();
            }
        });
    });
    ui.separator();

    if state.projects.is_empty() {
        ui.label(RichText::new("No projects yet").color(TEXT_SECONDARY).small());
        return action;
    }

    let mut clicked = None;
    ScrollArea::vertical()
        .id_salt("projects")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for project in &state.projects {
                let active = state.project_id.as_deref() == Some(project.id.as_str());
                ui.horizontal(|ui| {
                    let name = RichText::new(project.repo()).color(TEXT_PRIMARY);
                    let response = ui
                        .selectable_label(active, name)
                        .on_hover_text(&project.name);
                    if response.clicked() && !active {
                        clicked = Some(RowAction::Select(project.id.clone()));
                    }
                    if project.is_private {
                        ui.label(RichText::new("private").color(TEXT_SECONDARY).small());
                    }
                });
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(project.status.label())
                            .color(status_color(project.status))
                            .small(),
                    );
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.small_button("Delete").clicked() {
                            clicked = Some(RowAction::Delete(project.id.clone()));
                        }
                        let syncing = project.status.is_in_progress();
                        if ui
                            .add_enabled(!syncing, egui::Button::new("Sync").small())
                            .on_hover_text("Re-index from GitHub")
                            .clicked()
                        {
                            clicked = Some(RowAction::Sync(project.id.clone()));
                        }
                    });
                });
                ui.add_space(4.0);
            }
        });

    match clicked {
        Some(RowAction::Select(id)) => action = Some(UiAction::SelectProject(id)),
        Some(RowAction::Sync(id)) => action = state.start_sync(&id),
        Some(RowAction::Delete(id)) => state.request_delete(&id),
        None => {}
    }
    action
}

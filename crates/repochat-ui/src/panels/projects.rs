//! Project management dialogs: import a GitHub repository and confirm
//! a delete.

use egui::{self, RichText, ScrollArea};
use crate::state::{UiAction, UiState};
use crate::theme::*;

/// Repository picker. Returns `ImportProject` when a row is chosen.
pub fn new_project_dialog(ctx: &egui::Context, state: &mut UiState) -> Option<UiAction> {
    let dialog = state.new_project.as_mut()?;

    let mut open = true;
    let mut chosen = None;
    egui::Window::new("New project")
        .id(egui::Id::new("new_project_dialog"))
        .open(&mut open)
        .collapsible(false)
        .default_width(480.0)
        .show(ctx, |ui| {
            ui.add(
                egui::TextEdit::singleline(&mut dialog.search)
                    .hint_text("Search repositories...")
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(4.0);

            if let Some(error) = &dialog.error {
                ui.label(RichText::new(error).color(ERROR));
            }

            if dialog.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Loading repositories...").color(TEXT_SECONDARY));
                });
                return;
            }

            let busy = dialog.importing.is_some();
            let mut any = false;
            ScrollArea::vertical()
                .id_salt("github_repos")
                .max_height(360.0)
                .show(ui, |ui| {
                    for repo in dialog.filtered_repos() {
                        any = true;
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.horizontal(|ui| {
                                    ui.label(RichText::new(&repo.name).color(TEXT_PRIMARY));
                                    if repo.private {
                                        ui.label(RichText::new("private").color(TEXT_SECONDARY).small());
                                    }
                                });
                                if let Some(description) = &repo.description {
                                    ui.label(RichText::new(description).color(TEXT_SECONDARY).small());
                                }
                                ui.label(
                                    RichText::new(format!("★ {}", repo.stars))
                                        .color(TEXT_SECONDARY)
                                        .small(),
                                );
                            });
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                let importing = dialog.importing == Some(repo.id);
                                let label = if importing { "Importing..." } else { "Import" };
                                if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                                    chosen = Some(repo.id);
                                }
                            });
                        });
                        ui.separator();
                    }
                });
            if !any {
                ui.label(RichText::new("No repositories found").color(TEXT_SECONDARY));
            }
        });

    if !open {
        state.new_project = None;
        return None;
    }
    chosen.and_then(|id| state.import_repo(id))
}

/// Delete confirmation. Returns `DeleteProject` when confirmed.
pub fn delete_dialog(ctx: &egui::Context, state: &mut UiState) -> Option<UiAction> {
    let confirm = state.delete_confirm.as_ref()?;
    let name = state
        .projects
        .iter()
        .find(|p| p.id == confirm.project_id)
        .map_or(confirm.project_id.as_str(), |p| p.name.as_str());
    let deleting = confirm.deleting;

    let mut confirmed = false;
    let mut cancelled = false;
    egui::Window::new("Delete project")
        .id(egui::Id::new("delete_dialog"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(RichText::new(format!("Delete {}?", name)).color(TEXT_PRIMARY).strong());
            ui.label(
                RichText::new("Its index and chat history are removed for good.")
                    .color(TEXT_SECONDARY)
                    .small(),
            );
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if deleting { "Deleting..." } else { "Delete project" };
                if ui
                    .add_enabled(
                        !deleting,
                        egui::Button::new(RichText::new(label).color(TEXT_PRIMARY))
                            .fill(ERROR)
                            .corner_radius(PANEL_ROUNDING),
                    )
                    .clicked()
                {
                    confirmed = true;
                }
                if ui.add_enabled(!deleting, egui::Button::new("Cancel")).clicked() {
                    cancelled = true;
                }
            });
        });

    if cancelled {
        state.cancel_delete();
    }
    if confirmed {
        return state.confirm_delete();
    }
    None
}

//! Pull request dialog — edit the target path and content of a code
//! block, then ask the backend to open a PR with it.

use egui::{self, RichText, ScrollArea};
use crate::state::{PrStatus, UiAction, UiState};
use crate::theme::*;

/// Render the dialog if open. Returns `CreatePullRequest` on submit.
pub fn pr_dialog(ctx: &egui::Context, state: &mut UiState) -> Option<UiAction> {
    let dialog = state.pr_dialog.as_mut()?;

    let mut open = true;
    let mut close = false;
    let mut submit = false;
    egui::Window::new("Create pull request")
        .id(egui::Id::new("pr_dialog"))
        .open(&mut open)
        .collapsible(false)
        .default_width(560.0)
        .show(ctx, |ui| {
            let editing = matches!(dialog.status, PrStatus::Editing | PrStatus::Failed(_));

            ui.label(RichText::new("File path").color(TEXT_SECONDARY).small());
            ui.add_enabled(
                editing,
                egui::TextEdit::singleline(&mut dialog.file_path).desired_width(f32::INFINITY),
            );
            ui.add_space(4.0);

            ui.label(RichText::new("Content").color(TEXT_SECONDARY).small());
            ScrollArea::vertical()
                .id_salt("pr_content")
                .max_height(320.0)
                .show(ui, |ui| {
                    ui.add_enabled(
                        editing,
                        egui::TextEdit::multiline(&mut dialog.content)
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
            ui.add_space(4.0);

            match &dialog.status {
                PrStatus::Editing => {}
                PrStatus::Submitting => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Creating pull request...").color(TEXT_SECONDARY));
                    });
                }
                PrStatus::Created(url) => {
                    ui.label(RichText::new("Pull request created").color(SUCCESS));
                    ui.hyperlink_to(url.as_str(), url.as_str());
                }
                PrStatus::Failed(message) => {
                    ui.label(RichText::new(message).color(ERROR));
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        dialog.can_submit(),
                        egui::Button::new(RichText::new("Create PR").color(TEXT_PRIMARY))
                            .fill(ACCENT)
                            .corner_radius(PANEL_ROUNDING),
                    )
                    .clicked()
                {
                    submit = true;
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        });

    if !open || close {
        state.pr_dialog = None;
        return None;
    }
    if submit {
        return state.submit_pull_request();
    }
    None
}

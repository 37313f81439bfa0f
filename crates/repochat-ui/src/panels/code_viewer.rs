//! Code viewer — read-only window for a cited file.

use egui::{self, RichText, ScrollArea};
use repochat_types::content::FileKind;
use crate::state::UiState;
use crate::theme::*;

/// Render the viewer if a file is open. Escape or the close button
/// dismisses it.
pub fn code_viewer(ctx: &egui::Context, state: &mut UiState) {
    let Some(view) = &state.viewer else {
        return;
    };

    let mut open = !ctx.input(|i| i.key_pressed(egui::Key::Escape));
    egui::Window::new(view.path.clone())
        .id(egui::Id::new("code_viewer"))
        .open(&mut open)
        .collapsible(false)
        .default_size([720.0, 520.0])
        .show(ctx, |ui| match view.kind {
            FileKind::Binary => {
                ui.add_space(24.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("Binary file").color(TEXT_PRIMARY).strong());
                    ui.label(
                        RichText::new("This file cannot be displayed.")
                            .color(TEXT_SECONDARY),
                    );
                });
            }
            FileKind::Text { language } => {
                let lines: Vec<&str> = view.content.lines().collect();
                ui.label(
                    RichText::new(format!("{} · {} lines", language, lines.len()))
                        .color(TEXT_SECONDARY)
                        .small(),
                );
                ui.separator();

                let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
                let gutter = lines.len().to_string().len();
                ScrollArea::both()
                    .id_salt("code_viewer_lines")
                    .auto_shrink([false, false])
                    .show_rows(ui, row_height, lines.len(), |ui, rows| {
                        for row in rows {
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(format!("{:>width$}", row + 1, width = gutter))
                                        .monospace()
                                        .color(LINE_NUMBER),
                                );
                                ui.label(RichText::new(lines[row]).monospace().color(TEXT_PRIMARY));
                            });
                        }
                    });
            }
        });

    if !open {
        state.viewer = None;
    }
}

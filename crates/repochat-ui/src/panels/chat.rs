//! Chat panel — transcript, citation chips, code blocks and the composer.

use chrono::Utc;
use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use repochat_types::content::{scan_code_blocks, ContentSegment};
use repochat_types::message::{ChatMessage, Role};
use crate::state::{UiAction, UiState};
use crate::theme::*;

/// Clicks inside a message bubble
enum BubbleAction {
    OpenSource(String),
    CreatePr(String),
}

/// Split `sources` into the chips to show and the number left over.
pub fn visible_sources(sources: &[String], max: usize) -> (&[String], usize) {
    let shown = sources.len().min(max);
    (&sources[..shown], sources.len() - shown)
}

/// Last path component, used as chip text.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Render the chat panel. Returns the backend requests the user made.
///
/// `now_ms` is the frame time, used to debounce mention lookups.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState, now_ms: u64) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                header(ui, state);
                ui.separator();
                banners(ui, state);

                // Messages area
                let available_height = ui.available_height() - composer_height(state);
                let mut bubble_action = None;
                ScrollArea::vertical()
                    .id_salt("messages")
                    .max_height(available_height.max(80.0))
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if state.messages.is_empty() {
                            empty_transcript(ui, state);
                        }
                        let last = state.messages.len().saturating_sub(1);
                        for (i, message) in state.messages.iter().enumerate() {
                            let streaming = state.pending && i == last && message.is_assistant();
                            if let Some(action) =
                                render_message(ui, message, state.max_visible_sources, streaming)
                            {
                                bubble_action = Some(action);
                            }
                            ui.add_space(4.0);
                        }
                    });

                match bubble_action {
                    Some(BubbleAction::OpenSource(path)) => actions.push(UiAction::OpenFile(path)),
                    Some(BubbleAction::CreatePr(code)) => state.start_pull_request(&code),
                    None => {}
                }

                ui.add_space(8.0);
                if let Some(action) = composer(ui, state, now_ms) {
                    actions.push(action);
                }
            });
        });

    // Debounced mention lookups fire on their own schedule
    if let Some(request) = state.composer.due(now_ms) {
        actions.push(UiAction::SearchMentions(request));
    }
    if state.composer.has_scheduled() {
        ui.ctx().request_repaint_after(std::time::Duration::from_millis(50));
    }

    actions
}

fn header(ui: &mut egui::Ui, state: &UiState) {
    ui.horizontal(|ui| {
        let title = state
            .active_project()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Repo Chat".to_string());
        ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let status_color = if state.lockout.is_some() {
                ERROR
            } else if state.is_busy() {
                WARNING
            } else {
                SUCCESS
            };
            ui.label(RichText::new(&state.status_text).color(status_color).small());
        });
    });
}

fn banners(ui: &mut egui::Ui, state: &mut UiState) {
    if let Some(lockout) = &state.lockout {
        let hint = if state.lockout_expired(Utc::now()) {
            "The limit has reset. Switch project to continue."
        } else {
            "Switch project to start over."
        };
        egui::Frame::default()
            .fill(ERROR_BG)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&lockout.reason).color(ERROR));
                ui.label(
                    RichText::new(hint)
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            });
        ui.add_space(4.0);
    }

    let mut dismissed = false;
    if let Some(notice) = &state.notice {
        egui::Frame::default()
            .fill(BG_SURFACE)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(notice).color(WARNING));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        dismissed = ui.small_button("Dismiss").clicked();
                    });
                });
            });
        ui.add_space(4.0);
    }
    if dismissed {
        state.notice = None;
    }
}

fn empty_transcript(ui: &mut egui::Ui, state: &UiState) {
    let text = match state.active_project() {
        Some(project) if !project.is_ready() => {
            format!("{} is {}. Chat opens once indexing finishes.", project.name, project.status.label())
        }
        Some(project) => format!("Ask anything about {}. Type @ to attach a file.", project.repo()),
        None => "Pick a repository from the sidebar.".to_string(),
    };
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(text).color(TEXT_SECONDARY));
    });
}

fn render_message(
    ui: &mut egui::Ui,
    message: &ChatMessage,
    max_sources: usize,
    streaming: bool,
) -> Option<BubbleAction> {
    let mut action = None;
    let (label, label_color, bg) = match (message.role, message.is_error) {
        (_, true) => ("Error", ERROR, ERROR_BG),
        (Role::User, false) => ("You", TEXT_PRIMARY, USER_BUBBLE),
        (Role::Assistant, false) => ("Assistant", SUCCESS, BG_SECONDARY),
    };

    egui::Frame::default()
        .fill(bg)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(label).color(label_color).strong().small());

            if message.role == Role::User || message.is_error {
                ui.label(RichText::new(&message.content).color(TEXT_PRIMARY));
            } else {
                for segment in scan_code_blocks(&message.content) {
                    match segment {
                        ContentSegment::Text(text) => {
                            ui.label(RichText::new(text.trim_end()).color(TEXT_PRIMARY));
                        }
                        ContentSegment::Code { language, code } => {
                            if let Some(a) = code_block(ui, &language, &code) {
                                action = Some(a);
                            }
                        }
                    }
                }
            }

            if streaming {
                ui.label(RichText::new("▌").color(ACCENT).strong());
            }

            if !message.sources.is_empty() {
                ui.add_space(4.0);
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new("Sources:").color(TEXT_SECONDARY).small());
                    let (shown, hidden) = visible_sources(&message.sources, max_sources);
                    for source in shown {
                        if ui.small_button(file_name(source)).on_hover_text(source).clicked() {
                            action = Some(BubbleAction::OpenSource(source.clone()));
                        }
                    }
                    if hidden > 0 {
                        ui.label(
                            RichText::new(format!("+{} more", hidden))
                                .color(TEXT_SECONDARY)
                                .small(),
                        );
                    }
                });
            }
        });

    action
}

fn code_block(ui: &mut egui::Ui, language: &str, code: &str) -> Option<BubbleAction> {
    let mut action = None;
    egui::Frame::default()
        .fill(CODE_BG)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let language = if language.is_empty() { "code" } else { language };
                ui.label(RichText::new(language).color(TEXT_SECONDARY).small());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("Create PR").clicked() {
                        action = Some(BubbleAction::CreatePr(code.to_string()));
                    }
                    if ui.small_button("Copy").clicked() {
                        ui.ctx().copy_text(code.to_string());
                    }
                });
            });
            ui.label(RichText::new(code).monospace().color(CODE_FG));
        });
    action
}

fn composer_height(state: &UiState) -> f32 {
    let mut height = 60.0;
    if !state.composer.attachments().is_empty() {
        height += 28.0;
    }
    if let Some(files) = state.composer.dropdown() {
        height += 24.0 * files.len().min(6) as f32;
    }
    height
}

fn composer(ui: &mut egui::Ui, state: &mut UiState, now_ms: u64) -> Option<UiAction> {
    let enabled = state.composer_enabled();

    // Attached file chips
    let mut removed = None;
    if !state.composer.attachments().is_empty() {
        ui.horizontal_wrapped(|ui| {
            for file in state.composer.attachments() {
                let chip = egui::Button::new(
                    RichText::new(format!("{}  ×", file_name(file))).color(TEXT_PRIMARY).small(),
                )
                .fill(BG_SURFACE)
                .corner_radius(PANEL_ROUNDING);
                if ui.add(chip).on_hover_text(file).clicked() {
                    removed = Some(file.clone());
                }
            }
        });
    }
    if let Some(file) = removed {
        state.composer.remove_attachment(&file);
    }

    // Mention dropdown
    let mut selected = None;
    if let Some(files) = state.composer.dropdown() {
        egui::Frame::default()
            .fill(BG_SECONDARY)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(4.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("mentions")
                    .max_height(144.0)
                    .show(ui, |ui| {
                        for file in files {
                            if ui.selectable_label(false, file.as_str()).clicked() {
                                selected = Some(file.clone());
                            }
                        }
                    });
            });
    }
    if let Some(file) = selected {
        state.composer.select(&file);
    }

    let mut submitted = None;
    ui.horizontal(|ui| {
        let mut text = state.composer.input().to_string();
        let hint = if state.lockout.is_some() {
            "Rate limited"
        } else {
            "Ask about the code... (@ to attach a file)"
        };
        let input = egui::TextEdit::singleline(&mut text)
            .hint_text(hint)
            .desired_width(ui.available_width() - 70.0)
            .font(egui::FontId::proportional(14.0));
        // Typing stays possible while a reply streams; sending does not
        let typing = state.project_id.is_some() && state.lockout.is_none();
        let response = ui.add_enabled(typing, input);
        if response.changed() {
            state.composer.on_input_changed(text, now_ms);
        }

        let send_enabled = enabled && !state.composer.input().trim().is_empty();
        let send_btn = ui.add_enabled(
            send_enabled,
            egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                .corner_radius(PANEL_ROUNDING)
                .min_size(Vec2::new(60.0, 0.0)),
        );

        // Submit on Enter or button click
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if enter || send_btn.clicked() {
            submitted = state.submit();
            response.request_focus();
        }
    });

    submitted
}

//! Main egui application — composes all panels and dispatches user
//! requests to the chat session and the backend.

use std::cell::Cell;
use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use gloo_timers::future::TimeoutFuture;

use repochat_core::event_bus::EventBus;
use repochat_core::mentions::MentionRequest;
use repochat_core::ports::ChatApiPort;
use repochat_core::projects::ProjectService;
use repochat_core::session::ChatSession;
use repochat_platform::HttpChatApi;
use repochat_types::config::ClientConfig;
use repochat_types::event::ChatEvent;
use repochat_types::project::{NewProject, PullRequestDraft};
use repochat_ui::panels::{chat, code_viewer, pr_dialog, projects, sidebar};
use repochat_ui::state::{UiAction, UiState};
use repochat_ui::theme;

/// The main application state
pub struct RepoChatApp {
    ui_state: UiState,
    event_bus: EventBus,
    session: ChatSession,
    projects: ProjectService,
    api: Rc<dyn ChatApiPort>,
    poller: ProjectPoller,
    first_frame: bool,
}

impl RepoChatApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = ClientConfig::default();
        let event_bus = EventBus::new();
        let api: Rc<dyn ChatApiPort> = Rc::new(HttpChatApi::new(config.api.clone()));
        let session = ChatSession::new(api.clone(), event_bus.clone());
        let projects = ProjectService::new(api.clone(), event_bus.clone());
        let poller = ProjectPoller {
            projects: projects.clone(),
            running: Rc::new(Cell::new(false)),
            again: Rc::new(Cell::new(false)),
            interval_ms: config.project_poll_interval_ms,
        };
        log::info!("Backend at {}", config.api.base_url);

        let app = Self {
            ui_state: UiState::new(&config),
            event_bus,
            session,
            projects,
            api,
            poller,
            first_frame: true,
        };
        app.refresh_projects(&cc.egui_ctx);
        app
    }

    fn refresh_projects(&self, ctx: &egui::Context) {
        self.poller.start(ctx);
    }
}

/// Reloads the project list while any project is still being indexed.
/// At most one loop runs at a time; a start request during a run buys
/// it one more round.
#[derive(Clone)]
struct ProjectPoller {
    projects: ProjectService,
    running: Rc<Cell<bool>>,
    again: Rc<Cell<bool>>,
    interval_ms: u32,
}

impl ProjectPoller {
    fn start(&self, ctx: &egui::Context) {
        if self.running.replace(true) {
            self.again.set(true);
            return;
        }
        let poller = self.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let mut last_known = None;
            loop {
                let keep_polling = poller.projects.poll(&mut last_known).await;
                ctx.request_repaint();
                if !keep_polling && !poller.again.replace(false) {
                    break;
                }
                TimeoutFuture::new(poller.interval_ms).await;
            }
            poller.running.set(false);
            log::debug!("Project polling stopped");
        });
    }
}

impl eframe::App for RepoChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Drain events from the chat session and background requests
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }

        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        let now_ms = (ctx.input(|i| i.time) * 1000.0) as u64;
        let mut actions = Vec::new();

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Repo Chat")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                if let Some(project) = self.ui_state.active_project() {
                    ui.separator();
                    ui.label(
                        RichText::new(format!("{} | {}", project.name, project.status.label()))
                            .color(theme::TEXT_SECONDARY)
                            .small(),
                    );
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Refresh").clicked() {
                        self.refresh_projects(ui.ctx());
                    }
                });
            });
        });

        // ── Project sidebar ──────────────────────────────────
        SidePanel::left("projects_panel")
            .min_width(220.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                if let Some(action) = sidebar::sidebar_panel(ui, &mut self.ui_state) {
                    actions.push(action);
                }
            });

        // ── Main content ─────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            actions.extend(chat::chat_panel(ui, &mut self.ui_state, now_ms));
        });

        // ── Overlays ─────────────────────────────────────────
        code_viewer::code_viewer(ctx, &mut self.ui_state);
        if let Some(action) = pr_dialog::pr_dialog(ctx, &mut self.ui_state) {
            actions.push(action);
        }
        if let Some(action) = projects::new_project_dialog(ctx, &mut self.ui_state) {
            actions.push(action);
        }
        if let Some(action) = projects::delete_dialog(ctx, &mut self.ui_state) {
            actions.push(action);
        }

        for action in actions {
            self.dispatch(action, ctx);
        }
    }
}

impl RepoChatApp {
    /// Run a UI request in the background (async)
    fn dispatch(&self, action: UiAction, ctx: &egui::Context) {
        match action {
            UiAction::SelectProject(project_id) => self.select_project(project_id, ctx),
            UiAction::Send { text, files } => self.send_message(text, files, ctx),
            UiAction::OpenFile(path) => self.open_file(path, ctx),
            UiAction::SearchMentions(request) => self.search_mentions(request, ctx),
            UiAction::CreatePullRequest(draft) => self.create_pull_request(draft, ctx),
            UiAction::LoadGithubRepos => self.load_github_repos(ctx),
            UiAction::ImportProject(project) => self.import_project(project, ctx),
            UiAction::SyncProject(project_id) => self.sync_project(project_id, ctx),
            UiAction::DeleteProject(project_id) => self.delete_project(project_id, ctx),
        }
    }

    fn select_project(&self, project_id: String, ctx: &egui::Context) {
        let session = self.session.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            session.load_history(Some(project_id)).await;
            ctx.request_repaint();
        });
    }

    fn send_message(&self, text: String, files: Vec<String>, ctx: &egui::Context) {
        let session = self.session.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if !session.send(&text, &files).await {
                log::debug!("Message not sent");
            }
            ctx.request_repaint();
        });
    }

    fn open_file(&self, path: String, ctx: &egui::Context) {
        let session = self.session.clone();
        let event_bus = self.event_bus.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            // Failures are published as a Notice by the session
            if let Ok(view) = session.open_file(&path).await {
                event_bus.emit(ChatEvent::FileOpened {
                    path: view.path,
                    content: view.content,
                });
            }
            ctx.request_repaint();
        });
    }

    fn search_mentions(&self, request: MentionRequest, ctx: &egui::Context) {
        let Some(project_id) = self.ui_state.project_id.clone() else {
            return;
        };
        let api = self.api.clone();
        let event_bus = self.event_bus.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match api.search_files(&project_id, &request.query).await {
                Ok(files) => {
                    event_bus.emit(ChatEvent::MentionResults {
                        request_id: request.request_id,
                        files,
                    });
                    ctx.request_repaint();
                }
                Err(e) => log::warn!("Mention search failed: {}", e),
            }
        });
    }

    fn create_pull_request(&self, draft: PullRequestDraft, ctx: &egui::Context) {
        let api = self.api.clone();
        let event_bus = self.event_bus.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let event = match api.create_pull_request(draft).await {
                Ok(link) => {
                    log::info!("Pull request created: {}", link.url);
                    ChatEvent::PullRequestCreated { url: link.url }
                }
                Err(e) => {
                    log::error!("Pull request failed: {}", e);
                    ChatEvent::PullRequestFailed {
                        message: e.to_string(),
                    }
                }
            };
            event_bus.emit(event);
            ctx.request_repaint();
        });
    }

    fn load_github_repos(&self, ctx: &egui::Context) {
        let projects = self.projects.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            projects.load_github_repos().await;
            ctx.request_repaint();
        });
    }

    /// Import, open the new project and poll until it is indexed.
    fn import_project(&self, project: NewProject, ctx: &egui::Context) {
        let projects = self.projects.clone();
        let session = self.session.clone();
        let poller = self.poller.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(project_id) = projects.import(project).await {
                poller.start(&ctx);
                session.load_history(Some(project_id)).await;
            }
            ctx.request_repaint();
        });
    }

    fn sync_project(&self, project_id: String, ctx: &egui::Context) {
        let projects = self.projects.clone();
        let poller = self.poller.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if projects.sync(&project_id).await {
                poller.start(&ctx);
            }
            ctx.request_repaint();
        });
    }

    fn delete_project(&self, project_id: String, ctx: &egui::Context) {
        let projects = self.projects.clone();
        let session = self.session.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if projects.delete(&project_id).await {
                session.forget_project(&project_id);
            }
            ctx.request_repaint();
        });
    }
}

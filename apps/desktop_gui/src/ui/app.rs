use std::time::{Duration, Instant};

use client_core::{ControllerConfig, ListSnapshot};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::TodoId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::rows::{remaining_label, row_views, RowView};

const ROW_HEIGHT: f32 = 32.0;
const COMPLETED_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2e, 0x9e, 0x44);
const DROP_TARGET_COLOR: egui::Color32 = egui::Color32::from_rgb(0x4a, 0x90, 0xe2);

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    /// Session-only list; nothing reaches a server.
    pub memory: bool,
    pub removal_delay: Duration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            memory: false,
            removal_delay: ControllerConfig::default().removal_delay,
        }
    }
}

impl StartupConfig {
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            removal_delay: self.removal_delay,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Rejected => "Rejected",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

/// Row-level intents collected while drawing, sent after the frame's layout.
enum RowAction {
    Toggle(TodoId),
    Delete(TodoId),
    Reorder { source: TodoId, destination: TodoId },
}

pub struct TodoApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    removal_delay: Duration,
    snapshot: ListSnapshot,
    draft: String,
    status: String,
    banner: Option<StatusBanner>,
}

impl TodoApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, startup: &StartupConfig) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            removal_delay: startup.removal_delay,
            snapshot: ListSnapshot::default(),
            draft: String::new(),
            status: String::new(),
            banner: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::ListUpdated(snapshot) => {
                    if snapshot.last_error.is_none() && self.snapshot.last_error.is_some() {
                        self.banner = None;
                    }
                    self.snapshot = snapshot;
                }
                UiEvent::Added(record) => {
                    if self.draft.trim() == record.content {
                        self.draft.clear();
                    }
                }
                UiEvent::Error(err) => self.show_error(&err),
            }
        }
    }

    fn show_error(&mut self, err: &UiError) {
        tracing::debug!(context = ?err.context(), "ui error: {}", err.message());
        if err.is_banner_worthy() {
            self.banner = Some(StatusBanner {
                message: format!("{} error: {}", err_label(err.category()), err.message()),
            });
        } else {
            self.status = err.message().to_string();
        }
    }

    fn send(&mut self, cmd: BackendCommand) {
        if let Some(status) = dispatch_backend_command(&self.cmd_tx, cmd) {
            self.banner = Some(StatusBanner { message: status });
        }
    }

    fn submit_draft(&mut self) {
        let content = self.draft.trim();
        if content.is_empty() {
            return;
        }
        let content = content.to_string();
        self.send(BackendCommand::Add { content });
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.banner.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Frame::new()
            .fill(ui.visuals().error_fg_color.gamma_multiply(0.15))
            .stroke(egui::Stroke::new(1.0, ui.visuals().error_fg_color))
            .corner_radius(4.0)
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, &banner.message);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.small_button("Dismiss").clicked();
                    });
                });
            });
        if dismissed {
            self.banner = None;
            self.send(BackendCommand::ClearError);
        }
        ui.add_space(8.0);
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let add_width = 64.0;
            let field = ui.add_sized(
                [ui.available_width() - add_width, 28.0],
                egui::TextEdit::singleline(&mut self.draft).hint_text("Add a new todo..."),
            );
            let entered = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add_sized([add_width - 8.0, 28.0], egui::Button::new("Add"))
                .clicked();
            if entered || clicked {
                self.submit_draft();
                field.request_focus();
            }
        });
    }

    fn show_rows(&mut self, ui: &mut egui::Ui) -> Vec<RowAction> {
        let mut actions = Vec::new();
        let views = row_views(&self.snapshot, Instant::now(), self.removal_delay);
        let dragged = egui::DragAndDrop::payload::<TodoId>(ui.ctx()).map(|id| *id);
        let released = ui.input(|i| i.pointer.any_released());

        for view in views {
            let height = ROW_HEIGHT * view.height_factor;
            if height < 1.0 {
                continue;
            }
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(ui.available_width(), height), egui::Sense::hover());

            if let Some(source) = dragged {
                if source != view.id && view.interactive && ui.rect_contains_pointer(rect) {
                    ui.painter().rect_stroke(
                        rect,
                        4.0,
                        egui::Stroke::new(1.5, DROP_TARGET_COLOR),
                        egui::StrokeKind::Inside,
                    );
                    if released {
                        actions.push(RowAction::Reorder {
                            source,
                            destination: view.id,
                        });
                    }
                }
            }

            let mut row_ui = ui.new_child(
                egui::UiBuilder::new()
                    .max_rect(rect)
                    .layout(egui::Layout::left_to_right(egui::Align::Center)),
            );
            row_ui.set_clip_rect(rect.intersect(ui.clip_rect()));
            row_ui.set_opacity(view.opacity);
            show_row(&mut row_ui, &view, &mut actions);
        }
        actions
    }
}

fn show_row(ui: &mut egui::Ui, view: &RowView, actions: &mut Vec<RowAction>) {
    if view.interactive {
        ui.dnd_drag_source(egui::Id::new(("todo-drag", view.id)), view.id, |ui| {
            ui.label("⠿");
        });
    } else {
        ui.add_enabled(false, egui::Label::new("⠿"));
    }

    let mut checked = view.completed;
    if ui
        .add_enabled(view.interactive, egui::Checkbox::without_text(&mut checked))
        .changed()
    {
        actions.push(RowAction::Toggle(view.id));
    }

    let mut text = egui::RichText::new(&view.content);
    if view.strikethrough {
        text = text.strikethrough().color(COMPLETED_COLOR);
    }
    ui.label(text);

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if ui
            .add_enabled(view.interactive, egui::Button::new("Delete"))
            .clicked()
        {
            actions.push(RowAction::Delete(view.id));
        }
    });
}

impl eframe::App for TodoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Todo List");
                ui.label(remaining_label(self.snapshot.remaining_count()));
            });
            ui.add_space(8.0);
            self.show_banner(ui);
            self.show_form(ui);
            ui.add_space(8.0);
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    actions = self.show_rows(ui);
                });
            if !self.status.is_empty() {
                ui.separator();
                ui.small(&self.status);
            }
        });

        for action in actions {
            let cmd = match action {
                RowAction::Toggle(id) => BackendCommand::Toggle { id },
                RowAction::Delete(id) => BackendCommand::Delete { id },
                RowAction::Reorder {
                    source,
                    destination,
                } => BackendCommand::Reorder {
                    source,
                    destination,
                },
            };
            self.send(cmd);
        }

        if self.snapshot.pending_removal.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use client_core::{
    folders::{find_batch_folders, resolve_input_image},
    settings::Settings,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{AntiAliasingMode, Mode, OutputFormat},
    error::ErrorKind,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{
    Notice, NoticeQueue, NoticeSeverity, UiError, UiErrorContext, UiEvent,
};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{ExitGuard, WorkflowState};
use crate::ui::preview::{self, PreviewSlot};

const IMAGE_FILTER: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png", "tiff", "webp", "svg"];

enum SlotView {
    Empty,
    Loading(PathBuf),
    Ready {
        path: PathBuf,
        texture: egui::TextureHandle,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

impl SlotView {
    fn pending_path(&self) -> Option<&Path> {
        match self {
            SlotView::Loading(path) => Some(path),
            _ => None,
        }
    }
}

struct FolderChoice {
    base: PathBuf,
    folders: Vec<String>,
    selected: usize,
}

pub struct VectorizerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    settings: Settings,
    settings_path: PathBuf,
    state: WorkflowState,
    previews: HashMap<PreviewSlot, SlotView>,
    status: String,
    notices: NoticeQueue,
    exit_guard: ExitGuard,
    settings_open: bool,
    compare_open: bool,
    folder_choice: Option<FolderChoice>,
}

impl VectorizerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: Settings,
        settings_path: PathBuf,
        startup_notice: Option<Notice>,
    ) -> Self {
        let state = WorkflowState::new(settings.draft());
        let mut notices = NoticeQueue::default();
        if let Some(notice) = startup_notice {
            notices.push(notice);
        }
        Self {
            cmd_tx,
            ui_rx,
            settings,
            settings_path,
            state,
            previews: HashMap::new(),
            status: String::new(),
            notices,
            exit_guard: ExitGuard::default(),
            settings_open: false,
            compare_open: false,
            folder_choice: None,
        }
    }

    fn show_error(&mut self, err: UiError) {
        self.status = err.message().to_string();
        self.notices.push(Notice::error(&err));
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::Error(err) => self.show_error(err),
                UiEvent::VectorizeFinished(attempt) => {
                    let completion = self.state.finish(attempt);
                    self.status = match completion.notice.severity {
                        NoticeSeverity::Info => "Vectorization finished".to_string(),
                        NoticeSeverity::Error => completion.notice.title.clone(),
                    };
                    self.notices.push(completion.notice);
                    if let Some(path) = completion.show_output {
                        self.request_preview(PreviewSlot::Result, path);
                    }
                }
                UiEvent::PreviewDecoded { slot, path, image } => {
                    if self.is_stale(slot, &path) {
                        tracing::debug!(?slot, path = %path.display(), "dropping stale preview");
                        continue;
                    }
                    let texture = ctx.load_texture(
                        format!("preview_{slot:?}"),
                        image.to_color_image(),
                        egui::TextureOptions::LINEAR,
                    );
                    self.previews.insert(slot, SlotView::Ready { path, texture });
                }
                UiEvent::PreviewFailed { slot, path, reason } => {
                    if self.is_stale(slot, &path) {
                        continue;
                    }
                    let message = format!("cannot display {}: {reason}", path.display());
                    self.previews.insert(slot, SlotView::Failed { path, reason });
                    self.show_error(UiError::new(
                        ErrorKind::Filesystem,
                        UiErrorContext::Preview,
                        message,
                    ));
                }
            }
        }
    }

    fn is_stale(&self, slot: PreviewSlot, path: &Path) -> bool {
        self.previews
            .get(&slot)
            .and_then(SlotView::pending_path)
            .map(|pending| pending != path)
            .unwrap_or(true)
    }

    fn request_preview(&mut self, slot: PreviewSlot, path: PathBuf) {
        let cmd = BackendCommand::DecodePreview {
            slot,
            path: path.clone(),
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.previews.insert(slot, SlotView::Loading(path));
        }
    }

    /// Selects a new source image, prefills its size and queues its preview.
    fn open_image(&mut self, path: PathBuf) {
        self.state.draft.image_path = path.display().to_string();
        match preview::print_size_cm(&path) {
            Ok((width, height)) => {
                self.state.draft.width_cm = width.to_string();
                self.state.draft.height_cm = height.to_string();
                tracing::debug!(width_cm = width, height_cm = height, "image size computed");
            }
            Err(err) => {
                tracing::error!(path = %path.display(), "failed to read image size: {err}");
            }
        }
        self.request_preview(PreviewSlot::Original, path);
    }

    fn load_batch_folder(&mut self) {
        let base = PathBuf::from(self.settings.settings.input_base_folder.trim());
        let folders = match find_batch_folders(&base, &self.state.draft.batch_id) {
            Ok(folders) => folders,
            Err(err) => {
                self.show_error(UiError::from_vectorize(UiErrorContext::FolderLookup, &err));
                return;
            }
        };
        if folders.len() > 1 {
            self.folder_choice = Some(FolderChoice {
                base,
                folders,
                selected: 0,
            });
            return;
        }
        if let Some(folder) = folders.first() {
            self.open_batch_folder(&base, folder);
        }
    }

    fn open_batch_folder(&mut self, base: &Path, folder: &str) {
        match resolve_input_image(base, folder) {
            Ok(path) => self.open_image(path),
            Err(err) => self.show_error(UiError::from_vectorize(UiErrorContext::FolderLookup, &err)),
        }
    }

    fn start_vectorization(&mut self) {
        let draft = match self.state.begin() {
            Ok(draft) => draft,
            Err(reason) => {
                self.status = reason.to_string();
                return;
            }
        };
        let cmd = BackendCommand::Vectorize {
            draft,
            credentials: self.settings.credentials(),
            endpoint: self.settings.endpoint().to_string(),
        };
        if !dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.state.abort();
            let message = self.status.clone();
            self.show_error(UiError::new(
                ErrorKind::Network,
                UiErrorContext::BackendStartup,
                message,
            ));
        }
    }

    fn save_settings(&mut self) {
        self.settings.absorb_draft(&self.state.draft);
        match self.settings.save(&self.settings_path) {
            Ok(()) => {
                self.notices.push(Notice::info(
                    "Settings saved",
                    format!("Settings were written to {}", self.settings_path.display()),
                ));
            }
            Err(err) => self.show_error(UiError::new(
                ErrorKind::Filesystem,
                UiErrorContext::Settings,
                format!("{err:#}"),
            )),
        }
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("Image file:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.state.draft.image_path)
                        .desired_width(420.0),
                );
                if ui.button("Browse").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", IMAGE_FILTER)
                        .pick_file()
                    {
                        self.open_image(path);
                    }
                }
            });

            ui.horizontal(|ui| {
                ui.label("Folder number:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.state.draft.batch_id).desired_width(160.0),
                );
                let enter_pressed =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Load").clicked() || enter_pressed {
                    self.load_batch_folder();
                }
            });

            ui.separator();
            self.show_parameters(ui);
            ui.separator();

            ui.horizontal(|ui| {
                let running = self.state.in_flight();
                if ui
                    .add_enabled(!running, egui::Button::new("Vectorize"))
                    .clicked()
                {
                    self.start_vectorization();
                }
                if running {
                    ui.spinner();
                }
                if ui.button("Settings").clicked() {
                    self.settings_open = true;
                }
                if ui.button("Open images in new window").clicked() {
                    self.compare_open = true;
                }
                ui.label(&self.status);
            });
            ui.add_space(6.0);
        });
    }

    fn show_parameters(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("parameters")
            .num_columns(4)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                let draft = &mut self.state.draft;
                ui.label("Width (cm):");
                ui.add(egui::TextEdit::singleline(&mut draft.width_cm).desired_width(80.0));
                ui.label("Height (cm):");
                ui.add(egui::TextEdit::singleline(&mut draft.height_cm).desired_width(80.0));
                ui.end_row();

                ui.label("Line fit tolerance:");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.line_fit_tolerance).desired_width(80.0),
                );
                ui.label("Anti-aliasing:");
                egui::ComboBox::from_id_salt("anti_aliasing_mode")
                    .selected_text(draft.anti_aliasing_mode.as_str())
                    .show_ui(ui, |ui| {
                        for mode in [AntiAliasingMode::AntiAliased, AntiAliasingMode::Aliased] {
                            ui.selectable_value(&mut draft.anti_aliasing_mode, mode, mode.as_str());
                        }
                    });
                ui.end_row();

                ui.label("Minimum area (px):");
                ui.add(egui::TextEdit::singleline(&mut draft.min_area_px).desired_width(80.0));
                ui.label("Maximum colors:");
                ui.add(egui::TextEdit::singleline(&mut draft.max_colors).desired_width(80.0));
                ui.end_row();
            });

        ui.horizontal(|ui| {
            ui.label("Mode:");
            for mode in [Mode::Preview, Mode::Production] {
                if ui.radio(self.state.draft.mode == mode, mode.as_str()).clicked() {
                    let policy = self.state.set_mode(mode);
                    tracing::debug!(%mode, svg_allowed = policy.svg_allowed, "mode changed");
                }
            }

            ui.add_space(24.0);
            ui.label("Output format:");
            let svg_allowed = self.state.draft.mode.policy().svg_allowed;
            for format in [OutputFormat::Png, OutputFormat::Svg] {
                let enabled = format != OutputFormat::Svg || svg_allowed;
                let checked = self.state.draft.output_format == format;
                if ui
                    .add_enabled(enabled, egui::RadioButton::new(checked, format.as_str()))
                    .clicked()
                {
                    self.state.set_output_format(format);
                }
            }
        });
    }

    fn show_previews(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let height = ui.available_height();
            ui.columns(2, |columns| {
                show_slot(
                    &mut columns[0],
                    "Original image:",
                    self.previews.get(&PreviewSlot::Original),
                    height,
                );
                show_slot(
                    &mut columns[1],
                    "Vectorized output:",
                    self.previews.get(&PreviewSlot::Result),
                    height,
                );
            });
        });
    }

    fn show_compare_window(&mut self, ctx: &egui::Context) {
        if !self.compare_open {
            return;
        }
        let previews = &self.previews;
        egui::Window::new("Original and vectorized images")
            .open(&mut self.compare_open)
            .default_size([1000.0, 600.0])
            .resizable(true)
            .show(ctx, |ui| {
                let height = ui.available_height().max(300.0);
                ui.columns(2, |columns| {
                    show_slot(
                        &mut columns[0],
                        "Original image:",
                        previews.get(&PreviewSlot::Original),
                        height,
                    );
                    show_slot(
                        &mut columns[1],
                        "Vectorized output:",
                        previews.get(&PreviewSlot::Result),
                        height,
                    );
                });
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }

        let mut open = self.settings_open;
        let mut save_clicked = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(3)
                    .spacing([10.0, 6.0])
                    .show(ui, |ui| {
                        let api = &mut self.settings.api;
                        ui.label("API key:");
                        ui.add(egui::TextEdit::singleline(&mut api.api_key).password(true));
                        ui.end_row();

                        ui.label("API secret:");
                        ui.add(egui::TextEdit::singleline(&mut api.api_secret).password(true));
                        ui.end_row();

                        ui.label("Input base folder:");
                        let base = &mut self.settings.settings.input_base_folder;
                        ui.text_edit_singleline(base);
                        if ui.button("Browse").clicked() {
                            if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                                *base = dir.display().to_string();
                            }
                        }
                        ui.end_row();

                        let draft = &mut self.state.draft;
                        ui.label("Output folder:");
                        ui.text_edit_singleline(&mut draft.output_folder);
                        if ui.button("Browse").clicked() {
                            if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                                draft.output_folder = dir.display().to_string();
                            }
                        }
                        ui.end_row();

                        ui.label("Palette (optional):");
                        ui.text_edit_singleline(&mut draft.palette);
                        ui.end_row();

                        ui.label("GIMP palette (.gpl):");
                        ui.text_edit_singleline(&mut draft.gpl_file_path);
                        if ui.button("Browse").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("GIMP Palette", &["gpl"])
                                .pick_file()
                            {
                                draft.gpl_file_path = path.display().to_string();
                            }
                        }
                        ui.end_row();

                        ui.label("Default line fit tolerance:");
                        ui.text_edit_singleline(&mut draft.line_fit_tolerance);
                        ui.end_row();

                        ui.label("Input DPI:");
                        ui.text_edit_singleline(&mut draft.input_dpi);
                        ui.end_row();

                        ui.label("Output DPI:");
                        ui.text_edit_singleline(&mut draft.output_dpi);
                        ui.end_row();
                    });

                ui.separator();
                ui.small(format!("Stored in {}", self.settings_path.display()));
                if ui.button("Save settings").clicked() {
                    save_clicked = true;
                }
            });
        self.settings_open = open;

        if save_clicked {
            self.save_settings();
        }
    }

    fn show_folder_choice(&mut self, ctx: &egui::Context) {
        let Some(choice) = self.folder_choice.as_mut() else {
            return;
        };

        let mut picked = None;
        let mut cancelled = false;
        let modal = egui::Modal::new(egui::Id::new("folder_choice_modal")).show(ctx, |ui| {
            ui.heading("Select folder");
            ui.label("Several folders match. Pick one:");
            egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                for (index, folder) in choice.folders.iter().enumerate() {
                    ui.selectable_value(&mut choice.selected, index, folder);
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Select").clicked() {
                    picked = choice.folders.get(choice.selected).cloned();
                }
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
            });
        });
        cancelled |= picked.is_none() && modal.should_close();

        if let Some(folder) = picked {
            if let Some(choice) = self.folder_choice.take() {
                self.open_batch_folder(&choice.base, &folder);
            }
        } else if cancelled {
            tracing::info!("folder selection cancelled");
            self.folder_choice = None;
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.current() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("notice_modal")).show(ctx, |ui| {
            ui.set_max_width(480.0);
            ui.heading(notice.title.as_str());
            let text = egui::RichText::new(&notice.message);
            match notice.severity {
                NoticeSeverity::Info => ui.label(text),
                NoticeSeverity::Error => ui.label(text.color(ui.visuals().error_fg_color)),
            };
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });

        if modal.inner || modal.should_close() {
            self.notices.dismiss();
        }
    }

    fn guard_exit(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested()) && self.exit_guard.close_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
        if !self.exit_guard.asking() {
            return;
        }

        let modal = egui::Modal::new(egui::Id::new("exit_modal")).show(ctx, |ui| {
            ui.heading("Quit");
            ui.label("Do you really want to quit?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Yes").clicked() {
                    Some(true)
                } else if ui.button("No").clicked() {
                    Some(false)
                } else {
                    None
                }
            })
            .inner
        });

        match modal.inner {
            Some(true) => {
                tracing::info!("exit confirmed");
                self.exit_guard.confirm();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Some(false) => self.exit_guard.keep_running(),
            None if modal.should_close() => self.exit_guard.keep_running(),
            None => {}
        }
    }
}

fn show_slot(ui: &mut egui::Ui, title: &str, view: Option<&SlotView>, height: f32) {
    ui.label(title);
    let region = (ui.available_width(), (height - 24.0).max(0.0));
    match view.unwrap_or(&SlotView::Empty) {
        SlotView::Empty => {
            ui.weak("No image");
        }
        SlotView::Loading(path) => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Loading {}", path.display()));
            });
        }
        SlotView::Failed { path, reason } => {
            ui.colored_label(
                ui.visuals().error_fg_color,
                format!("Couldn't preview {}: {reason}", path.display()),
            );
        }
        SlotView::Ready { path, texture } => {
            let size = texture.size_vec2();
            let (width, height) = preview::fit_within((size.x, size.y), region);
            ui.add(egui::Image::new(egui::load::SizedTexture::new(
                texture.id(),
                egui::vec2(width, height),
            )))
            .on_hover_text(path.display().to_string());
        }
    }
}

impl eframe::App for VectorizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        self.show_controls(ctx);
        self.show_previews(ctx);
        self.show_compare_window(ctx);
        self.show_settings_window(ctx);
        self.show_folder_choice(ctx);
        self.show_notice(ctx);
        self.guard_exit(ctx);

        if self.state.in_flight() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

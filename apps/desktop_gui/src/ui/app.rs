use client_core::{
    human_readable_bytes, PredictError, SessionError, StatusView, SubmissionSession,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, PreviewImage, UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const PREVIEW_MAX_SIZE: f32 = 500.0;
const DISCLAIMER: &str = "This tool is for educational purposes only. Always consult a healthcare professional for medical diagnosis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

pub struct XrayDesktopApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: SubmissionSession,
    api_url: String,
    status: String,
    status_banner: Option<StatusBanner>,
    file_loading: bool,
    pending_image: Option<PreviewImage>,
    preview_texture: Option<TextureHandle>,
    service_status: Option<Result<(), String>>,
}

impl XrayDesktopApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, api_url: String) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            session: SubmissionSession::new(),
            api_url,
            status: String::new(),
            status_banner: None,
            file_loading: false,
            pending_image: None,
            preview_texture: None,
            service_status: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Error(err) => {
                self.file_loading = false;
                self.show_error(&err);
            }
            UiEvent::FileLoaded(file) => {
                self.file_loading = false;
                match self.session.stage(file.clone()) {
                    Ok(selection) => {
                        self.status_banner = None;
                        self.pending_image = None;
                        self.preview_texture = None;
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::LoadPreview { selection, file },
                            &mut self.status,
                        );
                    }
                    Err(err) => {
                        self.status_banner = Some(StatusBanner {
                            severity: StatusBannerSeverity::Info,
                            message: err.user_message(),
                        });
                    }
                }
            }
            UiEvent::PreviewReady {
                selection,
                preview,
                image,
            } => {
                if self.session.attach_preview(selection, preview) {
                    self.pending_image = image;
                }
            }
            UiEvent::PredictionFinished { selection, outcome } => {
                let current = self.session.staged_upload().map(|u| u.selection());
                if current != Some(selection) {
                    tracing::warn!(selection, ?current, "prediction finished for a different selection");
                }
                match self.session.complete(outcome) {
                    Ok(_) => self.status_banner = None,
                    Err(err) => {
                        tracing::warn!(selection, error = %err, "dropping prediction result")
                    }
                }
            }
            UiEvent::ServiceChecked(result) => {
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "prediction service check failed");
                }
                self.service_status = Some(result);
            }
        }
    }

    fn show_error(&mut self, err: &UiError) {
        tracing::debug!(context = ?err.context(), "showing ui error");
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: format!("{}: {}", err_label(err.category()), err.message()),
        });
    }

    fn request_file(&mut self, path: std::path::PathBuf) {
        if !self.session.can_select() || self.file_loading {
            tracing::debug!(path = %path.display(), "ignoring file selection while busy");
            return;
        }
        self.file_loading = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadFile { path },
            &mut self.status,
        );
    }

    fn pick_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.request_file(path);
        }
    }

    fn submit(&mut self) {
        match self.session.begin_submit() {
            Ok(ticket) => {
                let dispatched = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::Predict {
                        selection: ticket.selection,
                        file: ticket.file,
                    },
                    &mut self.status,
                );
                if !dispatched {
                    let reason = self.status.clone();
                    let _ = self.session.complete(Err(PredictError::Unavailable(reason)));
                }
            }
            Err(SessionError::NoFileSelected) => {}
            Err(err) => tracing::debug!(error = %err, "submit ignored"),
        }
    }

    fn reset(&mut self) {
        if self.session.reset().is_ok() {
            self.pending_image = None;
            self.preview_texture = None;
            self.status_banner = None;
        }
    }

    fn upload_pending_texture(&mut self, ctx: &egui::Context) {
        if let Some(image) = self.pending_image.take() {
            let color_image =
                egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
            self.preview_texture = Some(ctx.load_texture(
                "xray-preview",
                color_image,
                egui::TextureOptions::LINEAR,
            ));
        }
        if self.session.preview().is_none() && self.session.staged_file().is_none() {
            self.preview_texture = None;
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.request_file(path);
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        let (fill, stroke) = match banner.severity {
            StatusBannerSeverity::Info => (
                egui::Color32::from_rgb(40, 62, 92),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(86, 126, 180)),
            ),
            StatusBannerSeverity::Error => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
            ),
        };

        egui::Frame::NONE
            .fill(fill)
            .stroke(stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
            });
    }

    fn show_upload_controls(&mut self, ui: &mut egui::Ui) {
        let can_select = self.session.can_select() && !self.file_loading;

        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(232, 241, 255))
            .stroke(egui::Stroke::new(1.5, egui::Color32::from_rgb(147, 187, 250)))
            .corner_radius(12.0)
            .inner_margin(egui::Margin::same(24))
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    match self.session.staged_file() {
                        Some(file) => {
                            ui.label(
                                egui::RichText::new(file.name())
                                    .color(egui::Color32::from_rgb(29, 78, 216)),
                            );
                            ui.small(human_readable_bytes(file.size()));
                        }
                        None if self.file_loading => {
                            ui.add(egui::Spinner::new());
                        }
                        None => {
                            ui.label("Click to upload or drag and drop");
                            ui.small("PNG, JPG, JPEG");
                        }
                    }
                    ui.add_space(6.0);
                    if ui
                        .add_enabled(can_select, egui::Button::new("Choose X-ray…"))
                        .clicked()
                    {
                        self.pick_file();
                    }
                });
            });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let submit_label = if self.session.is_in_flight() {
                "Processing..."
            } else {
                "Detect COVID-19"
            };
            let submit = egui::Button::new(egui::RichText::new(submit_label).strong());
            if ui.add_enabled(self.session.can_submit(), submit).clicked() {
                self.submit();
            }
            if self.session.is_in_flight() {
                ui.add(egui::Spinner::new());
            }
            if self.session.staged_file().is_some()
                && ui
                    .add_enabled(self.session.can_reset(), egui::Button::new("Reset"))
                    .clicked()
            {
                self.reset();
            }
        });
    }

    /// The status area holds one message: a banner hides the result card.
    fn result_view(&self) -> StatusView<'_> {
        if self.status_banner.is_some() {
            StatusView::Empty
        } else {
            self.session.view()
        }
    }

    fn show_result(&self, ui: &mut egui::Ui) {
        let (fill, accent, title, body) = match self.result_view() {
            StatusView::Empty => return,
            StatusView::Validation(message) | StatusView::Failure(message) => (
                egui::Color32::from_rgb(254, 242, 242),
                egui::Color32::from_rgb(185, 28, 28),
                None,
                message.to_string(),
            ),
            StatusView::Prediction {
                headline,
                message,
                positive: true,
            } => (
                egui::Color32::from_rgb(254, 252, 232),
                egui::Color32::from_rgb(161, 98, 7),
                Some(format!("⚠ {headline}")),
                message.to_string(),
            ),
            StatusView::Prediction {
                headline, message, ..
            } => (
                egui::Color32::from_rgb(240, 253, 244),
                egui::Color32::from_rgb(21, 128, 61),
                Some(format!("✔ {headline}")),
                message.to_string(),
            ),
        };

        egui::Frame::NONE
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, accent))
            .corner_radius(10.0)
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                if let Some(title) = title {
                    ui.label(egui::RichText::new(title).size(22.0).strong().color(accent));
                }
                ui.label(egui::RichText::new(body).size(16.0).color(accent));
            });
    }

    fn show_preview(&self, ui: &mut egui::Ui) {
        egui::Frame::NONE
            .fill(egui::Color32::from_gray(245))
            .corner_radius(12.0)
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.set_min_height(300.0);
                ui.vertical_centered(|ui| match &self.preview_texture {
                    Some(texture) => {
                        let [w, h] = texture.size();
                        let scale = (PREVIEW_MAX_SIZE / (w.max(h) as f32)).min(1.0);
                        let size = egui::vec2(w as f32 * scale, h as f32 * scale);
                        ui.add(egui::Image::new((texture.id(), size)));
                    }
                    None if self.session.preview().is_some() => {
                        ui.label("Preview unavailable for this image");
                    }
                    None => {
                        ui.label(egui::RichText::new("Image Preview").size(18.0).weak());
                        ui.small("Your uploaded X-ray will appear here");
                    }
                });
            });

        ui.add_space(12.0);
        ui.label(egui::RichText::new("⚠ Important Note").strong());
        ui.label(DISCLAIMER);
    }

    fn show_service_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.small(format!("Service: {}", self.api_url));
            if ui.small_button("Check service").clicked() {
                self.service_status = None;
                dispatch_backend_command(&self.cmd_tx, BackendCommand::CheckService, &mut self.status);
            }
            match &self.service_status {
                Some(Ok(())) => {
                    ui.small(egui::RichText::new("reachable").color(egui::Color32::DARK_GREEN));
                }
                Some(Err(_)) => {
                    ui.small(egui::RichText::new("unreachable").color(egui::Color32::DARK_RED));
                }
                None => {}
            }
            if !self.status.is_empty() {
                ui.small(egui::RichText::new(&self.status).weak());
            }
        });
    }
}

impl eframe::App for XrayDesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_dropped_files(ctx);
        self.upload_pending_texture(ctx);

        egui::TopBottomPanel::bottom("service_status").show(ctx, |ui| {
            self.show_service_row(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new("COVID-19 Detection").size(32.0).strong());
                ui.label("Upload an X-ray image of the chest for COVID-19 detection");
            });
            ui.add_space(16.0);
            self.show_status_banner(ui);
            ui.add_space(8.0);

            ui.columns(2, |columns| {
                self.show_upload_controls(&mut columns[0]);
                columns[0].add_space(16.0);
                self.show_result(&mut columns[0]);
                self.show_preview(&mut columns[1]);
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

//! Upload, preview and result rendering for the detection page.

use super::UiApp;
use eframe::egui;
use mri_core::{Diagnosis, InferenceError, RequestState, Source, Upload};
use rfd::FileDialog;

const PREVIEW_WIDTH: f32 = 300.0;

impl UiApp {
    pub(super) fn render_detection_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Alzheimer's Detection");
        ui.label("Upload a brain MRI scan to classify dementia type");
        ui.add_space(8.0);

        if let Some(err) = self.context.model_error() {
            ui.colored_label(
                ui.visuals().error_fg_color,
                format!("Model loading failed: {err}"),
            );
            ui.add_space(6.0);
        }

        let can_pick = !self.is_analyzing();
        if ui
            .add_enabled(can_pick, egui::Button::new("Choose an MRI image..."))
            .clicked()
            && let Some(path) = FileDialog::new()
                .add_filter("MRI image", &["jpg", "jpeg", "png"])
                .pick_file()
        {
            match Upload::from_path(&path) {
                Ok(upload) => self.accept_upload(upload),
                Err(source) => {
                    tracing::warn!("could not read {}: {source}", path.display());
                    self.state = RequestState::Failed(InferenceError::Io { path, source }.into());
                }
            }
        }
        ui.add_space(8.0);

        if self.context.model_error().is_none()
            && let Some(preview) = &self.preview
        {
            let bytes = egui::load::Bytes::Shared(preview.bytes.clone());
            ui.add(egui::Image::from_bytes(preview.uri.clone(), bytes).max_width(PREVIEW_WIDTH));
            ui.small("Uploaded MRI Scan");
            ui.add_space(8.0);
        }

        if self.is_analyzing() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing...");
            });
            return;
        }
        self.render_outcome(ui);
    }

    fn render_outcome(&self, ui: &mut egui::Ui) {
        let warn = ui.visuals().warn_fg_color;
        let error = ui.visuals().error_fg_color;
        match &self.state {
            RequestState::AwaitingUpload | RequestState::Blocked(_) | RequestState::Failed(_) => {
                let color = match self.state {
                    RequestState::AwaitingUpload => warn,
                    _ => error,
                };
                if let Some(message) = self.state.message() {
                    ui.colored_label(color, message);
                }
            }
            RequestState::Succeeded(diagnosis) => {
                if diagnosis.source == Source::Override {
                    ui.colored_label(warn, "Moderate Dementia pattern detected in filename");
                }
                ui.colored_label(egui::Color32::DARK_GREEN, "Analysis Complete!");
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.strong("Prediction:");
                    ui.label(prediction_text(diagnosis));
                });
                ui.horizontal(|ui| {
                    ui.strong("Confidence:");
                    ui.label(diagnosis.confidence_text());
                });

                let lines = breakdown_lines(diagnosis);
                if !lines.is_empty() {
                    ui.add_space(8.0);
                    ui.heading("Detailed Probabilities:");
                    for line in lines {
                        ui.label(line);
                    }
                }
            }
        }
    }
}

fn prediction_text(diagnosis: &Diagnosis) -> String {
    match diagnosis.source {
        Source::Classifier => diagnosis.label.to_string(),
        Source::Override => format!("{} (filename pattern matched)", diagnosis.label),
    }
}

fn breakdown_lines(diagnosis: &Diagnosis) -> Vec<String> {
    diagnosis
        .breakdown()
        .into_iter()
        .map(|(label, pct)| format!("{label}: {pct:.2}%"))
        .collect()
}

mod detection;
mod education;

use eframe::{App, Frame, egui};
use mri_core::{AppContext, RequestState, Upload};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Detection,
    Education,
}

/// Inference runs one frame after the upload so the spinner gets painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Analysis {
    Idle,
    Queued,
    SpinnerShown,
}

/// Image shown back to the user; the uri keys egui's loader cache.
struct Preview {
    uri: String,
    bytes: Arc<[u8]>,
}

pub struct UiApp {
    context: AppContext,
    panel: Panel,
    upload: Option<Upload>,
    preview: Option<Preview>,
    analysis: Analysis,
    state: RequestState,
    uploads: u64,
    stage_tab: usize,
}

impl UiApp {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            panel: Panel::Detection,
            upload: None,
            preview: None,
            analysis: Analysis::Idle,
            state: RequestState::AwaitingUpload,
            uploads: 0,
            stage_tab: 0,
        }
    }

    fn accept_upload(&mut self, upload: Upload) {
        self.uploads += 1;
        self.preview = Some(Preview {
            uri: format!("bytes://upload-{}/{}", self.uploads, upload.file_name),
            bytes: Arc::from(upload.bytes.as_slice()),
        });
        self.upload = Some(upload);
        self.analysis = Analysis::Queued;
    }

    fn is_analyzing(&self) -> bool {
        self.analysis != Analysis::Idle
    }

    fn run_pending_analysis(&mut self) {
        if self.analysis != Analysis::SpinnerShown {
            return;
        }
        self.state = self.context.handle(self.upload.as_ref());
        self.analysis = Analysis::Idle;
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.run_pending_analysis();

        egui::SidePanel::left("navigation").show(ctx, |ui| {
            ui.heading("Navigation");
            ui.add_space(6.0);
            ui.label("Go to");
            ui.radio_value(&mut self.panel, Panel::Detection, "Alzheimer's Detection");
            ui.radio_value(&mut self.panel, Panel::Education, "Dementia Education");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.panel {
                    Panel::Detection => self.render_detection_panel(ui),
                    Panel::Education => self.render_education_panel(ui),
                });
        });

        if self.analysis == Analysis::Queued {
            self.analysis = Analysis::SpinnerShown;
            ctx.request_repaint();
        }
    }
}

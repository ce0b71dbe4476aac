//! Static dementia information page.

use super::UiApp;
use eframe::egui;

const DEMENTIA_TYPES: [(&str, [&str; 3]); 4] = [
    (
        "Alzheimer's Disease",
        [
            "Most common type (60-80% of cases)",
            "Progressive brain cell degeneration",
            "Caused by plaques and tangles",
        ],
    ),
    (
        "Vascular Dementia",
        [
            "Caused by reduced blood flow",
            "Often after strokes",
            "Symptoms vary by affected area",
        ],
    ),
    (
        "Lewy Body Dementia",
        [
            "Abnormal protein deposits",
            "Causes visual hallucinations",
            "Parkinson-like symptoms",
        ],
    ),
    (
        "Frontotemporal Dementia",
        [
            "Affects frontal/temporal lobes",
            "Impacts behavior first",
            "Often early onset (40-60s)",
        ],
    ),
];

const STAGES: [(&str, &str, [&str; 3]); 4] = [
    (
        "Stage 1: Preclinical",
        "No symptoms yet",
        [
            "Brain changes begin",
            "Can last years",
            "Only detectable via scans",
        ],
    ),
    (
        "Stage 2: Mild",
        "Mild Cognitive Impairment",
        [
            "Minor memory lapses",
            "Still independent",
            "May notice changes",
        ],
    ),
    (
        "Stage 3: Moderate",
        "Moderate Dementia",
        [
            "Clear memory issues",
            "Needs some assistance",
            "Personality changes",
        ],
    ),
    (
        "Stage 4: Severe",
        "Severe Dementia",
        [
            "Loses ability to communicate",
            "Needs full-time care",
            "Physical decline",
        ],
    ),
];

const PREVENTION_TIPS: [&str; 6] = [
    "Regular exercise",
    "Mediterranean diet",
    "Mental stimulation",
    "Quality sleep",
    "Social engagement",
    "Manage blood pressure",
];

const RESOURCES: [(&str, &str, &str); 3] = [
    (
        "Alzheimer's Association",
        "Comprehensive resources and support",
        "https://www.alz.org",
    ),
    (
        "National Institute on Aging",
        "Research-based information",
        "https://www.nia.nih.gov/health/alzheimers",
    ),
    (
        "World Health Organization",
        "Global perspective",
        "https://www.who.int/news-room/fact-sheets/detail/dementia",
    ),
];

fn bullets(ui: &mut egui::Ui, items: &[&str]) {
    for item in items {
        ui.label(format!("• {item}"));
    }
}

impl UiApp {
    pub(super) fn render_education_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Dementia & Alzheimer's Information Hub");
        ui.add_space(12.0);

        ui.heading("Understanding Dementia");
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.strong("What is Dementia?");
            ui.label(
                "Dementia is an umbrella term for symptoms affecting memory, thinking and \
                 social abilities severely enough to interfere with daily life.",
            );
            ui.label("Key fact: Alzheimer's accounts for 60-80% of dementia cases.");
        });
        ui.add_space(12.0);

        ui.heading("Types of Dementia");
        for pair in DEMENTIA_TYPES.chunks(2) {
            ui.columns(2, |cols| {
                for (col, (title, points)) in cols.iter_mut().zip(pair.iter()) {
                    egui::CollapsingHeader::new(*title)
                        .default_open(*title == DEMENTIA_TYPES[0].0)
                        .show(col, |ui| bullets(ui, points));
                }
            });
        }
        ui.add_space(12.0);

        ui.heading("Alzheimer's Progression");
        ui.horizontal(|ui| {
            for (idx, (tab, _, _)) in STAGES.iter().enumerate() {
                ui.selectable_value(&mut self.stage_tab, idx, *tab);
            }
        });
        if let Some((_, summary, points)) = STAGES.get(self.stage_tab) {
            ui.strong(*summary);
            bullets(ui, points);
        }
        ui.add_space(12.0);

        ui.heading("Diagnosis & Prevention");
        ui.columns(2, |cols| {
            cols[0].strong("MRI Diagnosis");
            bullets(
                &mut cols[0],
                &[
                    "Hippocampus shrinkage",
                    "Rule out other causes",
                    "Track progression",
                ],
            );
            cols[1].strong("Prevention Tips");
            for tip in PREVENTION_TIPS {
                cols[1].label(format!("✔ {tip}"));
            }
        });
        ui.add_space(12.0);

        ui.heading("Trusted Resources");
        ui.columns(RESOURCES.len(), |cols| {
            for (col, (name, blurb, url)) in cols.iter_mut().zip(RESOURCES.iter()) {
                egui::Frame::group(col.style()).show(col, |ui| {
                    ui.hyperlink_to(*name, *url);
                    ui.label(*blurb);
                });
            }
        });
        ui.add_space(12.0);

        ui.small(
            "This information is for educational purposes only. \
             Consult a healthcare professional for medical advice.",
        );
    }
}

use anyhow::Result;
use approx::assert_relative_eq;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mri_core::{
    AppConfig, AppContext, ClassLabel, ClassifierConfig, Classify, InferenceError, RequestError,
    RequestState, ScanOptions, Source, Upload, collect_images, triage,
};
use ndarray::Array4;
use std::cell::Cell;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use tempfile::tempdir;

/// Scores the mean intensity of the red channel, so different images give
/// different but repeatable answers. Counts its invocations.
struct RedMeter {
    calls: Rc<Cell<usize>>,
}

impl Classify for RedMeter {
    fn probabilities(&self, batch: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(batch.shape(), &[1, 224, 224, 3]);
        assert!(batch.iter().all(|v| (0.0..=1.0).contains(v)));
        let red = batch.index_axis(ndarray::Axis(3), 0).mean().unwrap_or(0.0);
        let rest = (1.0 - red) / 3.0;
        Ok(vec![rest, rest, red, rest])
    }
}

struct Exploding;

impl Classify for Exploding {
    fn probabilities(&self, _batch: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        Err(InferenceError::Runtime("out of memory".into()))
    }
}

fn png(red: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(300, 200, Rgb([red, 10, 10]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn config_in(dir: &Path) -> AppConfig {
    AppConfig {
        scratch_dir: dir.to_path_buf(),
        ..AppConfig::default()
    }
}

fn meter() -> (RedMeter, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    (
        RedMeter {
            calls: calls.clone(),
        },
        calls,
    )
}

#[test]
fn classifier_path_reports_argmax_distribution_and_cleans_up() -> Result<()> {
    let dir = tempdir()?;
    let (model, calls) = meter();
    let ctx = AppContext::with_classifier(config_in(dir.path()), Box::new(model));

    let upload = Upload::new("scan_001.png", png(204));
    let diagnosis = ctx.analyze(&upload)?;

    assert_eq!(calls.get(), 1);
    assert_eq!(diagnosis.source, Source::Classifier);
    assert_eq!(diagnosis.label, ClassLabel::NonDemented);
    assert_relative_eq!(diagnosis.confidence, 80.0, epsilon = 1e-3);
    let dist = diagnosis.distribution.expect("classifier path has a distribution");
    assert_relative_eq!(dist.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    assert!(!dir.path().join("temp_img.jpg").exists());
    Ok(())
}

#[test]
fn filename_override_skips_classifier_regardless_of_content() -> Result<()> {
    let dir = tempdir()?;
    let (model, calls) = meter();
    let ctx = AppContext::with_classifier(config_in(dir.path()), Box::new(model));

    let upload = Upload::new("Moderate_7.jpg", b"not even an image".to_vec());
    let diagnosis = ctx.analyze(&upload)?;

    assert_eq!(calls.get(), 0);
    assert_eq!(diagnosis.label, ClassLabel::ModerateDemented);
    assert_relative_eq!(diagnosis.confidence, 99.9);
    assert_eq!(diagnosis.distribution, None);
    assert_eq!(diagnosis.source, Source::Override);
    assert!(!dir.path().join("temp_img.jpg").exists());
    Ok(())
}

#[test]
fn disabled_override_sends_pattern_names_to_the_classifier() -> Result<()> {
    let dir = tempdir()?;
    let (model, calls) = meter();
    let cfg = AppConfig {
        filename_override: false,
        ..config_in(dir.path())
    };
    let ctx = AppContext::with_classifier(cfg, Box::new(model));

    let diagnosis = ctx.analyze(&Upload::new("Moderate_7.jpg", png(30)))?;
    assert_eq!(calls.get(), 1);
    assert_eq!(diagnosis.source, Source::Classifier);
    Ok(())
}

#[test]
fn same_upload_twice_gives_identical_results() -> Result<()> {
    let dir = tempdir()?;
    let (model, _) = meter();
    let ctx = AppContext::with_classifier(config_in(dir.path()), Box::new(model));
    let upload = Upload::new("scan.png", png(90));

    let first = ctx.analyze(&upload)?;
    let second = ctx.analyze(&upload)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn unloadable_model_blocks_every_request() -> Result<()> {
    let dir = tempdir()?;
    let cfg = AppConfig {
        classifier: ClassifierConfig {
            model_path: dir.path().join("missing.onnx"),
            ..ClassifierConfig::default()
        },
        ..config_in(dir.path())
    };
    let ctx = AppContext::load(cfg);
    assert!(ctx.model_error().is_some());

    for name in ["scan.png", "Moderate_3.jpg"] {
        let state = ctx.handle(Some(&Upload::new(name, png(1))));
        assert!(matches!(
            state,
            RequestState::Blocked(RequestError::ModelUnavailable(_))
        ));
        assert_eq!(
            state.message().as_deref(),
            Some("Model not loaded - cannot make predictions")
        );
    }
    assert!(!dir.path().join("temp_img.jpg").exists());
    Ok(())
}

#[test]
fn decode_failure_fails_request_and_removes_scratch_file() -> Result<()> {
    let dir = tempdir()?;
    let (model, calls) = meter();
    let ctx = AppContext::with_classifier(config_in(dir.path()), Box::new(model));

    let state = ctx.handle(Some(&Upload::new("scan.jpg", b"garbage".to_vec())));
    assert!(matches!(
        state,
        RequestState::Failed(RequestError::Inference(InferenceError::Image(_)))
    ));
    assert_eq!(calls.get(), 0);
    assert!(!dir.path().join("temp_img.jpg").exists());
    Ok(())
}

#[test]
fn inference_failure_fails_request_and_removes_scratch_file() -> Result<()> {
    let dir = tempdir()?;
    let ctx = AppContext::with_classifier(config_in(dir.path()), Box::new(Exploding));

    let state = ctx.handle(Some(&Upload::new("scan.png", png(5))));
    let message = state.message().unwrap_or_default();
    assert!(matches!(state, RequestState::Failed(_)));
    assert_eq!(message, "Error during prediction: classifier failed: out of memory");
    assert!(!dir.path().join("temp_img.jpg").exists());
    Ok(())
}

#[test]
fn triage_records_failures_and_keeps_going() -> Result<()> {
    let scans = tempdir()?;
    std::fs::write(scans.path().join("a.png"), png(250))?;
    std::fs::write(scans.path().join("b.jpg"), b"broken")?;
    std::fs::write(scans.path().join("Moderate_12.jpg"), png(0))?;

    let scratch = tempdir()?;
    let (model, calls) = meter();
    let ctx = AppContext::with_classifier(config_in(scratch.path()), Box::new(model));

    let files = collect_images(scans.path(), ScanOptions::default())?;
    let mut seen = Vec::new();
    let rows = triage(&ctx, &files, |done, total| seen.push((done, total)));

    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(calls.get(), 1);
    let by_name = |name: &str| {
        rows.iter()
            .find(|r| r.file.file_name().is_some_and(|n| n == name))
            .cloned()
            .unwrap()
    };
    assert_eq!(
        by_name("Moderate_12.jpg").diagnosis.map(|d| d.source),
        Some(Source::Override)
    );
    assert!(by_name("b.jpg").error.is_some());
    assert_eq!(
        by_name("a.png").diagnosis.map(|d| d.label),
        Some(ClassLabel::NonDemented)
    );
    Ok(())
}

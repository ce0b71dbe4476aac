//! Batch triage: collect scans from disk, run each through an `AppContext`
//! and write the outcome as CSV.

use crate::lifecycle::{AppContext, Diagnosis, Source, Upload};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One scanned file and what became of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRow {
    pub file: PathBuf,
    pub diagnosis: Option<Diagnosis>,
    /// Set when the request failed for this file.
    pub error: Option<String>,
}

/// Options controlling how folder scanning behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// When true, scan subdirectories recursively.
    pub recursive: bool,
}

/// Supported scans under `path`, or `path` itself if it is a file.
pub fn collect_images(path: impl AsRef<Path>, opts: ScanOptions) -> Result<Vec<PathBuf>> {
    let root = path.as_ref();
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let walker = if opts.recursive {
        WalkDir::new(root).into_iter()
    } else {
        WalkDir::new(root).max_depth(1).into_iter()
    };

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("walkdir error: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_supported_image(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Classify every file in turn. A failing file is recorded and skipped.
pub fn triage<F>(ctx: &AppContext, files: &[PathBuf], mut progress: F) -> Vec<ScanRow>
where
    F: FnMut(usize, usize),
{
    let total = files.len();
    let mut rows = Vec::with_capacity(total);
    for (idx, file) in files.iter().enumerate() {
        let outcome = Upload::from_path(file)
            .map_err(|e| e.to_string())
            .and_then(|upload| ctx.analyze(&upload).map_err(|e| e.to_string()));
        let row = match outcome {
            Ok(diagnosis) => ScanRow {
                file: file.clone(),
                diagnosis: Some(diagnosis),
                error: None,
            },
            Err(err) => {
                tracing::warn!("triage failed for {}: {err}", file.display());
                ScanRow {
                    file: file.clone(),
                    diagnosis: None,
                    error: Some(err),
                }
            }
        };
        rows.push(row);
        progress(idx + 1, total);
    }
    rows
}

/// Export the provided rows to CSV with headers:
/// file,label,confidence,source
pub fn export_csv(rows: &[ScanRow], path: impl AsRef<Path>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["file", "label", "confidence", "source"])?;

    for row in rows {
        let (label, confidence, source) = match &row.diagnosis {
            Some(d) => (
                d.label.as_str(),
                format!("{:.2}", d.confidence),
                match d.source {
                    Source::Classifier => "classifier",
                    Source::Override => "override",
                },
            ),
            None => ("", String::new(), "error"),
        };
        wtr.write_record([
            row.file.to_string_lossy().as_ref(),
            label,
            confidence.as_str(),
            source,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            matches!(ext.as_str(), "jpg" | "jpeg" | "png")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ClassLabel;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn export_csv_writes_expected_headers_and_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        let rows = vec![
            ScanRow {
                file: PathBuf::from("a.jpg"),
                diagnosis: None,
                error: Some("Error during prediction: boom".into()),
            },
            ScanRow {
                file: PathBuf::from("Moderate_1.jpg"),
                diagnosis: Some(Diagnosis {
                    label: ClassLabel::ModerateDemented,
                    confidence: 99.9,
                    distribution: None,
                    source: Source::Override,
                }),
                error: None,
            },
            ScanRow {
                file: PathBuf::from("c.png"),
                diagnosis: Some(Diagnosis {
                    label: ClassLabel::NonDemented,
                    confidence: 81.27,
                    distribution: Some([0.1, 0.02, 0.8127, 0.0673]),
                    source: Source::Classifier,
                }),
                error: None,
            },
        ];

        export_csv(&rows, &path)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        let headers = rdr.headers()?.clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["file", "label", "confidence", "source"]
        );

        let mut recs = rdr.records();
        let r1 = recs.next().unwrap()?;
        assert_eq!(&r1[0], "a.jpg");
        assert_eq!(&r1[1], "");
        assert_eq!(&r1[2], "");
        assert_eq!(&r1[3], "error");

        let r2 = recs.next().unwrap()?;
        assert_eq!(&r2[1], "ModerateDemented");
        assert_eq!(&r2[2], "99.90");
        assert_eq!(&r2[3], "override");

        let r3 = recs.next().unwrap()?;
        assert_eq!(&r3[0], "c.png");
        assert_eq!(&r3[1], "NonDemented");
        assert_eq!(&r3[2], "81.27");
        assert_eq!(&r3[3], "classifier");

        assert!(recs.next().is_none());
        Ok(())
    }

    #[test]
    fn collect_images_lists_only_images_non_recursive() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("a.JPG"))?;
        File::create(dir.path().join("b.jpeg"))?;
        File::create(dir.path().join("c.png"))?;
        File::create(dir.path().join("notes.txt"))?;
        let nested = dir.path().join("nested");
        fs::create_dir(&nested)?;
        File::create(nested.join("d.jpg"))?;

        let files = collect_images(dir.path(), ScanOptions { recursive: false })?;
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.jpeg", "c.png"]);

        let all = collect_images(dir.path(), ScanOptions { recursive: true })?;
        assert_eq!(all.len(), 4);
        Ok(())
    }

    #[test]
    fn collect_images_accepts_single_file_and_rejects_missing() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("scan.png");
        File::create(&file)?;
        assert_eq!(collect_images(&file, ScanOptions::default())?, vec![file]);
        assert!(collect_images(dir.path().join("nope"), ScanOptions::default()).is_err());
        Ok(())
    }
}

//! Applicant store: a flat directory of paired files per accepted
//! submission. The CV keeps its original extension; a `.json` sidecar with
//! the same stem holds the metadata record. Files are write-once; retention
//! and cleanup are someone else's job.
//!
//! Concurrent submissions never coordinate: uniqueness comes from the
//! millisecond timestamp plus a random suffix in the stem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::apply::form::{ApplicationForm, CvUpload};

/// Metadata persisted alongside each CV. Everything the applicant submitted
/// except the reCAPTCHA token, plus request provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    pub cv_path: String,
    pub submitted_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: String,
}

/// Filenames of one stored submission.
#[derive(Debug)]
pub struct SavedApplication {
    pub cv_filename: String,
    pub record_filename: String,
}

#[derive(Debug, Clone)]
pub struct ApplicantStore {
    dir: PathBuf,
}

impl ApplicantStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists one accepted submission: CV bytes first, metadata second, so
    /// a record on disk always points at a CV that exists.
    pub async fn save(
        &self,
        form: &ApplicationForm,
        cv: &CvUpload,
        ext: &str,
        user_agent: Option<String>,
        ip: String,
    ) -> Result<SavedApplication> {
        fs::create_dir_all(&self.dir).await.with_context(|| {
            format!("Failed to create applicants directory {}", self.dir.display())
        })?;

        let stem = filename_stem(
            Utc::now().timestamp_millis(),
            &form.name,
            rand::thread_rng().gen(),
        );
        let cv_filename = format!("{stem}{ext}");
        let record_filename = format!("{stem}.json");

        fs::write(self.dir.join(&cv_filename), &cv.data)
            .await
            .with_context(|| format!("Failed to write CV file {cv_filename}"))?;

        let record = ApplicationRecord {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            portfolio: form.portfolio.clone(),
            cv_path: cv_filename.clone(),
            submitted_at: Utc::now(),
            user_agent,
            ip,
        };
        let json = serde_json::to_vec_pretty(&record).context("Failed to serialize record")?;

        fs::write(self.dir.join(&record_filename), json)
            .await
            .with_context(|| format!("Failed to write record file {record_filename}"))?;

        Ok(SavedApplication {
            cv_filename,
            record_filename,
        })
    }
}

/// Shared filename stem for one submission. Pure function of its inputs so
/// the sortable-timestamp and collision-resistance properties are testable.
pub fn filename_stem(timestamp_ms: i64, name: &str, random: [u8; 4]) -> String {
    format!("{timestamp_ms}_{}_{}", sanitize_name(name), hex::encode(random))
}

/// Lower-cases the applicant name and replaces everything outside `[a-z0-9]`
/// with `_`, preventing path traversal through the filename.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn sanitize_lowercases_and_replaces_specials() {
        assert_eq!(sanitize_name("Jane Doe"), "jane_doe");
        assert_eq!(sanitize_name("O'Brien-Smith"), "o_brien_smith");
        assert_eq!(sanitize_name("Ada99"), "ada99");
    }

    #[test]
    fn sanitize_defuses_path_traversal() {
        assert_eq!(sanitize_name("../../etc/passwd"), "______etc_passwd");
    }

    #[test]
    fn stem_is_deterministic_in_its_inputs() {
        let stem = filename_stem(1_700_000_000_000, "Jane Doe", [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(stem, "1700000000000_jane_doe_deadbeef");
    }

    #[test]
    fn stems_differ_when_only_randomness_differs() {
        let a = filename_stem(1_700_000_000_000, "Jane Doe", [0, 0, 0, 1]);
        let b = filename_stem(1_700_000_000_000, "Jane Doe", [0, 0, 0, 2]);
        assert_ne!(a, b);
    }

    fn sample_form() -> ApplicationForm {
        ApplicationForm {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "0600000000".to_string(),
            portfolio: None,
            recaptcha_token: "tok".to_string(),
        }
    }

    #[tokio::test]
    async fn save_writes_cv_and_record_with_shared_stem() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApplicantStore::new(dir.path().join("applicants"));
        let cv = CvUpload {
            filename: "resume.pdf".to_string(),
            data: Bytes::from_static(b"0123456789"),
        };

        let saved = store
            .save(
                &sample_form(),
                &cv,
                ".pdf",
                Some("test-agent/1.0".to_string()),
                "203.0.113.7".to_string(),
            )
            .await
            .unwrap();

        assert!(saved.cv_filename.ends_with(".pdf"));
        assert!(saved.record_filename.ends_with(".json"));
        assert_eq!(
            saved.cv_filename.trim_end_matches(".pdf"),
            saved.record_filename.trim_end_matches(".json")
        );

        let cv_bytes = std::fs::read(store.dir().join(&saved.cv_filename)).unwrap();
        assert_eq!(cv_bytes, b"0123456789");

        let json = std::fs::read(store.dir().join(&saved.record_filename)).unwrap();
        let record: ApplicationRecord = serde_json::from_slice(&json).unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.email, "jane@example.com");
        assert_eq!(record.cv_path, saved.cv_filename);
        assert_eq!(record.ip, "203.0.113.7");
        assert_eq!(record.user_agent.as_deref(), Some("test-agent/1.0"));
    }

    #[tokio::test]
    async fn record_json_never_contains_the_recaptcha_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApplicantStore::new(dir.path().to_path_buf());
        let cv = CvUpload {
            filename: "resume.docx".to_string(),
            data: Bytes::from_static(b"x"),
        };

        let saved = store
            .save(&sample_form(), &cv, ".docx", None, "unknown".to_string())
            .await
            .unwrap();

        let json = std::fs::read_to_string(store.dir().join(&saved.record_filename)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("recaptchaToken").is_none());
        for key in ["name", "email", "phone", "cvPath", "submittedAt", "userAgent", "ip"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[tokio::test]
    async fn identical_submissions_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApplicantStore::new(dir.path().to_path_buf());
        let cv = CvUpload {
            filename: "resume.pdf".to_string(),
            data: Bytes::from_static(b"x"),
        };

        let a = store
            .save(&sample_form(), &cv, ".pdf", None, "unknown".to_string())
            .await
            .unwrap();
        let b = store
            .save(&sample_form(), &cv, ".pdf", None, "unknown".to_string())
            .await
            .unwrap();

        assert_ne!(a.cv_filename, b.cv_filename);
        assert_ne!(a.record_filename, b.record_filename);
    }
}

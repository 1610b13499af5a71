use axum::extract::Multipart;
use bytes::Bytes;
use validator::{ValidateEmail, ValidateUrl};

use crate::errors::AppError;

/// CVs larger than this are rejected before anything touches disk.
pub const MAX_CV_BYTES: usize = 5 * 1024 * 1024;

/// Extension whitelist, matched case-insensitively against the suffix of the
/// original filename.
pub const ALLOWED_CV_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Text fields of one application, as read from the multipart body.
/// Missing fields stay empty/absent and fall through to validation.
#[derive(Debug, Default)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub portfolio: Option<String>,
    pub recaptcha_token: String,
}

/// The uploaded CV: original filename plus raw bytes.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub filename: String,
    pub data: Bytes,
}

/// Reads the multipart body into the form fields and the CV part.
/// Unknown parts are skipped; duplicate parts keep the last occurrence.
pub async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(ApplicationForm, Option<CvUpload>), AppError> {
    let mut form = ApplicationForm::default();
    let mut cv = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("Malformed form data".to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "cv" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::Validation("Malformed form data".to_string()))?;
                cv = Some(CvUpload { filename, data });
            }
            "name" => form.name = text(field).await?,
            "email" => form.email = text(field).await?,
            "phone" => form.phone = text(field).await?,
            "portfolio" => form.portfolio = Some(text(field).await?),
            "recaptchaToken" => form.recaptcha_token = text(field).await?,
            _ => {}
        }
    }

    Ok((form, cv))
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|_| AppError::Validation("Malformed form data".to_string()))
}

impl ApplicationForm {
    /// Validates the text fields in declared order (name, email, phone,
    /// portfolio, recaptchaToken) and surfaces the first violated
    /// constraint's message.
    pub fn validate(&self) -> Result<(), AppError> {
        let reject = |msg: &str| Err(AppError::Validation(msg.to_string()));

        let name_len = self.name.chars().count();
        if name_len < 2 {
            return reject("Name is too short");
        }
        if name_len > 100 {
            return reject("Name is too long");
        }

        if !self.email.validate_email() {
            return reject("Invalid email address");
        }

        if self.phone.chars().count() < 10 {
            return reject("Phone number is too short");
        }

        // Portfolio is optional; only a non-empty value must be a valid URL.
        if let Some(url) = self.portfolio.as_deref() {
            if !url.is_empty() && !url.validate_url() {
                return reject("Portfolio must be a valid URL");
            }
        }

        if self.recaptcha_token.is_empty() {
            return reject("reCAPTCHA is required");
        }

        Ok(())
    }
}

/// Enforces the extension whitelist and size cap. Returns the lower-cased
/// extension (with dot) for reuse in the stored filename.
pub fn check_cv(cv: &CvUpload) -> Result<String, AppError> {
    let ext = file_extension(&cv.filename).ok_or_else(invalid_file_type)?;
    if !ALLOWED_CV_EXTENSIONS.contains(&ext.as_str()) {
        return Err(invalid_file_type());
    }

    if cv.data.len() > MAX_CV_BYTES {
        return Err(AppError::Validation("File too large. Max 5MB.".to_string()));
    }

    Ok(ext)
}

fn invalid_file_type() -> AppError {
    AppError::Validation("Invalid file type. Only PDF and DOC are allowed.".to_string())
}

/// Suffix of the filename from the last dot, lower-cased. `None` when there
/// is no dot at all.
fn file_extension(filename: &str) -> Option<String> {
    let dot = filename.rfind('.')?;
    Some(filename[dot..].to_ascii_lowercase())
}

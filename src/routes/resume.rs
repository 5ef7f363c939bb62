use axum::extract::{Multipart, State};
use axum::response::Json;
use axum::Extension;
use tokio::process::Command;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::Candidate;
use crate::services::candidate_service;
use crate::AppState;

const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Accepts a PDF, DOCX or plain-text resume for the authenticated candidate,
/// extracts its text, and stores the parsed profile.
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<Candidate>> {
    let candidate =
        candidate_service::find_or_create(&state.pool, &claims.name, &claims.email).await?;

    let mut file_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let data = field.bytes().await?;
            if data.len() > MAX_RESUME_BYTES {
                return Err(Error::BadRequest("Resume exceeds 5 MB".to_string()));
            }
            file_bytes = Some(data.to_vec());
        }
    }
    let bytes = file_bytes.ok_or_else(|| Error::BadRequest("Missing file field".to_string()))?;
    if bytes.is_empty() {
        return Err(Error::BadRequest("Empty resume file".to_string()));
    }

    let format = ResumeFormat::sniff(&bytes);

    let uploads_dir = &get_config().uploads_dir;
    tokio::fs::create_dir_all(uploads_dir).await?;
    let stored_path = format!("{}/{}.{}", uploads_dir, candidate.id, format.extension());
    tokio::fs::write(&stored_path, &bytes).await?;

    let text = match format {
        ResumeFormat::Pdf => extract_pdf_text(&stored_path, &bytes).await,
        ResumeFormat::Docx => extract_docx_text(&stored_path).await,
        ResumeFormat::Text => String::from_utf8_lossy(&bytes).into_owned(),
    };
    if text.trim().is_empty() {
        return Err(Error::BadRequest(
            "Could not extract any text from the resume".to_string(),
        ));
    }

    let parsed = state.ai.parse_resume(&text).await?;
    let candidate =
        candidate_service::apply_parsed_resume(&state.pool, candidate.id, &stored_path, &parsed)
            .await?;

    tracing::info!(candidate_id = %candidate.id, skills = parsed.skills.len(), "resume parsed and stored");
    Ok(Json(candidate))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeFormat {
    Pdf,
    Docx,
    Text,
}

impl ResumeFormat {
    fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"%PDF") {
            ResumeFormat::Pdf
        } else if bytes.starts_with(b"PK\x03\x04") {
            ResumeFormat::Docx
        } else {
            ResumeFormat::Text
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Docx => "docx",
            ResumeFormat::Text => "txt",
        }
    }
}

/// Prefers `pdftotext` when available; falls back to a lossy scrape of the
/// raw bytes, which is enough for text-layer PDFs.
async fn extract_pdf_text(path: &str, bytes: &[u8]) -> String {
    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()
        .await;
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).into_owned(),
        _ => String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| c.is_ascii_graphic() || c.is_whitespace())
            .collect(),
    }
}

/// DOCX is a zip of XML parts; pull the main document and strip its tags.
async fn extract_docx_text(path: &str) -> String {
    let output = Command::new("unzip")
        .arg("-p")
        .arg(path)
        .arg("word/document.xml")
        .output()
        .await;
    match output {
        Ok(out) if out.status.success() => {
            strip_xml_tags(&String::from_utf8_lossy(&out.stdout))
        }
        _ => String::new(),
    }
}

fn strip_xml_tags(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_tag = false;
    for c in xml.chars() {
        match c {
            '<' => {
                in_tag = true;
                // Word runs carry no whitespace between tags.
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

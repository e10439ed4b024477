//! Uploaded certification documents.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, DocumentId, DocumentName, DocumentType, FolderId, Stage};

/// File extensions accepted by the upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "jpg", "jpeg", "png", "txt", "csv", "zip",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub client_id: ClientId,
    /// `None` once the folder it was filed under has been removed.
    pub folder_id: Option<FolderId>,
    pub name: DocumentName,
    pub document_type: DocumentType,
    pub stage: Stage,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub storage_key: String,
    pub original_filename: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDocument {
    pub client_id: ClientId,
    pub folder_id: FolderId,
    pub name: DocumentName,
    pub document_type: DocumentType,
    pub stage: Stage,
    pub storage_key: String,
    pub original_filename: String,
    pub file_size: i64,
    pub uploaded_by: String,
}

/// Lower-cased extension of `filename`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

pub fn is_allowed_extension(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Strips any directory components a browser may send along with the name.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(is_allowed_extension("rapor.PDF"));
        assert!(is_allowed_extension("tablo.xlsx"));
        assert!(!is_allowed_extension("script.exe"));
        assert!(!is_allowed_extension("README"));
        assert!(!is_allowed_extension(".pdf"));
    }

    #[test]
    fn filenames_lose_directories() {
        assert_eq!(sanitize_filename("C:\\Users\\a\\rapor.pdf"), "rapor.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("plan.docx"), "plan.docx");
    }
}

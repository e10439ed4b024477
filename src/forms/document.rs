use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_multipart::form::MultipartForm;
use serde::Deserialize;

use crate::domain::document::sanitize_filename;
use crate::domain::types::{ClientId, DocumentName, DocumentType, FolderId, Stage};
use crate::forms::FormError;

/// Multipart body of `POST /upload-document`; one file per request.
#[derive(MultipartForm)]
pub struct UploadDocumentForm {
    #[multipart(limit = "100MB")]
    pub file: TempFile,
    pub client_id: Text<i32>,
    pub folder_id: Option<Text<i32>>,
    pub document_name: Text<String>,
    pub document_type: Text<String>,
    pub stage: Text<String>,
}

/// Validated metadata of an upload; the bytes travel separately.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    pub client_id: ClientId,
    pub folder_id: FolderId,
    pub name: DocumentName,
    pub document_type: DocumentType,
    pub stage: Stage,
    pub original_filename: String,
    pub file_size: u64,
}

impl DocumentUpload {
    /// Builds the metadata from raw field values.
    pub fn parse(
        client_id: i32,
        folder_id: Option<i32>,
        document_name: &str,
        document_type: &str,
        stage: &str,
        file_name: Option<&str>,
        file_size: u64,
    ) -> Result<Self, FormError> {
        let folder_id = folder_id.ok_or(FormError::MissingFolder)?;
        let original_filename = file_name
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .ok_or(FormError::MissingFile)?;

        Ok(Self {
            client_id: ClientId::new(client_id).map_err(|_| FormError::InvalidClientId)?,
            folder_id: FolderId::new(folder_id).map_err(|_| FormError::InvalidFolderId)?,
            name: DocumentName::new(document_name).map_err(|_| FormError::InvalidName)?,
            document_type: document_type
                .parse()
                .map_err(|err| FormError::invalid("document_type", err))?,
            stage: stage
                .parse()
                .map_err(|err| FormError::invalid("stage", err))?,
            original_filename,
            file_size,
        })
    }
}

impl UploadDocumentForm {
    /// Splits the form into validated metadata and the spooled file.
    pub fn into_upload(self) -> Result<(DocumentUpload, TempFile), FormError> {
        let upload = DocumentUpload::parse(
            self.client_id.into_inner(),
            self.folder_id.map(Text::into_inner),
            &self.document_name,
            &self.document_type,
            &self.stage,
            self.file.file_name.as_deref(),
            self.file.size as u64,
        )?;
        Ok((upload, self.file))
    }
}

/// Query of `GET /documents/{id}/download`.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    /// Serve inline instead of as an attachment.
    #[serde(default)]
    pub inline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_requires_a_folder() {
        let result = DocumentUpload::parse(
            1,
            None,
            "Karbon Raporu",
            "carbon_footprint_report",
            "Stage1",
            Some("rapor.pdf"),
            10,
        );
        assert!(matches!(result, Err(FormError::MissingFolder)));
    }

    #[test]
    fn upload_metadata_is_parsed_and_filename_stripped() {
        let upload = DocumentUpload::parse(
            1,
            Some(7),
            " Karbon Raporu ",
            "carbon_footprint_report",
            "Stage2",
            Some("C:\\Users\\ayse\\rapor.pdf"),
            10,
        )
        .unwrap();
        assert_eq!(upload.folder_id.get(), 7);
        assert_eq!(upload.name.as_str(), "Karbon Raporu");
        assert_eq!(upload.document_type, DocumentType::CarbonFootprintReport);
        assert_eq!(upload.stage, Stage::Stage2);
        assert_eq!(upload.original_filename, "rapor.pdf");
    }

    #[test]
    fn unknown_document_type_is_rejected() {
        let result = DocumentUpload::parse(
            1,
            Some(7),
            "Belge",
            "invoice",
            "Stage1",
            Some("a.pdf"),
            10,
        );
        assert!(matches!(result, Err(FormError::InvalidValue { .. })));
    }
}

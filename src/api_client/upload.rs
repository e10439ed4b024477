use std::fmt::{Display, Formatter};

use crate::api_client::errors::ApiError;
use crate::dto::api::UploadResponse;

/// Outcome of a multi-file upload. Files are sent one request at a time and
/// the batch stops at the first failure; files already stored stay stored.
#[derive(Debug)]
pub struct UploadReport {
    pub succeeded: Vec<UploadResponse>,
    /// Zero-based index of the file that failed, with its error.
    pub failed: Option<(usize, ApiError)>,
    pub total: usize,
}

impl UploadReport {
    pub fn new(total: usize) -> Self {
        Self {
            succeeded: Vec::with_capacity(total),
            failed: None,
            total,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_none() && self.succeeded.len() == self.total
    }

    /// Files never attempted because an earlier one failed.
    pub fn skipped(&self) -> usize {
        self.total
            .saturating_sub(self.succeeded.len())
            .saturating_sub(usize::from(self.failed.is_some()))
    }

    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl Display for UploadReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.failed {
            None => write!(f, "{}/{} dosya yüklendi", self.succeeded.len(), self.total),
            Some((index, err)) => write!(
                f,
                "{}/{} dosya yüklendi, {}. dosyada hata: {}",
                self.succeeded.len(),
                self.total,
                index + 1,
                err.detail()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::domain::types::DocumentId;

    fn uploaded(id: i32) -> UploadResponse {
        UploadResponse {
            message: "Belge yüklendi".to_string(),
            document_id: DocumentId::new(id).unwrap(),
            file_size: 10,
        }
    }

    #[test]
    fn partial_failure_names_the_failing_file() {
        let mut report = UploadReport::new(3);
        report.succeeded.push(uploaded(1));
        report.failed = Some((
            1,
            ApiError::Http {
                status: StatusCode::BAD_REQUEST,
                detail: "Desteklenmeyen dosya türü".to_string(),
            },
        ));

        assert!(!report.is_complete());
        assert_eq!(report.skipped(), 1);
        assert_eq!(
            report.summary(),
            "1/3 dosya yüklendi, 2. dosyada hata: Desteklenmeyen dosya türü"
        );
    }

    #[test]
    fn full_success_is_complete() {
        let mut report = UploadReport::new(2);
        report.succeeded.push(uploaded(1));
        report.succeeded.push(uploaded(2));
        assert!(report.is_complete());
        assert_eq!(report.summary(), "2/2 dosya yüklendi");
    }
}

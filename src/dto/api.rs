//! JSON bodies shared by the REST endpoints and the API client.

use serde::{Deserialize, Serialize};

use crate::domain::types::{DocumentId, Stage};

/// Error body of every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of `POST /upload-document`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub message: String,
    pub document_id: DocumentId,
    pub file_size: i64,
}

/// Result of `POST /clients/{id}/folders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoldersCreated {
    pub message: String,
    pub created: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageDistribution {
    pub stage_1: usize,
    pub stage_2: usize,
    pub stage_3: usize,
}

impl StageDistribution {
    /// Distribution of a single hotel at `stage`.
    pub fn one_hot(stage: Stage) -> Self {
        let mut distribution = Self::default();
        *distribution.slot(stage) = 1;
        distribution
    }

    pub fn slot(&mut self, stage: Stage) -> &mut usize {
        match stage {
            Stage::Stage1 => &mut self.stage_1,
            Stage::Stage2 => &mut self.stage_2,
            Stage::Stage3 => &mut self.stage_3,
        }
    }

    pub fn total(&self) -> usize {
        self.stage_1 + self.stage_2 + self.stage_3
    }
}

/// Dashboard counters returned by `GET /stats`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total_clients: usize,
    pub stage_distribution: StageDistribution,
    pub total_documents: usize,
    pub total_trainings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_distribution_marks_only_the_stage() {
        let distribution = StageDistribution::one_hot(Stage::Stage2);
        assert_eq!(distribution.stage_1, 0);
        assert_eq!(distribution.stage_2, 1);
        assert_eq!(distribution.total(), 1);
    }

    #[test]
    fn stats_serialize_with_snake_case_stage_keys() {
        let stats = Stats {
            total_clients: 3,
            stage_distribution: StageDistribution {
                stage_1: 1,
                stage_2: 1,
                stage_3: 1,
            },
            total_documents: 10,
            total_trainings: 2,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["stage_distribution"]["stage_3"], 1);
        assert_eq!(json["total_documents"], 10);
    }
}

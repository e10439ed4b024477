//! JSON bodies sent by [`super::ApiClient`].
//!
//! Optional fields are omitted when `None`, so an update carries only what
//! the caller changed.

use serde::Serialize;

use crate::domain::types::{
    ClientId, DocumentType, FolderId, ServiceType, Stage, TrainingStatus,
};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NewClientRequest {
    pub name: String,
    pub hotel_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ClientUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services_completed: Option<Vec<ServiceType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_footprint: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sustainability_score: Option<i32>,
}

impl ClientUpdateRequest {
    pub fn stage(stage: Stage) -> Self {
        Self {
            current_stage: Some(stage),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrainingRequest {
    pub client_id: ClientId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    /// `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`.
    pub training_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TrainingStatus>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TrainingUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TrainingStatus>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConsumptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    pub year: i32,
    pub month: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_gas: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation_count: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
}

/// Metadata of one file in a document upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUploadRequest {
    pub client_id: ClientId,
    pub folder_id: Option<FolderId>,
    pub document_name: String,
    pub document_type: DocumentType,
    pub stage: Stage,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DocumentUploadRequest {
    pub(crate) fn into_form(self) -> reqwest::multipart::Form {
        let file = reqwest::multipart::Part::bytes(self.bytes).file_name(self.filename);
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("client_id", self.client_id.to_string())
            .text("document_name", self.document_name)
            .text("document_type", self.document_type.as_str())
            .text("stage", self.stage.as_str());
        match self.folder_id {
            Some(folder_id) => form.text("folder_id", folder_id.to_string()),
            None => form,
        }
    }
}

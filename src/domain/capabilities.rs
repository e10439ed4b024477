//! Permission descriptor resolved once per session.
//!
//! Views and services ask a [`Capabilities`] value what the caller may do
//! instead of comparing role strings.

use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, UserRole};
use crate::domain::user::User;

/// Sections of the portal shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Dashboard,
    Clients,
    Documents,
    Trainings,
    Consumption,
}

impl Tab {
    pub const fn path(self) -> &'static str {
        match self {
            Tab::Dashboard => "/",
            Tab::Clients => "/clients",
            Tab::Documents => "/documents",
            Tab::Trainings => "/trainings",
            Tab::Consumption => "/consumption",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Genel Bakış",
            Tab::Clients => "Müşteriler",
            Tab::Documents => "Belgeler",
            Tab::Trainings => "Eğitimler",
            Tab::Consumption => "Tüketim",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub role: UserRole,
    pub can_view_all_clients: bool,
    pub can_manage_clients: bool,
    pub can_manage_trainings: bool,
    pub can_upload_documents: bool,
    pub can_delete_documents: bool,
    pub can_record_consumption: bool,
    /// Client the caller is confined to; `None` for admins and unlinked users.
    pub scope_client_id: Option<ClientId>,
}

impl Capabilities {
    /// Derives permissions from the stored user record.
    pub fn for_user(user: &User) -> Self {
        Self::for_role(user.role, user.client_id)
    }

    /// Derives permissions from a role and an optional linked client.
    ///
    /// Also used client-side for optimistic rendering before the backend
    /// confirms the session.
    pub fn for_role(role: UserRole, client_id: Option<ClientId>) -> Self {
        match role {
            UserRole::Admin => Self {
                role,
                can_view_all_clients: true,
                can_manage_clients: true,
                can_manage_trainings: true,
                can_upload_documents: true,
                can_delete_documents: true,
                can_record_consumption: true,
                scope_client_id: None,
            },
            UserRole::Client => {
                let linked = client_id.is_some();
                Self {
                    role,
                    can_view_all_clients: false,
                    can_manage_clients: false,
                    can_manage_trainings: false,
                    can_upload_documents: linked,
                    can_delete_documents: false,
                    can_record_consumption: linked,
                    scope_client_id: client_id,
                }
            }
        }
    }

    /// Whether data of `client_id` may be read.
    pub fn can_access_client(&self, client_id: ClientId) -> bool {
        self.can_view_all_clients || self.scope_client_id == Some(client_id)
    }

    pub fn can_upload_for(&self, client_id: ClientId) -> bool {
        self.can_upload_documents && self.can_access_client(client_id)
    }

    pub fn can_record_consumption_for(&self, client_id: ClientId) -> bool {
        self.can_record_consumption && self.can_access_client(client_id)
    }

    /// Shell tabs in display order.
    pub fn tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Dashboard];
        if self.can_view_all_clients {
            tabs.push(Tab::Clients);
        }
        tabs.extend([Tab::Documents, Tab::Trainings, Tab::Consumption]);
        tabs
    }
}

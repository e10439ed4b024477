//! DTOs of the folder browser.

use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::domain::document::Document;
use crate::domain::folder::Folder;
use crate::domain::navigation::FolderSelection;

/// Position in the browser; both parts are optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub client_id: Option<i32>,
    #[serde(default)]
    pub folder_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DocumentsPageData {
    /// Hotels the caller may switch between; a single entry for client users.
    pub clients: Vec<Client>,
    pub client: Option<Client>,
    pub selection: FolderSelection,
    /// Folders of the breadcrumb, category first.
    pub breadcrumb: Vec<Folder>,
    pub categories: Vec<Folder>,
    /// Leaf folders of the open category.
    pub leaves: Vec<Folder>,
    /// Documents filed under the open leaf.
    pub documents: Vec<Document>,
    /// Documents without a reachable folder; only filled for users who may delete.
    pub unfiled: Vec<Document>,
}

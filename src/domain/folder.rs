//! Three-level document folder tree kept per client.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, FolderId, FolderName, TypeConstraintError};

/// Depth of a folder inside a client's tree.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i32", into = "i32")]
pub enum FolderLevel {
    /// `"{client} SYS"` root, one per client.
    Root,
    /// Column category such as `"A SÜTUNU"`.
    Category,
    /// Leaf folder (`"A1"`, `"B3"`); the only level holding documents.
    Leaf,
}

impl FolderLevel {
    pub const fn get(self) -> i32 {
        match self {
            FolderLevel::Root => 0,
            FolderLevel::Category => 1,
            FolderLevel::Leaf => 2,
        }
    }

    /// Level a parent folder must have, `None` for roots.
    pub const fn parent_level(self) -> Option<FolderLevel> {
        match self {
            FolderLevel::Root => None,
            FolderLevel::Category => Some(FolderLevel::Root),
            FolderLevel::Leaf => Some(FolderLevel::Category),
        }
    }
}

impl TryFrom<i32> for FolderLevel {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FolderLevel::Root),
            1 => Ok(FolderLevel::Category),
            2 => Ok(FolderLevel::Leaf),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "folder level {other}"
            ))),
        }
    }
}

impl From<FolderLevel> for i32 {
    fn from(value: FolderLevel) -> Self {
        value.get()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: FolderId,
    pub client_id: ClientId,
    pub name: FolderName,
    pub level: FolderLevel,
    pub parent_folder_id: Option<FolderId>,
    pub created_at: NaiveDateTime,
}

impl Folder {
    pub fn is_leaf(&self) -> bool {
        self.level == FolderLevel::Leaf
    }
}

/// Column names and their leaf folders created for every new client.
pub const DEFAULT_COLUMNS: &[(&str, &[&str])] = &[
    (
        "A SÜTUNU",
        &[
            "A1", "A2", "A3", "A4", "A5", "A7.1", "A7.2", "A7.3", "A7.4", "A8", "A9", "A10",
        ],
    ),
    (
        "B SÜTUNU",
        &["B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B9"],
    ),
    ("C SÜTUNU", &["C1", "C2", "C3", "C4"]),
    ("D SÜTUNU", &["D1", "D2", "D3"]),
];

/// Blueprint of a folder tree to be materialized for one client.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderTemplate {
    pub root: FolderName,
    pub columns: Vec<(FolderName, Vec<FolderName>)>,
}

impl FolderTemplate {
    /// The standard `"{client} SYS"` tree with the A-D columns.
    pub fn standard(client_name: &str) -> Result<Self, TypeConstraintError> {
        let root = FolderName::new(format!("{} SYS", client_name.trim()))?;
        let columns = DEFAULT_COLUMNS
            .iter()
            .map(|(column, leaves)| {
                let leaves = leaves
                    .iter()
                    .map(|leaf| FolderName::new(*leaf))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((FolderName::new(*column)?, leaves))
            })
            .collect::<Result<Vec<_>, TypeConstraintError>>()?;
        Ok(Self { root, columns })
    }

    /// Total number of folders the template produces.
    pub fn folder_count(&self) -> usize {
        1 + self
            .columns
            .iter()
            .map(|(_, leaves)| 1 + leaves.len())
            .sum::<usize>()
    }
}

/// Checks the level/parent invariants of the tree.
pub fn validate_parent(
    level: FolderLevel,
    client_id: ClientId,
    parent: Option<&Folder>,
) -> Result<(), TypeConstraintError> {
    match (level.parent_level(), parent) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(TypeConstraintError::InvalidValue(
            "root folders cannot have a parent".to_string(),
        )),
        (Some(_), None) => Err(TypeConstraintError::InvalidValue(
            "folder requires a parent".to_string(),
        )),
        (Some(expected), Some(parent)) => {
            if parent.level != expected {
                Err(TypeConstraintError::InvalidValue(format!(
                    "parent must be at level {}",
                    expected.get()
                )))
            } else if parent.client_id != client_id {
                Err(TypeConstraintError::InvalidValue(
                    "parent belongs to another client".to_string(),
                ))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder(id: i32, client: i32, level: FolderLevel) -> Folder {
        Folder {
            id: FolderId::new(id).unwrap(),
            client_id: ClientId::new(client).unwrap(),
            name: FolderName::new(format!("F{id}")).unwrap(),
            level,
            parent_folder_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn standard_template_matches_default_layout() {
        let template = FolderTemplate::standard("Deniz Otel").unwrap();
        assert_eq!(template.root.as_str(), "Deniz Otel SYS");
        let names: Vec<&str> = template.columns.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, ["A SÜTUNU", "B SÜTUNU", "C SÜTUNU", "D SÜTUNU"]);
        assert_eq!(template.columns[0].1.len(), 12);
        assert_eq!(template.columns[1].1.len(), 9);
        assert_eq!(template.folder_count(), 1 + 4 + 12 + 9 + 4 + 3);
    }

    #[test]
    fn parents_must_be_one_level_up_and_same_client() {
        let client = ClientId::new(1).unwrap();
        let root = folder(1, 1, FolderLevel::Root);
        let category = folder(2, 1, FolderLevel::Category);
        let foreign = folder(3, 2, FolderLevel::Category);

        assert!(validate_parent(FolderLevel::Root, client, None).is_ok());
        assert!(validate_parent(FolderLevel::Category, client, Some(&root)).is_ok());
        assert!(validate_parent(FolderLevel::Leaf, client, Some(&category)).is_ok());
        assert!(validate_parent(FolderLevel::Leaf, client, Some(&root)).is_err());
        assert!(validate_parent(FolderLevel::Leaf, client, Some(&foreign)).is_err());
        assert!(validate_parent(FolderLevel::Category, client, None).is_err());
    }

    #[test]
    fn levels_outside_range_are_rejected() {
        assert_eq!(FolderLevel::try_from(2), Ok(FolderLevel::Leaf));
        assert!(FolderLevel::try_from(3).is_err());
    }
}

//! Folder browser state: ordering, drill-down selection and document filtering.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::document::Document;
use crate::domain::folder::{Folder, FolderLevel};
use crate::domain::types::{ClientId, FolderId};

/// First run of ASCII digits in `name`, e.g. `7` for `"A7.1"`.
fn first_number(name: &str) -> Option<u64> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = name[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Orders names by their first numeric run, falling back to plain string order.
///
/// `"A2" < "A10"` and `"A7.1" < "A7.2" < "A8"`. Numbered names come before
/// unnumbered ones.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (first_number(a), first_number(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts folders in place using [`natural_cmp`] on their names.
pub fn sort_folders(folders: &mut [&Folder]) {
    folders.sort_by(|a, b| natural_cmp(a.name.as_str(), b.name.as_str()));
}

/// Indexed view over the folders visible to the current user.
#[derive(Debug, Default)]
pub struct FolderTree {
    folders: HashMap<FolderId, Folder>,
}

impl FolderTree {
    pub fn new(folders: Vec<Folder>) -> Self {
        Self {
            folders: folders.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id)
    }

    pub fn contains(&self, id: FolderId) -> bool {
        self.folders.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Root folders, optionally restricted to one client.
    pub fn roots(&self, client_id: Option<ClientId>) -> Vec<&Folder> {
        let mut roots: Vec<&Folder> = self
            .folders
            .values()
            .filter(|f| f.level == FolderLevel::Root)
            .filter(|f| client_id.is_none_or(|id| f.client_id == id))
            .collect();
        sort_folders(&mut roots);
        roots
    }

    /// Direct children of `parent` in natural order.
    pub fn children(&self, parent: FolderId) -> Vec<&Folder> {
        let mut children: Vec<&Folder> = self
            .folders
            .values()
            .filter(|f| f.parent_folder_id == Some(parent))
            .collect();
        sort_folders(&mut children);
        children
    }

    /// Categories shown at the top of the browser for one client.
    pub fn categories(&self, client_id: ClientId) -> Vec<&Folder> {
        self.roots(Some(client_id))
            .into_iter()
            .flat_map(|root| self.children(root.id))
            .filter(|f| f.level == FolderLevel::Category)
            .collect()
    }
}

/// Error raised when a selection refers to a folder that cannot be opened.
#[derive(Debug, PartialEq, Eq)]
pub enum NavigationError {
    UnknownFolder(FolderId),
    /// Leaf whose parent category is missing from the tree.
    DetachedLeaf(FolderId),
}

/// Drill-down position of the browser: nothing, a category, or a leaf
/// inside a category. The breadcrumb is never deeper than two entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FolderSelection {
    #[default]
    Root,
    Category {
        category: FolderId,
    },
    Leaf {
        category: FolderId,
        leaf: FolderId,
    },
}

impl FolderSelection {
    /// Moves the selection to `folder_id`.
    ///
    /// Selecting a category replaces the stack, selecting a leaf pushes it
    /// under its parent category, selecting a root clears the stack.
    pub fn select(self, tree: &FolderTree, folder_id: FolderId) -> Result<Self, NavigationError> {
        let folder = tree
            .get(folder_id)
            .ok_or(NavigationError::UnknownFolder(folder_id))?;
        match folder.level {
            FolderLevel::Root => Ok(FolderSelection::Root),
            FolderLevel::Category => Ok(FolderSelection::Category {
                category: folder.id,
            }),
            FolderLevel::Leaf => {
                let category = folder
                    .parent_folder_id
                    .filter(|parent| tree.contains(*parent))
                    .ok_or(NavigationError::DetachedLeaf(folder.id))?;
                Ok(FolderSelection::Leaf {
                    category,
                    leaf: folder.id,
                })
            }
        }
    }

    /// Goes one step up the breadcrumb.
    pub fn back(self) -> Self {
        match self {
            FolderSelection::Leaf { category, .. } => FolderSelection::Category { category },
            _ => FolderSelection::Root,
        }
    }

    pub fn breadcrumb(&self) -> Vec<FolderId> {
        match *self {
            FolderSelection::Root => Vec::new(),
            FolderSelection::Category { category } => vec![category],
            FolderSelection::Leaf { category, leaf } => vec![category, leaf],
        }
    }

    pub fn category(&self) -> Option<FolderId> {
        match *self {
            FolderSelection::Root => None,
            FolderSelection::Category { category } | FolderSelection::Leaf { category, .. } => {
                Some(category)
            }
        }
    }

    pub fn leaf(&self) -> Option<FolderId> {
        match *self {
            FolderSelection::Leaf { leaf, .. } => Some(leaf),
            _ => None,
        }
    }
}

/// Documents filed exactly under the selected leaf; empty unless a leaf is open.
pub fn documents_in_selection<'a>(
    selection: &FolderSelection,
    documents: &'a [Document],
) -> Vec<&'a Document> {
    match selection.leaf() {
        Some(leaf) => documents
            .iter()
            .filter(|doc| doc.folder_id == Some(leaf))
            .collect(),
        None => Vec::new(),
    }
}

/// Documents whose folder is missing or no longer part of the tree.
pub fn orphaned_documents<'a>(tree: &FolderTree, documents: &'a [Document]) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|doc| doc.folder_id.is_none_or(|id| !tree.contains(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{DocumentId, DocumentName, DocumentType, FolderName, Stage};
    use chrono::Utc;

    fn folder(id: i32, name: &str, level: FolderLevel, parent: Option<i32>) -> Folder {
        Folder {
            id: FolderId::new(id).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            name: FolderName::new(name).unwrap(),
            level,
            parent_folder_id: parent.map(|p| FolderId::new(p).unwrap()),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn document(id: i32, folder_id: Option<i32>) -> Document {
        Document {
            id: DocumentId::new(id).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            folder_id: folder_id.map(|f| FolderId::new(f).unwrap()),
            name: DocumentName::new(format!("Doc {id}")).unwrap(),
            document_type: DocumentType::SustainabilityReport,
            stage: Stage::Stage1,
            storage_key: format!("1/{id}.pdf"),
            original_filename: format!("{id}.pdf"),
            file_size: 10,
            uploaded_by: "admin".to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn sample_tree() -> FolderTree {
        FolderTree::new(vec![
            folder(1, "Otel SYS", FolderLevel::Root, None),
            folder(2, "B SÜTUNU", FolderLevel::Category, Some(1)),
            folder(3, "A SÜTUNU", FolderLevel::Category, Some(1)),
            folder(10, "A10", FolderLevel::Leaf, Some(3)),
            folder(11, "A2", FolderLevel::Leaf, Some(3)),
            folder(12, "A7.2", FolderLevel::Leaf, Some(3)),
            folder(13, "A7.1", FolderLevel::Leaf, Some(3)),
            folder(14, "A1", FolderLevel::Leaf, Some(3)),
        ])
    }

    #[test]
    fn natural_order_uses_first_number() {
        let mut names = vec!["A10", "A2", "A7.2", "A1", "A7.1", "A8"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["A1", "A2", "A7.1", "A7.2", "A8", "A10"]);
    }

    #[test]
    fn names_without_numbers_sort_lexicographically() {
        let mut names = vec!["C SÜTUNU", "A SÜTUNU", "B SÜTUNU"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["A SÜTUNU", "B SÜTUNU", "C SÜTUNU"]);
    }

    #[test]
    fn mixed_names_have_a_consistent_order() {
        assert_eq!(natural_cmp("C1", "A2"), Ordering::Less);
        assert_eq!(natural_cmp("A2", "B"), Ordering::Less);
        assert_eq!(natural_cmp("C1", "B"), Ordering::Less);

        let mut names = vec!["B", "A2", "Genel", "C1"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["C1", "A2", "B", "Genel"]);

        let mut many: Vec<String> = (0..40u8)
            .flat_map(|i| [format!("K{}", 40 - i), format!("Not {}", char::from(b'a' + i % 26))])
            .collect();
        many.sort_by(|a, b| natural_cmp(a, b));
        let split = many.iter().position(|name| first_number(name).is_none()).unwrap();
        assert_eq!(split, 40);
        assert_eq!(many[0], "K1");
        assert_eq!(many[39], "K40");
    }

    #[test]
    fn children_are_naturally_sorted() {
        let tree = sample_tree();
        let category = FolderId::new(3).unwrap();
        let names: Vec<&str> = tree
            .children(category)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["A1", "A2", "A7.1", "A7.2", "A10"]);

        let categories: Vec<&str> = tree
            .categories(ClientId::new(1).unwrap())
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(categories, ["A SÜTUNU", "B SÜTUNU"]);
    }

    #[test]
    fn breadcrumb_holds_at_most_two_entries() {
        let tree = sample_tree();
        let selection = FolderSelection::default()
            .select(&tree, FolderId::new(3).unwrap())
            .unwrap();
        assert_eq!(selection.breadcrumb().len(), 1);

        let selection = selection.select(&tree, FolderId::new(11).unwrap()).unwrap();
        assert_eq!(
            selection.breadcrumb(),
            vec![FolderId::new(3).unwrap(), FolderId::new(11).unwrap()]
        );

        let selection = selection.select(&tree, FolderId::new(10).unwrap()).unwrap();
        assert_eq!(selection.breadcrumb().len(), 2);
        assert_eq!(selection.leaf(), Some(FolderId::new(10).unwrap()));

        let selection = selection.select(&tree, FolderId::new(1).unwrap()).unwrap();
        assert_eq!(selection, FolderSelection::Root);
    }

    #[test]
    fn back_steps_up_one_level() {
        let leaf = FolderSelection::Leaf {
            category: FolderId::new(3).unwrap(),
            leaf: FolderId::new(10).unwrap(),
        };
        assert_eq!(
            leaf.back(),
            FolderSelection::Category {
                category: FolderId::new(3).unwrap()
            }
        );
        assert_eq!(leaf.back().back(), FolderSelection::Root);
    }

    #[test]
    fn unknown_folders_cannot_be_selected() {
        let tree = sample_tree();
        let missing = FolderId::new(99).unwrap();
        assert_eq!(
            FolderSelection::Root.select(&tree, missing),
            Err(NavigationError::UnknownFolder(missing))
        );
    }

    #[test]
    fn only_documents_of_the_open_leaf_are_listed() {
        let documents = vec![document(1, Some(10)), document(2, Some(11)), document(3, Some(3))];
        let category = FolderSelection::Category {
            category: FolderId::new(3).unwrap(),
        };
        assert!(documents_in_selection(&category, &documents).is_empty());

        let leaf = FolderSelection::Leaf {
            category: FolderId::new(3).unwrap(),
            leaf: FolderId::new(10).unwrap(),
        };
        let listed = documents_in_selection(&leaf, &documents);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.get(), 1);
    }

    #[test]
    fn orphans_are_documents_outside_the_tree() {
        let tree = sample_tree();
        let documents = vec![document(1, Some(10)), document(2, None), document(3, Some(77))];
        let orphans: Vec<i32> = orphaned_documents(&tree, &documents)
            .iter()
            .map(|d| d.id.get())
            .collect();
        assert_eq!(orphans, [2, 3]);
    }
}

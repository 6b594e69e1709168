//! v2 `file tree` dict assembly: maps a flat, sorted [`FileStorage`] into
//! the nested `BTreeMap<String, FileTreeNode>` BEP-52 wants.

use std::collections::BTreeMap;

use crate::models::{FileMetadata, FileNode, FileStorage, FileTreeNode};

/// Build the `file tree` dict from every non-padding file in `storage`.
/// Padding files exist only to align the v1 byte stream and never appear
/// in the v2 tree (BEP-52 has no padding concept).
pub fn build_file_tree(storage: &FileStorage) -> BTreeMap<String, FileTreeNode> {
    let mut tree = BTreeMap::new();
    for file in storage.files() {
        if file.is_padding_file() {
            continue;
        }
        let root = file.pieces_root().map(|r| serde_bytes::ByteBuf::from(r.to_vec()));
        insert(&mut tree, file.path(), file.file_size(), root);
    }
    tree
}

fn insert(
    tree: &mut BTreeMap<String, FileTreeNode>,
    components: &[String],
    length: u64,
    pieces_root: Option<serde_bytes::ByteBuf>,
) {
    if components.is_empty() {
        return;
    }
    let name = &components[0];

    if components.len() == 1 {
        tree.insert(
            name.clone(),
            FileTreeNode::File(FileNode {
                metadata: FileMetadata { length, pieces_root },
            }),
        );
        return;
    }

    let entry = tree
        .entry(name.clone())
        .or_insert_with(|| FileTreeNode::Directory(BTreeMap::new()));
    if let FileTreeNode::Directory(map) = entry {
        insert(map, &components[1..], length, pieces_root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileEntry;
    use std::path::PathBuf;

    #[test]
    fn builds_nested_directories() {
        let mut storage = FileStorage::new();
        storage.add_file(FileEntry::new(
            vec!["dir".to_string(), "a.txt".to_string()],
            10,
            PathBuf::from("a.txt"),
        ));
        storage.add_file(FileEntry::new(vec!["b.txt".to_string()], 5, PathBuf::from("b.txt")));

        let tree = build_file_tree(&storage);
        assert!(matches!(tree.get("b.txt"), Some(FileTreeNode::File(_))));
        match tree.get("dir") {
            Some(FileTreeNode::Directory(sub)) => {
                assert!(matches!(sub.get("a.txt"), Some(FileTreeNode::File(_))));
            }
            _ => panic!("expected directory node"),
        }
    }

    #[test]
    fn padding_files_are_excluded() {
        let mut storage = FileStorage::new();
        storage.add_file(FileEntry::padding(100));
        let tree = build_file_tree(&storage);
        assert!(tree.is_empty());
    }
}

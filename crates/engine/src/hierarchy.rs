//! Two-level parent/child trees shared by accounts, categories and partners.
//!
//! A node may have at most one parent and a parent may not have a parent of
//! its own. Writes are checked by [`validate_parent_assignment`]; reads go
//! through [`build_forest`], which only knows roots and their direct
//! children, so a deeper tree cannot be represented at all.

use std::{collections::HashMap, fmt};

use serde::Serialize;
use uuid::Uuid;

use crate::HierarchyError;

/// Something that lives in a two-level tree.
pub trait Hierarchical {
    fn id(&self) -> Uuid;
    fn parent_id(&self) -> Option<Uuid>;
}

/// The view of a node the validator needs.
///
/// `kind` is compared between child and parent; use `()` for entities whose
/// parent may be of any kind.
#[derive(Clone, Debug)]
pub struct NodeRef<'a, K> {
    pub id: Uuid,
    pub owner_id: &'a str,
    pub parent_id: Option<Uuid>,
    pub kind: K,
    pub has_children: bool,
}

/// Checks that `node` may be placed under `parent_id`.
///
/// `parent` is the loaded parent, `None` when no row with that id exists.
/// The rules are checked in order: no self parenting, the parent exists for
/// the same owner, same kind, the parent is a root, and the node is a leaf.
pub fn validate_parent_assignment<K>(
    label: &str,
    node: &NodeRef<'_, K>,
    parent_id: Uuid,
    parent: Option<&NodeRef<'_, K>>,
) -> Result<(), HierarchyError>
where
    K: PartialEq + fmt::Debug,
{
    if parent_id == node.id {
        return Err(HierarchyError::InvalidParentSelf(format!("{label} {}", node.id)));
    }
    let parent = parent
        .filter(|parent| parent.id == parent_id && parent.owner_id == node.owner_id)
        .ok_or_else(|| HierarchyError::ParentNotFound(format!("{label} {parent_id}")))?;
    if parent.kind != node.kind {
        return Err(HierarchyError::ParentTypeMismatch(format!(
            "{label} of kind {:?} cannot be placed under {:?}",
            node.kind, parent.kind
        )));
    }
    if parent.parent_id.is_some() {
        return Err(HierarchyError::InvalidParentHierarchy(format!(
            "{label} {parent_id} is already a child"
        )));
    }
    if node.has_children {
        return Err(HierarchyError::InvalidParentHierarchy(format!(
            "{label} {} has children and cannot become a child",
            node.id
        )));
    }
    Ok(())
}

/// A root node and its direct children.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tree<T> {
    pub root: T,
    pub children: Vec<T>,
}

impl<T> Tree<T> {
    pub fn new(root: T) -> Self {
        Self {
            root,
            children: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Maps every node, keeping the shape.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Tree<U> {
        Tree {
            root: f(self.root),
            children: self.children.into_iter().map(f).collect(),
        }
    }
}

/// Groups flat rows into roots with their children, preserving input order.
///
/// Fails when a row points to a missing parent or to a parent that is itself
/// a child.
pub fn build_forest<T: Hierarchical>(nodes: Vec<T>) -> Result<Vec<Tree<T>>, HierarchyError> {
    let leaf_ids: Vec<Uuid> = nodes
        .iter()
        .filter(|node| node.parent_id().is_some())
        .map(Hierarchical::id)
        .collect();

    let mut trees: Vec<Tree<T>> = Vec::new();
    let mut leaves: Vec<T> = Vec::new();
    for node in nodes {
        if node.parent_id().is_some() {
            leaves.push(node);
        } else {
            trees.push(Tree::new(node));
        }
    }

    let index: HashMap<Uuid, usize> = trees
        .iter()
        .enumerate()
        .map(|(i, tree)| (tree.root.id(), i))
        .collect();

    for leaf in leaves {
        let Some(parent_id) = leaf.parent_id() else {
            continue;
        };
        match index.get(&parent_id) {
            Some(&i) => trees[i].children.push(leaf),
            None if leaf_ids.contains(&parent_id) => {
                return Err(HierarchyError::InvalidParentHierarchy(format!(
                    "{} is nested under child {parent_id}",
                    leaf.id()
                )));
            }
            None => {
                return Err(HierarchyError::ParentNotFound(parent_id.to_string()));
            }
        }
    }

    Ok(trees)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: Uuid,
        parent_id: Option<Uuid>,
    }

    impl Hierarchical for Row {
        fn id(&self) -> Uuid {
            self.id
        }

        fn parent_id(&self) -> Option<Uuid> {
            self.parent_id
        }
    }

    fn node(owner: &str, parent_id: Option<Uuid>, kind: u8) -> NodeRef<'_, u8> {
        NodeRef {
            id: Uuid::new_v4(),
            owner_id: owner,
            parent_id,
            kind,
            has_children: false,
        }
    }

    #[test]
    fn accepts_a_root_parent_of_the_same_kind() {
        let parent = node("alice", None, 1);
        let child = node("alice", None, 1);
        assert_eq!(
            validate_parent_assignment("account", &child, parent.id, Some(&parent)),
            Ok(())
        );
    }

    #[test]
    fn rejects_self_parenting() {
        let child = node("alice", None, 1);
        assert!(matches!(
            validate_parent_assignment("account", &child, child.id, Some(&child)),
            Err(HierarchyError::InvalidParentSelf(_))
        ));
    }

    #[test]
    fn rejects_missing_or_foreign_parent() {
        let child = node("alice", None, 1);
        let foreign = node("bob", None, 1);
        assert!(matches!(
            validate_parent_assignment("account", &child, Uuid::new_v4(), None),
            Err(HierarchyError::ParentNotFound(_))
        ));
        assert!(matches!(
            validate_parent_assignment("account", &child, foreign.id, Some(&foreign)),
            Err(HierarchyError::ParentNotFound(_))
        ));
    }

    #[test]
    fn rejects_kind_mismatch() {
        let parent = node("alice", None, 2);
        let child = node("alice", None, 1);
        assert!(matches!(
            validate_parent_assignment("account", &child, parent.id, Some(&parent)),
            Err(HierarchyError::ParentTypeMismatch(_))
        ));
    }

    #[test]
    fn rejects_depth_greater_than_two() {
        let grand = node("alice", None, 1);
        let parent = node("alice", Some(grand.id), 1);
        let child = node("alice", None, 1);
        assert!(matches!(
            validate_parent_assignment("account", &child, parent.id, Some(&parent)),
            Err(HierarchyError::InvalidParentHierarchy(_))
        ));

        let root = node("alice", None, 1);
        let mut with_children = node("alice", None, 1);
        with_children.has_children = true;
        assert!(matches!(
            validate_parent_assignment("account", &with_children, root.id, Some(&root)),
            Err(HierarchyError::InvalidParentHierarchy(_))
        ));
    }

    #[test]
    fn partners_ignore_kind() {
        let parent = NodeRef {
            id: Uuid::new_v4(),
            owner_id: "alice",
            parent_id: None,
            kind: (),
            has_children: true,
        };
        let child = NodeRef {
            id: Uuid::new_v4(),
            owner_id: "alice",
            parent_id: None,
            kind: (),
            has_children: false,
        };
        assert_eq!(
            validate_parent_assignment("partner", &child, parent.id, Some(&parent)),
            Ok(())
        );
    }

    #[test]
    fn forest_groups_children_under_roots() {
        let a = Row { id: Uuid::new_v4(), parent_id: None };
        let b = Row { id: Uuid::new_v4(), parent_id: None };
        let a1 = Row { id: Uuid::new_v4(), parent_id: Some(a.id) };
        let a2 = Row { id: Uuid::new_v4(), parent_id: Some(a.id) };

        let forest = build_forest(vec![a1.clone(), a.clone(), b.clone(), a2.clone()]).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].root, a);
        assert_eq!(forest[0].children, vec![a1, a2]);
        assert_eq!(forest[1].root, b);
        assert!(!forest[1].has_children());
    }

    #[test]
    fn forest_rejects_grandchildren_and_orphans() {
        let a = Row { id: Uuid::new_v4(), parent_id: None };
        let a1 = Row { id: Uuid::new_v4(), parent_id: Some(a.id) };
        let a11 = Row { id: Uuid::new_v4(), parent_id: Some(a1.id) };
        assert!(matches!(
            build_forest(vec![a.clone(), a1, a11]),
            Err(HierarchyError::InvalidParentHierarchy(_))
        ));

        let orphan = Row { id: Uuid::new_v4(), parent_id: Some(Uuid::new_v4()) };
        assert!(matches!(
            build_forest(vec![a, orphan]),
            Err(HierarchyError::ParentNotFound(_))
        ));
    }
}

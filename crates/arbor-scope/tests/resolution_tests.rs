use arbor_scope::{EntryKind, FunctionRef, ObjectRef, Resolution, ScopeEntry, ScopeError, ScopeTree};

fn obj(raw: usize) -> ObjectRef {
    ObjectRef::from_raw(raw).unwrap()
}

fn func(raw: usize) -> FunctionRef {
    FunctionRef::from_raw(raw).unwrap()
}

#[test]
fn test_child_shadows_parent() {
    let mut tree = ScopeTree::new();
    let parent = tree.create_scope();
    tree.add_object(parent, "x", obj(1)).unwrap();
    let child = tree.new_child_scope(parent, "block").unwrap();
    tree.add_object(child, "x", obj(2)).unwrap();

    assert_eq!(tree.name_lookup(child, "x").unwrap(), ScopeEntry::object(obj(2)));
    assert_eq!(tree.name_lookup(parent, "x").unwrap(), ScopeEntry::object(obj(1)));
}

#[test]
fn test_lookup_falls_through_to_ancestors() {
    let mut tree = ScopeTree::new();
    let global = tree.create_scope();
    tree.add_object(global, "g", obj(1)).unwrap();
    let function = tree.new_child_scope(global, "call").unwrap();
    let block = tree.new_child_scope(function, "block").unwrap();

    let resolution = tree.resolve(block, "g").unwrap();
    assert_eq!(
        resolution,
        Resolution {
            entry: ScopeEntry::object(obj(1)),
            scope: global,
            depth: 2,
        }
    );
}

#[test]
fn test_unresolved_name_on_fresh_root() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();

    assert_eq!(
        tree.name_lookup(root, "z"),
        Err(ScopeError::UnresolvedName { name: "z".to_string() })
    );
}

#[test]
fn test_unresolved_name_through_whole_chain() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();
    let a = tree.new_child_scope(root, "a").unwrap();
    let b = tree.new_child_scope(a, "b").unwrap();
    tree.add_object(b, "only_here", obj(1)).unwrap();

    assert!(matches!(tree.name_lookup(a, "only_here"), Err(ScopeError::UnresolvedName { .. })));
    assert!(tree.name_lookup(b, "only_here").is_ok());
}

#[test]
fn test_nearest_binding_wins_regardless_of_kind() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();
    tree.add_object(root, "thing", obj(1)).unwrap();
    let child = tree.new_child_scope(root, "child").unwrap();
    let grandchild = tree.new_child_scope(child, "thing").unwrap();

    // In `child`, `thing` names the grandchild scope, hiding the root's object.
    assert_eq!(tree.name_lookup(child, "thing").unwrap(), ScopeEntry::Scope(grandchild));
    assert!(matches!(
        tree.lookup_object(child, "thing"),
        Err(ScopeError::TypeMismatch { expected: EntryKind::Object, found: EntryKind::Scope, .. })
    ));
    assert_eq!(tree.lookup_object(root, "thing").unwrap(), Some(obj(1)));
}

#[test]
fn test_lookup_function_through_chain() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();
    tree.add_function(root, "len(str)", func(1)).unwrap();
    let call = tree.new_child_scope(root, "call").unwrap();
    tree.add_function(call, "len(list)", func(2)).unwrap();

    assert_eq!(tree.lookup_function(call, "len(str)").unwrap(), func(1));
    assert_eq!(tree.lookup_function(call, "len(list)").unwrap(), func(2));
    assert!(matches!(
        tree.lookup_function(root, "len(list)"),
        Err(ScopeError::UnresolvedName { .. })
    ));
}

#[test]
fn test_resolution_does_not_mutate() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();
    tree.add_object(root, "x", obj(1)).unwrap();
    let child = tree.new_child_scope(root, "child").unwrap();

    let before_root = tree.get_all(root).unwrap();
    let before_child = tree.get_all(child).unwrap();
    let _ = tree.name_lookup(child, "x");
    let _ = tree.name_lookup(child, "missing");
    assert_eq!(tree.get_all(root).unwrap(), before_root);
    assert_eq!(tree.get_all(child).unwrap(), before_child);
}

#[test]
fn test_chain_depth_and_root() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();
    let a = tree.new_child_scope(root, "a").unwrap();
    let b = tree.new_child_scope(a, "b").unwrap();

    let chain: Vec<_> = tree.scope_chain(b).unwrap().map(|(id, _)| id).collect();
    assert_eq!(chain, vec![b, a, root]);
    assert_eq!(tree.depth(root).unwrap(), 0);
    assert_eq!(tree.depth(b).unwrap(), 2);
    assert_eq!(tree.root_of(b).unwrap(), root);
    assert!(tree.is_ancestor(root, b).unwrap());
    assert!(!tree.is_ancestor(b, root).unwrap());
}

#[test]
fn test_reserved_slot_resolves_locally() {
    let mut tree = ScopeTree::new();
    let root = tree.create_scope();
    let child = tree.new_child_scope(root, "child").unwrap();
    tree.update_last_exec_res(root, Some(obj(4))).unwrap();

    // Every scope carries its own slot, so the child's null result shadows the root's.
    let key = tree.naming().last_result_key.clone();
    assert_eq!(tree.name_lookup(child, &key).unwrap(), ScopeEntry::Object(None));
}

use std::thread;

use arbor_scope::{ObjectRef, ScopeEntry, ScopeError, ScopeTree, SharedScopeTree};

fn obj(raw: usize) -> ObjectRef {
    ObjectRef::from_raw(raw).unwrap()
}

#[test]
fn test_threads_register_private_scopes() {
    let shared = SharedScopeTree::new(ScopeTree::new());
    let root = shared.write().create_scope();
    shared.write().add_object(root, "shared", obj(100)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            let shared = shared.clone();
            thread::spawn(move || {
                let scope = shared.spawn_thread_scope(root, thread_id).unwrap();
                shared
                    .write()
                    .add_object(scope, "local", obj(thread_id + 1))
                    .unwrap();
                // Names outside the private scope resolve through the shared parent.
                assert_eq!(
                    shared.name_lookup(scope, "shared").unwrap(),
                    ScopeEntry::object(obj(100))
                );
                (thread_id, scope)
            })
        })
        .collect();

    let scopes: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    let tree = shared.read();
    assert_eq!(tree.get_all_children(root).unwrap().len(), 8);
    for (thread_id, scope) in scopes {
        assert_eq!(tree.get_thread_scope(root, thread_id).unwrap(), Some(scope));
        assert_eq!(tree.parent(scope).unwrap(), Some(root));
        assert_eq!(tree.get_object(scope, "local").unwrap(), Some(obj(thread_id + 1)));
    }
    drop(tree);

    assert_eq!(shared.get_all_objects(root).unwrap().len(), 9);
}

#[test]
fn test_same_thread_id_twice_is_a_redefinition() {
    let shared = SharedScopeTree::default();
    let root = shared.write().create_scope();

    shared.spawn_thread_scope(root, 1).unwrap();
    let live = shared.read().len();

    let err = shared.spawn_thread_scope(root, 1).unwrap_err();
    assert_eq!(
        err,
        ScopeError::Redefinition { name: "__arbor_thread_scope_1".to_string() }
    );
    assert_eq!(shared.read().len(), live);
}

#[test]
fn test_with_write_runs_under_one_lock() {
    let shared = SharedScopeTree::from(ScopeTree::new());
    let (root, child) = shared.with_write(|tree| {
        let root = tree.create_scope();
        let child = tree.new_child_scope(root, "child").unwrap();
        (root, child)
    });

    assert_eq!(shared.read().parent(child).unwrap(), Some(root));
}

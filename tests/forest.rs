//! Behaviour shared by every forest implementation.
use idforest::{ForestError, OrderedForest, SnapshotForest, TreeData, TreeNode, INVALID_ID};

trait Build: TreeData<u32> + Sized {
    fn build(roots: Vec<TreeNode<u32>>) -> Result<Self, ForestError>;
}

impl Build for OrderedForest<u32> {
    fn build(roots: Vec<TreeNode<u32>>) -> Result<Self, ForestError> {
        OrderedForest::from_roots(roots)
    }
}

impl Build for SnapshotForest<u32> {
    fn build(roots: Vec<TreeNode<u32>>) -> Result<Self, ForestError> {
        SnapshotForest::from_roots(roots)
    }
}

/// Runs a generic test body once per implementation.
macro_rules! for_each_forest {
    ($($name:ident),* $(,)?) => {
        $(
            mod $name {
                #[test]
                fn ordered() {
                    super::$name::<idforest::OrderedForest<u32>>();
                }

                #[test]
                fn snapshot() {
                    super::$name::<idforest::SnapshotForest<u32>>();
                }
            }
        )*
    };
}

for_each_forest!(
    construction_round_trips,
    move_child_to_front_of_roots,
    add_between_children,
    remove_cascades,
    remove_is_idempotent,
    move_later_within_same_parent,
    move_earlier_within_same_parent,
    move_within_roots,
    move_to_end,
    move_unknown_is_noop,
    move_updates_ancestors,
    move_rejects_cycles,
    move_rejects_unknown_parent,
    add_rejects_bad_items,
    add_with_out_of_range_index_appends,
    has_ancestor_edge_cases,
    depth_first_is_display_order,
    child_index_and_depth,
    construction_rejects_duplicates,
    set_data_is_visible_in_snapshots,
);

/// One root `1` with children `2` and `3`.
fn three<F: Build>() -> F {
    F::build(vec![TreeNode::new(1, 100)
        .child(TreeNode::new(2, 200))
        .child(TreeNode::new(3, 300))])
    .unwrap()
}

/// Root `1` with children `2..=6`, and a second root `7` with child `8`.
fn wide<F: Build>() -> F {
    F::build(vec![
        TreeNode::with_children(1, 0, (2..=6).map(|id| TreeNode::new(id, id as u32))),
        TreeNode::new(7, 7).child(TreeNode::new(8, 8)),
    ])
    .unwrap()
}

fn roots_fixture() -> Vec<TreeNode<u32>> {
    vec![
        TreeNode::new(10, 1)
            .child(TreeNode::new(11, 2).child(TreeNode::new(12, 3)))
            .child(TreeNode::new(13, 4)),
        TreeNode::new(20, 5),
        TreeNode::new(30, 6).child(TreeNode::new(31, 7)),
    ]
}

fn construction_round_trips<F: Build>() {
    let roots = roots_fixture();
    let forest = F::build(roots.clone()).unwrap();

    assert_eq!(forest.root_ids(), &[10, 20, 30]);
    assert_eq!(forest.len(), 7);
    assert_eq!(forest.root_items(), roots);
    assert_eq!(forest.get_data_for_id(11), Some(roots[0].children[0].clone()));
    assert_eq!(forest.data(31), Some(&7));
    assert_eq!(forest.parent_id(12), 11);
    assert_eq!(forest.parent_id(13), 10);
    assert_eq!(forest.parent_id(20), INVALID_ID);
    assert_eq!(forest.get_data_for_id(99), None);
    assert_eq!(forest.parent_id(99), INVALID_ID);
    forest.validate().unwrap();
}

fn move_child_to_front_of_roots<F: Build>() {
    let mut forest: F = three();
    assert!(forest.move_item(3, INVALID_ID, 0).unwrap());

    assert_eq!(forest.root_ids(), &[3, 1]);
    assert_eq!(forest.child_ids(1), &[2]);
    assert_eq!(forest.parent_id(3), INVALID_ID);
    assert!(!forest.has_ancestor(3, 1));
    forest.validate().unwrap();
}

fn add_between_children<F: Build>() {
    let mut forest: F = three();
    forest.add_item(TreeNode::new(4, 400), 1, 1).unwrap();

    assert_eq!(forest.child_ids(1), &[2, 4, 3]);
    assert_eq!(forest.parent_id(4), 1);
    assert_eq!(forest.data(4), Some(&400));

    let root = forest.get_data_for_id(1).unwrap();
    assert!(root.children.iter().map(|child| child.id).eq([2, 4, 3]));
    forest.validate().unwrap();
}

fn remove_cascades<F: Build>() {
    let mut forest: F = three();
    assert!(forest.try_remove(1));

    assert!(forest.root_ids().is_empty());
    assert!(forest.is_empty());
    for id in 1..=3 {
        assert!(!forest.contains(id));
    }
    forest.validate().unwrap();
}

fn remove_is_idempotent<F: Build>() {
    let mut forest: F = F::build(roots_fixture()).unwrap();
    assert!(forest.try_remove(11));
    let before = forest.root_items();

    assert!(!forest.try_remove(11));
    assert!(!forest.try_remove(12));
    assert!(!forest.try_remove(INVALID_ID));
    assert_eq!(forest.root_items(), before);
    assert_eq!(forest.child_ids(10), &[13]);
    assert_eq!(forest.len(), 5);
    forest.validate().unwrap();
}

fn move_later_within_same_parent<F: Build>() {
    let mut forest: F = wide();

    // 2 sits before index 4, so it ends up at index 3 once removed.
    forest.move_item(2, 1, 4).unwrap();
    assert_eq!(forest.child_ids(1), &[3, 4, 5, 2, 6]);
    forest.validate().unwrap();
}

fn move_earlier_within_same_parent<F: Build>() {
    let mut forest: F = wide();

    forest.move_item(5, 1, 1).unwrap();
    assert_eq!(forest.child_ids(1), &[2, 5, 3, 4, 6]);

    // Moving onto its own position changes nothing.
    forest.move_item(5, 1, 1).unwrap();
    assert_eq!(forest.child_ids(1), &[2, 5, 3, 4, 6]);
    forest.validate().unwrap();
}

fn move_within_roots<F: Build>() {
    let mut forest: F = wide();

    forest.move_item(1, INVALID_ID, 2).unwrap();
    assert_eq!(forest.root_ids(), &[7, 1]);

    forest.move_item(1, INVALID_ID, 0).unwrap();
    assert_eq!(forest.root_ids(), &[1, 7]);
    forest.validate().unwrap();
}

fn move_to_end<F: Build>() {
    let mut forest: F = wide();

    forest.move_item(3, 1, -1).unwrap();
    assert_eq!(forest.child_ids(1), &[2, 4, 5, 6, 3]);

    forest.move_item(4, 1, 5).unwrap();
    assert_eq!(forest.child_ids(1), &[2, 5, 6, 3, 4]);

    forest.move_item(2, 1, 100).unwrap();
    assert_eq!(forest.child_ids(1), &[5, 6, 3, 4, 2]);
    forest.validate().unwrap();
}

fn move_unknown_is_noop<F: Build>() {
    let mut forest: F = three();
    let before = forest.root_items();

    assert_eq!(forest.move_item(42, 1, 0), Ok(false));
    assert_eq!(forest.root_items(), before);
}

fn move_updates_ancestors<F: Build>() {
    let mut forest: F = F::build(roots_fixture()).unwrap();

    assert!(forest.move_item(11, 31, 0).unwrap());
    assert!(forest.has_ancestor(11, 31));
    assert!(forest.has_ancestor(12, 30));
    assert!(!forest.has_ancestor(11, 10));
    assert_eq!(forest.child_ids(10), &[13]);
    assert_eq!(forest.depth(12), Some(3));
    assert_eq!(forest.data(11), Some(&2));

    let root = forest.get_data_for_id(30).unwrap();
    assert_eq!(root.children[0].children[0].id, 11);
    assert_eq!(root.children[0].children[0].children[0].id, 12);
    forest.validate().unwrap();
}

fn move_rejects_cycles<F: Build>() {
    let mut forest: F = F::build(roots_fixture()).unwrap();
    let before = forest.root_items();

    assert_eq!(
        forest.move_item(10, 12, 0),
        Err(ForestError::Cycle { node: 10, parent: 12 })
    );
    assert_eq!(
        forest.move_item(11, 11, 0),
        Err(ForestError::Cycle { node: 11, parent: 11 })
    );
    assert_eq!(forest.root_items(), before);
    forest.validate().unwrap();
}

fn move_rejects_unknown_parent<F: Build>() {
    let mut forest: F = three();
    assert_eq!(forest.move_item(2, 9, 0), Err(ForestError::UnknownParent(9)));
    assert_eq!(forest.parent_id(2), 1);
}

fn add_rejects_bad_items<F: Build>() {
    let mut forest: F = three();

    assert_eq!(
        forest.add_item(TreeNode::new(2, 0), INVALID_ID, 0),
        Err(ForestError::DuplicateId(2))
    );
    assert_eq!(
        forest.add_item(TreeNode::new(INVALID_ID, 0), 1, 0),
        Err(ForestError::InvalidId)
    );
    assert_eq!(
        forest.add_item(TreeNode::new(4, 0), 8, 0),
        Err(ForestError::UnknownParent(8))
    );
    assert_eq!(
        forest.add_item(TreeNode::new(4, 0).child(TreeNode::new(3, 0)), 2, 0),
        Err(ForestError::DuplicateId(3))
    );

    assert_eq!(forest.len(), 3);
    assert!(!forest.contains(4));
    assert_eq!(forest.child_ids(2), &[] as &[i32]);
    forest.validate().unwrap();
}

fn add_with_out_of_range_index_appends<F: Build>() {
    let mut forest: F = three();

    forest.add_item(TreeNode::new(4, 0), 1, 7).unwrap();
    forest.add_item(TreeNode::new(5, 0), 1, -3).unwrap();
    forest
        .add_item(TreeNode::new(6, 0).child(TreeNode::new(7, 0)), INVALID_ID, 0)
        .unwrap();

    assert_eq!(forest.child_ids(1), &[2, 3, 4, 5]);
    assert_eq!(forest.root_ids(), &[6, 1]);
    assert_eq!(forest.parent_id(7), 6);
    forest.validate().unwrap();
}

fn has_ancestor_edge_cases<F: Build>() {
    let forest: F = F::build(roots_fixture()).unwrap();

    assert!(forest.has_ancestor(12, 10));
    assert!(forest.has_ancestor(12, 11));
    assert!(!forest.has_ancestor(10, 12));
    assert!(!forest.has_ancestor(12, 12));
    assert!(!forest.has_ancestor(12, 20));
    assert!(!forest.has_ancestor(INVALID_ID, 10));
    assert!(!forest.has_ancestor(12, INVALID_ID));
    assert!(!forest.has_ancestor(99, 10));
}

fn depth_first_is_display_order<F: Build>() {
    let forest: F = F::build(roots_fixture()).unwrap();
    assert!(forest.depth_first().eq([10, 11, 12, 13, 20, 30, 31]));

    let empty = F::build(Vec::new()).unwrap();
    assert_eq!(empty.depth_first().next(), None);
}

fn child_index_and_depth<F: Build>() {
    let forest: F = F::build(roots_fixture()).unwrap();

    assert_eq!(forest.child_index(13), Some(1));
    assert_eq!(forest.child_index(30), Some(2));
    assert_eq!(forest.child_index(99), None);
    assert_eq!(forest.depth(10), Some(0));
    assert_eq!(forest.depth(12), Some(2));
    assert_eq!(forest.depth(99), None);
}

fn construction_rejects_duplicates<F: Build>() {
    let inner = vec![TreeNode::new(1, 0).child(TreeNode::new(1, 0))];
    assert_eq!(F::build(inner).err(), Some(ForestError::DuplicateId(1)));

    let across = vec![
        TreeNode::new(1, 0).child(TreeNode::new(2, 0)),
        TreeNode::new(3, 0).child(TreeNode::new(2, 0)),
    ];
    assert_eq!(F::build(across).err(), Some(ForestError::DuplicateId(2)));

    let reserved = vec![TreeNode::new(INVALID_ID, 0)];
    assert_eq!(F::build(reserved).err(), Some(ForestError::InvalidId));
}

fn set_data_is_visible_in_snapshots<F: Build>() {
    let mut forest: F = F::build(roots_fixture()).unwrap();

    assert_eq!(forest.set_data(12, 33), Some(3));
    assert_eq!(forest.set_data(99, 1), None);

    let root = forest.get_data_for_id(10).unwrap();
    assert_eq!(root.children[0].children[0].data, 33);
    assert_eq!(forest.data(12), Some(&33));
    forest.validate().unwrap();
}

#[test]
fn clear_then_reuse() {
    let mut forest = OrderedForest::from_roots(roots_fixture()).unwrap();
    forest.clear();
    assert!(forest.is_empty());

    forest.add_item(TreeNode::new(10, 9), INVALID_ID, -1).unwrap();
    assert_eq!(forest.root_ids(), &[10]);

    let mut snapshot = SnapshotForest::from_roots(roots_fixture()).unwrap();
    snapshot.clear();
    assert!(snapshot.is_empty());
    snapshot.validate().unwrap();
}

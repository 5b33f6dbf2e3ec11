use novella_script::ast::{SceneKind, SceneNode};
use novella_script::edit::{self, BranchStep, InsertAt};
use novella_script::parser::parse_str;

fn sample() -> Vec<SceneNode> {
    parse_str("A\n@if $x == 1\n@image_in star 5\nB\n@else\nC\n@endif\nD\n").scenes
}

#[test]
fn find_reaches_nested_nodes() {
    let scenes = sample();
    let nested = scenes[1].then_branch[1].clone();
    assert_eq!(edit::find(&scenes, nested.id).map(|n| n.text.as_str()), Some("B"));

    let (path, index) = edit::find_path(&scenes, nested.id).unwrap();
    assert_eq!(path, vec![BranchStep { index: 1, then: true }]);
    assert_eq!(index, 1);
}

#[test]
fn replace_keeps_siblings_and_original() {
    let scenes = sample();
    let target = scenes[1].else_branch[0].id;
    let edited = edit::replace(&scenes, target, SceneNode::text("", "C2").with_seq(1)).unwrap();

    assert_eq!(edited[1].else_branch[0].text, "C2");
    assert_eq!(scenes[1].else_branch[0].text, "C");
    assert_eq!(edited[1].then_branch[..], scenes[1].then_branch[..]);
    assert_eq!(edited[0].id, scenes[0].id);
}

#[test]
fn remove_renumbers_block() {
    let scenes = sample();
    let edited = edit::remove(&scenes, scenes[0].id).unwrap();
    assert_eq!(edited.len(), 2);
    assert_eq!(edited[0].kind, SceneKind::Conditional);
    assert_eq!(edited[0].seq, 1);
    assert_eq!(edited[1].seq, 2);
}

#[test]
fn insert_into_branch() {
    let scenes = sample();
    let parent = scenes[1].id;
    let edited = edit::insert(&scenes, InsertAt::Branch { parent, then: false, index: 0 }, SceneNode::text("", "new"))
        .unwrap();
    let texts: Vec<&str> = edited[1].else_branch.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["new", "C"]);
    assert_eq!(edited[1].else_branch[1].seq, 2);

    let root = edit::insert(&scenes, InsertAt::Root { index: 99 }, SceneNode::text("", "end")).unwrap();
    assert_eq!(root.last().map(|n| n.seq), Some(4));
}

#[test]
fn missing_identity_is_none() {
    let scenes = sample();
    let stranger = SceneNode::text("", "x").id;
    assert!(edit::remove(&scenes, stranger).is_none());
    assert!(edit::replace(&scenes, stranger, SceneNode::text("", "y")).is_none());
}

#[test]
fn set_coordinates_pads_params() {
    let scenes = sample();
    let image = scenes[1].then_branch[0].id;
    let edited = edit::set_coordinates(&scenes, image, 30, 40).unwrap();
    assert_eq!(edited[1].then_branch[0].params, vec!["star", "30", "40"]);

    let chara = vec![SceneNode::directive("@chara_in", ["alice"])];
    let edited = edit::set_coordinates(&chara, chara[0].id, 1, 2).unwrap();
    assert_eq!(edited[0].params, vec!["alice", "0", "1", "2"]);

    assert!(edit::set_coordinates(&scenes, scenes[0].id, 1, 2).is_none());
}

#[test]
fn renumber_is_recursive() {
    let nodes = vec![SceneNode::conditional(["$a", "==", "1"], vec![SceneNode::text("", "x"), SceneNode::text("", "y")], vec![])];
    let renumbered = edit::renumber(&nodes);
    assert_eq!(renumbered[0].seq, 1);
    assert_eq!(renumbered[0].then_branch[1].seq, 2);
}

#[test]
fn resolve_block_follows_path() {
    let root: std::sync::Arc<[SceneNode]> = sample().into();
    let block = edit::resolve_block(&root, &[BranchStep { index: 1, then: false }]).unwrap();
    assert_eq!(block[0].text, "C");
    assert!(edit::resolve_block(&root, &[BranchStep { index: 7, then: true }]).is_none());
}

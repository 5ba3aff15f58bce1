use chess::{PieceColor, StandardRules};
use repertoire::persistence::{decode, encode};
use repertoire::pgn::{export, parse};
use repertoire::{Collection, MoveTree, SideCollection, Workspace, DEFAULT_NAME, ROOT_ID};

fn sans(tree: &MoveTree, id: &str) -> Vec<String> {
    tree.children(id)
        .iter()
        .map(|c| tree.node(c).unwrap().move_notation.clone().unwrap())
        .collect()
}

fn child(tree: &MoveTree, id: &str, san: &str) -> String {
    tree.children(id)
        .iter()
        .find(|c| tree.node(c).unwrap().move_notation.as_deref() == Some(san))
        .cloned()
        .unwrap()
}

#[test]
fn test_import_with_variation() {
    let (tree, summary) = parse(&StandardRules, "1. e4 e5 2. Nf3 (2. Bc4 Bc5) Nc6");
    assert!(summary.is_clean());

    assert_eq!(sans(&tree, ROOT_ID), vec!["e4"]);
    let e4 = child(&tree, ROOT_ID, "e4");
    assert_eq!(sans(&tree, &e4), vec!["e5"]);
    let e5 = child(&tree, &e4, "e5");
    assert_eq!(sans(&tree, &e5), vec!["Nf3", "Bc4"]);
    assert_eq!(sans(&tree, &child(&tree, &e5, "Nf3")), vec!["Nc6"]);
    assert_eq!(sans(&tree, &child(&tree, &e5, "Bc4")), vec!["Bc5"]);
    tree.validate().unwrap();
}

#[test]
fn test_delete_branch_leaves_variation() {
    let (mut tree, _) = parse(&StandardRules, "1. e4 e5 2. Nf3 (2. Bc4 Bc5) Nc6");
    let e4 = child(&tree, ROOT_ID, "e4");
    let e5 = child(&tree, &e4, "e5");
    let nf3 = child(&tree, &e5, "Nf3");

    assert!(tree.remove_branch(&nf3));
    assert_eq!(sans(&tree, &e5), vec!["Bc4"]);
    assert_eq!(tree.len(), 5);
    tree.validate().unwrap();
}

#[test]
fn test_browse_mode_union_across_entries() {
    let mut white = SideCollection {
        entries: Vec::new(),
        active_id: None,
    };
    white.insert("Scotch", parse(&StandardRules, "1. e4 e5 2. Nf3").0);
    white.insert("Italian", parse(&StandardRules, "1. e4 e5 2. Bc4").0);
    let mut ws = Workspace::new(
        StandardRules,
        Collection::new(white, SideCollection::default()),
    );

    ws.play(PieceColor::White, "e2e4");
    ws.play(PieceColor::White, "e7e5");
    let options = ws.options(PieceColor::White);
    assert_eq!(options.len(), 2);
    for option in &options {
        assert_eq!(option.entries.len(), 1);
        let expected = if option.notation == "Nf3" { "Scotch" } else { "Italian" };
        assert_eq!(option.entries[0], expected);
    }
}

#[test]
fn test_export_then_reimport_merges_nothing_new() {
    let text = "1. d4 d5 2. c4 e6 (2... c6 3. Nf3) 3. Nc3 Nf6 (3... Be7)";
    let (tree, _) = parse(&StandardRules, text);
    let exported = export(&tree);
    assert!(exported.contains("[Result \"*\"]"));

    let (again, _) = parse(&StandardRules, &exported);
    assert_eq!(again.leaf_lines(), tree.leaf_lines());
}

#[test]
fn test_persisted_workspace_survives_reload() {
    let mut ws = Workspace::new(StandardRules, Collection::default());
    ws.import_pgn(PieceColor::Black, "1. e4 c5 2. Nf3 d6 3. d4 cxd4")
        .unwrap();
    ws.new_repertoire(PieceColor::Black, "French");
    ws.import_pgn(PieceColor::Black, "1. e4 e6 2. d4 d5").unwrap();

    let text = encode(ws.collection()).unwrap();
    let loaded = decode(&text);
    assert!(!loaded.repaired());
    assert_eq!(&loaded.collection, ws.collection());

    let black = &loaded.collection.black;
    assert_eq!(black.entries.len(), 2);
    assert_eq!(black.entries[0].name, DEFAULT_NAME);
    assert_eq!(black.active().unwrap().name, "French");
}

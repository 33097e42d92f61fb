use canopy::model::{LOOSE_FILES_PATH, NEW_NODE_ORDER, PUBLIC_DIR_ORDER};
use canopy::{ColorTable, RawEntry, build_tree};
use indexmap::IndexMap;

fn file(path: &str, size: u64) -> RawEntry {
    RawEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        size,
        ..Default::default()
    }
}

fn dir(path: &str, children: Vec<RawEntry>) -> RawEntry {
    RawEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        children,
        ..Default::default()
    }
}

fn root(children: Vec<RawEntry>) -> RawEntry {
    RawEntry {
        name: "repo".to_string(),
        children,
        ..Default::default()
    }
}

#[test]
fn single_child_chains_collapse() {
    let raw = root(vec![
        dir("src", vec![file("src/a.ts", 0)]),
        dir(
            "lib",
            vec![dir(
                "lib/deep",
                vec![dir(
                    "lib/deep/er",
                    vec![file("lib/deep/er/x.rs", 10), file("lib/deep/er/y.rs", 10)],
                )],
            )],
        ),
    ]);
    let tree = build_tree(&raw, &IndexMap::new(), &ColorTable::builtin());

    let lib = &tree.children[0];
    assert_eq!(lib.path, "lib/deep/er");
    assert_eq!(lib.label, "lib/deep/er");
    assert_eq!(lib.children.len(), 2);

    // `src` collapsed into a leaf, so it lives in the loose-files bucket.
    let bucket = &tree.children[1];
    assert_eq!(bucket.path, LOOSE_FILES_PATH);
    let src = &bucket.children[0];
    assert_eq!(src.path, "src/a.ts");
    assert_eq!(src.label, "src/a.ts");
    assert!(src.children.is_empty());
    assert_eq!(src.extension.as_deref(), Some("ts"));
}

#[test]
fn root_is_never_collapsed() {
    let raw = root(vec![dir("only", vec![file("only/a.rs", 5), file("only/b.rs", 5)])]);
    let tree = build_tree(&raw, &IndexMap::new(), &ColorTable::builtin());
    assert_eq!(tree.path, "");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].path, "only");
}

#[test]
fn loose_files_go_into_one_synthetic_bucket_after_directories() {
    let raw = root(vec![
        file("README.md", 100),
        dir("src", vec![file("src/a.rs", 10), file("src/b.rs", 10)]),
        file("Cargo.toml", 50),
    ]);
    let tree = build_tree(&raw, &IndexMap::new(), &ColorTable::builtin());

    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].path, "src");
    assert!(!tree.children[0].synthetic);
    let bucket = &tree.children[1];
    assert!(bucket.synthetic);
    let paths = bucket.children.iter().map(|c| c.path.as_str()).collect::<Vec<_>>();
    assert_eq!(paths, ["README.md", "Cargo.toml"]);
    assert_eq!(bucket.size, bucket.children.iter().map(|c| c.size).sum::<f64>());
}

#[test]
fn no_bucket_without_loose_files() {
    let raw = root(vec![dir("src", vec![file("src/a.rs", 10), file("src/b.rs", 10)])]);
    let tree = build_tree(&raw, &IndexMap::new(), &ColorTable::builtin());
    assert!(tree.children.iter().all(|c| !c.synthetic));
}

#[test]
fn sizes_break_ties_by_sibling_index_and_sum_into_directories() {
    let raw = root(vec![dir(
        "src",
        vec![file("src/a.rs", 10), file("src/b.rs", 10), file("src/c.rs", 0)],
    )]);
    let tree = build_tree(&raw, &IndexMap::new(), &ColorTable::builtin());
    let src = &tree.children[0];
    let sizes = src.children.iter().map(|c| c.size).collect::<Vec<_>>();
    assert_eq!(sizes, [10.0, 11.0, 3.0]);
    assert_eq!(src.size, 24.0);
}

#[test]
fn sort_orders_prefer_cache_then_demote_new_and_public() {
    let raw = root(vec![
        dir("src", vec![file("src/a.rs", 10), file("src/b.rs", 10)]),
        dir(
            "public",
            vec![file("public/logo.png", 1), file("public/index.html", 1)],
        ),
        dir("docs", vec![file("docs/a.md", 10), file("docs/new.md", 10)]),
    ]);
    let tree = build_tree(&raw, &IndexMap::new(), &ColorTable::builtin());
    let src = &tree.children[0];
    assert_eq!(src.children[0].sort_order, 10.0);
    assert_eq!(src.children[1].sort_order, 11.0 - 1.0);
    assert_eq!(tree.children[1].sort_order, PUBLIC_DIR_ORDER);

    let mut cached = IndexMap::new();
    cached.insert("docs/a.md".to_string(), 42.0);
    let tree = build_tree(&raw, &cached, &ColorTable::builtin());
    let docs = &tree.children[2];
    assert_eq!(docs.children[0].sort_order, 42.0);
    assert_eq!(docs.children[1].sort_order, NEW_NODE_ORDER);
    // Sibling sets never seen before keep their computed order.
    assert_eq!(tree.children[0].children[0].sort_order, 10.0);
}

#[test]
fn raw_entries_deserialize_with_defaults() {
    let raw: RawEntry = serde_json::from_str(
        r#"{"name": "repo", "children": [{"name": "a.rs", "path": "a.rs", "size": 3, "commits": [{"date": "2024-01-02"}]}]}"#,
    )
    .expect("parse");
    assert_eq!(raw.path, "");
    assert_eq!(raw.children[0].commits.len(), 1);
}

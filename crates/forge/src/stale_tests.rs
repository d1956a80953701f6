use super::*;
use std::time::{Duration, SystemTime};

struct TempTree {
    root: PathBuf,
}

impl TempTree {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("forge-stale-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        TempTree { root }
    }

    fn file(&self, name: &str, modified: SystemTime) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, b"x").unwrap();
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(modified).unwrap();
        path
    }
}

impl Drop for TempTree {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

// -- needs_rebuild ----------------------------------------------------------

#[test]
fn missing_target_is_stale() {
    let tree = TempTree::new("missing-target");
    let dep = tree.file("main.c", SystemTime::now());
    let target = tree.root.join("does-not-exist");
    assert!(needs_rebuild(&target, &[dep]).unwrap());
}

#[test]
fn newer_dependency_makes_the_target_stale() {
    let tree = TempTree::new("newer-dep");
    let now = SystemTime::now();
    let target = tree.file("tool", now - Duration::from_secs(100));
    let dep = tree.file("main.c", now);
    assert!(needs_rebuild(&target, &[dep]).unwrap());
}

#[test]
fn older_dependencies_leave_the_target_fresh() {
    let tree = TempTree::new("fresh");
    let now = SystemTime::now();
    let target = tree.file("tool", now);
    let dep_a = tree.file("main.c", now - Duration::from_secs(200));
    let dep_b = tree.file("util.c", now - Duration::from_secs(300));
    assert!(!needs_rebuild(&target, &[dep_a, dep_b]).unwrap());
}

#[test]
fn one_newer_dependency_among_old_ones() {
    let tree = TempTree::new("one-newer");
    let now = SystemTime::now();
    let target = tree.file("tool", now - Duration::from_secs(50));
    let old = tree.file("old.c", now - Duration::from_secs(500));
    let fresh = tree.file("fresh.c", now);
    assert!(needs_rebuild(&target, &[old, fresh]).unwrap());
}

#[test]
fn missing_dependency_is_a_hard_error() {
    let tree = TempTree::new("missing-dep");
    let target = tree.file("tool", SystemTime::now());
    let gone = tree.root.join("gone.c");
    let err = needs_rebuild(&target, &[gone]).unwrap_err();
    assert!(err.to_string().contains("gone.c"));
}

#[test]
fn no_dependencies_means_fresh() {
    let tree = TempTree::new("no-deps");
    let target = tree.file("tool", SystemTime::now());
    assert!(!needs_rebuild(&target, &[]).unwrap());
}

// -- Depfile extraction -----------------------------------------------------

#[test]
fn rule_line_yields_paths_after_the_colon() {
    assert_eq!(
        parse_depfile_line("main.o: main.c foo.h  bar.h"),
        vec!["main.c", "foo.h", "bar.h"]
    );
}

#[test]
fn line_without_a_colon_has_no_deps() {
    assert!(parse_depfile_line("just some words").is_empty());
    assert!(parse_depfile_line("").is_empty());
}

#[test]
fn colon_with_nothing_after_it() {
    assert!(parse_depfile_line("main.o:").is_empty());
}

#[test]
fn stray_continuation_tokens_are_dropped() {
    assert_eq!(
        parse_depfile_line("main.o: main.c \\ foo.h"),
        vec!["main.c", "foo.h"]
    );
}

#[test]
fn depfile_with_continuations() {
    let tree = TempTree::new("depfile");
    let path = tree.root.join("tool.d");
    std::fs::write(&path, "tool: main.c \\\n  util.c \\\n  util.h\n").unwrap();
    assert_eq!(
        read_depfile(&path).unwrap(),
        vec!["main.c", "util.c", "util.h"]
    );
}

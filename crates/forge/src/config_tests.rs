use super::*;
use yaml_flow::{Arena, ErrorKind};

const MANIFEST: &str = "\
package: 'hammer'
version: '1.2.0'
author: 'smith'
description: 'drives nails'

workspace: {libs: 'src/libs', target: 'out'}

targets: [
  {name: 'hammer', type: 'binary', main: 'src/main.c', target: ['x86_64', 'arm64']},
  {name: 'libnail', type: 'static'},
]

build: {
  compiler: 'clang',
  cstd: 'c23',
  macros: {VERSION: '1.2.0', NDEBUG: '1'},
  arguments: {
    run: {validate_str: 'compact', cache_policy: 'never', commands: ['build', 'exec']},
  },
  deps: [{name: 'z3', type: 'vendored', path: 'src/libs'}],
}

profiles: {debug: ['-g', '-O0'], release: ['-O2']}
";

fn load(input: &str) -> Result<ForgeConfig, yaml_flow::Error> {
    let arena = Arena::new();
    let root = yaml_flow::parse(input, &arena).expect("manifest should parse");
    ForgeConfig::from_root(&root)
}

// -- Full manifest ----------------------------------------------------------

#[test]
fn full_manifest_projects() {
    let config = load(MANIFEST).unwrap();

    assert_eq!(config.package.as_deref(), Some("hammer"));
    assert_eq!(config.version.as_deref(), Some("1.2.0"));
    assert_eq!(config.author.as_deref(), Some("smith"));
    assert_eq!(config.description.as_deref(), Some("drives nails"));

    let workspace = config.workspace.as_ref().unwrap();
    assert_eq!(workspace.libs.as_deref(), Some("src/libs"));
    assert_eq!(workspace.target.as_deref(), Some("out"));

    assert_eq!(config.targets.len(), 2);
    let hammer = &config.targets[0];
    assert_eq!(hammer.name, "hammer");
    assert_eq!(hammer.kind.as_deref(), Some("binary"));
    assert_eq!(hammer.main.as_deref(), Some("src/main.c"));
    assert_eq!(hammer.arch, vec!["x86_64", "arm64"]);
    let libnail = &config.targets[1];
    assert_eq!(libnail.name, "libnail");
    assert!(libnail.main.is_none());
    assert!(libnail.arch.is_empty());

    let build = config.build.as_ref().unwrap();
    assert_eq!(build.compiler.as_deref(), Some("clang"));
    assert_eq!(build.cstd.as_deref(), Some("c23"));
    assert_eq!(build.macros.len(), 2);
    assert_eq!(build.macros["VERSION"], "1.2.0");
    let run = &build.arguments["run"];
    assert_eq!(run.validate_str.as_deref(), Some("compact"));
    assert_eq!(run.cache_policy.as_deref(), Some("never"));
    assert_eq!(run.commands, vec!["build", "exec"]);
    assert_eq!(build.deps.len(), 1);
    assert_eq!(build.deps[0].name.as_deref(), Some("z3"));
    assert_eq!(build.deps[0].kind.as_deref(), Some("vendored"));
    assert_eq!(build.deps[0].path.as_deref(), Some("src/libs"));
    assert!(build.deps[0].repo.is_none());

    assert_eq!(config.profiles.len(), 2);
    assert_eq!(config.profiles["debug"], vec!["-g", "-O0"]);
    assert_eq!(config.profiles["release"], vec!["-O2"]);
}

// -- Partial manifests ------------------------------------------------------

#[test]
fn minimal_manifest_projects_to_empty_sections() {
    let config = load("package: 'tiny'\n").unwrap();
    assert_eq!(config.package.as_deref(), Some("tiny"));
    assert!(config.version.is_none());
    assert!(config.workspace.is_none());
    assert!(config.targets.is_empty());
    assert!(config.build.is_none());
    assert!(config.profiles.is_empty());
}

#[test]
fn target_without_a_name_is_an_error() {
    let err = load("targets: [{type: 'binary'}]\n").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingField("name")));
}

#[test]
fn wrong_kind_section_is_an_error() {
    let err = load("workspace: 5\n").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::WrongType {
            expected: "a map",
            found: "a number"
        }
    ));
}

#[test]
fn non_string_collection_entries_are_skipped() {
    let config = load("profiles: {debug: ['-g', 5, '-O0']}\n").unwrap();
    assert_eq!(config.profiles["debug"], vec!["-g", "-O0"]);

    let config = load("build: {macros: {A: '1', B: 2}}\n").unwrap();
    let build = config.build.unwrap();
    assert_eq!(build.macros.len(), 1);
    assert_eq!(build.macros["A"], "1");
}

#[test]
fn anchored_defaults_merge_across_targets() {
    let manifest = "\
defaults: &base {type: 'binary', target: ['x86_64']}
targets: [
  {<<: *base, name: 'tool-a', main: 'a.c'},
  {<<: *base, name: 'tool-b', main: 'b.c'},
]
";
    let config = load(manifest).unwrap();
    assert_eq!(config.targets.len(), 2);
    for target in &config.targets {
        assert_eq!(target.kind.as_deref(), Some("binary"));
        assert_eq!(target.arch, vec!["x86_64"]);
    }
    assert_eq!(config.targets[0].name, "tool-a");
    assert_eq!(config.targets[1].name, "tool-b");
}

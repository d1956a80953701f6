//! Typed manifest records, projected out of the parsed document tree.
//!
//! Everything here is tolerant the way the manifest format is tolerant:
//! absent sections project to `None`/empty, and string collections silently
//! skip entries of the wrong kind. Only a target without a name is an error,
//! since nothing downstream could refer to it.

use std::collections::HashMap;

use yaml_flow::{Error, MapHelper, NodeRef};

/// Root of a `forge.yaml` manifest.
#[derive(Debug)]
pub struct ForgeConfig {
    pub package: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub workspace: Option<WorkspaceConfig>,
    pub targets: Vec<TargetConfig>,
    pub build: Option<BuildConfig>,
    /// Profile name → compiler flag list.
    pub profiles: HashMap<String, Vec<String>>,
}

#[derive(Debug)]
pub struct WorkspaceConfig {
    pub libs: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug)]
pub struct TargetConfig {
    pub name: String,
    /// The manifest key is `type`.
    pub kind: Option<String>,
    pub main: Option<String>,
    /// Architectures listed under the target's `target` key.
    pub arch: Vec<String>,
}

#[derive(Debug)]
pub struct BuildConfig {
    pub compiler: Option<String>,
    pub cstd: Option<String>,
    pub macros: HashMap<String, String>,
    pub arguments: HashMap<String, ArgumentConfig>,
    pub deps: Vec<DependencyConfig>,
}

#[derive(Debug)]
pub struct ArgumentConfig {
    pub validate_str: Option<String>,
    pub cache_policy: Option<String>,
    pub commands: Vec<String>,
}

#[derive(Debug)]
pub struct DependencyConfig {
    pub name: Option<String>,
    /// The manifest key is `type`.
    pub kind: Option<String>,
    pub repo: Option<String>,
    pub path: Option<String>,
}

impl ForgeConfig {
    pub fn from_root(root: &NodeRef<'_>) -> Result<Self, Error> {
        let helper = MapHelper::new(root)?;

        let workspace = match helper.optional::<NodeRef<'_>>("workspace")? {
            Some(node) => Some(WorkspaceConfig::from_node(&node)?),
            None => None,
        };

        let mut targets = Vec::new();
        if let Some(nodes) = helper.optional::<Vec<NodeRef<'_>>>("targets")? {
            for node in &nodes {
                targets.push(TargetConfig::from_node(node)?);
            }
        }

        let build = match helper.optional::<NodeRef<'_>>("build")? {
            Some(node) => Some(BuildConfig::from_node(&node)?),
            None => None,
        };

        let mut profiles = HashMap::new();
        if let Some(node) = helper.optional::<NodeRef<'_>>("profiles")? {
            if let Some(map) = node.as_map() {
                for (name, flags) in map.iter() {
                    profiles.insert(name.to_owned(), string_list(flags));
                }
            }
        }

        Ok(ForgeConfig {
            package: helper.optional("package")?,
            version: helper.optional("version")?,
            author: helper.optional("author")?,
            description: helper.optional("description")?,
            workspace,
            targets,
            build,
            profiles,
        })
    }
}

impl WorkspaceConfig {
    fn from_node(node: &NodeRef<'_>) -> Result<Self, Error> {
        let helper = MapHelper::new(node)?;
        Ok(WorkspaceConfig {
            libs: helper.optional("libs")?,
            target: helper.optional("target")?,
        })
    }
}

impl TargetConfig {
    fn from_node(node: &NodeRef<'_>) -> Result<Self, Error> {
        let helper = MapHelper::new(node)?;
        Ok(TargetConfig {
            name: helper.required("name")?,
            kind: helper.optional("type")?,
            main: helper.optional("main")?,
            arch: match node.get("target") {
                Some(list) => string_list(list),
                None => Vec::new(),
            },
        })
    }
}

impl BuildConfig {
    fn from_node(node: &NodeRef<'_>) -> Result<Self, Error> {
        let helper = MapHelper::new(node)?;

        let macros = match node.get("macros") {
            Some(node) => string_map(node),
            None => HashMap::new(),
        };

        let mut arguments = HashMap::new();
        if let Some(args) = node.get("arguments").and_then(|n| n.as_map()) {
            for (name, value) in args.iter() {
                if value.as_map().is_some() {
                    arguments.insert(name.to_owned(), ArgumentConfig::from_node(value)?);
                }
            }
        }

        let mut deps = Vec::new();
        if let Some(nodes) = helper.optional::<Vec<NodeRef<'_>>>("deps")? {
            for node in &nodes {
                deps.push(DependencyConfig::from_node(node)?);
            }
        }

        Ok(BuildConfig {
            compiler: helper.optional("compiler")?,
            cstd: helper.optional("cstd")?,
            macros,
            arguments,
            deps,
        })
    }
}

impl ArgumentConfig {
    fn from_node(node: &NodeRef<'_>) -> Result<Self, Error> {
        let helper = MapHelper::new(node)?;
        Ok(ArgumentConfig {
            validate_str: helper.optional("validate_str")?,
            cache_policy: helper.optional("cache_policy")?,
            commands: match node.get("commands") {
                Some(list) => string_list(list),
                None => Vec::new(),
            },
        })
    }
}

impl DependencyConfig {
    fn from_node(node: &NodeRef<'_>) -> Result<Self, Error> {
        let helper = MapHelper::new(node)?;
        Ok(DependencyConfig {
            name: helper.optional("name")?,
            kind: helper.optional("type")?,
            repo: helper.optional("repo")?,
            path: helper.optional("path")?,
        })
    }
}

/// String entries of a list node; anything else is skipped.
fn string_list(node: &NodeRef<'_>) -> Vec<String> {
    let Some(items) = node.as_list() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_str())
        .map(str::to_owned)
        .collect()
}

/// String-valued entries of a map node; anything else is skipped.
fn string_map(node: &NodeRef<'_>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    if let Some(map) = node.as_map() {
        for (key, value) in map.iter() {
            if let Some(text) = value.as_str() {
                out.insert(key.to_owned(), text.to_owned());
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "./config_tests.rs"]
mod tests;

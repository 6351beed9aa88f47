//! Bundle manifest types and their JSON shapes.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// One inferred bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    /// Representative module name.
    pub name: String,
    /// Other modules shipped in this bundle, first-seen order, unique.
    pub include: Vec<String>,
    /// Bundle whose modules are left out of this one.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "exclude_list"
    )]
    pub exclude: Option<String>,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            include: Vec::new(),
            exclude: None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.include.iter().any(|n| n == name)
    }
}

fn exclude_list<S: Serializer>(exclude: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    exclude.iter().collect::<Vec<_>>().serialize(serializer)
}

/// `{ bundles, paths }` for plain dependency systems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlainManifest {
    pub bundles: Vec<Bundle>,
    /// Module name -> name of the entry bundle that ships it.
    pub paths: IndexMap<String, String>,
}

/// A `modules` entry of the loader optimizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderModule {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Captured loader configuration echoed back with a `modules` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoaderManifest {
    #[serde(flatten)]
    pub configuration: Map<String, Value>,
    pub modules: Vec<LoaderModule>,
}

/// The single manifest a run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    Plain(PlainManifest),
    NamedLoader(LoaderManifest),
}

impl Manifest {
    pub fn as_plain(&self) -> Option<&PlainManifest> {
        match self {
            Manifest::Plain(manifest) => Some(manifest),
            Manifest::NamedLoader(_) => None,
        }
    }

    pub fn as_named_loader(&self) -> Option<&LoaderManifest> {
        match self {
            Manifest::NamedLoader(manifest) => Some(manifest),
            Manifest::Plain(_) => None,
        }
    }

    /// Bundle names in emission order.
    pub fn bundle_names(&self) -> Vec<&str> {
        match self {
            Manifest::Plain(manifest) => manifest.bundles.iter().map(|b| b.name.as_str()).collect(),
            Manifest::NamedLoader(manifest) => {
                manifest.modules.iter().map(|m| m.name.as_str()).collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Manifest::Plain(manifest) => manifest.bundles.len(),
            Manifest::NamedLoader(manifest) => manifest.modules.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_shape() {
        let mut entry = Bundle::new("3.js");
        entry.include.push("lib/module1".to_string());
        entry.exclude = Some("lib/common".to_string());
        let manifest = Manifest::Plain(PlainManifest {
            bundles: vec![Bundle::new("lib/common"), entry],
            paths: IndexMap::from([("lib/module1".to_string(), "3.js".to_string())]),
        });

        assert_eq!(
            manifest.to_json().unwrap(),
            json!({
                "bundles": [
                    { "name": "lib/common", "include": [] },
                    { "name": "3.js", "include": ["lib/module1"], "exclude": ["lib/common"] }
                ],
                "paths": { "lib/module1": "3.js" }
            })
        );
    }

    #[test]
    fn test_named_loader_shape_flattens_configuration() {
        let mut configuration = Map::new();
        configuration.insert("baseUrl".to_string(), json!("js"));
        let manifest = Manifest::NamedLoader(LoaderManifest {
            configuration,
            modules: vec![
                LoaderModule {
                    name: "common".to_string(),
                    include: vec!["util".to_string()],
                    exclude: Vec::new(),
                },
                LoaderModule {
                    name: "main".to_string(),
                    include: Vec::new(),
                    exclude: vec!["common".to_string()],
                },
            ],
        });

        assert_eq!(
            manifest.to_json().unwrap(),
            json!({
                "baseUrl": "js",
                "modules": [
                    { "name": "common", "include": ["util"] },
                    { "name": "main", "exclude": ["common"] }
                ]
            })
        );
        assert_eq!(manifest.bundle_names(), vec!["common", "main"]);
    }
}

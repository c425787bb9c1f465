//! The API type registry.
//!
//! A read-only catalogue of the shell's domain shapes (`Database`,
//! `Collection`, `Cursor`, ...) and their members, plus the global bindings
//! the shell exposes. It is loaded once from JSON or TOML and shared by every
//! compilation; nothing mutates it afterwards.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use serde::Deserialize;

use crate::ty::Ty;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// The shell catalogue bundled with the compiler.
const BUILTIN_REGISTRY: &str = include_str!("../registry/shell.json");

/// A resolved member: whether reading it yields a deferred value, and its
/// descriptor. Methods have a `Callable` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub deferred: bool,
    pub ty: Ty,
}

/// One shape and its members, in declaration order.
#[derive(Debug, Clone)]
pub struct ShapeEntry {
    name: String,
    members: FxIndexMap<String, Member>,
    any_member: Option<String>,
}

impl ShapeEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shape that unlisted members resolve to, if any.
    pub fn any_member(&self) -> Option<&str> {
        self.any_member.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("cannot read registry `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid registry TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported registry format `{}` (expected .json or .toml)", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("shape `{shape}` sends unknown members to `{target}`, which is not a registered shape")]
    UnknownWildcard { shape: String, target: String },
}

// ── Configuration format ───────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryConfig {
    #[serde(default)]
    globals: IndexMap<String, MemberConfig>,
    #[serde(default)]
    shapes: IndexMap<String, ShapeConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShapeConfig {
    #[serde(default)]
    any_member: Option<String>,
    #[serde(default)]
    members: IndexMap<String, MemberConfig>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MemberKind {
    #[default]
    Method,
    Property,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberConfig {
    #[serde(default)]
    kind: MemberKind,
    #[serde(default)]
    deferred: bool,
    #[serde(default)]
    returns: Option<String>,
}

// ── Registry ───────────────────────────────────────────────────────────

/// The immutable shape catalogue. `Send + Sync`; share it behind an `Arc`
/// or a plain reference.
#[derive(Debug, Clone)]
pub struct Registry {
    shapes: FxIndexMap<String, ShapeEntry>,
    globals: FxIndexMap<String, Member>,
}

impl Registry {
    /// The bundled shell catalogue.
    pub fn builtin() -> Registry {
        Registry::from_json_str(BUILTIN_REGISTRY).expect("bundled registry is valid")
    }

    pub fn from_json_str(text: &str) -> Result<Registry, RegistryError> {
        let config: RegistryConfig = serde_json::from_str(text)?;
        Registry::from_config(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Registry, RegistryError> {
        let config: RegistryConfig = toml::from_str(text)?;
        Registry::from_config(config)
    }

    /// Load a `.json` or `.toml` catalogue.
    pub fn from_file(path: &Path) -> Result<Registry, RegistryError> {
        let read = || {
            std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Registry::from_json_str(&read()?),
            Some("toml") => Registry::from_toml_str(&read()?),
            _ => Err(RegistryError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn from_config(config: RegistryConfig) -> Result<Registry, RegistryError> {
        let names: FxHashSet<&str> = config.shapes.keys().map(String::as_str).collect();

        let mut shapes = FxIndexMap::default();
        for (name, shape) in &config.shapes {
            if let Some(target) = &shape.any_member {
                if !names.contains(target.as_str()) {
                    return Err(RegistryError::UnknownWildcard {
                        shape: name.clone(),
                        target: target.clone(),
                    });
                }
            }
            let members = shape
                .members
                .iter()
                .map(|(member, cfg)| (member.clone(), resolve_member(cfg, &names)))
                .collect();
            shapes.insert(
                name.clone(),
                ShapeEntry {
                    name: name.clone(),
                    members,
                    any_member: shape.any_member.clone(),
                },
            );
        }

        let globals = config
            .globals
            .iter()
            .map(|(name, cfg)| (name.clone(), resolve_member(cfg, &names)))
            .collect();

        Ok(Registry { shapes, globals })
    }

    pub fn resolve_shape(&self, name: &str) -> Option<&ShapeEntry> {
        self.shapes.get(name)
    }

    /// `(deferred, descriptor)` of `shape.member`.
    ///
    /// Unknown shapes and unlisted members give `(false, Unknown)`, unless
    /// the shape routes unlisted members to a wildcard shape.
    pub fn member_type(&self, shape: &str, member: &str) -> (bool, Ty) {
        let Some(entry) = self.shapes.get(shape) else {
            return (false, Ty::Unknown);
        };
        if let Some(found) = entry.members.get(member) {
            return (found.deferred, found.ty.clone());
        }
        match &entry.any_member {
            Some(target) => (false, Ty::Shape(target.clone())),
            None => (false, Ty::Unknown),
        }
    }

    pub fn global(&self, name: &str) -> Option<&Member> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.globals.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn shapes(&self) -> impl Iterator<Item = &ShapeEntry> {
        self.shapes.values()
    }
}

fn resolve_return(returns: Option<&str>, shapes: &FxHashSet<&str>) -> Ty {
    match returns {
        None | Some("unknown") | Some("Unknown") => Ty::Unknown,
        Some(name) if shapes.contains(name) => Ty::Shape(name.to_string()),
        Some(name) => Ty::Plain(Some(name.to_string())),
    }
}

fn resolve_member(cfg: &MemberConfig, shapes: &FxHashSet<&str>) -> Member {
    let value = resolve_return(cfg.returns.as_deref(), shapes);
    let value = if cfg.deferred { Ty::deferred(value) } else { value };
    let ty = match cfg.kind {
        MemberKind::Method => Ty::callable(value),
        MemberKind::Property => value,
    };
    Member {
        deferred: cfg.deferred,
        ty,
    }
}

// ── Builder ────────────────────────────────────────────────────────────

/// Programmatic construction, mostly for tests.
///
/// ```
/// use asyncify_typeck::registry::RegistryBuilder;
///
/// let registry = RegistryBuilder::new()
///     .method("Collection", "find", true, "Cursor")
///     .shape("Cursor")
///     .global("db", "Database")
///     .property("Database", "coll", false, "Collection")
///     .build()
///     .unwrap();
/// assert!(registry.member_type("Collection", "find").0);
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a shape with no members yet.
    pub fn shape(mut self, name: &str) -> Self {
        self.config.shapes.entry(name.to_string()).or_default();
        self
    }

    pub fn method(self, shape: &str, name: &str, deferred: bool, returns: &str) -> Self {
        self.member(shape, name, MemberKind::Method, deferred, returns)
    }

    pub fn property(self, shape: &str, name: &str, deferred: bool, returns: &str) -> Self {
        self.member(shape, name, MemberKind::Property, deferred, returns)
    }

    /// Route unlisted members of `shape` to `target`.
    pub fn any_member(mut self, shape: &str, target: &str) -> Self {
        self.config.shapes.entry(shape.to_string()).or_default().any_member =
            Some(target.to_string());
        self
    }

    /// A global property binding.
    pub fn global(mut self, name: &str, returns: &str) -> Self {
        self.config.globals.insert(
            name.to_string(),
            MemberConfig {
                kind: MemberKind::Property,
                deferred: false,
                returns: Some(returns.to_string()),
            },
        );
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        Registry::from_config(self.config)
    }

    fn member(mut self, shape: &str, name: &str, kind: MemberKind, deferred: bool, returns: &str) -> Self {
        self.config.shapes.entry(shape.to_string()).or_default().members.insert(
            name.to_string(),
            MemberConfig {
                kind,
                deferred,
                returns: Some(returns.to_string()),
            },
        );
        self
    }
}

//! Wire data model for producer-emitted reference data
//!
//! All payloads are JSON with camelCase keys, written by the external
//! build pipeline. Shapes here only ever deserialize what the producer
//! emits; nothing in this crate mutates a fetched record.

use std::collections::HashMap;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Small record mapping a logical "latest" name to a build identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pointer {
    pub build_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Per-build metadata listing every package contained in that build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub build_id: String,
    pub packages: Vec<PackageMeta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<BuildProvenance>,
}

/// Where a build came from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProvenance {
    pub repo: String,
    pub sha: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// One published library within a manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMeta {
    pub id: String,
    pub display_name: String,
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PackageStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStats {
    #[serde(default)]
    pub symbol_count: u64,
}

/// Kind of a documented entity
///
/// Closed set with an `Unknown` catch-all so producer-side additions
/// never fail deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Class,
    Function,
    Method,
    Property,
    Interface,
    TypeAlias,
    Enum,
    Constant,
    Variable,
    Unknown,
}

impl SymbolKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "module" => SymbolKind::Module,
            "class" => SymbolKind::Class,
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "property" => SymbolKind::Property,
            "interface" => SymbolKind::Interface,
            "typeAlias" => SymbolKind::TypeAlias,
            "enum" => SymbolKind::Enum,
            "constant" => SymbolKind::Constant,
            "variable" => SymbolKind::Variable,
            _ => SymbolKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Interface => "interface",
            SymbolKind::TypeAlias => "typeAlias",
            SymbolKind::Enum => "enum",
            SymbolKind::Constant => "constant",
            SymbolKind::Variable => "variable",
            SymbolKind::Unknown => "unknown",
        }
    }

    /// Kinds a cross-package reference may link to
    pub fn is_linkable(self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::TypeAlias | SymbolKind::Enum
        )
    }

    /// URL section for a symbol page of this kind
    pub fn url_segment(self) -> &'static str {
        match self {
            SymbolKind::Module => "modules",
            SymbolKind::Class => "classes",
            SymbolKind::Function => "functions",
            SymbolKind::Method => "methods",
            SymbolKind::Property => "properties",
            SymbolKind::Interface => "interfaces",
            SymbolKind::TypeAlias => "types",
            SymbolKind::Enum => "enums",
            SymbolKind::Constant => "constants",
            SymbolKind::Variable => "variables",
            SymbolKind::Unknown => "symbols",
        }
    }
}

impl Serialize for SymbolKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SymbolKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = SymbolKind;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a symbol kind string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SymbolKind, E> {
                Ok(SymbolKind::parse(v))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// Structured documentation attached to a symbol
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDocs {
    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deprecation {
    pub is_deprecated: bool,

    #[serde(default)]
    pub message: String,
}

/// Source-location provenance for one symbol
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    #[serde(default)]
    pub repo: String,

    #[serde(default)]
    pub sha: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub line: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolUrls {
    #[serde(default)]
    pub canonical: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTags {
    #[serde(default)]
    pub stability: String,

    #[serde(default)]
    pub visibility: String,

    #[serde(default)]
    pub is_async: bool,

    #[serde(default)]
    pub is_abstract: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDoc {
    pub name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDoc {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
}

/// Reference to a member symbol of a class or module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub name: String,
    pub ref_id: String,
    pub kind: SymbolKind,

    #[serde(default)]
    pub visibility: String,
}

/// One documented entity inside a package's build
///
/// Qualified name is globally unique within its (build, package).
/// Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub id: String,

    #[serde(default)]
    pub package_id: String,

    #[serde(default)]
    pub language: String,

    pub kind: SymbolKind,
    pub name: String,
    pub qualified_name: String,

    #[serde(default)]
    pub signature: String,

    #[serde(default)]
    pub docs: SymbolDocs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<SymbolUrls>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<SymbolTags>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDoc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnDoc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Relations>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberRef>,
}

/// Full per-package symbol dump (`symbols.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDump {
    pub symbols: Vec<Symbol>,
}

/// Projection of a symbol for package-overview listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub kind: SymbolKind,
    pub name: String,
    pub qualified_name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub signature: String,
}

/// Which catalog shard keys exist for a package+build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogShardIndex {
    pub package_id: String,

    #[serde(default)]
    pub symbol_count: u64,

    pub shards: Vec<String>,
}

/// Translates a qualified name into a symbol id without loading the
/// full record; lookup shards are `Record<qualifiedName, LookupEntry>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub id: String,
    pub kind: SymbolKind,
    pub name: String,
}

/// Minimal per-symbol data for deciding eager page generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingEntry {
    pub ref_id: String,
    pub kind: SymbolKind,

    #[serde(default)]
    pub page_type: String,

    #[serde(default)]
    pub title: String,
}

/// Slug -> routing entry map for one package+build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingTable {
    pub package_id: String,

    #[serde(default)]
    pub display_name: String,

    pub language: String,
    pub slugs: HashMap<String, RoutingEntry>,
}

/// One release-history entry for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub version: String,

    #[serde(default)]
    pub release_date: String,

    #[serde(rename = "type")]
    pub change_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_kind_roundtrip() {
        for kind in [
            SymbolKind::Class,
            SymbolKind::TypeAlias,
            SymbolKind::Enum,
            SymbolKind::Function,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: SymbolKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
        assert_eq!(serde_json::to_string(&SymbolKind::TypeAlias).unwrap(), "\"typeAlias\"");
    }

    #[test]
    fn test_unknown_kind_does_not_fail() {
        let kind: SymbolKind = serde_json::from_str("\"decorator\"").unwrap();
        assert_eq!(kind, SymbolKind::Unknown);
    }

    #[test]
    fn test_symbol_deserializes_producer_ir() {
        let raw = serde_json::json!({
            "id": "sym_py_class_langchain_core_language_models_BaseChatModel_ab12cd34",
            "packageId": "langchain-core",
            "language": "python",
            "kind": "class",
            "name": "BaseChatModel",
            "qualifiedName": "langchain_core.language_models.BaseChatModel",
            "signature": "class BaseChatModel(BaseLanguageModel)",
            "docs": {
                "summary": "Base class for chat models.",
                "deprecated": {"isDeprecated": false, "message": ""}
            },
            "source": {"repo": "langchain-ai/langchain", "sha": "abc123", "path": "base.py", "line": 42},
            "urls": {"canonical": "/python/langchain-core/classes/BaseChatModel/"},
            "tags": {"stability": "stable", "visibility": "public", "isAsync": false, "isAbstract": true},
            "relations": {"extends": ["BaseLanguageModel"]},
            "members": [{"name": "invoke", "refId": "sym_py_method_x", "kind": "method", "visibility": "public"}]
        });
        let symbol: Symbol = serde_json::from_value(raw).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Class);
        assert_eq!(symbol.members.len(), 1);
        assert_eq!(symbol.members[0].kind, SymbolKind::Method);
        assert!(symbol.tags.as_ref().unwrap().is_abstract);
    }

    #[test]
    fn test_symbol_minimal_fields() {
        // Older builds omit most optional structure
        let raw = serde_json::json!({
            "id": "sym_1",
            "kind": "function",
            "name": "load",
            "qualifiedName": "pkg.load"
        });
        let symbol: Symbol = serde_json::from_value(raw).unwrap();
        assert_eq!(symbol.docs.summary, "");
        assert!(symbol.params.is_empty());
        assert!(symbol.source.is_none());
    }

    #[test]
    fn test_linkable_kinds() {
        assert!(SymbolKind::Class.is_linkable());
        assert!(SymbolKind::Interface.is_linkable());
        assert!(SymbolKind::TypeAlias.is_linkable());
        assert!(SymbolKind::Enum.is_linkable());
        assert!(!SymbolKind::Function.is_linkable());
        assert!(!SymbolKind::Module.is_linkable());
    }
}

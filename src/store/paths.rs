//! Path conventions for producer-emitted resources
//!
//! Per-package resources live under `packages/{packageId}/{buildId}/`,
//! build-wide resources under `{buildId}/`, pointers at the root. Both
//! backends share these paths verbatim.

pub fn pointer(name: &str) -> String {
    format!("pointers/{name}.json")
}

pub fn manifest(build_id: &str) -> String {
    format!("{build_id}/reference.manifest.json")
}

pub fn symbol_dump(package_id: &str, build_id: &str) -> String {
    format!("packages/{package_id}/{build_id}/symbols.json")
}

pub fn lookup_shard(package_id: &str, build_id: &str, shard: &str) -> String {
    format!("packages/{package_id}/{build_id}/lookup/{shard}.json")
}

pub fn catalog_index(package_id: &str, build_id: &str) -> String {
    format!("packages/{package_id}/{build_id}/catalog/index.json")
}

pub fn catalog_shard(package_id: &str, build_id: &str, shard: &str) -> String {
    format!("packages/{package_id}/{build_id}/catalog/{shard}.json")
}

pub fn changelog_shard(package_id: &str, build_id: &str, shard: &str) -> String {
    format!("packages/{package_id}/{build_id}/changelog/{shard}.json")
}

pub fn routing_table(build_id: &str, language: &str, package_id: &str) -> String {
    format!("{build_id}/routing/{language}/{package_id}.json")
}

pub fn symbol_object(build_id: &str, shard: &str, symbol_id: &str) -> String {
    format!("{build_id}/symbols/{shard}/{symbol_id}.json")
}

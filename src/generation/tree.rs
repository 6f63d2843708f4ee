//! The API tree: identifier → metadata + version → compiled methods

use std::collections::BTreeMap;

use crate::generation::GeneratedMethod;
use crate::generation::utils::version_key;

/// What the metadata stage learned about one API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiMetadata {
    /// PascalCase identifier derived from the base URL (`Friends`)
    pub identifier: String,
    pub base_url: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Versions as documented (`v1`, `1.0`, ...)
    pub versions: Vec<String>,
}

/// One API in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEntry {
    pub metadata: ApiMetadata,
    /// Version key → methods in document order
    pub versions: BTreeMap<String, Vec<GeneratedMethod>>,
}

impl ApiEntry {
    pub fn method_count(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }
}

/// Root aggregate read by the emitter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiTree {
    apis: BTreeMap<String, ApiEntry>,
}

impl ApiTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the compiled methods of one (API, version) pair.
    ///
    /// Versions without methods are not recorded. When two documented
    /// versions map to the same key (`v1` and `1.0`) the first one wins.
    /// Returns whether the version was stored.
    pub fn insert_version(
        &mut self,
        metadata: &ApiMetadata,
        version: &str,
        methods: Vec<GeneratedMethod>,
    ) -> bool {
        if methods.is_empty() {
            return false;
        }

        let entry = self
            .apis
            .entry(metadata.identifier.clone())
            .or_insert_with(|| ApiEntry {
                metadata: metadata.clone(),
                versions: BTreeMap::new(),
            });

        let key = version_key(version);
        if entry.versions.contains_key(&key) {
            return false;
        }
        entry.versions.insert(key, methods);
        true
    }

    pub fn apis(&self) -> impl Iterator<Item = &ApiEntry> {
        self.apis.values()
    }

    pub fn get(&self, identifier: &str) -> Option<&ApiEntry> {
        self.apis.get(identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }

    pub fn api_count(&self) -> usize {
        self.apis.len()
    }

    pub fn version_count(&self) -> usize {
        self.apis.values().map(|api| api.versions.len()).sum()
    }

    pub fn method_count(&self) -> usize {
        self.apis.values().map(ApiEntry::method_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::DocBlock;

    fn metadata(identifier: &str) -> ApiMetadata {
        ApiMetadata {
            identifier: identifier.to_string(),
            base_url: format!("https://{}.example.com", identifier.to_lowercase()),
            name: None,
            description: None,
            versions: vec!["v1".to_string(), "v2".to_string()],
        }
    }

    fn method(name: &str) -> GeneratedMethod {
        GeneratedMethod {
            name: name.to_string(),
            path: "/v1/ping".to_string(),
            doc: DocBlock {
                description: String::new(),
                deprecated: false,
                full: false,
            },
            params: Vec::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn test_empty_version_is_skipped() {
        let mut tree = ApiTree::new();
        assert!(!tree.insert_version(&metadata("Chat"), "v2", Vec::new()));
        assert!(tree.is_empty());

        assert!(tree.insert_version(&metadata("Chat"), "v1", vec![method("Ping")]));
        let chat = tree.get("Chat").unwrap();
        assert_eq!(chat.versions.keys().collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn test_first_version_key_wins() {
        let mut tree = ApiTree::new();
        assert!(tree.insert_version(&metadata("Chat"), "v1", vec![method("Ping")]));
        assert!(!tree.insert_version(&metadata("Chat"), "1.0", vec![method("Pong")]));
        assert_eq!(tree.get("Chat").unwrap().versions["1"][0].name, "Ping");
    }

    #[test]
    fn test_counts() {
        let mut tree = ApiTree::new();
        tree.insert_version(&metadata("Chat"), "v1", vec![method("A"), method("B")]);
        tree.insert_version(&metadata("Chat"), "v2", vec![method("C")]);
        tree.insert_version(&metadata("Friends"), "v1", vec![method("D")]);

        assert_eq!(tree.api_count(), 2);
        assert_eq!(tree.version_count(), 3);
        assert_eq!(tree.method_count(), 4);
        let ids: Vec<_> = tree.apis().map(|api| api.metadata.identifier.as_str()).collect();
        assert_eq!(ids, vec!["Chat", "Friends"]);
    }
}

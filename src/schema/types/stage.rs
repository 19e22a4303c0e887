use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The nine recognized pipeline stage kinds.
///
/// A directive argument whose name matches one of these appends stage
/// names to the matching list on its target; anything else is not a
/// pipeline argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Validate,
    Construct,
    Restruct,
    Destruct,
    Instruct,
    Normalize,
    Transform,
    Serialize,
    Deserialize,
}

impl StageKind {
    pub const ALL: [StageKind; 9] = [
        StageKind::Validate,
        StageKind::Construct,
        StageKind::Restruct,
        StageKind::Destruct,
        StageKind::Instruct,
        StageKind::Normalize,
        StageKind::Transform,
        StageKind::Serialize,
        StageKind::Deserialize,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "validate" => Some(StageKind::Validate),
            "construct" => Some(StageKind::Construct),
            "restruct" => Some(StageKind::Restruct),
            "destruct" => Some(StageKind::Destruct),
            "instruct" => Some(StageKind::Instruct),
            "normalize" => Some(StageKind::Normalize),
            "transform" => Some(StageKind::Transform),
            "serialize" => Some(StageKind::Serialize),
            "deserialize" => Some(StageKind::Deserialize),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Validate => "validate",
            StageKind::Construct => "construct",
            StageKind::Restruct => "restruct",
            StageKind::Destruct => "destruct",
            StageKind::Instruct => "instruct",
            StageKind::Normalize => "normalize",
            StageKind::Transform => "transform",
            StageKind::Serialize => "serialize",
            StageKind::Deserialize => "deserialize",
        }
    }
}

/// Ordered stage-name lists grouped by stage kind.
///
/// Lists are append-only while the compiler runs and immutable once the
/// schema is frozen. Declaration order is preserved; the assembler
/// prepends or appends its built-in stages around the custom ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageMap(BTreeMap<StageKind, Vec<String>>);

impl StageMap {
    /// Appends stage names in order, dropping empty entries.
    pub fn append(&mut self, kind: StageKind, names: impl IntoIterator<Item = String>) {
        let list = self.0.entry(kind).or_default();
        list.extend(names.into_iter().filter(|name| !name.is_empty()));
    }

    pub(crate) fn push(&mut self, kind: StageKind, name: &str) {
        self.0.entry(kind).or_default().push(name.to_string());
    }

    pub(crate) fn prepend(&mut self, kind: StageKind, name: &str) {
        self.0.entry(kind).or_default().insert(0, name.to_string());
    }

    pub fn get(&self, kind: StageKind) -> &[String] {
        self.0.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn has(&self, kind: StageKind) -> bool {
        !self.get(kind).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_names_round_trip() {
        for kind in StageKind::ALL {
            assert_eq!(StageKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StageKind::from_name("key"), None);
    }

    #[test]
    fn test_stage_map_preserves_order_and_drops_empty() {
        let mut map = StageMap::default();
        map.append(
            StageKind::Validate,
            vec!["a".to_string(), String::new(), "b".to_string()],
        );
        map.push(StageKind::Validate, "c");
        map.prepend(StageKind::Validate, "first");
        assert_eq!(map.get(StageKind::Validate), ["first", "a", "b", "c"]);
        assert!(!map.has(StageKind::Serialize));
    }
}

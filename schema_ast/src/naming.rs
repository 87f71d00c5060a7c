//! Schema-legal names
//!
//! Schema identifiers may only contain ASCII letters and digits. Everything else in a
//! reflected name is dropped, and component (type) names additionally start upper-case.
//! Class schema names are assigned per generation run by [`SchemaNames`], which keeps
//! them unique when two classes share a short name.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::reflection::{ReflectedType, TypePath};
use crate::replication::ReplicatedPropertyGroup;

/// Separator between segments of a property chain in a field name
pub const FIELD_NAME_SEPARATOR: &str = "_";

/// Suffix of the handover component name
const HANDOVER_SUFFIX: &str = "Handover";

/// Keep only ASCII alphanumeric characters, preserving their order
pub fn sanitize(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// [`sanitize`] with the first character upper-cased; empty input stays empty
pub fn component_name(name: &str) -> String {
    let sanitized = sanitize(name);
    let mut chars = sanitized.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

/// Schema name of one property segment: lower-cased, with the static index appended for
/// fixed-size arrays so every slot gets its own name
pub fn property_segment_name(name: &str, array_dim: u32, static_array_index: u32) -> String {
    let mut segment = name.to_lowercase();
    if array_dim > 1 {
        segment.push_str(&static_array_index.to_string());
    }
    sanitize(&segment)
}

/// Schema name of an RPC
pub fn rpc_name(function_name: &str) -> String {
    sanitize(&function_name.to_lowercase())
}

/// C++ spelling of a reflected type name: `A` prefix for actors, `U` for other classes,
/// `F` for structs
pub fn full_cpp_name(reflected: &ReflectedType) -> String {
    let prefix = if !reflected.is_class() {
        'F'
    } else if reflected.is_actor {
        'A'
    } else {
        'U'
    };
    format!("{prefix}{}", reflected.name)
}

/// Class path to schema name assignments for one generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaNames {
    assigned:  BTreeMap<TypePath, String>,
    #[serde(skip)]
    taken:     HashSet<String>,
    #[serde(skip)]
    reserved:  HashSet<String>,
    #[serde(skip)]
    overrides: HashMap<TypePath, String>,
}

impl SchemaNames {
    /// Create an empty context with explicit overrides for selected classes.
    ///
    /// Override names are reserved up front so no other class can take them first.
    pub fn new(overrides: impl IntoIterator<Item = (TypePath, String)>) -> Self {
        let overrides: HashMap<_, _> = overrides
            .into_iter()
            .map(|(class, name)| (class, component_name(&name)))
            .collect();
        Self {
            reserved: overrides.values().cloned().collect(),
            overrides,
            ..Self::default()
        }
    }

    /// Schema name for `class`, assigning one on first use.
    ///
    /// An override is used as given (after sanitizing) and only gets a numeric suffix when
    /// another override already claimed the same name. Otherwise the class's short name is
    /// used, suffixed when it is taken or reserved by an override.
    pub fn assign(&mut self, class: &TypePath) -> String {
        if let Some(name) = self.assigned.get(class) {
            return name.clone();
        }

        let (base, avoid_reserved) = match self.overrides.get(class) {
            Some(name) => (name.clone(), false),
            None => (component_name(class.short_name()), true),
        };
        let is_free =
            |name: &String| !self.taken.contains(name) && !(avoid_reserved && self.reserved.contains(name));
        let mut candidate = base.clone();
        let mut suffix = 1_u32;
        while !is_free(&candidate) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }

        self.taken.insert(candidate.clone());
        self.assigned.insert(class.clone(), candidate.clone());
        candidate
    }

    /// Schema name previously assigned to `class`
    pub fn get(&self, class: &TypePath) -> Option<&str> {
        self.assigned.get(class).map(String::as_str)
    }

    /// Component name of a class's replicated data for one audience group
    pub fn replicated_data_name(
        &self,
        group: ReplicatedPropertyGroup,
        class: &TypePath,
    ) -> Option<String> {
        self.get(class)
            .map(|name| format!("{}{group}", component_name(name)))
    }

    /// Component name of a class's handover data
    pub fn handover_data_name(&self, class: &TypePath) -> Option<String> {
        self.get(class)
            .map(|name| format!("{}{HANDOVER_SUFFIX}", component_name(name)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::reflection::TypeCategory;

    #[test]
    fn test_sanitize_keeps_alphanumerics_in_order() {
        assert_eq!(sanitize("My_Field-2"), "MyField2");
        assert_eq!(sanitize("  a b\tc "), "abc");
        assert_eq!(sanitize("__"), "");
        assert_eq!(sanitize("Ünïcode9"), "ncode9");
    }

    #[test]
    fn test_sanitize_output_is_alphanumeric_only() {
        for input in ["a.b.c", "x-y_z", "(1,2)", "Mixed Case_Name!"] {
            assert!(sanitize(input).chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_component_name() {
        assert_eq!(component_name(""), "");
        assert_eq!(component_name("health"), "Health");
        assert_eq!(component_name("_health_component"), "Healthcomponent");
        assert_eq!(component_name("__"), "");
    }

    #[test]
    fn test_property_segment_name_appends_static_index() {
        assert_eq!(property_segment_name("Ammo_Count", 1, 0), "ammocount");
        assert_eq!(property_segment_name("Slots", 4, 2), "slots2");
    }

    #[test]
    fn test_rpc_name() {
        assert_eq!(rpc_name("ServerMove_Old"), "servermoveold");
    }

    #[test]
    fn test_full_cpp_name() {
        let mut reflected = ReflectedType {
            path:                 TypePath::from("/Script/Engine.Character"),
            name:                 "Character".to_string(),
            category:             TypeCategory::Class,
            is_actor:             true,
            is_actor_component:   false,
            editor_only:          false,
            native_net_serialize: false,
            fields:               vec![],
            functions:            vec![],
        };
        assert_eq!(full_cpp_name(&reflected), "ACharacter");

        reflected.is_actor = false;
        assert_eq!(full_cpp_name(&reflected), "UCharacter");

        reflected.category = TypeCategory::Struct;
        assert_eq!(full_cpp_name(&reflected), "FCharacter");
    }

    #[test]
    fn test_schema_names_disambiguate_short_name_clashes() {
        let mut names = SchemaNames::new([]);
        let first = TypePath::from("/Game/A/Character");
        let second = TypePath::from("/Game/B/Character");

        assert_eq!(names.assign(&first), "Character");
        assert_eq!(names.assign(&second), "Character1");
        assert_eq!(names.assign(&first), "Character");
        assert_eq!(names.get(&second), Some("Character1"));
    }

    #[test]
    fn test_schema_names_overrides_and_component_names() {
        let pawn = TypePath::from("/Game/Pawn.Pawn_C");
        let mut names = SchemaNames::new([(pawn.clone(), "hero_pawn".to_string())]);

        assert_eq!(names.assign(&pawn), "Heropawn");
        assert_eq!(
            names
                .replicated_data_name(ReplicatedPropertyGroup::SingleClient, &pawn)
                .unwrap(),
            "HeropawnSingleClientRepData"
        );
        assert_eq!(names.handover_data_name(&pawn).unwrap(), "HeropawnHandover");
        assert!(names.handover_data_name(&TypePath::from("/Game/Other")).is_none());
    }

    #[test]
    fn test_schema_names_override_wins_over_earlier_class() {
        let hero = TypePath::from("/Game/A/Hero");
        let pawn = TypePath::from("/Game/B/Pawn");
        let mut names = SchemaNames::new([(pawn.clone(), "Hero".to_string())]);

        assert_eq!(names.assign(&hero), "Hero1");
        assert_eq!(names.assign(&pawn), "Hero");
    }

    #[test]
    fn test_schema_names_clashing_overrides_are_suffixed() {
        let first = TypePath::from("/Game/A/Pawn");
        let second = TypePath::from("/Game/B/Pawn");
        let mut names = SchemaNames::new([
            (first.clone(), "Hero".to_string()),
            (second.clone(), "hero".to_string()),
        ]);

        assert_eq!(names.assign(&first), "Hero");
        assert_eq!(names.assign(&second), "Hero1");
    }
}

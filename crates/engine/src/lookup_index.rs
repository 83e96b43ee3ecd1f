//! `LookupIndex` (C1): one-time classification of catalogue items into
//! proficiency/category buckets.

use std::collections::HashMap;

use tracing::{debug, warn};

use equipcore_domain::{
    ArmorShape, CategoryKey, ItemKind, ItemRef, PackId, PackRef, Proficiency, WeaponShape,
};

use crate::notify::{CoreEvent, Notifier};
use crate::ports::ItemStore;

/// Kinds that ever participate in category buckets: weapon, armor,
/// shield, tool, focus, equipment.
const BUCKETED_KINDS: [ItemKind; 6] = [
    ItemKind::Weapon,
    ItemKind::Armor,
    ItemKind::Shield,
    ItemKind::Tool,
    ItemKind::Focus,
    ItemKind::Equipment,
];

/// `{categoryKey → ordered list of ItemRef}`.
#[derive(Debug, Default)]
pub struct LookupIndex {
    buckets: HashMap<String, Vec<ItemRef>>,
    by_local_id: HashMap<String, ItemRef>,
    /// Which packs this index was last built from, so a redundant rebuild
    /// request (the active pack set did not change) can no-op. Invalidated
    /// only when the set of active compendium packs changes.
    built_from: Vec<PackId>,
}

impl LookupIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when `packs` is exactly the set this index was built from, in
    /// which case the caller can skip calling `build` again.
    pub fn is_current_for(&self, packs: &[PackRef]) -> bool {
        if packs.len() != self.built_from.len() {
            return false;
        }
        let mut current: Vec<PackId> = packs.iter().map(PackRef::id).collect();
        let mut built: Vec<PackId> = self.built_from.clone();
        current.sort_by_key(|id| id.to_uuid());
        built.sort_by_key(|id| id.to_uuid());
        current == built
    }

    /// Read every pack's index and classify each item into zero or more
    /// buckets. A pack whose index cannot be read is logged, reported to
    /// `notifier` as `PackUnavailable`, and skipped; the index still
    /// returns from the packs that succeeded.
    pub async fn build(item_store: &dyn ItemStore, packs: &[PackRef], notifier: &Notifier) -> Self {
        let mut buckets: HashMap<String, Vec<ItemRef>> = HashMap::new();
        let mut by_local_id: HashMap<String, ItemRef> = HashMap::new();

        for pack in packs {
            let entries = match item_store.pack_index(pack.id()).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(pack = %pack.name(), error = %err, "pack unavailable, skipping");
                    notifier.emit(CoreEvent::PackUnavailable {
                        pack_name: pack.name().to_string(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            for entry in entries {
                let item_ref = entry.to_item_ref(pack.id());
                by_local_id.insert(entry.local_id.clone(), item_ref.clone());

                if !BUCKETED_KINDS.contains(&entry.kind) {
                    continue;
                }
                for key in classify(&entry) {
                    buckets.entry(key.bucket_key()).or_default().push(item_ref.clone());
                }
            }
        }

        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        }

        debug!(pack_count = packs.len(), bucket_count = buckets.len(), "lookup index built");

        Self {
            buckets,
            by_local_id,
            built_from: packs.iter().map(PackRef::id).collect(),
        }
    }

    /// Ordered by name, stable across calls.
    pub fn lookup_by_category(&self, category_key: &CategoryKey) -> &[ItemRef] {
        self.buckets
            .get(&category_key.bucket_key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Locate an item by id; `pack_hint` is accepted for interface parity
    /// with `ItemStore::resolve_ref` but this index keys purely by local id,
    /// matching `IndexEntry`'s identity.
    pub fn resolve_ref(&self, local_id: &str) -> Option<&ItemRef> {
        self.by_local_id.get(local_id)
    }
}

/// Classify one index entry into zero or more category buckets by
/// inspecting its declarative tags: proficiency class, weapon/armor shape,
/// tool subtype. An item matching multiple buckets is inserted into each
/// independently.
fn classify(entry: &equipcore_domain::IndexEntry) -> Vec<CategoryKey> {
    let mut keys = Vec::new();
    match entry.kind {
        ItemKind::Weapon => {
            if let (Some(proficiency), Some(shape)) = (
                entry.tag("proficiency").and_then(parse_proficiency),
                entry.tag("shape").and_then(parse_weapon_shape),
            ) {
                keys.push(CategoryKey::Weapon { proficiency, shape });
            }
        }
        ItemKind::Armor => {
            if let (Some(proficiency), Some(shape)) = (
                entry.tag("proficiency").and_then(parse_proficiency),
                entry.tag("shape").and_then(parse_armor_shape),
            ) {
                keys.push(CategoryKey::Armor { proficiency, shape });
            }
        }
        ItemKind::Shield => keys.push(CategoryKey::Shield),
        ItemKind::Tool => {
            if let Some(tool_type) = entry.tag("tool_type") {
                keys.push(CategoryKey::Tool {
                    tool_type: tool_type.to_string(),
                });
            }
        }
        ItemKind::Focus => {
            if let Some(tradition) = entry.tag("tradition") {
                keys.push(CategoryKey::Focus {
                    tradition: tradition.to_string(),
                });
            }
        }
        _ => {}
    }
    keys
}

fn parse_proficiency(tag: &str) -> Option<Proficiency> {
    match tag.to_lowercase().as_str() {
        "simple" => Some(Proficiency::Simple),
        "martial" => Some(Proficiency::Martial),
        "exotic" => Some(Proficiency::Exotic),
        _ => None,
    }
}

fn parse_weapon_shape(tag: &str) -> Option<WeaponShape> {
    match tag.to_lowercase().as_str() {
        "melee" => Some(WeaponShape::Melee),
        "ranged" => Some(WeaponShape::Ranged),
        _ => None,
    }
}

fn parse_armor_shape(tag: &str) -> Option<ArmorShape> {
    match tag.to_lowercase().as_str() {
        "light" => Some(ArmorShape::Light),
        "medium" => Some(ArmorShape::Medium),
        "heavy" => Some(ArmorShape::Heavy),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockItemStore;
    use equipcore_domain::IndexEntry;

    fn entry(local_id: &str, name: &str, kind: ItemKind, tags: &[(&str, &str)]) -> IndexEntry {
        IndexEntry {
            local_id: local_id.to_string(),
            name: name.to_string(),
            kind,
            tags: Vec::new(),
            system: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[tokio::test]
    async fn classifies_weapons_by_proficiency_and_shape() {
        let pack = PackRef::new(PackId::new(), "core");
        let mut store = MockItemStore::new();
        let pack_id = pack.id();
        store.expect_pack_index().withf(move |id| *id == pack_id).returning(move |_| {
            Ok(vec![
                entry("axe", "Handaxe", ItemKind::Weapon, &[("proficiency", "martial"), ("shape", "melee")]),
                entry("bow", "Shortbow", ItemKind::Weapon, &[("proficiency", "simple"), ("shape", "ranged")]),
            ])
        });

        let index = LookupIndex::build(&store, &[pack], &Notifier::new()).await;
        let martial_melee = index.lookup_by_category(&CategoryKey::Weapon {
            proficiency: Proficiency::Martial,
            shape: WeaponShape::Melee,
        });
        assert_eq!(martial_melee.len(), 1);
        assert_eq!(martial_melee[0].name(), "Handaxe");
    }

    #[tokio::test]
    async fn buckets_are_name_ordered() {
        let pack = PackRef::new(PackId::new(), "core");
        let mut store = MockItemStore::new();
        let pack_id = pack.id();
        store.expect_pack_index().withf(move |id| *id == pack_id).returning(move |_| {
            Ok(vec![
                entry("z", "Zweihander", ItemKind::Weapon, &[("proficiency", "martial"), ("shape", "melee")]),
                entry("a", "Arming Sword", ItemKind::Weapon, &[("proficiency", "martial"), ("shape", "melee")]),
            ])
        });

        let index = LookupIndex::build(&store, &[pack], &Notifier::new()).await;
        let names: Vec<_> = index
            .lookup_by_category(&CategoryKey::Weapon {
                proficiency: Proficiency::Martial,
                shape: WeaponShape::Melee,
            })
            .iter()
            .map(ItemRef::name)
            .collect();
        assert_eq!(names, vec!["Arming Sword", "Zweihander"]);
    }

    #[tokio::test]
    async fn unavailable_pack_is_skipped_not_fatal() {
        let good = PackRef::new(PackId::new(), "good");
        let bad = PackRef::new(PackId::new(), "bad");
        let mut store = MockItemStore::new();
        let good_id = good.id();
        let bad_id = bad.id();
        store.expect_pack_index().withf(move |id| *id == good_id).returning(|_| {
            Ok(vec![entry("axe", "Handaxe", ItemKind::Weapon, &[("proficiency", "martial"), ("shape", "melee")])])
        });
        store.expect_pack_index().withf(move |id| *id == bad_id).returning(|_| {
            Err(crate::error::CoreError::PackUnavailable("bad".to_string(), "read failed".to_string()))
        });

        let index = LookupIndex::build(&store, &[good, bad], &Notifier::new()).await;
        assert!(index.resolve_ref("axe").is_some());
    }

    #[tokio::test]
    async fn unavailable_pack_emits_pack_unavailable() {
        let bad = PackRef::new(PackId::new(), "bad");
        let mut store = MockItemStore::new();
        store.expect_pack_index().returning(|_| {
            Err(crate::error::CoreError::PackUnavailable("bad".to_string(), "read failed".to_string()))
        });

        let mut notifier = Notifier::new();
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen_in_listener = seen.clone();
        notifier.subscribe(Box::new(move |event| {
            if matches!(event, CoreEvent::PackUnavailable { pack_name, .. } if pack_name == "bad") {
                seen_in_listener.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        }));

        LookupIndex::build(&store, &[bad], &notifier).await;
        assert!(seen.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn is_current_for_detects_pack_set_change() {
        let pack_a = PackRef::new(PackId::new(), "a");
        let pack_b = PackRef::new(PackId::new(), "b");
        let mut store = MockItemStore::new();
        store.expect_pack_index().returning(|_| Ok(Vec::new()));

        let index = LookupIndex::build(&store, &[pack_a.clone()], &Notifier::new()).await;
        assert!(index.is_current_for(&[pack_a.clone()]));
        assert!(!index.is_current_for(&[pack_a, pack_b]));
    }
}

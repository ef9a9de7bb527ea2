//! DRM system registry and the `DRMSystem` CPIX entity.
//!
//! The registry is the single place where DRM system ids are mapped to their
//! canonical names. The parser uses it to pick a PSSH extraction rule and the
//! exporters use it to name each system.
use uuid::Uuid;

/// Name reported for system ids missing from the registry.
pub const UNKNOWN_DRM_NAME: &str = "Unknown";

/// Known DRM systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrmSystem {
    PlayReady,
    Widevine,
    Nagra,
}

impl DrmSystem {
    /// Well-known DASH-IF system id.
    pub fn to_uuid(self) -> Uuid {
        match self {
            DrmSystem::PlayReady => Uuid::from_u128(0x9a04f07998404286ab92e65be0885f95),
            DrmSystem::Widevine => Uuid::from_u128(0xedef8ba979d64acea3c827dcd51d21ed),
            DrmSystem::Nagra => Uuid::from_u128(0xadb41c242dbf4a6d958b4457c0d27b95),
        }
    }

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            DrmSystem::PlayReady => "PLAYREADY",
            DrmSystem::Widevine => "WIDEVINE",
            DrmSystem::Nagra => "NAGRA",
        }
    }

    /// Whether `pssh_data` comes from the PSSH box rather than the content
    /// protection data.
    pub fn uses_pssh_box(self) -> bool {
        matches!(self, DrmSystem::Widevine | DrmSystem::Nagra)
    }
}

/// Bidirectional lookup between DRM system ids and names.
///
/// Lookups never fail: unknown ids resolve to [`UNKNOWN_DRM_NAME`] and unknown
/// names to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmRegistry {
    entries: Vec<(Uuid, DrmSystem)>,
}

impl Default for DrmRegistry {
    fn default() -> Self {
        Self {
            entries: [DrmSystem::PlayReady, DrmSystem::Widevine, DrmSystem::Nagra]
                .into_iter()
                .map(|system| (system.to_uuid(), system))
                .collect(),
        }
    }
}

impl DrmRegistry {
    /// Registry holding PlayReady, Widevine and Nagra.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias an extra system id to a known DRM system.
    ///
    /// Name lookups keep returning the first id registered for a system.
    pub fn register(&mut self, system_id: Uuid, system: DrmSystem) -> &mut Self {
        if self.lookup(&system_id).is_none() {
            self.entries.push((system_id, system));
        }
        self
    }

    /// Resolve a system id to a known DRM system.
    pub fn lookup(&self, system_id: &Uuid) -> Option<DrmSystem> {
        self.entries
            .iter()
            .find(|(id, _)| id == system_id)
            .map(|(_, system)| *system)
    }

    /// Canonical name for a system id, or `"Unknown"`.
    pub fn name_for(&self, system_id: &Uuid) -> &'static str {
        self.lookup(system_id)
            .map(DrmSystem::name)
            .unwrap_or(UNKNOWN_DRM_NAME)
    }

    /// Case-insensitive name lookup.
    pub fn system_id_for(&self, name: &str) -> Option<Uuid> {
        let name = name.to_uppercase();
        self.entries
            .iter()
            .find(|(_, system)| system.name() == name)
            .map(|(id, _)| *id)
    }
}

/// A `DRMSystem` element of a CPIX document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmSystemEntry {
    /// Content key id this entry protects.
    pub kid: Uuid,
    /// DRM system id.
    pub system_id: Uuid,
    /// Full PSSH box, base64 as found in the document.
    pub pssh: String,
    /// DRM specific payload: raw `<mspr:pro>` text for PlayReady, base64 PSSH
    /// data for Widevine and Nagra, empty for anything else.
    pub pssh_data: String,
    /// Content protection data, base64 as found in the document.
    pub content_protection_data: String,
}

#[cfg(test)]
mod tests {
    use super::{DrmRegistry, DrmSystem, UNKNOWN_DRM_NAME};
    use uuid::Uuid;

    #[test]
    fn names_resolve_for_known_ids() {
        let registry = DrmRegistry::default();
        let widevine = Uuid::parse_str("edef8ba9-79d6-4ace-a3c8-27dcd51d21ed").unwrap();
        let playready = Uuid::parse_str("9A04F079-9840-4286-AB92-E65BE0885F95").unwrap();
        let nagra = Uuid::parse_str("adb41c24-2dbf-4a6d-958b-4457c0d27b95").unwrap();

        assert_eq!(registry.name_for(&widevine), "WIDEVINE");
        assert_eq!(registry.name_for(&playready), "PLAYREADY");
        assert_eq!(registry.name_for(&nagra), "NAGRA");
    }

    #[test]
    fn unknown_id_is_unknown() {
        let registry = DrmRegistry::default();
        let fairplay = Uuid::parse_str("94ce86fb-07ff-4f43-adb8-93d2fa968ca2").unwrap();
        assert_eq!(registry.name_for(&fairplay), UNKNOWN_DRM_NAME);
        assert_eq!(registry.lookup(&fairplay), None);
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let registry = DrmRegistry::default();
        assert_eq!(
            registry.system_id_for("widevine"),
            Some(DrmSystem::Widevine.to_uuid())
        );
        assert_eq!(
            registry.system_id_for("PlayReady"),
            Some(DrmSystem::PlayReady.to_uuid())
        );
        assert_eq!(registry.system_id_for("fairplay"), None);
    }

    #[test]
    fn registered_alias_resolves() {
        let alias = Uuid::parse_str("00000000-0000-0000-0000-0000000000aa").unwrap();
        let mut registry = DrmRegistry::default();
        registry.register(alias, DrmSystem::Nagra);

        assert_eq!(registry.lookup(&alias), Some(DrmSystem::Nagra));
        assert_eq!(registry.system_id_for("nagra"), Some(DrmSystem::Nagra.to_uuid()));
    }
}

//! The simulated program state.
//!
//! A fixed small object graph: one class-level record (`Device`), one
//! subclass-level record (`SmartDevice`), and up to three instance records
//! (`d1`, `d2`, `sd1`). Instances are created by specific scenes and are
//! `None` before that.
//!
//! Shadowing is modeled explicitly: an instance or subclass `status` of
//! `None` means "not shadowed, resolve through the class chain at read
//! time". Nothing is ever copied eagerly from a parent. The mutable
//! `shared_log` lives only on the class record and is read through it by
//! every consumer, which is exactly the shared-reference semantics the
//! visualizer demonstrates.

use serde::{Deserialize, Serialize};

/// Which class line an instance belongs to, for attribute-lookup fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLine {
    /// Direct instance of the base class (`Device`).
    Base,
    /// Instance of the derived class (`SmartDevice`).
    Derived,
}

/// The three named instance slots of the visualized program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceName {
    /// First base-class instance.
    D1,
    /// Second base-class instance.
    D2,
    /// The derived-class instance.
    Sd1,
}

impl InstanceName {
    /// The variable name used in the visualized source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::D1 => "d1",
            Self::D2 => "d2",
            Self::Sd1 => "sd1",
        }
    }
}

impl std::fmt::Display for InstanceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class-level state of the base class (`Device`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Class variable `status`, shared by every instance that has not
    /// shadowed it.
    pub status: String,
    /// Number of instances created so far.
    pub instance_count: u32,
    /// The mutable class variable: one ordered log shared by reference
    /// across all instances.
    pub shared_log: Vec<String>,
}

impl ClassRecord {
    /// The record as established by the class-definition scene.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            status: "Offline".to_string(),
            instance_count: 0,
            shared_log: Vec::new(),
        }
    }
}

/// Class-level state of the derived class (`SmartDevice`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubclassRecord {
    /// Class variable owned by the subclass.
    pub software_version: String,
    /// `Some` only once the subclass has shadowed the inherited `status`;
    /// `None` means reads fall through to [`ClassRecord::status`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SubclassRecord {
    /// The record as established by the subclass-definition scene.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            software_version: "1.0".to_string(),
            status: None,
        }
    }
}

/// One instance of the visualized program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance variable `device_id`.
    pub id: String,
    /// Instance variable `location`.
    pub location: String,
    /// `Some` only once the instance has shadowed the class `status`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Present only on derived-class instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Which class chain attribute lookup falls back through.
    pub class_line: ClassLine,
}

impl InstanceRecord {
    /// Creates a base-class instance with an unshadowed status.
    #[must_use]
    pub fn base(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            status: None,
            ip_address: None,
            class_line: ClassLine::Base,
        }
    }

    /// Creates a derived-class instance with an unshadowed status.
    #[must_use]
    pub fn derived(
        id: impl Into<String>,
        location: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            status: None,
            ip_address: Some(ip_address.into()),
            class_line: ClassLine::Derived,
        }
    }
}

/// The full simulated snapshot at one point of the visualized timeline.
///
/// `Clone` performs a deep copy (there is no interior sharing), so cached
/// snapshots are fully independent of each other and of the live state.
///
/// # Examples
///
/// ```
/// use oopviz::ProgramState;
///
/// let state = ProgramState::initial();
/// assert_eq!(state.device.instance_count, 0);
/// assert!(state.d1.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramState {
    /// Base-class record (`Device`).
    pub device: ClassRecord,
    /// Derived-class record (`SmartDevice`).
    pub smart_device: SubclassRecord,
    /// First base instance, created by its instantiation scene.
    pub d1: Option<InstanceRecord>,
    /// Second base instance.
    pub d2: Option<InstanceRecord>,
    /// Derived instance.
    pub sd1: Option<InstanceRecord>,
    /// Index of the scene whose transition produced this snapshot.
    pub scene_index: usize,
}

impl ProgramState {
    /// The fixed index-0 snapshot the whole timeline derives from.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            device: ClassRecord::initial(),
            smart_device: SubclassRecord::initial(),
            d1: None,
            d2: None,
            sd1: None,
            scene_index: 0,
        }
    }

    /// Returns the named instance slot, if its creation scene has run.
    #[must_use]
    pub fn instance(&self, name: InstanceName) -> Option<&InstanceRecord> {
        match name {
            InstanceName::D1 => self.d1.as_ref(),
            InstanceName::D2 => self.d2.as_ref(),
            InstanceName::Sd1 => self.sd1.as_ref(),
        }
    }

    pub(crate) fn instance_mut(&mut self, name: InstanceName) -> Option<&mut InstanceRecord> {
        match name {
            InstanceName::D1 => self.d1.as_mut(),
            InstanceName::D2 => self.d2.as_mut(),
            InstanceName::Sd1 => self.sd1.as_mut(),
        }
    }

    /// Resolves an instance's `status` through the Python lookup order:
    /// instance attribute, then the owning class, then the base class.
    #[must_use]
    pub fn resolved_status<'a>(&'a self, instance: &'a InstanceRecord) -> &'a str {
        if let Some(status) = instance.status.as_deref() {
            return status;
        }
        if instance.class_line == ClassLine::Derived {
            if let Some(status) = self.smart_device.status.as_deref() {
                return status;
            }
        }
        &self.device.status
    }

    /// Resolves the status of a named instance, or `None` while the
    /// instance has not been created yet.
    #[must_use]
    pub fn resolved_status_of(&self, name: InstanceName) -> Option<&str> {
        self.instance(name).map(|i| self.resolved_status(i))
    }

    /// Resolves a class-level `status` read on the subclass, falling back
    /// to the base class while the subclass has not shadowed it.
    #[must_use]
    pub fn subclass_status(&self) -> &str {
        self.smart_device
            .status
            .as_deref()
            .unwrap_or(&self.device.status)
    }

    /// Stable 32-byte digest of this snapshot.
    ///
    /// Two snapshots compare fingerprint-equal exactly when their canonical
    /// JSON encodings are byte-identical. Tests use this to state the
    /// determinism and cache-transparency properties cheaply.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        let canonical =
            serde_json::to_vec(self).expect("ProgramState serialization cannot fail");
        *blake3::hash(&canonical).as_bytes()
    }
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_shape() {
        let state = ProgramState::initial();
        assert_eq!(state.device.status, "Offline");
        assert_eq!(state.device.instance_count, 0);
        assert!(state.device.shared_log.is_empty());
        assert_eq!(state.smart_device.software_version, "1.0");
        assert!(state.smart_device.status.is_none());
        assert!(state.d1.is_none());
        assert!(state.d2.is_none());
        assert!(state.sd1.is_none());
        assert_eq!(state.scene_index, 0);
    }

    #[test]
    fn test_resolved_status_falls_back_to_class() {
        let mut state = ProgramState::initial();
        state.d1 = Some(InstanceRecord::base("Sensor01", "Lab A"));

        let d1 = state.d1.clone().unwrap();
        assert_eq!(state.resolved_status(&d1), "Offline");

        state.device.status = "Maintenance".to_string();
        assert_eq!(state.resolved_status(&d1), "Maintenance");
    }

    #[test]
    fn test_resolved_status_prefers_instance_shadow() {
        let mut state = ProgramState::initial();
        let mut d1 = InstanceRecord::base("Sensor01", "Lab A");
        d1.status = Some("Online".to_string());
        state.d1 = Some(d1.clone());

        state.device.status = "Maintenance".to_string();
        assert_eq!(state.resolved_status(&d1), "Online");
    }

    #[test]
    fn test_derived_instance_resolves_through_subclass() {
        let mut state = ProgramState::initial();
        let sd1 = InstanceRecord::derived("Cam03", "Entrance", "192.168.1.100");
        state.sd1 = Some(sd1.clone());

        // No shadow anywhere: falls through to the base class.
        assert_eq!(state.resolved_status(&sd1), "Offline");

        // Subclass shadow wins over the base class for derived instances...
        state.smart_device.status = Some("Active".to_string());
        assert_eq!(state.resolved_status(&sd1), "Active");

        // ...but base instances are unaffected by it.
        let d2 = InstanceRecord::base("Actuator02", "Lab B");
        state.d2 = Some(d2.clone());
        assert_eq!(state.resolved_status(&d2), "Offline");
    }

    #[test]
    fn test_subclass_status_inherits_until_shadowed() {
        let mut state = ProgramState::initial();
        assert_eq!(state.subclass_status(), "Offline");
        state.smart_device.status = Some("Active".to_string());
        assert_eq!(state.subclass_status(), "Active");
        assert_eq!(state.device.status, "Offline");
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut original = ProgramState::initial();
        original.device.shared_log.push("Sensor01: Initialized".to_string());

        let mut copy = original.clone();
        copy.device.shared_log.push("Actuator02: Initialized".to_string());

        assert_eq!(original.device.shared_log.len(), 1);
        assert_eq!(copy.device.shared_log.len(), 2);
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let a = ProgramState::initial();
        let b = ProgramState::initial();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = ProgramState::initial();
        c.device.instance_count = 1;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_state_serialization_round_trip() {
        let mut state = ProgramState::initial();
        state.d1 = Some(InstanceRecord::base("Sensor01", "Lab A"));
        let json = serde_json::to_string(&state).unwrap();
        let back: ProgramState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}

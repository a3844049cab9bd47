//! The visualized program text and its scene-tag resolver.
//!
//! The listing embeds `# scene-id: <name>_start` / `<name>_end` marker
//! comments. [`SourceMap::build`] scans the text once and pairs the markers
//! into concrete line ranges; scene descriptors reference tags symbolically
//! and are resolved against the map at load time. Unpaired or duplicate
//! markers are configuration errors surfaced at construction, never during
//! navigation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Marker prefix recognized in the listing.
const TAG_PREFIX: &str = "# scene-id:";

/// The fixed Python program being visualized.
pub const PYTHON_SOURCE: &str = r##"# scene-id: define_device_class_start
class Device:
    # --- class variables ---
    status = "Offline"  # shared by every instance
    device_count = 0    # tracks how many instances exist
    shared_log = []     # mutable class variable
# scene-id: define_device_class_end

# scene-id: define_device_init_start
    def __init__(self, device_id, location):
        # --- instance variable setup ---
        # 'self' is the instance being created
        self.device_id = device_id
        self.location = location
        Device.device_count += 1  # mutate the class variable
        self.__class__.shared_log.append(f"{self.device_id}: Initialized")
# scene-id: define_device_init_end

# scene-id: define_device_classmethods_start
    @classmethod
    def get_device_count(cls):
        # 'cls' is the class itself (Device)
        return cls.device_count

    @classmethod
    def change_global_status(cls, new_status):
        cls.status = new_status  # mutate the class variable
# scene-id: define_device_classmethods_end

# scene-id: define_device_instancemethods_start
    def get_info(self):
        # 'self' is the instance the method was called on
        return f"ID: {self.device_id}, Loc: {self.location}, Status: {self.status}"

    def log_activity(self, activity):
        # self.__class__ reaches the class-owned shared_log
        self.__class__.shared_log.append(f"{self.device_id}: {activity}")
# scene-id: define_device_instancemethods_end


# scene-id: define_smartdevice_class_start
class SmartDevice(Device):  # inherits from Device
    # --- subclass class variable ---
    software_version = "1.0"
# scene-id: define_smartdevice_class_end

# scene-id: define_smartdevice_methods_start
    def __init__(self, device_id, location, ip_address):
        super().__init__(device_id, location)  # run the parent initializer
        self.ip_address = ip_address

    def get_info(self):  # method override
        base_info = super().get_info()
        return f"{base_info}, IP: {self.ip_address}, SW: {self.software_version}"

    @classmethod
    def upgrade_software_all_smart_devices(cls, new_version):
        cls.software_version = new_version
# scene-id: define_smartdevice_methods_end


# scene-id: create_d1_start
# 1. create the first Device instance
d1 = Device("Sensor01", "Lab A")
# scene-id: create_d1_end

# scene-id: create_d2_start
# 2. create the second Device instance
d2 = Device("Actuator02", "Lab B")
# scene-id: create_d2_end

# scene-id: instance_variable_independence_start
# 3. instance variables are independent
d1.location = "Rooftop"  # only d1 changes
# scene-id: instance_variable_independence_end

# scene-id: instance_variable_shadowing_start
# 4. an instance shadows a class variable
d1.status = "Online"  # d1 gains its own 'status'
# scene-id: instance_variable_shadowing_end

# scene-id: change_global_status_start
# 5. change the class variable through a classmethod
Device.change_global_status("Maintenance")
# scene-id: change_global_status_end

# scene-id: mutable_class_variable_sharing_start
# 6. mutate the shared class variable
d1.log_activity("System Boot")
d2.log_activity("Valve Open")
# scene-id: mutable_class_variable_sharing_end

# scene-id: create_sd1_start
# 7. create a SmartDevice instance
sd1 = SmartDevice("Cam03", "Entrance", "192.168.1.100")
# scene-id: create_sd1_end

# scene-id: smartdevice_software_version_start
# 8. the subclass changes its own class variable
SmartDevice.software_version = "1.1"
# scene-id: smartdevice_software_version_end

# scene-id: smartdevice_status_shadowing_start
# 9. the subclass shadows an inherited class variable
SmartDevice.status = "Active"
# scene-id: smartdevice_status_shadowing_end


# scene-id: print_info_start
# recap of every object's current state
# print(f"d1 info: {d1.get_info()}")
# print(f"d2 info: {d2.get_info()}")
# print(f"sd1 info: {sd1.get_info()}")
# print(f"Total devices: {Device.get_device_count()}")
# print(f"Device class status: {Device.status}")
# print(f"SmartDevice class status: {SmartDevice.status}")
# print(f"Shared Log: {Device.shared_log}")
# scene-id: print_info_end
"##;

/// An inclusive 1-based span of source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    /// First highlighted line.
    pub start: usize,
    /// Last highlighted line.
    pub end: usize,
}

impl LineRange {
    /// Number of lines in the span.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// A span is never empty once constructed; kept for API symmetry.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the 1-based line falls inside the span.
    #[must_use]
    pub const fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

/// The listing with marker lines stripped, for renderers that hide tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayListing {
    /// Visible lines, in order.
    pub lines: Vec<String>,
    /// For each visible line, the 1-based line number in the original text.
    pub origin_lines: Vec<usize>,
}

impl DisplayListing {
    /// Maps an original 1-based line number to its 0-based display index,
    /// or `None` for marker lines.
    #[must_use]
    pub fn display_index_of(&self, original_line: usize) -> Option<usize> {
        self.origin_lines.iter().position(|&l| l == original_line)
    }
}

/// Tag-to-span lookup table over a source listing.
///
/// Built once at load time; resolution afterwards is a map lookup.
#[derive(Debug, Clone)]
pub struct SourceMap {
    text: String,
    line_count: usize,
    spans: HashMap<String, LineRange>,
}

impl SourceMap {
    /// Scans the text and pairs `_start`/`_end` markers into line ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a marker appears twice, lacks its
    /// partner, or encloses no lines.
    pub fn build(text: &str) -> Result<Self, ConfigError> {
        let mut markers: HashMap<String, usize> = HashMap::new();
        let mut line_count = 0usize;

        for (idx, line) in text.lines().enumerate() {
            line_count = idx + 1;
            let Some(rest) = line.trim().strip_prefix(TAG_PREFIX) else {
                continue;
            };
            let marker = rest.trim().to_string();
            if markers.insert(marker.clone(), idx + 1).is_some() {
                return Err(ConfigError::DuplicateTag { tag: marker });
            }
        }

        let mut spans = HashMap::new();
        for (marker, &line) in &markers {
            if let Some(base) = marker.strip_suffix("_start") {
                let end_marker = format!("{base}_end");
                let Some(&end_line) = markers.get(&end_marker) else {
                    return Err(ConfigError::UnpairedTag {
                        tag: marker.clone(),
                        expected: "_end",
                    });
                };
                if end_line <= line + 1 {
                    return Err(ConfigError::EmptySpan {
                        tag: base.to_string(),
                    });
                }
                spans.insert(
                    base.to_string(),
                    LineRange {
                        start: line + 1,
                        end: end_line - 1,
                    },
                );
            } else if let Some(base) = marker.strip_suffix("_end") {
                if !markers.contains_key(&format!("{base}_start")) {
                    return Err(ConfigError::UnpairedTag {
                        tag: marker.clone(),
                        expected: "_start",
                    });
                }
            }
        }

        Ok(Self {
            text: text.to_string(),
            line_count,
            spans,
        })
    }

    /// Builds the map over the embedded [`PYTHON_SOURCE`].
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from [`SourceMap::build`]; with the
    /// embedded listing this only fails if the listing itself is broken.
    pub fn for_embedded_source() -> Result<Self, ConfigError> {
        Self::build(PYTHON_SOURCE)
    }

    /// Resolves a scene tag to its line range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedTag`] for unknown tags.
    pub fn resolve(&self, tag: &str) -> Result<LineRange, ConfigError> {
        self.spans
            .get(tag)
            .copied()
            .ok_or_else(|| ConfigError::UnresolvedTag {
                tag: tag.to_string(),
            })
    }

    /// The full source text the map was built over.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total number of lines in the listing.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    /// Number of resolved tag spans.
    #[must_use]
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// The listing with `# scene-id:` marker lines stripped.
    #[must_use]
    pub fn display_listing(&self) -> DisplayListing {
        let mut lines = Vec::new();
        let mut origin_lines = Vec::new();
        for (idx, line) in self.text.lines().enumerate() {
            if line.trim().starts_with(TAG_PREFIX) {
                continue;
            }
            lines.push(line.to_string());
            origin_lines.push(idx + 1);
        }
        DisplayListing {
            lines,
            origin_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_source_resolves_all_tags() {
        let map = SourceMap::for_embedded_source().unwrap();
        for tag in [
            "define_device_class",
            "define_device_init",
            "define_device_classmethods",
            "define_device_instancemethods",
            "define_smartdevice_class",
            "define_smartdevice_methods",
            "create_d1",
            "create_d2",
            "instance_variable_independence",
            "instance_variable_shadowing",
            "change_global_status",
            "mutable_class_variable_sharing",
            "create_sd1",
            "smartdevice_software_version",
            "smartdevice_status_shadowing",
            "print_info",
        ] {
            let span = map.resolve(tag).unwrap();
            assert!(span.start <= span.end, "empty span for {tag}");
        }
        assert_eq!(map.span_count(), 16);
    }

    #[test]
    fn test_resolved_span_excludes_marker_lines() {
        let text = "\
# scene-id: block_start
a = 1
b = 2
# scene-id: block_end
";
        let map = SourceMap::build(text).unwrap();
        let span = map.resolve("block").unwrap();
        assert_eq!(span, LineRange { start: 2, end: 3 });
        assert_eq!(span.len(), 2);
        assert!(span.contains(2));
        assert!(!span.contains(4));
    }

    #[test]
    fn test_unknown_tag_is_unresolved() {
        let map = SourceMap::for_embedded_source().unwrap();
        let err = map.resolve("no_such_scene").unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedTag { .. }));
    }

    #[test]
    fn test_start_without_end_is_rejected() {
        let text = "# scene-id: orphan_start\nx = 1\n";
        let err = SourceMap::build(text).unwrap_err();
        let ConfigError::UnpairedTag { tag, expected } = err else {
            panic!("expected UnpairedTag, got {err:?}");
        };
        assert_eq!(tag, "orphan_start");
        assert_eq!(expected, "_end");
    }

    #[test]
    fn test_end_without_start_is_rejected() {
        let text = "x = 1\n# scene-id: orphan_end\n";
        let err = SourceMap::build(text).unwrap_err();
        assert!(matches!(err, ConfigError::UnpairedTag { expected: "_start", .. }));
    }

    #[test]
    fn test_duplicate_marker_is_rejected() {
        let text = "\
# scene-id: block_start
x = 1
# scene-id: block_start
# scene-id: block_end
";
        let err = SourceMap::build(text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTag { .. }));
    }

    #[test]
    fn test_adjacent_markers_are_an_empty_span() {
        let text = "# scene-id: block_start\n# scene-id: block_end\n";
        let err = SourceMap::build(text).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySpan { .. }));
    }

    #[test]
    fn test_display_listing_strips_markers() {
        let map = SourceMap::for_embedded_source().unwrap();
        let listing = map.display_listing();
        assert!(listing.lines.iter().all(|l| !l.contains("scene-id")));
        assert_eq!(listing.lines.len(), listing.origin_lines.len());
        assert!(listing.lines.len() < map.line_count());

        // Marker lines have no display index; code lines do.
        assert!(listing.display_index_of(1).is_none());
        let span = map.resolve("define_device_class").unwrap();
        assert!(listing.display_index_of(span.start).is_some());
    }
}

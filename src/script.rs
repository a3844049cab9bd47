//! The fixed scene script.
//!
//! Sixteen scenes walking through class variables, instance variables,
//! inheritance, shadowing and mutable shared state in the embedded Python
//! program. The script is the authoritative "program" being visualized:
//! each scene bundles its source tag, explanation, output renderer and
//! state transition, and [`SceneScript::load`] validates the whole table
//! against the source map before anything else runs.

use std::sync::OnceLock;

use crate::error::{ConfigError, DerivationError};
use crate::scene::{Explanation, HoverLink, RenderFn, SceneDescriptor, Segment, TransitionFn};
use crate::source::SourceMap;
use crate::state::{ClassRecord, InstanceName, InstanceRecord, ProgramState, SubclassRecord};

static SCRIPT: OnceLock<SceneScript> = OnceLock::new();

/// The ordered, immutable scene table plus the source map it was resolved
/// against.
#[derive(Debug, Clone)]
pub struct SceneScript {
    scenes: Vec<SceneDescriptor>,
    source: SourceMap,
}

impl SceneScript {
    /// Builds the built-in script over the embedded source listing.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any scene tag fails to resolve or an
    /// explanation links a nonexistent source line. The script refuses to
    /// exist partially built.
    pub fn load() -> Result<Self, ConfigError> {
        let source = SourceMap::for_embedded_source()?;
        Self::assemble(source, builtin_scenes())
    }

    fn assemble(source: SourceMap, specs: Vec<SceneSpec>) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyScript);
        }

        let mut scenes = Vec::with_capacity(specs.len());
        for spec in specs {
            let span = source.resolve(spec.tag)?;
            for segment in &spec.explanation.segments {
                if let Segment::Hover {
                    link: HoverLink::Line(line),
                    ..
                } = segment
                {
                    if *line == 0 || *line > source.line_count() {
                        return Err(ConfigError::HoverLineOutOfRange {
                            line: *line,
                            line_count: source.line_count(),
                        });
                    }
                }
            }
            scenes.push(SceneDescriptor {
                title: spec.title,
                tag: spec.tag,
                span,
                highlighted_names: spec.highlighted_names,
                explanation: spec.explanation,
                render_output: spec.render_output,
                transition: spec.transition,
            });
        }

        Ok(Self { scenes, source })
    }

    /// The process-wide script instance.
    ///
    /// # Panics
    ///
    /// Panics if the embedded script fails validation, which would mean the
    /// compiled-in scene data itself is broken.
    #[must_use]
    pub fn shared() -> &'static Self {
        SCRIPT.get_or_init(|| Self::load().expect("embedded scene script is valid"))
    }

    /// Number of scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when the script has no scenes; never the case once loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Index of the final scene.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.scenes.len() - 1
    }

    /// Looks up one scene descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SceneIndexOutOfRange`] for indices outside
    /// `[0, len)`.
    pub fn scene(&self, index: usize) -> Result<&SceneDescriptor, ConfigError> {
        self.scenes
            .get(index)
            .ok_or(ConfigError::SceneIndexOutOfRange {
                index,
                scene_count: self.scenes.len(),
            })
    }

    /// All scenes, in order.
    #[must_use]
    pub fn scenes(&self) -> &[SceneDescriptor] {
        &self.scenes
    }

    /// The source map the script was resolved against.
    #[must_use]
    pub fn source(&self) -> &SourceMap {
        &self.source
    }
}

struct SceneSpec {
    title: &'static str,
    tag: &'static str,
    highlighted_names: &'static [&'static str],
    explanation: Explanation,
    render_output: RenderFn,
    transition: TransitionFn,
}

// ---------------------------------------------------------------------------
// Transitions
//
// Each transition derives the next state from its argument alone. The engine
// hands over a fresh deep copy, so in-place mutation here never aliases a
// cached snapshot.
// ---------------------------------------------------------------------------

fn no_change(state: ProgramState) -> Result<ProgramState, DerivationError> {
    Ok(state)
}

fn establish_device_class(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.device = ClassRecord::initial();
    Ok(state)
}

fn establish_smartdevice_class(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.smart_device = SubclassRecord::initial();
    Ok(state)
}

fn create_d1(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.device.instance_count += 1;
    state
        .device
        .shared_log
        .push("Sensor01: Initialized".to_string());
    state.d1 = Some(InstanceRecord::base("Sensor01", "Lab A"));
    Ok(state)
}

fn create_d2(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.device.instance_count += 1;
    state
        .device
        .shared_log
        .push("Actuator02: Initialized".to_string());
    state.d2 = Some(InstanceRecord::base("Actuator02", "Lab B"));
    Ok(state)
}

fn relocate_d1(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    let Some(d1) = state.instance_mut(InstanceName::D1) else {
        return Err(DerivationError::MissingInstance {
            scene: "Instance variables are independent",
            instance: "d1",
        });
    };
    d1.location = "Rooftop".to_string();
    Ok(state)
}

fn shadow_d1_status(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    let Some(d1) = state.instance_mut(InstanceName::D1) else {
        return Err(DerivationError::MissingInstance {
            scene: "An instance shadows a class variable",
            instance: "d1",
        });
    };
    d1.status = Some("Online".to_string());
    Ok(state)
}

fn change_global_status(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.device.status = "Maintenance".to_string();
    Ok(state)
}

fn log_activities(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    for name in [InstanceName::D1, InstanceName::D2] {
        if state.instance(name).is_none() {
            return Err(DerivationError::MissingInstance {
                scene: "Mutating the shared log",
                instance: name.as_str(),
            });
        }
    }
    state
        .device
        .shared_log
        .push("Sensor01: System Boot".to_string());
    state
        .device
        .shared_log
        .push("Actuator02: Valve Open".to_string());
    Ok(state)
}

fn create_sd1(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.device.instance_count += 1;
    state
        .device
        .shared_log
        .push("Cam03: Initialized".to_string());
    state.sd1 = Some(InstanceRecord::derived("Cam03", "Entrance", "192.168.1.100"));
    Ok(state)
}

fn upgrade_software(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.smart_device.software_version = "1.1".to_string();
    Ok(state)
}

fn shadow_subclass_status(mut state: ProgramState) -> Result<ProgramState, DerivationError> {
    state.smart_device.status = Some("Active".to_string());
    Ok(state)
}

// ---------------------------------------------------------------------------
// Output renderers
//
// All attribute reads go through the resolution fallback chain, so what the
// output panel shows is the lookup order itself. Renderers are total:
// absent instances render as N/A instead of failing.
// ---------------------------------------------------------------------------

fn quoted(value: &str) -> String {
    format!("{value:?}")
}

fn status_text(state: &ProgramState, name: InstanceName) -> String {
    state
        .resolved_status_of(name)
        .map_or_else(|| "N/A".to_string(), quoted)
}

fn location_text(state: &ProgramState, name: InstanceName) -> String {
    state
        .instance(name)
        .map_or_else(|| "N/A".to_string(), |i| quoted(&i.location))
}

fn id_text(state: &ProgramState, name: InstanceName) -> String {
    state
        .instance(name)
        .map_or_else(|| "N/A".to_string(), |i| quoted(&i.id))
}

fn subclass_status_text(state: &ProgramState) -> String {
    state
        .smart_device
        .status
        .as_deref()
        .map_or_else(|| "N/A (inherited from Device)".to_string(), quoted)
}

fn shared_log_text(state: &ProgramState) -> String {
    let entries: Vec<String> = state
        .device
        .shared_log
        .iter()
        .map(|e| quoted(e))
        .collect();
    format!("[{}]", entries.join(", "))
}

fn render_nothing(_state: &ProgramState) -> String {
    String::new()
}

fn render_location_independence(state: &ProgramState) -> String {
    format!(
        "d1.location is now {}\nd2.location is still {}",
        location_text(state, InstanceName::D1),
        location_text(state, InstanceName::D2),
    )
}

fn render_instance_shadowing(state: &ProgramState) -> String {
    format!(
        "d1.status (instance variable): {}\nDevice.status (class variable): {}\nd2.status (resolved via the class): {}",
        status_text(state, InstanceName::D1),
        quoted(&state.device.status),
        status_text(state, InstanceName::D2),
    )
}

fn render_global_status(state: &ProgramState) -> String {
    format!(
        "d1.status: {}\nd2.status: {}\nDevice.status: {}",
        status_text(state, InstanceName::D1),
        status_text(state, InstanceName::D2),
        quoted(&state.device.status),
    )
}

fn render_shared_log(state: &ProgramState) -> String {
    format!("Device.shared_log: {}", shared_log_text(state))
}

fn render_software_version(state: &ProgramState) -> String {
    format!(
        "SmartDevice.software_version: {}",
        quoted(&state.smart_device.software_version),
    )
}

fn render_subclass_shadowing(state: &ProgramState) -> String {
    format!(
        "sd1.status (resolved via SmartDevice.status): {}\nDevice.status: {}\nSmartDevice.status: {}\nd2.status (resolved via Device.status): {}",
        status_text(state, InstanceName::Sd1),
        quoted(&state.device.status),
        subclass_status_text(state),
        status_text(state, InstanceName::D2),
    )
}

fn render_recap(state: &ProgramState) -> String {
    let sd1_ip = state
        .sd1
        .as_ref()
        .and_then(|i| i.ip_address.as_deref())
        .map_or_else(|| "N/A".to_string(), quoted);

    format!(
        "d1 info: ID: {}, Loc: {}, Status: {}\n\
         d2 info: ID: {}, Loc: {}, Status: {}\n\
         sd1 info: ID: {}, Loc: {}, Status: {}, IP: {}, SW: {}\n\
         Total devices: {}\n\
         Device class status: {}\n\
         SmartDevice class status: {}\n\
         Shared Log: {}",
        id_text(state, InstanceName::D1),
        location_text(state, InstanceName::D1),
        status_text(state, InstanceName::D1),
        id_text(state, InstanceName::D2),
        location_text(state, InstanceName::D2),
        status_text(state, InstanceName::D2),
        id_text(state, InstanceName::Sd1),
        location_text(state, InstanceName::Sd1),
        status_text(state, InstanceName::Sd1),
        sd1_ip,
        quoted(&state.smart_device.software_version),
        state.device.instance_count,
        quoted(&state.device.status),
        subclass_status_text(state),
        shared_log_text(state),
    )
}

// ---------------------------------------------------------------------------
// Scene table
// ---------------------------------------------------------------------------

fn builtin_scenes() -> Vec<SceneSpec> {
    vec![
        SceneSpec {
            title: "Define the Device class",
            tag: "define_device_class",
            highlighted_names: &["status", "device_count", "shared_log"],
            explanation: Explanation::new()
                .text("Defines the ")
                .symbol("Device")
                .text(" class and its class variables ")
                .symbol("status")
                .text(", ")
                .symbol("device_count")
                .text(" and ")
                .symbol("shared_log")
                .text(". These variables belong to the class itself."),
            render_output: render_nothing,
            transition: establish_device_class,
        },
        SceneSpec {
            title: "Define the Device initializer",
            tag: "define_device_init",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Defines the constructor ")
                .symbol("__init__")
                .text(" of the Device class. It runs whenever an instance is created; ")
                .line("self", 13)
                .text(" refers to the instance under construction."),
            render_output: render_nothing,
            transition: no_change,
        },
        SceneSpec {
            title: "Define the class methods",
            tag: "define_device_classmethods",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Defines the class methods ")
                .symbol("get_device_count")
                .text(" and ")
                .symbol("change_global_status")
                .text(". The @classmethod decorator makes their first parameter ")
                .symbol("cls")
                .text(" refer to the class itself."),
            render_output: render_nothing,
            transition: no_change,
        },
        SceneSpec {
            title: "Define the instance methods",
            tag: "define_device_instancemethods",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Defines the instance methods ")
                .symbol("get_info")
                .text(" and ")
                .symbol("log_activity")
                .text(", which reach instance and class data through ")
                .symbol("self")
                .text("."),
            render_output: render_nothing,
            transition: no_change,
        },
        SceneSpec {
            title: "Define the SmartDevice subclass",
            tag: "define_smartdevice_class",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Defines the ")
                .symbol("SmartDevice")
                .text(" class, inheriting from ")
                .symbol("Device")
                .text(". It owns the class variable ")
                .symbol("software_version")
                .text(" and inherits every Device attribute and method."),
            render_output: render_nothing,
            transition: establish_smartdevice_class,
        },
        SceneSpec {
            title: "Define the SmartDevice methods",
            tag: "define_smartdevice_methods",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Defines SmartDevice's ")
                .symbol("__init__")
                .text(", its overriding ")
                .symbol("get_info")
                .text(", and the class method ")
                .symbol("upgrade_software_all_smart_devices")
                .text(". ")
                .symbol("super")
                .text("() calls into the parent class."),
            render_output: render_nothing,
            transition: no_change,
        },
        SceneSpec {
            title: "Create d1",
            tag: "create_d1",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Creates the first Device instance ")
                .symbol("d1")
                .text(". The initializer runs with self bound to d1: the instance variables ")
                .symbol("device_id")
                .text(" and ")
                .symbol("location")
                .text(" are set, ")
                .symbol("device_count")
                .text(" rises to 1, and the activity is appended to the shared ")
                .symbol("shared_log")
                .text("."),
            render_output: render_nothing,
            transition: create_d1,
        },
        SceneSpec {
            title: "Create d2",
            tag: "create_d2",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Creates the second Device instance ")
                .symbol("d2")
                .text(": its own ")
                .symbol("device_id")
                .text(" and ")
                .symbol("location")
                .text(" are set, ")
                .symbol("device_count")
                .text(" rises to 2, and the shared log grows again."),
            render_output: render_nothing,
            transition: create_d2,
        },
        SceneSpec {
            title: "Instance variables are independent",
            tag: "instance_variable_independence",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Changes the instance variable ")
                .symbol("location")
                .text(" of d1 only. d2.location is untouched: each instance owns its instance variables."),
            render_output: render_location_independence,
            transition: relocate_d1,
        },
        SceneSpec {
            title: "An instance shadows a class variable",
            tag: "instance_variable_shadowing",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Assigns d1.status = \"Online\". d1 had no instance variable named ")
                .symbol("status")
                .text(", so Python creates one, shadowing the class variable Device.status. The class variable and d2's resolved status stay unchanged."),
            render_output: render_instance_shadowing,
            transition: shadow_d1_status,
        },
        SceneSpec {
            title: "Change the class variable globally",
            tag: "change_global_status",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Changes the class variable Device.status through the class method ")
                .symbol("change_global_status")
                .text(". Every instance that has not shadowed ")
                .symbol("status")
                .text(" (like d2) now resolves the new value; d1 keeps its own instance variable."),
            render_output: render_global_status,
            transition: change_global_status,
        },
        SceneSpec {
            title: "Mutating the shared log",
            tag: "mutable_class_variable_sharing",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("d1 and d2 call ")
                .symbol("log_activity")
                .text(", which appends to the mutable class variable ")
                .symbol("shared_log")
                .text(". All instances share a reference to the same list, so a mutation made through one instance is visible through every other."),
            render_output: render_shared_log,
            transition: log_activities,
        },
        SceneSpec {
            title: "Create sd1",
            tag: "create_sd1",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Creates the SmartDevice instance ")
                .symbol("sd1")
                .text(". SmartDevice.__init__ calls super().__init__, so sd1 gets ")
                .symbol("device_id")
                .text(" and ")
                .symbol("location")
                .text(" from the parent initializer plus its own ")
                .symbol("ip_address")
                .text("; ")
                .symbol("device_count")
                .text(" rises to 3 and the shared log records the activity."),
            render_output: render_nothing,
            transition: create_sd1,
        },
        SceneSpec {
            title: "Upgrade the subclass software version",
            tag: "smartdevice_software_version",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Changes the subclass class variable ")
                .symbol("software_version")
                .text(". Only SmartDevice and its instances are affected; the parent Device class is not."),
            render_output: render_software_version,
            transition: upgrade_software,
        },
        SceneSpec {
            title: "The subclass shadows status",
            tag: "smartdevice_status_shadowing",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Assigns SmartDevice.status = \"Active\". SmartDevice had no ")
                .symbol("status")
                .text(" of its own, so a new class variable is created on the subclass, shadowing the one inherited from Device. Device.status stays unchanged."),
            render_output: render_subclass_shadowing,
            transition: shadow_subclass_status,
        },
        SceneSpec {
            title: "Recap",
            tag: "print_info",
            highlighted_names: &[],
            explanation: Explanation::new()
                .text("Prints every object's information to review the final state."),
            render_output: render_recap,
            transition: no_change,
        },
    ]
}

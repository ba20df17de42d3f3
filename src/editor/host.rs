//! Named editor instances and the content handed over to them.
//!
//! An embedding application can host several independent drawings, each
//! identified by name. The editor session publishes rendered SVG into
//! the instance it was opened for; the application reads it back after
//! a transfer.

use log::debug;

use crate::types::Structure;

/// One named drawing slot.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    pub name: String,
    /// Last transferred SVG document, or empty.
    pub content: String,
    /// Last transferred structure, for editing the drawing again later.
    pub structure: Option<Structure>,
}

/// Registry of editor instances, with one of them active at a time.
#[derive(Debug, Default)]
pub struct InstanceHost {
    instances: Vec<Instance>,
    current: Option<usize>,
}

impl InstanceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the named instance, creating it on first use, and makes it
    /// the active one.
    pub fn run_editor(&mut self, name: &str) {
        let index = match self.instances.iter().position(|i| i.name == name) {
            Some(index) => index,
            None => {
                debug!("creating editor instance '{}'", name);
                self.instances.push(Instance {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.instances.len() - 1
            }
        };
        self.current = Some(index);
    }

    /// The active instance, if an editor was opened.
    pub fn current_instance(&self) -> Option<&Instance> {
        self.current.map(|i| &self.instances[i])
    }

    /// Index of the named instance, or of the active one when `name` is
    /// empty.
    fn instance_index(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            self.current
        } else {
            self.instances.iter().position(|i| i.name == name)
        }
    }

    /// Content of the named instance, or of the active one when `name`
    /// is empty. Unknown names read as empty content.
    pub fn get_content(&self, name: &str) -> &str {
        self.instance_index(name)
            .map(|i| self.instances[i].content.as_str())
            .unwrap_or("")
    }

    /// Stores rendered content into the named instance, or into the
    /// active one when `name` is empty.
    pub fn set_content(&mut self, content: String, name: &str) {
        if let Some(i) = self.instance_index(name) {
            self.instances[i].content = content;
        }
    }

    /// Stores the transferred structure into the active instance.
    pub fn set_structure(&mut self, structure: Option<Structure>) {
        if let Some(i) = self.current {
            self.instances[i].structure = structure;
        }
    }

    /// Structure of the named instance, for reopening a transferred
    /// drawing.
    pub fn get_structure(&self, name: &str) -> Option<&Structure> {
        self.instances
            .iter()
            .find(|i| i.name == name)
            .and_then(|i| i.structure.as_ref())
    }

    /// Clears the named instance's content, or the active one's when
    /// `name` is empty.
    pub fn clear_content(&mut self, name: &str) {
        if let Some(i) = self.instance_index(name) {
            self.instances[i].content.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_editor_creates_and_reuses_instances() {
        let mut host = InstanceHost::new();
        host.run_editor("mol1");
        host.set_content("<svg>1</svg>".into(), "");
        host.run_editor("mol2");
        host.set_content("<svg>2</svg>".into(), "");
        // Reopening must find the existing instance, not a fresh one.
        host.run_editor("mol1");
        assert_eq!(host.get_content(""), "<svg>1</svg>");
        assert_eq!(host.get_content("mol2"), "<svg>2</svg>");
    }

    #[test]
    fn test_named_writes_reach_inactive_instances() {
        let mut host = InstanceHost::new();
        host.run_editor("mol1");
        host.run_editor("mol2");
        host.set_content("<svg>1</svg>".into(), "mol1");
        assert_eq!(host.get_content("mol1"), "<svg>1</svg>");
        assert_eq!(host.get_content(""), "");
        host.clear_content("mol1");
        assert_eq!(host.get_content("mol1"), "");
    }

    #[test]
    fn test_unknown_instance_reads_empty() {
        let host = InstanceHost::new();
        assert_eq!(host.get_content("nope"), "");
        assert!(host.get_structure("nope").is_none());
    }

    #[test]
    fn test_clear_content() {
        let mut host = InstanceHost::new();
        host.run_editor("mol1");
        host.set_content("<svg></svg>".into(), "");
        host.clear_content("");
        assert_eq!(host.get_content("mol1"), "");
    }

    #[test]
    fn test_structure_round_trip() {
        let mut host = InstanceHost::new();
        host.run_editor("mol1");
        host.set_structure(Some(Structure::new("benzene")));
        assert_eq!(host.get_structure("mol1").unwrap().name, "benzene");
    }
}

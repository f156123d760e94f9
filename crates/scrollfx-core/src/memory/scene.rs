//! TOML scene descriptions
//!
//! ```toml
//! window_height = 800
//!
//! [[elements]]
//! name = "hero"
//! top = 0
//! height = 900
//! classes = ["js-animate"]
//! data = { speed = "-4", position = "top" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, ElementId};
use crate::{Error, Result};

use super::document::{InMemoryDocument, NodeSpec};
use super::engine::InMemoryEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_window_height")]
    pub window_height: f64,
    /// Derived from the elements when absent
    #[serde(default)]
    pub content_height: Option<f64>,
    #[serde(default)]
    pub elements: Vec<SceneElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneElement {
    #[serde(default)]
    pub name: Option<String>,
    pub top: f64,
    pub height: f64,
    #[serde(default)]
    pub outer_height: Option<f64>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<SceneElement>,
}

fn default_window_height() -> f64 {
    800.0
}

/// Document and engine built from a scene, sharing one scroll position
#[derive(Debug)]
pub struct BuiltScene {
    pub document: InMemoryDocument,
    pub engine: InMemoryEngine,
}

impl Scene {
    pub fn from_toml(content: &str) -> Result<Self> {
        let scene: Self = toml::from_str(content).map_err(|e| Error::Scene(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if !(self.window_height.is_finite() && self.window_height > 0.0) {
            return Err(Error::Scene("window_height must be positive".to_string()));
        }
        let mut stack: Vec<&SceneElement> = self.elements.iter().collect();
        while let Some(element) = stack.pop() {
            if element.height < 0.0 || !element.top.is_finite() {
                return Err(Error::Scene(format!(
                    "element {} has invalid geometry",
                    element.name.as_deref().unwrap_or("(unnamed)")
                )));
            }
            stack.extend(element.children.iter());
        }
        Ok(())
    }

    pub fn build(&self) -> BuiltScene {
        let mut engine = InMemoryEngine::new(0.0);
        let mut document = InMemoryDocument::with_scroll(self.window_height, engine.scroll_handle());
        for element in &self.elements {
            insert(&mut document, None, element);
        }
        if let Some(content_height) = self.content_height {
            document.set_content_height(content_height);
        }

        engine.set_limit(document.content_height() - self.window_height);

        BuiltScene { document, engine }
    }
}

fn insert(doc: &mut InMemoryDocument, parent: Option<ElementId>, element: &SceneElement) {
    let spec = NodeSpec {
        name: element.name.clone(),
        classes: element.classes.clone(),
        data: element.data.clone(),
        attrs: element.attrs.clone(),
        top: element.top,
        height: element.height,
        outer_height: element.outer_height,
    };
    let id = doc.insert(parent, spec);
    for child in &element.children {
        insert(doc, Some(id), child);
    }
}

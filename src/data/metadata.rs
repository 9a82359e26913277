//! Static description of the loaded model shown in the info panel.

use serde::{Deserialize, Serialize};

/// Read-only record supplied at startup. The viewer never mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    pub name: String,
    pub format: String,
    pub texture: String,
    pub description: String,
    /// Optional extras; rows are only shown when set.
    pub vertices: Option<String>,
    pub polygons: Option<String>,
    pub author: Option<String>,
    #[serde(alias = "creationDate")]
    pub creation_date: Option<String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "Sample Model".to_string(),
            format: "OBJ".to_string(),
            texture: "JPG".to_string(),
            description: "A sample 3D model with applied textures.".to_string(),
            vertices: None,
            polygons: None,
            author: None,
            creation_date: None,
        }
    }
}

impl ModelMetadata {
    /// `(label, value)` rows in display order, skipping unset extras.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        let mut rows = vec![
            ("Name", self.name.as_str()),
            ("Format", self.format.as_str()),
            ("Texture", self.texture.as_str()),
            ("Description", self.description.as_str()),
        ];
        let extras = [
            ("Vertices", &self.vertices),
            ("Polygons", &self.polygons),
            ("Author", &self.author),
            ("Created", &self.creation_date),
        ];
        for (label, value) in extras {
            if let Some(v) = value {
                rows.push((label, v.as_str()));
            }
        }
        rows
    }
}

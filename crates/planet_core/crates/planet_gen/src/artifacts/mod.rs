//! Artifact rendering: one planet in, one correlated bundle of JSON documents out.

pub mod layout;
pub mod planet_doc;
pub mod world_docs;

use planet_objects::{ArtifactLinkage, PlanetEntity, PlanetId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderScope {
    /// Planet descriptor only.
    PlanetOnly,
    /// Descriptor plus dimension, noise settings and biome documents.
    #[default]
    FullWorld,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDocument {
    pub key: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub id: PlanetId,
    pub scope: RenderScope,
    pub documents: Vec<ArtifactDocument>,
}

impl ArtifactBundle {
    pub fn keys(&self) -> Vec<String> {
        self.documents.iter().map(|doc| doc.key.clone()).collect()
    }

    /// Linkage recorded on the entity once the bundle is committed.
    pub fn linkage(&self) -> ArtifactLinkage {
        ArtifactLinkage {
            descriptor_path: Some(PathBuf::from(layout::planet_descriptor(&self.id))),
            descriptor_written: true,
            world_files_written: self.scope == RenderScope::FullWorld,
        }
    }
}

fn document<T: Serialize>(key: String, value: &T) -> Result<ArtifactDocument, serde_json::Error> {
    Ok(ArtifactDocument {
        key,
        bytes: serde_json::to_vec_pretty(value)?,
    })
}

pub fn render_bundle(
    entity: &PlanetEntity,
    scope: RenderScope,
) -> Result<ArtifactBundle, serde_json::Error> {
    let id = entity.id();
    let mut documents = vec![document(
        layout::planet_descriptor(id),
        &planet_doc::render(entity),
    )?];

    if scope == RenderScope::FullWorld {
        documents.push(document(
            layout::dimension_type(id),
            &world_docs::dimension_type(entity),
        )?);
        documents.push(document(layout::dimension(id), &world_docs::dimension(entity))?);
        documents.push(document(
            layout::noise_settings(id),
            &world_docs::noise_settings(entity),
        )?);
        documents.push(document(layout::biome(id), &world_docs::biome(entity))?);
    }

    Ok(ArtifactBundle {
        id: id.clone(),
        scope,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_objects::{CelestialTemplate, EffectsTemplate, PlanetDescriptor};

    #[test]
    fn test_scope_controls_documents() {
        let entity = PlanetEntity::new(
            PlanetDescriptor::from_defaults(
                PlanetId::from_sequence(60),
                "Theta-3333h".into(),
                EffectsTemplate::GasGiant,
                CelestialTemplate::BinaryStar,
                900,
            ),
            0,
        );
        let only = render_bundle(&entity, RenderScope::PlanetOnly).unwrap();
        assert_eq!(only.keys(), vec!["planets/group_03/planet_060.json"]);
        assert!(!only.linkage().world_files_written);

        let full = render_bundle(&entity, RenderScope::FullWorld).unwrap();
        assert_eq!(full.documents.len(), 5);
        assert!(full.linkage().world_files_written);
        let planet: planet_doc::PlanetDocument =
            serde_json::from_slice(&full.documents[0].bytes).unwrap();
        assert_eq!(planet.display_name, "Theta-3333h");
    }
}

//! Merging externally selected artworks into a snapshot

use diorama_core::{DioramaError, ObjectId, Result};
use diorama_snapshot::{ImageBindingRecord, Snapshot};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One entry of a selection list: `{ id, title, description, imageUrl }`
#[derive(Debug, Clone, Deserialize)]
struct Selection {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "imageUrl")]
    image_url: String,
}

/// Display metadata for a merged artwork
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkMeta {
    pub object_id: ObjectId,
    /// Id of the item in the source collection
    pub source_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
}

/// Resolver mapping a selection index to the frame at that position
pub fn ordered_resolver(frames: &[ObjectId]) -> impl Fn(usize) -> Option<ObjectId> + '_ {
    move |index| frames.get(index).cloned()
}

/// Merge a JSON array of selections into `snapshot.artworks`.
///
/// Item `i` binds to the object `resolver(i)` returns. An object already in
/// `artworks` has its url replaced, anything else is appended. Items with no
/// image url, no resolved object, or an unreadable shape are skipped. With
/// `clear_existing` the previous artworks are dropped first.
pub fn merge_selected_artworks<F>(
    snapshot: &mut Snapshot,
    selections_json: &str,
    resolver: F,
    clear_existing: bool,
) -> Result<Vec<ArtworkMeta>>
where
    F: Fn(usize) -> Option<ObjectId>,
{
    let items: Vec<Value> = serde_json::from_str(selections_json)
        .map_err(|e| DioramaError::ParseError(format!("artwork selection: {}", e)))?;

    if clear_existing {
        snapshot.artworks.clear();
    }

    let mut by_object: HashMap<ObjectId, usize> = HashMap::new();
    for (i, record) in snapshot.artworks.iter().enumerate() {
        by_object.entry(record.object_id.clone()).or_insert(i);
    }

    let mut merged = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let Ok(selection) = serde_json::from_value::<Selection>(item) else {
            tracing::debug!("Skipping unreadable artwork selection #{}", index);
            continue;
        };
        if selection.image_url.trim().is_empty() {
            continue;
        }
        let Some(object_id) = resolver(index).filter(|id| !id.is_blank()) else {
            tracing::debug!("No frame for artwork selection #{}", index);
            continue;
        };

        match by_object.get(&object_id) {
            Some(&slot) => snapshot.artworks[slot].image_url = selection.image_url.clone(),
            None => {
                by_object.insert(object_id.clone(), snapshot.artworks.len());
                snapshot.artworks.push(ImageBindingRecord::new(
                    object_id.clone(),
                    selection.image_url.clone(),
                ));
            }
        }

        merged.push(ArtworkMeta {
            object_id,
            source_id: selection.id,
            title: selection.title,
            description: selection.description,
            image_url: selection.image_url,
        });
    }

    tracing::info!("Merged {} selected artworks", merged.len());
    Ok(merged)
}

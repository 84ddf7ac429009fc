//! Authoring-time id assignment

use diorama_core::ObjectId;

/// Whether a node lives in the scene or is a template other objects are cloned from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Live,
    Prototype,
}

/// Make sure a node carries a stable id.
///
/// Live nodes keep their id, or get a freshly minted one when they have
/// none (blank counts as none). Prototypes never keep an id: every instance
/// cloned from them would otherwise share it.
pub fn ensure_id(slot: &mut Option<ObjectId>, placement: Placement) -> Option<ObjectId> {
    match placement {
        Placement::Prototype => {
            if let Some(id) = slot.take() {
                tracing::debug!("Cleared id '{}' from prototype", id);
            }
            None
        }
        Placement::Live => match slot {
            Some(id) if !id.is_blank() => Some(id.clone()),
            _ => {
                let id = ObjectId::mint();
                tracing::debug!("Minted object id '{}'", id);
                *slot = Some(id.clone());
                Some(id)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_id_is_kept() {
        let mut slot = Some(ObjectId::from("wall_01"));
        let id = ensure_id(&mut slot, Placement::Live);
        assert_eq!(id, Some(ObjectId::from("wall_01")));
        assert_eq!(slot, Some(ObjectId::from("wall_01")));
    }

    #[test]
    fn test_missing_id_is_minted_once() {
        let mut slot = None;
        let first = ensure_id(&mut slot, Placement::Live).unwrap();
        let second = ensure_id(&mut slot, Placement::Live).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }

    #[test]
    fn test_blank_id_is_replaced() {
        let mut slot = Some(ObjectId::from("  "));
        let id = ensure_id(&mut slot, Placement::Live).unwrap();
        assert!(!id.is_blank());
    }

    #[test]
    fn test_prototype_id_is_cleared() {
        let mut slot = Some(ObjectId::from("proto_frame"));
        assert_eq!(ensure_id(&mut slot, Placement::Prototype), None);
        assert!(slot.is_none());
    }
}

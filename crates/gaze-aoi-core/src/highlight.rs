//! Highlight policy for the object under the gaze

use gaze_aoi_config::HighlightMode;
use tracing::debug;

use crate::resolver::{SpatialService, VehicleRegistry};
use crate::types::{ObjectId, ResolvedHit};

#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    mode: HighlightMode,
}

impl Highlighter {
    pub fn new(mode: HighlightMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> HighlightMode {
        self.mode
    }

    /// Objects to highlight for `hit` under the current mode
    pub fn targets(&self, hit: &ResolvedHit, registry: Option<&dyn VehicleRegistry>) -> Vec<ObjectId> {
        match self.mode {
            HighlightMode::None => Vec::new(),
            HighlightMode::All => vec![hit.object_id.clone()],
            HighlightMode::MatchingCategoryOnly => registry
                .and_then(|registry| vehicle_parts_containing(registry, &hit.object_id))
                .unwrap_or_default(),
        }
    }

    /// Clear previous highlights and mark the targets for `hit`.
    ///
    /// With [`HighlightMode::None`] the scene is left untouched.
    pub fn apply(&self, service: &mut dyn SpatialService, hit: Option<&ResolvedHit>) {
        if self.mode == HighlightMode::None {
            return;
        }

        let targets = hit
            .map(|hit| self.targets(hit, service.vehicle_registry()))
            .unwrap_or_default();

        service.clear_highlights();
        for target in &targets {
            service.highlight(target, self.mode);
        }
        if !targets.is_empty() {
            debug!("Highlighted {} object(s) ({})", targets.len(), self.mode);
        }
    }
}

fn vehicle_parts_containing(registry: &dyn VehicleRegistry, object_id: &str) -> Option<Vec<ObjectId>> {
    registry
        .registered_vehicle_ids()
        .into_iter()
        .map(|vehicle| registry.vehicle_subgeometries(&vehicle))
        .find(|parts| parts.iter().any(|part| part == object_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Point3D;
    use std::collections::{BTreeMap, BTreeSet};

    struct Fleet(BTreeMap<String, Vec<String>>);

    impl VehicleRegistry for Fleet {
        fn registered_vehicle_ids(&self) -> BTreeSet<String> {
            self.0.keys().cloned().collect()
        }

        fn vehicle_subgeometries(&self, vehicle_id: &str) -> Vec<ObjectId> {
            self.0.get(vehicle_id).cloned().unwrap_or_default()
        }
    }

    fn fleet() -> Fleet {
        let mut vehicles = BTreeMap::new();
        vehicles.insert(
            "car1".to_string(),
            vec!["car1/body".to_string(), "car1/wheel".to_string()],
        );
        vehicles.insert("car2".to_string(), vec!["car2/body".to_string()]);
        Fleet(vehicles)
    }

    fn hit(id: &str) -> ResolvedHit {
        ResolvedHit {
            object_id: id.to_string(),
            contact_point: Point3D::ORIGIN,
        }
    }

    #[test]
    fn test_none_highlights_nothing() {
        let highlighter = Highlighter::new(HighlightMode::None);
        assert!(highlighter.targets(&hit("car1/body"), Some(&fleet())).is_empty());
    }

    #[test]
    fn test_all_highlights_hit_only() {
        let highlighter = Highlighter::new(HighlightMode::All);
        assert_eq!(highlighter.targets(&hit("tree"), None), vec!["tree".to_string()]);
    }

    #[test]
    fn test_matching_category_highlights_whole_vehicle() {
        let highlighter = Highlighter::new(HighlightMode::MatchingCategoryOnly);
        let targets = highlighter.targets(&hit("car1/wheel"), Some(&fleet()));
        assert_eq!(targets, vec!["car1/body".to_string(), "car1/wheel".to_string()]);
    }

    #[test]
    fn test_matching_category_ignores_non_vehicles() {
        let highlighter = Highlighter::new(HighlightMode::MatchingCategoryOnly);
        assert!(highlighter.targets(&hit("road/sign"), Some(&fleet())).is_empty());
        assert!(highlighter.targets(&hit("car1/body"), None).is_empty());
    }
}

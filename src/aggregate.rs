use crate::models::{ImageTree, ServiceProvenance};

/// Folds provenance records into the final image tree. Records sharing a
/// (name, tag) pair are appended in discovery order; nothing is deduplicated.
pub fn aggregate(provenances: Vec<ServiceProvenance>) -> ImageTree {
    let mut tree = ImageTree::new();

    for provenance in provenances {
        tree.entry(provenance.image.name)
            .or_default()
            .entry(provenance.image.tag)
            .or_default()
            .push(provenance.record);
    }

    tree
}

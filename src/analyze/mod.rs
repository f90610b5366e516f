//! Structural analysis heuristics used by the importer's report.

mod relationships;
mod roles;
mod shapes;

pub use relationships::{
    infer_relationships_batch, RegionData, Relationship, RelationshipType,
};
pub use roles::{infer_roles_batch, Role, RoleInference};
pub use shapes::{bounding_box, detect_symmetry, solid_rect, Symmetry};

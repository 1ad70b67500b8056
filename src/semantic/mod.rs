pub mod model;
pub mod nodes;
pub mod workspace;

pub use model::{build_catalog, TypeCatalog, TypeInfo};
pub use nodes::{harvest, module_namespace, SyntaxNode};
pub use workspace::{Document, LoadProgress, Project, Workspace};

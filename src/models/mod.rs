pub mod project;

pub use project::{CreateProjectRequest, NewProject, Project, ProjectRow, ProjectValidationError};

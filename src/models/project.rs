use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// A portfolio project as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub domain: String,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub live_demo_url: Option<String>,
    pub github_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Database row for a project; `tech_stack` is stored as a JSON array
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub domain: String,
    pub description: Option<String>,
    pub tech_stack: String,
    pub live_demo_url: Option<String>,
    pub github_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<ProjectRow> for Project {
    type Error = serde_json::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            domain: row.domain,
            description: row.description,
            tech_stack: serde_json::from_str(&row.tech_stack)?,
            live_demo_url: row.live_demo_url,
            github_url: row.github_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub live_demo_url: Option<String>,
    pub github_url: Option<String>,
}

/// A validated project ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub domain: String,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub live_demo_url: Option<String>,
    pub github_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectValidationError {
    #[error("Title and domain are required.")]
    MissingTitleOrDomain,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateProjectRequest {
    pub fn validate(self) -> Result<NewProject, ProjectValidationError> {
        let (Some(title), Some(domain)) = (trimmed(self.title), trimmed(self.domain)) else {
            return Err(ProjectValidationError::MissingTitleOrDomain);
        };

        Ok(NewProject {
            title,
            domain,
            description: trimmed(self.description),
            tech_stack: self
                .tech_stack
                .into_iter()
                .filter_map(|t| trimmed(Some(t)))
                .collect(),
            live_demo_url: trimmed(self.live_demo_url),
            github_url: trimmed(self.github_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_drops_blank_fields() {
        let request = CreateProjectRequest {
            title: Some("  Folio  ".to_string()),
            domain: Some("web".to_string()),
            description: Some("   ".to_string()),
            tech_stack: vec!["Rust".to_string(), " ".to_string(), " axum ".to_string()],
            live_demo_url: None,
            github_url: Some(" https://github.com/me/folio ".to_string()),
        };

        let project = request.validate().unwrap();
        assert_eq!(project.title, "Folio");
        assert_eq!(project.description, None);
        assert_eq!(project.tech_stack, vec!["Rust", "axum"]);
        assert_eq!(
            project.github_url.as_deref(),
            Some("https://github.com/me/folio")
        );
    }

    #[test]
    fn validate_requires_title_and_domain() {
        let missing_domain = CreateProjectRequest {
            title: Some("Folio".to_string()),
            ..Default::default()
        };
        assert_eq!(
            missing_domain.validate(),
            Err(ProjectValidationError::MissingTitleOrDomain)
        );

        let blank_title = CreateProjectRequest {
            title: Some("  ".to_string()),
            domain: Some("web".to_string()),
            ..Default::default()
        };
        assert!(blank_title.validate().is_err());
    }

    #[test]
    fn row_decodes_tech_stack_json() {
        let row = ProjectRow {
            id: 1,
            title: "Folio".to_string(),
            domain: "web".to_string(),
            description: None,
            tech_stack: r#"["Rust","SQLite"]"#.to_string(),
            live_demo_url: None,
            github_url: None,
            created_at: 10,
            updated_at: 10,
        };

        let project = Project::try_from(row).unwrap();
        assert_eq!(project.tech_stack, vec!["Rust", "SQLite"]);
    }
}

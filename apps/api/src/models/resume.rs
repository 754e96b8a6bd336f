use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    pub location: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub major: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skills {
    pub programming: Vec<String>,
    pub frameworks: Vec<String>,
    pub tools: Vec<String>,
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub tech_stack: Vec<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    pub date: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomSection {
    pub id: String,
    pub title: String,
    pub items: Vec<CustomItem>,
}

/// The editable document body. Mutated continuously by the editor client;
/// snapshotted into `ResumeVersion`s on manual save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeData {
    pub personal: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Skills,
    pub projects: Vec<Project>,
    pub custom: Vec<CustomSection>,
    pub section_order: Vec<String>,
}

impl Default for ResumeData {
    fn default() -> Self {
        Self {
            personal: PersonalInfo::default(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Skills::default(),
            projects: Vec::new(),
            custom: Vec::new(),
            section_order: ["experience", "education", "skills", "projects"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    #[default]
    Modern,
    Executive,
    Creative,
    Tech,
    Academic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeVersion {
    pub id: Uuid,
    pub timestamp: i64,
    pub data: ResumeData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub name: String,
    /// Unix milliseconds, stamped on every save.
    pub last_modified: i64,
    pub template: TemplateType,
    pub ats_score: u32,
    pub data: ResumeData,
    pub versions: Vec<ResumeVersion>,
}

impl Resume {
    /// A fresh, empty resume with the default template and section order.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            last_modified: chrono::Utc::now().timestamp_millis(),
            template: TemplateType::default(),
            ats_score: 0,
            data: ResumeData::default(),
            versions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resume_has_default_section_order() {
        let resume = Resume::new("Backend roles");
        assert_eq!(
            resume.data.section_order,
            vec!["experience", "education", "skills", "projects"]
        );
        assert_eq!(resume.template, TemplateType::Modern);
        assert_eq!(resume.ats_score, 0);
        assert!(resume.versions.is_empty());
    }

    #[test]
    fn test_resume_data_roundtrips_through_json() {
        let mut data = ResumeData::default();
        data.experience.push(Experience {
            id: "1".to_string(),
            company: "Tech Corp".to_string(),
            position: "Engineer".to_string(),
            location: "Remote".to_string(),
            start_date: "2021-01".to_string(),
            end_date: String::new(),
            current: true,
            description: "Cloud services".to_string(),
            bullets: vec!["Reduced p99 latency by 60%".to_string()],
        });
        let json = serde_json::to_string(&data).unwrap();
        let back: ResumeData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.experience.len(), 1);
        assert!(back.experience[0].current);
    }

    #[test]
    fn test_template_type_wire_form() {
        assert_eq!(serde_json::to_string(&TemplateType::Executive).unwrap(), "\"executive\"");
    }
}

/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight kinds of record the console manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Profile,
    Skill,
    Project,
    Experience,
    Education,
    Certification,
    ContactInfo,
    Message,
}

impl ResourceType {
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Profile,
        ResourceType::Skill,
        ResourceType::Project,
        ResourceType::Experience,
        ResourceType::Education,
        ResourceType::Certification,
        ResourceType::ContactInfo,
        ResourceType::Message,
    ];

    /// Stable kebab-case name used on the command line and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Profile => "profile",
            ResourceType::Skill => "skill",
            ResourceType::Project => "project",
            ResourceType::Experience => "experience",
            ResourceType::Education => "education",
            ResourceType::Certification => "certification",
            ResourceType::ContactInfo => "contact-info",
            ResourceType::Message => "message",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the plural endpoint-style spellings too (skills, projects, ...)
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" | "profiles" => Ok(ResourceType::Profile),
            "skill" | "skills" => Ok(ResourceType::Skill),
            "project" | "projects" => Ok(ResourceType::Project),
            "experience" | "experiences" => Ok(ResourceType::Experience),
            "education" => Ok(ResourceType::Education),
            "certification" | "certifications" => Ok(ResourceType::Certification),
            "contact-info" | "contactinfo" | "contact_info" => Ok(ResourceType::ContactInfo),
            "message" | "messages" | "contacts" => Ok(ResourceType::Message),
            other => Err(format!("unknown resource type '{}'", other)),
        }
    }
}

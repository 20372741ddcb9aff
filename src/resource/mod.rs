//! Per-resource parameters of the generic editor.
//!
//! One static descriptor per resource type carries everything the eight admin
//! screens used to hard-code: endpoint, editable fields, attachments, whether
//! the resource is a single record, and how its payload is encoded.

pub mod field;

use serde_json::{Map, Value};

use crate::order::{parse_order, SortKey};
use crate::record::Record;
use crate::types::ResourceType;
pub use field::{FieldDefault, FieldKind, FieldSpec};

pub const SKILL_CATEGORIES: &[&str] = &["LANG", "WEB", "AI", "SOFT"];

/// How a create/update body goes over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Json,
    Multipart,
}

#[derive(Debug)]
pub struct ResourceDescriptor {
    pub resource: ResourceType,
    /// Path relative to the API base, with trailing slash
    pub endpoint: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    pub encoding: PayloadEncoding,
    /// Exactly one record is expected (profile, contact info)
    pub singleton: bool,
    pub creatable: bool,
    pub editable: bool,
    pub default_order: &'static str,
}

const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name"),
    FieldSpec::text("title"),
    FieldSpec::long_text("bio"),
    FieldSpec::file("profile_picture"),
    FieldSpec::file("resume"),
];

const SKILL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name"),
    FieldSpec::choice("category", SKILL_CATEGORIES, "LANG"),
    FieldSpec::number("percentage", 50),
];

const PROJECT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title"),
    FieldSpec::long_text("description"),
    FieldSpec::text("tech_stack"),
    FieldSpec::url("github_link"),
    FieldSpec::url("live_link"),
    FieldSpec::file("image"),
];

const EXPERIENCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("company_name"),
    FieldSpec::text("role"),
    FieldSpec::date("start_date"),
    FieldSpec::date("end_date"),
    FieldSpec::long_text("description"),
    FieldSpec::current_flag("is_current", "end_date"),
    FieldSpec::file("logo"),
];

const EDUCATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("institution"),
    FieldSpec::text("degree"),
    FieldSpec::text("field_of_study"),
    FieldSpec::date("start_date"),
    FieldSpec::date("end_date"),
    FieldSpec::text("grade"),
    FieldSpec::long_text("description"),
    FieldSpec::current_flag("is_current", "end_date"),
];

const CERTIFICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title"),
    FieldSpec::file("image"),
    FieldSpec::file("pdf_file"),
];

const CONTACT_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::long_text("address"),
    FieldSpec::email("email"),
    FieldSpec::text("phone"),
    FieldSpec::long_text("description"),
    FieldSpec::url("linkedin_link"),
    FieldSpec::url("github_link"),
    FieldSpec::url("twitter_link"),
    FieldSpec::url("leetcode_link"),
];

const MESSAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name"),
    FieldSpec::email("email"),
    FieldSpec::long_text("message"),
];

static PROFILE: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Profile,
    endpoint: "profiles/",
    label: "Profile",
    fields: PROFILE_FIELDS,
    encoding: PayloadEncoding::Multipart,
    singleton: true,
    creatable: true,
    editable: true,
    default_order: "",
};

static SKILL: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Skill,
    endpoint: "skills/",
    label: "Skills",
    fields: SKILL_FIELDS,
    encoding: PayloadEncoding::Multipart,
    singleton: false,
    creatable: true,
    editable: true,
    default_order: "",
};

static PROJECT: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Project,
    endpoint: "projects/",
    label: "Projects",
    fields: PROJECT_FIELDS,
    encoding: PayloadEncoding::Multipart,
    singleton: false,
    creatable: true,
    editable: true,
    default_order: "",
};

static EXPERIENCE: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Experience,
    endpoint: "experiences/",
    label: "Experience",
    fields: EXPERIENCE_FIELDS,
    encoding: PayloadEncoding::Multipart,
    singleton: false,
    creatable: true,
    editable: true,
    default_order: "start_date desc",
};

static EDUCATION: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Education,
    endpoint: "education/",
    label: "Education",
    fields: EDUCATION_FIELDS,
    encoding: PayloadEncoding::Json,
    singleton: false,
    creatable: true,
    editable: true,
    default_order: "start_date desc",
};

static CERTIFICATION: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Certification,
    endpoint: "certifications/",
    label: "Certifications",
    fields: CERTIFICATION_FIELDS,
    encoding: PayloadEncoding::Multipart,
    singleton: false,
    creatable: true,
    editable: true,
    default_order: "",
};

static CONTACT_INFO: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::ContactInfo,
    endpoint: "contactinfo/",
    label: "Contact Info",
    fields: CONTACT_INFO_FIELDS,
    encoding: PayloadEncoding::Json,
    singleton: true,
    creatable: true,
    editable: true,
    default_order: "",
};

static MESSAGE: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Message,
    endpoint: "contacts/",
    label: "Messages",
    fields: MESSAGE_FIELDS,
    encoding: PayloadEncoding::Json,
    singleton: false,
    creatable: false,
    editable: false,
    default_order: "id desc",
};

impl ResourceDescriptor {
    pub fn for_type(resource: ResourceType) -> &'static ResourceDescriptor {
        match resource {
            ResourceType::Profile => &PROFILE,
            ResourceType::Skill => &SKILL,
            ResourceType::Project => &PROJECT,
            ResourceType::Experience => &EXPERIENCE,
            ResourceType::Education => &EDUCATION,
            ResourceType::Certification => &CERTIFICATION,
            ResourceType::ContactInfo => &CONTACT_INFO,
            ResourceType::Message => &MESSAGE,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn file_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.is_file())
    }

    pub fn value_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| !f.is_file())
    }

    pub fn has_file_fields(&self) -> bool {
        self.fields.iter().any(FieldSpec::is_file)
    }

    /// Default sort; the descriptor table only holds well-formed strings
    pub fn default_order(&self) -> Vec<SortKey> {
        parse_order(self.default_order).unwrap_or_default()
    }

    /// Starting values for a create draft
    pub fn empty_values(&self) -> Map<String, Value> {
        self.value_fields()
            .map(|f| (f.name.to_string(), f.default.to_value()))
            .collect()
    }

    /// Draft values for editing `record`: every non-file field, nulls read as
    /// empty, draft-only flags derived from the data they summarize
    pub fn values_from(&self, record: &Record) -> Map<String, Value> {
        self.value_fields()
            .map(|f| {
                let value = match f.kind {
                    FieldKind::CurrentFlag { clears } => Value::Bool(record.is_blank(clears)),
                    _ => match record.get(f.name) {
                        None | Some(Value::Null) => f.default.to_value(),
                        Some(v) => v.clone(),
                    },
                };
                (f.name.to_string(), value)
            })
            .collect()
    }
}

//! Public portfolio page.
//!
//! Fetches every public resource concurrently and builds each section on its
//! own. A failed fetch empties that one section and is recorded in its
//! [`SectionStatus`]; the other sections render normally.

pub mod contact;
pub mod format;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::client::ResourceClient;
use crate::config::DisplayConfig;
use crate::envelope::normalize_records;
use crate::error::ClientError;
use crate::order::{sort_records, SortKey};
use crate::pagination::{group_by_category, CardPaginator, Paginator};
use crate::record::Record;
use crate::types::ResourceType;

pub use contact::{ContactForm, FormStatus};
pub use format::{category_label, date_range, format_month_year};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Profile,
    Skills,
    Experience,
    Projects,
    Certifications,
    Education,
    Contact,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Profile,
        Section::Skills,
        Section::Experience,
        Section::Projects,
        Section::Certifications,
        Section::Education,
        Section::Contact,
    ];

    pub fn resource(self) -> ResourceType {
        match self {
            Section::Profile => ResourceType::Profile,
            Section::Skills => ResourceType::Skill,
            Section::Experience => ResourceType::Experience,
            Section::Projects => ResourceType::Project,
            Section::Certifications => ResourceType::Certification,
            Section::Education => ResourceType::Education,
            Section::Contact => ResourceType::ContactInfo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionStatus {
    Loaded { count: usize },
    Failed { message: String },
}

/// Raw fetch results, one per section
pub type SectionResults = BTreeMap<Section, Result<Value, ClientError>>;

#[derive(Debug, Clone)]
pub struct PublicAggregateView {
    profile: Option<Record>,
    contact: Option<Record>,
    skills: CardPaginator<Record>,
    projects: Paginator<Record>,
    certifications: Paginator<Record>,
    experience: Vec<Record>,
    education: Vec<Record>,
    status: BTreeMap<Section, SectionStatus>,
}

impl PublicAggregateView {
    /// Fetch all sections at once. Never fails; see [`Self::failed_sections`].
    pub async fn load(client: &dyn ResourceClient, display: &DisplayConfig) -> Self {
        let (profile, skills, experience, projects, certifications, education, contact) = futures::join!(
            client.list(ResourceType::Profile),
            client.list(ResourceType::Skill),
            client.list(ResourceType::Experience),
            client.list(ResourceType::Project),
            client.list(ResourceType::Certification),
            client.list(ResourceType::Education),
            client.list(ResourceType::ContactInfo),
        );

        let results: SectionResults = [
            (Section::Profile, profile),
            (Section::Skills, skills),
            (Section::Experience, experience),
            (Section::Projects, projects),
            (Section::Certifications, certifications),
            (Section::Education, education),
            (Section::Contact, contact),
        ]
        .into_iter()
        .collect();

        Self::from_results(results, display)
    }

    pub fn from_results(mut results: SectionResults, display: &DisplayConfig) -> Self {
        let mut status = BTreeMap::new();
        let mut take = |section: Section| -> Vec<Record> {
            match results.remove(&section) {
                Some(Ok(body)) => {
                    let records = normalize_records(Some(&body));
                    status.insert(section, SectionStatus::Loaded { count: records.len() });
                    records
                }
                Some(Err(e)) => {
                    tracing::warn!("Public {:?} section unavailable: {}", section, e.message());
                    status.insert(section, SectionStatus::Failed { message: e.message() });
                    Vec::new()
                }
                None => {
                    status.insert(section, SectionStatus::Failed { message: "not fetched".to_string() });
                    Vec::new()
                }
            }
        };

        let profile = take(Section::Profile).into_iter().next();
        let contact = take(Section::Contact).into_iter().next();
        let skill_groups = group_by_category(take(Section::Skills), |r| r.get_str("category").map(str::to_string));
        let projects = take(Section::Projects);
        let certifications = take(Section::Certifications);

        let by_start = [SortKey::desc("start_date")];
        let mut experience = take(Section::Experience);
        sort_records(&mut experience, &by_start);
        let mut education = take(Section::Education);
        sort_records(&mut education, &by_start);

        Self {
            profile,
            contact,
            skills: CardPaginator::new(skill_groups, display.skill_chunk_size, display.skills_per_page),
            projects: Paginator::new(projects, display.projects_per_page),
            certifications: Paginator::new(certifications, display.certifications_per_page),
            experience,
            education,
            status,
        }
    }

    pub fn profile(&self) -> Option<&Record> {
        self.profile.as_ref()
    }

    pub fn contact(&self) -> Option<&Record> {
        self.contact.as_ref()
    }

    pub fn skills(&self) -> &CardPaginator<Record> {
        &self.skills
    }

    pub fn skills_mut(&mut self) -> &mut CardPaginator<Record> {
        &mut self.skills
    }

    pub fn projects(&self) -> &Paginator<Record> {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut Paginator<Record> {
        &mut self.projects
    }

    pub fn certifications(&self) -> &Paginator<Record> {
        &self.certifications
    }

    pub fn certifications_mut(&mut self) -> &mut Paginator<Record> {
        &mut self.certifications
    }

    /// Newest first; entries without a start date go last
    pub fn experience(&self) -> &[Record] {
        &self.experience
    }

    pub fn education(&self) -> &[Record] {
        &self.education
    }

    pub fn section_status(&self, section: Section) -> Option<&SectionStatus> {
        self.status.get(&section)
    }

    pub fn statuses(&self) -> &BTreeMap<Section, SectionStatus> {
        &self.status
    }

    pub fn failed_sections(&self) -> Vec<Section> {
        self.status
            .iter()
            .filter(|(_, s)| matches!(s, SectionStatus::Failed { .. }))
            .map(|(section, _)| *section)
            .collect()
    }

    /// Whether `section` has anything to render
    pub fn is_empty(&self, section: Section) -> bool {
        match section {
            Section::Profile => self.profile.is_none(),
            Section::Contact => self.contact.is_none(),
            Section::Skills => self.skills.cards().is_empty(),
            Section::Projects => self.projects.items().is_empty(),
            Section::Certifications => self.certifications.items().is_empty(),
            Section::Experience => self.experience.is_empty(),
            Section::Education => self.education.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockResourceClient;
    use serde_json::json;

    fn seeded() -> MockResourceClient {
        let mock = MockResourceClient::new();
        mock.seed(ResourceType::Profile, vec![json!({"id": 1, "name": "Ada", "title": "Engineer"})]);
        mock.seed(
            ResourceType::Skill,
            (0..12)
                .map(|i| json!({"id": i + 1, "name": format!("lang{i}"), "category": "LANG", "percentage": 80}))
                .chain([json!({"id": 50, "name": "Vim", "percentage": 90})])
                .collect(),
        );
        mock.seed(
            ResourceType::Experience,
            vec![
                json!({"id": 1, "company_name": "Old", "start_date": "2018-01-01", "end_date": "2019-01-01"}),
                json!({"id": 2, "company_name": "Now", "start_date": "2022-03-01", "end_date": null}),
                json!({"id": 3, "company_name": "Mid", "start_date": "2020-05-01", "end_date": "2021-12-01"}),
            ],
        );
        mock.seed(ResourceType::Project, (1..=5).map(|i| json!({"id": i, "title": format!("p{i}")})).collect());
        mock.seed(ResourceType::Certification, (1..=4).map(|i| json!({"id": i, "title": format!("c{i}")})).collect());
        mock.seed(ResourceType::Education, vec![json!({"id": 1, "institution": "MIT", "start_date": "2014-09-01"})]);
        mock.seed(ResourceType::ContactInfo, vec![json!({"id": 1, "email": "ada@example.com"})]);
        mock
    }

    #[tokio::test]
    async fn builds_every_section() {
        let view = PublicAggregateView::load(&seeded(), &DisplayConfig::default()).await;

        assert!(view.failed_sections().is_empty());
        assert_eq!(view.profile().unwrap().get_str("name"), Some("Ada"));
        assert_eq!(view.contact().unwrap().get_str("email"), Some("ada@example.com"));

        // 12 LANG -> 3 cards, 1 uncategorized -> 1 card; 3 cards per page
        assert_eq!(view.skills().cards().len(), 4);
        assert_eq!(view.skills().total_pages(), 2);
        assert_eq!(view.skills().cards()[3].category, "OTHER");

        assert_eq!(view.projects().total_pages(), 3);
        assert_eq!(view.certifications().total_pages(), 2);

        let companies: Vec<_> = view.experience().iter().filter_map(|r| r.get_str("company_name")).collect();
        assert_eq!(companies, vec!["Now", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn failed_certifications_only_empties_that_section() {
        let mock = seeded();
        mock.fail_list(ResourceType::Certification, ClientError::Server { status: 500, message: "boom".into() });

        let view = PublicAggregateView::load(&mock, &DisplayConfig::default()).await;

        assert_eq!(view.failed_sections(), vec![Section::Certifications]);
        assert!(view.is_empty(Section::Certifications));
        assert_eq!(view.certifications().total_pages(), 0);
        assert_eq!(
            view.section_status(Section::Certifications),
            Some(&SectionStatus::Failed { message: "boom".into() })
        );
        for section in Section::ALL.into_iter().filter(|s| *s != Section::Certifications) {
            assert!(!view.is_empty(section), "{:?} should have rendered", section);
        }
    }

    #[tokio::test]
    async fn every_section_can_fail_without_panicking() {
        let mock = MockResourceClient::new();
        for section in Section::ALL {
            mock.fail_list(section.resource(), ClientError::transport("down"));
        }
        let mut view = PublicAggregateView::load(&mock, &DisplayConfig::default()).await;
        assert_eq!(view.failed_sections().len(), 7);
        assert!(!view.projects_mut().next());
        assert!(view.profile().is_none());
    }

    #[test]
    fn section_pagers_are_independent() {
        let mut results = SectionResults::new();
        results.insert(Section::Projects, Ok(json!([{"id": 1}, {"id": 2}, {"id": 3}])));
        results.insert(Section::Certifications, Ok(json!({"results": [{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}]})));
        let mut view = PublicAggregateView::from_results(results, &DisplayConfig::default());

        assert!(view.projects_mut().next());
        assert_eq!(view.projects().page_index(), 1);
        assert_eq!(view.certifications().page_index(), 0);
        assert_eq!(view.section_status(Section::Skills), Some(&SectionStatus::Failed { message: "not fetched".into() }));
    }
}

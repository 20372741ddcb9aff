//! Admin dashboard summary.

use serde::Serialize;
use serde_json::Value;

use crate::client::ResourceClient;
use crate::envelope::normalize_records;
use crate::error::ClientError;
use crate::order::{sort_records, SortKey};
use crate::record::Record;
use crate::types::ResourceType;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardCounts {
    pub projects: usize,
    pub skills: usize,
    pub messages: usize,
    pub experience: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    pub counts: DashboardCounts,
    /// Highest ids first
    pub recent_messages: Vec<Record>,
}

impl DashboardSummary {
    /// All four listings run concurrently; a failed one counts as zero
    pub async fn fetch(client: &dyn ResourceClient, recent: usize) -> Self {
        let (projects, skills, messages, experience) = futures::join!(
            client.list(ResourceType::Project),
            client.list(ResourceType::Skill),
            client.list(ResourceType::Message),
            client.list(ResourceType::Experience),
        );

        let mut messages = settle(ResourceType::Message, messages);
        let counts = DashboardCounts {
            projects: settle(ResourceType::Project, projects).len(),
            skills: settle(ResourceType::Skill, skills).len(),
            messages: messages.len(),
            experience: settle(ResourceType::Experience, experience).len(),
        };

        sort_records(&mut messages, &[SortKey::desc("id")]);
        messages.truncate(recent);

        Self { counts, recent_messages: messages }
    }
}

fn settle(resource: ResourceType, result: Result<Value, ClientError>) -> Vec<Record> {
    match result {
        Ok(body) => normalize_records(Some(&body)),
        Err(e) => {
            tracing::warn!("Dashboard could not list {}: {}", resource, e.message());
            Vec::new()
        }
    }
}

use crate::core::calendar::WeekWindow;
use crate::core::{RecordStore, Storage};
use crate::domain::model::{
    Allocation, AllocationRecord, Client, Consultant, ConsultantRates, OwnerId, Project,
    ProjectBilling,
};
use crate::utils::error::{PlannerError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Serialized form of a whole planning dataset, as kept in a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub consultants: Vec<Consultant>,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

/// Record store held in memory. Inserts are validated the way the data manager forms are.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Dataset,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts every record of `dataset`, parents first.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        let mut store = Self::new();
        for client in dataset.clients {
            store.add_client(client)?;
        }
        for project in dataset.projects {
            store.add_project(project)?;
        }
        for consultant in dataset.consultants {
            store.add_consultant(consultant)?;
        }
        for allocation in dataset.allocations {
            store.add_allocation(allocation)?;
        }
        Ok(store)
    }

    /// Loads a JSON dataset file through `storage`.
    pub async fn from_storage<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        let bytes = storage.read_file(path).await?;
        let dataset: Dataset = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            "Loaded dataset {}: {} consultants, {} projects, {} allocations",
            path,
            dataset.consultants.len(),
            dataset.projects.len(),
            dataset.allocations.len()
        );
        Self::from_dataset(dataset)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn add_client(&mut self, client: Client) -> Result<()> {
        client.validate()?;
        if self.client(&client.user_id, &client.id).is_some() {
            return Err(duplicate_id("client", &client.id));
        }
        self.data.clients.push(client);
        Ok(())
    }

    pub fn add_project(&mut self, project: Project) -> Result<()> {
        project.validate()?;
        if self.project(&project.user_id, &project.id).is_some() {
            return Err(duplicate_id("project", &project.id));
        }
        if self.client(&project.user_id, &project.client_id).is_none() {
            return Err(PlannerError::InvalidRecordError {
                entity: "project",
                field: "client_id".to_string(),
                reason: format!("Unknown client {}", project.client_id),
            });
        }
        self.data.projects.push(project);
        Ok(())
    }

    pub fn add_consultant(&mut self, consultant: Consultant) -> Result<()> {
        consultant.validate()?;
        if self.consultant(&consultant.user_id, &consultant.id).is_some() {
            return Err(duplicate_id("consultant", &consultant.id));
        }
        self.data.consultants.push(consultant);
        Ok(())
    }

    pub fn add_allocation(&mut self, allocation: Allocation) -> Result<()> {
        allocation.validate()?;

        if self
            .data
            .allocations
            .iter()
            .any(|a| a.user_id == allocation.user_id && a.id == allocation.id)
        {
            return Err(duplicate_id("allocation", &allocation.id));
        }
        if self.consultant(&allocation.user_id, &allocation.consultant_id).is_none() {
            return Err(PlannerError::InvalidRecordError {
                entity: "allocation",
                field: "consultant_id".to_string(),
                reason: format!("Unknown consultant {}", allocation.consultant_id),
            });
        }
        if self.project(&allocation.user_id, &allocation.project_id).is_none() {
            return Err(PlannerError::InvalidRecordError {
                entity: "allocation",
                field: "project_id".to_string(),
                reason: format!("Unknown project {}", allocation.project_id),
            });
        }

        self.data.allocations.push(allocation);
        Ok(())
    }

    fn client(&self, owner: &OwnerId, id: &str) -> Option<&Client> {
        self.data
            .clients
            .iter()
            .find(|c| &c.user_id == owner && c.id == id)
    }

    fn consultant(&self, owner: &OwnerId, id: &str) -> Option<&Consultant> {
        self.data
            .consultants
            .iter()
            .find(|c| &c.user_id == owner && c.id == id)
    }

    fn project(&self, owner: &OwnerId, id: &str) -> Option<&Project> {
        self.data
            .projects
            .iter()
            .find(|p| &p.user_id == owner && p.id == id)
    }

    fn enrich(&self, allocation: &Allocation) -> Option<AllocationRecord> {
        let consultant = self.consultant(&allocation.user_id, &allocation.consultant_id)?;
        let project = self.project(&allocation.user_id, &allocation.project_id)?;
        let client_name = self
            .client(&project.user_id, &project.client_id)
            .map(|c| c.name.clone());

        Some(AllocationRecord {
            allocation: allocation.clone(),
            consultant: ConsultantRates {
                name: consultant.name.clone(),
                cost_per_hour: consultant.cost_per_hour,
                bill_rate: consultant.bill_rate,
                capacity_hours_per_week: consultant.capacity_hours_per_week,
            },
            project: ProjectBilling {
                name: project.name.clone(),
                billing_model: project.billing_model,
                flat_fee: project.flat_fee,
                client_name,
            },
        })
    }
}

fn duplicate_id(entity: &'static str, id: &str) -> PlannerError {
    PlannerError::InvalidRecordError {
        entity,
        field: "id".to_string(),
        reason: format!("Duplicate {} id {}", entity, id),
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_consultants(&self, owner: &OwnerId) -> Result<Vec<Consultant>> {
        let mut consultants: Vec<Consultant> = self
            .data
            .consultants
            .iter()
            .filter(|c| &c.user_id == owner)
            .cloned()
            .collect();
        // case-insensitive like the database collation behind `order=name.asc`
        consultants.sort_by_cached_key(|c| (c.name.to_lowercase(), c.name.clone()));
        Ok(consultants)
    }

    async fn list_allocations_overlapping(
        &self,
        owner: &OwnerId,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<AllocationRecord>> {
        let range = WeekWindow {
            start: range_start,
            end: range_end,
        };

        Ok(self
            .data
            .allocations
            .iter()
            .filter(|a| &a.user_id == owner && range.overlaps(a.start_date, a.end_date))
            .filter_map(|a| self.enrich(a))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::BillingModel;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn consultant(id: &str, name: &str, owner: &str) -> Consultant {
        Consultant {
            id: id.to_string(),
            name: name.to_string(),
            cost_per_hour: 80.0,
            bill_rate: 120.0,
            capacity_hours_per_week: 40.0,
            user_id: OwnerId::new(owner),
        }
    }

    fn allocation(id: &str, consultant_id: &str, start: NaiveDate, end: NaiveDate, owner: &str) -> Allocation {
        Allocation {
            id: id.to_string(),
            consultant_id: consultant_id.to_string(),
            project_id: "p1".to_string(),
            start_date: start,
            end_date: end,
            hours_per_week: 16.0,
            user_id: OwnerId::new(owner),
        }
    }

    fn seeded() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store
            .add_client(Client {
                id: "cl1".to_string(),
                name: "Acme".to_string(),
                user_id: OwnerId::new("alice"),
            })
            .unwrap();
        store
            .add_project(Project {
                id: "p1".to_string(),
                client_id: "cl1".to_string(),
                name: "Replatform".to_string(),
                billing_model: BillingModel::Hourly,
                flat_fee: None,
                user_id: OwnerId::new("alice"),
            })
            .unwrap();
        store.add_consultant(consultant("c2", "Zed", "alice")).unwrap();
        store.add_consultant(consultant("c1", "Ada", "alice")).unwrap();
        store.add_consultant(consultant("c3", "Mallory", "bob")).unwrap();
        store
            .add_allocation(allocation("a1", "c1", date(2025, 3, 3), date(2025, 3, 30), "alice"))
            .unwrap();
        store
            .add_allocation(allocation("a2", "c2", date(2024, 1, 1), date(2024, 1, 31), "alice"))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_consultants_are_scoped_and_sorted() {
        let store = seeded();
        let consultants = store.list_consultants(&OwnerId::new("alice")).await.unwrap();
        let names: Vec<&str> = consultants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Zed"]);

        let other = store.list_consultants(&OwnerId::new("bob")).await.unwrap();
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn test_allocations_are_filtered_and_enriched() {
        let store = seeded();
        let records = store
            .list_allocations_overlapping(&OwnerId::new("alice"), date(2025, 3, 30), date(2025, 6, 22))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].allocation.id, "a1");
        assert_eq!(records[0].consultant.name, "Ada");
        assert_eq!(records[0].consultant.bill_rate, 120.0);
        assert_eq!(records[0].project.client_name.as_deref(), Some("Acme"));

        let none = store
            .list_allocations_overlapping(&OwnerId::new("bob"), date(2025, 1, 1), date(2025, 12, 31))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_invalid_allocations_are_rejected() {
        let mut store = seeded();

        let inverted = allocation("a3", "c1", date(2025, 3, 10), date(2025, 3, 3), "alice");
        assert!(store.add_allocation(inverted).is_err());

        let mut zero_hours = allocation("a4", "c1", date(2025, 3, 3), date(2025, 3, 10), "alice");
        zero_hours.hours_per_week = 0.0;
        assert!(store.add_allocation(zero_hours).is_err());

        // 其他租戶的顧問不可引用
        let foreign = allocation("a5", "c3", date(2025, 3, 3), date(2025, 3, 10), "alice");
        assert!(matches!(
            store.add_allocation(foreign),
            Err(PlannerError::InvalidRecordError { entity: "allocation", .. })
        ));

        assert_eq!(store.dataset().allocations.len(), 2);
    }

    #[tokio::test]
    async fn test_client_names_stay_within_tenant() {
        let mut store = seeded();
        store
            .add_client(Client {
                id: "shared".to_string(),
                name: "Globex".to_string(),
                user_id: OwnerId::new("bob"),
            })
            .unwrap();

        // alice 不能引用 bob 的客戶
        let borrowed = Project {
            id: "p2".to_string(),
            client_id: "shared".to_string(),
            name: "Audit".to_string(),
            billing_model: BillingModel::Flat,
            flat_fee: Some(5000.0),
            user_id: OwnerId::new("alice"),
        };
        assert!(matches!(
            store.add_project(borrowed),
            Err(PlannerError::InvalidRecordError { entity: "project", ref field, .. }) if field == "client_id"
        ));

        // 同一個 id 在兩個租戶下各有不同名稱
        store
            .add_client(Client {
                id: "cl1".to_string(),
                name: "Initech".to_string(),
                user_id: OwnerId::new("bob"),
            })
            .unwrap();
        let records = store
            .list_allocations_overlapping(&OwnerId::new("alice"), date(2025, 3, 3), date(2025, 5, 25))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].project.client_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut store = seeded();

        let err = store.add_consultant(consultant("c1", "Ada Again", "alice")).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidRecordError { entity: "consultant", ref field, .. } if field == "id"
        ));
        assert!(store
            .add_allocation(allocation("a1", "c2", date(2025, 3, 3), date(2025, 3, 9), "alice"))
            .is_err());
        assert!(store
            .add_client(Client {
                id: "cl1".to_string(),
                name: "Acme".to_string(),
                user_id: OwnerId::new("alice"),
            })
            .is_err());

        // 不同租戶可以重用相同 id
        store.add_consultant(consultant("c1", "Ada", "bob")).unwrap();

        assert_eq!(store.dataset().consultants.len(), 4);
        assert_eq!(store.dataset().allocations.len(), 2);
        assert_eq!(store.dataset().clients.len(), 1);
    }

    #[test]
    fn test_duplicate_consultant_in_dataset_is_rejected() {
        let dataset = Dataset {
            consultants: vec![consultant("c1", "Ada", "alice"), consultant("c1", "Ada", "alice")],
            ..Dataset::default()
        };

        let err = InMemoryStore::from_dataset(dataset).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidRecordError { entity: "consultant", ref field, .. } if field == "id"
        ));
    }

    #[tokio::test]
    async fn test_consultant_order_ignores_case() {
        let mut store = seeded();
        store.add_consultant(consultant("c4", "bea", "alice")).unwrap();

        let consultants = store.list_consultants(&OwnerId::new("alice")).await.unwrap();
        let names: Vec<&str> = consultants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "bea", "Zed"]);
    }
}

use crate::core::RecordStore;
use crate::domain::model::{
    Allocation, AllocationRecord, BillingModel, Consultant, ConsultantRates, OwnerId,
    ProjectBilling,
};
use crate::utils::error::{PlannerError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const ALLOCATION_SELECT: &str = "*,\
consultants!inner(name,cost_per_hour,bill_rate,capacity_hours_per_week),\
projects!inner(name,billing_model,flat_fee,clients!inner(name))";

/// PostgREST (Supabase) backed record store.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    name: String,
    billing_model: BillingModel,
    #[serde(default)]
    flat_fee: Option<f64>,
    #[serde(default)]
    clients: Option<ClientName>,
}

#[derive(Debug, Deserialize)]
struct AllocationRow {
    #[serde(flatten)]
    allocation: Allocation,
    consultants: ConsultantRates,
    projects: ProjectRow,
}

impl From<AllocationRow> for AllocationRecord {
    fn from(row: AllocationRow) -> Self {
        AllocationRecord {
            allocation: row.allocation,
            consultant: row.consultants,
            project: ProjectBilling {
                name: row.projects.name,
                billing_model: row.projects.billing_model,
                flat_fee: row.projects.flat_fee,
                client_name: row.projects.clients.map(|c| c.name),
            },
        }
    }
}

impl RestStore {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn table(&self, table: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}/{}", self.endpoint, table));
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, table: &str, request: RequestBuilder) -> Result<Vec<T>> {
        tracing::debug!("Querying {} from {}", table, self.endpoint);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("⚠️ Store returned {} for {}", status, table);
            return Err(PlannerError::StoreError {
                message: format!("fetching {} returned {}: {}", table, status, body),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn list_consultants(&self, owner: &OwnerId) -> Result<Vec<Consultant>> {
        let owner_filter = format!("eq.{}", owner);
        let request = self.table("consultants").query(&[
            ("select", "*"),
            ("user_id", owner_filter.as_str()),
            ("order", "name.asc"),
        ]);
        self.fetch("consultants", request).await
    }

    async fn list_allocations_overlapping(
        &self,
        owner: &OwnerId,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<AllocationRecord>> {
        let owner_filter = format!("eq.{}", owner);
        let starts_before_end = format!("lte.{}", range_end);
        let ends_after_start = format!("gte.{}", range_start);
        let request = self.table("allocations").query(&[
            ("select", ALLOCATION_SELECT),
            ("user_id", owner_filter.as_str()),
            ("start_date", starts_before_end.as_str()),
            ("end_date", ends_after_start.as_str()),
        ]);

        let rows: Vec<AllocationRow> = self.fetch("allocations", request).await?;
        Ok(rows.into_iter().map(AllocationRecord::from).collect())
    }
}

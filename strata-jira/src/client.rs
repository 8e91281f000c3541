use crate::parse::{RawIssue, SPRINT_FIELD, to_ticket};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use strata_core::config::DEFAULT_AC_FIELD;
use strata_core::{ConnectionStatus, Identity, Settings, Ticket, TicketSource, TicketSourceError};
use strata_telemetry::ticket_fetch_span;
use tracing::Instrument;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CHILDREN: u32 = 100;
const ERROR_BODY_CHARS: usize = 200;

const CHILD_FIELDS: &str =
    "summary,description,issuetype,status,priority,labels,components,comment,issuelinks,subtasks,fixVersions";

/// Connection details for a Jira Cloud site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub acceptance_criteria_field: String,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            api_token: api_token.into(),
            acceptance_criteria_field: DEFAULT_AC_FIELD.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.jira_base_url, &settings.jira_email, &settings.jira_api_token)
            .with_acceptance_criteria_field(&settings.jira_acceptance_criteria_field)
    }

    pub fn with_acceptance_criteria_field(mut self, field: impl Into<String>) -> Self {
        self.acceptance_criteria_field = field.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.email.is_empty() && !self.api_token.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Myself {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    email_address: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
}

/// Jira REST v3 client authenticated with an email and API token.
pub struct JiraClient {
    client: Client,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Self {
        Self { client: Client::new(), config }
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/rest/api/3/{}", self.config.base_url, path))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header("Accept", "application/json")
    }

    fn ensure_configured(&self) -> Result<(), TicketSourceError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(TicketSourceError::Authentication(
                "Jira credentials are not configured (JIRA_BASE_URL, JIRA_EMAIL, JIRA_API_TOKEN)"
                    .to_string(),
            ))
        }
    }

    async fn search(&self, jql: &str) -> Result<Vec<Ticket>, TicketSourceError> {
        let fields = format!("{},{},{}", CHILD_FIELDS, self.config.acceptance_criteria_field, SPRINT_FIELD);
        let max_results = MAX_CHILDREN.to_string();
        let response = self
            .get("search")
            .query(&[("jql", jql), ("maxResults", max_results.as_str()), ("fields", fields.as_str())])
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TicketSourceError::Other(format!(
                "JIRA search error: {} - {}",
                status,
                truncate(&body)
            )));
        }

        let page: SearchPage = response
            .json()
            .await
            .map_err(|e| TicketSourceError::Other(format!("Invalid JIRA search response: {}", e)))?;
        Ok(page
            .issues
            .into_iter()
            .map(|issue| to_ticket(issue, &self.config.acceptance_criteria_field, &self.config.base_url))
            .collect())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_CHARS).collect()
}

fn transport_error(err: reqwest::Error) -> TicketSourceError {
    if err.is_timeout() {
        TicketSourceError::Connection("JIRA request timed out".to_string())
    } else if err.is_connect() {
        TicketSourceError::Connection("Cannot connect to JIRA server".to_string())
    } else {
        TicketSourceError::Other(format!("JIRA request failed: {}", err))
    }
}

#[async_trait]
impl TicketSource for JiraClient {
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket, TicketSourceError> {
        self.ensure_configured()?;
        async {
            let response = self
                .get(&format!("issue/{}", ticket_id))
                .timeout(FETCH_TIMEOUT)
                .send()
                .await
                .map_err(transport_error)?;

            match response.status() {
                StatusCode::OK => {
                    let issue: RawIssue = response.json().await.map_err(|e| {
                        TicketSourceError::Other(format!("Invalid JIRA issue response: {}", e))
                    })?;
                    Ok(to_ticket(issue, &self.config.acceptance_criteria_field, &self.config.base_url))
                }
                StatusCode::NOT_FOUND => Err(TicketSourceError::NotFound(ticket_id.to_string())),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(TicketSourceError::Authentication(format!(
                        "JIRA rejected the credentials (HTTP {})",
                        response.status().as_u16()
                    )))
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    Err(TicketSourceError::Other(format!(
                        "JIRA API error: {} - {}",
                        status.as_u16(),
                        truncate(&body)
                    )))
                }
            }
        }
        .instrument(ticket_fetch_span(ticket_id))
        .await
    }

    /// Tries the classic `"Epic Link"` query, then the next-gen `parent` query,
    /// and returns the first non-empty result.
    async fn fetch_children(&self, epic_key: &str) -> Result<Vec<Ticket>, TicketSourceError> {
        self.ensure_configured()?;
        let queries = [format!("\"Epic Link\" = {}", epic_key), format!("parent = {}", epic_key)];
        for jql in &queries {
            match self.search(jql).await {
                Ok(children) if !children.is_empty() => {
                    tracing::debug!(epic = epic_key, jql = %jql, count = children.len(), "found epic children");
                    return Ok(children);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(epic = epic_key, jql = %jql, error = %e, "child query failed"),
            }
        }
        Ok(Vec::new())
    }

    async fn test_connection(&self) -> ConnectionStatus {
        if !self.config.is_configured() {
            return ConnectionStatus::failed(
                "Jira is not configured. Set JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN.",
            );
        }

        let response = match self.get("myself").timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response,
            Err(e) => return ConnectionStatus::failed(transport_error(e).to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ConnectionStatus::failed(format!("HTTP {}: {}", status.as_u16(), truncate(&body)));
        }

        match response.json::<Myself>().await {
            Ok(me) => ConnectionStatus::ok(format!("Connected to Jira as {}", me.display_name))
                .with_identity(Identity {
                    display_name: me.display_name,
                    email: me.email_address,
                    account_id: me.account_id,
                }),
            Err(e) => ConnectionStatus::failed(format!("Invalid JIRA identity response: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_trims_and_detects_missing_values() {
        let config = JiraConfig::new("https://acme.atlassian.net/", "qa@acme.io", "token");
        assert_eq!(config.base_url, "https://acme.atlassian.net");
        assert!(config.is_configured());
        assert_eq!(config.acceptance_criteria_field, "customfield_10016");
        assert!(!JiraConfig::new("https://acme.atlassian.net", "", "token").is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_client_reports_auth() {
        let client = JiraClient::new(JiraConfig::new("", "", ""));
        assert!(matches!(client.fetch("P-1").await, Err(TicketSourceError::Authentication(_))));
        assert!(!client.test_connection().await.success);
    }
}

// crates/connector-sentinel-broker/src/reporter/instatus.rs
// ============================================================================
// Module: Connector Sentinel Instatus Reporter
// Description: Incident reporter backed by the Instatus status page API.
// Purpose: Open or update one status page incident per tracked component.
// Dependencies: reqwest, serde, serde_json, time, url
// ============================================================================

//! ## Overview
//! Incident keys are Instatus component IDs. A report first lists the page's
//! incidents page by page; when an unresolved incident already covers the
//! component, an incident update is posted to it, keeping its current status.
//! Otherwise a new incident is created for the component with a major outage
//! status.
//! Non-success status codes and transport errors fail closed as
//! [`IncidentError::DeliveryFailed`].
//! Security posture: the API key is only sent as a bearer token and never
//! appears in `Debug` output or errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use connector_sentinel_core::IncidentAction;
use connector_sentinel_core::IncidentBody;
use connector_sentinel_core::IncidentError;
use connector_sentinel_core::IncidentKey;
use connector_sentinel_core::IncidentReceipt;
use connector_sentinel_core::IncidentReporter;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size accepted from the API.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Incident status for new and updated incidents.
const INCIDENT_STATUS: &str = "INVESTIGATING";
/// Incident status that ends deduplication.
const RESOLVED_STATUS: &str = "RESOLVED";
/// Component status applied to the tracked component.
const COMPONENT_STATUS: &str = "MAJOROUTAGE";
/// Incidents requested per listing page.
const INCIDENT_PAGE_SIZE: usize = 50;
/// Maximum listing pages scanned for an open incident.
const MAX_INCIDENT_PAGES: usize = 20;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Settings for [`InstatusReporter`].
#[derive(Clone)]
pub struct InstatusReporterConfig {
    /// API base URL.
    pub base_url: String,
    /// Status page ID.
    pub page_id: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Whether subscribers are notified.
    pub notify: bool,
    /// Allow cleartext HTTP base URLs.
    pub allow_http: bool,
}

impl fmt::Debug for InstatusReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstatusReporterConfig")
            .field("base_url", &self.base_url)
            .field("page_id", &self.page_id)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("notify", &self.notify)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Incident as listed by the API.
#[derive(Debug, Deserialize)]
struct ListedIncident {
    /// Incident ID.
    id: String,
    /// Incident status.
    #[serde(default)]
    status: String,
    /// Components attached to the incident.
    #[serde(default)]
    components: Vec<ListedComponent>,
}

/// Component reference inside a listed incident.
#[derive(Debug, Deserialize)]
struct ListedComponent {
    /// Component ID.
    id: String,
}

/// Response carrying the created incident ID.
#[derive(Debug, Deserialize)]
struct CreatedIncident {
    /// Incident ID.
    id: String,
}

/// Component status assignment.
#[derive(Debug, Serialize)]
struct ComponentStatus<'a> {
    /// Component ID.
    id: &'a str,
    /// Component status.
    status: &'static str,
}

/// Request body for creating an incident.
#[derive(Debug, Serialize)]
struct NewIncident<'a> {
    /// Incident title.
    name: &'a str,
    /// Incident message.
    message: &'a str,
    /// Affected component IDs.
    components: [&'a str; 1],
    /// RFC 3339 start time.
    started: &'a str,
    /// Incident status.
    status: &'static str,
    /// Whether subscribers are notified.
    notify: bool,
    /// Component statuses.
    statuses: [ComponentStatus<'a>; 1],
}

/// Request body for an incident update.
#[derive(Debug, Serialize)]
struct IncidentUpdate<'a> {
    /// Update message.
    message: &'a str,
    /// Affected component IDs.
    components: [&'a str; 1],
    /// RFC 3339 update time.
    started: &'a str,
    /// Incident status, carried over from the open incident.
    status: &'a str,
    /// Whether subscribers are notified.
    notify: bool,
    /// Component statuses.
    statuses: [ComponentStatus<'a>; 1],
}

/// Unresolved incident covering a component.
#[derive(Debug)]
struct OpenIncident {
    /// Incident ID.
    id: String,
    /// Current incident status.
    status: String,
}

// ============================================================================
// SECTION: Instatus Reporter
// ============================================================================

/// Instatus-backed incident reporter.
pub struct InstatusReporter {
    /// HTTP client used for API requests.
    client: Client,
    /// Page-scoped API root (`{base}/v1/{page_id}/`).
    page_root: Url,
    /// API key sent as a bearer token.
    api_key: String,
    /// Whether subscribers are notified.
    notify: bool,
}

impl fmt::Debug for InstatusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstatusReporter")
            .field("page_root", &self.page_root.as_str())
            .field("notify", &self.notify)
            .finish_non_exhaustive()
    }
}

impl InstatusReporter {
    /// Builds a reporter from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`IncidentError::DeliveryFailed`] when the settings are invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(config: InstatusReporterConfig) -> Result<Self, IncidentError> {
        if config.page_id.trim().is_empty() {
            return Err(IncidentError::DeliveryFailed("instatus page id is empty".to_string()));
        }
        if config.api_key.trim().is_empty() {
            return Err(IncidentError::DeliveryFailed("instatus api key is empty".to_string()));
        }
        let base = Url::parse(&config.base_url)
            .map_err(|err| IncidentError::DeliveryFailed(format!("invalid base url: {err}")))?;
        match base.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            scheme => {
                return Err(IncidentError::DeliveryFailed(format!(
                    "unsupported base url scheme: {scheme}"
                )));
            }
        }
        let page_root = base
            .join(&format!("v1/{}/", config.page_id.trim()))
            .map_err(|err| IncidentError::DeliveryFailed(format!("invalid page url: {err}")))?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
        Ok(Self {
            client,
            page_root,
            api_key: config.api_key,
            notify: config.notify,
        })
    }

    /// Resolves a path relative to the page root.
    fn endpoint(&self, path: &str) -> Result<Url, IncidentError> {
        self.page_root
            .join(path)
            .map_err(|err| IncidentError::DeliveryFailed(format!("invalid endpoint: {err}")))
    }

    /// Finds an unresolved incident covering the component `key`.
    ///
    /// Listing pages are scanned until a short page or the page cap.
    fn find_open_incident(&self, key: &IncidentKey) -> Result<Option<OpenIncident>, IncidentError> {
        for page in 1..=MAX_INCIDENT_PAGES {
            let mut url = self.endpoint("incidents")?;
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &INCIDENT_PAGE_SIZE.to_string());
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.api_key)
                .send()
                .map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
            let incidents: Vec<ListedIncident> = read_json(response)?;
            let listed = incidents.len();
            let found = incidents.into_iter().find(|incident| {
                incident.status != RESOLVED_STATUS
                    && incident.components.iter().any(|component| component.id == key.as_str())
            });
            if let Some(incident) = found {
                return Ok(Some(OpenIncident {
                    id: incident.id,
                    status: incident.status,
                }));
            }
            if listed < INCIDENT_PAGE_SIZE {
                break;
            }
        }
        Ok(None)
    }

    /// Posts a JSON body and returns the response.
    fn post_json<T: Serialize>(&self, url: Url, body: &T) -> Result<Response, IncidentError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
        self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .map_err(|err| IncidentError::DeliveryFailed(err.to_string()))
    }
}

impl IncidentReporter for InstatusReporter {
    fn report(
        &self,
        key: &IncidentKey,
        body: &IncidentBody,
    ) -> Result<IncidentReceipt, IncidentError> {
        let started = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
        let statuses = [ComponentStatus {
            id: key.as_str(),
            status: COMPONENT_STATUS,
        }];

        if let Some(incident) = self.find_open_incident(key)? {
            let incident_id = incident.id;
            debug!(incident_key = %key, incident_id = %incident_id, "updating open incident");
            let status =
                if incident.status.is_empty() { INCIDENT_STATUS } else { incident.status.as_str() };
            let update = IncidentUpdate {
                message: &body.message,
                components: [key.as_str()],
                started: &started,
                status,
                notify: self.notify,
                statuses,
            };
            let url = self.endpoint(&format!("incidents/{incident_id}/incident-updates"))?;
            ensure_success(self.post_json(url, &update)?)?;
            return Ok(IncidentReceipt {
                key: key.clone(),
                incident_id,
                action: IncidentAction::Updated,
            });
        }

        let incident = NewIncident {
            name: &body.title,
            message: &body.message,
            components: [key.as_str()],
            started: &started,
            status: INCIDENT_STATUS,
            notify: self.notify,
            statuses,
        };
        let created: CreatedIncident =
            read_json(self.post_json(self.endpoint("incidents")?, &incident)?)?;
        Ok(IncidentReceipt {
            key: key.clone(),
            incident_id: created.id,
            action: IncidentAction::Opened,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fails closed on non-success status codes.
fn ensure_success(response: Response) -> Result<Response, IncidentError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(IncidentError::DeliveryFailed(format!("http status {}", response.status())))
    }
}

/// Reads a size-limited JSON response body.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, IncidentError> {
    let response = ensure_success(response)?;
    let mut limited = response.take((MAX_RESPONSE_BYTES + 1) as u64);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(|err| IncidentError::DeliveryFailed(err.to_string()))?;
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(IncidentError::DeliveryFailed("response exceeds size limit".to_string()));
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| IncidentError::DeliveryFailed(format!("invalid response body: {err}")))
}

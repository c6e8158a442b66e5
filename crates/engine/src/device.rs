//! Device lookup over a published device catalog.

use std::sync::Arc;

use bstack_api::{HttpTransport, TransportError};
use bstack_types::{Credentials, DeviceEntry, Platform, ResolutionError};
use bstack_util::redact_sensitive;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::fuzzy::{CandidateRecord, search};
use crate::version::{LATEST, OLDEST, resolve_version};

const NAME_FIELD: &str = "display_name";

impl CandidateRecord for DeviceEntry {
    fn field_text(&self, field: &str) -> Option<&str> {
        match field {
            NAME_FIELD => Some(&self.display_name),
            "os" => Some(&self.os),
            "os_version" => Some(&self.os_version),
            "browser" => self.browser.as_deref(),
            _ => None,
        }
    }
}

/// Finds the entries for `desired_name`.
///
/// Case-insensitive exact name matches win and are all returned, one per OS
/// version. Without an exact match, a fuzzy hit is accepted only when every
/// hit shares one display name; hits spread across several names are
/// ambiguous and nothing matching at all is not found.
pub fn find_by_name(devices: &[DeviceEntry], desired_name: &str) -> Result<Vec<DeviceEntry>, ResolutionError> {
    let wanted = desired_name.trim();
    let matches = search(devices, &[NAME_FIELD], wanted, devices.len());
    if matches.is_empty() {
        return Err(ResolutionError::not_found(wanted, distinct_names(devices.iter())));
    }

    let exact: Vec<DeviceEntry> = matches
        .iter()
        .filter(|hit| hit.is_exact())
        .map(|hit| hit.record.clone())
        .collect();
    if !exact.is_empty() {
        return Ok(exact);
    }

    let candidates = distinct_names(matches.iter().map(|hit| hit.record));
    if candidates.len() > 1 {
        return Err(ResolutionError::ambiguous(wanted, candidates));
    }

    debug!(query = wanted, matched = %matches[0].record.display_name, "accepted single fuzzy device match");
    Ok(matches.into_iter().map(|hit| hit.record.clone()).collect())
}

/// A concrete device plus a note when the requested OS version was substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub device: DeviceEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Narrows the catalog to `platform`, finds `name`, and pins an OS version.
///
/// `os_version` defaults to `latest`. A version that is not published for the
/// device is resolved to the closest available one and reported in `note`.
pub fn select_device(
    devices: &[DeviceEntry],
    platform: Option<Platform>,
    name: &str,
    os_version: Option<&str>,
) -> Result<DeviceSelection, ResolutionError> {
    let scoped: Vec<DeviceEntry> = match platform {
        Some(platform) => devices.iter().filter(|entry| entry.platform() == Some(platform)).cloned().collect(),
        None => devices.to_vec(),
    };
    if let Some(platform) = platform
        && scoped.is_empty()
    {
        let published: IndexSet<String> = devices
            .iter()
            .filter_map(DeviceEntry::platform)
            .map(|platform| platform.to_string())
            .collect();
        return Err(ResolutionError::not_found(platform.as_str(), published.into_iter().collect()));
    }

    let entries = find_by_name(&scoped, name)?;
    let versions: Vec<&str> = entries.iter().map(|entry| entry.os_version.as_str()).collect();
    let requested = os_version.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(LATEST);
    let resolved = resolve_version(requested, &versions);

    let device = entries
        .iter()
        .find(|entry| entry.os_version == resolved)
        .or_else(|| entries.first())
        .cloned()
        .ok_or_else(|| ResolutionError::not_found(name.trim(), distinct_names(scoped.iter())))?;

    let is_sentinel = requested.eq_ignore_ascii_case(LATEST) || requested.eq_ignore_ascii_case(OLDEST);
    let note = (!is_sentinel && device.os_version != requested).then(|| {
        format!(
            "{} {} is not available for {}; using {} instead",
            device.os, requested, device.display_name, device.os_version
        )
    });
    if let Some(note) = note.as_deref() {
        info!(%note, "substituted device OS version");
    }

    Ok(DeviceSelection { device, note })
}

fn distinct_names<'a>(entries: impl Iterator<Item = &'a DeviceEntry>) -> Vec<String> {
    let names: IndexSet<&str> = entries.map(|entry| entry.display_name.as_str()).collect();
    names.into_iter().map(str::to_string).collect()
}

/// Fetches the published device list over HTTP.
///
/// Accepts either a bare JSON array or an object wrapping the array under
/// `devices`.
pub struct DeviceCatalogClient {
    transport: Arc<dyn HttpTransport>,
    url: String,
}

impl DeviceCatalogClient {
    pub fn new(transport: Arc<dyn HttpTransport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    pub async fn fetch(&self, credentials: &Credentials) -> Result<Vec<DeviceEntry>, ResolutionError> {
        const OPERATION: &str = "device catalog fetch";

        let response = self
            .transport
            .get(&self.url, Some(credentials))
            .await
            .map_err(|error: TransportError| ResolutionError::upstream(OPERATION, None, error.to_string()))?;
        if !response.is_success() {
            return Err(ResolutionError::upstream(
                OPERATION,
                Some(response.status),
                redact_sensitive(&response.body),
            ));
        }

        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|error| ResolutionError::upstream(OPERATION, Some(response.status), format!("invalid JSON: {error}")))?;
        let list = match payload {
            Value::Object(mut object) => object.remove("devices").unwrap_or(Value::Null),
            other => other,
        };
        let devices: Vec<DeviceEntry> = serde_json::from_value(list)
            .map_err(|error| ResolutionError::upstream(OPERATION, Some(response.status), format!("unexpected payload: {error}")))?;
        debug!(count = devices.len(), url = %self.url, "fetched device catalog");
        Ok(devices)
    }
}

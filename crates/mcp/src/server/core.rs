use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bstack_api::{AuthProvider, HttpTransport, ReqwestTransport};
use bstack_engine::{
    ConfigurationResolver, DeviceCatalogClient, DeviceSelection, EndpointProbe, EndpointSet, PercyTokenClient, ProjectDescriptor,
    ResolvedEndpoint, SetupService, builtin_catalog, resolve_version, select_device,
};
use bstack_types::{Credentials, DeviceEntry, InstructionSet, Platform, ResolutionError};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::server::schemas::{FindDeviceRequest, ResolveEndpointRequest, ResolveVersionRequest, SetupInstructionsRequest};

/// Project name used when a setup request does not name one.
pub const DEFAULT_PROJECT_NAME: &str = "bstack-project";

/// Outcome of a version resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionResolution {
    pub requested: String,
    pub resolved: String,
    /// `false` when a fallback tier picked a different version.
    pub exact: bool,
}

/// Shared resolution services behind both the MCP tools and the CLI.
pub struct ResolutionServices {
    auth: Arc<dyn AuthProvider>,
    endpoints: EndpointProbe,
    devices: DeviceCatalogClient,
    setup: SetupService,
}

impl ResolutionServices {
    /// Builds services backed by a reqwest transport and the configured credentials.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs)).context("failed to build HTTP client")?;
        Self::with_transport(config, Arc::new(config.auth_provider()), Arc::new(transport))
    }

    pub fn with_transport(config: &ServerConfig, auth: Arc<dyn AuthProvider>, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let endpoint_set = EndpointSet::new(config.endpoint_candidates.clone()).context("no endpoint candidates configured")?;
        let endpoints = EndpointProbe::new(endpoint_set, Arc::clone(&transport)).with_probe_path(config.probe_path.clone());
        let devices = DeviceCatalogClient::new(Arc::clone(&transport), config.devices_url.clone());

        let catalog = builtin_catalog().context("built-in configuration catalog is inconsistent")?;
        let resolver = ConfigurationResolver::new(Arc::new(catalog));
        let percy = PercyTokenClient::new(transport, config.percy_api_base.clone());

        Ok(Self {
            auth,
            endpoints,
            devices,
            setup: SetupService::new(resolver, percy),
        })
    }

    pub fn credentials(&self) -> Result<Credentials, ResolutionError> {
        self.auth.credentials()
    }

    pub fn resolve_version(&self, requested: &str, available: &[String]) -> VersionResolution {
        let resolved = resolve_version(requested, available);
        VersionResolution {
            exact: resolved == requested.trim(),
            requested: requested.to_string(),
            resolved,
        }
    }

    /// Looks a device up in `inline` devices, or in the published catalog when none are given.
    pub async fn find_device(
        &self,
        name: &str,
        platform: Option<&str>,
        os_version: Option<&str>,
        inline: Option<Vec<DeviceEntry>>,
    ) -> Result<DeviceSelection, ResolutionError> {
        let platform = parse_platform(platform)?;
        let devices = match inline {
            Some(devices) => devices,
            None => {
                let credentials = self.credentials()?;
                self.devices.fetch(&credentials).await?
            }
        };
        debug!(name, candidates = devices.len(), "searching devices");
        select_device(&devices, platform, name, os_version)
    }

    pub async fn resolve_endpoint(&self, refresh: bool) -> Result<ResolvedEndpoint, ResolutionError> {
        let credentials = self.credentials()?;
        if refresh {
            self.endpoints.clear_cache();
        }
        Ok(self.endpoints.resolve(&credentials).await)
    }

    pub async fn setup_instructions(
        &self,
        language: &str,
        framework: &str,
        test_framework: &str,
        percy_mode: Option<&str>,
        project_name: Option<&str>,
    ) -> Result<InstructionSet, ResolutionError> {
        let descriptor = ProjectDescriptor::parse(self.setup.resolver().catalog(), language, framework, test_framework, percy_mode)?;
        // Unsupported combinations fail before credentials are required.
        self.setup.resolver().select(&descriptor)?;
        let credentials = self.credentials()?;
        let project_name = project_name.map(str::trim).filter(|name| !name.is_empty()).unwrap_or(DEFAULT_PROJECT_NAME);
        self.setup.instructions(&descriptor, project_name, &credentials).await
    }
}

fn parse_platform(platform: Option<&str>) -> Result<Option<Platform>, ResolutionError> {
    match platform.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => Platform::parse(value)
            .map(Some)
            .ok_or_else(|| ResolutionError::not_found(value, Platform::names())),
    }
}

#[derive(Clone)]
pub struct BstackMcpCore {
    tool_router: ToolRouter<Self>,
    services: Arc<ResolutionServices>,
}

#[tool_router]
impl BstackMcpCore {
    pub fn new(services: Arc<ResolutionServices>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            services,
        }
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Resolve a requested OS version against the versions a target publishes. Never fails: exact match, then 'latest'/'oldest', then same major version, then nearest numeric version. Returns requested, resolved and exact."
    )]
    async fn resolve_version(&self, param: Parameters<ResolveVersionRequest>) -> Result<CallToolResult, ErrorData> {
        info!(tool = "resolve_version", requested = %param.0.requested, "tool invoked");
        let resolution = self.services.resolve_version(&param.0.requested, &param.0.available);
        structured(&resolution)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Find one device by loose name, optionally filtered by platform and pinned to an OS version. Ambiguous or unknown names fail with the candidate names to retry with."
    )]
    async fn find_device(&self, param: Parameters<FindDeviceRequest>) -> Result<CallToolResult, ErrorData> {
        let request = param.0;
        info!(tool = "find_device", name = %request.name, "tool invoked");
        let inline = request.devices.map(|devices| devices.into_iter().map(DeviceEntry::from).collect());
        let selection = self
            .services
            .find_device(&request.name, request.platform.as_deref(), request.os_version.as_deref(), inline)
            .await
            .map_err(resolution_error)?;
        structured(&selection)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Resolve the regional API endpoint that answers for the configured account. The first result is cached; pass refresh=true to probe again. Returns url and whether it was verified."
    )]
    async fn resolve_endpoint(&self, param: Parameters<ResolveEndpointRequest>) -> Result<CallToolResult, ErrorData> {
        let refresh = param.0.refresh.unwrap_or(false);
        info!(tool = "resolve_endpoint", refresh, "tool invoked");
        let endpoint = self.services.resolve_endpoint(refresh).await.map_err(resolution_error)?;
        structured(&endpoint)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Generate numbered setup steps for a language, automation framework and test framework, with optional Percy visual testing (percy_mode: disabled, with-sdk, web). Unsupported values fail listing the supported ones. Returns path, fallback_from and steps."
    )]
    async fn setup_instructions(&self, param: Parameters<SetupInstructionsRequest>) -> Result<CallToolResult, ErrorData> {
        let request = param.0;
        info!(
            tool = "setup_instructions",
            language = %request.language,
            framework = %request.framework,
            test_framework = %request.test_framework,
            "tool invoked"
        );
        let instructions = self
            .services
            .setup_instructions(
                &request.language,
                &request.framework,
                &request.test_framework,
                request.percy_mode.as_deref(),
                request.project_name.as_deref(),
            )
            .await
            .map_err(resolution_error)?;
        structured(&instructions)
    }
}

#[tool_handler]
impl ServerHandler for BstackMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "bstack".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("bstack MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Resolves loose test-cloud descriptors to concrete supported values.\n- resolve_version: pick an OS version from a published list.\n- find_device: turn a loose device name into one device entry.\n- resolve_endpoint: find the regional API base URL.\n- setup_instructions: numbered setup steps for a project.\nOn invalid_params errors, retry with one of the values listed in data.supported.".to_string(),
            ),
        }
    }
}

fn structured<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let json = serde_json::to_value(value).map_err(|error| ErrorData::internal_error(error.to_string(), None))?;
    Ok(CallToolResult::structured(json))
}

/// Resolution failures are caller-correctable, so they surface as invalid params.
pub(crate) fn resolution_error(error: ResolutionError) -> ErrorData {
    let data: Value = error.details();
    ErrorData::invalid_params(error.to_string(), Some(data))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bstack_api::{HttpRequest, HttpResponse, StaticAuthProvider, TransportError};
    use bstack_types::IntegrationPath;

    use super::*;

    #[derive(Default)]
    struct FakeCloud {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for FakeCloud {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.url.contains("devices.json") {
                return Ok(HttpResponse::new(
                    200,
                    r#"[{"device": "Pixel 7", "os": "android", "os_version": "13.0"},
                        {"device": "Pixel 7", "os": "android", "os_version": "14.0"},
                        {"device": "iPhone 14", "os": "ios", "os_version": "16"}]"#,
                ));
            }
            if request.url.contains("get_project_token") {
                return Ok(HttpResponse::new(200, r#"{"success": true, "token": "web_tok"}"#));
            }
            if request.url.starts_with("https://test-management.browserstack.com") {
                return Err(TransportError::Network {
                    url: request.url,
                    message: "connection refused".into(),
                });
            }
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    fn services(auth: StaticAuthProvider) -> (Arc<ResolutionServices>, Arc<FakeCloud>) {
        let transport = Arc::new(FakeCloud::default());
        let services =
            ResolutionServices::with_transport(&ServerConfig::default(), Arc::new(auth), transport.clone()).expect("default config is valid");
        (Arc::new(services), transport)
    }

    fn authenticated() -> StaticAuthProvider {
        StaticAuthProvider::new(Some("alice".into()), Some("key".into()))
    }

    #[test]
    fn version_resolution_reports_substitution() {
        let (services, _) = services(authenticated());
        let available = vec!["13.0".to_string(), "14.0".to_string()];
        assert!(services.resolve_version("14.0", &available).exact);

        let resolution = services.resolve_version("14", &available);
        assert_eq!(resolution.resolved, "14.0");
        assert!(!resolution.exact);
    }

    #[test]
    fn padded_exact_version_is_still_exact() {
        let (services, _) = services(authenticated());
        let available = vec!["13.0".to_string(), "14.0".to_string()];
        let resolution = services.resolve_version(" 14.0 ", &available);
        assert_eq!(resolution.resolved, "14.0");
        assert!(resolution.exact);
    }

    #[tokio::test]
    async fn find_device_fetches_the_published_catalog() {
        let (services, transport) = services(authenticated());
        let selection = services
            .find_device("pixel 7", Some("android"), Some("14"), None)
            .await
            .expect("pixel is published");
        assert_eq!(selection.device.os_version, "14.0");
        assert!(selection.note.is_some());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inline_devices_skip_credentials_and_network() {
        let (services, transport) = services(StaticAuthProvider::default());
        let inline = vec![DeviceEntry::new("iPhone 14", "ios", "16")];
        let selection = services.find_device("iPhone 14", None, None, Some(inline)).await.expect("inline");
        assert_eq!(selection.device.display_name, "iPhone 14");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_platform_lists_platforms() {
        let (services, _) = services(authenticated());
        let error = services
            .find_device("Pixel 7", Some("beos"), None, Some(Vec::new()))
            .await
            .expect_err("unknown platform");
        assert_eq!(error.kind(), "not_found");
        assert!(error.alternatives().contains(&"android".to_string()));
    }

    #[tokio::test]
    async fn endpoint_falls_through_to_a_healthy_region() {
        let (services, _) = services(authenticated());
        let endpoint = services.resolve_endpoint(false).await.expect("credentials present");
        assert!(endpoint.verified);
        assert_ne!(endpoint.url, "https://test-management.browserstack.com");
    }

    #[tokio::test]
    async fn missing_credentials_surface_as_credential_error() {
        let (services, _) = services(StaticAuthProvider::default());
        let error = services.resolve_endpoint(false).await.expect_err("no credentials");
        assert_eq!(error.kind(), "credential");
    }

    #[tokio::test]
    async fn setup_uses_default_project_for_percy_token() {
        let (services, _) = services(authenticated());
        let instructions = services
            .setup_instructions("javascript", "selenium", "jest", Some("web"), None)
            .await
            .expect("supported");
        assert_eq!(instructions.path, IntegrationPath::PercyStandalone);
        assert!(instructions.steps[0].starts_with("Step 1:"));
        assert!(instructions.render().contains("web_tok"));
    }

    #[tokio::test]
    async fn unsupported_setup_fails_without_credentials() {
        let (services, _) = services(StaticAuthProvider::default());
        let error = services
            .setup_instructions("python", "cypress", "pytest", None, None)
            .await
            .expect_err("python has no cypress");
        assert_eq!(error.kind(), "unsupported_framework");
    }

    #[tokio::test]
    async fn tool_errors_carry_structured_alternatives() {
        let (services, _) = services(authenticated());
        let core = BstackMcpCore::new(services);
        let error = core
            .setup_instructions(Parameters(SetupInstructionsRequest {
                language: "cobol".into(),
                framework: "selenium".into(),
                test_framework: "junit".into(),
                percy_mode: None,
                project_name: None,
            }))
            .await
            .expect_err("cobol unsupported");

        let data = error.data.expect("structured data");
        assert_eq!(data["kind"], "unsupported_language");
        assert!(data["supported"].as_array().is_some_and(|supported| !supported.is_empty()));
    }

    #[tokio::test]
    async fn tool_results_are_structured() {
        let (services, _) = services(authenticated());
        let core = BstackMcpCore::new(services);
        let result = core
            .resolve_version(Parameters(ResolveVersionRequest {
                requested: "latest".into(),
                available: vec!["9".into(), "10".into()],
            }))
            .await
            .expect("never fails");
        let content = result.structured_content.expect("structured");
        assert_eq!(content["resolved"], "10");
    }

    #[test]
    fn server_info_advertises_tools() {
        let (services, _) = services(authenticated());
        let info = BstackMcpCore::new(services).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "bstack");
    }
}

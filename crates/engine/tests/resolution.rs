use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bstack_api::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use bstack_engine::{
    ConfigurationResolver, EndpointProbe, EndpointSet, ProjectDescriptor, ResolutionError, TemplateContext, TokenCache,
    builtin_catalog, find_by_name, resolve_version,
};
use bstack_types::{AutomationFramework, Credentials, DeviceEntry, Language, PercyMode, TestFramework};

/// Fails every URL except those under `healthy_base`, counting requests.
struct RegionalTransport {
    healthy_base: &'static str,
    requests: AtomicUsize,
}

#[async_trait]
impl HttpTransport for RegionalTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if request.url.starts_with(self.healthy_base) {
            Ok(HttpResponse::new(200, "{}"))
        } else {
            Err(TransportError::Network {
                url: request.url,
                message: "timed out".into(),
            })
        }
    }
}

#[test]
fn exact_version_always_wins() {
    let catalogs: [&[&str]; 3] = [&["13.0", "14.0", "14.1"], &["beta", "9", "rc1"], &["10", "10.0", "10.00"]];
    for catalog in catalogs {
        for requested in catalog {
            assert_eq!(&resolve_version(requested, catalog), requested);
        }
    }
}

#[test]
fn version_fallback_tiers() {
    assert_eq!(resolve_version("latest", &["9", "10", "10.5"]), "10.5");
    assert_eq!(resolve_version("14", &["13.0", "14.0", "14.1", "15.0"]), "14.0");
    assert_eq!(resolve_version("14.5", &["13.0", "14.0", "16.0"]), "14.0");
}

#[test]
fn exact_device_name_beats_fuzzy_neighbours() {
    let devices = vec![
        DeviceEntry::new("iPhone 14", "ios", "16"),
        DeviceEntry::new("iPhone 14 Pro", "ios", "16"),
        DeviceEntry::new("iPhone 15", "ios", "17"),
        DeviceEntry::new("iPhone 13", "ios", "15"),
    ];
    let found = find_by_name(&devices, "iPhone 14").expect("exact match");
    assert_eq!(found, vec![DeviceEntry::new("iPhone 14", "ios", "16")]);
}

#[test]
fn unknown_device_enumerates_every_name() {
    let devices = vec![
        DeviceEntry::new("Pixel 7", "android", "13.0"),
        DeviceEntry::new("Pixel 7", "android", "14.0"),
        DeviceEntry::new("iPhone 14", "ios", "16"),
    ];
    let error = find_by_name(&devices, "nonexistent-device").expect_err("no such device");
    assert_eq!(
        error,
        ResolutionError::NotFound {
            query: "nonexistent-device".into(),
            available: vec!["Pixel 7".into(), "iPhone 14".into()],
        }
    );
}

#[tokio::test]
async fn endpoint_probe_caches_the_first_healthy_region() {
    let transport = Arc::new(RegionalTransport {
        healthy_base: "https://third.example.com",
        requests: AtomicUsize::new(0),
    });
    let endpoints = EndpointSet::new(vec![
        "https://first.example.com".into(),
        "https://second.example.com".into(),
        "https://third.example.com".into(),
    ])
    .expect("three candidates");
    let probe = EndpointProbe::new(endpoints, transport.clone());
    let credentials = Credentials::new("alice", "key");

    assert_eq!(probe.resolve_base_url(&credentials).await, "https://third.example.com");
    assert_eq!(probe.cached().map(|resolved| resolved.url).as_deref(), Some("https://third.example.com"));
    let after_first = transport.requests.load(Ordering::SeqCst);
    assert_eq!(after_first, 3);

    assert_eq!(probe.resolve_base_url(&credentials).await, "https://third.example.com");
    assert_eq!(transport.requests.load(Ordering::SeqCst), after_first);
}

#[tokio::test]
async fn token_cache_scope_switch_refetches() {
    let cache = TokenCache::new();
    let fetch_a = AtomicUsize::new(0);
    let fetch_b = AtomicUsize::new(0);
    let fetch = |counter: &AtomicUsize, token: &'static str| {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok::<String, ResolutionError>(token.to_string()))
    };

    cache.get_token("projA", || fetch(&fetch_a, "a")).await.expect("a");
    cache.get_token("projB", || fetch(&fetch_b, "b")).await.expect("b");
    cache.get_token("projA", || fetch(&fetch_a, "a")).await.expect("a again");

    assert_eq!(fetch_a.load(Ordering::SeqCst), 2);
    assert_eq!(fetch_b.load(Ordering::SeqCst), 1);
}

#[test]
fn unsupported_framework_lists_supported_frameworks() {
    let resolver = ConfigurationResolver::new(Arc::new(builtin_catalog().expect("catalog")));
    let descriptor = ProjectDescriptor::new(Language::Python, AutomationFramework::Cypress, TestFramework::Pytest, PercyMode::Disabled);

    let error = resolver.select(&descriptor).expect_err("python has no cypress");
    assert_eq!(
        error,
        ResolutionError::UnsupportedFramework {
            language: "python".into(),
            framework: "cypress".into(),
            supported: vec!["selenium".into(), "playwright".into()],
        }
    );
}

#[test]
fn resolution_is_idempotent() {
    let resolver = ConfigurationResolver::new(Arc::new(builtin_catalog().expect("catalog")));
    let descriptor = ProjectDescriptor::new(Language::Java, AutomationFramework::Selenium, TestFramework::Testng, PercyMode::WithSdk);
    let context = TemplateContext::new(Credentials::new("alice", "key"))
        .with_percy_token(Some("auto_tok".into()))
        .with_project_name("checkout");

    let first = resolver.resolve(&descriptor, &context).expect("supported");
    let second = resolver.resolve(&descriptor, &context).expect("supported");
    assert_eq!(first, second);

    let versions = ["11", "12.1", "13"];
    assert_eq!(resolve_version("12", &versions), resolve_version("12", &versions));
}

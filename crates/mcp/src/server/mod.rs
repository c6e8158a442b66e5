mod core;
mod http;
mod schemas;
mod stdio;

pub use core::{BstackMcpCore, DEFAULT_PROJECT_NAME, ResolutionServices, VersionResolution};
pub use http::{McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
pub use schemas::{DeviceParam, FindDeviceRequest, ResolveEndpointRequest, ResolveVersionRequest, SetupInstructionsRequest};
pub use stdio::serve_stdio;

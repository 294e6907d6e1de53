pub mod client;
pub mod endpoints;
pub mod provision;
pub mod transport;

pub use client::ApiClient;
pub use provision::{ProvisionError, ProvisioningClient};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

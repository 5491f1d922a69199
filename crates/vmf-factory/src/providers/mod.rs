//! Built-in provider factories

mod aws;
mod azure;
mod gcp;
mod onpremise;

pub use aws::AwsFactory;
pub use azure::AzureFactory;
pub use gcp::GcpFactory;
pub use onpremise::OnPremiseFactory;

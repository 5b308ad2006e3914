//! AWS Systems Manager transport for docflow
//!
//! Implements [`DocumentTransport`](docflow_cloud::DocumentTransport) on top
//! of `aws-sdk-ssm`. Credentials, region and transport-level retry come from
//! the standard AWS configuration chain.
//!
//! # Example
//!
//! ```ignore
//! use docflow_cloud_aws::SsmTransport;
//!
//! let transport = SsmTransport::from_env().await;
//! ```

pub mod transport;

pub use transport::SsmTransport;

//! GitHub Operations
//!
//! REST client, DTOs and the operation handlers registered with the
//! dispatcher.
//!
//! ## Architecture
//! - `types.rs` - Response and request DTOs
//! - `client.rs` - Authenticated REST client mapping failures to `DispatchError`
//! - `analysis.rs` - Language, technology and activity aggregation
//! - `handlers.rs` - One `OperationHandler` per operation

pub mod analysis;
pub mod client;
pub mod handlers;
pub mod types;

use std::sync::Arc;

use mentor_core::operation::OperationRegistry;

pub use client::GitHubClient;

/// Register every GitHub operation, in the order shown to the classifier.
pub fn register_github_operations(registry: &mut OperationRegistry, client: Arc<GitHubClient>) {
    use handlers::*;

    registry.register(Arc::new(CreateRepository::new(client.clone())));
    registry.register(Arc::new(ListRepositories::new(client.clone())));
    registry.register(Arc::new(SearchCode::new(client.clone())));
    registry.register(Arc::new(AnalyzeProfile::new(client.clone())));
    registry.register(Arc::new(AnalyzeRepository::new(client.clone())));
    registry.register(Arc::new(GenerateReport::new(client.clone())));
    registry.register(Arc::new(GetTechnologyStack::new(client.clone())));
    registry.register(Arc::new(GetActivityStats::new(client.clone())));
    registry.register(Arc::new(ListAllRepositories::new(client.clone())));
    registry.register(Arc::new(RepositoryDetails::new(client.clone())));
    registry.register(Arc::new(SearchRepositories::new(client)));
}

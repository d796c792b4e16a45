//! Type-erased adapter handle so the executor can hold a
//! `HashMap<SurfaceId, _>` over heterogeneous `AdapterRuntime<L>`
//! instantiations (`spec.md` §4.3: `registerAdapter`/`unregisterAdapter`).

use async_trait::async_trait;
use visibility_adapter::{AdapterRequest, AdapterResponse, AdapterRuntime, SurfaceAdapterLeaf, SurfaceMetadata};

/// An adapter the executor can dispatch a query to, independent of which
/// concrete [`SurfaceAdapterLeaf`] backs it.
#[async_trait]
pub trait QueryableAdapter: Send + Sync {
    async fn query(&self, request: AdapterRequest) -> AdapterResponse;

    fn metadata(&self) -> &SurfaceMetadata;
}

#[async_trait]
impl<L: SurfaceAdapterLeaf> QueryableAdapter for AdapterRuntime<L> {
    async fn query(&self, request: AdapterRequest) -> AdapterResponse {
        AdapterRuntime::query(self, request).await
    }

    fn metadata(&self) -> &SurfaceMetadata {
        AdapterRuntime::metadata(self)
    }
}

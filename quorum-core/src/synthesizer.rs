//! Per-node configuration synthesis
//!
//! [`QuorumSynthesizer`] ties the pieces together for one reconciliation:
//! one read of the deployed static file, pure assembly of every artifact,
//! then the writes. All artifacts are computed before anything is written,
//! so invalid input or missing credentials never leave a half-written node.

use crate::auth::generate_auth;
use crate::config::DesiredState;
use crate::continuity::{
    read_deployed_static, read_dynamic_pointer, DynamicConfigPointer, PointerSource,
};
use crate::error::QuorumResult;
use crate::identity::NodeIdentity;
use crate::launch;
use crate::partition::static_config_changed;
use crate::paths::ConfigPaths;
use crate::properties::{assemble, PropertyList};
use crate::store::ConfigStore;
use std::sync::Arc;
use tracing::info;

/// Everything written for a node in one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeArtifacts {
    /// Full assembled list, dynamic keys included
    pub properties: PropertyList,
    /// What goes into the static file
    pub static_properties: PropertyList,
    pub jaas: String,
    pub environment: String,
    pub identity: NodeIdentity,
    pub start_command: String,
    pub pointer_source: PointerSource,
}

/// Outcome of [`QuorumSynthesizer::reconcile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The static file differed from the desired one; the node needs a restart
    pub restart_required: bool,
    pub pointer_source: PointerSource,
    pub identity: NodeIdentity,
    pub wrote_dynamic_file: bool,
}

pub struct QuorumSynthesizer {
    store: Arc<dyn ConfigStore>,
    paths: ConfigPaths,
}

impl QuorumSynthesizer {
    pub fn new(store: Arc<dyn ConfigStore>, paths: ConfigPaths) -> Self {
        Self { store, paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Current `dynamicConfigFile` line for this node
    pub async fn dynamic_pointer(&self) -> DynamicConfigPointer {
        read_dynamic_pointer(self.store.as_ref(), &self.paths).await
    }

    /// Full property list, dynamic keys included
    pub async fn properties(&self, desired: &DesiredState) -> QuorumResult<PropertyList> {
        let pointer = self.dynamic_pointer().await;
        assemble(&desired.tuning, &desired.tls, desired.security, &self.paths, &pointer)
    }

    pub async fn static_properties(&self, desired: &DesiredState) -> QuorumResult<PropertyList> {
        Ok(self.properties(desired).await?.to_static())
    }

    /// Compute every artifact from the desired state and the deployed file
    pub fn artifacts(
        &self,
        desired: &DesiredState,
        pointer: &DynamicConfigPointer,
    ) -> QuorumResult<NodeArtifacts> {
        let properties = assemble(
            &desired.tuning,
            &desired.tls,
            desired.security,
            &self.paths,
            pointer,
        )?;
        let jaas = generate_auth(&desired.credentials, &desired.clients)?;
        let identity = desired.identity()?;

        Ok(NodeArtifacts {
            static_properties: properties.to_static(),
            properties,
            jaas,
            environment: launch::environment_line(&self.paths),
            identity,
            start_command: launch::start_command(&self.paths),
            pointer_source: pointer.source(),
        })
    }

    pub async fn write_static_properties(&self, properties: &PropertyList) -> QuorumResult<()> {
        self.store.push(&self.paths.properties, &properties.render()).await?;
        info!("Wrote static properties to {:?}", self.paths.properties);
        Ok(())
    }

    /// Persist the server connection strings supplied by the caller
    pub async fn write_dynamic_properties(&self, servers: &str) -> QuorumResult<()> {
        self.store.push(&self.paths.dynamic_properties, servers).await?;
        info!("Wrote dynamic properties to {:?}", self.paths.dynamic_properties);
        Ok(())
    }

    pub async fn write_jaas(&self, jaas: &str) -> QuorumResult<()> {
        self.store.push(&self.paths.jaas, jaas).await?;
        info!("Wrote JAAS config to {:?}", self.paths.jaas);
        Ok(())
    }

    pub async fn write_environment(&self) -> QuorumResult<()> {
        self.store
            .push(&self.paths.environment, &launch::environment_line(&self.paths))
            .await?;
        info!("Wrote JVM options to {:?}", self.paths.environment);
        Ok(())
    }

    pub async fn write_myid(&self, identity: NodeIdentity) -> QuorumResult<()> {
        self.store.push(&self.paths.myid, &identity.render()).await?;
        info!("Wrote myid {} to {:?}", identity, self.paths.myid);
        Ok(())
    }

    /// Run one reconciliation: read the deployed static file once, compute
    /// every artifact, then write them all.
    pub async fn reconcile(
        &self,
        desired: &DesiredState,
        servers: Option<&str>,
    ) -> QuorumResult<ReconcileReport> {
        let deployed = read_deployed_static(self.store.as_ref(), &self.paths).await;
        let artifacts = self.artifacts(desired, &deployed.pointer)?;

        let restart_required = match deployed.contents.as_deref() {
            Some(contents) => static_config_changed(contents, artifacts.static_properties.lines()),
            None => true,
        };

        self.write_static_properties(&artifacts.static_properties).await?;
        if let Some(servers) = servers {
            self.write_dynamic_properties(servers).await?;
        }
        self.write_jaas(&artifacts.jaas).await?;
        self.write_environment().await?;
        self.write_myid(artifacts.identity).await?;

        Ok(ReconcileReport {
            restart_required,
            pointer_source: artifacts.pointer_source,
            identity: artifacts.identity,
            wrote_dynamic_file: servers.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DesiredStateBuilder;
    use crate::continuity::DefaultReason;
    use crate::error::QuorumError;
    use crate::store::MockConfigStore;

    fn desired() -> DesiredState {
        DesiredStateBuilder::new()
            .data_dir("/srv/zk")
            .unit_name("zookeeper/1")
            .sync_password("sync")
            .super_password("super")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_reconcile_requires_restart() {
        let store = Arc::new(MockConfigStore::new());
        let state = desired();
        let synth = QuorumSynthesizer::new(store.clone(), state.paths());

        let report = synth.reconcile(&state, Some("server.1=a:2888:3888")).await.unwrap();
        assert!(report.restart_required);
        assert_eq!(report.pointer_source, PointerSource::Default(DefaultReason::FirstBoot));
        assert_eq!(report.identity.id(), 2);
        assert_eq!(store.contents(&synth.paths().myid).await.as_deref(), Some("2"));

        let again = synth.reconcile(&state, None).await.unwrap();
        assert!(!again.restart_required);
        assert_eq!(again.pointer_source, PointerSource::Deployed);
    }

    #[tokio::test]
    async fn test_missing_credentials_write_nothing() {
        let store = Arc::new(MockConfigStore::new());
        let mut state = desired();
        state.credentials.super_password = None;
        let synth = QuorumSynthesizer::new(store.clone(), state.paths());

        assert!(synth.reconcile(&state, None).await.is_err());
        assert!(store.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_tuning_writes_nothing() {
        let store = Arc::new(MockConfigStore::new());
        let mut state = desired();
        state.tuning.tick_time = 0;
        let synth = QuorumSynthesizer::new(store.clone(), state.paths());

        let err = synth
            .reconcile(&state, Some("server.1=a:2888:3888"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuorumError::InvalidConfig { .. }));
        assert!(store.paths().await.is_empty());
    }
}

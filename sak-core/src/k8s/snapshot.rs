use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use super::*;
use crate::errors::*;
use crate::prelude::*;

/// An immutable capture of one target fleet at a point in time: the product
/// pods, the deployment owning them, and the admin port.  Snapshots taken at
/// different times are only ever compared through their `TargetStatus`, never
/// merged; they hold no authority over the cluster objects they describe.
#[derive(Clone, Debug)]
pub struct TargetSnapshot {
    pods: Vec<corev1::Pod>,
    deployment: appsv1::Deployment,
    admin_port: i32,
}

impl TargetSnapshot {
    pub fn new(pods: Vec<corev1::Pod>, deployment: appsv1::Deployment, admin_port: i32) -> TargetSnapshot {
        TargetSnapshot { pods, deployment, admin_port }
    }

    pub fn pods(&self) -> &[corev1::Pod] {
        &self.pods
    }

    pub fn deployment_name(&self) -> String {
        self.deployment.name_any()
    }

    pub fn admin_port(&self) -> i32 {
        self.admin_port
    }

    /// Network endpoints of the admin interface on every pod in the fleet.
    pub fn admin_endpoints(&self) -> anyhow::Result<Vec<SocketAddr>> {
        // The port comes from cluster data or a CLI override, so it may not fit
        let port = u16::try_from(self.admin_port)?;
        self.pods
            .iter()
            .map(|pod| {
                let ip: IpAddr = pod.pod_ip()?.parse()?;
                Ok(SocketAddr::new(ip, port))
            })
            .collect()
    }

    /// Pure projection of the snapshot into its identity fingerprint; no I/O.
    /// Projecting the same snapshot twice always yields equal statuses.
    pub fn status(&self) -> anyhow::Result<TargetStatus> {
        let mut pod_restart_counts = BTreeMap::new();
        let mut pod_resource_versions = BTreeMap::new();

        for pod in &self.pods {
            let name = pod.name_any();
            let resource_version = pod
                .resource_version()
                .ok_or_else(|| SelectionError::field_not_found("pod resourceVersion"))?;

            pod_restart_counts.insert(name.clone(), pod.restart_count_sum());
            pod_resource_versions.insert(name, resource_version);
        }

        let deployment_resource_version = self
            .deployment
            .resource_version()
            .ok_or_else(|| SelectionError::field_not_found("deployment resourceVersion"))?;

        Ok(TargetStatus {
            pod_restart_counts,
            pod_resource_versions,
            deployment_resource_version,
        })
    }
}

/// Value fingerprint of a fleet's identity.  Structural equality between a
/// before-pause and an after-pause status is the sole oracle for "nothing
/// about the fleet changed while it was paused": a changed restart count means
/// a crash, a changed pod resource version means any pod mutation, a changed
/// deployment resource version means a rollout.  There are no tolerance
/// thresholds; any single differing, missing, or extra entry makes the
/// statuses unequal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetStatus {
    pub pod_restart_counts: BTreeMap<String, i32>,
    pub pod_resource_versions: BTreeMap<String, String>,
    pub deployment_resource_version: String,
}

use super::*;
use crate::errors::*;
use crate::prelude::*;

impl PodExt for corev1::Pod {
    fn app_label(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(APP_LABEL_KEY))
            .map(String::as_str)
    }

    fn pod_ip(&self) -> anyhow::Result<&str> {
        match self.status.as_ref().and_then(|status| status.pod_ip.as_deref()) {
            None => bail!(SelectionError::field_not_found("pod IP")),
            Some(ip) => Ok(ip),
        }
    }

    // A pod with no container statuses reported yet has trivially restarted zero times
    fn restart_count_sum(&self) -> i32 {
        self.status
            .as_ref()
            .and_then(|status| status.container_statuses.as_ref())
            .map(|containers| containers.iter().map(|c| c.restart_count).sum())
            .unwrap_or(0)
    }
}

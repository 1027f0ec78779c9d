use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ListParams;
use tracing::debug;

use super::*;
use crate::errors::*;
use crate::prelude::*;
use crate::product::Product;

/// Resolves a Helm release in one namespace into the fleet of Scalar product
/// pods it runs, the single deployment owning them, and the admin port to
/// contact them on.
///
/// Selection is deliberately not idempotent across calls in a live cluster:
/// two `select` calls can return different fleets, which is exactly what the
/// Pauser's before/after status comparison relies on.
pub struct TargetSelector {
    client: kube::Client,
    namespace: String,
    helm_release_name: String,
    product_hint: Option<Product>,
    admin_port_override: Option<i32>,
}

impl TargetSelector {
    pub fn new(client: kube::Client, namespace: &str, helm_release_name: &str) -> TargetSelector {
        TargetSelector::with_overrides(client, namespace, helm_release_name, None, None)
    }

    pub fn with_overrides(
        client: kube::Client,
        namespace: &str,
        helm_release_name: &str,
        product_hint: Option<Product>,
        admin_port_override: Option<i32>,
    ) -> TargetSelector {
        TargetSelector {
            client,
            namespace: namespace.into(),
            helm_release_name: helm_release_name.into(),
            product_hint,
            admin_port_override,
        }
    }

    pub async fn select(&self) -> anyhow::Result<TargetSnapshot> {
        let pods = self.find_release_pods().await?;
        let (product, pods) = self.select_product_pods(pods)?;
        debug!("release {} runs {product:?} on {} pod(s)", self.helm_release_name, pods.len());

        let deployment = self.find_deployment(product).await?;
        let admin_port = match self.admin_port_override {
            Some(port) => port,
            None => {
                let service = self.find_admin_service(product).await?;
                find_admin_port(&service, product)?
            },
        };

        Ok(TargetSnapshot::new(pods, deployment, admin_port))
    }

    async fn find_release_pods(&self) -> anyhow::Result<Vec<corev1::Pod>> {
        let pod_api = kube::Api::<corev1::Pod>::namespaced(self.client.clone(), &self.namespace);
        let pods = pod_api.list(&self.release_params(None)).await?.items;
        if pods.is_empty() {
            bail!(SelectionError::no_pods_found(&self.helm_release_name));
        }
        Ok(pods)
    }

    // The release must run exactly one product; without an explicit hint the
    // product is inferred from the first pod carrying a known app label.
    fn select_product_pods(&self, pods: Vec<corev1::Pod>) -> anyhow::Result<(Product, Vec<corev1::Pod>)> {
        let mut product = self.product_hint;
        let mut selected = vec![];

        for pod in pods {
            // Pods without a recognized product label (e.g., sidecars) are not part of the fleet
            let Some(pod_product) = pod.app_label().and_then(Product::from_app_label_value) else {
                continue;
            };

            match product {
                None => product = Some(pod_product),
                Some(p) if p != pod_product => {
                    bail!(SelectionError::mixed_products_found(&format!("{p:?} and {pod_product:?}")))
                },
                _ => (),
            }
            selected.push(pod);
        }

        match product {
            Some(p) if !selected.is_empty() => Ok((p, selected)),
            _ => bail!(SelectionError::no_product_pods_found(&self.helm_release_name)),
        }
    }

    async fn find_deployment(&self, product: Product) -> anyhow::Result<appsv1::Deployment> {
        let depl_api = kube::Api::<appsv1::Deployment>::namespaced(self.client.clone(), &self.namespace);
        let mut deployments = depl_api.list(&self.release_params(Some(product))).await?.items;

        match deployments.len() {
            0 => bail!(SelectionError::deployment_not_found(&self.helm_release_name)),
            1 => Ok(deployments.remove(0)),
            _ => bail!(SelectionError::ambiguous_deployment(&self.helm_release_name)),
        }
    }

    async fn find_admin_service(&self, product: Product) -> anyhow::Result<corev1::Service> {
        let svc_api = kube::Api::<corev1::Service>::namespaced(self.client.clone(), &self.namespace);
        let services = svc_api.list(&self.release_params(Some(product))).await?.items;

        let mut admin_services: Vec<_> = services
            .into_iter()
            .filter(|svc| svc.name_any().ends_with(ADMIN_SERVICE_NAME_SUFFIX))
            .collect();

        match admin_services.len() {
            0 => bail!(SelectionError::admin_service_not_found(&self.helm_release_name)),
            1 => Ok(admin_services.remove(0)),
            _ => bail!(SelectionError::ambiguous_admin_service(&self.helm_release_name)),
        }
    }

    fn release_params(&self, product: Option<Product>) -> ListParams {
        let mut selector = format!("{INSTANCE_LABEL_KEY}={}", self.helm_release_name);
        if let Some(p) = product {
            selector = format!("{selector},{APP_LABEL_KEY}={}", p.app_label_value());
        }
        ListParams::default().labels(&selector)
    }
}

// The admin port must be a literal numeric target port; a named port reference
// can't be turned into a pod endpoint without another resolution step.
fn find_admin_port(service: &corev1::Service, product: Product) -> anyhow::Result<i32> {
    let port_name = product.admin_port_name();
    let port = service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .and_then(|ports| ports.iter().find(|p| p.name.as_deref() == Some(port_name)))
        .ok_or_else(|| SelectionError::admin_port_not_found(&format!("{port_name} in service {}", service.name_any())))?;

    match &port.target_port {
        Some(IntOrString::Int(p)) => Ok(*p),
        Some(IntOrString::String(name)) => {
            bail!(SelectionError::admin_port_not_numeric(&format!("{name} in service {}", service.name_any())))
        },
        None => bail!(SelectionError::admin_port_not_found(&format!(
            "{port_name} in service {} has no target port",
            service.name_any()
        ))),
    }
}

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use rstest::fixture;
use sak_core::prelude::*;

use crate::constants::*;

pub fn release_labels(app_label: Option<&str>) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::from([(INSTANCE_LABEL_KEY.to_string(), TEST_RELEASE_NAME.to_string())]);
    if let Some(app) = app_label {
        labels.insert(APP_LABEL_KEY.to_string(), app.to_string());
    }
    labels
}

pub fn test_pod(name: &str, ip: &str, restart_count: i32, app_label: Option<&str>) -> corev1::Pod {
    corev1::Pod {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            resource_version: Some(format!("{name}-rv1")),
            labels: Some(release_labels(app_label)),
            ..Default::default()
        },
        status: Some(corev1::PodStatus {
            pod_ip: Some(ip.into()),
            container_statuses: Some(vec![corev1::ContainerStatus {
                name: "main".into(),
                restart_count,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[fixture]
pub fn test_fleet_pods() -> Vec<corev1::Pod> {
    vec![
        test_pod("scalardb-0", TEST_POD_IPS[0], 0, Some("scalardb")),
        test_pod("scalardb-1", TEST_POD_IPS[1], 0, Some("scalardb")),
    ]
}

#[fixture]
pub fn test_deployment(#[default(TEST_DEPLOYMENT)] name: &str) -> appsv1::Deployment {
    appsv1::Deployment {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            resource_version: Some("depl-rv1".into()),
            labels: Some(release_labels(Some("scalardb"))),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[fixture]
pub fn test_admin_service(#[default(TEST_ADMIN_SERVICE)] name: &str) -> corev1::Service {
    test_service(name, Some(("scalardb", TEST_ADMIN_PORT)))
}

pub fn test_service(name: &str, admin_port: Option<(&str, i32)>) -> corev1::Service {
    let ports = admin_port.map(|(port_name, port)| {
        vec![corev1::ServicePort {
            name: Some(port_name.into()),
            port,
            target_port: Some(IntOrString::Int(port)),
            ..Default::default()
        }]
    });

    corev1::Service {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            labels: Some(release_labels(Some("scalardb"))),
            ..Default::default()
        },
        spec: Some(corev1::ServiceSpec { ports, ..Default::default() }),
        ..Default::default()
    }
}

use assertables::*;

use super::*;

fn snapshot(pods: Vec<corev1::Pod>, deployment: appsv1::Deployment) -> TargetSnapshot {
    TargetSnapshot::new(pods, deployment, TEST_ADMIN_PORT)
}

#[rstest]
fn test_status_projection(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let status = snapshot(test_fleet_pods, test_deployment).status().unwrap();

    assert_eq!(status.pod_restart_counts["scalardb-0"], 0);
    assert_eq!(status.pod_restart_counts["scalardb-1"], 0);
    assert_eq!(status.pod_resource_versions["scalardb-0"], "scalardb-0-rv1");
    assert_eq!(status.deployment_resource_version, "depl-rv1");
}

#[rstest]
fn test_status_sums_restart_counts_across_containers(test_deployment: appsv1::Deployment) {
    let mut pod = test_pod("scalardb-0", TEST_POD_IPS[0], 1, Some("scalardb"));
    if let Some(status) = pod.status.as_mut()
        && let Some(containers) = status.container_statuses.as_mut()
    {
        containers.push(corev1::ContainerStatus {
            name: "secondary".into(),
            restart_count: 2,
            ..Default::default()
        });
    }

    let status = snapshot(vec![pod], test_deployment).status().unwrap();

    assert_eq!(status.pod_restart_counts["scalardb-0"], 3);
}

#[rstest]
fn test_status_projection_is_idempotent(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let target = snapshot(test_fleet_pods, test_deployment);

    assert_eq!(target.status().unwrap(), target.status().unwrap());
}

#[rstest]
fn test_status_detects_restart(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let before = snapshot(test_fleet_pods.clone(), test_deployment.clone());
    let mut pods = test_fleet_pods;
    pods[0].status.as_mut().unwrap().container_statuses.as_mut().unwrap()[0].restart_count += 1;
    let after = snapshot(pods, test_deployment);

    assert_ne!(before.status().unwrap(), after.status().unwrap());
}

#[rstest]
fn test_status_detects_pod_mutation(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let before = snapshot(test_fleet_pods.clone(), test_deployment.clone());
    let mut pods = test_fleet_pods;
    pods[1].metadata.resource_version = Some("scalardb-1-rv2".into());
    let after = snapshot(pods, test_deployment);

    assert_ne!(before.status().unwrap(), after.status().unwrap());
}

#[rstest]
fn test_status_detects_rollout(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let before = snapshot(test_fleet_pods.clone(), test_deployment.clone());
    let mut deployment = test_deployment;
    deployment.metadata.resource_version = Some("depl-rv2".into());
    let after = snapshot(test_fleet_pods, deployment);

    assert_ne!(before.status().unwrap(), after.status().unwrap());
}

#[rstest]
fn test_status_detects_missing_pod(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let before = snapshot(test_fleet_pods.clone(), test_deployment.clone());
    let mut pods = test_fleet_pods;
    pods.pop();
    let after = snapshot(pods, test_deployment);

    assert_ne!(before.status().unwrap(), after.status().unwrap());
}

#[rstest]
fn test_status_requires_resource_versions(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let mut pods = test_fleet_pods;
    pods[0].metadata.resource_version = None;

    let err = snapshot(pods, test_deployment).status().unwrap_err();

    assert_contains!(err.root_cause().to_string(), "field not found");
}

#[rstest]
#[case::too_big(65600)]
#[case::negative(-1)]
fn test_admin_endpoints_rejects_out_of_range_port(
    test_fleet_pods: Vec<corev1::Pod>,
    test_deployment: appsv1::Deployment,
    #[case] port: i32,
) {
    TargetSnapshot::new(test_fleet_pods, test_deployment, port)
        .admin_endpoints()
        .unwrap_err();
}

#[rstest]
fn test_admin_endpoints(test_fleet_pods: Vec<corev1::Pod>, test_deployment: appsv1::Deployment) {
    let endpoints = snapshot(test_fleet_pods, test_deployment).admin_endpoints().unwrap();

    let expected: Vec<String> = TEST_POD_IPS.iter().map(|ip| format!("{ip}:{TEST_ADMIN_PORT}")).collect();
    let actual: Vec<String> = endpoints.iter().map(|ep| ep.to_string()).collect();
    assert_eq!(actual, expected);
}

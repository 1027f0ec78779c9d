use httpmock::prelude::*;
use httpmock::{Mock, Then, When};
use sak_core::prelude::*;
use serde_json::json;

pub struct MockServerBuilder {
    server: MockServer,
    handlers: Vec<Box<dyn Fn(When, Then)>>,
    mock_ids: Vec<usize>,
}

fn print_req(req: &HttpMockRequest) -> bool {
    // Use println instead of info! so that this works outside of the lib crate
    println!("    Received: {} {}", req.method(), req.uri().path());
    true
}

impl MockServerBuilder {
    pub fn new() -> MockServerBuilder {
        MockServerBuilder {
            server: MockServer::start(),
            handlers: vec![],
            mock_ids: vec![],
        }
    }

    pub fn assert(&self) {
        for id in &self.mock_ids {
            println!("checking assertions for mock {id}");
            Mock::new(*id, &self.server).assert()
        }
    }

    pub fn handle<F: Fn(When, Then) + 'static>(&mut self, f: F) -> &mut Self {
        self.handlers.push(Box::new(move |w, t| {
            let w = w.matches(print_req);
            f(w, t);
        }));
        self
    }

    /// Serve one pod list for the release's instance-label query in a namespace.
    pub fn handle_pod_list(&mut self, namespace: &str, selector: String, pods: Vec<corev1::Pod>) -> &mut Self {
        let path = format!("/api/v1/namespaces/{namespace}/pods");
        self.handle(move |when, then| {
            when.method(GET).path(&path).query_param("labelSelector", &selector);
            then.json_body(pod_list_body(&pods));
        })
    }

    pub fn handle_deployment_list(
        &mut self,
        namespace: &str,
        selector: String,
        deployments: Vec<appsv1::Deployment>,
    ) -> &mut Self {
        let path = format!("/apis/apps/v1/namespaces/{namespace}/deployments");
        self.handle(move |when, then| {
            when.method(GET).path(&path).query_param("labelSelector", &selector);
            then.json_body(deployment_list_body(&deployments));
        })
    }

    pub fn handle_service_list(
        &mut self,
        namespace: &str,
        selector: String,
        services: Vec<corev1::Service>,
    ) -> &mut Self {
        let path = format!("/api/v1/namespaces/{namespace}/services");
        self.handle(move |when, then| {
            when.method(GET).path(&path).query_param("labelSelector", &selector);
            then.json_body(service_list_body(&services));
        })
    }

    pub fn build(&mut self) {
        for f in self.handlers.iter() {
            self.mock_ids.push(self.server.mock(f).id);
        }

        // Print all unmatched/unhandled requests for easier debugging;
        // this has to go last so that the other mock rules have a chance
        // to match first
        self.server.mock(|when, _| {
            when.matches(print_req);
        });
    }

    pub fn url(&self) -> http::Uri {
        http::Uri::try_from(self.server.url("/")).unwrap()
    }
}

pub fn make_fake_apiserver() -> (MockServerBuilder, kube::Client) {
    let builder = MockServerBuilder::new();
    let config = kube::Config::new(builder.url());
    let client = kube::Client::try_from(config).unwrap();
    (builder, client)
}

pub fn pod_list_body(pods: &[corev1::Pod]) -> serde_json::Value {
    json!({"kind": "PodList", "apiVersion": "v1", "metadata": {}, "items": pods})
}

pub fn deployment_list_body(deployments: &[appsv1::Deployment]) -> serde_json::Value {
    json!({"kind": "DeploymentList", "apiVersion": "apps/v1", "metadata": {}, "items": deployments})
}

pub fn service_list_body(services: &[corev1::Service]) -> serde_json::Value {
    json!({"kind": "ServiceList", "apiVersion": "v1", "metadata": {}, "items": services})
}

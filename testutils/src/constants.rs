pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_RELEASE_NAME: &str = "test-release";
pub const TEST_DEPLOYMENT: &str = "test-release-scalardb";
pub const TEST_ADMIN_SERVICE: &str = "test-release-scalardb-headless";
pub const TEST_ADMIN_PORT: i32 = 60051;
pub const TEST_POD_IPS: [&str; 2] = ["10.244.0.10", "10.244.0.11"];

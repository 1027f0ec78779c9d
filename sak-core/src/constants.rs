// Well-known labels that Scalar Helm Charts attach to every resource they create
pub const INSTANCE_LABEL_KEY: &str = "app.kubernetes.io/instance";
pub const APP_LABEL_KEY: &str = "app.kubernetes.io/app";

// Naming convention for the service that exposes the Scalar Admin interface
pub const ADMIN_SERVICE_NAME_SUFFIX: &str = "-headless";

// Scalar Admin interface endpoints
pub const ADMIN_PAUSE_PATH: &str = "/admin/pause";
pub const ADMIN_UNPAUSE_PATH: &str = "/admin/unpause";

// The fleet must never be left paused, so unpause gets a retry budget
pub const MAX_UNPAUSE_RETRY_COUNT: usize = 3;

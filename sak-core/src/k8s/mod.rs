mod pod_ext;
mod selector;
mod snapshot;

pub use selector::*;
pub use snapshot::*;

use crate::errors::*;

err_impl! {SelectionError,
    #[error("Helm release {0} didn't create any pod")]
    NoPodsFound(String),

    #[error("the pods created by the Helm release run different Scalar products: {0}")]
    MixedProductsFound(String),

    #[error("the pods created by the Helm release {0} don't run any Scalar product")]
    NoProductPodsFound(String),

    #[error("Helm release {0} didn't create any deployment")]
    DeploymentNotFound(String),

    #[error("Helm release {0} created more than one deployment")]
    AmbiguousDeployment(String),

    #[error("Helm release {0} didn't create any service that runs the Scalar Admin interface")]
    AdminServiceNotFound(String),

    #[error("Helm release {0} created more than one service that runs the Scalar Admin interface")]
    AmbiguousAdminService(String),

    #[error("can not find the admin port {0}")]
    AdminPortNotFound(String),

    #[error("the admin port uses a named target port: {0}")]
    AdminPortNotNumeric(String),

    #[error("field not found in struct: {0}")]
    FieldNotFound(String),
}

// Accessors for the pod fields the selector and the status fingerprint rely on
pub trait PodExt {
    fn app_label(&self) -> Option<&str>;
    fn pod_ip(&self) -> anyhow::Result<&str>;
    fn restart_count_sum(&self) -> i32;
}

#[cfg(test)]
pub mod tests;

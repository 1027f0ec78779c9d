use std::str::FromStr;

use crate::errors::*;

/// The Scalar products a Helm release can run.  The catalog is closed: a pod
/// whose app label matches none of these values is not part of any target
/// fleet (sidecars and other co-located workloads fall in this bucket).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Product {
    ScalarDb,
    ScalarDbCluster,
    ScalarDlLedger,
    ScalarDlAuditor,
}

impl Product {
    pub const ALL: [Product; 4] = [
        Product::ScalarDb,
        Product::ScalarDbCluster,
        Product::ScalarDlLedger,
        Product::ScalarDlAuditor,
    ];

    /// Value of the `app.kubernetes.io/app` label Scalar Helm Charts attach to
    /// the pods running this product.
    pub fn app_label_value(self) -> &'static str {
        match self {
            Product::ScalarDb => "scalardb",
            Product::ScalarDbCluster => "scalardb-cluster",
            Product::ScalarDlLedger => "ledger",
            Product::ScalarDlAuditor => "auditor",
        }
    }

    /// Name of the admin port in the product's headless service.
    pub fn admin_port_name(self) -> &'static str {
        match self {
            Product::ScalarDb => "scalardb",
            Product::ScalarDbCluster => "scalardb-cluster",
            Product::ScalarDlLedger => "scalardl-admin",
            Product::ScalarDlAuditor => "scalardl-auditor-admin",
        }
    }

    pub fn from_app_label_value(value: &str) -> Option<Product> {
        Product::ALL.into_iter().find(|p| p.app_label_value() == value)
    }
}

impl FromStr for Product {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Product> {
        Product::from_app_label_value(value).ok_or_else(|| anyhow!("unknown Scalar product: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_lookup_round_trips() {
        for product in Product::ALL {
            assert_eq!(Product::from_app_label_value(product.app_label_value()), Some(product));
        }
    }

    #[test]
    fn test_unknown_label_is_no_product() {
        assert_eq!(Product::from_app_label_value("envoy"), None);
        assert_eq!(Product::from_app_label_value(""), None);
    }
}

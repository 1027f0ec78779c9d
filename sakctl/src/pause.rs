use std::fs;

use chrono::{
    DateTime,
    Utc,
};
use chrono_tz::Tz;
use sak_core::admin::TlsOptions;
use sak_core::pauser::{
    PausedDuration,
    Pauser,
    PauserConfig,
};
use sak_core::prelude::*;
use sak_core::product::Product;
use serde::Serialize;
use tracing::error;

#[derive(clap::Args)]
pub struct Args {
    #[arg(
        short,
        long,
        default_value = "default",
        long_help = "namespace the Scalar products to pause are deployed in"
    )]
    pub namespace: String,

    #[arg(
        short = 'r',
        long,
        long_help = "name of the Helm release the Scalar products were installed with \
                     (you can look it up with the `helm list` command)"
    )]
    pub release_name: String,

    #[arg(
        short = 'd',
        long,
        default_value_t = 5000,
        long_help = "duration of the pause period in milliseconds"
    )]
    pub pause_duration: i64,

    #[arg(
        short = 'w',
        long,
        long_help = "max wait time (in milliseconds) for the products to drain outstanding \
                     requests before they pause; if omitted, the products' built-in default \
                     applies (30 seconds for most of them)"
    )]
    pub max_pause_wait_time: Option<i64>,

    #[arg(
        short = 'z',
        long,
        default_value = "Etc/UTC",
        long_help = "time zone ID used to render the paused period, e.g. Asia/Tokyo; \
                     note that time zone IDs are case sensitive"
    )]
    pub time_zone: Tz,

    #[arg(long, long_help = "only target pods running this Scalar product (by its app label value)")]
    pub product: Option<Product>,

    #[arg(long, long_help = "admin port to use, skipping the headless-service port lookup")]
    pub admin_port: Option<i32>,

    #[arg(long, long_help = "enable wire encryption (TLS) towards the products' admin interface")]
    pub tls: bool,

    #[arg(
        long,
        long_help = "path to a root certificate file for verifying the server's certificate \
                     when wire encryption is enabled"
    )]
    pub ca_root_cert_path: Option<String>,

    #[arg(
        long,
        long_help = "PEM-format string of a root certificate for verifying the server's \
                     certificate when wire encryption is enabled; takes precedence over \
                     --ca-root-cert-path"
    )]
    pub ca_root_cert_pem: Option<String>,

    #[arg(
        long,
        long_help = "value to expect as the authority in the server's certificate when wire \
                     encryption is enabled"
    )]
    pub override_authority: Option<String>,
}

/// The report printed (as JSON) after a fully successful pause cycle; its
/// timestamps delimit the window a backup can safely be taken from.
#[derive(Debug, Serialize)]
pub struct PauseResult {
    pub namespace: String,
    pub helm_release_name: String,
    pub pause_start_timestamp_ms: i64,
    pub pause_end_timestamp_ms: i64,
    pub pause_start_date_time: String,
    pub pause_end_date_time: String,
    pub timezone: String,
}

impl PauseResult {
    pub fn new(namespace: &str, helm_release_name: &str, duration: &PausedDuration, tz: Tz) -> PauseResult {
        PauseResult {
            namespace: namespace.into(),
            helm_release_name: helm_release_name.into(),
            pause_start_timestamp_ms: duration.start_time().timestamp_millis(),
            pause_end_timestamp_ms: duration.end_time().timestamp_millis(),
            pause_start_date_time: local_date_time(duration.start_time(), tz),
            pause_end_date_time: local_date_time(duration.end_time(), tz),
            timezone: tz.to_string(),
        }
    }
}

fn local_date_time(t: DateTime<Utc>, tz: Tz) -> String {
    t.with_timezone(&tz).naive_local().format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

fn read_ca_root_cert(pem: Option<&str>, path: Option<&str>) -> anyhow::Result<Option<String>> {
    match (pem, path) {
        // Shells tend to mangle literal newlines, so the PEM option accepts
        // them escaped
        (Some(pem), _) => Ok(Some(pem.replace("\\n", "\n"))),
        (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
        (None, None) => Ok(None),
    }
}

pub async fn cmd(args: &Args, client: kube::Client) -> EmptyResult {
    let tls = if args.tls {
        Some(TlsOptions {
            ca_root_cert_pem: read_ca_root_cert(args.ca_root_cert_pem.as_deref(), args.ca_root_cert_path.as_deref())?,
            override_authority: args.override_authority.clone(),
        })
    } else {
        None
    };

    let pauser = Pauser::new(client, PauserConfig {
        namespace: args.namespace.clone(),
        helm_release_name: args.release_name.clone(),
        product_hint: args.product,
        admin_port_override: args.admin_port,
        tls,
    })?;

    match pauser.pause(args.pause_duration, args.max_pause_wait_time).await {
        Ok(duration) => {
            let result = PauseResult::new(&args.namespace, &args.release_name, &duration, args.time_zone);
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        },
        Err(err) => {
            for secondary in &err.secondary {
                error!("also observed during this run: {secondary:#}");
            }
            Err(err.into())
        },
    }
}

mod pause;

use clap::{
    crate_version,
    Parser,
    Subcommand,
};
use sak_core::logging;
use sak_core::prelude::*;

#[derive(Parser)]
#[command(
    about = "command-line tool for safely pausing Scalar products running in Kubernetes",
    version,
    propagate_version = true
)]
struct SakCommandRoot {
    #[command(subcommand)]
    subcommand: SakSubcommand,

    #[arg(short, long, default_value = "warn")]
    verbosity: String,
}

#[derive(Subcommand)]
enum SakSubcommand {
    #[command(about = "pause the Scalar products installed by a Helm release", visible_alias = "p")]
    Pause(pause::Args),

    #[command(about = "sakctl version")]
    Version,
}

#[tokio::main]
async fn main() -> EmptyResult {
    let args = SakCommandRoot::parse();
    logging::setup_for_cli(&args.verbosity);

    // The version subcommand shouldn't fail just because no kubeconfig is
    // around, so the kube client is only constructed where it's needed.
    match &args.subcommand {
        SakSubcommand::Pause(args) => {
            let client = kube::Client::try_default().await?;
            pause::cmd(args, client).await
        },
        SakSubcommand::Version => {
            println!("sakctl {}", crate_version!());
            Ok(())
        },
    }
}

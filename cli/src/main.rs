use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use s3pd_core::client::s3::S3ClientFactory;
use s3pd_core::config::Config;
use s3pd_core::logging::Logger;
use s3pd_core::orchestrator;
use s3pd_core::uri::parse_s3_uri;

/// Bulk-mirrors an S3-compatible bucket prefix to a local directory tree.
#[derive(Parser)]
#[command(about = "Mirror an S3-compatible bucket prefix to a local directory tree.")]
struct Args {
    /// `s3://<bucket>[/<prefix>]`
    #[arg(value_name = "source")]
    source: String,

    /// Local directory to mirror into; created on demand.
    #[arg(value_name = "destination")]
    destination: PathBuf,

    /// Object-store region.
    #[arg(long)]
    region: Option<String>,

    /// Per-client throughput target hint, in Gbps.
    #[arg(long, default_value_t = 5)]
    throughput_target: u32,

    /// Range size for per-object parallel GET, in bytes.
    #[arg(long, default_value_t = 8 * 1024 * 1024)]
    part_size: u64,

    /// Maximum in-flight GETs per worker.
    #[arg(long, default_value_t = 10)]
    concurrent_downloads: usize,

    /// Comma-separated network interface names; empty means default route.
    #[arg(long, value_delimiter = ',', default_value = "")]
    interfaces: Vec<String>,

    /// Use HTTPS (vs HTTP).
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    https: bool,

    /// Discard downloaded bytes instead of writing them.
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    benchmark: bool,

    /// Debug output (-vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let logger = Arc::new(Logger::new(args.verbose));

    let uri = match parse_s3_uri(&args.source) {
        Ok(uri) => uri,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let interfaces: Vec<String> = args.interfaces.into_iter().filter(|s| !s.is_empty()).collect();

    let config = Config {
        bucket: uri.bucket,
        prefix: uri.prefix,
        destination: args.destination,
        region: args.region,
        https: args.https,
        throughput_target_gbps: args.throughput_target,
        part_size: args.part_size,
        concurrent_downloads: args.concurrent_downloads,
        interfaces,
        benchmark: args.benchmark,
        output_every_secs: 1,
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.destination).await {
        logger.error(&format!("failed to create destination directory: {e}"));
        std::process::exit(1);
    }

    logger.info(&format!(
        "starting mirror of s3://{}/{} to {}",
        config.bucket,
        config.prefix,
        config.destination.display()
    ));

    let factory = Arc::new(S3ClientFactory::new(config.clone()));
    let report = orchestrator::run(Arc::new(config), factory, logger).await;

    std::process::exit(if report.success { 0 } else { 1 });
}

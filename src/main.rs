use sitegen::{
    args::parse_args,
    build_site,
    error::error_chain,
    io::init_logging,
    SiteConfig,
};
use tracing::{error, info};

fn main() {
    let args = parse_args();
    init_logging(args.verbose);

    let result = SiteConfig::from_args(&args).and_then(|config| {
        info!("Content directory: {}", config.content_dir.display());
        info!("Output directory: {}", config.output_dir.display());
        build_site(&config)
    });

    match result {
        Ok(report) => {
            info!(
                "Done: {} pages written, {} files skipped, {} stale pages removed",
                report.pages, report.skipped, report.removed
            );
        }
        Err(err) => {
            for (i, message) in error_chain(&err).iter().enumerate() {
                if i == 0 {
                    error!("{}", message);
                } else {
                    error!("  caused by: {}", message);
                }
            }
            std::process::exit(1);
        }
    }
}

//! Compress command implementation.

use crate::cli::CompressArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use log::debug;
use zipvault_core::ArchiveService;
use zipvault_core::CompressionConfig;
use zipvault_core::ExtractionConfig;
use zipvault_core::NoopProgress;

pub fn execute(
    args: &CompressArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    if args.password.password.is_some() {
        formatter.format_warning(
            "--password is visible in process listings; prefer --password-env",
        );
    }
    let password = args.password.resolve()?;
    debug!(
        "compressing {} into {} (encrypted: {})",
        args.source.display(),
        args.output.display(),
        password.is_some()
    );

    let mut config = CompressionConfig::default()
        .with_follow_symlinks(args.follow_symlinks)
        .with_include_hidden(!args.exclude_hidden);
    if let Some(level) = args.level {
        config = config.with_compression_level(level);
    }

    let service = ArchiveService::with_config(config, ExtractionConfig::default());

    let report = if show_progress && CliProgress::should_show() {
        let mut progress = CliProgress::new("Compressing");
        add_archive_context(
            service.compress_with_progress(&args.source, &args.output, password, &mut progress),
            &args.output,
        )?
    } else {
        add_archive_context(
            service.compress_with_progress(
                &args.source,
                &args.output,
                password,
                &mut NoopProgress,
            ),
            &args.output,
        )?
    };

    formatter.format_creation_result(&args.output, &report)
}

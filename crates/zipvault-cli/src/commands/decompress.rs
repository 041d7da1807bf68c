//! Decompress command implementation.

use crate::cli::DecompressArgs;
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
    args: &DecompressArgs,
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
        "decompressing {} into {} (overwrite: {})",
        args.archive.display(),
        args.output_dir.display(),
        !args.no_overwrite
    );

    let config = ExtractionConfig::default()
        .with_overwrite(!args.no_overwrite)
        .with_preserve_permissions(args.preserve_permissions);
    let service = ArchiveService::with_config(CompressionConfig::default(), config);

    let report = if show_progress && CliProgress::should_show() {
        let mut progress = CliProgress::new("Extracting");
        add_archive_context(
            service.decompress_with_progress(
                &args.archive,
                &args.output_dir,
                password,
                &mut progress,
            ),
            &args.archive,
        )?
    } else {
        add_archive_context(
            service.decompress_with_progress(
                &args.archive,
                &args.output_dir,
                password,
                &mut NoopProgress,
            ),
            &args.archive,
        )?
    };

    formatter.format_extraction_result(&args.output_dir, &report)
}

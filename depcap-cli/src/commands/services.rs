//! `depcap services` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use depcap_analyzer::{ArchiveLimits, JarArchive, ServiceLoaderScanner};
use depcap_core::capability::ServiceLoaderCapability;
use depcap_core::config::DepcapConfig;

use crate::cli::ServicesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `services` command.
///
/// Runs only the service-provider scanner over each archive. An archive that
/// cannot be read is reported in its entry instead of aborting the command.
pub async fn execute(
    args: ServicesArgs,
    config: &DepcapConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let limits = ArchiveLimits {
        max_archive_size: config.analyzer.max_archive_size,
        max_entry_size: config.analyzer.max_entry_size,
    };

    info!(archives = args.archives.len(), "listing service providers");

    let archives = args.archives;
    let entries = tokio::task::spawn_blocking(move || {
        archives
            .into_iter()
            .map(|path| scan_archive(path, limits))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| CliError::Command(format!("service scan task failed: {}", e)))?;

    writer.render(&ServicesReport { archives: entries })?;

    Ok(())
}

fn scan_archive(path: PathBuf, limits: ArchiveLimits) -> ArchiveServices {
    let result = JarArchive::open(&path, limits)
        .and_then(|mut archive| ServiceLoaderScanner.find(&mut archive));

    match result {
        Ok(services) => ArchiveServices {
            archive: path.display().to_string(),
            services,
            error: None,
        },
        Err(e) => {
            warn!(archive = %path.display(), error = %e, "cannot read service descriptors");
            ArchiveServices {
                archive: path.display().to_string(),
                services: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Service descriptors found in a set of archives.
#[derive(Serialize)]
pub struct ServicesReport {
    pub archives: Vec<ArchiveServices>,
}

/// Service descriptors of a single archive.
#[derive(Serialize)]
pub struct ArchiveServices {
    pub archive: String,
    pub services: Vec<ServiceLoaderCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for ServicesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for entry in &self.archives {
            writeln!(w, "{}", entry.archive.bold())?;

            if let Some(ref error) = entry.error {
                writeln!(w, "  {} {}", "error:".red().bold(), error)?;
                continue;
            }
            if entry.services.is_empty() {
                writeln!(w, "  {}", "no service providers".dimmed())?;
                continue;
            }
            for service in &entry.services {
                writeln!(w, "  {}", service.provider_file.cyan())?;
                for class in &service.provider_classes {
                    writeln!(w, "    {}", class)?;
                }
            }
        }

        Ok(())
    }
}

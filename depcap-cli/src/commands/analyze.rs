//! `depcap analyze` command handler

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use depcap_analyzer::{AnalysisReport, AnalyzerConfig, ArtifactAnalyzer, GraphExport};
use depcap_core::capability::Capability;
use depcap_core::config::DepcapConfig;

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analyze` command.
///
/// Reads the graph export, resolves every selected component and scans its
/// artifacts. Per-artifact scan failures are reported as warnings and do not
/// fail the command; an unsupported dependency reference does.
pub async fn execute(
    args: AnalyzeArgs,
    config: &DepcapConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(&args.graph).await?;
    let graph = GraphExport::from_json(&content).map_err(|e| {
        CliError::Command(format!(
            "invalid graph export {}: {}",
            args.graph.display(),
            e
        ))
    })?;

    let analyzer = Arc::new(
        ArtifactAnalyzer::builder()
            .config(AnalyzerConfig::from_core(config))
            .build()?,
    );

    info!(
        graph = %args.graph.display(),
        scanners = ?analyzer.scanner_names(),
        "starting dependency analysis"
    );

    let report = analyzer.analyze_graph(&graph).await?;

    info!(
        dependencies = report.summary.dependencies,
        artifacts = report.summary.artifacts,
        failures = report.summary.failures,
        "dependency analysis complete"
    );

    writer.render(&AnalyzeReport {
        graph: args.graph.display().to_string(),
        report,
    })?;

    Ok(())
}

/// Analysis output payload.
#[derive(Serialize)]
pub struct AnalyzeReport {
    /// Graph export file path
    pub graph: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let summary = &self.report.summary;
        writeln!(w, "Dependency Analysis: {}", self.graph.bold())?;
        writeln!(
            w,
            "  Dependencies: {}  Artifacts: {}  Failures: {}",
            summary.dependencies, summary.artifacts, summary.failures
        )?;

        if !summary.capabilities.is_empty() {
            let counts: Vec<String> = summary
                .capabilities
                .iter()
                .map(|(label, count)| format!("{label}={count}"))
                .collect();
            writeln!(w, "  Capabilities: {}", counts.join(" "))?;
        }

        for record in &self.report.records {
            writeln!(w)?;
            let mut flags = Vec::new();
            if record.declared {
                flags.push("declared");
            }
            if record.is_platform {
                flags.push("platform");
            }
            if flags.is_empty() {
                writeln!(w, "{}", record.coordinates.to_string().bold())?;
            } else {
                writeln!(
                    w,
                    "{} ({})",
                    record.coordinates.to_string().bold(),
                    flags.join(", ")
                )?;
            }

            if record.capabilities.is_empty() {
                writeln!(w, "  {}", "no capabilities".dimmed())?;
            }
            for capability in record.capabilities.iter() {
                writeln!(
                    w,
                    "  {:<16} {}",
                    capability.kind().label().cyan(),
                    describe(capability)
                )?;
            }

            for failure in &record.failures {
                let scanner = failure.scanner.as_deref().unwrap_or("archive");
                writeln!(
                    w,
                    "  {} {} [{}]: {}",
                    "warning:".yellow().bold(),
                    failure.artifact.display(),
                    scanner,
                    failure.reason
                )?;
            }
        }

        Ok(())
    }
}

/// One-line description of a capability for text output.
fn describe(capability: &Capability) -> String {
    match capability {
        Capability::AndroidLinter(c) if c.is_lint_jar => format!("{} (lint jar)", c.lint_registry),
        Capability::AndroidLinter(c) => c.lint_registry.clone(),
        Capability::AndroidManifest(c) => {
            let components: usize = c.component_map.values().map(|names| names.len()).sum();
            format!("{} ({} components)", c.package_name, components)
        }
        Capability::AndroidRes(c) => format!("{} ({} lines)", c.r_import, c.lines.len()),
        Capability::AnnotationProcessor(c) => c.processor.clone(),
        Capability::Class(c) => format!("{} classes", c.classes.len()),
        Capability::Constant(c) => {
            let fields: usize = c.constants.values().map(|f| f.len()).sum();
            format!("{} constants in {} classes", fields, c.constants.len())
        }
        Capability::Inferred(c) => {
            format!("compile-only annotations: {}", c.is_compile_only_annotations)
        }
        Capability::InlineMember(c) => format!("{} packages", c.inline_members.len()),
        Capability::NativeLib(c) => join(c.file_names.iter()),
        Capability::SecurityProvider(c) => join(c.security_providers.iter()),
        Capability::ServiceLoader(c) => format!(
            "{} -> {}",
            c.provider_file,
            join(c.provider_classes.iter())
        ),
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

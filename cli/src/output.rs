use console::{style, Style, Term};
use dsbench::config::OutputFormat as ConfigOutputFormat;
use dsbench::registry::BackendDescriptor;
use dsbench::{BatchReport, BenchConfig, RunReport, TraceEvent};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Raw,
}

impl From<ConfigOutputFormat> for OutputFormat {
    fn from(format: ConfigOutputFormat) -> Self {
        match format {
            ConfigOutputFormat::Table => OutputFormat::Table,
            ConfigOutputFormat::Json => OutputFormat::Json,
            ConfigOutputFormat::Raw => OutputFormat::Raw,
        }
    }
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    batch: &'a BatchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [TraceEvent]>,
}

#[derive(Serialize)]
struct DescriptorOutput {
    index: usize,
    name: &'static str,
    kind: dsbench::BackendKind,
}

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    /// Colors only when stdout is a terminal that supports them.
    pub fn detect(format: OutputFormat, no_color: bool) -> Self {
        let colored = !no_color && Term::stdout().features().colors_supported();
        Self::new(format, colored)
    }

    pub fn print_batch(&self, batch: &BatchReport, trace: Option<&[TraceEvent]>) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let out = BatchOutput { batch, trace };
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Table => {
                self.print_batch_table(batch);
                if let Some(events) = trace {
                    println!();
                    self.print_trace_lines(events);
                }
            }
            OutputFormat::Raw => {
                if let Some(events) = trace {
                    self.print_trace_lines(events);
                }
                for report in &batch.reports {
                    println!("{} {} status={}", report.name, report.state, report.status);
                }
            }
        }
        Ok(())
    }

    pub fn print_descriptors(&self, descriptors: &[BackendDescriptor]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<_> = descriptors
                    .iter()
                    .map(|d| DescriptorOutput {
                        index: d.kind.index(),
                        name: d.name,
                        kind: d.kind,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table => {
                self.print_header(&format!("{:<6} {:<8} {}", "INDEX", "NAME", "KIND"));
                for d in descriptors {
                    println!("{:<6} {:<8} {:?}", d.kind.index(), d.name, d.kind);
                }
            }
            OutputFormat::Raw => {
                for d in descriptors {
                    println!("{} {}", d.kind.index(), d.name);
                }
            }
        }
        Ok(())
    }

    pub fn print_config(&self, config: &BenchConfig) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Table | OutputFormat::Raw => print!("{}", config.to_toml()?),
        }
        Ok(())
    }

    pub fn print_success(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("✓").green().bold(), message);
        } else {
            println!("✓ {}", message);
        }
    }

    fn print_header(&self, header: &str) {
        if self.colored {
            println!("{}", style(header).bold().underlined());
        } else {
            println!("{}", header);
        }
    }

    fn print_batch_table(&self, batch: &BatchReport) {
        self.print_header(&format!(
            "{:<8} {:<10} {:>9} {:>9} {:>7} {:>10}  {}",
            "BACKEND", "STATE", "POPULATED", "REMAINING", "STATUS", "TIME(us)", "ERRORS"
        ));
        for report in &batch.reports {
            self.print_report_row(report);
        }

        println!();
        if let Some(standalone) = &batch.standalone {
            println!("standalone list: {}", standalone);
        }
        let summary = format!(
            "{} backends, {} passed, {} failed (count {})",
            batch.reports.len(),
            batch.passed,
            batch.failed,
            batch.count
        );
        if self.colored {
            let color = if batch.all_passed() {
                Style::new().green()
            } else {
                Style::new().yellow()
            };
            println!("{}", color.apply_to(summary));
        } else {
            println!("{}", summary);
        }
    }

    fn print_report_row(&self, report: &RunReport) {
        let errors: Vec<String> = [
            ("init", &report.initialize),
            ("populate", &report.populate),
            ("drain", &report.drain),
        ]
        .iter()
        .filter(|(_, outcome)| !outcome.is_ok())
        .map(|(phase, outcome)| format!("{}: {}", phase, outcome))
        .collect();

        let status = format!("{:>7}", report.status);
        let status = if !self.colored {
            status
        } else if report.passed() {
            style(status).green().to_string()
        } else {
            style(status).red().bold().to_string()
        };

        println!(
            "{:<8} {:<10} {:>9} {:>9} {} {:>10}  {}",
            report.name,
            report.state.to_string(),
            report.populated,
            report.remaining,
            status,
            report.timings.total().as_micros(),
            errors.join("; ")
        );
    }

    fn print_trace_lines(&self, events: &[TraceEvent]) {
        for event in events {
            if self.colored {
                println!("{}", style(event).dim());
            } else {
                println!("{}", event);
            }
        }
    }
}

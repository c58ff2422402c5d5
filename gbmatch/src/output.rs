//! Mismatch table and diagnostic reporting
//!
//! Mismatch rows go to one writer (stdout in the binary) as TSV; diagnostics
//! go to another (stderr) so they never disturb the table columns.

use gbmatch_common::{Diagnostic, MismatchRecord, RunStatistics};
use std::io::{self, Write};

/// Column names of the mismatch table
pub const HEADER: [&str; 3] = ["inat_id", "genbank_name", "inat_name"];

/// TSV writer that emits the header just before the first row
pub struct TsvWriter<W: Write> {
    out: W,
    header_written: bool,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    pub fn write_row(&mut self, row: &MismatchRecord) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "{}", HEADER.join("\t"))?;
            self.header_written = true;
        }
        writeln!(
            self.out,
            "{}\t{}\t{}",
            row.id,
            cell(&row.accession_display),
            cell(&row.comparison_display)
        )?;
        self.out.flush()
    }

    pub fn rows_started(&self) -> bool {
        self.header_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Tabs and newlines inside a name would shift the columns
fn cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Diagnostic printer honoring quiet mode
pub struct DiagnosticReporter<W: Write> {
    out: W,
    quiet: bool,
}

impl<W: Write> DiagnosticReporter<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet }
    }

    /// Whether this diagnostic is printed at the current verbosity
    pub fn should_report(&self, diagnostic: &Diagnostic) -> bool {
        !self.quiet || diagnostic.kind.shown_when_quiet()
    }

    pub fn report(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        if self.should_report(diagnostic) {
            writeln!(self.out, "{}", diagnostic)?;
        }
        Ok(())
    }

    pub fn summary(&mut self, stats: &RunStatistics) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(
            self.out,
            "Processed {} specimens with {} external calls: {} mismatches, {} suppressed, {} skipped",
            stats.total_specimens_processed,
            stats.total_external_calls,
            stats.mismatches,
            stats.suppressed,
            stats.skipped
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

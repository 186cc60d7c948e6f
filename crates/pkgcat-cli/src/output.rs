//! Human-readable rendering of core events and reports.

use chrono::{DateTime, Local};
use pkgcat_core::{FileStamp, IndexEvent, IndexReport, IndexReporter, PackageListing, RepoStatus};
use std::cell::RefCell;
use std::io::{self, Write};

/// Prints index progress line by line.
///
/// ```text
/// [ alpha ]
///   + new/file.txt
///   . changed.txt
///   - removed.txt
/// ```
///
/// The first write error stops further output and is returned by
/// [`LineReporter::finish`].
pub struct LineReporter<W: Write> {
    out: RefCell<W>,
    /// Also print packages that had nothing to do.
    show_clean: bool,
    error: RefCell<Option<io::Error>>,
}

impl LineReporter<io::Stdout> {
    pub fn stdout(show_clean: bool) -> Self {
        Self::new(io::stdout(), show_clean)
    }
}

impl<W: Write> LineReporter<W> {
    pub fn new(out: W, show_clean: bool) -> Self {
        Self {
            out: RefCell::new(out),
            show_clean,
            error: RefCell::new(None),
        }
    }

    fn line(&self, text: std::fmt::Arguments<'_>) {
        if self.error.borrow().is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out.borrow_mut(), "{text}") {
            *self.error.borrow_mut() = Some(e);
        }
    }

    /// Flush and surface the first write error, if any.
    pub fn finish(self) -> io::Result<W> {
        if let Some(e) = self.error.into_inner() {
            return Err(e);
        }
        let mut out = self.out.into_inner();
        out.flush()?;
        Ok(out)
    }
}

impl<W: Write> IndexReporter for LineReporter<W> {
    fn emit(&self, event: IndexEvent) {
        match event {
            IndexEvent::PackageStarted { package } => {
                if self.show_clean {
                    self.line(format_args!("[ {package} ]"));
                }
            }
            IndexEvent::FileAdded { path, .. } => self.line(format_args!("  + {path}")),
            IndexEvent::FileUpdated { path, .. } => self.line(format_args!("  . {path}")),
            IndexEvent::FileRemoved { path, .. } => self.line(format_args!("  - {path}")),
            IndexEvent::PackageFinished { package, stats } => {
                if stats.is_dirty() && !self.show_clean {
                    self.line(format_args!("[ {package} ] updated"));
                }
            }
            IndexEvent::PackagePruned { package } => {
                self.line(format_args!("[ {package} ] removed from catalog"))
            }
        }
    }
}

pub fn render_index_report(report: &IndexReport) -> String {
    let totals = report.totals();
    let mut out = format!(
        "{} package(s) synced, {} changed: {} added, {} updated, {} removed",
        report.synced.len(),
        report.changed().len(),
        totals.inserted,
        totals.updated,
        totals.deleted,
    );
    for (package, err) in &report.failed {
        out.push_str(&format!("\nfailed: {package}: {err}"));
    }
    if !report.missing_exec.is_empty() {
        out.push_str(&format!(
            "\nexec file not set: {}\nrun `pkgcat exec check`",
            report.missing_exec.join(", ")
        ));
    }
    out
}

fn render_stamp(label: &str, stamp: Option<FileStamp>) -> String {
    match stamp {
        Some(stamp) => {
            let modified: DateTime<Local> = stamp.modified.into();
            format!(
                "{label:<16} {:>12} bytes  {}",
                stamp.size,
                modified.format("%Y-%m-%d %H:%M:%S")
            )
        }
        None => format!("{label:<16} missing"),
    }
}

pub fn render_status(status: &RepoStatus, maintenance: bool) -> String {
    let mut lines = vec![
        format!("packages on disk  {}", status.on_disk),
        format!("indexed           {}", status.indexed),
        format!("blocked           {}", status.blocked),
        format!("not indexed       {}", status.not_indexed),
        String::new(),
        render_stamp("index.db", status.catalog),
        render_stamp("index.gz", status.export),
        render_stamp("index.gz.sha256", status.export_digest),
        String::new(),
        format!(
            "schema            {} (required {})",
            status.schema, status.required_schema
        ),
        format!(
            "maintenance mode  {}",
            if maintenance { "on" } else { "off" }
        ),
    ];
    if !status.missing_exec.is_empty() {
        lines.push(format!("exec file not set {}", status.missing_exec.join(", ")));
    }

    let mut advice = Vec::new();
    if !status.schema_compatible() {
        advice.push("run `pkgcat migrate`");
    }
    if status.needs_index() {
        advice.push("run `pkgcat index`");
    }
    if !status.missing_exec.is_empty() {
        advice.push("run `pkgcat exec check`");
    }
    if status.needs_export() {
        advice.push("run `pkgcat export`");
    }
    if !advice.is_empty() {
        lines.push(String::new());
        lines.extend(advice.into_iter().map(String::from));
    }
    lines.join("\n")
}

pub fn render_listing(listing: &[PackageListing]) -> String {
    let width = listing.iter().map(|p| p.name.len()).max().unwrap_or(0);
    listing
        .iter()
        .map(|p| match &p.alias {
            Some(alias) => format!("{:<width$}  {:<12} {alias}", p.name, p.status.to_string()),
            None => format!("{:<width$}  {}", p.name, p.status),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgcat_core::{PackageStatus, SchemaVersion};
    use std::time::SystemTime;

    fn status() -> RepoStatus {
        RepoStatus {
            on_disk: 3,
            indexed: 2,
            blocked: 1,
            not_indexed: 0,
            pending: vec![],
            stale: vec![],
            catalog: Some(FileStamp {
                size: 4096,
                modified: SystemTime::now(),
            }),
            export: None,
            export_digest: None,
            schema: SchemaVersion::new(1, 4),
            required_schema: SchemaVersion::new(1, 4),
            missing_exec: vec!["beta".to_string()],
        }
    }

    #[test]
    fn status_lists_advice() {
        let text = render_status(&status(), true);
        assert!(text.contains("maintenance mode  on"));
        assert!(text.contains("index.gz         missing"));
        assert!(text.contains("run `pkgcat exec check`"));
        assert!(text.contains("run `pkgcat export`"));
        assert!(!text.contains("run `pkgcat index`"));
        assert!(!text.contains("migrate"));
    }

    #[test]
    fn outdated_schema_suggests_migrate() {
        let mut s = status();
        s.schema = SchemaVersion::new(1, 3);
        assert!(render_status(&s, false).contains("run `pkgcat migrate`"));
    }

    #[test]
    fn listing_aligns_names() {
        let listing = vec![
            PackageListing {
                name: "a".to_string(),
                alias: Some("x".to_string()),
                status: PackageStatus::Indexed,
            },
            PackageListing {
                name: "long-name".to_string(),
                alias: None,
                status: PackageStatus::Blocked,
            },
        ];
        let text = render_listing(&listing);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a          indexed      x");
        assert_eq!(lines[1], "long-name  blocked");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn added(path: &str) -> IndexEvent {
        IndexEvent::FileAdded {
            package: "alpha".to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn reporter_writes_change_lines() {
        let reporter = LineReporter::new(Vec::new(), true);
        reporter.emit(IndexEvent::PackageStarted {
            package: "alpha".to_string(),
        });
        reporter.emit(added("a.txt"));
        reporter.emit(IndexEvent::FileRemoved {
            package: "alpha".to_string(),
            path: "b.txt".to_string(),
        });
        let out = String::from_utf8(reporter.finish().unwrap()).unwrap();
        assert_eq!(out, "[ alpha ]\n  + a.txt\n  - b.txt\n");
    }

    #[test]
    fn write_failure_is_returned_by_finish() {
        let reporter = LineReporter::new(ClosedPipe, false);
        reporter.emit(added("a.txt"));
        reporter.emit(added("b.txt"));
        let err = reporter.finish().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn empty_report_summary() {
        let text = render_index_report(&IndexReport::default());
        assert_eq!(
            text,
            "0 package(s) synced, 0 changed: 0 added, 0 updated, 0 removed"
        );
    }
}

use std::io::Write;

use citeparse_core::{Field, ParsedReference};
use citeparse_store::{Project, StoredReference};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Export format for `report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    Csv,
    Text,
}

/// Print one parsed record as an indented block of non-blank fields.
pub fn print_reference(
    w: &mut dyn Write,
    label: &str,
    reference: &ParsedReference,
    color: ColorMode,
) -> std::io::Result<()> {
    let pattern = reference.matched_pattern.as_deref().unwrap_or("heuristic");
    if color.enabled() {
        writeln!(w, "{} {}", label.bold(), format!("[{}]", pattern).dimmed())?;
    } else {
        writeln!(w, "{} [{}]", label, pattern)?;
    }

    if reference.is_blank() {
        if color.enabled() {
            writeln!(w, "  {}", "(no fields recognised)".yellow())?;
        } else {
            writeln!(w, "  (no fields recognised)")?;
        }
        writeln!(w, "  original: {}", reference.original_string)?;
        return Ok(());
    }

    for field in Field::ALL {
        if let Some(value) = reference.field(field) {
            if color.enabled() {
                writeln!(w, "  {:<17} {}", format!("{}:", field).cyan(), value)?;
            } else {
                writeln!(w, "  {:<17} {}", format!("{}:", field), value)?;
            }
        }
    }
    Ok(())
}

/// Print a batch of freshly parsed records with a summary line.
pub fn print_references(
    w: &mut dyn Write,
    references: &[ParsedReference],
    color: ColorMode,
) -> std::io::Result<()> {
    for (i, r) in references.iter().enumerate() {
        print_reference(w, &format!("[{}]", i + 1), r, color)?;
        writeln!(w)?;
    }

    let summary = summary_line(references);
    if color.enabled() {
        writeln!(w, "{}", summary.dimmed())?;
    } else {
        writeln!(w, "{}", summary)?;
    }
    Ok(())
}

fn summary_line(references: &[ParsedReference]) -> String {
    let matched = references.iter().filter(|r| r.matched_pattern.is_some()).count();
    let heuristic = references
        .iter()
        .filter(|r| r.matched_pattern.is_none() && !r.is_blank())
        .count();
    let blank = references
        .iter()
        .filter(|r| r.matched_pattern.is_none() && r.is_blank())
        .count();
    format!(
        "{} references: {} by pattern, {} heuristic only, {} unrecognised",
        references.len(),
        matched,
        heuristic,
        blank
    )
}

pub fn print_projects(w: &mut dyn Write, projects: &[Project]) -> std::io::Result<()> {
    if projects.is_empty() {
        writeln!(w, "No projects.")?;
    }
    for p in projects {
        writeln!(w, "{:>5}  {}", p.id, p.name)?;
    }
    Ok(())
}

/// One line per stored reference: id, authors, year, title.
pub fn print_stored_list(
    w: &mut dyn Write,
    stored: &[StoredReference],
    color: ColorMode,
) -> std::io::Result<()> {
    for s in stored {
        let r = &s.reference;
        let authors = if r.authors.is_empty() {
            "(no authors)".to_string()
        } else {
            r.authors_display()
        };
        let year = r.year.as_deref().unwrap_or("n.d.");
        let title = r.title.as_deref().unwrap_or(&r.original_string);
        if color.enabled() {
            writeln!(w, "{:>5}  {} ({}) {}", s.id.dimmed(), authors.bold(), year, title)?;
        } else {
            writeln!(w, "{:>5}  {} ({}) {}", s.id, authors, year, title)?;
        }
    }
    Ok(())
}

/// Render stored references in the requested export format.
pub fn export(stored: &[StoredReference], format: ReportFormat) -> serde_json::Result<String> {
    Ok(match format {
        ReportFormat::Json => serde_json::to_string_pretty(stored)?,
        ReportFormat::Csv => export_csv(stored),
        ReportFormat::Text => export_text(stored),
    })
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn export_csv(stored: &[StoredReference]) -> String {
    let mut out = String::from("Id");
    for field in Field::ALL {
        out.push(',');
        out.push_str(field.as_str());
    }
    out.push_str(",matched_pattern,original_string\n");

    for s in stored {
        let r = &s.reference;
        out.push_str(&s.id.to_string());
        for field in Field::ALL {
            out.push(',');
            // blank authors/type export as empty cells
            out.push_str(&csv_escape(&r.field(field).unwrap_or_default()));
        }
        out.push(',');
        out.push_str(&csv_escape(r.matched_pattern.as_deref().unwrap_or("")));
        out.push(',');
        out.push_str(&csv_escape(&r.original_string));
        out.push('\n');
    }
    out
}

fn export_text(stored: &[StoredReference]) -> String {
    let mut out = String::new();
    for s in stored {
        let r = &s.reference;
        let mut line = String::new();
        if !r.authors.is_empty() {
            line.push_str(&r.authors_display());
            line.push(' ');
        }
        line.push_str(&format!("({}). ", r.year.as_deref().unwrap_or("n.d.")));
        if let Some(title) = &r.title {
            line.push_str(title);
            line.push_str(". ");
        }
        if let Some(venue) = r.venue() {
            line.push_str(venue);
            if let Some(vol) = &r.volume {
                line.push_str(&format!(", {}", vol));
                if let Some(issue) = &r.issue {
                    line.push_str(&format!("({})", issue));
                }
            }
            if let Some(pages) = &r.pages {
                line.push_str(&format!(", {}", pages));
            }
            line.push_str(". ");
        }
        if let Some(inst) = &r.institution {
            line.push_str(inst);
            line.push_str(". ");
        }
        if let Some(doi) = &r.doi {
            line.push_str(doi);
        }
        out.push_str(&format!("[{}] {}\n", s.id, line.trim_end()));
    }
    out
}

//! Console report for a compilation run.

use std::io::{self, Write};

use crate::pipeline::Compilation;

const RULE: &str = "============================================================";

/// Per-record problems: errors for dropped records, warnings for kept ones.
pub fn write_record_issues<W: Write>(out: &mut W, compilation: &Compilation) -> io::Result<()> {
    for record in &compilation.records {
        if !record.included {
            writeln!(out, "\n❌ Certification #{} ({}) has errors:", record.index, record.title)?;
            for v in record.validation.errors() {
                writeln!(out, "   - {}", v.message)?;
            }
        } else if record.validation.warning_count() > 0 {
            writeln!(out, "\n⚠️  Certification #{} ({}) warnings:", record.index, record.title)?;
            for v in record.validation.warnings() {
                writeln!(out, "   - {}", v.message)?;
            }
        }
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, compilation: &Compilation) -> io::Result<()> {
    let doc = &compilation.document;
    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "🏆 Badge Certification Generation Summary")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "✅ Total Certifications: {}", doc.total_count)?;
    writeln!(out, "📁 Categories: {}", doc.categories.len())?;
    if compilation.error_count > 0 {
        writeln!(out, "❌ Errors: {}", compilation.error_count)?;
    }
    if compilation.warning_count > 0 {
        writeln!(out, "⚠️  Warnings: {}", compilation.warning_count)?;
    }

    writeln!(out, "\nCertifications by Category:")?;
    for (_, group) in doc.categories.iter() {
        writeln!(
            out,
            "  {} {}: {} certifications",
            group.icon, group.display_name, group.count
        )?;
    }
    Ok(())
}

pub fn write_report<W: Write>(out: &mut W, compilation: &Compilation) -> io::Result<()> {
    write_record_issues(out, compilation)?;
    write_summary(out, compilation)
}

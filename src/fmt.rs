//! Human-friendly CLI output formatters.
//!
//! Each `fmt_*` function formats one tool's output for terminal display.
//! When `color` is true, ANSI escape codes are emitted via `owo_colors`.

use crate::db::{Category, Manufacturer};
use crate::format::{PartEntry, UNKNOWN};
use crate::tools::{CategoriesOutput, ManufacturersOutput, SearchOutput, StatsOutput};
use owo_colors::OwoColorize;
use std::io::{self, Write};

// ── search ──────────────────────────────────────────────────────────────────

/// One compact line per part: number, part number, package, stock, price.
fn part_line(w: &mut impl Write, p: &PartEntry, color: bool) -> io::Result<()> {
    let tier = match p.part_type.as_str() {
        "basic" => "B",
        UNKNOWN => "?",
        _ => "E",
    };
    if color {
        let tier = match tier {
            "B" => tier.green().to_string(),
            "E" => tier.yellow().to_string(),
            _ => tier.dimmed().to_string(),
        };
        writeln!(
            w,
            "{:<10} {} {:<24} {:<12} {:>10}  ${}",
            p.lcsc.bold(),
            tier,
            p.mfr_part,
            p.package.dimmed(),
            p.stock,
            p.price
        )?;
    } else {
        writeln!(
            w,
            "{:<10} {} {:<24} {:<12} {:>10}  ${}",
            p.lcsc, tier, p.mfr_part, p.package, p.stock, p.price
        )?;
    }
    writeln!(w, "           {}", p.description)?;
    Ok(())
}

pub fn fmt_search(w: &mut impl Write, out: &SearchOutput, color: bool) -> io::Result<()> {
    for p in &out.parts {
        part_line(w, p, color)?;
    }

    let summary = match out.total {
        Some(total) => format!(
            "{} shown (offset {}), {} matching",
            out.total_returned, out.offset, total
        ),
        None => format!("{} shown (offset {})", out.total_returned, out.offset),
    };
    if color {
        writeln!(w, "{}", summary.dimmed())?;
    } else {
        writeln!(w, "{summary}")?;
    }

    if let Some(next) = out.next_offset {
        if color {
            writeln!(w, "{}", format!("... more results at --offset {next}").dimmed())?;
        } else {
            writeln!(w, "... more results at --offset {next}")?;
        }
    }

    Ok(())
}

// ── part ────────────────────────────────────────────────────────────────────

pub fn fmt_part(w: &mut impl Write, p: &PartEntry, color: bool) -> io::Result<()> {
    let mut rows = vec![
        ("Part number:", p.mfr_part.as_str()),
        ("Manufacturer:", p.manufacturer.as_str()),
        ("Description:", p.description.as_str()),
        ("Package:", p.package.as_str()),
        ("Category:", p.category.as_str()),
        ("Stock:", p.stock.as_str()),
        ("Price breaks:", p.price_breaks.as_str()),
        ("Type:", p.part_type.as_str()),
        ("Preferred:", p.preferred.as_str()),
        ("Datasheet:", p.datasheet.as_str()),
    ];
    if let Some(attrs) = &p.attributes {
        rows.push(("Attributes:", attrs.as_str()));
    }

    if color {
        writeln!(w, "{}", p.lcsc.bold())?;
    } else {
        writeln!(w, "{}", p.lcsc)?;
    }

    for (label, value) in rows {
        if color {
            let value = if value == UNKNOWN {
                value.dimmed().to_string()
            } else {
                value.to_string()
            };
            writeln!(w, "  {:<15} {}", label.bold(), value)?;
        } else {
            writeln!(w, "  {label:<15} {value}")?;
        }
    }

    Ok(())
}

// ── categories ──────────────────────────────────────────────────────────────

pub fn fmt_categories(w: &mut impl Write, out: &CategoriesOutput, color: bool) -> io::Result<()> {
    let mut current = "";
    for Category {
        id,
        category,
        subcategory,
    } in &out.categories
    {
        // Group header when the top-level category changes
        if category.as_str() != current {
            if color {
                writeln!(w, "{}", category.bold())?;
            } else {
                writeln!(w, "{category}")?;
            }
            current = category.as_str();
        }
        writeln!(w, "  {id:>5}  {subcategory}")?;
    }
    Ok(())
}

// ── manufacturers ───────────────────────────────────────────────────────────

pub fn fmt_manufacturers(
    w: &mut impl Write,
    out: &ManufacturersOutput,
    color: bool,
) -> io::Result<()> {
    for Manufacturer { id, name } in &out.manufacturers {
        if color {
            writeln!(w, "  {:>5}  {}", id.dimmed(), name)?;
        } else {
            writeln!(w, "  {id:>5}  {name}")?;
        }
    }
    Ok(())
}

// ── stats ───────────────────────────────────────────────────────────────────

pub fn fmt_stats(w: &mut impl Write, out: &StatsOutput, color: bool) -> io::Result<()> {
    let rows = [
        ("Catalogue:", out.catalogue.clone()),
        ("Parts:", out.counts.parts.to_string()),
        ("In stock:", out.counts.parts_in_stock.to_string()),
        ("Basic parts:", out.counts.basic_parts.to_string()),
        ("Categories:", out.counts.categories.to_string()),
        ("Manufacturers:", out.counts.manufacturers.to_string()),
    ];
    for (label, value) in rows {
        if color {
            writeln!(w, "{:<16} {}", label.bold(), value)?;
        } else {
            writeln!(w, "{label:<16} {value}")?;
        }
    }
    Ok(())
}

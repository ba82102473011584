//! Output formatting for match lists and index statistics

use crate::accuracy::AccuracyReport;
use crate::index::stats::{format_size, IndexStats};
use crate::query::Match;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print ranked matches, one per line: rank, score, key, payload
pub fn print_matches(matches: &[Match<String>], color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));
    write_matches(&mut stdout, matches)
}

pub fn write_matches<W: WriteColor>(out: &mut W, matches: &[Match<String>]) -> io::Result<()> {
    if matches.is_empty() {
        writeln!(out, "No match")?;
        return Ok(());
    }

    let score_width = matches
        .iter()
        .map(|m| m.score.to_string().len())
        .max()
        .unwrap_or(1);

    for (rank, m) in matches.iter().enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:>3}", rank + 1)?;
        out.reset()?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, " {:>width$}", m.score, width = score_width)?;
        out.reset()?;

        // Highlight the best match
        if rank == 0 {
            out.set_color(ColorSpec::new().set_bold(true))?;
        }
        write!(out, "  {}", m.key)?;
        out.reset()?;

        if !m.data.is_empty() {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(out, "\t{}", m.data)?;
            out.reset()?;
        }
        writeln!(out)?;
    }

    out.flush()
}

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

pub fn print_stats(stats: &IndexStats, snapshot_bytes: Option<u64>) {
    println!("Index Statistics");
    println!("================");
    println!();
    println!("Candidates:       {}", stats.candidates);
    println!("Substring sizes:  {:?}", stats.substring_sizes);
    println!("Substrings:       {}", stats.substrings);
    println!("Postings:         {}", stats.postings);
    println!(
        "Avg per key:      {:.1}",
        stats.avg_substrings_per_candidate
    );
    if let Some((substring, count)) = &stats.largest_posting {
        println!("Most shared:      {:?} ({} keys)", substring, count);
    }
    if let Some(bytes) = snapshot_bytes {
        println!();
        println!("Snapshot size:    {}", format_size(bytes));
    }
}

pub fn print_accuracy(mode: &str, report: &AccuracyReport) {
    println!(
        "{}: {:.1}% ({}/{} recovered, {} skipped)",
        mode,
        report.percent(),
        report.correct,
        report.trials,
        report.skipped
    );
}

fn color_choice(color: bool) -> ColorChoice {
    if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

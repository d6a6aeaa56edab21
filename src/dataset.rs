mod dupes;
mod input;
mod plain;
mod repair;

use std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};

use self::{
    dupes::DupeStats,
    input::{plain_output_path, OutputKind},
    plain::PlainPosition,
    repair::{GameWindow, RepairStats},
};
use crate::{
    filter::{Decision, Filter, FilterConfig},
    record::PositionRecord,
    stats::{FilterStats, GameCounts},
};

/// Parses every non-blank line of `reader` and hands the records to `callback`.
/// Errors are annotated with the one-based line number they came from.
fn for_each_record(
    reader: impl BufRead,
    mut callback: impl FnMut(PositionRecord) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = line
            .parse::<PositionRecord>()
            .with_context(|| format!("Malformed record on line {line_number}: {line}"))?;
        callback(record).with_context(|| format!("Failed to process line {line_number}"))?;
    }
    Ok(())
}

const fn report_due(positions: u64, every: u64) -> bool {
    every != 0 && positions % every == 0
}

/// Runs the filter over a dump. Kept positions are written as plain blocks
/// when a writer is supplied.
pub fn filter_stream(
    reader: impl BufRead,
    mut writer: Option<&mut dyn Write>,
    filter: &Filter,
    report_every: u64,
) -> anyhow::Result<FilterStats> {
    let mut stats = FilterStats::default();
    for_each_record(reader, |record| {
        let decision = filter.apply(&record, &mut stats)?;
        if decision == Decision::Keep {
            if let Some(writer) = writer.as_deref_mut() {
                PlainPosition::from_record(&record)
                    .write_to(writer)
                    .with_context(|| "Failed to write plain position.")?;
            }
        }
        if report_due(stats.positions, report_every) {
            println!("Processed {} positions\n{stats}", stats.positions);
        }
        Ok(())
    })?;
    Ok(stats)
}

/// Runs the filter over a dump one game at a time, recovering played moves and
/// writing every position of every game.
pub fn repair_stream(
    reader: impl BufRead,
    writer: &mut dyn Write,
    filter: &Filter,
    report_every: u64,
) -> anyhow::Result<(FilterStats, RepairStats)> {
    let mut stats = FilterStats::default();
    let mut repair = RepairStats::default();
    let mut window = GameWindow::default();

    let mut flush = |window: &mut GameWindow, repair: &mut RepairStats| -> anyhow::Result<()> {
        window.reconstruct(repair)?;
        window.write_to(&mut *writer, repair).with_context(|| "Failed to write repaired game.")
    };

    for_each_record(reader, |record| {
        let decision = filter.apply(&record, &mut stats)?;
        if record.is_game_start() && !window.is_empty() {
            flush(&mut window, &mut repair)?;
        }
        window.push(record, decision);
        if report_due(stats.positions, report_every) {
            println!("Processed {} positions\n{stats}", stats.positions);
        }
        Ok(())
    })?;

    if !window.is_empty() {
        flush(&mut window, &mut repair)?;
    }

    Ok((stats, repair))
}

/// Counts games and positions without filtering.
pub fn count_stream(reader: impl BufRead, report_every: u64) -> anyhow::Result<GameCounts> {
    let mut counts = GameCounts::default();
    for_each_record(reader, |record| {
        counts.tally(&record);
        if report_due(counts.positions, report_every) {
            println!("Processed {} positions\n{counts}", counts.positions);
        }
        Ok(())
    })?;
    Ok(counts)
}

/// Counts repeated piece placements overall and per ply bucket.
pub fn dupe_stream(reader: impl BufRead, report_every: u64) -> anyhow::Result<DupeStats> {
    let mut stats = DupeStats::default();
    for_each_record(reader, |record| {
        stats.tally(&record);
        if report_due(stats.positions(), report_every) {
            println!("Processed {} positions\n{stats}", stats.positions());
        }
        Ok(())
    })?;
    Ok(stats)
}

fn load_filter(config: Option<&Path>) -> anyhow::Result<Filter> {
    let config = config
        .map_or_else(|| Ok(FilterConfig::default()), FilterConfig::from_path)
        .with_context(|| "Failed to load filter config")?;
    log::info!("filter policy: {config}");
    Ok(Filter::new(config))
}

/// Resolves the output path, or `None` if the output already exists and there
/// is nothing left to do.
fn claim_output(
    input: &Path,
    output: Option<&Path>,
    kind: OutputKind,
) -> anyhow::Result<Option<PathBuf>> {
    if !input.try_exists()? {
        bail!("Input file {} does not exist.", input.display());
    }
    let output = match output {
        Some(path) => path.to_owned(),
        None => plain_output_path(input, kind)?,
    };
    if output.try_exists()? {
        log::info!("found {}, doing nothing", output.display());
        return Ok(None);
    }
    Ok(Some(output))
}

fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Filters a dump into the plain training format.
pub fn run_filter(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    report_every: u64,
) -> anyhow::Result<()> {
    let Some(output) = claim_output(input, output, OutputKind::Filtered)? else {
        return Ok(());
    };
    let filter = load_filter(config)?;
    let reader = input::open(input)?;
    let mut output_buffer = create_output(&output)?;

    println!("Processing {} ...", input.display());
    let stats = filter_stream(reader, Some(&mut output_buffer), &filter, report_every)?;
    output_buffer
        .flush()
        .with_context(|| "Failed to flush output buffer to file.")?;

    println!("Filtered {} to {}\n{stats}", input.display(), output.display());
    Ok(())
}

/// Runs the filter over a dump and reports what it would keep.
pub fn run_stats(input: &Path, config: Option<&Path>, report_every: u64) -> anyhow::Result<()> {
    let filter = load_filter(config)?;
    let reader = input::open(input)?;

    println!("Processing {} ...", input.display());
    let stats = filter_stream(reader, None, &filter, report_every)?;

    println!("Statistics for {}\n{stats}", input.display());
    Ok(())
}

/// Counts the games and positions in a dump.
pub fn run_count(input: &Path, report_every: u64) -> anyhow::Result<()> {
    let reader = input::open(input)?;

    println!("Processing {} ...", input.display());
    let counts = count_stream(reader, report_every)?;

    println!("Counted {}\n{counts}", input.display());
    Ok(())
}

/// Reports how many piece placements in a dump are repeats.
pub fn run_dupes(input: &Path, report_every: u64) -> anyhow::Result<()> {
    let reader = input::open(input)?;

    println!("Processing {} ...", input.display());
    let stats = dupe_stream(reader, report_every)?;

    println!("Processed {} positions\n{stats}", stats.positions());
    Ok(())
}

/// Rewrites a dump game by game in the plain format, with recovered played moves.
pub fn run_repair(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    report_every: u64,
) -> anyhow::Result<()> {
    let Some(output) = claim_output(input, output, OutputKind::Repaired)? else {
        return Ok(());
    };
    let filter = load_filter(config)?;
    let reader = input::open(input)?;
    let mut output_buffer = create_output(&output)?;

    println!("Processing {} ...", input.display());
    let (stats, repair) = repair_stream(reader, &mut output_buffer, &filter, report_every)?;
    output_buffer
        .flush()
        .with_context(|| "Failed to flush output buffer to file.")?;

    println!("Repaired {} to {}\n{stats}\n{repair}", input.display(), output.display());
    Ok(())
}

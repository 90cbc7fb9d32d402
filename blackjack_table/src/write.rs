use crate::{SimulationError, SimulationSummary, SummaryMessage};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::mpsc::Receiver;

/// Gathers the summaries of every table until each id in `ids` has reported it is done.
/// Stops early if every sender hung up.
pub fn collect_summaries(
    receiver: Receiver<SummaryMessage>,
    mut ids: HashSet<usize>,
) -> BTreeMap<usize, Vec<SimulationSummary>> {
    let mut summaries: BTreeMap<usize, Vec<SimulationSummary>> = BTreeMap::new();
    while !ids.is_empty() {
        match receiver.recv() {
            Ok((Some(summary), id)) => summaries.entry(id).or_default().push(summary),
            Ok((None, id)) => {
                ids.remove(&id);
            }
            Err(_) => break,
        }
    }
    summaries
}

fn format_summaries(summaries: &BTreeMap<usize, Vec<SimulationSummary>>) -> impl Iterator<Item = String> + '_ {
    const WIDTH: usize = 80;
    summaries.iter().map(|(id, seats)| {
        let header = format!("{:-^WIDTH$}\n", format!("table #{}", id));
        let body = seats
            .iter()
            .map(|summary| summary.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        format!("{}{}{}\n", header, body, "-".repeat(WIDTH))
    })
}

/// Collects the summaries of every table and writes them, table by table, to `writer`.
pub fn write_summaries(
    receiver: Receiver<SummaryMessage>,
    ids: HashSet<usize>,
    mut writer: impl Write,
) -> std::io::Result<()> {
    let summaries = collect_summaries(receiver, ids);
    for summary_str in format_summaries(&summaries) {
        writer.write_all(summary_str.as_bytes())?;
    }
    writer.flush()
}

/// Collects the summaries of every table as a JSON object keyed by table number.
pub fn summaries_as_json(
    receiver: Receiver<SummaryMessage>,
    ids: HashSet<usize>,
) -> Result<String, SimulationError> {
    let summaries = collect_summaries(receiver, ids);
    Ok(serde_json::to_string(&summaries)?)
}

// Example usage of the TRS trace set reader

use tracing::{info, Level};
use trs_traceset::{Result, Tag, TraceSet};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/traces.trs".to_string());

    let mut set = TraceSet::open_read(&path)?;

    let count = set.metadata().get_int(Tag::NumberOfTraces)?;
    let samples = set.metadata().get_int(Tag::NumberOfSamples)?;
    let title = set.metadata().get_string(Tag::GlobalTitle)?;
    info!("{}: '{}', {} traces, {} samples each", path, title, count, samples);

    let definitions = set.metadata().parameter_definitions()?;
    for (name, def) in definitions.iter() {
        info!(
            "  parameter '{}': {} x{} at offset {}",
            name,
            def.kind.name(),
            def.length,
            def.offset
        );
    }

    // Dump the first few traces
    for index in 0..count.min(5) as usize {
        let trace = set.get(index)?;
        info!(
            "trace {}: '{}', {} data bytes, first sample {:?}",
            index,
            trace.title,
            trace.data.len(),
            trace.samples.first()
        );
    }

    set.close()
}

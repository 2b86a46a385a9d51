use tomatinho_core::{EventLog, Result};

/// Print per-kind totals as JSON.
pub fn summary() -> Result<()> {
    let log = EventLog::open_default()?;
    let summary = log.summary()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print recorded intervals as JSON, newest first.
pub fn log(limit: Option<usize>) -> Result<()> {
    let log = EventLog::open_default()?;
    let records = log.records(limit)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

use boshu::recruit::deadline::parse_deadline;
use chrono::{DateTime, Local, TimeZone};

/// Show how a deadline string would be resolved right now
pub fn execute(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", describe(input, &Local::now())?);
    Ok(())
}

fn describe<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Result<String, Box<dyn std::error::Error>>
where
    Tz::Offset: std::fmt::Display,
{
    let remaining = parse_deadline(input, now)?;
    let closes_at = chrono::Duration::from_std(remaining)
        .ok()
        .and_then(|delta| now.clone().checked_add_signed(delta))
        .ok_or_else(|| format!("Deadline '{}' is too far in the future", input))?;

    Ok(format!(
        "'{}' closes in {} (at {})",
        input,
        humantime::format_duration(remaining),
        closes_at.format("%Y-%m-%d %H:%M:%S %:z")
    ))
}

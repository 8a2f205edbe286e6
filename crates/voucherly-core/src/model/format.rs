// Presentation helpers shared by every consumer of the snapshot.

/// Split a code into two halves joined by `-`: `1234567890` → `12345-67890`.
///
/// Codes are stored unformatted; this is only for display.
pub fn format_code(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < 2 {
        return code.to_owned();
    }
    let (head, tail) = chars.split_at(chars.len().div_ceil(2));
    format!(
        "{}-{}",
        head.iter().collect::<String>(),
        tail.iter().collect::<String>()
    )
}

/// Human readable validity: minutes below an hour, then hours, days and
/// years. Fractions keep two decimals.
pub fn human_duration(minutes: u32) -> String {
    const HOUR: u32 = 60;
    const DAY: u32 = 24 * HOUR;
    const YEAR: u32 = 365 * DAY;

    if minutes < HOUR {
        return format!("{minutes} {}", plural(minutes == 1, "minute"));
    }

    let (value, unit) = if minutes < DAY {
        (ratio(minutes, HOUR), "hour")
    } else if minutes < YEAR {
        (ratio(minutes, DAY), "day")
    } else {
        (ratio(minutes, YEAR), "year")
    };
    format!("{value} {}", plural(value == "1", unit))
}

fn ratio(minutes: u32, per: u32) -> String {
    if minutes % per == 0 {
        (minutes / per).to_string()
    } else {
        format!("{:.2}", f64::from(minutes) / f64::from(per))
    }
}

fn plural(singular: bool, unit: &str) -> String {
    if singular {
        unit.to_owned()
    } else {
        format!("{unit}s")
    }
}

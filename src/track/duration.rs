//! ISO-8601 duration handling for the `PT#H#M#S` strings the API returns.

/// Parse an ISO-8601 duration such as `PT1H2M3S` into whole seconds.
///
/// Accepts an optional day component (`P1DT2H`). Anything that does not fit
/// the pattern yields 0.
pub fn parse_iso8601_seconds(iso: &str) -> u64 {
    parse_strict(iso.trim()).unwrap_or(0)
}

fn parse_strict(iso: &str) -> Option<u64> {
    let rest = iso.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total: u64 = 0;
    let mut seen_any = false;

    for (value, unit) in components(date)? {
        match unit {
            'D' => total = total.checked_add(value.checked_mul(86_400)?)?,
            _ => return None,
        }
        seen_any = true;
    }

    if let Some(time) = time {
        // Units must appear in H, M, S order, each at most once.
        let mut last_rank = 0;
        for (value, unit) in components(time)? {
            let (rank, factor) = match unit {
                'H' => (1, 3_600),
                'M' => (2, 60),
                'S' => (3, 1),
                _ => return None,
            };
            if rank <= last_rank {
                return None;
            }
            last_rank = rank;
            total = total.checked_add(value.checked_mul(factor)?)?;
            seen_any = true;
        }
    }

    seen_any.then_some(total)
}

/// Split `12H3M` into `[(12, 'H'), (3, 'M')]`.
fn components(s: &str) -> Option<Vec<(u64, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            if digits.is_empty() {
                return None;
            }
            out.push((digits.parse().ok()?, ch));
            digits.clear();
        }
    }
    if !digits.is_empty() {
        return None;
    }
    Some(out)
}

/// Format seconds as `M:SS`, or `H:MM:SS` once an hour is reached.
pub fn format_seconds(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

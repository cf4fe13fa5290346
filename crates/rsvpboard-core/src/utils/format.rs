/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Display form of a guest phone number.
///
/// North American numbers (10 digits, or 11 with a leading country code 1)
/// become `(555) 123-4567`. Numbers written with a `+` and another country
/// code keep their own grouping with separators collapsed to single spaces,
/// so `+91-98765-43210` shows as `+91 98765 43210`. Anything else is shown as
/// typed.
pub fn format_phone(phone: &str) -> String {
    let phone = phone.trim();
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let national = match digits.len() {
        10 if !phone.starts_with('+') => Some(&digits[..]),
        11 if digits.starts_with('1') => Some(&digits[1..]),
        _ => None,
    };
    if let Some(n) = national {
        return format!("({}) {}-{}", &n[0..3], &n[3..6], &n[6..10]);
    }

    if phone.starts_with('+') && digits.len() > 6 {
        let groups: Vec<&str> = phone[1..]
            .split(|c: char| !c.is_ascii_digit())
            .filter(|g| !g.is_empty())
            .collect();
        return format!("+{}", groups.join(" "));
    }

    phone.to_string()
}

/// Fit `s` into `width` characters for a table column, ending in `...` when
/// cut. Trailing spaces before the ellipsis are dropped.
pub fn truncate_string(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width <= 3 {
        return s.chars().take(width).collect();
    }
    let kept: String = s.chars().take(width - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Human-friendly age for a load timestamp: "just now", "5m ago", "2h ago", "3d ago".
/// Hours and days round to the nearest unit.
pub fn format_age(minutes: i64) -> String {
    if minutes < 1 {
        // Negative ages come from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

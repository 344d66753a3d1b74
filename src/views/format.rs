//! Display formatting shared by views

use chrono::{DateTime, NaiveDate, Utc};

/// Indian rupee with lakh/crore grouping and no decimals, e.g. `₹12,34,567`
pub fn currency(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (h, t) = rest.split_at(rest.len() - 2);
            groups.push(t);
            rest = h;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

/// `17 Oct 2026` from an RFC 3339 timestamp or a plain date; raw text otherwise
pub fn date(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc).format("%d %b %Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%d %b %Y").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(currency(40.0), "₹40");
        assert_eq!(currency(2450.0), "₹2,450");
        assert_eq!(currency(1234567.0), "₹12,34,567");
        assert_eq!(currency(-1500.4), "-₹1,500");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(date("2026-10-17"), "17 Oct 2026");
        assert_eq!(date("2026-10-17T08:30:00Z"), "17 Oct 2026");
        assert_eq!(date("yesterday"), "yesterday");
    }
}

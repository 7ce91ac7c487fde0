use chrono::{DateTime, SecondsFormat, Utc};

pub fn datetime_str(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Compact age label for a past timestamp, e.g. "10m", "3d", "2y".
pub fn age_string(from: &DateTime<Utc>) -> String {
    age_between(from, &Utc::now())
}

fn age_between(from: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(from);

    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "< 1m".to_string();
    }

    let days = duration.num_days();
    if days >= 365 {
        return format!("{}y", days / 365);
    }
    if days >= 30 {
        return format!("{}M", days / 30);
    }
    if days >= 1 {
        return format!("{}d", days);
    }

    let hours = duration.num_hours();
    if hours >= 1 {
        return format!("{}h", hours);
    }

    format!("{}m", minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_just_now() {
        let t = now() - Duration::seconds(30);
        assert_eq!(age_between(&t, &now()), "< 1m");
    }

    #[test]
    fn test_minutes() {
        let t = now() - Duration::minutes(10);
        assert_eq!(age_between(&t, &now()), "10m");
    }

    #[test]
    fn test_hours() {
        let t = now() - Duration::hours(5);
        assert_eq!(age_between(&t, &now()), "5h");
    }

    #[test]
    fn test_days() {
        let t = now() - Duration::days(3);
        assert_eq!(age_between(&t, &now()), "3d");
    }

    #[test]
    fn test_months() {
        let t = now() - Duration::days(65);
        assert_eq!(age_between(&t, &now()), "2M");
    }

    #[test]
    fn test_years() {
        let t = now() - Duration::days(800);
        assert_eq!(age_between(&t, &now()), "2y");
    }

    #[test]
    fn test_datetime_str() {
        let t = now();
        assert_eq!(datetime_str(&t), "2024-06-01T12:00:00.000Z");
    }
}

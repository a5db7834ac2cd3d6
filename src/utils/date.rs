use chrono::{DateTime, NaiveDateTime};

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// formats a timestamp the way it is stored, the string sorts in time order
pub fn format_date(date: NaiveDateTime) -> String {
    format!("{}", date.format(DATE_FMT))
}

pub fn parse_date(str_time: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDateTime::parse_from_str(str_time, DATE_FMT) {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(str_time).ok().map(|date| date.naive_utc())
}

pub mod serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{format_date, parse_date};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        format_date(*time).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        parse_date(str_time.as_str()).ok_or_else(|| D::Error::custom(format!("invalid date {}", str_time)))
    }
}

pub mod opt_serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{format_date, parse_date};

    pub fn serialize<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        time.map(format_date).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let str_time: Option<String> = Deserialize::deserialize(deserializer)?;
        match str_time {
            // ddb stores a cleared timestamp as an empty string
            Some(str_time) if !str_time.is_empty() => {
                parse_date(str_time.as_str())
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid date {}", str_time)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, Utc};
    use serde::{Deserialize, Serialize};
    use crate::utils::date::{DATE_FMT, format_date, opt_serializer, parse_date, serializer};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "serializer")]
        at: NaiveDateTime,
        #[serde(with = "opt_serializer")]
        closed_at: Option<NaiveDateTime>,
    }

    #[tokio::test]
    async fn test_should_format_and_parse_date() {
        let now = Utc::now().naive_utc();
        assert_eq!(Some(now), parse_date(format_date(now).as_str()));
        let date = NaiveDateTime::parse_from_str("2023-04-11T11:11:11", DATE_FMT).expect("should parse");
        assert_eq!(Some(date), parse_date("2023-04-11T11:11:11+00:00"));
        assert_eq!(None, parse_date("yesterday"));
    }

    #[tokio::test]
    async fn test_should_serialize_dates() {
        let stamped = Stamped { at: Utc::now().naive_utc(), closed_at: None };
        let json = serde_json::to_string(&stamped).expect("should serialize");
        let loaded: Stamped = serde_json::from_str(json.as_str()).expect("should deserialize");
        assert_eq!(stamped, loaded);

        let loaded: Stamped = serde_json::from_str(r#"{"at":"2023-04-11T11:11:11","closed_at":""}"#).expect("should deserialize");
        assert_eq!(None, loaded.closed_at);
    }
}

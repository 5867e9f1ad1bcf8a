use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entities::winner_entity;

/// 奖品标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prize {
    A,
    B,
    C,
}

impl Prize {
    pub const ALL: [Prize; 3] = [Prize::A, Prize::B, Prize::C];

    /// 等概率抽取一个奖品
    pub fn draw_random() -> Self {
        let mut rng = rand::thread_rng();
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prize::A => "A",
            Prize::B => "B",
            Prize::C => "C",
        }
    }
}

impl std::fmt::Display for Prize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 中奖记录 (query 返回的行)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub id: i64,
    pub user_id: String,
    pub prize: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(deserialize_with = "pg_timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub redeemed: Option<bool>,
    #[serde(default, deserialize_with = "pg_timestamp::deserialize_option")]
    pub redeemed_at: Option<DateTime<Utc>>,
}

/// PostgREST 对 `timestamp` (无时区) 列返回不带偏移的时间, 按 UTC 解释
mod pg_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}

impl WinnerRecord {
    pub fn is_redeemed(&self) -> bool {
        self.redeemed.unwrap_or(false)
    }
}

impl From<winner_entity::Model> for WinnerRecord {
    fn from(m: winner_entity::Model) -> Self {
        WinnerRecord {
            id: m.id,
            user_id: m.user_id,
            prize: m.prize,
            name: m.name,
            phone: m.phone,
            created_at: m.created_at,
            redeemed: m.redeemed,
            redeemed_at: m.redeemed_at,
        }
    }
}

/// 待插入的中奖记录, id 由存储分配
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWinner {
    pub user_id: String,
    pub prize: Prize,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_draw_random_stays_in_prize_set() {
        let seen: HashSet<Prize> = (0..300).map(|_| Prize::draw_random()).collect();
        assert!(seen.iter().all(|p| Prize::ALL.contains(p)));
        // 300 次等概率抽取, 三种奖品都应出现
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_prize_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Prize::B).unwrap(), "\"B\"");
        assert_eq!(Prize::C.to_string(), "C");
    }

    #[test]
    fn test_record_deserializes_unset_redemption() {
        let record: WinnerRecord = serde_json::from_str(
            r#"{"id":7,"user_id":"U1","prize":"A","name":null,"phone":"0912","created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.redeemed, None);
        assert!(!record.is_redeemed());
        assert_eq!(record.phone.as_deref(), Some("0912"));
    }

    #[test]
    fn test_record_accepts_naive_and_offset_timestamps() {
        let record: WinnerRecord = serde_json::from_str(
            r#"{"id":1,"user_id":"U1","prize":"B","created_at":"2025-01-01T08:00:00.123456","redeemed":true,"redeemed_at":"2025-01-02T09:30:00+08:00"}"#,
        )
        .unwrap();
        assert_eq!(
            record.created_at.to_rfc3339(),
            "2025-01-01T08:00:00.123456+00:00"
        );
        assert_eq!(
            record.redeemed_at.unwrap().to_rfc3339(),
            "2025-01-02T01:30:00+00:00"
        );

        let record: WinnerRecord = serde_json::from_str(
            r#"{"id":2,"user_id":"U1","prize":"C","created_at":"2025-01-01T00:00:00","redeemed_at":null}"#,
        )
        .unwrap();
        assert_eq!(record.created_at.timestamp(), 1_735_689_600);
        assert_eq!(record.redeemed_at, None);
    }

    #[test]
    fn test_record_rejects_garbage_timestamp() {
        let result = serde_json::from_str::<WinnerRecord>(
            r#"{"id":3,"user_id":"U1","prize":"A","created_at":"yesterday"}"#,
        );
        assert!(result.is_err());
    }
}

use actix_web::web;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// 请求动作 (act 字段)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Draw,
    Winner,
    Query,
    Redeem,
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draw" => Ok(Action::Draw),
            "winner" => Ok(Action::Winner),
            "query" => Ok(Action::Query),
            "redeem" => Ok(Action::Redeem),
            other => Err(AppError::UnknownAction(Some(other.to_string()))),
        }
    }
}

/// 从 POST body 或 URL query 中提取的字段, 缺失即为 None
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotteryRequest {
    pub act: Option<String>,
    pub id_token: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub record_id: Option<String>,
}

impl LotteryRequest {
    /// POST: 整个 body 必须是 JSON object
    pub fn from_json_body(body: &[u8]) -> AppResult<Self> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self::from_object(&map)),
            Ok(_) | Err(_) => Err(AppError::ValidationError("invalid request body".into())),
        }
    }

    /// 其它方法: 读取 URL query, 重复 key 取最后一个
    pub fn from_query(query: &str) -> AppResult<Self> {
        let map = web::Query::<HashMap<String, String>>::from_query(query)
            .map_err(|_| AppError::ValidationError("invalid query string".into()))?
            .into_inner();

        Ok(Self {
            act: map.get("act").cloned(),
            id_token: map.get("idToken").cloned(),
            name: map.get("name").cloned(),
            phone: map.get("phone").cloned(),
            record_id: map.get("recordId").cloned(),
        })
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let text = |key: &str| match map.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        let record_id = match map.get("recordId") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            act: text("act"),
            id_token: text("idToken"),
            name: text("name"),
            phone: text("phone"),
            record_id,
        }
    }

    pub fn action(&self) -> AppResult<Action> {
        match self.act.as_deref() {
            Some(act) => act.parse(),
            None => Err(AppError::UnknownAction(None)),
        }
    }

    /// redeem 的目标记录, 必须是整数 (`1.0` 视为 1)
    pub fn record_id(&self) -> AppResult<i64> {
        self.record_id
            .as_deref()
            .map(str::trim)
            .and_then(parse_record_id)
            .ok_or_else(|| AppError::ValidationError("invalid recordId".into()))
    }
}

/// JS 安全整数上限
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn parse_record_id(raw: &str) -> Option<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Some(value as i64)
    } else {
        None
    }
}

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 中奖记录实体
/// 说明:
/// - 每次 winner 动作插入一条, 本服务从不删除
/// - user_id 为 LINE 用户 (sub), 同一用户可有多条
/// - redeemed / redeemed_at 只会从空变为已设置
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "winners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// LINE 用户ID
    pub user_id: String,
    /// 奖品标签 (A / B / C)
    pub prize: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    /// 是否已兑奖 (NULL 视为未兑奖)
    pub redeemed: Option<bool>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

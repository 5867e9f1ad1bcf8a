use crate::entities::winner_entity as winners;
use crate::error::AppResult;
use crate::models::{NewWinner, WinnerRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// winners 表的存取接口
#[async_trait]
pub trait WinnerStore: Send + Sync {
    /// 插入一条中奖记录, 返回带 id 的完整行
    async fn insert(&self, record: NewWinner) -> AppResult<WinnerRecord>;

    /// 按 user_id 查询, id 倒序
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<WinnerRecord>>;

    /// 标记兑奖, 返回受影响行数
    async fn mark_redeemed(&self, id: i64, at: DateTime<Utc>) -> AppResult<u64>;
}

pub struct SeaOrmWinnerStore {
    pool: DatabaseConnection,
}

impl SeaOrmWinnerStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WinnerStore for SeaOrmWinnerStore {
    async fn insert(&self, record: NewWinner) -> AppResult<WinnerRecord> {
        let model = winners::ActiveModel {
            user_id: Set(record.user_id),
            prize: Set(record.prize.to_string()),
            name: Set(record.name),
            phone: Set(record.phone),
            created_at: Set(record.created_at),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(model.into())
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<WinnerRecord>> {
        let list = winners::Entity::find()
            .filter(winners::Column::UserId.eq(user_id))
            .order_by_desc(winners::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn mark_redeemed(&self, id: i64, at: DateTime<Utc>) -> AppResult<u64> {
        let result = winners::Entity::update_many()
            .col_expr(winners::Column::Redeemed, Expr::value(true))
            .col_expr(winners::Column::RedeemedAt, Expr::value(at))
            .filter(winners::Column::Id.eq(id))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }
}

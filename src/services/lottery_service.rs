use crate::error::AppResult;
use crate::models::{NewWinner, Prize, WinnerRecord};
use crate::services::WinnerStore;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct LotteryService {
    store: Arc<dyn WinnerStore>,
}

impl LotteryService {
    pub fn new(store: Arc<dyn WinnerStore>) -> Self {
        Self { store }
    }

    /// draw 目前只是占位, 不访问存储
    pub async fn draw(&self, user_id: &str) -> AppResult<()> {
        log::debug!("Draw requested by {user_id}");
        Ok(())
    }

    /// 随机抽取奖品并写入中奖记录
    pub async fn award(
        &self,
        user_id: &str,
        name: Option<String>,
        phone: Option<String>,
    ) -> AppResult<Prize> {
        let prize = Prize::draw_random();
        let record = self
            .store
            .insert(NewWinner {
                user_id: user_id.to_string(),
                prize,
                name,
                phone,
                created_at: Utc::now(),
            })
            .await?;

        log::info!("Prize {} awarded to {} (record {})", prize, user_id, record.id);
        Ok(prize)
    }

    /// 当前用户的全部中奖记录, 最新在前
    pub async fn records(&self, user_id: &str) -> AppResult<Vec<WinnerRecord>> {
        self.store.find_by_user(user_id).await
    }

    /// 标记兑奖; 不校验记录归属, 重复兑奖只会覆盖时间
    pub async fn redeem(&self, user_id: &str, record_id: i64) -> AppResult<()> {
        let affected = self.store.mark_redeemed(record_id, Utc::now()).await?;
        if affected == 0 {
            log::warn!("Redeem by {user_id} matched no record: {record_id}");
        } else {
            log::info!("Record {record_id} redeemed by {user_id}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryWinnerStore;

    fn service() -> (LotteryService, Arc<InMemoryWinnerStore>) {
        let store = Arc::new(InMemoryWinnerStore::default());
        (LotteryService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_award_inserts_one_row_per_call() {
        let (service, store) = service();
        for _ in 0..5 {
            let prize = service
                .award("U1", Some("Amy".into()), Some("0912".into()))
                .await
                .unwrap();
            assert!(Prize::ALL.contains(&prize));
        }

        let rows = store.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.user_id == "U1"));
        assert!(rows.iter().all(|r| ["A", "B", "C"].contains(&r.prize.as_str())));
    }

    #[tokio::test]
    async fn test_records_only_for_caller_newest_first() {
        let (service, _store) = service();
        service.award("U1", None, None).await.unwrap();
        service.award("U2", None, None).await.unwrap();
        service.award("U1", None, None).await.unwrap();

        let records = service.records("U1").await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_redeem_is_idempotent() {
        let (service, store) = service();
        service.award("U1", None, None).await.unwrap();
        service.award("U1", None, None).await.unwrap();

        service.redeem("U1", 1).await.unwrap();
        let first = store.rows()[0].clone();
        service.redeem("U1", 1).await.unwrap();
        let second = store.rows()[0].clone();

        assert_eq!(first.redeemed, Some(true));
        assert_eq!(second.redeemed, Some(true));
        assert!(second.redeemed_at.is_some());
        assert!(!store.rows()[1].is_redeemed());
    }

    #[tokio::test]
    async fn test_redeem_missing_record_is_not_an_error() {
        let (service, store) = service();
        service.redeem("U1", 99).await.unwrap();
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_draw_touches_nothing() {
        let (service, store) = service();
        service.draw("U1").await.unwrap();
        assert_eq!(store.calls(), 0);
    }
}

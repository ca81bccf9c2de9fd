//! Database repository for BMI records.

use sqlx::{Connection, PgConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::bmi_records::{BmiRecordCreateDBRequest, BmiRecordDBResponse, BmiRecordFilter},
    },
    types::BmiRecordId,
};

const COLUMNS: &str = "id, user_id, name, age, weight, height, bmi, category, created_at";

pub struct BmiRecords<'c> {
    db: &'c mut PgConnection,
}

impl<'c> BmiRecords<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for BmiRecords<'c> {
    type CreateRequest = BmiRecordCreateDBRequest;
    type Response = BmiRecordDBResponse;
    type Id = BmiRecordId;
    type Filter = BmiRecordFilter;

    #[instrument(skip(self, request), fields(user_id = ?request.user_id, category = %request.category), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let record = sqlx::query_as::<_, BmiRecordDBResponse>(&format!(
            r#"
            INSERT INTO bmi_records (user_id, name, age, weight, height, bmi, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(request.user_id)
        .bind(&request.name)
        .bind(request.age)
        .bind(request.weight)
        .bind(request.height)
        .bind(request.bmi)
        .bind(request.category.label())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let record = sqlx::query_as::<_, BmiRecordDBResponse>(&format!("SELECT {COLUMNS} FROM bmi_records WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(record)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let records = sqlx::query_as::<_, BmiRecordDBResponse>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM bmi_records
            WHERE ($1::INTEGER IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bmi::BmiCategory,
        db::{errors::DbError, handlers::Users, models::users::UserCreateDBRequest},
        password::Argon2Params,
    };
    use sqlx::PgPool;

    fn request(name: &str, user_id: Option<i32>) -> BmiRecordCreateDBRequest {
        BmiRecordCreateDBRequest {
            user_id,
            name: name.to_string(),
            age: 30,
            weight: 70.0,
            height: 175.0,
            bmi: 22.9,
            category: BmiCategory::NormalWeight,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_assigns_id_and_timestamp(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = BmiRecords::new(&mut conn);

        let created = repo.create(&request("Ada", None)).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "Ada");
        assert_eq!(created.category, BmiCategory::NormalWeight);
        assert_eq!(created.user_id, None);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get_by_id(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_is_newest_first_and_filters_by_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let user = Users::with_params(&mut conn, Argon2Params::default())
            .create(&UserCreateDBRequest {
                username: "grace".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        let mut repo = BmiRecords::new(&mut conn);
        let first = repo.create(&request("first", Some(user.id))).await.unwrap();
        let second = repo.create(&request("second", None)).await.unwrap();
        let third = repo.create(&request("third", Some(user.id))).await.unwrap();

        let all = repo.list(&BmiRecordFilter::all()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let owned = repo.list(&BmiRecordFilter::for_user(user.id)).await.unwrap();
        let ids: Vec<_> = owned.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);

        let none = repo.list(&BmiRecordFilter::for_user(user.id + 1)).await.unwrap();
        assert!(none.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_orders_by_created_at_not_id(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (older_id, newer_id) = {
            let mut repo = BmiRecords::new(&mut conn);
            let a = repo.create(&request("a", None)).await.unwrap();
            let b = repo.create(&request("b", None)).await.unwrap();
            (a.id, b.id)
        };

        // The lower id gets the later timestamp
        sqlx::query("UPDATE bmi_records SET created_at = $1 WHERE id = $2")
            .bind(chrono::Utc::now() + chrono::Duration::hours(1))
            .bind(older_id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let mut repo = BmiRecords::new(&mut conn);
        let all = repo.list(&BmiRecordFilter::all()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![older_id, newer_id]);
        assert!(all[0].created_at > all[1].created_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_user_is_a_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = BmiRecords::new(&mut conn);

        let err = repo.create(&request("orphan", Some(4242))).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_out_of_range_age_is_a_check_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = BmiRecords::new(&mut conn);

        let mut bad = request("too old", None);
        bad.age = 121;
        let err = repo.create(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}

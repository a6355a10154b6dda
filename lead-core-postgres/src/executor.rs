use sqlx::{PgPool, Postgres, Transaction};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A database transaction shared by every repository of one unit of work.
///
/// Repositories lock `tx` for each statement. Once `commit` or `rollback`
/// has consumed the transaction, further statements fail with
/// "Transaction has been consumed". Dropping the last clone without
/// committing rolls the transaction back.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self::new(pool.begin().await?))
    }

    /// A read-only transaction in which every statement sees the snapshot
    /// taken by the first one, so multi-statement reads stay consistent with
    /// each other while writers commit.
    pub async fn begin_snapshot(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(Self::new(tx))
    }

    pub async fn commit(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tx = self.tx.lock().await.take().ok_or("Transaction has been consumed")?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tx = self.tx.lock().await.take().ok_or("Transaction has been consumed")?;
        tx.rollback().await?;
        Ok(())
    }
}

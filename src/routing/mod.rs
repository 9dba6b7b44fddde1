//! Read/write pool selection and the transactional scope helper.

use futures_util::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

use crate::api::error::StoreError;
use crate::configs::{connect_pool, AppConfig, DatabaseConfig, Features};

/// Routes queries to the primary or replica pool. Callers never see which
/// pool served them; writes and transactional reads always hit the primary.
#[derive(Clone)]
pub struct DataRouter {
    primary: PgPool,
    replica: Option<PgPool>,
    use_replica: bool,
}

impl DataRouter {
    pub async fn connect(cfg: &AppConfig) -> Result<Self, sqlx::Error> {
        let (primary_dsn, replica_dsn) = select_dsns(&cfg.database, &cfg.features);
        let primary = connect_pool(primary_dsn, cfg.database.max_connections).await?;
        let replica = match replica_dsn {
            Some(dsn) => Some(connect_pool(dsn, cfg.database.max_connections).await?),
            None => None,
        };
        Ok(Self { primary, replica, use_replica: cfg.features.use_replica })
    }

    /// Every write and transactional read.
    pub fn writes(&self) -> &PgPool {
        &self.primary
    }

    /// Non-transactional reads: user-by-id, search, feed fallback.
    pub fn reads(&self) -> &PgPool {
        if self.use_replica {
            if let Some(replica) = &self.replica {
                return replica;
            }
        }
        &self.primary
    }

    pub async fn close(&self) {
        if let Some(replica) = &self.replica {
            replica.close().await;
        }
        self.primary.close().await;
    }
}

/// DSN selection for the configured topology. Sharding wins over load
/// balancing; missing optional DSNs fall back to the direct ones with a
/// warning rather than failing startup.
pub fn select_dsns<'a>(db: &'a DatabaseConfig, features: &Features) -> (&'a str, Option<&'a str>) {
    let primary = if features.use_sharding {
        match &db.sharded {
            Some(dsn) => dsn.as_str(),
            None => {
                tracing::warn!("use_sharding set but no sharded DSN configured, using master");
                db.master.as_str()
            }
        }
    } else if features.use_load_balancing {
        match &db.balanced_master {
            Some(dsn) => dsn.as_str(),
            None => {
                tracing::warn!("use_load_balancing set but no balanced DSN configured, using master");
                db.master.as_str()
            }
        }
    } else {
        db.master.as_str()
    };

    let replica = if features.use_load_balancing && db.balanced_replica.is_some() {
        db.balanced_replica.as_deref()
    } else {
        db.replica.as_deref()
    };

    (primary, replica)
}

/// Runs `op` inside a transaction: COMMIT on `Ok`, ROLLBACK on `Err`.
pub async fn with_transaction<T, F>(pool: &PgPool, op: F) -> Result<T, StoreError>
where
    F: for<'t> FnOnce(
        &'t mut Transaction<'static, Postgres>,
    ) -> BoxFuture<'t, Result<T, StoreError>>,
{
    let mut tx = pool.begin().await?;
    match op(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tx.rollback().await?;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> DatabaseConfig {
        DatabaseConfig {
            master: "postgres://m".into(),
            replica: Some("postgres://r".into()),
            sharded: Some("postgres://s".into()),
            balanced_master: Some("postgres://bm".into()),
            balanced_replica: Some("postgres://br".into()),
            max_connections: 5,
        }
    }

    #[test]
    fn plain_topology_uses_direct_dsns() {
        let features = Features::default();
        assert_eq!(select_dsns(&db(), &features), ("postgres://m", Some("postgres://r")));
    }

    #[test]
    fn sharding_overrides_primary() {
        let features = Features { use_sharding: true, ..Default::default() };
        assert_eq!(select_dsns(&db(), &features).0, "postgres://s");
    }

    #[test]
    fn load_balancing_selects_balanced_pair() {
        let features = Features { use_load_balancing: true, ..Default::default() };
        assert_eq!(select_dsns(&db(), &features), ("postgres://bm", Some("postgres://br")));
    }

    #[test]
    fn missing_optional_dsns_fall_back() {
        let mut config = db();
        config.sharded = None;
        config.balanced_master = None;
        config.balanced_replica = None;
        let sharding = Features { use_sharding: true, ..Default::default() };
        assert_eq!(select_dsns(&config, &sharding).0, "postgres://m");
        let balancing = Features { use_load_balancing: true, ..Default::default() };
        assert_eq!(select_dsns(&config, &balancing), ("postgres://m", Some("postgres://r")));
    }
}

//! Embedded PostgreSQL database support
//!
//! Runs a bundled PostgreSQL instance that starts and stops with the application, so a single
//! binary can persist records without an external database. Only available when built with the
//! `embedded-db` feature; without it, [`EmbeddedDatabase::start`] returns an error.

#[cfg(feature = "embedded-db")]
use postgresql_embedded::{PostgreSQL, Settings, V16};
#[cfg(feature = "embedded-db")]
use std::path::PathBuf;
#[cfg(feature = "embedded-db")]
use tracing::{debug, info};

#[cfg(feature = "embedded-db")]
const DATABASE_NAME: &str = "bmictl";

#[cfg(feature = "embedded-db")]
pub struct EmbeddedDatabase {
    postgres: PostgreSQL,
    connection_string: String,
}

#[cfg(feature = "embedded-db")]
impl EmbeddedDatabase {
    /// Create and start a new embedded PostgreSQL instance on an OS-assigned port.
    ///
    /// `data_dir` defaults to `$HOME/.bmictl_data/postgres`. With `persistent == false` the data
    /// directory is removed when the instance stops.
    pub async fn start(data_dir: Option<PathBuf>, persistent: bool) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| match std::env::home_dir() {
            Some(home) => home.join(".bmictl_data").join("postgres"),
            None => PathBuf::from(".bmictl_data/postgres"),
        });

        if persistent {
            debug!("Starting embedded PostgreSQL with data directory: {}", data_dir.display());
        } else {
            debug!("Starting ephemeral embedded PostgreSQL");
        }

        let settings = Settings {
            version: V16.clone(),
            port: 0,
            username: "postgres".to_string(),
            password: "password".to_string(),
            temporary: !persistent,
            installation_dir: data_dir.join("installation"),
            data_dir: data_dir.join("data"),
            ..Default::default()
        };

        let mut postgres = PostgreSQL::new(settings);

        // Downloads binaries (if not bundled) and runs initdb
        postgres
            .setup()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to setup embedded PostgreSQL: {}", e))?;

        postgres
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start embedded PostgreSQL: {}", e))?;

        if !postgres
            .database_exists(DATABASE_NAME)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to check database '{}': {}", DATABASE_NAME, e))?
        {
            postgres
                .create_database(DATABASE_NAME)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create database '{}': {}", DATABASE_NAME, e))?;
        }

        let connection_string = postgres.settings().url(DATABASE_NAME);
        info!("Embedded PostgreSQL started successfully on port {}", postgres.settings().port);

        Ok(Self {
            postgres,
            connection_string,
        })
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub async fn stop(self) -> anyhow::Result<()> {
        info!("Stopping embedded PostgreSQL...");
        self.postgres
            .stop()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to stop embedded PostgreSQL: {}", e))?;
        info!("Embedded PostgreSQL stopped");
        Ok(())
    }
}

#[cfg(not(feature = "embedded-db"))]
pub struct EmbeddedDatabase;

#[cfg(not(feature = "embedded-db"))]
impl EmbeddedDatabase {
    pub async fn start(_data_dir: Option<std::path::PathBuf>, _persistent: bool) -> anyhow::Result<Self> {
        anyhow::bail!(
            "Embedded database is configured but the feature is not enabled. \
             Rebuild with --features embedded-db to use embedded database."
        )
    }

    pub fn connection_string(&self) -> &str {
        ""
    }

    pub async fn stop(self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[cfg(not(feature = "embedded-db"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_without_feature_fails() {
        let err = EmbeddedDatabase::start(None, false).await.err().unwrap();
        assert!(err.to_string().contains("--features embedded-db"));
    }
}

use crate::config::Config;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Debug;
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{error, info};

/// Database service
#[derive(Clone)]
pub struct Database {
    client: Surreal<Client>,
    pub config: Config,
}

impl Database {
    /// Create a new database instance
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let address = config
            .database_url
            .trim_start_matches("http://")
            .trim_start_matches("https://");

        let client = Surreal::new::<Http>(address).await?;
        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;
        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Verify the database connection
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    /// Execute a raw query
    pub async fn query(&self, sql: &str) -> Result<Response> {
        self.client.query(sql).await.map_err(AppError::from)
    }

    /// Execute a query with bound parameters
    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize + 'static,
    {
        self.client
            .query(sql)
            .bind(params)
            .await
            .map_err(AppError::from)
    }

    /// Create a record under an explicit id and return the stored record
    pub async fn create_with_id<C, T>(&self, table: &str, id: &str, data: C) -> Result<T>
    where
        C: Serialize + Send + Sync + 'static,
        T: for<'de> Deserialize<'de> + Send + Sync + Debug,
    {
        let created: Option<T> = self.client.create((table, id)).content(data).await?;
        created.ok_or_else(|| AppError::Internal("Failed to create record".to_string()))
    }

    /// Fetch a single record by id
    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de> + Send + Sync + Debug,
    {
        self.client.select((table, id)).await.map_err(AppError::from)
    }

    /// Merge a JSON patch into a record and return the updated record
    pub async fn update_by_id_with_json<T>(
        &self,
        table: &str,
        id: &str,
        updates: serde_json::Value,
    ) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de> + Send + Sync + Debug,
    {
        let mut response = self
            .query_with_params(
                "UPDATE type::thing($table, $id) MERGE $updates RETURN AFTER",
                json!({ "table": table, "id": id, "updates": updates }),
            )
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }

    /// Delete a record by id
    pub async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        let _: Option<serde_json::Value> = self.client.delete((table, id)).await?;
        Ok(())
    }

    /// Find a single record by field equality
    pub async fn find_one<T>(&self, table: &str, field: &str, value: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de> + Send + Sync + Clone + Debug,
    {
        let sql = format!(
            "SELECT * FROM type::table($table) WHERE {} = $value LIMIT 1",
            field
        );
        let mut response = self
            .query_with_params(&sql, json!({ "table": table, "value": value }))
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }
}

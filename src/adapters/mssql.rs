use tiberius::{Client, Config, ToSql};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::dialect::MSSQL;
use super::session::SqlSession;
use super::sql::SqlAdapter;
use crate::error::SqlError;

pub type MsSqlAdapter = SqlAdapter<MsSqlSession>;

impl MsSqlAdapter {
    pub fn mssql() -> Self {
        SqlAdapter::new(&MSSQL)
    }
}

/// Blocking wrapper over a tiberius client on a private current-thread runtime.
pub struct MsSqlSession {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
    database: String,
}

impl SqlSession for MsSqlSession {
    fn open(connection_string: &str) -> Result<Self, SqlError> {
        let config = Config::from_ado_string(connection_string)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let (client, database) = runtime.block_on(async move {
            let tcp = TcpStream::connect(config.get_addr()).await?;
            tcp.set_nodelay(true)?;
            let mut client = Client::connect(config, tcp.compat_write()).await?;
            let row = client.simple_query("SELECT DB_NAME()").await?.into_row().await?;
            let database = row
                .and_then(|r| r.get::<&str, _>(0).map(str::to_owned))
                .unwrap_or_default();
            Ok::<_, tiberius::error::Error>((client, database))
        })?;

        Ok(Self { runtime, client, database })
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    fn execute(&mut self, sql: &str) -> Result<(), SqlError> {
        let client = &mut self.client;
        // a plain batch keeps SET options on the session, unlike sp_executesql
        self.runtime.block_on(async {
            client.simple_query(sql).await?.into_results().await?;
            Ok::<_, tiberius::error::Error>(())
        })?;
        Ok(())
    }

    fn query_strings(&mut self, sql: &str, param: Option<&str>) -> Result<Vec<String>, SqlError> {
        let client = &mut self.client;
        let rows = self.runtime.block_on(async {
            let params: Vec<&dyn ToSql> = param.iter().map(|p| p as &dyn ToSql).collect();
            client.query(sql, &params).await?.into_first_result().await
        })?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get::<&str, _>(0).map(str::to_owned))
            .collect())
    }

    fn close(self) -> Result<(), SqlError> {
        let Self { runtime, client, .. } = self;
        runtime.block_on(client.close())?;
        Ok(())
    }
}

//! SQL Server catalog reader.
//!
//! Opens one TDS connection per call and runs the fixed queries from
//! [`super::queries`] one after the other. The first failing query aborts
//! the read; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, Row, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::{CatalogReader, queries, rows::RowExt};
use crate::{
    Result,
    config::ConnectionConfig,
    error::DbScribeError,
    models::{
        CatalogObject, CatalogSnapshot, CheckConstraint, Column, DatabaseInfo, ForeignKeyPart,
        IndexPart, KeyKind, KeyPart, ObjectKind, Parameter, TypeDescriptor,
    },
    security::Credentials,
};

type SqlClient = Client<Compat<TcpStream>>;

/// Catalog reader for SQL Server and Azure SQL.
pub struct SqlServerReader {
    config: Config,
    connect_timeout: Duration,
    description: String,
}

impl SqlServerReader {
    /// Builds a reader from connection settings and a login.
    ///
    /// No connection is opened here.
    ///
    /// # Errors
    /// Returns a configuration error if the connection string cannot be parsed
    pub fn new(connection: &ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        connection.validate()?;

        let mut config = if let Some(ado) = &connection.connection_string {
            Config::from_ado_string(ado).map_err(|_| {
                // The driver error may echo the string back, credentials included
                DbScribeError::configuration("connection_string is not a valid ADO.NET string")
            })?
        } else {
            let mut config = Config::new();
            config.host(&connection.host);
            if let Some(port) = connection.port {
                config.port(port);
            }
            if let Some(instance) = &connection.instance {
                config.instance_name(instance);
            }
            if let Some(database) = &connection.database {
                config.database(database);
            }
            config.authentication(AuthMethod::sql_server(
                credentials.username(),
                credentials.password().unwrap_or_default(),
            ));
            config
        };

        if connection.trust_server_certificate {
            config.trust_cert();
        }
        config.application_name("dbscribe");

        Ok(Self {
            config,
            connect_timeout: connection.connect_timeout(),
            description: format!("SQL Server {connection}"),
        })
    }

    /// Opens a connection, resolving named instances through SQL Browser.
    async fn connect(&self) -> Result<SqlClient> {
        let attempt = async {
            let tcp = TcpStream::connect_named(&self.config)
                .await
                .map_err(DbScribeError::connection_failed)?;
            tcp.set_nodelay(true)
                .map_err(DbScribeError::connection_failed)?;

            Client::connect(self.config.clone(), tcp.compat_write())
                .await
                .map_err(DbScribeError::connection_failed)
        };

        tokio::time::timeout(self.connect_timeout, attempt)
            .await
            .map_err(|elapsed| DbScribeError::Connection {
                context: format!(
                    "Connection timed out after {}s",
                    self.connect_timeout.as_secs()
                ),
                source: Box::new(elapsed),
            })?
    }
}

/// Runs one catalog query and buffers its rows.
async fn fetch(client: &mut SqlClient, name: &str, sql: &str) -> Result<Vec<Row>> {
    tracing::debug!("Running {} query", name);

    let stream = client
        .query(sql, &[])
        .await
        .map_err(|e| DbScribeError::collection_failed(format!("Failed to run {name} query"), e))?;

    let rows = stream.into_first_result().await.map_err(|e| {
        DbScribeError::collection_failed(format!("Failed to read {name} results"), e)
    })?;

    tracing::debug!("{} query returned {} rows", name, rows.len());
    Ok(rows)
}

fn type_descriptor(row: &Row, query: &str) -> Result<TypeDescriptor> {
    Ok(TypeDescriptor {
        name: row.text("type_name", query)?,
        max_length: row.int("max_length", query)?,
        precision: row.int("precision", query)?,
        scale: row.int("scale", query)?,
    })
}

fn read_database_info(rows: &[Row]) -> Result<DatabaseInfo> {
    const QUERY: &str = "database info";
    match rows.first() {
        Some(row) => Ok(DatabaseInfo {
            name: row.text("database_name", QUERY)?,
            product_version: row.opt_text("product_version", QUERY)?,
        }),
        None => Err(DbScribeError::query_failed(
            "database info query returned no rows",
        )),
    }
}

fn read_object(row: &Row) -> Result<Option<CatalogObject>> {
    const QUERY: &str = "objects";
    let type_code = row.text("object_type", QUERY)?;
    let Some(kind) = ObjectKind::from_type_code(&type_code) else {
        tracing::debug!("Skipping object with unsupported type '{}'", type_code);
        return Ok(None);
    };

    Ok(Some(CatalogObject {
        object_id: row.int("object_id", QUERY)?,
        schema: row.text("schema_name", QUERY)?,
        name: row.text("object_name", QUERY)?,
        kind,
        definition: row.opt_text("definition", QUERY)?,
        description: row.opt_text("description", QUERY)?,
    }))
}

fn read_column(row: &Row) -> Result<Column> {
    const QUERY: &str = "columns";
    Ok(Column {
        object_id: row.int("object_id", QUERY)?,
        ordinal: row.int("ordinal", QUERY)?,
        name: row.text("column_name", QUERY)?,
        data_type: type_descriptor(row, QUERY)?,
        is_nullable: row.flag("is_nullable", QUERY)?,
        is_identity: row.flag("is_identity", QUERY)?,
        default_expression: row.opt_text("default_definition", QUERY)?,
        computed_expression: row.opt_text("computed_definition", QUERY)?,
        description: row.opt_text("description", QUERY)?,
    })
}

fn read_key(row: &Row) -> Result<Option<KeyPart>> {
    const QUERY: &str = "keys";
    let type_code = row.text("constraint_type", QUERY)?;
    let Some(kind) = KeyKind::from_type_code(&type_code) else {
        tracing::debug!("Skipping key constraint with type '{}'", type_code);
        return Ok(None);
    };

    Ok(Some(KeyPart {
        object_id: row.int("object_id", QUERY)?,
        constraint_name: row.text("constraint_name", QUERY)?,
        kind,
        ordinal: row.int("ordinal", QUERY)?,
        column: row.text("column_name", QUERY)?,
    }))
}

fn read_foreign_key(row: &Row) -> Result<ForeignKeyPart> {
    const QUERY: &str = "foreign keys";
    Ok(ForeignKeyPart {
        constraint_name: row.text("constraint_name", QUERY)?,
        ordinal: row.int("ordinal", QUERY)?,
        parent_object_id: row.int("parent_object_id", QUERY)?,
        parent_schema: row.text("parent_schema", QUERY)?,
        parent_table: row.text("parent_table", QUERY)?,
        parent_column: row.text("parent_column", QUERY)?,
        referenced_object_id: row.int("referenced_object_id", QUERY)?,
        referenced_schema: row.text("referenced_schema", QUERY)?,
        referenced_table: row.text("referenced_table", QUERY)?,
        referenced_column: row.text("referenced_column", QUERY)?,
        on_delete: row.text("on_delete", QUERY)?,
        on_update: row.text("on_update", QUERY)?,
    })
}

fn read_check(row: &Row) -> Result<CheckConstraint> {
    const QUERY: &str = "check constraints";
    Ok(CheckConstraint {
        object_id: row.int("object_id", QUERY)?,
        name: row.text("constraint_name", QUERY)?,
        column: row.opt_text("column_name", QUERY)?,
        expression: row.text("definition", QUERY)?,
    })
}

fn read_parameter(row: &Row) -> Result<Parameter> {
    const QUERY: &str = "parameters";
    Ok(Parameter {
        object_id: row.int("object_id", QUERY)?,
        ordinal: row.int("ordinal", QUERY)?,
        // Return values have an empty name
        name: row.opt_text("parameter_name", QUERY)?.unwrap_or_default(),
        data_type: type_descriptor(row, QUERY)?,
        is_output: row.flag("is_output", QUERY)?,
    })
}

fn read_index(row: &Row) -> Result<IndexPart> {
    const QUERY: &str = "indexes";
    Ok(IndexPart {
        object_id: row.int("object_id", QUERY)?,
        index_name: row.text("index_name", QUERY)?,
        index_type: row.text("index_type", QUERY)?,
        is_unique: row.flag("is_unique", QUERY)?,
        ordinal: row.int("ordinal", QUERY)?,
        column: row.text("column_name", QUERY)?,
        is_descending: row.flag("is_descending", QUERY)?,
        is_included: row.flag("is_included", QUERY)?,
    })
}

/// Info line with the row count of every catalog query.
fn row_counts(snapshot: &CatalogSnapshot) -> String {
    format!(
        "Read catalog of {} (version {}): {} objects, {} columns, {} key columns, \
         {} foreign key columns, {} checks, {} parameters, {} index columns",
        snapshot.database.name,
        snapshot.database.product_version.as_deref().unwrap_or("unknown"),
        snapshot.objects.len(),
        snapshot.columns.len(),
        snapshot.keys.len(),
        snapshot.foreign_keys.len(),
        snapshot.checks.len(),
        snapshot.parameters.len(),
        snapshot.indexes.len()
    )
}

#[async_trait]
impl CatalogReader for SqlServerReader {
    async fn test_connection(&self) -> Result<()> {
        let mut client = self.connect().await?;
        fetch(&mut client, "connection test", "SELECT 1").await?;
        Ok(())
    }

    async fn read_catalog(&self) -> Result<CatalogSnapshot> {
        let mut client = self.connect().await?;

        let database = read_database_info(
            &fetch(&mut client, "database info", queries::DATABASE_INFO).await?,
        )?;
        tracing::info!("Reading catalog of database '{}'", database.name);

        let mut snapshot = CatalogSnapshot::new(database);

        for row in fetch(&mut client, "objects", queries::OBJECTS).await? {
            if let Some(object) = read_object(&row)? {
                snapshot.objects.push(object);
            }
        }

        snapshot.columns = fetch(&mut client, "columns", queries::COLUMNS)
            .await?
            .iter()
            .map(read_column)
            .collect::<Result<_>>()?;

        for row in fetch(&mut client, "keys", queries::KEYS).await? {
            if let Some(key) = read_key(&row)? {
                snapshot.keys.push(key);
            }
        }

        snapshot.foreign_keys = fetch(&mut client, "foreign keys", queries::FOREIGN_KEYS)
            .await?
            .iter()
            .map(read_foreign_key)
            .collect::<Result<_>>()?;

        snapshot.checks = fetch(&mut client, "check constraints", queries::CHECK_CONSTRAINTS)
            .await?
            .iter()
            .map(read_check)
            .collect::<Result<_>>()?;

        snapshot.parameters = fetch(&mut client, "parameters", queries::PARAMETERS)
            .await?
            .iter()
            .map(read_parameter)
            .collect::<Result<_>>()?;

        snapshot.indexes = fetch(&mut client, "indexes", queries::INDEXES)
            .await?
            .iter()
            .map(read_index)
            .collect::<Result<_>>()?;

        tracing::info!("{}", row_counts(&snapshot));

        Ok(snapshot)
    }

    fn safe_description(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn connection() -> ConnectionConfig {
        ConnectionConfig::new("sql01".to_string())
            .with_port(1433)
            .with_database("Sales".to_string())
            .with_username("reader".to_string())
    }

    #[test]
    fn test_reader_creation_does_not_connect() {
        let creds = Credentials::new("reader".to_string(), Some("secret".to_string()));
        let reader = SqlServerReader::new(&connection(), &creds).unwrap();
        assert_eq!(reader.connect_timeout, Duration::from_secs(30));
        assert_eq!(reader.config.get_addr(), "sql01:1433");
    }

    #[test]
    fn test_safe_description_has_no_credentials() {
        let creds = Credentials::new("reader".to_string(), Some("secret".to_string()));
        let reader = SqlServerReader::new(&connection(), &creds).unwrap();

        let description = reader.safe_description();
        assert!(description.contains("SQL Server"));
        assert!(description.contains("sql01:1433/Sales"));
        assert!(!description.contains("secret"));
        assert!(!description.contains("reader"));
    }

    #[test]
    fn test_reader_from_ado_string() {
        let connection = ConnectionConfig {
            connection_string: Some(
                "server=tcp:sql02,1444;database=Sales;user=reader;password=secret".to_string(),
            ),
            ..Default::default()
        };
        let creds = Credentials::new(String::new(), None);
        let reader = SqlServerReader::new(&connection, &creds).unwrap();
        assert!(!reader.safe_description().contains("secret"));
    }

    #[test]
    fn test_reader_rejects_invalid_config() {
        let connection = ConnectionConfig {
            database: None,
            ..connection()
        };
        let creds = Credentials::new("reader".to_string(), None);
        assert!(SqlServerReader::new(&connection, &creds).is_err());
    }

    #[test]
    fn test_row_counts_cover_every_query() {
        let mut snapshot = CatalogSnapshot::new(DatabaseInfo::new("Sales"));
        snapshot.parameters.push(Parameter {
            object_id: 7,
            ordinal: 1,
            name: "@Id".to_string(),
            data_type: TypeDescriptor {
                name: "int".to_string(),
                max_length: 4,
                precision: 10,
                scale: 0,
            },
            is_output: false,
        });

        let line = row_counts(&snapshot);
        assert!(line.starts_with("Read catalog of Sales (version unknown): 0 objects"));
        for part in [
            "0 columns",
            "0 key columns",
            "0 foreign key columns",
            "0 checks",
            "1 parameters",
            "0 index columns",
        ] {
            assert!(line.contains(part), "{line} is missing {part}");
        }
    }
}

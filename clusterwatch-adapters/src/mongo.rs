//! MongoDB adapter using the official async driver.
//!
//! This adapter reads document counts and replication status from a MongoDB
//! replica set.
//!
//! ## Commands Used
//!
//! - **listDatabases / listCollections**: enumerate namespaces
//! - **countDocuments** with an empty filter: exact document counts
//! - **replSetGetStatus** (on `admin`): replica set member list
//! - **dbStats**: storage size of a database
//!
//! ## Example
//!
//! ```rust,no_run
//! use clusterwatch_adapters::mongo::MongoAdapter;
//! use clusterwatch_adapters::ClusterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MongoAdapter::builder()
//!         .endpoint("mongodb://127.0.0.1:27017,127.0.0.1:27018/?replicaSet=rs0")
//!         .connect()
//!         .await?;
//!
//!     for member in adapter.replica_set_members().await? {
//!         println!("{} ({})", member.name, member.state);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, ServerAddress};
use mongodb::Client;

use clusterwatch_types::ReplicaMember;

use crate::{AdapterError, ClusterClient};

/// MongoDB adapter for reading collection counts and topology.
#[derive(Debug, Clone)]
pub struct MongoAdapter {
    client: Client,
    options: ClientOptions,
    description: String,
}

impl MongoAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> MongoAdapterBuilder {
        MongoAdapterBuilder::default()
    }

    /// The underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn run_command(&self, database: &str, command: Document) -> Result<Document, AdapterError> {
        Ok(self.client.database(database).run_command(command).await?)
    }

    /// Options for a direct connection to a single member.
    fn member_options(&self, member: &ReplicaMember) -> Result<ClientOptions, AdapterError> {
        let address = ServerAddress::parse(&member.name)
            .map_err(|e| AdapterError::Parse(format!("member address '{}': {}", member.name, e)))?;

        let mut options = self.options.clone();
        options.hosts = vec![address];
        options.repl_set_name = None;
        options.direct_connection = Some(true);
        Ok(options)
    }
}

#[async_trait]
impl ClusterClient for MongoAdapter {
    async fn list_database_names(&self) -> Result<Vec<String>, AdapterError> {
        Ok(self.client.list_database_names().await?)
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>, AdapterError> {
        Ok(self.client.database(database).list_collection_names().await?)
    }

    async fn count_documents(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<u64, AdapterError> {
        let collection = self
            .client
            .database(database)
            .collection::<Document>(collection);
        Ok(collection.count_documents(doc! {}).await?)
    }

    async fn replica_set_members(&self) -> Result<Vec<ReplicaMember>, AdapterError> {
        let status = self.run_command("admin", doc! { "replSetGetStatus": 1 }).await?;
        parse_members(&status)
    }

    async fn storage_size_bytes(&self, database: &str) -> Result<f64, AdapterError> {
        let stats = self.run_command(database, doc! { "dbStats": 1 }).await?;
        stats
            .get("storageSize")
            .and_then(bson_number)
            .ok_or_else(|| AdapterError::Parse("dbStats response has no storageSize".to_string()))
    }

    async fn connect_member(
        &self,
        member: &ReplicaMember,
    ) -> Result<Arc<dyn ClusterClient>, AdapterError> {
        let options = self.member_options(member)?;
        let client = Client::with_options(options.clone())?;
        Ok(Arc::new(MongoAdapter {
            client,
            options,
            description: format!("mongodb://{}/?directConnection=true", member.name),
        }))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for MongoAdapter.
#[derive(Debug, Default)]
pub struct MongoAdapterBuilder {
    endpoint: Option<String>,
    app_name: Option<String>,
    timeout: Option<Duration>,
}

impl MongoAdapterBuilder {
    /// Set the connection string (e.g., "mongodb://host1,host2/?replicaSet=rs0").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the application name reported to the server (default: "clusterwatch").
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Set the connect and server selection timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parse the connection string and build the adapter.
    ///
    /// The driver connects lazily, so an unreachable cluster surfaces on the
    /// first command rather than here.
    pub async fn connect(self) -> Result<MongoAdapter, AdapterError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "mongodb://127.0.0.1:27017".to_string());
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let mut options = ClientOptions::parse(&endpoint).await?;
        options.app_name = Some(self.app_name.unwrap_or_else(|| "clusterwatch".to_string()));
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options.clone())?;

        Ok(MongoAdapter {
            client,
            options,
            description: redact_credentials(&endpoint),
        })
    }
}

/// Read the member list out of a `replSetGetStatus` reply.
fn parse_members(status: &Document) -> Result<Vec<ReplicaMember>, AdapterError> {
    let members = status
        .get_array("members")
        .map_err(|e| AdapterError::Parse(format!("replSetGetStatus members: {}", e)))?;

    members
        .iter()
        .map(|member| {
            let Bson::Document(member) = member else {
                return Err(AdapterError::Parse(
                    "replSetGetStatus member is not a document".to_string(),
                ));
            };
            let name = member
                .get_str("name")
                .map_err(|e| AdapterError::Parse(format!("member name: {}", e)))?;
            let state = member.get_str("stateStr").unwrap_or("UNKNOWN");
            let healthy = member
                .get("health")
                .and_then(bson_number)
                .map(|h| h >= 1.0)
                .unwrap_or(false);

            Ok(ReplicaMember {
                name: name.to_string(),
                state: state.to_string(),
                healthy,
            })
        })
        .collect()
}

// Numeric server fields may come back as any BSON number type
fn bson_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

// Hide user:password in a connection string used for display
fn redact_credentials(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}

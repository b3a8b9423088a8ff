use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every field of a remote record beyond its identity. Stored exactly as
/// received, so a record serializes back to the body it was decoded from.
pub type Extra = Map<String, Value>;

/// Typed views over the fields a record keeps in [`Extra`].
///
/// Views are lenient: a missing, `null` or unrecognised value reads as
/// `None` and never fails the decode of the record itself.
pub trait Record {
    fn extra(&self) -> &Extra;

    fn field(&self, key: &str) -> Option<&Value> {
        self.extra().get(key).filter(|v| !v.is_null())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    fn parsed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.field(key).and_then(|v| T::deserialize(v).ok())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.str_field("created_at").and_then(parse_timestamp)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.str_field("updated_at").and_then(parse_timestamp)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

macro_rules! records {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Record for $ty {
                fn extra(&self) -> &Extra {
                    &self.extra
                }
            }
        )+
    };
}

records!(
    Server,
    ServerResource,
    ServerDomain,
    Project,
    Environment,
    Application,
    Deployment,
    Database,
    Service,
    CreatedResource,
    MessageResponse,
);

// ── Servers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Server {
    /// `running`, `stopped` or `error` on current platforms.
    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn usage(&self) -> Option<ServerUsage> {
        self.parsed("resources")
    }
}

/// Utilisation figures reported alongside a server.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ServerUsage {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

/// One entry of the `/servers/{uuid}/resources` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResource {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ServerResource {
    pub fn kind(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }
}

pub type ServerResources = Vec<ServerResource>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDomain {
    pub ip: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ServerDomain {
    pub fn domains(&self) -> Vec<&str> {
        self.field("domains")
            .and_then(Value::as_array)
            .map(|domains| domains.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

// ── Projects ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Project {
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Only present when the project was fetched by uuid.
    pub fn environments(&self) -> Option<Vec<Environment>> {
        self.parsed("environments")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateProjectRequest {
    /// Project name
    pub name: String,
    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateProjectRequest {
    /// New project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New project description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Environments ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Environment {
    pub fn project_uuid(&self) -> Option<&str> {
        self.str_field("project_uuid")
    }

    pub fn variables(&self) -> Option<BTreeMap<String, String>> {
        self.parsed("variables")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateEnvironmentRequest {
    /// Environment name, unique within the project
    pub name: String,
    /// Project the environment belongs to
    pub project_uuid: String,
    /// Initial environment variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateEnvironmentVariablesRequest {
    /// Variables to set on the environment
    pub variables: BTreeMap<String, String>,
}

// ── Applications ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum BuildPack {
    Nixpacks,
    Static,
    Dockerfile,
    Dockercompose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Application {
    /// `None` when absent or when the platform reports a build pack this
    /// client does not know; the raw value stays in `extra`.
    pub fn build_pack(&self) -> Option<BuildPack> {
        self.parsed("build_pack")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn git_repository(&self) -> Option<&str> {
        self.str_field("git_repository")
    }

    pub fn git_branch(&self) -> Option<&str> {
        self.str_field("git_branch")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateApplicationRequest {
    /// Project to create the application in
    pub project_uuid: String,
    /// Server the application is deployed to
    pub server_uuid: String,
    /// Target environment, by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    /// Target environment, by uuid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_uuid: Option<String>,
    /// Public git repository URL
    pub git_repository: String,
    /// Branch to build from
    pub git_branch: String,
    pub build_pack: BuildPack,
    /// Comma-separated list of exposed ports, e.g. "3000"
    pub ports_exposes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated list of domains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,
    /// Deploy right after creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_deploy: Option<bool>,
}

// ── Deployments ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub uuid: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Deployment {
    pub fn application_uuid(&self) -> Option<&str> {
        self.str_field("application_uuid")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }
}

// ── Databases ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Postgresql,
    Mysql,
    Mariadb,
    Mongodb,
    Redis,
    Keydb,
    Clickhouse,
    Dragonfly,
}

/// A managed database. Engine-specific credentials and settings
/// (`postgres_user`, `mysql_root_password`, ...) sit in `extra` next to the
/// common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Database {
    pub fn kind(&self) -> Option<DatabaseType> {
        self.parsed("type")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn is_public(&self) -> bool {
        self.field("is_public").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateDatabaseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Docker image, e.g. "postgres:16-alpine"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Expose the database outside the server network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory_swap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory_swappiness: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory_reservation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_cpus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_cpuset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_cpu_shares: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_initdb_args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_host_auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_root_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mariadb_root_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mariadb_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mariadb_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mariadb_database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mariadb_conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongo_initdb_root_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongo_initdb_root_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongo_initdb_database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongo_conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keydb_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keydb_conf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickhouse_admin_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickhouse_admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragonfly_password: Option<String>,
}

/// Cleanup flags for database and service deletion. Only the flags that
/// are set end up in the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DeleteOptions {
    /// Remove stored configuration files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_configurations: Option<bool>,
    /// Remove attached volumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_volumes: Option<bool>,
    /// Run docker cleanup afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_cleanup: Option<bool>,
    /// Remove networks only this resource was attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_connected_networks: Option<bool>,
}

// ── Services ────────────────────────────────────────────────────────

macro_rules! service_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One-click service templates known to the platform.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
        pub enum ServiceType {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl ServiceType {
            pub const ALL: &'static [ServiceType] = &[$(ServiceType::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

service_types! {
    Activepieces => "activepieces",
    Appsmith => "appsmith",
    Appwrite => "appwrite",
    Authentik => "authentik",
    Babybuddy => "babybuddy",
    Budge => "budge",
    Changedetection => "changedetection",
    Chatwoot => "chatwoot",
    ClassicpressWithMariadb => "classicpress-with-mariadb",
    ClassicpressWithMysql => "classicpress-with-mysql",
    ClassicpressWithoutDatabase => "classicpress-without-database",
    Cloudflared => "cloudflared",
    CodeServer => "code-server",
    Dashboard => "dashboard",
    Directus => "directus",
    DirectusWithPostgresql => "directus-with-postgresql",
    DockerRegistry => "docker-registry",
    Docuseal => "docuseal",
    DocusealWithPostgres => "docuseal-with-postgres",
    Dokuwiki => "dokuwiki",
    Duplicati => "duplicati",
    Emby => "emby",
    Embystat => "embystat",
    Fider => "fider",
    Filebrowser => "filebrowser",
    Firefly => "firefly",
    Formbricks => "formbricks",
    Ghost => "ghost",
    Gitea => "gitea",
    GiteaWithMariadb => "gitea-with-mariadb",
    GiteaWithMysql => "gitea-with-mysql",
    GiteaWithPostgresql => "gitea-with-postgresql",
    Glance => "glance",
    Glances => "glances",
    Glitchtip => "glitchtip",
    Grafana => "grafana",
    GrafanaWithPostgresql => "grafana-with-postgresql",
    Grocy => "grocy",
    Heimdall => "heimdall",
    Homepage => "homepage",
    Jellyfin => "jellyfin",
    Kuzzle => "kuzzle",
    Listmonk => "listmonk",
    Logto => "logto",
    Mediawiki => "mediawiki",
    Meilisearch => "meilisearch",
    Metabase => "metabase",
    Metube => "metube",
    Minio => "minio",
    Moodle => "moodle",
    N8n => "n8n",
    N8nWithPostgresql => "n8n-with-postgresql",
    NextImageTransformation => "next-image-transformation",
    Nextcloud => "nextcloud",
    Nocodb => "nocodb",
    Odoo => "odoo",
    Openblocks => "openblocks",
    Pairdrop => "pairdrop",
    Penpot => "penpot",
    Phpmyadmin => "phpmyadmin",
    Pocketbase => "pocketbase",
    Posthog => "posthog",
    ReactiveResume => "reactive-resume",
    Rocketchat => "rocketchat",
    Shlink => "shlink",
    Slash => "slash",
    Snapdrop => "snapdrop",
    Statusnook => "statusnook",
    StirlingPdf => "stirling-pdf",
    Supabase => "supabase",
    Syncthing => "syncthing",
    Tolgee => "tolgee",
    Trigger => "trigger",
    TriggerWithExternalDatabase => "trigger-with-external-database",
    Twenty => "twenty",
    Umami => "umami",
    UnleashWithPostgresql => "unleash-with-postgresql",
    UnleashWithoutDatabase => "unleash-without-database",
    UptimeKuma => "uptime-kuma",
    Vaultwarden => "vaultwarden",
    Vikunja => "vikunja",
    Weblate => "weblate",
    Whoogle => "whoogle",
    WordpressWithMariadb => "wordpress-with-mariadb",
    WordpressWithMysql => "wordpress-with-mysql",
    WordpressWithoutDatabase => "wordpress-without-database",
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Service {
    /// `None` for templates added to the platform after this client.
    pub fn kind(&self) -> Option<ServiceType> {
        self.parsed("type")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn domains(&self) -> Vec<&str> {
        self.field("domains")
            .and_then(Value::as_array)
            .map(|domains| domains.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateServiceRequest {
    /// Service template to instantiate
    #[serde(rename = "type")]
    pub kind: ServiceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_uuid: String,
    /// Target environment, by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    /// Target environment, by uuid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_uuid: Option<String>,
    pub server_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_uuid: Option<String>,
    /// Deploy right after creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_deploy: Option<bool>,
}

// ── Shared response bodies ──────────────────────────────────────────

/// Body returned by create calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResource {
    pub uuid: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CreatedResource {
    /// Domains assigned by the platform, when it generated any.
    pub fn domains(&self) -> Option<Vec<String>> {
        self.parsed("domains")
    }
}

/// Body returned by deletes, validation and lifecycle actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Error envelope sent by the platform on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

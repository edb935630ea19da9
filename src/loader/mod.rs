use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::model::{self, Ability, AbilitySource, Fighter};

pub const DEFAULT_DATA_URL: &str = "https://krisling049.github.io/warcry_data";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Fighters,
    Abilities,
    BattleTraits,
}

impl Collection {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Fighters => "fighters.json",
            Self::Abilities => "abilities.json",
            Self::BattleTraits => "battletraits.json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fighters => "fighters",
            Self::Abilities => "abilities",
            Self::BattleTraits => "battle traits",
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {collection}: {url}: {source}")]
    Request {
        collection: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {collection}: {url}: HTTP {status}")]
    Status {
        collection: &'static str,
        url: String,
        status: u16,
    },

    #[error("failed to read {collection}: {path}: {source}")]
    FileRead {
        collection: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {collection}: {source}")]
    Parse {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the JSON collections live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    Directory(PathBuf),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Remote(DEFAULT_DATA_URL.to_string())
    }
}

impl DataSource {
    pub fn location(&self, collection: Collection) -> String {
        match self {
            Self::Remote(base) => format!("{}/{}", base.trim_end_matches('/'), collection.file_name()),
            Self::Directory(dir) => dir.join(collection.file_name()).display().to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub source: DataSource,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

/// All records of one session. Abilities hold abilities followed by battle traits.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub fighters: Vec<Fighter>,
    pub abilities: Vec<Ability>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty() && self.abilities.is_empty()
    }
}

/// Parse a collection body. Anything but a JSON array is an empty collection.
pub fn parse_collection(collection: Collection, body: &[u8]) -> Result<Vec<Value>, LoadError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| LoadError::Parse {
        collection: collection.name(),
        source: e,
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

fn build_client(timeout_seconds: u64, proxy: Option<&str>) -> Result<reqwest::Client, LoadError> {
    let timeout = Duration::from_secs(if timeout_seconds == 0 { 10 } else { timeout_seconds });
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("warforger/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| LoadError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| LoadError::HttpClientBuild { source: e })
}

struct Fetcher {
    client: Option<reqwest::Client>,
    source: DataSource,
}

impl Fetcher {
    fn new(options: &LoadOptions) -> Result<Self, LoadError> {
        let client = match options.source {
            DataSource::Remote(_) => Some(build_client(
                options.timeout_seconds,
                options.proxy.as_deref(),
            )?),
            DataSource::Directory(_) => None,
        };
        Ok(Self {
            client,
            source: options.source.clone(),
        })
    }

    async fn fetch(&self, collection: Collection) -> Result<Vec<Value>, LoadError> {
        let location = self.source.location(collection);
        let body = match (&self.source, self.client.as_ref()) {
            (DataSource::Remote(_), Some(client)) => {
                fetch_remote(client, collection, &location).await?
            }
            _ => read_local(collection, Path::new(&location)).await?,
        };
        parse_collection(collection, &body)
    }
}

async fn fetch_remote(
    client: &reqwest::Client,
    collection: Collection,
    url: &str,
) -> Result<Vec<u8>, LoadError> {
    let request_error = |e| LoadError::Request {
        collection: collection.name(),
        url: url.to_string(),
        source: e,
    };
    let resp = client.get(url).send().await.map_err(request_error)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            collection: collection.name(),
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = resp.bytes().await.map_err(request_error)?;
    Ok(bytes.to_vec())
}

async fn read_local(collection: Collection, path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::FileRead {
            collection: collection.name(),
            path: path.display().to_string(),
            source: e,
        })
}

/// Fetch the fighter collection only.
pub async fn load_fighters(options: &LoadOptions) -> Result<Dataset, LoadError> {
    let fetcher = Fetcher::new(options)?;
    let fighters = fetcher.fetch(Collection::Fighters).await?;
    Ok(Dataset {
        fighters: model::parse_fighters(&fighters),
        abilities: Vec::new(),
    })
}

/// Fetch abilities, battle traits and fighters concurrently. Any failure
/// fails the whole load.
pub async fn load_abilities(options: &LoadOptions) -> Result<Dataset, LoadError> {
    let fetcher = Fetcher::new(options)?;
    let (abilities, battle_traits, fighters) = futures::try_join!(
        fetcher.fetch(Collection::Abilities),
        fetcher.fetch(Collection::BattleTraits),
        fetcher.fetch(Collection::Fighters),
    )?;

    let mut combined = model::parse_abilities(&abilities, AbilitySource::Ability);
    combined.extend(model::parse_abilities(
        &battle_traits,
        AbilitySource::BattleTrait,
    ));
    Ok(Dataset {
        fighters: model::parse_fighters(&fighters),
        abilities: combined,
    })
}

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::gateway::SearchResult;

/// 上游调用失败分类
#[derive(Debug)]
pub enum UpstreamError {
    /// 网络不可达、超时或响应体无法解码
    Unavailable(String),
    /// 收到非成功状态码
    Status(u16),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Unavailable(reason) => write!(f, "上游不可用: {}", reason),
            UpstreamError::Status(code) => write!(f, "上游返回状态码 {}", code),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// 远端搜索契约：每次调用恰好发起一次外呼，不重试；
/// 成功但结果为空按有效空序列处理，不算失败
#[async_trait]
pub trait UpstreamSearch: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, UpstreamError>;
}

/// 第三方游戏搜索 API 客户端
pub struct GameApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GameApiClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.upstream_timeout())
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.upstream_api_url.clone(),
            api_key: config.upstream_api_key.clone(),
        })
    }
}

#[async_trait]
impl UpstreamSearch for GameApiClient {
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, UpstreamError> {
        // 查询参数由 reqwest 负责百分号编码
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("search", term), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(term, status = status.as_u16(), "upstream search returned error status");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let page: SearchPage = response
            .json()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        Ok(page.results.into_iter().map(SearchResult::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<RemoteGame>,
}

/// 远端结果记录，字段名随上游
#[derive(Debug, Deserialize)]
pub struct RemoteGame {
    #[serde(default)]
    name: String,
    #[serde(default)]
    platforms: Option<Vec<PlatformEntry>>,
    #[serde(default, rename = "background_image")]
    image_ref: Option<String>,
}

/// 上游平台字段的三种已知形态：纯字符串、{name}、嵌套 {platform: {name}}
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlatformEntry {
    Plain(String),
    Named { name: String },
    Nested { platform: NamedPlatform },
}

#[derive(Debug, Deserialize)]
struct NamedPlatform {
    name: String,
}

impl PlatformEntry {
    fn into_name(self) -> String {
        match self {
            PlatformEntry::Plain(name) => name,
            PlatformEntry::Named { name } => name,
            PlatformEntry::Nested { platform } => platform.name,
        }
    }
}

// 归一化在客户端边界完成一次，下游只见统一形态
impl From<RemoteGame> for SearchResult {
    fn from(game: RemoteGame) -> Self {
        SearchResult {
            name: game.name,
            platforms: game
                .platforms
                .unwrap_or_default()
                .into_iter()
                .map(PlatformEntry::into_name)
                .collect(),
            image_ref: game.image_ref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_secs: 3600,
            upstream_api_url: base_url,
            upstream_api_key: "api-key".to_string(),
            upstream_timeout_secs: 2,
            cache_ttl_secs: 3600,
            rate_limit_window_secs: 900,
            rate_limit_attempts: 5,
        }
    }

    #[tokio::test]
    async fn search_normalizes_all_platform_encodings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/games"))
            .and(query_param("search", "zelda"))
            .and(query_param("key", "api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "name": "Zelda",
                        "platforms": [
                            {"platform": {"name": "Switch", "id": 7}},
                            "PC",
                            {"name": "PS5"}
                        ],
                        "background_image": "http://img/zelda.jpg"
                    },
                    {
                        "name": "Zelda II"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client =
            GameApiClient::new(&test_config(format!("{}/api/games", server.uri()))).unwrap();
        let results = client.search("zelda").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Zelda");
        assert_eq!(results[0].platforms, vec!["Switch", "PC", "PS5"]);
        assert_eq!(results[0].image_ref.as_deref(), Some("http://img/zelda.jpg"));
        assert_eq!(results[1].name, "Zelda II");
        assert!(results[1].platforms.is_empty());
        assert!(results[1].image_ref.is_none());
    }

    #[tokio::test]
    async fn empty_result_page_is_valid_and_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/games"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let client =
            GameApiClient::new(&test_config(format!("{}/api/games", server.uri()))).unwrap();
        let results = client.search("nothing").await.unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/games"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client =
            GameApiClient::new(&test_config(format!("{}/api/games", server.uri()))).unwrap();

        match client.search("zelda").await {
            Err(UpstreamError::Status(503)) => {}
            other => panic!("expected Status(503), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_classified_as_unavailable() {
        let client =
            GameApiClient::new(&test_config("http://127.0.0.1:1/api/games".to_string())).unwrap();

        match client.search("zelda").await {
            Err(UpstreamError::Unavailable(_)) => {}
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// 本地游戏目录记录，插入后不可变
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: String,
    pub name: String,
    pub platforms: Vec<String>,
    pub image_ref: String,
}

/// 待插入的目录记录，三个字段均已在入口校验为非空
#[derive(Debug, Clone)]
pub struct NewGame {
    pub name: String,
    pub platforms: Vec<String>,
    pub image_ref: String,
}

/// 目录存储契约，网关和插入入口都通过它访问持久层
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, game: NewGame) -> Result<Game, sqlx::Error>;

    /// 名称子串匹配（不区分大小写），按插入顺序返回
    async fn find_by_name_contains(&self, term: &str) -> Result<Vec<Game>, sqlx::Error>;
}

/// Postgres 目录实现
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn insert(&self, game: NewGame) -> Result<Game, sqlx::Error> {
        let game_id = Uuid::new_v4().to_string();

        let inserted = sqlx::query_as::<_, Game>(
            r#"
            INSERT INTO games (game_id, name, platforms, image_ref)
            VALUES ($1, $2, $3, $4)
            RETURNING game_id, name, platforms, image_ref
            "#,
        )
        .bind(&game_id)
        .bind(&game.name)
        .bind(&game.platforms)
        .bind(&game.image_ref)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(game_id = %inserted.game_id, name = %inserted.name, "catalog record inserted");
        Ok(inserted)
    }

    async fn find_by_name_contains(&self, term: &str) -> Result<Vec<Game>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));

        let games = sqlx::query_as::<_, Game>(
            r#"
            SELECT game_id, name, platforms, image_ref
            FROM games
            WHERE name ILIKE $1
            ORDER BY created_at
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }
}

/// 转义 LIKE 模式中的通配符，搜索词只能按字面匹配
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

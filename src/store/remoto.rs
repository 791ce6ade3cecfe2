// src/store/remoto.rs
use crate::config::RemotoConfig;
use crate::error::AppResult;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Backend Postgres (Supabase). Todas as consultas recebem nomes de
/// tabela e coluna vindos de constantes do código, nunca do cliente.
#[derive(Debug, Clone)]
pub struct Remoto {
    pool: PgPool,
}

impl Remoto {
    /// Abre o pool e aplica as migrações. Falha de conexão não derruba o
    /// servidor: devolve `None` e o sistema segue só com arquivos.
    pub async fn conectar(config: &RemotoConfig) -> Option<Self> {
        let opcoes = match PgConnectOptions::from_str(&config.url) {
            Ok(o) => o.password(&config.service_key),
            Err(e) => {
                tracing::warn!("⚠️ SUPABASE_DB_URL inválida: {e}");
                return None;
            }
        };
        let pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(opcoes)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!("⚠️ Supabase indisponível ({e}); seguindo só com arquivos");
                return None;
            }
        };
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::warn!("⚠️ Falha ao migrar o banco remoto: {e}");
        }
        tracing::info!("✅ Conectado ao Supabase");
        Some(Self { pool })
    }

    /// Lista todos os registros de uma tabela como JSON, ordenados.
    pub async fn listar(&self, tabela: &str, chave_ordem: &str) -> AppResult<Vec<Value>> {
        let sql = format!("SELECT to_jsonb(t) FROM {tabela} t ORDER BY t.{chave_ordem}");
        let linhas = sqlx::query_scalar::<_, Value>(&sql).fetch_all(&self.pool).await?;
        Ok(linhas)
    }

    pub async fn buscar_por_id(&self, tabela: &str, id: i64) -> AppResult<Option<Value>> {
        let sql = format!("SELECT to_jsonb(t) FROM {tabela} t WHERE t.id = $1");
        let linha = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha)
    }

    pub async fn buscar_por_chave(
        &self,
        tabela: &str,
        coluna: &str,
        valor: &str,
    ) -> AppResult<Option<Value>> {
        let sql = format!("SELECT to_jsonb(t) FROM {tabela} t WHERE t.{coluna} = $1");
        let linha = sqlx::query_scalar::<_, Value>(&sql)
            .bind(valor)
            .fetch_optional(&self.pool)
            .await?;
        Ok(linha)
    }

    /// Insere ou atualiza um registro a partir do seu JSON. Campos do
    /// documento fora de `colunas` são ignorados pelo banco.
    pub async fn gravar(
        &self,
        tabela: &str,
        colunas: &[&str],
        chave_conflito: &str,
        doc: &Value,
    ) -> AppResult {
        let sql = sql_upsert(tabela, colunas, chave_conflito);
        sqlx::query(&sql).bind(doc).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn remover_por_id(&self, tabela: &str, id: i64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {tabela} WHERE id = $1");
        let feito = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(feito.rows_affected() > 0)
    }

    pub async fn remover_por_chave(
        &self,
        tabela: &str,
        coluna: &str,
        valor: &str,
    ) -> AppResult<bool> {
        let sql = format!("DELETE FROM {tabela} WHERE {coluna} = $1");
        let feito = sqlx::query(&sql).bind(valor).execute(&self.pool).await?;
        Ok(feito.rows_affected() > 0)
    }
}

/// Monta o upsert de um registro JSON via `jsonb_populate_record`, com
/// `ON CONFLICT` na chave indicada.
fn sql_upsert(tabela: &str, colunas: &[&str], chave_conflito: &str) -> String {
    let lista = colunas.join(", ");
    let atualizacoes: Vec<String> = colunas
        .iter()
        .filter(|c| **c != chave_conflito)
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect();
    let acao = if atualizacoes.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", atualizacoes.join(", "))
    };
    format!(
        "INSERT INTO {tabela} ({lista}) \
         SELECT {lista} FROM jsonb_populate_record(NULL::{tabela}, $1) \
         ON CONFLICT ({chave_conflito}) {acao}"
    )
}

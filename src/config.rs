// src/config.rs
use std::env;
use std::path::PathBuf;

/// Ligação ao backend remoto (Postgres gerido).
///
/// Os dois valores são obrigatórios em conjunto: sem a URL *e* a chave de
/// serviço o processo corre em modo apenas-arquivos durante toda a vida.
#[derive(Debug, Clone)]
pub struct RemotoConfig {
    /// Connection string do Postgres (sem a senha).
    pub url: String,
    /// Chave de serviço, injetada como senha da ligação.
    pub service_key: String,
}

/// Configuração do processo, lida uma única vez no arranque e passada
/// explicitamente ao store (nenhum estado global mutável).
#[derive(Debug, Clone)]
pub struct Config {
    pub remoto: Option<RemotoConfig>,
    /// Diretório dos arquivos JSON locais.
    pub dir_dados: PathBuf,
    /// Diretório dos assets estáticos servidos como fallback.
    pub dir_publico: PathBuf,
    pub porta: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let remoto = match (env::var("SUPABASE_DB_URL"), env::var("SUPABASE_SERVICE_KEY")) {
            (Ok(url), Ok(service_key)) if !url.is_empty() && !service_key.is_empty() => {
                Some(RemotoConfig { url, service_key })
            }
            _ => {
                tracing::warn!("⚠️ SUPABASE_DB_URL/SUPABASE_SERVICE_KEY ausentes; modo apenas arquivos JSON");
                None
            }
        };

        let dir_dados = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let dir_publico = env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public"));

        let porta = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self { remoto, dir_dados, dir_publico, porta }
    }
}

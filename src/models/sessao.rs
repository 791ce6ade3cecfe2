// src/models/sessao.rs
use serde::{Deserialize, Serialize};

/// Janela de validade fixa de uma sessão: 24 horas, em milissegundos.
pub const VALIDADE_SESSAO_MS: i64 = 86_400_000;

/// Sessão autenticada, chaveada pelo token opaco devolvido no login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sessao {
    pub token: String,
    pub email: String,
    /// Momento de criação em milissegundos de época.
    pub criado_em: i64,
    #[serde(default)]
    pub ip: Option<String>,
}

impl Sessao {
    /// Uma sessão expira quando a idade passa de 24 horas. O limite exato
    /// ainda vale; um milissegundo além dele já não.
    pub fn expirada(&self, agora_ms: i64) -> bool {
        agora_ms - self.criado_em > VALIDADE_SESSAO_MS
    }
}

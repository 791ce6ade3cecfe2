// src/models/usuario.rs
use serde::{Deserialize, Serialize};

use super::Status;

/// Conta de acesso do sistema, chaveada pelo email.
///
/// A senha nunca é guardada em claro: apenas o par hash + salt derivado
/// pelo codec de credenciais. Os `alias` cobrem as três grafias antigas
/// encontradas nos arquivos de dados; valem só na leitura, toda escrita
/// nova sai com os nomes canônicos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub name: String,
    pub email: String,
    #[serde(alias = "passwordHash", alias = "passwordhash", alias = "password_hash")]
    pub senha_hash: String,
    #[serde(alias = "passwordSalt", alias = "passwordsalt", alias = "password_salt")]
    pub senha_salt: String,
    #[serde(default = "role_padrao")]
    pub role: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub criado_em: String,
    #[serde(default)]
    pub ultimo_login: Option<String>,
}

fn role_padrao() -> String {
    "user".to_string()
}

/// Visão devolvida pelas rotas de autenticação (sem credenciais).
#[derive(Debug, Clone, Serialize)]
pub struct UsuarioPublico {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&Usuario> for UsuarioPublico {
    fn from(u: &Usuario) -> Self {
        Self {
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
        }
    }
}

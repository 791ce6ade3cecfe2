// src/models/admin.rs
use serde::{Deserialize, Serialize};

use super::academia::em_branco;
use super::Status;

/// Nível de permissão de um administrador do painel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nivel {
    Admin,
    SuperAdmin,
}

/// Administrador do painel de gestão.
///
/// Guarda as próprias credenciais (mesmo codec dos usuários). Os `alias`
/// `senha`/`salt` leem os registros antigos; a escrita usa os nomes
/// canônicos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Administrador {
    #[serde(default)]
    pub id: i64,
    pub nome: String,
    pub email: String,
    #[serde(default, alias = "senha")]
    pub senha_hash: String,
    #[serde(default, alias = "salt")]
    pub senha_salt: String,
    #[serde(default = "nivel_padrao")]
    pub nivel: Nivel,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub criado_por: Option<String>,
    #[serde(default)]
    pub criado_em: String,
    #[serde(default)]
    pub atualizado_em: Option<String>,
}

fn nivel_padrao() -> Nivel {
    Nivel::Admin
}

/// Visão devolvida pela API (sem hash nem salt).
#[derive(Debug, Clone, Serialize)]
pub struct AdminPublico {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub nivel: Nivel,
    pub status: Status,
    pub telefone: Option<String>,
    pub observacoes: Option<String>,
    pub criado_por: Option<String>,
    pub criado_em: String,
    pub atualizado_em: Option<String>,
}

impl From<&Administrador> for AdminPublico {
    fn from(a: &Administrador) -> Self {
        Self {
            id: a.id,
            nome: a.nome.clone(),
            email: a.email.clone(),
            nivel: a.nivel,
            status: a.status,
            telefone: a.telefone.clone(),
            observacoes: a.observacoes.clone(),
            criado_por: a.criado_por.clone(),
            criado_em: a.criado_em.clone(),
            atualizado_em: a.atualizado_em.clone(),
        }
    }
}

/// Entrada de criação/edição. A `senha` chega em claro e é derivada pelo
/// handler antes de persistir.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminEntrada {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nivel: Option<Nivel>,
    pub status: Option<Status>,
    pub telefone: Option<String>,
    pub observacoes: Option<String>,
}

impl AdminEntrada {
    pub fn faltando(&self) -> Vec<&'static str> {
        let mut campos = Vec::new();
        if em_branco(&self.nome) {
            campos.push("nome");
        }
        if em_branco(&self.email) {
            campos.push("email");
        }
        if em_branco(&self.senha) {
            campos.push("senha");
        }
        if self.nivel.is_none() {
            campos.push("nivel");
        }
        campos
    }

    /// Aplica tudo menos a senha; o re-hash é decisão do handler.
    pub fn aplicar(self, admin: &mut Administrador) {
        if let Some(nome) = self.nome {
            admin.nome = nome;
        }
        if let Some(email) = self.email {
            admin.email = email;
        }
        if let Some(nivel) = self.nivel {
            admin.nivel = nivel;
        }
        if let Some(status) = self.status {
            admin.status = status;
        }
        if let Some(telefone) = self.telefone {
            admin.telefone = Some(telefone);
        }
        if let Some(observacoes) = self.observacoes {
            admin.observacoes = Some(observacoes);
        }
    }
}

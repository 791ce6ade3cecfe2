// src/models/mod.rs
pub mod academia;
pub mod admin;
pub mod personal;
pub mod proprietario;
pub mod sessao;
pub mod usuario;

pub use academia::{Academia, AcademiaEntrada};
pub use admin::{AdminEntrada, AdminPublico, Administrador, Nivel};
pub use personal::{Personal, PersonalEntrada};
pub use proprietario::{Proprietario, ProprietarioEntrada};
pub use sessao::{Sessao, VALIDADE_SESSAO_MS};
pub use usuario::{Usuario, UsuarioPublico};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Situação de um registro do diretório.
///
/// O mesmo enum cobre academias, proprietários, personais e
/// administradores; o valor inicial de cada coleção é decidido no
/// respectivo modelo (personais entram como `pendente`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ativo,
    Inativo,
    Pendente,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ativo => "ativo",
            Status::Inativo => "inativo",
            Status::Pendente => "pendente",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ativo" => Ok(Status::Ativo),
            "inativo" => Ok(Status::Inativo),
            "pendente" => Ok(Status::Pendente),
            outro => Err(format!("Status inválido: {outro}")),
        }
    }
}

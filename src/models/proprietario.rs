// src/models/proprietario.rs
use serde::{Deserialize, Serialize};

use super::academia::em_branco;
use super::Status;

/// Proprietário de academia.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Proprietario {
    #[serde(default)]
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub cidade: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub criado_em: String,
    #[serde(default)]
    pub atualizado_em: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProprietarioEntrada {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub status: Option<Status>,
}

impl ProprietarioEntrada {
    pub fn faltando(&self) -> Vec<&'static str> {
        if em_branco(&self.nome) {
            vec!["nome"]
        } else {
            Vec::new()
        }
    }

    pub fn aplicar(self, proprietario: &mut Proprietario) {
        if let Some(nome) = self.nome {
            proprietario.nome = nome;
        }
        if let Some(email) = self.email {
            proprietario.email = email;
        }
        if let Some(telefone) = self.telefone {
            proprietario.telefone = telefone;
        }
        if let Some(cpf) = self.cpf {
            proprietario.cpf = Some(cpf);
        }
        if let Some(endereco) = self.endereco {
            proprietario.endereco = Some(endereco);
        }
        if let Some(cidade) = self.cidade {
            proprietario.cidade = Some(cidade);
        }
        if let Some(estado) = self.estado {
            proprietario.estado = Some(estado);
        }
        if let Some(status) = self.status {
            proprietario.status = status;
        }
    }
}

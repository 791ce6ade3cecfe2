// src/models/academia.rs
use serde::{Deserialize, Serialize};

use super::Status;

/// Academia cadastrada no diretório.
///
/// O `id` é numérico e derivado do relógio (milissegundos de época),
/// atribuído pelo store na criação. Horários ficam como texto `HH:MM`,
/// datas como RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Academia {
    #[serde(default)]
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub tipo: String,
    #[serde(default)]
    pub preco: f64,
    #[serde(default)]
    pub endereco: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default)]
    pub facilidades: Vec<String>,
    #[serde(default = "abertura_padrao")]
    pub abertura: String,
    #[serde(default = "fechamento_padrao")]
    pub fechamento: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub proprietario_id: Option<i64>,
    #[serde(default)]
    pub criado_em: String,
    #[serde(default)]
    pub atualizado_em: Option<String>,
}

fn abertura_padrao() -> String {
    "06:00".to_string()
}

fn fechamento_padrao() -> String {
    "22:00".to_string()
}

impl Default for Academia {
    fn default() -> Self {
        Self {
            id: 0,
            nome: String::new(),
            tipo: String::new(),
            preco: 0.0,
            endereco: String::new(),
            cidade: String::new(),
            estado: String::new(),
            telefone: String::new(),
            email: String::new(),
            descricao: String::new(),
            facilidades: Vec::new(),
            abertura: abertura_padrao(),
            fechamento: fechamento_padrao(),
            status: Status::Ativo,
            proprietario_id: None,
            criado_em: String::new(),
            atualizado_em: None,
        }
    }
}

/// Campos aceitos na criação e na edição de uma academia. Tudo opcional:
/// na criação os obrigatórios são conferidos por `faltando`, na edição os
/// presentes são aplicados sobre o registro guardado.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AcademiaEntrada {
    pub nome: Option<String>,
    pub tipo: Option<String>,
    pub preco: Option<f64>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub descricao: Option<String>,
    pub facilidades: Option<Vec<String>>,
    pub abertura: Option<String>,
    pub fechamento: Option<String>,
    pub status: Option<Status>,
    pub proprietario_id: Option<i64>,
}

impl AcademiaEntrada {
    /// Campos obrigatórios ausentes numa criação.
    pub fn faltando(&self) -> Vec<&'static str> {
        let mut campos = Vec::new();
        if em_branco(&self.nome) {
            campos.push("nome");
        }
        if em_branco(&self.endereco) {
            campos.push("endereco");
        }
        if em_branco(&self.tipo) {
            campos.push("tipo");
        }
        campos
    }

    /// Aplica os campos presentes sobre um registro existente.
    pub fn aplicar(self, academia: &mut Academia) {
        if let Some(nome) = self.nome {
            academia.nome = nome;
        }
        if let Some(tipo) = self.tipo {
            academia.tipo = tipo;
        }
        if let Some(preco) = self.preco {
            academia.preco = preco;
        }
        if let Some(endereco) = self.endereco {
            academia.endereco = endereco;
        }
        if let Some(cidade) = self.cidade {
            academia.cidade = cidade;
        }
        if let Some(estado) = self.estado {
            academia.estado = estado;
        }
        if let Some(telefone) = self.telefone {
            academia.telefone = telefone;
        }
        if let Some(email) = self.email {
            academia.email = email;
        }
        if let Some(descricao) = self.descricao {
            academia.descricao = descricao;
        }
        if let Some(facilidades) = self.facilidades {
            academia.facilidades = facilidades;
        }
        if let Some(abertura) = self.abertura {
            academia.abertura = abertura;
        }
        if let Some(fechamento) = self.fechamento {
            academia.fechamento = fechamento;
        }
        if let Some(status) = self.status {
            academia.status = status;
        }
        if let Some(proprietario_id) = self.proprietario_id {
            academia.proprietario_id = Some(proprietario_id);
        }
    }
}

pub(crate) fn em_branco(campo: &Option<String>) -> bool {
    campo.as_deref().map_or(true, |s| s.trim().is_empty())
}

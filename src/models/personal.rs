// src/models/personal.rs
use serde::{Deserialize, Serialize};

use super::academia::em_branco;
use super::Status;

/// Personal trainer do diretório.
///
/// Entra sempre como `pendente` e só aparece nas listagens públicas
/// depois de aprovado (status `ativo`). `academia_id` é opcional: sem
/// vínculo o personal é apresentado como independente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personal {
    #[serde(default)]
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub bairros: Vec<String>,
    #[serde(default)]
    pub especialidade: String,
    #[serde(default)]
    pub anos_experiencia: i64,
    #[serde(default)]
    pub cref: Option<String>,
    #[serde(default)]
    pub sobre: Option<String>,
    #[serde(default)]
    pub academia_id: Option<i64>,
    #[serde(default = "status_inicial")]
    pub status: Status,
    #[serde(default)]
    pub avaliacao: f64,
    #[serde(default)]
    pub numero_avaliacoes: i64,
    #[serde(default)]
    pub criado_em: String,
    #[serde(default)]
    pub atualizado_em: Option<String>,
}

fn status_inicial() -> Status {
    Status::Pendente
}

impl Default for Personal {
    fn default() -> Self {
        Self {
            id: 0,
            nome: String::new(),
            email: String::new(),
            telefone: String::new(),
            cidade: String::new(),
            bairros: Vec::new(),
            especialidade: String::new(),
            anos_experiencia: 0,
            cref: None,
            sobre: None,
            academia_id: None,
            status: Status::Pendente,
            avaliacao: 0.0,
            numero_avaliacoes: 0,
            criado_em: String::new(),
            atualizado_em: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PersonalEntrada {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cidade: Option<String>,
    pub bairros: Option<Vec<String>>,
    pub especialidade: Option<String>,
    pub anos_experiencia: Option<i64>,
    pub cref: Option<String>,
    pub sobre: Option<String>,
    pub academia_id: Option<i64>,
    pub status: Option<Status>,
    pub avaliacao: Option<f64>,
    pub numero_avaliacoes: Option<i64>,
}

impl PersonalEntrada {
    pub fn faltando(&self) -> Vec<&'static str> {
        let mut campos = Vec::new();
        if em_branco(&self.nome) {
            campos.push("nome");
        }
        if em_branco(&self.email) {
            campos.push("email");
        }
        if em_branco(&self.especialidade) {
            campos.push("especialidade");
        }
        campos
    }

    pub fn aplicar(self, personal: &mut Personal) {
        if let Some(nome) = self.nome {
            personal.nome = nome;
        }
        if let Some(email) = self.email {
            personal.email = email;
        }
        if let Some(telefone) = self.telefone {
            personal.telefone = telefone;
        }
        if let Some(cidade) = self.cidade {
            personal.cidade = cidade;
        }
        if let Some(bairros) = self.bairros {
            personal.bairros = bairros;
        }
        if let Some(especialidade) = self.especialidade {
            personal.especialidade = especialidade;
        }
        if let Some(anos_experiencia) = self.anos_experiencia {
            personal.anos_experiencia = anos_experiencia;
        }
        if let Some(cref) = self.cref {
            personal.cref = Some(cref);
        }
        if let Some(sobre) = self.sobre {
            personal.sobre = Some(sobre);
        }
        if let Some(academia_id) = self.academia_id {
            personal.academia_id = Some(academia_id);
        }
        if let Some(status) = self.status {
            personal.status = status;
        }
        if let Some(avaliacao) = self.avaliacao {
            personal.avaliacao = avaliacao;
        }
        if let Some(numero_avaliacoes) = self.numero_avaliacoes {
            personal.numero_avaliacoes = numero_avaliacoes;
        }
    }
}

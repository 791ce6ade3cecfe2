// src/error.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de E/S nos arquivos de dados: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Erro ao processar credenciais")]
    CredencialError,

    #[error("{0}")]
    Validacao(String),

    #[error("{0}")]
    NaoEncontrado(String),

    #[error("{0}")]
    NaoAutorizado(String),

    #[error("{0}")]
    Proibido(String),

    #[error("Erro interno inesperado")]
    InternalServerError,
}

// Como converter AppError numa resposta HTTP (envelope JSON da API)
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let (status, mensagem) = match self {
            AppError::SqlxError(_) | AppError::IoError(_) | AppError::SerdeError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao aceder aos dados.".to_string())
            }
            AppError::EnvVarError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro de configuração.".to_string())
            }
            AppError::CredencialError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao processar credenciais.".to_string())
            }
            AppError::Validacao(m) => (StatusCode::BAD_REQUEST, m),
            AppError::NaoEncontrado(m) => (StatusCode::NOT_FOUND, m),
            AppError::NaoAutorizado(m) => (StatusCode::UNAUTHORIZED, m),
            AppError::Proibido(m) => (StatusCode::FORBIDDEN, m),
            AppError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        (status, Json(json!({ "success": false, "message": mensagem }))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;

// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::auth_service,
    state::AppState,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// IP informado pelo proxy, primeiro salto do `x-forwarded-for`.
pub fn ip_do_cliente(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|valor| valor.to_str().ok())
        .and_then(|valor| valor.split(',').next())
        .map(|valor| valor.trim().to_string())
}

// Os formulários antigos enviam `name`/`password`, os novos `nome`/
// `senha`; aceitamos as duas grafias.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CadastroPayload {
    name: Option<String>,
    nome: Option<String>,
    email: Option<String>,
    password: Option<String>,
    senha: Option<String>,
}

impl CadastroPayload {
    fn nome(&self) -> Option<&str> {
        self.name.as_deref().or(self.nome.as_deref()).filter(|v| !v.trim().is_empty())
    }

    fn senha(&self) -> Option<&str> {
        self.password.as_deref().or(self.senha.as_deref()).filter(|v| !v.is_empty())
    }
}

// POST /cadastro
pub async fn cadastro(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CadastroPayload>,
) -> AppResult<impl IntoResponse> {
    let (Some(nome), Some(email), Some(senha)) = (
        payload.nome(),
        payload.email.as_deref().filter(|v| !v.trim().is_empty()),
        payload.senha(),
    ) else {
        return Err(AppError::Validacao("Nome, email e senha são obrigatórios".into()));
    };

    tracing::info!("📝 Cadastro: {nome} <{email}>");
    let usuario =
        auth_service::cadastrar(&state.store, nome, email, senha, ip_do_cliente(&headers)).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Conta criada com sucesso!",
        "user": usuario,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
    senha: Option<String>,
}

// POST /login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let senha = payload.password.as_deref().or(payload.senha.as_deref());
    let (Some(email), Some(senha)) = (payload.email.as_deref(), senha.filter(|v| !v.is_empty()))
    else {
        return Err(AppError::Validacao("Email e senha são obrigatórios".into()));
    };

    let (token, usuario) =
        auth_service::entrar(&state.store, email, senha, ip_do_cliente(&headers)).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login realizado com sucesso!",
        "token": token,
        "user": usuario,
        "redirect": "index.html",
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenPayload {
    token: Option<String>,
}

// POST /verificar-sessao
pub async fn verificar_sessao(
    State(state): State<AppState>,
    Json(payload): Json<TokenPayload>,
) -> AppResult<impl IntoResponse> {
    let Some(token) = payload.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(AppError::Validacao("Token é obrigatório".into()));
    };

    let usuario = auth_service::verificar_sessao(&state.store, token).await?;
    Ok(Json(json!({ "success": true, "user": usuario })))
}

// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TokenPayload>,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = payload.token.as_deref().filter(|t| !t.is_empty()) {
        auth_service::sair(&state.store, token, ip_do_cliente(&headers)).await?;
    }
    Ok(Json(json!({ "success": true, "message": "Logout realizado" })))
}
